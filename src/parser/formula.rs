//! Shared formula expansion.
//!
//! A shared formula is stored once on its origin cell (`<f t="shared"
//! ref="A1:A9" si="0">`) and referenced by `si` from the cells it covers.
//! Each dependent cell gets the origin text with its relative references
//! moved by the distance from the origin.

use std::collections::HashMap;

use crate::cell_ref::{coords_from_id, shift_cell};

/// The `<f>` element of a raw cell.
#[derive(Debug, Clone, Default)]
pub(super) struct RawFormula {
    /// The `t` attribute, `shared` for shared formulas.
    pub kind: String,
    /// The `ref` attribute, set on the origin of a shared formula.
    pub reference: String,
    pub si: Option<usize>,
    pub content: String,
}

#[derive(Debug, Clone)]
struct SharedOrigin {
    col: usize,
    row: usize,
    formula: String,
}

/// Shared formula origins seen so far in one worksheet, keyed by `si`.
#[derive(Debug, Default)]
pub(super) struct SharedFormulas {
    origins: HashMap<usize, SharedOrigin>,
}

impl SharedFormulas {
    /// The formula text for the cell at `cell_ref`.
    pub fn formula_for_cell(&mut self, raw: &RawFormula, cell_ref: &str) -> String {
        if raw.kind != "shared" {
            return raw.content.trim().to_string();
        }
        let Ok((col, row)) = coords_from_id(cell_ref) else {
            return raw.content.trim().to_string();
        };
        let si = raw.si.unwrap_or(0);

        if !raw.reference.is_empty() {
            let formula = raw.content.trim().to_string();
            self.origins.insert(
                si,
                SharedOrigin {
                    col,
                    row,
                    formula: formula.clone(),
                },
            );
            return formula;
        }

        let Some(origin) = self.origins.get(&si) else {
            log::warn!("cell {cell_ref} refers to unknown shared formula {si}");
            return String::new();
        };
        let dx = signed_delta(col, origin.col);
        let dy = signed_delta(row, origin.row);
        shift_formula(&origin.formula, dx, dy).trim().to_string()
    }
}

#[allow(clippy::cast_possible_wrap)]
fn signed_delta(to: usize, from: usize) -> isize {
    to as isize - from as isize
}

/// Move every relative cell reference in `formula` by `(dx, dy)`.
///
/// Text inside double quotes is copied untouched. A reference is a run of
/// upper-case letters and `$` followed by digits; function names such as
/// `LOG10(` are left alone.
pub fn shift_formula(formula: &str, dx: isize, dy: isize) -> String {
    let bytes = formula.as_bytes();
    let mut out = String::with_capacity(formula.len() + 4);
    let mut copied_to = 0;
    let mut pos = 0;
    let mut in_string = false;

    while let Some(&c) = bytes.get(pos) {
        if c == b'"' {
            in_string = !in_string;
            pos += 1;
            continue;
        }
        if in_string || !(c.is_ascii_uppercase() || c == b'$') {
            pos += 1;
            continue;
        }

        let token_start = pos;
        pos += 1;
        let mut found_digit = false;
        while let Some(&d) = bytes.get(pos) {
            if d.is_ascii_digit() || d == b'$' {
                found_digit = true;
            } else if !d.is_ascii_uppercase() || found_digit {
                break;
            }
            pos += 1;
        }

        if found_digit && bytes.get(pos) != Some(&b'(') {
            out.push_str(formula.get(copied_to..token_start).unwrap_or_default());
            let token = formula.get(token_start..pos).unwrap_or_default();
            out.push_str(&shift_cell(token, dx, dy));
            copied_to = pos;
        }
    }

    out.push_str(formula.get(copied_to..).unwrap_or_default());
    out
}
