//! Utilities for Excel-style cell references and ranges.
//!
//! Columns use bijective base-26 ("A".."Z", "AA".."AZ", ...) with no zero
//! digit; rows are 1-based in the text form and 0-based everywhere else.

use crate::error::{Result, XlstreamError};

/// Columns in a worksheet (`A`..`XFD`).
pub const MAX_COLUMNS: usize = 16_384;
/// Rows in a worksheet.
pub const MAX_ROWS: usize = 1_048_576;

/// Convert column letters to a 0-based column index.
///
/// Non-letter characters are ignored, so `"$AB"` is column 27.
pub fn col_letters_to_index(letters: &str) -> usize {
    let mut col: usize = 0;
    let mut saw_col = false;
    for b in letters.bytes() {
        if b.is_ascii_alphabetic() {
            let upper = b.to_ascii_uppercase();
            col = col
                .saturating_mul(26)
                .saturating_add(usize::from(upper - b'A') + 1);
            saw_col = true;
        }
    }
    if saw_col {
        col - 1
    } else {
        0
    }
}

/// Convert a 0-based column index to letters (0 -> "A", 26 -> "AA").
pub fn col_to_letter(col: usize) -> String {
    let mut result = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        n -= 1;
        #[allow(clippy::cast_possible_truncation)]
        result.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    result.reverse();
    String::from_utf8(result).unwrap_or_default()
}

/// Parse a cell reference like `"B3"` into 0-based `(col, row)`.
///
/// `$` markers are skipped. Returns an error when there is no row number.
pub fn coords_from_id(cell_id: &str) -> Result<(usize, usize)> {
    let mut row: usize = 0;
    let mut saw_row = false;
    let mut letters = String::new();

    for ch in cell_id.trim().chars() {
        if ch.is_ascii_alphabetic() {
            letters.push(ch);
        } else if let Some(d) = ch.to_digit(10) {
            row = row.saturating_mul(10).saturating_add(d as usize);
            saw_row = true;
        }
    }

    if !saw_row || row == 0 {
        return Err(XlstreamError::InvalidCellRef(cell_id.to_string()));
    }

    Ok((col_letters_to_index(&letters), row - 1))
}

/// Build a cell reference from 0-based `(col, row)`: `(1, 2)` -> `"B3"`.
pub fn id_from_coords(col: usize, row: usize) -> String {
    format!("{}{}", col_to_letter(col), row + 1)
}

/// Parse a cell range like `"A1:B10"` (or a single `"A1"`) into
/// `((min_col, min_row), (max_col, max_row))`.
pub fn parse_cell_range(range: &str) -> Result<((usize, usize), (usize, usize))> {
    if let Some((start, end)) = range.split_once(':') {
        Ok((coords_from_id(start)?, coords_from_id(end)?))
    } else {
        let cell = coords_from_id(range)?;
        Ok((cell, cell))
    }
}

/// Parse a numeric span like `"1:3"` into `(1, 3)`.
pub fn parse_span(span: &str) -> Result<(usize, usize)> {
    let invalid = || XlstreamError::InvalidRange(span.to_string());
    let (lower, upper) = span.split_once(':').ok_or_else(invalid)?;
    let lower = lower.trim().parse().map_err(|_| invalid())?;
    let upper = upper.trim().parse().map_err(|_| invalid())?;
    Ok((lower, upper))
}

/// Shift a (possibly partly absolute) cell reference by `(dx, dy)`.
///
/// A `$` at index 0 pins the column; a `$` anywhere after index 0 pins the
/// row. Unparseable references are returned unchanged.
pub fn shift_cell(cell_id: &str, dx: isize, dy: isize) -> String {
    let Ok((col, row)) = coords_from_id(cell_id) else {
        return cell_id.to_string();
    };

    let fixed_col = cell_id.find('$') == Some(0);
    let fixed_row = cell_id.rfind('$').is_some_and(|idx| idx > 0);

    let col = if fixed_col {
        col
    } else {
        col.saturating_add_signed(dx)
    };
    let row = if fixed_row {
        row
    } else {
        row.saturating_add_signed(dy)
    };

    let mut out = String::with_capacity(cell_id.len() + 2);
    if fixed_col {
        out.push('$');
    }
    out.push_str(&col_to_letter(col));
    if fixed_row {
        out.push('$');
    }
    out.push_str(&(row + 1).to_string());
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_coords_from_id() {
        assert_eq!(coords_from_id("A1").unwrap(), (0, 0));
        assert_eq!(coords_from_id("B3").unwrap(), (1, 2));
        assert_eq!(coords_from_id("Z10").unwrap(), (25, 9));
        assert_eq!(coords_from_id("AA1").unwrap(), (26, 0));
        assert_eq!(coords_from_id("$C$5").unwrap(), (2, 4));
        assert_eq!(coords_from_id("xfd1048576").unwrap(), (16383, 1_048_575));
    }

    #[test]
    fn test_coords_from_id_invalid() {
        assert!(coords_from_id("").is_err());
        assert!(coords_from_id("ABC").is_err());
        assert!(coords_from_id("A0").is_err());
    }

    #[test]
    fn test_id_from_coords() {
        assert_eq!(id_from_coords(0, 0), "A1");
        assert_eq!(id_from_coords(1, 2), "B3");
        assert_eq!(id_from_coords(25, 0), "Z1");
        assert_eq!(id_from_coords(26, 0), "AA1");
        assert_eq!(id_from_coords(51, 0), "AZ1");
        assert_eq!(id_from_coords(52, 0), "BA1");
        assert_eq!(id_from_coords(701, 0), "ZZ1");
        assert_eq!(id_from_coords(702, 0), "AAA1");
    }

    #[test]
    fn test_parse_cell_range() {
        assert_eq!(parse_cell_range("A1:C4").unwrap(), ((0, 0), (2, 3)));
        assert_eq!(parse_cell_range("D7").unwrap(), ((3, 6), (3, 6)));
    }

    #[test]
    fn test_parse_span() {
        assert_eq!(parse_span("1:3").unwrap(), (1, 3));
        assert!(parse_span("1").is_err());
        assert!(parse_span("a:3").is_err());
    }

    #[test]
    fn test_shift_cell() {
        assert_eq!(shift_cell("A1", 0, 1), "A2");
        assert_eq!(shift_cell("B1", 2, 3), "D4");
        assert_eq!(shift_cell("$A1", 3, 1), "$A2");
        assert_eq!(shift_cell("A$1", 3, 1), "D$1");
        assert_eq!(shift_cell("$A$1", 3, 1), "$A$1");
    }
}
