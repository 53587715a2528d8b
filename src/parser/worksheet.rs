//! Worksheet parsing - parses individual sheet XML into Sheet structs.
//!
//! Parsing runs in two passes. The event loop collects the raw rows,
//! columns and merges (merges follow `sheetData` in the file), then
//! [`build_sheet`] lays the raw cells out into dense rows, padding the
//! rows and cells that the file leaves out.

use std::collections::HashMap;
use std::io::BufRead;
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::cell_ref::{coords_from_id, parse_cell_range, parse_span};
use crate::error::{Result, XlstreamError};
use crate::numfmt::NumFmtCache;
use crate::options::RowLimit;
use crate::shared_strings::SharedStringTable;
use crate::types::{
    get_or_grow, AutoFilter, Cell, CellType, Col, Pane, Row, Sheet, SheetFormat, SheetState,
    SheetView, Style,
};
use crate::xml_helpers::{attr_bool, attr_f64, attr_string, attr_u8, attr_usize};

use super::formula::{RawFormula, SharedFormulas};

/// Characters stripped from both ends of `<v>` and inline text.
const CELL_TRIM: &[char] = &[' ', '\t', '\n', '\r'];

/// Read-only lookups shared by every sheet of one decode.
pub(super) struct SheetContext<'a> {
    pub shared_strings: &'a SharedStringTable,
    /// Style for each cell format index; empty when the file has no styles part.
    pub styles: &'a [Arc<Style>],
    /// Number format code for each cell format index.
    pub num_fmts: &'a [String],
    pub date1904: bool,
    pub row_limit: RowLimit,
}

#[derive(Debug, Default)]
struct RawCol {
    min: usize,
    max: usize,
    width: f64,
    hidden: bool,
    collapsed: bool,
    outline_level: u8,
    style: usize,
}

#[derive(Debug, Default)]
struct InlineString {
    /// Direct `<is><t>` text.
    text: String,
    /// Concatenated `<is><r><t>` run text.
    runs: String,
}

#[derive(Debug, Default)]
struct RawCell {
    r: String,
    t: String,
    s: usize,
    v: String,
    formula: Option<RawFormula>,
    inline: Option<InlineString>,
}

#[derive(Debug, Default)]
struct RawRow {
    r: Option<usize>,
    spans: String,
    hidden: bool,
    height: Option<f64>,
    custom_height: bool,
    outline_level: u8,
    cells: Vec<RawCell>,
}

#[derive(Debug, Default)]
struct RawWorksheet {
    dimension: String,
    cols: Vec<RawCol>,
    rows: Vec<RawRow>,
    /// Merge origin `(col, row)` -> additional `(cols, rows)` covered.
    merges: HashMap<(usize, usize), (usize, usize)>,
    sheet_views: Vec<SheetView>,
    sheet_format: SheetFormat,
    auto_filter: Option<AutoFilter>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum TextTarget {
    None,
    Value,
    Formula,
    InlineText,
    RunText,
}

fn read_formula(e: &BytesStart) -> RawFormula {
    RawFormula {
        kind: attr_string(e, b"t").unwrap_or_default(),
        reference: attr_string(e, b"ref").unwrap_or_default(),
        si: attr_usize(e, b"si"),
        content: String::new(),
    }
}

fn read_cell(e: &BytesStart) -> RawCell {
    RawCell {
        r: attr_string(e, b"r").unwrap_or_default(),
        t: attr_string(e, b"t").unwrap_or_default(),
        s: attr_usize(e, b"s").unwrap_or(0),
        ..RawCell::default()
    }
}

fn read_row(e: &BytesStart) -> RawRow {
    RawRow {
        r: attr_usize(e, b"r"),
        spans: attr_string(e, b"spans").unwrap_or_default(),
        hidden: attr_bool(e, b"hidden").unwrap_or(false),
        height: attr_f64(e, b"ht"),
        custom_height: attr_bool(e, b"customHeight").unwrap_or(false),
        outline_level: attr_u8(e, b"outlineLevel").unwrap_or(0),
        cells: Vec::new(),
    }
}

fn read_col(e: &BytesStart) -> RawCol {
    RawCol {
        min: attr_usize(e, b"min").unwrap_or(0),
        max: attr_usize(e, b"max").unwrap_or(0),
        width: attr_f64(e, b"width").unwrap_or(0.0),
        hidden: attr_bool(e, b"hidden").unwrap_or(false),
        collapsed: attr_bool(e, b"collapsed").unwrap_or(false),
        outline_level: attr_u8(e, b"outlineLevel").unwrap_or(0),
        style: attr_usize(e, b"style").unwrap_or(0),
    }
}

fn read_pane(e: &BytesStart) -> Pane {
    // <pane xSplit="2" ySplit="3" topLeftCell="C4" activePane="bottomRight" state="frozen"/>
    Pane {
        x_split: attr_f64(e, b"xSplit").unwrap_or(0.0),
        y_split: attr_f64(e, b"ySplit").unwrap_or(0.0),
        top_left_cell: attr_string(e, b"topLeftCell").unwrap_or_default(),
        active_pane: attr_string(e, b"activePane").unwrap_or_default(),
        state: attr_string(e, b"state").unwrap_or_default(),
    }
}

/// First pass: collect raw worksheet records.
#[allow(clippy::too_many_lines)]
fn parse_raw<R: BufRead>(reader: R) -> Result<RawWorksheet> {
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut raw = RawWorksheet::default();
    let mut buf = Vec::new();
    let mut row: Option<RawRow> = None;
    let mut cell: Option<RawCell> = None;
    let mut target = TextTarget::None;
    let mut in_is = false;
    let mut in_run = false;
    let mut in_phonetic = false;

    loop {
        match xml.read_event_into(&mut buf)? {
            ref event @ (Event::Start(_) | Event::Empty(_)) => {
                let (Event::Start(ref e) | Event::Empty(ref e)) = event else {
                    continue;
                };
                let is_start = matches!(event, Event::Start(_));

                match e.local_name().as_ref() {
                    b"dimension" => {
                        raw.dimension = attr_string(e, b"ref").unwrap_or_default();
                    }
                    b"sheetView" => raw.sheet_views.push(SheetView::default()),
                    b"pane" => {
                        if let Some(view) = raw.sheet_views.last_mut() {
                            view.pane = Some(read_pane(e));
                        }
                    }
                    b"sheetFormatPr" => {
                        raw.sheet_format = SheetFormat {
                            default_col_width: attr_f64(e, b"defaultColWidth").unwrap_or(0.0),
                            default_row_height: attr_f64(e, b"defaultRowHeight").unwrap_or(0.0),
                            outline_level_col: attr_u8(e, b"outlineLevelCol").unwrap_or(0),
                            outline_level_row: attr_u8(e, b"outlineLevelRow").unwrap_or(0),
                        };
                    }
                    b"col" => raw.cols.push(read_col(e)),
                    b"row" => {
                        if is_start {
                            row = Some(read_row(e));
                        } else {
                            raw.rows.push(read_row(e));
                        }
                    }
                    b"c" => {
                        let parsed = read_cell(e);
                        if is_start {
                            cell = Some(parsed);
                        } else if let Some(current) = row.as_mut() {
                            current.cells.push(parsed);
                        }
                    }
                    b"v" if is_start => target = TextTarget::Value,
                    b"f" => {
                        if let Some(current) = cell.as_mut() {
                            current.formula = Some(read_formula(e));
                            if is_start {
                                target = TextTarget::Formula;
                            }
                        }
                    }
                    b"is" => {
                        if let Some(current) = cell.as_mut() {
                            current.inline = Some(InlineString::default());
                        }
                        in_is = is_start;
                    }
                    b"r" if in_is => in_run = is_start,
                    b"rPh" if in_is => in_phonetic = is_start,
                    b"t" if in_is && is_start && !in_phonetic => {
                        target = if in_run {
                            TextTarget::RunText
                        } else {
                            TextTarget::InlineText
                        };
                    }
                    b"mergeCell" => {
                        if let Some(reference) = attr_string(e, b"ref") {
                            let ((sc, sr), (ec, er)) = parse_cell_range(&reference)?;
                            raw.merges
                                .insert((sc, sr), (ec.saturating_sub(sc), er.saturating_sub(sr)));
                        }
                    }
                    b"autoFilter" => {
                        if let Some(reference) = attr_string(e, b"ref") {
                            let (top_left, bottom_right) = reference
                                .split_once(':')
                                .unwrap_or((reference.as_str(), reference.as_str()));
                            raw.auto_filter = Some(AutoFilter {
                                top_left_cell: top_left.to_string(),
                                bottom_right_cell: bottom_right.to_string(),
                            });
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(ref e) if target != TextTarget::None => {
                push_text(&mut cell, target, &e.unescape()?);
            }
            Event::CData(ref e) if target != TextTarget::None => {
                push_text(&mut cell, target, &String::from_utf8_lossy(e));
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"v" | b"f" | b"t" => target = TextTarget::None,
                b"r" if in_is => in_run = false,
                b"rPh" => in_phonetic = false,
                b"is" => in_is = false,
                b"c" => {
                    if let (Some(done), Some(current)) = (cell.take(), row.as_mut()) {
                        current.cells.push(done);
                    }
                }
                b"row" => {
                    if let Some(done) = row.take() {
                        raw.rows.push(done);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(raw)
}

fn push_text(cell: &mut Option<RawCell>, target: TextTarget, text: &str) {
    let Some(cell) = cell.as_mut() else {
        return;
    };
    match target {
        TextTarget::Value => cell.v.push_str(text),
        TextTarget::Formula => {
            if let Some(formula) = cell.formula.as_mut() {
                formula.content.push_str(text);
            }
        }
        TextTarget::InlineText => {
            if let Some(inline) = cell.inline.as_mut() {
                inline.text.push_str(text);
            }
        }
        TextTarget::RunText => {
            if let Some(inline) = cell.inline.as_mut() {
                inline.runs.push_str(text);
            }
        }
        TextTarget::None => {}
    }
}

/// `(min_col, max_col, max_row)` from every cell reference in the sheet.
fn bounds_from_cells(rows: &[RawRow]) -> Result<(usize, usize, usize)> {
    let mut min_col: Option<usize> = None;
    let mut max_col = 0;
    let mut max_row = 0;
    for cell in rows.iter().flat_map(|r| r.cells.iter()) {
        if cell.r.is_empty() {
            continue;
        }
        let (col, row) = coords_from_id(&cell.r)?;
        min_col = Some(min_col.map_or(col, |m| m.min(col)));
        max_col = max_col.max(col);
        max_row = max_row.max(row);
    }
    Ok((min_col.unwrap_or(0), max_col, max_row))
}

/// Number of cells a raw row needs: its span's upper bound when it has
/// exactly one span, otherwise the highest cell column.
fn row_width(raw_row: &RawRow) -> Result<usize> {
    if !raw_row.spans.is_empty() && raw_row.spans.matches(':').count() == 1 {
        let (_, upper) = parse_span(&raw_row.spans)?;
        return Ok(upper);
    }
    let mut upper: Option<usize> = None;
    for cell in &raw_row.cells {
        upper = Some(if cell.r.is_empty() {
            upper.map_or(0, |u| u + 1)
        } else {
            let (col, _) = coords_from_id(&cell.r)?;
            upper.map_or(col, |u| u.max(col))
        });
    }
    Ok(upper.map_or(0, |u| u + 1))
}

/// Resolve a raw cell's value and type into `cell`.
fn fill_cell_data(
    raw: &RawCell,
    shared_strings: &SharedStringTable,
    formulas: &mut SharedFormulas,
    cell: &mut Cell,
) -> Result<()> {
    let value = raw.v.trim_matches(CELL_TRIM);
    if let Some(formula) = &raw.formula {
        cell.set_formula_text(formulas.formula_for_cell(formula, &raw.r));
    }

    let (value, cell_type) = match raw.t.as_str() {
        "s" => {
            if value.is_empty() {
                (String::new(), CellType::String)
            } else {
                let idx: usize = value.parse().map_err(|_| {
                    XlstreamError::CorruptInput(format!("invalid shared string index {value:?}"))
                })?;
                (shared_strings.resolve(idx)?.to_string(), CellType::String)
            }
        }
        "inlineStr" => {
            let text = raw.inline.as_ref().map_or_else(String::new, |inline| {
                if inline.text.is_empty() {
                    inline.runs.clone()
                } else {
                    inline.text.trim_matches(CELL_TRIM).to_string()
                }
            });
            (text, CellType::Inline)
        }
        "b" => (value.to_string(), CellType::Bool),
        "e" => (value.to_string(), CellType::Error),
        "str" => (value.to_string(), CellType::StringFormula),
        "d" => (value.to_string(), CellType::Date),
        "" | "n" => (value.to_string(), CellType::Numeric),
        other => {
            return Err(XlstreamError::CorruptInput(format!(
                "invalid cell type {other:?} in {}",
                raw.r
            )))
        }
    };
    cell.set_raw(value, cell_type);
    Ok(())
}

/// Second pass: lay raw rows out into dense [`Row`]s.
#[allow(clippy::too_many_lines)]
fn build_sheet(
    raw: RawWorksheet,
    name: &str,
    state: SheetState,
    ctx: &SheetContext<'_>,
    cache: &mut NumFmtCache,
) -> Result<Sheet> {
    let mut sheet = Sheet::new(name);
    sheet.state = state;
    sheet.sheet_views = raw.sheet_views;
    sheet.sheet_format = raw.sheet_format;
    sheet.auto_filter = raw.auto_filter;

    if raw.rows.is_empty() {
        return Ok(sheet);
    }

    let trust_dimension = !raw.dimension.is_empty()
        && raw.dimension.split(':').count() == 2
        && ctx.row_limit.is_unlimited();
    let (min_col, max_col, max_row) = if trust_dimension {
        let ((min_col, _), (max_col, max_row)) = parse_cell_range(&raw.dimension)?;
        (min_col, max_col, max_row)
    } else {
        bounds_from_cells(&raw.rows)?
    };
    let row_count = max_row + 1;
    let col_count = max_col + 1;

    let mut cols: Vec<Col> = (1..=col_count).map(|n| Col::new(n, n)).collect();
    // Column records outside the sheet bounds are dropped.
    for raw_col in &raw.cols {
        for i in raw_col.min.max(1)..=raw_col.max.min(col_count) {
            let mut col = Col::new(raw_col.min, raw_col.max);
            col.hidden = raw_col.hidden;
            col.width = raw_col.width;
            col.collapsed = raw_col.collapsed;
            col.outline_level = raw_col.outline_level;
            if !ctx.styles.is_empty() {
                col.set_shared_style(ctx.styles.get(raw_col.style).cloned());
                if let Some(code) = ctx.num_fmts.get(raw_col.style) {
                    col.set_num_fmt(code);
                }
            }
            if let Some(slot) = cols.get_mut(i - 1) {
                *slot = col;
            }
        }
    }

    let mut rows: Vec<Row> = Vec::with_capacity(row_count);
    let mut formulas = SharedFormulas::default();

    for raw_row in &raw.rows {
        // Some files leave blank rows out of the stored data.
        if let Some(r) = raw_row.r {
            while r > rows.len() + 1 {
                rows.push(Row::new());
            }
        }

        let mut row = Row::new();
        row.cells = (0..row_width(raw_row)?).map(|_| Cell::new()).collect();
        row.hidden = raw_row.hidden;
        row.set_height_raw(raw_row.height.unwrap_or(0.0), raw_row.custom_height);
        row.outline_level = raw_row.outline_level;

        let mut insert_col = min_col;
        for raw_cell in &raw_row.cells {
            let x = if raw_cell.r.is_empty() {
                insert_col
            } else {
                coords_from_id(&raw_cell.r)?.0
            };
            // Cells may be left out too; the skipped positions keep empty cells.
            insert_col = insert_col.max(x);

            let (hmerge, vmerge) = if raw_cell.r.is_empty() {
                (0, 0)
            } else {
                let (col, row_idx) = coords_from_id(&raw_cell.r)?;
                raw.merges.get(&(col, row_idx)).copied().unwrap_or((0, 0))
            };
            let col_hidden = cols.get(insert_col).is_some_and(|c| c.hidden);

            let cell = get_or_grow(&mut row.cells, insert_col, |_| Cell::new());
            cell.hmerge = hmerge;
            cell.vmerge = vmerge;
            fill_cell_data(raw_cell, ctx.shared_strings, &mut formulas, cell)?;
            if !ctx.styles.is_empty() {
                cell.set_shared_style(ctx.styles.get(raw_cell.s).cloned());
                if let Some(code) = ctx.num_fmts.get(raw_cell.s) {
                    cell.set_parsed_num_fmt(cache.get(code));
                }
            }
            cell.set_date1904(ctx.date1904);
            cell.hidden = raw_row.hidden || col_hidden;
            insert_col += 1;
        }
        rows.push(row);
    }

    // Trailing empty rows up to the sheet bounds.
    while rows.len() < row_count {
        rows.push(Row::new());
    }

    sheet.rows = rows;
    sheet.cols = cols;
    sheet.max_row = row_count;
    sheet.max_col = col_count;
    sheet.sync_bounds();
    Ok(sheet)
}

/// Parse one worksheet part into a [`Sheet`].
pub(super) fn parse_sheet(
    xml: &[u8],
    name: &str,
    state: SheetState,
    ctx: &SheetContext<'_>,
) -> Result<Sheet> {
    let mut cache = NumFmtCache::new();
    let raw = parse_raw(xml)?;
    let sheet = build_sheet(raw, name, state, ctx, &mut cache)?;
    log::debug!(
        "parsed sheet {name:?}: {} rows, {} cols, {} number formats",
        sheet.max_row,
        sheet.max_col,
        cache.len()
    );
    Ok(sheet)
}
