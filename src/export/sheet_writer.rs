//! Generates worksheet XML from a `Sheet`.
//!
//! Strings go through the shared string table; cell styles and number
//! formats are registered with the document's style registry as the rows
//! are written, so the style ids in the output are only valid together with
//! the registry the caller serializes afterwards.

use crate::cell_ref::{id_from_coords, MAX_COLUMNS, MAX_ROWS};
use crate::error::{Result, XlstreamError};
use crate::numfmt::is_general;
use crate::shared_strings::SharedStringTable;
use crate::styles::StyleRegistry;
use crate::types::{
    BorderStyle, Cell, CellType, Sheet, SheetFormat, SheetView, Style, DEFAULT_COL_WIDTH,
};
use crate::xml_helpers::{opt_attr, xml_escape, XML_HEADER};

/// `sheetFormatPr` row height when the sheet does not set one.
const DEFAULT_ROW_HEIGHT: f64 = 15.0;

/// A serialized worksheet plus the cell format index of each column record.
pub(crate) struct SheetXml {
    pub xml: String,
    pub col_xfs: Vec<usize>,
}

/// Build the worksheet part for `sheet`.
///
/// Merged areas are filled with placeholder cells first, and the outline
/// levels found on rows and columns are stored back into the sheet format.
/// Fails when a merged area reaches past the sheet limits.
pub(crate) fn write_sheet_xml(
    sheet: &mut Sheet,
    shared_strings: &mut SharedStringTable,
    styles: &mut StyleRegistry,
) -> Result<SheetXml> {
    handle_merged(sheet)?;
    sheet.sheet_format.outline_level_col = sheet.cols.iter().map(|c| c.outline_level).max().unwrap_or(0);
    sheet.sheet_format.outline_level_row = sheet.rows.iter().map(|r| r.outline_level).max().unwrap_or(0);
    let sheet: &Sheet = sheet;

    let mut out = String::with_capacity(4096);
    out.push_str(XML_HEADER);
    out.push_str(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
    );
    out.push_str(
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );

    out.push_str(&format!("<dimension ref=\"{}\"/>", dimension_ref(sheet)));
    write_sheet_views(&mut out, &sheet.sheet_views, sheet.selected);
    write_sheet_format(&mut out, &sheet.sheet_format);

    // <cols>
    let mut col_xfs = Vec::with_capacity(sheet.cols.len());
    if !sheet.cols.is_empty() {
        out.push_str("<cols>");
        for col in &sheet.cols {
            let num_fmt_id = styles.add_number_format(col.num_fmt());
            let xf = match col.style() {
                Some(style) => styles.add_style(style, num_fmt_id),
                None => styles.add_style(&Style::default(), num_fmt_id),
            };
            col_xfs.push(xf);

            let (width, custom) = if col.width == 0.0 {
                (DEFAULT_COL_WIDTH, false)
            } else {
                (col.width, true)
            };
            out.push_str(&format!(
                "<col min=\"{}\" max=\"{}\" width=\"{width}\" customWidth=\"{}\" style=\"{xf}\"",
                col.min.max(1),
                col.max.max(1),
                u8::from(custom),
            ));
            if col.hidden {
                out.push_str(" hidden=\"1\"");
            }
            if col.collapsed {
                out.push_str(" collapsed=\"1\"");
            }
            if col.outline_level > 0 {
                out.push_str(&format!(" outlineLevel=\"{}\"", col.outline_level));
            }
            out.push_str("/>");
        }
        out.push_str("</cols>");
    }

    // <sheetData>
    out.push_str("<sheetData>");
    let mut merges = Vec::new();
    for (r, row) in sheet.rows.iter().enumerate() {
        out.push_str(&format!("<row r=\"{}\"", r + 1));
        if row.is_custom_height() {
            out.push_str(&format!(" customHeight=\"1\" ht=\"{}\"", row.height()));
        }
        if row.hidden {
            out.push_str(" hidden=\"1\"");
        }
        if row.outline_level > 0 {
            out.push_str(&format!(" outlineLevel=\"{}\"", row.outline_level));
        }
        if row.cells.is_empty() {
            out.push_str("/>");
            continue;
        }
        out.push('>');

        for (c, cell) in row.cells.iter().enumerate() {
            let col_num_fmt = sheet.cols.get(c).map_or("", |col| col.num_fmt());
            let xf = cell_xf(cell, col_num_fmt, col_xfs.get(c).copied().unwrap_or(0), styles);
            write_cell(&mut out, cell, &id_from_coords(c, r), xf, shared_strings);

            if cell.hmerge > 0 || cell.vmerge > 0 {
                merges.push(format!(
                    "{}:{}",
                    id_from_coords(c, r),
                    id_from_coords(c + cell.hmerge, r + cell.vmerge)
                ));
            }
        }
        out.push_str("</row>");
    }
    out.push_str("</sheetData>");

    if let Some(filter) = &sheet.auto_filter {
        out.push_str(&format!("<autoFilter ref=\"{}\"/>", xml_escape(&filter.range())));
    }

    if !merges.is_empty() {
        out.push_str(&format!("<mergeCells count=\"{}\">", merges.len()));
        for merge in &merges {
            out.push_str(&format!("<mergeCell ref=\"{merge}\"/>"));
        }
        out.push_str("</mergeCells>");
    }

    out.push_str(
        "<pageMargins left=\"0.7\" right=\"0.7\" top=\"0.75\" bottom=\"0.75\" header=\"0.3\" footer=\"0.3\"/>",
    );
    out.push_str("</worksheet>");

    Ok(SheetXml { xml: out, col_xfs })
}

/// `A1:<last>` over the stored rows and cells, or just `A1`.
fn dimension_ref(sheet: &Sheet) -> String {
    let max_row = sheet.rows.len().saturating_sub(1);
    let max_cell = sheet.max_cells().saturating_sub(1);
    let last = id_from_coords(max_cell, max_row);
    if last == "A1" {
        last
    } else {
        format!("A1:{last}")
    }
}

fn write_sheet_views(out: &mut String, views: &[SheetView], selected: bool) {
    out.push_str("<sheetViews>");
    let first = SheetView::default();
    let views = if views.is_empty() {
        std::slice::from_ref(&first)
    } else {
        views
    };
    for (idx, view) in views.iter().enumerate() {
        out.push_str("<sheetView");
        if idx == 0 && selected {
            out.push_str(" tabSelected=\"1\"");
        }
        out.push_str(" workbookViewId=\"0\"");
        match &view.pane {
            Some(pane) => {
                out.push('>');
                out.push_str(&format!(
                    "<pane xSplit=\"{}\" ySplit=\"{}\"{}{}{}/>",
                    pane.x_split,
                    pane.y_split,
                    opt_attr("topLeftCell", &pane.top_left_cell),
                    opt_attr("activePane", &pane.active_pane),
                    opt_attr("state", &pane.state),
                ));
                out.push_str("</sheetView>");
            }
            None => out.push_str("/>"),
        }
    }
    out.push_str("</sheetViews>");
}

fn write_sheet_format(out: &mut String, format: &SheetFormat) {
    let row_height = if format.default_row_height == 0.0 {
        DEFAULT_ROW_HEIGHT
    } else {
        format.default_row_height
    };
    out.push_str(&format!("<sheetFormatPr defaultRowHeight=\"{row_height}\""));
    if format.default_col_width != 0.0 {
        out.push_str(&format!(" defaultColWidth=\"{}\"", format.default_col_width));
    }
    if format.outline_level_row > 0 {
        out.push_str(&format!(" outlineLevelRow=\"{}\"", format.outline_level_row));
    }
    if format.outline_level_col > 0 {
        out.push_str(&format!(" outlineLevelCol=\"{}\"", format.outline_level_col));
    }
    out.push_str("/>");
}

/// Cell format index for `cell`.
///
/// A styled cell gets its own format. An unstyled cell keeps its column's
/// format unless its number format differs from the column's.
fn cell_xf(cell: &Cell, col_num_fmt: &str, col_xf: usize, styles: &mut StyleRegistry) -> usize {
    let num_fmt_id = styles.add_number_format(cell.num_fmt());
    if let Some(style) = cell.style() {
        return styles.add_style(style, num_fmt_id);
    }
    if !cell.num_fmt().is_empty() && !same_format(col_num_fmt, cell.num_fmt()) {
        return styles.add_num_fmt_xf(num_fmt_id);
    }
    col_xf
}

/// Format codes compare equal when identical or both general.
fn same_format(a: &str, b: &str) -> bool {
    a == b || (is_general(a) && is_general(b))
}

fn write_cell(
    out: &mut String,
    cell: &Cell,
    cell_ref: &str,
    xf: usize,
    shared_strings: &mut SharedStringTable,
) {
    let value = match cell.cell_type() {
        CellType::String | CellType::Inline => {
            if cell.value().is_empty() {
                String::new()
            } else {
                shared_strings.intern(cell.value()).to_string()
            }
        }
        _ => xml_escape(cell.value()),
    };

    out.push_str(&format!("<c r=\"{cell_ref}\""));
    if xf != 0 {
        out.push_str(&format!(" s=\"{xf}\""));
    }
    if let Some(t) = cell.cell_type().as_xml_type() {
        out.push_str(&format!(" t=\"{t}\""));
    }
    if cell.formula().is_empty() && value.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    if !cell.formula().is_empty() {
        out.push_str(&format!("<f>{}</f>", xml_escape(cell.formula())));
    }
    if !value.is_empty() {
        out.push_str(&format!("<v>{value}</v>"));
    }
    out.push_str("</c>");
}

/// Give every cell of a merged area a style whose border draws the outline
/// of the area, allocating covered cells as needed.
///
/// The anchor's own border is moved onto the outer edges.
fn handle_merged(sheet: &mut Sheet) -> Result<()> {
    let mut merged = Vec::new();
    for (r, row) in sheet.rows.iter().enumerate() {
        for (c, cell) in row.cells.iter().enumerate() {
            if cell.hmerge == 0 && cell.vmerge == 0 {
                continue;
            }
            let last_col = c.checked_add(cell.hmerge).filter(|&n| n < MAX_COLUMNS);
            let last_row = r.checked_add(cell.vmerge).filter(|&n| n < MAX_ROWS);
            if last_col.is_none() || last_row.is_none() {
                return Err(XlstreamError::MergeOutOfBounds(id_from_coords(c, r)));
            }
            merged.push((r, c, cell.hmerge, cell.vmerge));
        }
    }

    for (row, col, hmerge, vmerge) in merged {
        let edges = {
            let main = sheet.cell(row, col).style_mut();
            let edges = main.border.clone();
            main.border.left = BorderStyle::None;
            main.border.right = BorderStyle::None;
            main.border.top = BorderStyle::None;
            main.border.bottom = BorderStyle::None;
            edges
        };

        for dr in 0..=vmerge {
            for dc in 0..=hmerge {
                let style = sheet.cell(row + dr, col + dc).style_mut();
                style.apply_border = true;
                if dr == 0 {
                    style.border.top = edges.top;
                    style.border.top_color.clone_from(&edges.top_color);
                }
                if dr == vmerge {
                    style.border.bottom = edges.bottom;
                    style.border.bottom_color.clone_from(&edges.bottom_color);
                }
                if dc == 0 {
                    style.border.left = edges.left;
                    style.border.left_color.clone_from(&edges.left_color);
                }
                if dc == hmerge {
                    style.border.right = edges.right;
                    style.border.right_color.clone_from(&edges.right_color);
                }
            }
        }
    }    Ok(())
}
