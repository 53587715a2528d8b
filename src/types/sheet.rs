use serde::{Deserialize, Serialize};

use super::{get_or_grow, push_get, Cell, Col, Row};
use crate::error::{Result, XlstreamError};

/// Sheet visibility state
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SheetState {
    #[default]
    Visible,
    Hidden,
    VeryHidden,
}

impl SheetState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::VeryHidden => "veryHidden",
        }
    }

    pub fn from_xml(s: &str) -> Self {
        match s {
            "hidden" => Self::Hidden,
            "veryHidden" => Self::VeryHidden,
            _ => Self::Visible,
        }
    }
}

/// Frozen or split pane of a sheet view.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pane {
    pub x_split: f64,
    pub y_split: f64,
    pub top_left_cell: String,
    pub active_pane: String,
    /// `frozen`, `split` or `frozenSplit`.
    pub state: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SheetView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pane: Option<Pane>,
}

/// Sheet-wide row and column defaults (`sheetFormatPr`).
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SheetFormat {
    pub default_col_width: f64,
    pub default_row_height: f64,
    pub outline_level_col: u8,
    pub outline_level_row: u8,
}

/// Autofilter over the range `top_left_cell:bottom_right_cell`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AutoFilter {
    pub top_left_cell: String,
    pub bottom_right_cell: String,
}

impl AutoFilter {
    pub fn range(&self) -> String {
        format!("{}:{}", self.top_left_cell, self.bottom_right_cell)
    }
}

/// A worksheet: dense rows of cells, sparse column records and view state.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Row>,
    pub cols: Vec<Col>,
    /// Row count high-water mark.
    pub max_row: usize,
    /// Column count high-water mark.
    pub max_col: usize,
    pub state: SheetState,
    /// Tab selected when the workbook opens.
    pub selected: bool,
    pub sheet_views: Vec<SheetView>,
    pub sheet_format: SheetFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_filter: Option<AutoFilter>,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.state != SheetState::Visible
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.state = if hidden {
            SheetState::Hidden
        } else {
            SheetState::Visible
        };
    }

    /// Append an empty row and return it.
    pub fn add_row(&mut self) -> &mut Row {
        self.max_row = self.max_row.max(self.rows.len() + 1);
        push_get(&mut self.rows, Row::new())
    }

    /// The row at `idx`, adding empty rows up to it as needed.
    pub fn row(&mut self, idx: usize) -> &mut Row {
        self.max_row = self.max_row.max(idx + 1);
        get_or_grow(&mut self.rows, idx, |_| Row::new())
    }

    /// Widen the sheet to `count` columns, adding a default column record.
    pub fn maybe_add_col(&mut self, count: usize) {
        if count > self.max_col {
            self.cols.push(Col::new(count, count));
            self.max_col = count;
        }
    }

    /// The column record at `idx`, allocating columns as needed.
    pub fn col(&mut self, idx: usize) -> &mut Col {
        self.max_col = self.max_col.max(idx + 1);
        get_or_grow(&mut self.cols, idx, |n| Col::new(n + 1, n + 1))
    }

    /// The cell at zero-based `(row, col)`, growing rows and cells as needed.
    pub fn cell(&mut self, row: usize, col: usize) -> &mut Cell {
        self.max_col = self.max_col.max(col + 1);
        let row = self.row(row);
        get_or_grow(&mut row.cells, col, |_| Cell::new())
    }

    /// Set the width of zero-based columns `start..=end`.
    pub fn set_col_width(&mut self, start: usize, end: usize, width: f64) -> Result<()> {
        if start > end {
            return Err(XlstreamError::InvalidColumnRange(start, end));
        }
        let mut col = Col::new(start + 1, end + 1);
        col.width = width;
        self.cols.push(col);
        self.max_col = self.max_col.max(end + 1);
        Ok(())
    }

    /// Widest row, in cells.
    pub fn max_cells(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// Raise the high-water marks to cover every stored row and cell.
    pub(crate) fn sync_bounds(&mut self) {
        self.max_row = self.max_row.max(self.rows.len());
        self.max_col = self.max_col.max(self.max_cells());
    }
}
