use serde::{Deserialize, Serialize};

use super::{push_get, Sheet};
use crate::error::{Result, XlstreamError};
use crate::shared_strings::SharedStringTable;
use crate::styles::StyleRegistry;

/// Sheet names must stay below this many characters.
pub const MAX_SHEET_NAME_CHARS: usize = 31;

/// A defined name (named range) in the workbook
///
/// Built-in names use the `_xlnm.` prefix, e.g. `_xlnm.Print_Area`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DefinedName {
    pub name: String,
    /// The formula or reference, e.g. `Sheet1!$A$1:$D$10`.
    pub data: String,
    /// Scope the name to one sheet (0-indexed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_sheet_id: Option<usize>,
    pub hidden: bool,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub comment: String,
}

/// An in-memory workbook.
///
/// Sheet order is tab order. The shared string table and style registry
/// belong to this document alone and are filled while encoding or decoding.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub sheets: Vec<Sheet>,
    /// Dates count from 1904-01-01 instead of 1900-01-00.
    pub date1904: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub defined_names: Vec<DefinedName>,
    #[serde(skip)]
    pub(crate) shared_strings: SharedStringTable,
    #[serde(skip)]
    pub(crate) styles: StyleRegistry,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty sheet. The first sheet added is the selected tab.
    pub fn add_sheet(&mut self, name: &str) -> Result<&mut Sheet> {
        self.append_sheet(Sheet::new(name), name)
    }

    /// Add an existing sheet under `name`.
    pub fn append_sheet(&mut self, mut sheet: Sheet, name: &str) -> Result<&mut Sheet> {
        if self.sheet(name).is_some() {
            return Err(XlstreamError::DuplicateSheetName(name.to_string()));
        }
        let chars = name.chars().count();
        if chars >= MAX_SHEET_NAME_CHARS {
            return Err(XlstreamError::SheetNameTooLong(chars));
        }
        sheet.name = name.to_string();
        sheet.selected = self.sheets.is_empty();
        Ok(push_get(&mut self.sheets, sheet))
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    pub fn shared_strings(&self) -> &SharedStringTable {
        &self.shared_strings
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    /// Formatted text of every cell, as `[sheet][row][col]`.
    ///
    /// The first formatting error aborts the export.
    pub fn to_slice(&self) -> Result<Vec<Vec<Vec<String>>>> {
        self.sheets
            .iter()
            .map(|sheet| {
                sheet
                    .rows
                    .iter()
                    .map(|row| {
                        row.cells
                            .iter()
                            .map(|cell| cell.formatted_value().map_err(|f| f.error))
                            .collect::<Result<Vec<_>>>()
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect()
    }

    /// Like [`to_slice`](Self::to_slice), with each merge origin's text
    /// copied into the cells the merge covers.
    pub fn to_slice_unmerged(&self) -> Result<Vec<Vec<Vec<String>>>> {
        let mut output = self.to_slice()?;
        for (sheet, grid) in self.sheets.iter().zip(output.iter_mut()) {
            for (r, row) in sheet.rows.iter().enumerate() {
                for (c, cell) in row.cells.iter().enumerate() {
                    if cell.hmerge == 0 && cell.vmerge == 0 {
                        continue;
                    }
                    let Some(text) = grid.get(r).and_then(|g| g.get(c)).cloned() else {
                        continue;
                    };
                    if let Some(grid_row) = grid.get_mut(r) {
                        for target in grid_row.iter_mut().skip(c + 1).take(cell.hmerge) {
                            target.clone_from(&text);
                        }
                    }
                    for grid_row in grid.iter_mut().skip(r + 1).take(cell.vmerge) {
                        if let Some(target) = grid_row.get_mut(c) {
                            target.clone_from(&text);
                        }
                    }
                }
            }
        }
        Ok(output)
    }
}
