use serde::{Deserialize, Serialize};

use super::{push_get, Cell, CellValue};

/// Points per centimetre, for [`Row::set_height_cm`].
const POINTS_PER_CM: f64 = 28.346_456_7;

/// A row of cells. The cell at position `i` belongs to column `i`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub cells: Vec<Cell>,
    pub hidden: bool,
    height: f64,
    is_custom: bool,
    pub outline_level: u8,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty cell and return it.
    pub fn add_cell(&mut self) -> &mut Cell {
        push_get(&mut self.cells, Cell::new())
    }

    /// Height in points, 0 when the row uses the sheet default.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// True once an explicit height has been set.
    pub fn is_custom_height(&self) -> bool {
        self.is_custom
    }

    pub fn set_height(&mut self, points: f64) {
        self.height = points;
        self.is_custom = true;
    }

    pub fn set_height_cm(&mut self, cm: f64) {
        self.set_height(cm * POINTS_PER_CM);
    }

    /// Append one cell per value, returning how many were written.
    pub fn write_slice(&mut self, values: &[CellValue]) -> usize {
        for value in values {
            self.add_cell().set_value(value);
        }
        values.len()
    }

    pub(crate) fn set_height_raw(&mut self, points: f64, is_custom: bool) {
        self.height = points;
        self.is_custom = is_custom;
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::types::CellType;

    #[test]
    fn test_add_cell_appends() {
        let mut row = Row::new();
        row.add_cell().set_string("a");
        row.add_cell().set_string("b");
        assert_eq!(row.cells.len(), 2);
        assert_eq!(row.cells[1].value(), "b");
    }

    #[test]
    fn test_set_height_marks_custom() {
        let mut row = Row::new();
        assert!(!row.is_custom_height());
        row.set_height(20.5);
        assert!(row.is_custom_height());
        assert_eq!(row.height(), 20.5);
    }

    #[test]
    fn test_write_slice_maps_types() {
        let mut row = Row::new();
        let n = row.write_slice(&[
            CellValue::from("name"),
            CellValue::Int(3),
            CellValue::Float(2.5),
            CellValue::Bool(false),
            CellValue::Empty,
        ]);
        assert_eq!(n, 5);
        assert_eq!(row.cells[0].cell_type(), CellType::String);
        assert_eq!(row.cells[1].cell_type(), CellType::Numeric);
        assert_eq!(row.cells[2].value(), "2.5");
        assert_eq!(row.cells[3].cell_type(), CellType::Bool);
        assert_eq!(row.cells[3].value(), "0");
        assert_eq!(row.cells[4].value(), "");
    }
}
