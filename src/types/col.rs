use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{CellType, Style};
use crate::numfmt::{GENERAL, TEXT_PLACEHOLDER};

/// Width written for columns that never had one set.
pub const DEFAULT_COL_WIDTH: f64 = 9.5;

/// A column record covering the 1-based range `min..=max`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Col {
    pub min: usize,
    pub max: usize,
    pub hidden: bool,
    /// 0 means the default width.
    pub width: f64,
    pub collapsed: bool,
    pub outline_level: u8,
    num_fmt: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    style: Option<Arc<Style>>,
}

impl Default for Col {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl Col {
    pub fn new(min: usize, max: usize) -> Self {
        Self {
            min,
            max,
            hidden: false,
            width: 0.0,
            collapsed: false,
            outline_level: 0,
            num_fmt: String::new(),
            style: None,
        }
    }

    pub fn num_fmt(&self) -> &str {
        &self.num_fmt
    }

    pub fn set_num_fmt(&mut self, num_fmt: &str) {
        self.num_fmt = num_fmt.to_string();
    }

    /// Pick the column number format from the kind of values it holds.
    pub fn set_type(&mut self, cell_type: CellType) {
        let fmt = match cell_type {
            CellType::String | CellType::Inline | CellType::StringFormula => TEXT_PLACEHOLDER,
            CellType::Numeric => "0",
            CellType::Bool | CellType::Error | CellType::Date => GENERAL,
        };
        self.set_num_fmt(fmt);
    }

    pub fn style(&self) -> Option<&Style> {
        self.style.as_deref()
    }

    pub fn style_mut(&mut self) -> &mut Style {
        Arc::make_mut(self.style.get_or_insert_with(|| Arc::new(Style::default())))
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = Some(Arc::new(style));
    }

    pub(crate) fn set_shared_style(&mut self, style: Option<Arc<Style>>) {
        self.style = style;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_type_picks_format() {
        let mut col = Col::new(1, 1);
        col.set_type(CellType::Inline);
        assert_eq!(col.num_fmt(), "@");
        col.set_type(CellType::Numeric);
        assert_eq!(col.num_fmt(), "0");
        col.set_type(CellType::Date);
        assert_eq!(col.num_fmt(), "general");
    }

    #[test]
    fn test_style_mut_is_copy_on_write() {
        let mut a = Col::new(1, 1);
        a.set_style(Style::default());
        let mut b = a.clone();
        b.style_mut().font.italic = true;
        assert!(!a.style_mut().font.italic);
        assert!(b.style().is_some_and(|s| s.font.italic));
    }
}
