use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::Style;
use crate::dates::{time_from_excel_time, time_to_excel_time};
use crate::error::{FormatFailure, Result, XlstreamError};
use crate::numfmt::{self, builtin_format, parse_number_format, ParsedNumberFormat, GENERAL};

/// Cell value kinds as stored in worksheet XML.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum CellType {
    #[default]
    String,
    StringFormula,
    Numeric,
    Bool,
    /// Read from an inline string; written back through the shared table.
    Inline,
    Error,
    Date,
}

impl CellType {
    /// Value of the `t` attribute for this type, `None` when it is omitted.
    pub fn as_xml_type(self) -> Option<&'static str> {
        match self {
            Self::String | Self::Inline => Some("s"),
            Self::StringFormula => Some("str"),
            Self::Numeric => None,
            Self::Bool => Some("b"),
            Self::Error => Some("e"),
            Self::Date => Some("d"),
        }
    }
}

/// A value handed to [`Row::write_slice`](super::Row::write_slice).
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Empty,
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

/// A single cell: canonical text value, type tag, optional formula and style.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    value: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    formula: String,
    cell_type: CellType,
    num_fmt: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    style: Option<Arc<Style>>,
    /// Additional columns covered by a merge anchored here.
    pub hmerge: usize,
    /// Additional rows covered by a merge anchored here.
    pub vmerge: usize,
    pub hidden: bool,
    date1904: bool,
    #[serde(skip)]
    parsed_num_fmt: Option<Arc<ParsedNumberFormat>>,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            value: String::new(),
            formula: String::new(),
            cell_type: CellType::String,
            num_fmt: GENERAL.to_string(),
            style: None,
            hmerge: 0,
            vmerge: 0,
            hidden: false,
            date1904: false,
            parsed_num_fmt: None,
        }
    }
}

impl Cell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn num_fmt(&self) -> &str {
        &self.num_fmt
    }

    pub fn date1904(&self) -> bool {
        self.date1904
    }

    /// Change the number format code. Drops any cached parse of the old one.
    pub fn set_num_fmt(&mut self, num_fmt: &str) {
        if self.num_fmt != num_fmt {
            self.num_fmt = num_fmt.to_string();
            self.parsed_num_fmt = None;
        }
    }

    pub fn set_string(&mut self, s: &str) {
        self.value = s.to_string();
        self.formula.clear();
        self.cell_type = CellType::String;
    }

    /// Store a numeric value given as text, with the general format.
    pub fn set_numeric(&mut self, s: &str) {
        self.value = s.to_string();
        self.set_num_fmt(GENERAL);
        self.formula.clear();
        self.cell_type = CellType::Numeric;
    }

    pub fn set_float(&mut self, n: f64) {
        self.set_numeric(&numfmt::shortest_fixed(n));
    }

    pub fn set_float_with_format(&mut self, n: f64, format: &str) {
        self.value = numfmt::shortest_fixed(n);
        self.set_num_fmt(format);
        self.formula.clear();
        self.cell_type = CellType::Numeric;
    }

    pub fn set_int(&mut self, n: i32) {
        self.set_numeric(&n.to_string());
    }

    pub fn set_int64(&mut self, n: i64) {
        self.set_numeric(&n.to_string());
    }

    pub fn set_bool(&mut self, b: bool) {
        self.value = if b { "1" } else { "0" }.to_string();
        self.cell_type = CellType::Bool;
    }

    /// A formula whose result is numeric. The cached value is kept.
    pub fn set_formula(&mut self, formula: &str) {
        self.formula = formula.to_string();
        self.cell_type = CellType::Numeric;
    }

    /// A formula whose result is a string.
    pub fn set_string_formula(&mut self, formula: &str) {
        self.formula = formula.to_string();
        self.cell_type = CellType::StringFormula;
    }

    /// Store an Excel serial date with an explicit format code.
    pub fn set_date_time_with_format(&mut self, serial: f64, format: &str) {
        self.set_float_with_format(serial, format);
    }

    /// Store a date using built-in format 14 (`mm-dd-yy`).
    pub fn set_date(&mut self, date: NaiveDate) {
        let serial = time_to_excel_time(date.and_time(NaiveTime::default()));
        self.set_date_time_with_format(serial, builtin_format(14).unwrap_or(GENERAL));
    }

    /// Store a timestamp using built-in format 22 (`m/d/yy h:mm`).
    pub fn set_date_time(&mut self, dt: NaiveDateTime) {
        self.set_date_time_with_format(time_to_excel_time(dt), builtin_format(22).unwrap_or(GENERAL));
    }

    pub fn set_value(&mut self, value: &CellValue) {
        match value {
            CellValue::String(s) => self.set_string(s),
            CellValue::Int(n) => self.set_int64(*n),
            CellValue::Float(n) => self.set_float(*n),
            CellValue::Bool(b) => self.set_bool(*b),
            CellValue::DateTime(dt) => self.set_date_time(*dt),
            CellValue::Empty => self.set_string(""),
        }
    }

    pub fn float(&self) -> Result<f64> {
        self.value
            .trim()
            .parse()
            .map_err(|_| XlstreamError::InvalidNumber(self.value.clone()))
    }

    pub fn int64(&self) -> Result<i64> {
        self.value
            .trim()
            .parse()
            .map_err(|_| XlstreamError::InvalidNumber(self.value.clone()))
    }

    /// Truthiness of the stored value.
    ///
    /// Bool cells compare against `"1"`, numeric cells against `"0"`; any
    /// other non-empty value is true.
    pub fn bool_value(&self) -> bool {
        match self.cell_type {
            CellType::Bool => self.value == "1",
            CellType::Numeric => self.value != "0",
            _ => !self.value.is_empty(),
        }
    }

    /// Interpret the value as an Excel serial date.
    pub fn get_time(&self) -> Result<NaiveDateTime> {
        time_from_excel_time(self.float()?, self.date1904)
            .ok_or_else(|| XlstreamError::DateOutOfRange(self.value.clone()))
    }

    /// True when the number format renders dates or times.
    pub fn is_time(&self) -> bool {
        match &self.parsed_num_fmt {
            Some(parsed) if parsed.num_fmt() == self.num_fmt => parsed.is_time_format(),
            _ => numfmt::is_time_format(&self.num_fmt),
        }
    }

    /// The value in general format, switching to scientific notation for
    /// very large or very small magnitudes.
    pub fn general_numeric(&self) -> Result<String> {
        numfmt::general_numeric(&self.value, true)
    }

    pub fn general_numeric_without_scientific(&self) -> Result<String> {
        numfmt::general_numeric(&self.value, false)
    }

    /// Merge this cell with `hcells` columns to the right and `vcells` rows below.
    ///
    /// Encoding fails with `MergeOutOfBounds` if the area runs past the
    /// last sheet column or row.
    pub fn merge(&mut self, hcells: usize, vcells: usize) {
        self.hmerge = hcells;
        self.vmerge = vcells;
    }

    pub fn style(&self) -> Option<&Style> {
        self.style.as_deref()
    }

    /// The cell style, creating a default one if the cell has none.
    pub fn style_mut(&mut self) -> &mut Style {
        Arc::make_mut(self.style.get_or_insert_with(|| Arc::new(Style::default())))
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = Some(Arc::new(style));
    }

    pub fn clear_style(&mut self) {
        self.style = None;
    }

    /// Render the value through its number format.
    ///
    /// On failure the returned [`FormatFailure`] still carries usable text.
    /// A format code that failed to parse reports that error in preference
    /// to any value error.
    pub fn formatted_value(&self) -> std::result::Result<String, FormatFailure> {
        let (text, error) = match &self.parsed_num_fmt {
            Some(parsed) if parsed.num_fmt() == self.num_fmt => {
                parsed.format_value(self, self.date1904)
            }
            _ => parse_number_format(&self.num_fmt).format_value(self, self.date1904),
        };
        match error {
            Some(error) => Err(FormatFailure { text, error }),
            None => Ok(text),
        }
    }

    pub(crate) fn set_raw(&mut self, value: String, cell_type: CellType) {
        self.value = value;
        self.cell_type = cell_type;
    }

    pub(crate) fn set_formula_text(&mut self, formula: String) {
        self.formula = formula;
    }

    pub(crate) fn set_date1904(&mut self, date1904: bool) {
        self.date1904 = date1904;
    }

    /// Install a parsed format shared with other cells using the same code.
    pub(crate) fn set_parsed_num_fmt(&mut self, parsed: Arc<ParsedNumberFormat>) {
        self.num_fmt = parsed.num_fmt().to_string();
        self.parsed_num_fmt = Some(parsed);
    }

    pub(crate) fn set_shared_style(&mut self, style: Option<Arc<Style>>) {
        self.style = style;
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.formatted_value() {
            Ok(text) => f.write_str(&text),
            Err(_) => f.write_str(&self.value),
        }
    }
}
