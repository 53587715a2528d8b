//! Test fixtures for generating XLSX archives in memory.
//!
//! The builder takes raw worksheet XML so tests can exercise exactly the
//! markup they care about (sparse rows, shared formulas, missing parts).
//!
//! # Example
//!
//! ```rust,ignore
//! let xlsx = XlsxBuilder::new()
//!     .shared_strings(&["hello"])
//!     .sheet("Sheet1", r#"<row r="1"><c r="A1" t="s"><v>0</v></c></row>"#)
//!     .build();
//! ```
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

/// One worksheet: tab name, state and the XML that goes inside `<worksheet>`.
#[derive(Debug, Clone)]
pub struct SheetEntry {
    pub name: String,
    pub state: Option<String>,
    pub body: String,
}

/// Builder for XLSX archives made from raw XML fragments.
#[derive(Debug, Clone, Default)]
pub struct XlsxBuilder {
    sheets: Vec<SheetEntry>,
    shared_strings: Option<Vec<String>>,
    styles: Option<String>,
    theme: Option<String>,
    chart_sheets: Vec<String>,
    date1904: bool,
    omit_workbook_rels: bool,
    omit_workbook: bool,
    omit_sheet_files: bool,
    omit_sheet_file: Option<usize>,
    reverse_sheet_files: bool,
}

impl XlsxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet whose `<sheetData>` holds `rows`.
    pub fn sheet(self, name: &str, rows: &str) -> Self {
        self.sheet_body(name, &format!("<sheetData>{rows}</sheetData>"))
    }

    /// Add a sheet with the full worksheet body (dimension, cols, merges...).
    pub fn sheet_body(mut self, name: &str, body: &str) -> Self {
        self.sheets.push(SheetEntry {
            name: name.to_string(),
            state: None,
            body: body.to_string(),
        });
        self
    }

    /// Set the state attribute of the last added sheet.
    pub fn state(mut self, state: &str) -> Self {
        if let Some(sheet) = self.sheets.last_mut() {
            sheet.state = Some(state.to_string());
        }
        self
    }

    pub fn shared_strings(mut self, strings: &[&str]) -> Self {
        self.shared_strings = Some(strings.iter().map(|s| (*s).to_string()).collect());
        self
    }

    /// Raw content of `<styleSheet>`.
    pub fn styles(mut self, inner: &str) -> Self {
        self.styles = Some(inner.to_string());
        self
    }

    /// Raw content of `<a:themeElements>`.
    pub fn theme(mut self, elements: &str) -> Self {
        self.theme = Some(elements.to_string());
        self
    }

    /// Add a chart sheet tab after the worksheets; no part is written for it.
    pub fn chart_sheet(mut self, name: &str) -> Self {
        self.chart_sheets.push(name.to_string());
        self
    }

    pub fn date1904(mut self) -> Self {
        self.date1904 = true;
        self
    }

    pub fn without_workbook_rels(mut self) -> Self {
        self.omit_workbook_rels = true;
        self
    }

    pub fn without_workbook(mut self) -> Self {
        self.omit_workbook = true;
        self
    }

    pub fn without_sheet_files(mut self) -> Self {
        self.omit_sheet_files = true;
        self
    }

    /// Leave out the part of the sheet at tab `idx` (0-based) while keeping its relationship.
    pub fn without_sheet_file(mut self, idx: usize) -> Self {
        self.omit_sheet_file = Some(idx);
        self
    }

    /// Store sheet N as `sheet{count-N+1}.xml`, so file order differs from tab order.
    pub fn reverse_sheet_files(mut self) -> Self {
        self.reverse_sheet_files = true;
        self
    }

    fn file_number(&self, idx: usize) -> usize {
        if self.reverse_sheet_files {
            self.sheets.len() - idx
        } else {
            idx + 1
        }
    }

    pub fn build(self) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buf);
            let options = FileOptions::default();

            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(
                br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/></Types>"#,
            )
            .unwrap();

            if !self.omit_workbook {
                let mut workbook = String::from(
                    r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
                );
                if self.date1904 {
                    workbook.push_str(r#"<workbookPr date1904="1"/>"#);
                }
                workbook.push_str("<sheets>");
                for (i, sheet) in self.sheets.iter().enumerate() {
                    let state = sheet
                        .state
                        .as_ref()
                        .map(|s| format!(r#" state="{s}""#))
                        .unwrap_or_default();
                    workbook.push_str(&format!(
                        r#"<sheet name="{}" sheetId="{}" r:id="rId{}"{state}/>"#,
                        sheet.name,
                        i + 1,
                        i + 1
                    ));
                }
                for (i, name) in self.chart_sheets.iter().enumerate() {
                    workbook.push_str(&format!(
                        r#"<sheet name="{name}" sheetId="{}" r:id="rIdChart{}"/>"#,
                        self.sheets.len() + i + 1,
                        i + 1
                    ));
                }
                workbook.push_str("</sheets></workbook>");
                zip.start_file("xl/workbook.xml", options).unwrap();
                zip.write_all(workbook.as_bytes()).unwrap();
            }

            if !self.omit_workbook_rels {
                let mut rels = String::from(
                    r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
                );
                for i in 0..self.sheets.len() {
                    rels.push_str(&format!(
                        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                        i + 1,
                        self.file_number(i)
                    ));
                }
                if self.shared_strings.is_some() {
                    rels.push_str(r#"<Relationship Id="rIdSst" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#);
                }
                if self.styles.is_some() {
                    rels.push_str(r#"<Relationship Id="rIdStyles" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#);
                }
                for i in 0..self.chart_sheets.len() {
                    rels.push_str(&format!(
                        r#"<Relationship Id="rIdChart{0}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chartsheet" Target="chartsheets/sheet{0}.xml"/>"#,
                        i + 1
                    ));
                }
                if self.theme.is_some() {
                    rels.push_str(r#"<Relationship Id="rIdTheme" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/>"#);
                }
                rels.push_str("</Relationships>");
                zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
                zip.write_all(rels.as_bytes()).unwrap();
            }

            if let Some(strings) = &self.shared_strings {
                let mut sst = format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
                    strings.len()
                );
                for s in strings {
                    sst.push_str(&format!("<si><t>{s}</t></si>"));
                }
                sst.push_str("</sst>");
                zip.start_file("xl/sharedStrings.xml", options).unwrap();
                zip.write_all(sst.as_bytes()).unwrap();
            }

            if let Some(theme) = &self.theme {
                zip.start_file("xl/theme/theme1.xml", options).unwrap();
                zip.write_all(
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8"?><a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements>{theme}</a:themeElements></a:theme>"#
                    )
                    .as_bytes(),
                )
                .unwrap();
            }

            if let Some(styles) = &self.styles {
                zip.start_file("xl/styles.xml", options).unwrap();
                zip.write_all(
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8"?><styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">{styles}</styleSheet>"#
                    )
                    .as_bytes(),
                )
                .unwrap();
            }

            if !self.omit_sheet_files {
                for (i, sheet) in self.sheets.iter().enumerate() {
                    if self.omit_sheet_file == Some(i) {
                        continue;
                    }
                    zip.start_file(
                        format!("xl/worksheets/sheet{}.xml", self.file_number(i)),
                        options,
                    )
                    .unwrap();
                    zip.write_all(
                        format!(
                            r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">{}</worksheet>"#,
                            sheet.body
                        )
                        .as_bytes(),
                    )
                    .unwrap();
                }
            }

            zip.finish().unwrap();
        }
        buf.into_inner()
    }
}

/// `count` rows of one numeric cell each: `<row r="n"><c r="An"><v>n</v></c></row>`.
pub fn numbered_rows(count: usize) -> String {
    (1..=count)
        .map(|n| format!(r#"<row r="{n}"><c r="A{n}"><v>{n}</v></c></row>"#))
        .collect()
}
