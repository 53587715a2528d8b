//! XLSX export pipeline.
//!
//! Every package part is rendered to a string first: worksheets in tab
//! order (which fills the shared string table and style registry), then
//! the tables themselves and the fixed parts. The parts are then written
//! into a fresh ZIP archive.

pub(crate) mod sheet_writer;
pub(crate) mod templates;

use std::io::{Cursor, Seek, Write};
use std::path::Path;

use zip::write::FileOptions;
use zip::ZipWriter;

use crate::error::{Result, XlstreamError};
use crate::options::Compression;
use crate::shared_strings::SharedStringTable;
use crate::types::Document;

/// Rendered package parts plus the column cell formats of each sheet.
pub(crate) struct MarshalledParts {
    /// `(member name, content)` in archive order, metadata first.
    pub parts: Vec<(String, String)>,
    pub col_xfs: Vec<Vec<usize>>,
}

/// Render every part of `document` as `(member name, XML)` pairs.
///
/// Sheets are prepared for writing on the way: merged areas get their
/// placeholder cells and outline levels are recomputed.
pub fn marshal_parts(document: &mut Document) -> Result<Vec<(String, String)>> {
    Ok(marshal(document)?.parts)
}

pub(crate) fn marshal(document: &mut Document) -> Result<MarshalledParts> {
    if document.sheets.is_empty() {
        return Err(XlstreamError::EmptyWorkbook);
    }

    let mut shared_strings = SharedStringTable::new();
    let mut sheet_parts = Vec::with_capacity(document.sheets.len());
    let mut col_xfs = Vec::with_capacity(document.sheets.len());
    for (idx, sheet) in document.sheets.iter_mut().enumerate() {
        sheet.sync_bounds();
        let written = sheet_writer::write_sheet_xml(sheet, &mut shared_strings, &mut document.styles)?;
        sheet_parts.push((templates::sheet_part_name(idx + 1), written.xml));
        col_xfs.push(written.col_xfs);
    }

    let names: Vec<&str> = document.sheets.iter().map(|s| s.name.as_str()).collect();
    let count = names.len();
    let mut parts = vec![
        ("[Content_Types].xml".to_string(), templates::content_types(count)),
        ("_rels/.rels".to_string(), templates::root_rels()),
        ("docProps/app.xml".to_string(), templates::app_xml(&names)),
        ("docProps/core.xml".to_string(), templates::core_xml()),
        (
            "xl/workbook.xml".to_string(),
            templates::workbook_xml(&document.sheets, document.date1904, &document.defined_names),
        ),
        ("xl/_rels/workbook.xml.rels".to_string(), templates::workbook_rels(count)),
        ("xl/theme/theme1.xml".to_string(), templates::theme_xml()),
        ("xl/styles.xml".to_string(), document.styles.to_xml()),
        ("xl/sharedStrings.xml".to_string(), shared_strings.to_xml()),
    ];
    parts.extend(sheet_parts);

    log::debug!(
        "marshalled {count} sheets, {} shared strings, {} cell formats",
        shared_strings.len(),
        document.styles.cell_xfs().len()
    );
    document.shared_strings = shared_strings;
    Ok(MarshalledParts { parts, col_xfs })
}

pub(crate) fn file_options(compression: Compression) -> FileOptions {
    FileOptions::default().compression_method(compression.method())
}

/// Encode `document` as XLSX bytes.
pub fn encode(document: &mut Document) -> Result<Vec<u8>> {
    let cursor = document.write_to(Cursor::new(Vec::new()))?;
    Ok(cursor.into_inner())
}

impl Document {
    /// Write the workbook as an XLSX archive into `writer` and hand it back.
    pub fn write_to<W: Write + Seek>(&mut self, writer: W) -> Result<W> {
        let marshalled = marshal(self)?;
        let mut zip = ZipWriter::new(writer);
        let options = file_options(Compression::Deflated);
        for (name, data) in &marshalled.parts {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data.as_bytes())?;
        }
        Ok(zip.finish()?)
    }

    /// Write the workbook to `path`, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        let mut writer = self.write_to(std::io::BufWriter::new(file))?;
        writer.flush()?;
        Ok(())
    }
}
