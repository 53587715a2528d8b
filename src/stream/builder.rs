use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use zip::ZipWriter;

use super::writer::StreamFile;
use super::{SheetTemplate, END_SHEET_DATA, SHEET_PATH_PREFIX, SHEET_PATH_SUFFIX};
use crate::error::{Result, XlstreamError};
use crate::export::{file_options, marshal};
use crate::options::StreamOptions;
use crate::types::{CellType, Document, Style};

/// Collects sheet declarations for a [`StreamFile`].
///
/// Once [`build`](Self::build) has been called, or a declaration has failed,
/// every further call returns [`XlstreamError::BuilderAlreadyBuilt`].
pub struct StreamFileBuilder<W: Write + Seek> {
    built: bool,
    document: Document,
    zip: Option<ZipWriter<W>>,
    options: StreamOptions,
    column_counts: Vec<usize>,
    style_ids: Vec<Vec<usize>>,
}

impl<W: Write + Seek> StreamFileBuilder<W> {
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, StreamOptions::default())
    }

    pub fn with_options(writer: W, options: StreamOptions) -> Self {
        Self {
            built: false,
            document: Document::new(),
            zip: Some(ZipWriter::new(writer)),
            options,
            column_counts: Vec::new(),
            style_ids: Vec::new(),
        }
    }

    /// Declare a sheet with its header row.
    ///
    /// Every row later written to the sheet must have as many cells as
    /// `headers`. `cell_types` may be shorter than `headers`; a typed column
    /// gets the number format of its type.
    pub fn add_sheet(
        &mut self,
        name: &str,
        headers: &[&str],
        cell_types: &[Option<CellType>],
    ) -> Result<()> {
        if self.built {
            return Err(XlstreamError::BuilderAlreadyBuilt);
        }
        if cell_types.len() > headers.len() {
            return Err(XlstreamError::CellTypesLongerThanHeaders);
        }
        let sheet = match self.document.add_sheet(name) {
            Ok(sheet) => sheet,
            Err(e) => {
                self.built = true;
                return Err(e);
            }
        };

        let row = sheet.add_row();
        for header in headers {
            row.add_cell().set_string(header);
        }
        for idx in 0..headers.len() {
            sheet.col(idx);
        }
        let mut formats = Vec::with_capacity(cell_types.len());
        for (idx, cell_type) in cell_types.iter().enumerate() {
            if let Some(cell_type) = cell_type {
                let col = sheet.col(idx);
                col.set_type(*cell_type);
                formats.push(Some(col.num_fmt().to_string()));
            } else {
                formats.push(None);
            }
        }

        // Same format, same cell format index: the registry deduplicates.
        let styles = &mut self.document.styles;
        let style_ids = formats
            .iter()
            .map(|format| match format {
                Some(code) => {
                    let num_fmt_id = styles.add_number_format(code);
                    styles.add_style(&Style::default(), num_fmt_id)
                }
                None => 0,
            })
            .collect();

        self.column_counts.push(headers.len());
        self.style_ids.push(style_ids);
        Ok(())
    }

    /// Write the package metadata and open the first sheet for rows.
    pub fn build(&mut self) -> Result<StreamFile<W>> {
        if self.built {
            return Err(XlstreamError::BuilderAlreadyBuilt);
        }
        self.built = true;
        let mut zip = self.zip.take().ok_or(XlstreamError::BuilderAlreadyBuilt)?;

        let marshalled = marshal(&mut self.document)?;
        let mut templates = vec![SheetTemplate::default(); self.document.sheets.len()];
        let options = file_options(self.options.compression);
        for (path, data) in &marshalled.parts {
            // Sheets are written later, as their rows arrive.
            if path.starts_with(SHEET_PATH_PREFIX) {
                let idx = sheet_index(path, templates.len())?;
                let (prefix, suffix) = split_sheet_xml(data)?;
                if let Some(template) = templates.get_mut(idx) {
                    template.prefix = prefix;
                    template.suffix = suffix;
                }
                continue;
            }
            zip.start_file(path.as_str(), options)?;
            zip.write_all(data.as_bytes())?;
        }

        for (idx, template) in templates.iter_mut().enumerate() {
            template.column_count = self.column_counts.get(idx).copied().unwrap_or(0);
            template.style_ids = self.style_ids.get(idx).cloned().unwrap_or_default();
        }
        log::debug!("stream file built with {} sheets", templates.len());

        let mut file = StreamFile::new(zip, templates, self.options.clone());
        file.next_sheet()?;
        Ok(file)
    }
}

impl StreamFileBuilder<BufWriter<File>> {
    /// A builder writing to `path`, which is created or truncated.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

/// Zero-based sheet position from a member name like `xl/worksheets/sheet3.xml`.
fn sheet_index(path: &str, sheet_count: usize) -> Result<usize> {
    let number: usize = path
        .strip_prefix(SHEET_PATH_PREFIX)
        .and_then(|rest| rest.strip_suffix(SHEET_PATH_SUFFIX))
        .and_then(|n| n.parse().ok())
        .ok_or(XlstreamError::UnexpectedSheetXml("unexpected sheet file name"))?;
    if number < 1 || number > sheet_count {
        return Err(XlstreamError::UnexpectedSheetXml("unexpected sheet index"));
    }
    Ok(number - 1)
}

/// Split an empty worksheet around `</sheetData>`, dropping its dimension.
///
/// The dimension would be wrong once more rows are streamed in; a missing
/// dimension is valid.
fn split_sheet_xml(data: &str) -> Result<(String, String)> {
    let start = data
        .find("<dimension ")
        .ok_or(XlstreamError::UnexpectedSheetXml("dimension tag not found"))?;
    let len = data
        .get(start..)
        .and_then(|rest| rest.find("/>"))
        .ok_or(XlstreamError::UnexpectedSheetXml("dimension tag not found"))?;
    let without = format!(
        "{}{}",
        data.get(..start).unwrap_or_default(),
        data.get(start + len + 2..).unwrap_or_default()
    );

    let mut parts = without.split(END_SHEET_DATA);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(prefix), Some(suffix), None) => Ok((prefix.to_string(), suffix.to_string())),
        _ => Err(XlstreamError::UnexpectedSheetXml("sheetData close tag not found")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn builder() -> StreamFileBuilder<Cursor<Vec<u8>>> {
        StreamFileBuilder::new(Cursor::new(Vec::new()))
    }

    #[test]
    fn test_split_sheet_xml() {
        let xml = r#"<worksheet><dimension ref="A1:B1"/><sheetData><row r="1"/></sheetData><pageMargins/></worksheet>"#;
        let (prefix, suffix) = split_sheet_xml(xml).unwrap();
        assert_eq!(prefix, r#"<worksheet><sheetData><row r="1"/>"#);
        assert_eq!(suffix, "<pageMargins/></worksheet>");

        assert!(matches!(
            split_sheet_xml("<worksheet><sheetData></sheetData></worksheet>"),
            Err(XlstreamError::UnexpectedSheetXml(_))
        ));
    }

    #[test]
    fn test_sheet_index() {
        assert_eq!(sheet_index("xl/worksheets/sheet2.xml", 2).unwrap(), 1);
        assert!(sheet_index("xl/worksheets/sheet3.xml", 2).is_err());
        assert!(sheet_index("xl/worksheets/sheetX.xml", 2).is_err());
    }

    #[test]
    fn test_cell_types_longer_than_headers() {
        let mut builder = builder();
        let result = builder.add_sheet("Data", &["a"], &[None, Some(CellType::Numeric)]);
        assert!(matches!(result, Err(XlstreamError::CellTypesLongerThanHeaders)));
        // not a fatal declaration error
        assert!(builder.add_sheet("Data", &["a"], &[]).is_ok());
    }

    #[test]
    fn test_duplicate_sheet_freezes_builder() {
        let mut builder = builder();
        builder.add_sheet("Data", &["a"], &[]).unwrap();
        assert!(matches!(
            builder.add_sheet("Data", &["a"], &[]),
            Err(XlstreamError::DuplicateSheetName(_))
        ));
        assert!(matches!(
            builder.add_sheet("Other", &["a"], &[]),
            Err(XlstreamError::BuilderAlreadyBuilt)
        ));
        assert!(matches!(builder.build(), Err(XlstreamError::BuilderAlreadyBuilt)));
    }

    #[test]
    fn test_typed_columns_share_style_ids() {
        let mut builder = builder();
        builder
            .add_sheet(
                "Data",
                &["a", "b", "c"],
                &[Some(CellType::Numeric), None, Some(CellType::Numeric)],
            )
            .unwrap();
        builder
            .add_sheet("More", &["a"], &[Some(CellType::String)])
            .unwrap();
        let numeric = builder.style_ids[0][0];
        assert_ne!(numeric, 0);
        assert_eq!(builder.style_ids[0][1], 0);
        assert_eq!(builder.style_ids[0][2], numeric);
        assert_ne!(builder.style_ids[1][0], numeric);
    }

    #[test]
    fn test_build_twice_fails() {
        let mut builder = builder();
        builder.add_sheet("Data", &["a"], &[]).unwrap();
        assert!(builder.build().is_ok());
        assert!(matches!(builder.build(), Err(XlstreamError::BuilderAlreadyBuilt)));
        assert!(matches!(
            builder.add_sheet("More", &["a"], &[]),
            Err(XlstreamError::BuilderAlreadyBuilt)
        ));
    }
}
