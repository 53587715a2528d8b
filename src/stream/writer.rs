use std::io::{Seek, Write};

use zip::ZipWriter;

use super::{SheetTemplate, END_SHEET_DATA};
use crate::cell_ref::id_from_coords;
use crate::error::{Result, XlstreamError};
use crate::export::file_options;
use crate::export::templates::sheet_part_name;
use crate::options::StreamOptions;
use crate::xml_helpers::xml_escape;

/// The sheet rows are currently written to.
#[derive(Debug)]
struct StreamSheet {
    /// 1-based sheet number.
    index: usize,
    /// Rows in the sheet so far, header included.
    row_count: usize,
}

/// Writes rows into a streamed XLSX archive.
///
/// Rows go to the current sheet, starting with the first declared one.
/// After any failure the file is latched: every later call returns the
/// same error without touching the archive.
pub struct StreamFile<W: Write + Seek> {
    zip: ZipWriter<W>,
    sheets: Vec<SheetTemplate>,
    current: Option<StreamSheet>,
    options: StreamOptions,
    err: Option<XlstreamError>,
    rows_written: usize,
    row_buf: String,
}

impl<W: Write + Seek> StreamFile<W> {
    pub(super) fn new(zip: ZipWriter<W>, sheets: Vec<SheetTemplate>, options: StreamOptions) -> Self {
        Self {
            zip,
            sheets,
            current: None,
            options,
            err: None,
            rows_written: 0,
            row_buf: String::with_capacity(256),
        }
    }

    /// Append one row to the current sheet.
    ///
    /// `cells` must have exactly as many values as the sheet's header.
    pub fn write(&mut self, cells: &[&str]) -> Result<()> {
        self.check()?;
        let result = self.write_row(cells).and_then(|()| {
            if self.options.flush_every_row {
                self.zip.flush()?;
            }
            Ok(())
        });
        self.latch(result)
    }

    /// Append several rows, flushing once at the end.
    pub fn write_all(&mut self, records: &[Vec<String>]) -> Result<()> {
        self.check()?;
        for record in records {
            let cells: Vec<&str> = record.iter().map(String::as_str).collect();
            let result = self.write_row(&cells);
            self.latch(result)?;
        }
        let result = self.zip.flush().map_err(XlstreamError::from);
        self.latch(result)
    }

    /// Flush buffered compressed data to the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.check()?;
        let result = self.zip.flush().map_err(XlstreamError::from);
        self.latch(result)
    }

    /// The error that latched this file, if any.
    pub fn error(&self) -> Option<&XlstreamError> {
        self.err.as_ref()
    }

    /// Finish the current sheet and move to the next declared one.
    ///
    /// Sheets can only be visited once, in declaration order.
    pub fn next_sheet(&mut self) -> Result<()> {
        self.check()?;
        let result = self.advance();
        self.latch(result)
    }

    /// Finish the archive and return the underlying writer.
    ///
    /// Declared sheets that were never reached are written with their
    /// header row only.
    pub fn close(mut self) -> Result<W> {
        self.check()?;
        if let Some(index) = self.current.as_ref().map(|s| s.index) {
            for _ in index..self.sheets.len() {
                self.advance()?;
            }
            self.write_sheet_end()?;
        }
        log::debug!(
            "stream file closed after {} rows in {} sheets",
            self.rows_written,
            self.sheets.len()
        );
        Ok(self.zip.finish()?)
    }

    fn check(&self) -> Result<()> {
        match &self.err {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn latch(&mut self, result: Result<()>) -> Result<()> {
        if let Err(e) = &result {
            self.err = Some(e.clone());
        }
        result
    }

    fn advance(&mut self) -> Result<()> {
        let next = match self.current.as_ref().map(|sheet| sheet.index) {
            Some(index) if index >= self.sheets.len() => {
                return Err(XlstreamError::AlreadyOnLastSheet);
            }
            Some(index) => {
                if let Err(e) = self.write_sheet_end() {
                    self.current = None;
                    return Err(e);
                }
                index + 1
            }
            None => 1,
        };

        self.current = Some(StreamSheet {
            index: next,
            row_count: 1,
        });
        let options = file_options(self.options.compression);
        self.zip.start_file(sheet_part_name(next), options)?;
        self.write_sheet_start()
    }

    /// Zero-based position of the current sheet.
    fn slot(&self) -> Result<usize> {
        self.current
            .as_ref()
            .map(|sheet| sheet.index.saturating_sub(1))
            .ok_or(XlstreamError::NoCurrentSheet)
    }

    fn write_sheet_start(&mut self) -> Result<()> {
        let slot = self.slot()?;
        let template = self.sheets.get(slot).ok_or(XlstreamError::NoCurrentSheet)?;
        self.zip.write_all(template.prefix.as_bytes())?;
        Ok(())
    }

    fn write_sheet_end(&mut self) -> Result<()> {
        let slot = self.slot()?;
        let template = self.sheets.get(slot).ok_or(XlstreamError::NoCurrentSheet)?;
        self.zip.write_all(END_SHEET_DATA.as_bytes())?;
        self.zip.write_all(template.suffix.as_bytes())?;
        Ok(())
    }

    fn write_row(&mut self, cells: &[&str]) -> Result<()> {
        let current = self.current.as_mut().ok_or(XlstreamError::NoCurrentSheet)?;
        let template = self
            .sheets
            .get(current.index.saturating_sub(1))
            .ok_or(XlstreamError::NoCurrentSheet)?;
        if cells.len() != template.column_count {
            return Err(XlstreamError::WrongCellCount);
        }
        current.row_count += 1;
        let row = current.row_count;

        self.row_buf.clear();
        self.row_buf.push_str(&format!("<row r=\"{row}\">"));
        for (col, value) in cells.iter().enumerate() {
            self.row_buf.push_str(&format!(
                "<c r=\"{}\" t=\"inlineStr\"",
                id_from_coords(col, row - 1)
            ));
            let style = template.style_ids.get(col).copied().unwrap_or(0);
            if style != 0 {
                self.row_buf.push_str(&format!(" s=\"{style}\""));
            }
            self.row_buf.push_str("><is><t>");
            self.row_buf.push_str(&xml_escape(value));
            self.row_buf.push_str("</t></is></c>");
        }
        self.row_buf.push_str("</row>");

        self.zip.write_all(self.row_buf.as_bytes())?;
        self.rows_written += 1;
        Ok(())
    }
}
