//! Streaming XLSX writer.
//!
//! A [`StreamFileBuilder`] collects sheet declarations (name, header row and
//! optional per-column cell types) and, on [`build`](StreamFileBuilder::build),
//! writes every metadata part of the package up front. The returned
//! [`StreamFile`] then appends rows straight into the compressed worksheet
//! member, one sheet at a time and in declaration order, so memory use does
//! not grow with the number of rows.
//!
//! ```no_run
//! use xlstream::stream::StreamFileBuilder;
//!
//! # fn main() -> xlstream::Result<()> {
//! let mut builder = StreamFileBuilder::create("out.xlsx")?;
//! builder.add_sheet("People", &["Name", "Age"], &[])?;
//! let mut file = builder.build()?;
//! file.write(&["Ann", "30"])?;
//! file.close()?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod writer;

pub use builder::StreamFileBuilder;
pub use writer::StreamFile;

/// Member name prefix shared by every worksheet part.
const SHEET_PATH_PREFIX: &str = "xl/worksheets/sheet";
const SHEET_PATH_SUFFIX: &str = ".xml";
const END_SHEET_DATA: &str = "</sheetData>";

/// The parts of one worksheet around its row data.
#[derive(Debug, Clone, Default)]
struct SheetTemplate {
    /// Everything up to and including the header row.
    prefix: String,
    /// Everything after `</sheetData>`.
    suffix: String,
    column_count: usize,
    /// Cell format per column, 0 for the default format.
    style_ids: Vec<usize>,
}
