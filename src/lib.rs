//! xlstream - XLSX reading, writing and streaming
//!
//! - Decode an XLSX archive into an in-memory [`Document`], optionally
//!   limited to the first rows of every sheet
//! - Render cell values through Excel number format codes
//! - Encode a [`Document`] back into an archive
//! - Stream rows into a new archive without holding them in memory
//!
//! # Usage
//!
//! ```no_run
//! use xlstream::{decode, encode, Document, RowLimit};
//!
//! # fn main() -> xlstream::Result<()> {
//! let mut document = Document::new();
//! let sheet = document.add_sheet("Sheet1")?;
//! sheet.cell(0, 0).set_string("Total");
//! sheet.cell(0, 1).set_float_with_format(0.25, "0.00%");
//!
//! let bytes = encode(&mut document)?;
//! let read_back = decode(&bytes, RowLimit::Unlimited)?;
//! let cell = &read_back.sheets[0].rows[0].cells[1];
//! assert_eq!(cell.formatted_value().unwrap_or_default(), "25.00%");
//! # Ok(())
//! # }
//! ```

pub mod cell_ref;
pub mod color;
pub mod csv;
pub mod dates;
pub mod error;
pub mod export;
pub mod numfmt;
pub mod options;
pub mod parser;
pub mod shared_strings;
pub mod stream;
pub mod styles;
pub mod theme;
pub mod types;
pub mod xml_helpers;

pub use error::{FormatFailure, Result, XlstreamError};
pub use export::{encode, marshal_parts};
pub use options::{Compression, DecodeOptions, RowLimit, StreamOptions};
pub use parser::{decode, decode_with_options, open_file};
pub use stream::{StreamFile, StreamFileBuilder};
pub use types::*;

/// Get the library version
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
