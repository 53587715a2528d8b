//! Common test utilities and assertion helpers.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use std::io::{Cursor, Read};

use xlstream::{decode, Cell, Document, RowLimit};

// Re-export fixtures for convenience
pub use super::fixtures::*;

/// Decode without a row limit, panicking on failure.
pub fn decode_all(data: &[u8]) -> Document {
    decode(data, RowLimit::Unlimited).expect("decode failed")
}

/// The cell at zero-based `(row, col)` of sheet `sheet`.
pub fn cell(document: &Document, sheet: usize, row: usize, col: usize) -> &Cell {
    &document.sheets[sheet].rows[row].cells[col]
}

/// Formatted text of a cell, falling back to the raw value on error.
pub fn text(document: &Document, sheet: usize, row: usize, col: usize) -> String {
    cell(document, sheet, row, col).to_string()
}

/// Read one archive member as text.
pub fn read_member(archive_bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(archive_bytes)).expect("not a zip");
    let mut file = archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("missing member {name}"));
    let mut out = String::new();
    file.read_to_string(&mut out).unwrap();
    out
}

/// Every member name in archive order.
pub fn member_names(archive_bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(archive_bytes)).expect("not a zip");
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}
