//! Minimal CSV/TSV reader feeding the streaming writer.
//!
//! The first record is the header row. A column whose values all parse as
//! numbers is declared numeric; every other column stays untyped text.

use std::io::{Seek, Write};
use std::path::Path;

use crate::error::Result;
use crate::stream::StreamFileBuilder;
use crate::types::CellType;

/// Field separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    /// Tab for `.tsv` and `.tab` files, comma otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("tab") => {
                Self::Tab
            }
            _ => Self::Comma,
        }
    }

    fn as_char(self) -> char {
        match self {
            Self::Comma => ',',
            Self::Tab => '\t',
        }
    }
}

/// Split delimited text into records, skipping blank lines.
///
/// Quoted fields may hold separators, doubled quotes and line breaks.
pub fn read_records(data: &[u8], delim: Delimiter) -> Vec<Vec<String>> {
    let text = String::from_utf8_lossy(data);
    let sep = delim.as_char();
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    // Whitespace-only lines do not count as records.
    let mut blank = true;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
            continue;
        }
        match ch {
            '"' => {
                in_quotes = true;
                blank = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                if blank {
                    record.clear();
                } else {
                    records.push(std::mem::take(&mut record));
                }
                blank = true;
            }
            c if c == sep => {
                record.push(std::mem::take(&mut field));
                blank &= sep.is_whitespace();
            }
            c => {
                blank &= c.is_whitespace();
                field.push(c);
            }
        }
    }
    if !blank {
        record.push(field);
        records.push(record);
    }
    records
}

/// Numeric for columns whose non-empty data values all parse as numbers.
pub fn infer_column_types(records: &[Vec<String>]) -> Vec<Option<CellType>> {
    let Some((header, data)) = records.split_first() else {
        return Vec::new();
    };
    (0..header.len())
        .map(|col| {
            let mut values = data
                .iter()
                .filter_map(|record| record.get(col))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .peekable();
            let has_values = values.peek().is_some();
            let numeric = values.all(|v| v.parse::<f64>().is_ok());
            (has_values && numeric).then_some(CellType::Numeric)
        })
        .collect()
}

/// Stream `records` as a single-sheet workbook into `writer`.
///
/// Short records are padded with empty cells to the header width.
pub fn stream_records<W: Write + Seek>(
    records: &[Vec<String>],
    sheet_name: &str,
    writer: W,
) -> Result<W> {
    let mut builder = StreamFileBuilder::new(writer);
    let (header, data) = records.split_first().map_or((&[][..], &[][..]), |(h, d)| (h.as_slice(), d));
    let headers: Vec<&str> = header.iter().map(String::as_str).collect();
    builder.add_sheet(sheet_name, &headers, &infer_column_types(records))?;

    let mut file = builder.build()?;
    let mut cells: Vec<&str> = Vec::with_capacity(headers.len());
    for record in data {
        cells.clear();
        cells.extend(record.iter().map(String::as_str));
        if cells.len() < headers.len() {
            cells.resize(headers.len(), "");
        }
        file.write(&cells)?;
    }
    file.close()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_records_basic() {
        let records = read_records(b"Name,Age\nAlice,30\n\nBob,25", Delimiter::Comma);
        assert_eq!(records.len(), 3);
        assert_eq!(records[1], vec!["Alice", "30"]);
    }

    #[test]
    fn test_quoted_fields() {
        let records = read_records(b"\"Hello, World\",42\n\"She said \"\"hi\"\"\",0", Delimiter::Comma);
        assert_eq!(records[0][0], "Hello, World");
        assert_eq!(records[1][0], "She said \"hi\"");
    }

    #[test]
    fn test_quoted_line_breaks_stay_in_field() {
        let records = read_records(
            b"id,note\r\n1,\"first line\r\nsecond, line\"\r\n2,\"\"\"x\"\"\ny\"\r\n",
            Delimiter::Comma,
        );
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], vec!["id", "note"]);
        assert_eq!(records[1], vec!["1", "first line\r\nsecond, line"]);
        assert_eq!(records[2], vec!["2", "\"x\"\ny"]);
    }

    #[test]
    fn test_blank_and_whitespace_lines_skipped() {
        let records = read_records(b"a,b\n   \n\n1,2\n", Delimiter::Comma);
        assert_eq!(records, vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn test_tab_delimiter_from_path() {
        assert_eq!(Delimiter::from_path(Path::new("data.TSV")), Delimiter::Tab);
        assert_eq!(Delimiter::from_path(Path::new("data.csv")), Delimiter::Comma);
        let records = read_records(b"A\tB\n1\t2", Delimiter::Tab);
        assert_eq!(records[1], vec!["1", "2"]);
    }

    #[test]
    fn test_infer_column_types() {
        let records = read_records(b"name,age,note\nAnn,30,\nBob,4.5,", Delimiter::Comma);
        assert_eq!(
            infer_column_types(&records),
            vec![None, Some(CellType::Numeric), None]
        );
        assert!(infer_column_types(&[]).is_empty());
    }

    #[test]
    fn test_stream_records_pads_short_rows() {
        let records = read_records(b"a,b\n1\n2,3", Delimiter::Comma);
        let out = stream_records(&records, "Data", Cursor::new(Vec::new())).unwrap();
        let document = crate::decode(out.get_ref(), crate::RowLimit::Unlimited).unwrap();
        let sheet = &document.sheets[0];
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.rows[1].cells[0].value(), "1");
        assert_eq!(sheet.rows[1].cells[1].value(), "");
        assert_eq!(sheet.rows[2].cells[1].value(), "3");
    }
}
