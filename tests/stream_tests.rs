//! Streaming writer tests for xlstream
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;
mod fixtures;

use std::io::Cursor;

use common::*;
use xlstream::csv::{read_records, stream_records, Delimiter};
use xlstream::{CellType, Compression, StreamFileBuilder, StreamOptions, XlstreamError};

type Sink = Cursor<Vec<u8>>;

fn builder() -> StreamFileBuilder<Sink> {
    StreamFileBuilder::new(Cursor::new(Vec::new()))
}

#[test]
fn test_header_and_rows() {
    let mut builder = builder();
    builder
        .add_sheet("People", &["Name", "Age", "City"], &[])
        .unwrap();
    let mut file = builder.build().unwrap();
    file.write(&["Ann", "30", "Oslo"]).unwrap();
    file.write(&["Bo & Co", "41", "<Rome>"]).unwrap();
    let bytes = file.close().unwrap().into_inner();

    let document = decode_all(&bytes);
    assert_eq!(
        document.to_slice().unwrap(),
        vec![vec![
            vec!["Name", "Age", "City"],
            vec!["Ann", "30", "Oslo"],
            vec!["Bo & Co", "41", "<Rome>"],
        ]]
    );
    assert_eq!(cell(&document, 0, 1, 0).cell_type(), CellType::Inline);

    let xml = read_member(&bytes, "xl/worksheets/sheet1.xml");
    assert!(!xml.contains("<dimension"));
    assert!(xml.contains(r#"<row r="3"><c r="A3" t="inlineStr"><is><t>Bo &amp; Co</t></is></c>"#));
    assert!(xml.ends_with("</worksheet>"));
}

#[test]
fn test_wrong_cell_count_latches() {
    let mut builder = builder();
    builder.add_sheet("Sheet1", &["a", "b", "c"], &[]).unwrap();
    let mut file = builder.build().unwrap();

    assert!(matches!(
        file.write(&["1", "2"]),
        Err(XlstreamError::WrongCellCount)
    ));
    // The correctly sized row is refused too once the file has failed.
    assert!(matches!(
        file.write(&["1", "2", "3"]),
        Err(XlstreamError::WrongCellCount)
    ));
    assert!(matches!(file.error(), Some(XlstreamError::WrongCellCount)));
    assert!(matches!(file.next_sheet(), Err(XlstreamError::WrongCellCount)));
    assert!(matches!(file.close(), Err(XlstreamError::WrongCellCount)));
}

#[test]
fn test_next_sheet_past_last() {
    let mut builder = builder();
    builder.add_sheet("One", &["x"], &[]).unwrap();
    builder.add_sheet("Two", &["y"], &[]).unwrap();
    let mut file = builder.build().unwrap();

    file.write(&["1"]).unwrap();
    file.next_sheet().unwrap();
    file.write(&["2"]).unwrap();
    assert!(matches!(
        file.next_sheet(),
        Err(XlstreamError::AlreadyOnLastSheet)
    ));
    assert!(file.write(&["3"]).is_err());
}

#[test]
fn test_close_finishes_unvisited_sheets() {
    let mut builder = builder();
    builder.add_sheet("First", &["x"], &[]).unwrap();
    builder.add_sheet("Second", &["y", "z"], &[]).unwrap();
    builder.add_sheet("Third", &["w"], &[]).unwrap();
    let mut file = builder.build().unwrap();
    file.write(&["1"]).unwrap();
    let bytes = file.close().unwrap().into_inner();

    let document = decode_all(&bytes);
    let names: Vec<&str> = document.sheets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["First", "Second", "Third"]);
    assert_eq!(document.sheets[0].rows.len(), 2);
    assert_eq!(document.sheets[1].rows.len(), 1);
    assert_eq!(text(&document, 1, 0, 1), "z");
    assert_eq!(text(&document, 2, 0, 0), "w");
}

#[test]
fn test_typed_column_style() {
    let mut builder = builder();
    builder
        .add_sheet("Typed", &["Name", "Amount"], &[None, Some(CellType::Numeric)])
        .unwrap();
    let mut file = builder.build().unwrap();
    file.write(&["Ann", "12"]).unwrap();
    let bytes = file.close().unwrap().into_inner();

    let xml = read_member(&bytes, "xl/worksheets/sheet1.xml");
    assert!(xml.contains(r#"<c r="A2" t="inlineStr"><is>"#));
    let amount = xml
        .split(r#"<c r="B2" t="inlineStr" s=""#)
        .nth(1)
        .expect("typed cell carries a style");
    let style_id: usize = amount.split('"').next().unwrap().parse().unwrap();
    assert!(style_id > 0);

    let document = decode_all(&bytes);
    assert_eq!(cell(&document, 0, 1, 1).num_fmt(), "0");
    assert_eq!(text(&document, 0, 1, 1), "12");
}

#[test]
fn test_builder_usage_errors() {
    let mut builder = builder();
    assert!(matches!(
        builder.add_sheet("Sheet1", &["a"], &[None, None]),
        Err(XlstreamError::CellTypesLongerThanHeaders)
    ));
    builder.add_sheet("Sheet1", &["a"], &[]).unwrap();
    assert!(matches!(
        builder.add_sheet("Sheet1", &["b"], &[]),
        Err(XlstreamError::DuplicateSheetName(_))
    ));
    assert!(matches!(
        builder.add_sheet("Sheet2", &["b"], &[]),
        Err(XlstreamError::BuilderAlreadyBuilt)
    ));
    assert!(matches!(builder.build(), Err(XlstreamError::BuilderAlreadyBuilt)));
}

#[test]
fn test_build_without_sheets() {
    let mut builder = builder();
    assert!(matches!(builder.build(), Err(XlstreamError::EmptyWorkbook)));
}

#[test]
fn test_stored_compression_without_row_flush() {
    let options = StreamOptions {
        compression: Compression::Stored,
        flush_every_row: false,
    };
    let mut builder = StreamFileBuilder::with_options(Cursor::new(Vec::new()), options);
    builder.add_sheet("Sheet1", &["n"], &[]).unwrap();
    let mut file = builder.build().unwrap();
    let records: Vec<Vec<String>> = (1..=50).map(|n| vec![n.to_string()]).collect();
    file.write_all(&records).unwrap();
    let bytes = file.close().unwrap().into_inner();

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
    let sheet = archive.by_name("xl/worksheets/sheet1.xml").unwrap();
    assert_eq!(sheet.compression(), zip::CompressionMethod::Stored);
    drop(sheet);

    let document = decode_all(&bytes);
    assert_eq!(document.sheets[0].rows.len(), 51);
    assert_eq!(text(&document, 0, 50, 0), "50");
}

#[test]
fn test_stream_options_from_json() {
    let options = StreamOptions::from_json(r#"{"compression":"stored"}"#).unwrap();
    assert_eq!(options.compression, Compression::Stored);
    assert!(options.flush_every_row);
}

#[test]
fn test_create_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("streamed.xlsx");
    let mut builder = StreamFileBuilder::create(&path).unwrap();
    builder.add_sheet("Sheet1", &["a", "b"], &[]).unwrap();
    let mut file = builder.build().unwrap();
    file.write(&["1", "2"]).unwrap();
    let mut writer = file.close().unwrap();
    std::io::Write::flush(&mut writer).unwrap();
    drop(writer);

    let document = xlstream::Document::open(&path).unwrap();
    assert_eq!(text(&document, 0, 1, 1), "2");
}

#[test]
fn test_csv_to_stream() {
    let data = b"name,score\nann,1.5\nbo,2\n";
    let records = read_records(data, Delimiter::Comma);
    let bytes = stream_records(&records, "Scores", Cursor::new(Vec::new()))
        .unwrap()
        .into_inner();

    let document = decode_all(&bytes);
    assert_eq!(document.sheets[0].name, "Scores");
    assert_eq!(document.sheets[0].rows.len(), 3);
    assert_eq!(text(&document, 0, 2, 1), "2");
}

#[test]
fn test_csv_multiline_field_streams_as_one_cell() {
    let data = b"name,address\nann,\"1 Main St\nSpringfield\"\nbo,\"2 Side St\"\n";
    let records = read_records(data, Delimiter::Comma);
    let bytes = stream_records(&records, "People", Cursor::new(Vec::new()))
        .unwrap()
        .into_inner();

    let document = decode_all(&bytes);
    assert_eq!(document.sheets[0].rows.len(), 3);
    assert_eq!(text(&document, 0, 1, 1), "1 Main St\nSpringfield");
    assert_eq!(text(&document, 0, 2, 0), "bo");
}
