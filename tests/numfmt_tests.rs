//! Number format tests through the public cell API.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use test_case::test_case;
use xlstream::numfmt::parse_number_format;
use xlstream::{Cell, CellType, XlstreamError};

fn formatted(value: f64, code: &str) -> String {
    let mut cell = Cell::new();
    cell.set_float_with_format(value, code);
    cell.formatted_value().unwrap()
}

#[test_case(3.14159, "0.00", "3.14" ; "two decimals")]
#[test_case(-5.0, "0", "-5" ; "negative integer")]
#[test_case(0.5, "0.00%", "50.00%" ; "percent")]
#[test_case(1234.5, "#,##0.00", "1234.50" ; "thousands separator not rendered")]
#[test_case(7.0, "#,##0", "7" ; "small thousands")]
fn test_common_codes(value: f64, code: &str, expected: &str) {
    assert_eq!(formatted(value, code), expected);
}

#[test_case("100000000000", "1E+11" ; "large is scientific")]
#[test_case("99000000000", "99000000000" ; "below threshold is fixed")]
#[test_case("0.0000000001", "1E-10" ; "tiny is scientific")]
#[test_case("0", "0" ; "zero")]
#[test_case("0.1234567890123", "0.1234567890123" ; "may exceed eleven characters")]
fn test_general_threshold(value: &str, expected: &str) {
    let mut cell = Cell::new();
    cell.set_numeric(value);
    assert_eq!(cell.formatted_value().unwrap(), expected);
}

#[test_case(-2.5, "(2.50)" ; "negative section drops sign")]
#[test_case(3.1, "3.10" ; "positive section")]
fn test_two_sections(value: f64, expected: &str) {
    assert_eq!(formatted(value, "0.00;(0.00)"), expected);
}

#[test]
fn test_text_section_applies_to_strings() {
    let mut cell = Cell::new();
    cell.set_string("abc");
    cell.set_num_fmt("0;0;0;\"<\"@\">\"");
    assert_eq!(cell.formatted_value().unwrap(), "<abc>");
}

#[test]
fn test_bad_code_defers_error_until_formatting() {
    let parsed = parse_number_format("0.00;\"oops");
    assert!(matches!(parsed.deferred_error(), Some(XlstreamError::UnmatchedQuote)));

    let mut cell = Cell::new();
    cell.set_float_with_format(1.5, "0.00;\"oops");
    let failure = cell.formatted_value().unwrap_err();
    assert!(failure.error.is_format_error());
    assert_eq!(failure.text, "1.5");
}

#[test]
fn test_too_many_sections() {
    let parsed = parse_number_format("0;0;0;@;0");
    assert!(matches!(parsed.deferred_error(), Some(XlstreamError::TooManySections)));
}

#[test]
fn test_non_numeric_value_keeps_raw_text() {
    let mut cell = Cell::new();
    cell.set_numeric("n/a");
    let failure = cell.formatted_value().unwrap_err();
    assert_eq!(failure.text, "n/a");
    assert!(!failure.error.is_format_error());
    assert_eq!(cell.to_string(), "n/a");
    assert_eq!(cell.cell_type(), CellType::Numeric);
}

#[test]
fn test_date_format() {
    let mut cell = Cell::new();
    cell.set_date_time_with_format(43831.5, "yyyy-mm-dd hh:mm");
    assert!(cell.is_time());
    assert_eq!(cell.formatted_value().unwrap(), "2020-01-01 12:00");
}
