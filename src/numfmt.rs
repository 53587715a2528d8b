//! Number format parsing and application
//!
//! Excel number format codes are a mini-language. A code is split into up to
//! four `;` separated sections:
//! - `positive;negative;zero;text`
//! - `positive;negative;zero` (text is left alone)
//! - `positive;negative` (zero uses positive, text is left alone)
//! - `positive` (all numbers use it, text only when it contains `@`)
//!
//! Each section is reduced to a literal prefix, a numeric remainder built
//! from formatting tokens and a literal suffix. Only a handful of common
//! remainders are rendered; anything else degrades to the raw value.
//!
//! Parsing never fails. A broken code falls back to `general` and keeps the
//! error so it can be reported when a value is actually formatted.

use std::collections::HashMap;
use std::sync::Arc;

use crate::dates;
use crate::error::{Result, XlstreamError};
use crate::types::{Cell, CellType};

/// The `general` format code as stored on cells.
pub const GENERAL: &str = "general";

/// The text placeholder format code.
pub const TEXT_PLACEHOLDER: &str = "@";

/// Lowest id handed out to custom number formats.
pub const FIRST_CUSTOM_NUM_FMT_ID: u32 = 164;

const MIN_NON_SCIENTIFIC: f64 = 1e-9;
const MAX_NON_SCIENTIFIC: f64 = 1e11;

/// Tokens that make up the numeric remainder of a section. Order matters:
/// the fraction and exponent pairs must win over their single characters.
const FORMATTING_TOKENS: [&str; 14] = [
    "0/", "#/", "?/", "E-", "E+", "e-", "e+", "0", "#", "?", ".", ",", "@", "*",
];

const TIME_TOKENS: [&str; 33] = [
    "m", "d", "yy", "h", "m", "AM/PM", "A/P", "am/pm", "a/p", "r", "g", "e", "b1", "b2", "[hh]",
    "[h]", "[mm]", "[m]", "s.0000", "s.000", "s.00", "s.0", "s", "[ss].0000", "[ss].000",
    "[ss].00", "[ss].0", "[ss]", "[s].0000", "[s].000", "[s].00", "[s].0", "[s]",
];

/// Characters that may appear unescaped as literal text.
const LITERAL_PUNCTUATION: &str = "$-+/():!^&'~{}<>= ";

/// Built-in number format IDs (0-49 are predefined by Excel)
/// See: ECMA-376 Part 1, Section 18.8.30
pub const fn builtin_format(id: u32) -> Option<&'static str> {
    match id {
        0 => Some(GENERAL),
        1 => Some("0"),
        2 => Some("0.00"),
        3 => Some("#,##0"),
        4 => Some("#,##0.00"),
        // Currency formats (5-8)
        5 => Some("$#,##0_);($#,##0)"),
        6 => Some("$#,##0_);[red]($#,##0)"),
        7 => Some("$#,##0.00_);($#,##0.00)"),
        8 => Some("$#,##0.00_);[red]($#,##0.00)"),
        9 => Some("0%"),
        10 => Some("0.00%"),
        11 => Some("0.00e+00"),
        12 => Some("# ?/?"),
        13 => Some("# ??/??"),
        14 => Some("mm-dd-yy"),
        15 => Some("d-mmm-yy"),
        16 => Some("d-mmm"),
        17 => Some("mmm-yy"),
        18 => Some("h:mm am/pm"),
        19 => Some("h:mm:ss am/pm"),
        20 => Some("h:mm"),
        21 => Some("h:mm:ss"),
        22 => Some("m/d/yy h:mm"),
        37 => Some("#,##0 ;(#,##0)"),
        38 => Some("#,##0 ;[red](#,##0)"),
        39 => Some("#,##0.00;(#,##0.00)"),
        40 => Some("#,##0.00;[red](#,##0.00)"),
        // Accounting formats (41-44)
        41 => Some("_(* #,##0_);_(* \\(#,##0\\);_(* \"-\"_);_(@_)"),
        42 => Some("_(\"$\"* #,##0_);_(\"$\"* \\(#,##0\\);_(\"$\"* \"-\"_);_(@_)"),
        43 => Some("_(* #,##0.00_);_(* \\(#,##0.00\\);_(* \"-\"??_);_(@_)"),
        44 => Some("_(\"$\"* #,##0.00_);_(\"$\"* \\(#,##0.00\\);_(\"$\"* \"-\"??_);_(@_)"),
        45 => Some("mm:ss"),
        46 => Some("[h]:mm:ss"),
        47 => Some("mmss.0"),
        48 => Some("##0.0e+0"),
        49 => Some(TEXT_PLACEHOLDER),
        _ => None,
    }
}

/// Reverse lookup of [`builtin_format`]. `general` matches case-insensitively.
pub fn builtin_format_id(code: &str) -> Option<u32> {
    if is_general(code) {
        return Some(0);
    }
    (1..=49).find(|&id| builtin_format(id) == Some(code))
}

/// Empty codes and any casing of `general` are the general format.
pub fn is_general(code: &str) -> bool {
    code.is_empty() || code.eq_ignore_ascii_case(GENERAL)
}

/// One parsed `;` section of a format code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// The section as written.
    pub full_format: String,
    /// Formatting tokens left once prefix and suffix literals are removed.
    pub reduced_format: String,
    /// Literal text rendered before the number.
    pub prefix: String,
    /// Literal text rendered after the number.
    pub suffix: String,
    /// The value is multiplied by 100 before rendering.
    pub show_percent: bool,
}

impl FormatOptions {
    fn general() -> Self {
        Self {
            full_format: GENERAL.to_string(),
            reduced_format: GENERAL.to_string(),
            ..Self::default()
        }
    }
}

/// A format code split into per-sign sections.
#[derive(Debug, Clone)]
pub struct ParsedNumberFormat {
    num_fmt: String,
    is_time_format: bool,
    negative_expects_positive: bool,
    positive: FormatOptions,
    negative: FormatOptions,
    zero: FormatOptions,
    text: FormatOptions,
    deferred_error: Option<XlstreamError>,
}

/// Parse a format code. Never fails; see [`ParsedNumberFormat::deferred_error`].
pub fn parse_number_format(num_fmt: &str) -> ParsedNumberFormat {
    if is_time_format(num_fmt) {
        let general = FormatOptions::general();
        return ParsedNumberFormat {
            num_fmt: num_fmt.to_string(),
            is_time_format: true,
            negative_expects_positive: false,
            positive: general.clone(),
            negative: general.clone(),
            zero: general.clone(),
            text: general,
            deferred_error: None,
        };
    }

    let mut deferred_error = None;
    let mut sections = Vec::new();
    match split_on_semicolons(num_fmt) {
        Ok(parts) => {
            for part in parts {
                match parse_section(part) {
                    Ok(options) => sections.push(options),
                    Err(e) => {
                        sections.push(FormatOptions::general());
                        deferred_error = Some(e);
                    }
                }
            }
        }
        Err(e) => {
            sections.push(FormatOptions::general());
            deferred_error = Some(e);
        }
    }
    if sections.len() > 4 {
        sections = vec![FormatOptions::general()];
        deferred_error = Some(XlstreamError::TooManySections);
    }

    let mut sections = sections.into_iter();
    let first = sections.next().unwrap_or_else(FormatOptions::general);
    let (positive, negative, zero, text, negative_expects_positive) =
        match (sections.next(), sections.next(), sections.next()) {
            (None, _, _) => {
                let text = if first.full_format.contains('@') {
                    first.clone()
                } else {
                    FormatOptions::general()
                };
                (first.clone(), first.clone(), first, text, false)
            }
            (Some(negative), None, _) => (
                first.clone(),
                negative,
                first,
                FormatOptions::general(),
                true,
            ),
            (Some(negative), Some(zero), None) => {
                (first, negative, zero, FormatOptions::general(), true)
            }
            (Some(negative), Some(zero), Some(text)) => (first, negative, zero, text, true),
        };

    ParsedNumberFormat {
        num_fmt: num_fmt.to_string(),
        is_time_format: false,
        negative_expects_positive,
        positive,
        negative,
        zero,
        text,
        deferred_error,
    }
}

impl ParsedNumberFormat {
    /// The code this was parsed from.
    pub fn num_fmt(&self) -> &str {
        &self.num_fmt
    }

    pub fn is_time_format(&self) -> bool {
        self.is_time_format
    }

    /// Error recorded while parsing, reported on every format call.
    pub fn deferred_error(&self) -> Option<&XlstreamError> {
        self.deferred_error.as_ref()
    }

    pub fn positive(&self) -> &FormatOptions {
        &self.positive
    }

    pub fn negative(&self) -> &FormatOptions {
        &self.negative
    }

    pub fn zero(&self) -> &FormatOptions {
        &self.zero
    }

    pub fn text(&self) -> &FormatOptions {
        &self.text
    }

    /// Render a cell's stored value.
    ///
    /// The text is always usable. When an error is returned alongside it the
    /// text is the best effort, usually the raw value.
    pub fn format_value(&self, cell: &Cell, date1904: bool) -> (String, Option<XlstreamError>) {
        self.format_raw(cell.cell_type(), cell.value(), date1904)
    }

    /// Same as [`format_value`](Self::format_value) on a bare type and value.
    pub fn format_raw(
        &self,
        cell_type: CellType,
        value: &str,
        date1904: bool,
    ) -> (String, Option<XlstreamError>) {
        let (text, error) = match cell_type {
            CellType::Error | CellType::Date => (value.to_string(), None),
            CellType::Bool => match value {
                "0" => ("FALSE".to_string(), None),
                "1" => ("TRUE".to_string(), None),
                _ => (value.to_string(), Some(XlstreamError::InvalidBool)),
            },
            CellType::String | CellType::Inline | CellType::StringFormula => {
                self.format_text(value)
            }
            CellType::Numeric => self.format_numeric(value, date1904),
        };
        match &self.deferred_error {
            Some(e) => (text, Some(e.clone())),
            None => (text, error),
        }
    }

    fn format_text(&self, value: &str) -> (String, Option<XlstreamError>) {
        let text = &self.text;
        match text.reduced_format.as_str() {
            GENERAL => (value.to_string(), None),
            TEXT_PLACEHOLDER => (format!("{}{value}{}", text.prefix, text.suffix), None),
            "" => (format!("{}{}", text.prefix, text.suffix), None),
            _ => (
                value.to_string(),
                Some(XlstreamError::UnsupportedStringFormat),
            ),
        }
    }

    fn format_numeric(&self, value: &str, date1904: bool) -> (String, Option<XlstreamError>) {
        let raw = value.trim();
        if raw.is_empty() {
            return (String::new(), None);
        }

        let Ok(mut number) = raw.parse::<f64>() else {
            return (
                raw.to_string(),
                Some(XlstreamError::InvalidNumber(raw.to_string())),
            );
        };

        if self.is_time_format {
            return match dates::format_time(number, &self.num_fmt, date1904) {
                Some(text) => (text, None),
                None => (
                    raw.to_string(),
                    Some(XlstreamError::DateOutOfRange(raw.to_string())),
                ),
            };
        }

        // The zero section only applies to an exact zero.
        let options = if number > 0.0 {
            &self.positive
        } else if number < 0.0 {
            if self.negative_expects_positive {
                number = number.abs();
            }
            &self.negative
        } else {
            &self.zero
        };

        if options.show_percent {
            number *= 100.0;
        }

        let formatted = match options.reduced_format.as_str() {
            GENERAL => {
                // prefix, suffix and percent do not apply to general
                return match general_numeric(value, true) {
                    Ok(s) => (s, None),
                    Err(_) => (raw.to_string(), None),
                };
            }
            TEXT_PLACEHOLDER => value.to_string(),
            "0" | "#,##0" => format!("{number:.0}"),
            "0.0" | "#,##0.0" => format!("{number:.1}"),
            "0.00" | "#,##0.00" => format!("{number:.2}"),
            "0.000" | "#,##0.000" => format!("{number:.3}"),
            "0.0000" | "#,##0.0000" => format!("{number:.4}"),
            "0.00e+00" | "##0.0e+0" | "0.00E+00" | "##0.0E+0" => fixed_exponent(number),
            "" => String::new(),
            other => {
                log::trace!("unsupported number format remainder {other:?}, using raw value");
                return (raw.to_string(), None);
            }
        };

        (
            format!("{}{formatted}{}", options.prefix, options.suffix),
            None,
        )
    }
}

/// Render a number the way the `general` format shows it.
///
/// Magnitudes of at least 1e11, or non-zero magnitudes below 1e-9, switch to
/// scientific notation when `allow_scientific` is set. Otherwise the shortest
/// fixed notation is used, which can run past eleven characters.
pub fn general_numeric(value: &str, allow_scientific: bool) -> Result<String> {
    if value.trim().is_empty() {
        return Ok(String::new());
    }
    let number: f64 = value
        .parse()
        .map_err(|_| XlstreamError::InvalidNumber(value.to_string()))?;

    if allow_scientific {
        let magnitude = number.abs();
        if (magnitude > 0.0 && magnitude < MIN_NON_SCIENTIFIC)
            || magnitude >= MAX_NON_SCIENTIFIC
        {
            return Ok(shortest_exponent(number));
        }
    }
    Ok(shortest_fixed(number))
}

/// Shortest fixed-point text for a number, never in exponent form.
pub fn shortest_fixed(number: f64) -> String {
    // Display for f64 is shortest round-trip and never uses an exponent
    format!("{number}")
}

/// `1E+11`, `1.5E-10`: shortest mantissa, signed two-digit exponent.
fn shortest_exponent(number: f64) -> String {
    normalize_exponent(&format!("{number:E}"), 'E')
}

/// `1.234560e+03`: six mantissa decimals, signed two-digit exponent.
fn fixed_exponent(number: f64) -> String {
    normalize_exponent(&format!("{number:.6e}"), 'e')
}

fn normalize_exponent(text: &str, marker: char) -> String {
    let Some((mantissa, exponent)) = text.split_once(marker) else {
        return text.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return text.to_string();
    };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}{marker}{sign}{:02}", exponent.unsigned_abs())
}

/// Split a code into sections on `;`, skipping escaped characters and
/// quoted runs.
fn split_on_semicolons(format: &str) -> Result<Vec<&str>> {
    let mut sections = Vec::new();
    let mut start = 0;
    let mut chars = format.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            ';' => {
                sections.push(format.get(start..i).unwrap_or_default());
                start = i + 1;
            }
            '\\' => {
                chars.next();
            }
            '"' => loop {
                match chars.next() {
                    Some((_, '"')) => break,
                    Some(_) => {}
                    None => return Err(XlstreamError::UnmatchedQuote),
                }
            },
            _ => {}
        }
    }
    sections.push(format.get(start..).unwrap_or_default());
    Ok(sections)
}

fn parse_section(section: &str) -> Result<FormatOptions> {
    let trimmed = section.trim();
    if is_general(trimmed) {
        return Ok(FormatOptions::general());
    }

    let (prefix, rest, percent_before) = parse_literals(trimmed)?;
    let (reduced, suffix_format) = split_format_and_suffix(rest);
    let (suffix, remaining, percent_after) = parse_literals(suffix_format)?;
    if !remaining.is_empty() {
        // literals interleaved with the number, e.g. 000\-00\-0000
        return Err(XlstreamError::UnsupportedFormat);
    }

    Ok(FormatOptions {
        full_format: section.to_string(),
        reduced_format: reduced.to_string(),
        prefix,
        suffix,
        show_percent: percent_before || percent_after,
    })
}

fn starts_with_formatting_token(s: &str) -> Option<&'static str> {
    FORMATTING_TOKENS.into_iter().find(|t| s.starts_with(t))
}

/// Take the longest run of formatting tokens from the front of `format`.
fn split_format_and_suffix(format: &str) -> (&str, &str) {
    let mut rest = format;
    while let Some(token) = starts_with_formatting_token(rest) {
        rest = rest.get(token.len()..).unwrap_or_default();
    }
    let split = format.len() - rest.len();
    (format.get(..split).unwrap_or_default(), rest)
}

/// Consume literal text from the front of `format`.
///
/// Returns the literal text, the unconsumed remainder (starting at the first
/// formatting token) and whether a `%` was seen.
fn parse_literals(format: &str) -> Result<(String, &str, bool)> {
    let mut literal = String::new();
    let mut show_percent = false;
    let mut rest = format;

    loop {
        let mut chars = rest.chars();
        let Some(c) = chars.next() else { break };
        let tail = chars.as_str();

        match c {
            '\\' => {
                let mut escaped = tail.chars();
                if let Some(next) = escaped.next() {
                    literal.push(next);
                }
                rest = escaped.as_str();
            }
            '_' => {
                // skip the width of the next character
                let mut skipped = tail.chars();
                skipped.next();
                rest = skipped.as_str();
            }
            '*' => rest = tail,
            '"' => {
                let end = tail.find('"').ok_or(XlstreamError::UnmatchedQuote)?;
                literal.push_str(tail.get(..end).unwrap_or_default());
                rest = tail.get(end + 1..).unwrap_or_default();
            }
            '%' => {
                show_percent = true;
                literal.push('%');
                rest = tail;
            }
            '[' => {
                let close = rest.find(']').ok_or(XlstreamError::InvalidBrackets)?;
                // currency annotation: [$<symbol>-<locale>]
                if rest.len() > 2 && tail.starts_with('$') {
                    match rest.find('-') {
                        Some(dash) if dash < close => {
                            literal.push_str(rest.get(2..dash).unwrap_or_default());
                        }
                        _ => return Err(XlstreamError::InvalidCurrency),
                    }
                }
                // colors and conditions are dropped
                rest = rest.get(close + 1..).unwrap_or_default();
            }
            c if LITERAL_PUNCTUATION.contains(c) => {
                literal.push(c);
                rest = tail;
            }
            _ => {
                if starts_with_formatting_token(rest).is_some() {
                    return Ok((literal, rest, show_percent));
                }
                return Err(XlstreamError::UnsupportedFormatCharacters);
            }
        }
    }

    Ok((literal, "", show_percent))
}

/// True when the code contains date or time tokens outside of literals.
///
/// Detection only; some detected codes render imperfectly.
pub fn is_time_format(format: &str) -> bool {
    let mut found = false;
    let mut rest = format;

    loop {
        let mut chars = rest.chars();
        let Some(c) = chars.next() else { break };
        let tail = chars.as_str();

        match c {
            '\\' | '_' => {
                let mut skipped = tail.chars();
                skipped.next();
                rest = skipped.as_str();
            }
            '*' => rest = tail,
            '"' => {
                let Some(end) = tail.find('"') else {
                    return false;
                };
                rest = tail.get(end + 1..).unwrap_or_default();
            }
            ',' => rest = tail,
            c if LITERAL_PUNCTUATION.contains(c) => rest = tail,
            _ => {
                if let Some(token) = TIME_TOKENS.into_iter().find(|t| rest.starts_with(t)) {
                    found = true;
                    rest = rest.get(token.len()..).unwrap_or_default();
                } else if c == '[' {
                    let Some(close) = rest.find(']') else {
                        return false;
                    };
                    rest = rest.get(close + 1..).unwrap_or_default();
                } else {
                    return false;
                }
            }
        }
    }

    found
}

/// Parsed formats keyed by their code, so equal codes share one parse.
#[derive(Debug, Clone, Default)]
pub struct NumFmtCache {
    entries: HashMap<String, Arc<ParsedNumberFormat>>,
}

impl NumFmtCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the parse of `code`, parsing it on first use.
    pub fn get(&mut self, code: &str) -> Arc<ParsedNumberFormat> {
        if let Some(parsed) = self.entries.get(code) {
            return Arc::clone(parsed);
        }
        let parsed = Arc::new(parse_number_format(code));
        self.entries.insert(code.to_string(), Arc::clone(&parsed));
        parsed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn numeric(code: &str, value: &str) -> String {
        let (text, err) = parse_number_format(code).format_raw(CellType::Numeric, value, false);
        assert!(err.is_none(), "unexpected error {err:?} for {code:?}");
        text
    }

    #[test_case("0.00", "3.14159", "3.14" ; "two decimals")]
    #[test_case("0", "-5", "-5" ; "integer negative")]
    #[test_case("0.00%", "0.5", "50.00%" ; "percent")]
    #[test_case("0%", "0.256", "26%" ; "whole percent")]
    #[test_case("#,##0", "1234.4", "1234" ; "thousands ignored")]
    #[test_case("0.0", "2.34", "2.3" ; "one decimal")]
    #[test_case("0.000", "1", "1.000" ; "three decimals")]
    #[test_case("#,##0.0000", "1.234567", "1.2346" ; "four decimals")]
    #[test_case("0.00e+00", "1234.56", "1.234560e+03" ; "scientific")]
    #[test_case("\"$\"0.00", "5", "$5.00" ; "quoted prefix")]
    #[test_case("[$€-407]0.00", "5", "€5.00" ; "currency annotation")]
    #[test_case("[Red]0.00", "5", "5.00" ; "color dropped")]
    #[test_case("0.00\" units\"", "5", "5.00 units" ; "quoted suffix")]
    #[test_case("general", "12.5", "12.5" ; "general")]
    #[test_case("", "12.5", "12.5" ; "empty is general")]
    #[test_case("0.0#", "1.234", "1.234" ; "unknown remainder falls back to raw")]
    fn test_numeric_formats(code: &str, value: &str, expected: &str) {
        assert_eq!(numeric(code, value), expected);
    }

    #[test]
    fn test_two_sections_negative_in_parens() {
        assert_eq!(numeric("0.00;(0.00)", "-2.5"), "(2.50)");
        assert_eq!(numeric("0.00;(0.00)", "3.1"), "3.10");
        assert_eq!(numeric("0.00;(0.00)", "0"), "0.00");
    }

    #[test]
    fn test_three_sections_zero() {
        assert_eq!(numeric("0;-0;\"zero\"", "0"), "zero");
        assert_eq!(numeric("0;-0;\"zero\"", "-3"), "-3");
    }

    #[test]
    fn test_general_threshold() {
        assert_eq!(general_numeric("1e11", true).unwrap(), "1E+11");
        assert_eq!(general_numeric("99000000000", true).unwrap(), "99000000000");
        assert_eq!(general_numeric("1e-10", true).unwrap(), "1E-10");
        assert_eq!(general_numeric("0", true).unwrap(), "0");
        assert_eq!(general_numeric("1.5e-10", true).unwrap(), "1.5E-10");
        assert_eq!(general_numeric("1e-10", false).unwrap(), "0.0000000001");
        assert!(general_numeric("abc", true).is_err());
    }

    #[test]
    fn test_general_numeric_unparseable_cell_keeps_raw() {
        let parsed = parse_number_format(GENERAL);
        let (text, err) = parsed.format_raw(CellType::Numeric, "n/a", false);
        assert_eq!(text, "n/a");
        assert!(matches!(err, Some(XlstreamError::InvalidNumber(_))));
    }

    #[test]
    fn test_bool_cells() {
        let parsed = parse_number_format(GENERAL);
        assert_eq!(parsed.format_raw(CellType::Bool, "1", false).0, "TRUE");
        assert_eq!(parsed.format_raw(CellType::Bool, "0", false).0, "FALSE");
        let (text, err) = parsed.format_raw(CellType::Bool, "yes", false);
        assert_eq!(text, "yes");
        assert!(matches!(err, Some(XlstreamError::InvalidBool)));
    }

    #[test]
    fn test_text_sections() {
        let parsed = parse_number_format("0;-0;0;\"<\"@\">\"");
        assert_eq!(parsed.format_raw(CellType::String, "x", false).0, "<x>");

        let single = parse_number_format("\"pre \"@");
        assert_eq!(single.format_raw(CellType::String, "x", false).0, "pre x");

        let constant = parse_number_format("0;0;0;\"hidden\"");
        assert_eq!(constant.format_raw(CellType::String, "x", false).0, "hidden");

        let numeric_only = parse_number_format("0.00");
        assert_eq!(numeric_only.format_raw(CellType::String, "x", false).0, "x");
    }

    #[test]
    fn test_unsupported_string_format() {
        let parsed = parse_number_format("0;0;0;0.00");
        let (text, err) = parsed.format_raw(CellType::String, "x", false);
        assert_eq!(text, "x");
        assert!(matches!(err, Some(XlstreamError::UnsupportedStringFormat)));
    }

    #[test]
    fn test_deferred_errors() {
        let unmatched = parse_number_format("0.00\"abc");
        assert!(matches!(
            unmatched.deferred_error(),
            Some(XlstreamError::UnmatchedQuote)
        ));
        let (text, err) = unmatched.format_raw(CellType::Numeric, "1.5", false);
        assert_eq!(text, "1.5");
        assert!(err.is_some());

        let too_many = parse_number_format("0;0;0;@;0");
        assert!(matches!(
            too_many.deferred_error(),
            Some(XlstreamError::TooManySections)
        ));

        let brackets = parse_number_format("[Red0.00");
        assert!(matches!(
            brackets.deferred_error(),
            Some(XlstreamError::InvalidBrackets)
        ));

        let currency = parse_number_format("[$€]0.00");
        assert!(matches!(
            currency.deferred_error(),
            Some(XlstreamError::InvalidCurrency)
        ));

        let interleaved = parse_number_format("000\\-00\\-0000");
        assert!(matches!(
            interleaved.deferred_error(),
            Some(XlstreamError::UnsupportedFormat)
        ));

        let letters = parse_number_format("0.00 kg");
        assert!(matches!(
            letters.deferred_error(),
            Some(XlstreamError::UnsupportedFormatCharacters)
        ));
    }

    #[test]
    fn test_split_on_semicolons() {
        assert_eq!(split_on_semicolons("a;b").unwrap(), vec!["a", "b"]);
        assert_eq!(split_on_semicolons("\"a;b\";c").unwrap(), vec!["\"a;b\"", "c"]);
        assert_eq!(split_on_semicolons("a\\;b").unwrap(), vec!["a\\;b"]);
        assert!(split_on_semicolons("\"a;b").is_err());
    }

    #[test_case("yyyy-mm-dd", true)]
    #[test_case("h:mm AM/PM", true)]
    #[test_case("[h]:mm:ss", true)]
    #[test_case("[$-409]d-mmm-yy", true)]
    #[test_case("0.00", false)]
    #[test_case("#,##0", false)]
    #[test_case("\"day\"0", false)]
    #[test_case("general", false)]
    #[test_case("[Red", false)]
    fn test_is_time_format(code: &str, expected: bool) {
        assert_eq!(is_time_format(code), expected);
    }

    #[test]
    fn test_time_format_renders_date() {
        let parsed = parse_number_format("yyyy-mm-dd");
        assert!(parsed.is_time_format());
        let (text, err) = parsed.format_raw(CellType::Numeric, "45000", false);
        assert_eq!(text, "2023-03-15");
        assert!(err.is_none());
        // text is untouched by a time format
        assert_eq!(parsed.format_raw(CellType::String, "abc", false).0, "abc");
    }

    #[test]
    fn test_error_and_date_cells_pass_through() {
        let parsed = parse_number_format("0.00");
        assert_eq!(parsed.format_raw(CellType::Error, "#DIV/0!", false).0, "#DIV/0!");
        assert_eq!(
            parsed.format_raw(CellType::Date, "2023-03-15T00:00:00Z", false).0,
            "2023-03-15T00:00:00Z"
        );
    }

    #[test]
    fn test_builtin_lookup() {
        assert_eq!(builtin_format(14), Some("mm-dd-yy"));
        assert_eq!(builtin_format_id("General"), Some(0));
        assert_eq!(builtin_format_id("0.00"), Some(2));
        assert_eq!(builtin_format_id("@"), Some(49));
        assert_eq!(builtin_format_id("0.000"), None);
    }

    #[test]
    fn test_cache_shares_parses() {
        let mut cache = NumFmtCache::new();
        let a = cache.get("0.00");
        let b = cache.get("0.00");
        assert!(Arc::ptr_eq(&a, &b));
        cache.get("0");
        assert_eq!(cache.len(), 2);
    }
}
