//! Structured error types for xlstream.
//!
//! Every fallible operation in the crate returns [`XlstreamError`]. The enum is
//! `Clone` so a streaming writer can hand back the same latched failure on
//! every call after the first one; foreign errors that are not `Clone`
//! themselves are kept behind an `Arc`.

use std::sync::Arc;

/// All errors that can occur while reading, formatting or writing workbooks.
#[derive(Debug, Clone, thiserror::Error)]
pub enum XlstreamError {
    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(Arc<quick_xml::Error>),

    /// Malformed XML attribute.
    #[error("XML attribute: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(Arc<zip::result::ZipError>),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),

    /// JSON (de)serialization of options.
    #[error("JSON: {0}")]
    Json(Arc<serde_json::Error>),

    // ------------------------------------------------------------------
    // Structural format errors
    // ------------------------------------------------------------------
    /// A required archive member is absent.
    #[error("{0} not found in input xlsx")]
    MissingPart(String),

    /// The archive has no worksheet members.
    #[error("input xlsx contains no worksheets")]
    NoWorksheets,

    /// The workbook descriptor lists no sheet that resolves to a worksheet.
    #[error("no sheets found in xlsx file")]
    NoSheets,

    /// Input that cannot be reconstructed into a document.
    #[error("corrupt input: {0}")]
    CorruptInput(String),

    /// Invalid cell reference such as `"1A"` or `""`.
    #[error("invalid cell reference: {0}")]
    InvalidCellRef(String),

    /// Invalid `a:b` range string.
    #[error("invalid range '{0}'")]
    InvalidRange(String),

    // ------------------------------------------------------------------
    // Number format errors (deferred until a value is formatted)
    // ------------------------------------------------------------------
    /// A format string or section has an unmatched `"`.
    #[error("invalid format string, unmatched double quote")]
    UnmatchedQuote,

    /// A `[` without its closing `]`.
    #[error("invalid formatting code, invalid brackets")]
    InvalidBrackets,

    /// A `[$...]` annotation without the `-` language separator.
    #[error("invalid formatting code, invalid currency annotation")]
    InvalidCurrency,

    /// A bare character that is neither a literal nor a formatting token.
    #[error("invalid formatting code: unsupported or unescaped characters")]
    UnsupportedFormatCharacters,

    /// Literals interleaved with the numeric part of a section.
    #[error("invalid or unsupported format string")]
    UnsupportedFormat,

    /// More than four `;` separated sections.
    #[error("invalid number format, too many format sections")]
    TooManySections,

    /// A text section that is not `general`, `@` or pure literal text.
    #[error("invalid or unsupported format, unsupported string format")]
    UnsupportedStringFormat,

    // ------------------------------------------------------------------
    // Value conversion errors
    // ------------------------------------------------------------------
    /// A bool cell whose stored value is neither `"0"` nor `"1"`.
    #[error("invalid value in bool cell")]
    InvalidBool,

    /// A numeric cell whose stored value does not parse as a number.
    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    /// A serial date outside the range a calendar date can represent.
    #[error("serial date {0} is out of range")]
    DateOutOfRange(String),

    // ------------------------------------------------------------------
    // Usage errors
    // ------------------------------------------------------------------
    /// `add_sheet` with a name that is already taken.
    #[error("duplicate sheet name '{0}'")]
    DuplicateSheetName(String),

    /// `add_sheet` with a name of 31 or more characters.
    #[error("sheet name must be less than 31 characters long, it is currently {0} characters long")]
    SheetNameTooLong(usize),

    /// Encoding a document that has no sheets.
    #[error("workbook must contain at least one worksheet")]
    EmptyWorkbook,

    /// `set_col_width` with `start > end`.
    #[error("could not set width for range {0}-{1}: start column must not be greater than end column")]
    InvalidColumnRange(usize, usize),

    /// A merged area that runs past the last sheet row or column.
    #[error("merged area at {0} extends beyond the sheet limits")]
    MergeOutOfBounds(String),

    /// Shared-string index beyond the table.
    #[error("shared string index {0} out of range")]
    SharedStringOutOfRange(usize),

    /// A streamed row does not have the declared number of cells.
    #[error("invalid number of cells passed to write: all calls to write on the same sheet must have the same number of cells")]
    WrongCellCount,

    /// The stream writer has no open sheet.
    #[error("no current sheet")]
    NoCurrentSheet,

    /// `next_sheet` called on the final declared sheet.
    #[error("next_sheet called, but already on last sheet")]
    AlreadyOnLastSheet,

    /// The stream builder was already built (or failed) and is frozen.
    #[error("stream file builder has already been built, functions may no longer be used")]
    BuilderAlreadyBuilt,

    /// More cell types than header cells were declared.
    #[error("cell types is longer than headers")]
    CellTypesLongerThanHeaders,

    /// The dedicated decode thread pool could not be started.
    #[error("thread pool: {0}")]
    ThreadPool(String),

    /// A marshalled sheet template did not have the expected shape.
    #[error("unexpected sheet XML: {0}")]
    UnexpectedSheetXml(&'static str),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, XlstreamError>;

/// A formatting error that still carries the best-effort display text.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{error}")]
pub struct FormatFailure {
    /// Text to show anyway, usually the raw value.
    pub text: String,
    pub error: XlstreamError,
}

impl From<quick_xml::Error> for XlstreamError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(Arc::new(e))
    }
}

impl From<zip::result::ZipError> for XlstreamError {
    fn from(e: zip::result::ZipError) -> Self {
        Self::Zip(Arc::new(e))
    }
}

impl From<std::io::Error> for XlstreamError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(Arc::new(e))
    }
}

impl From<serde_json::Error> for XlstreamError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(Arc::new(e))
    }
}

impl XlstreamError {
    /// True for errors raised by number format parsing or text formatting.
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::UnmatchedQuote
                | Self::InvalidBrackets
                | Self::InvalidCurrency
                | Self::UnsupportedFormatCharacters
                | Self::UnsupportedFormat
                | Self::TooManySections
                | Self::UnsupportedStringFormat
        )
    }
}
