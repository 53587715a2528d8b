//! Row-limited worksheet previews.
//!
//! The worksheet XML is cut right after the closing tag of the last wanted
//! row and closed again with `</sheetData></worksheet>`, so the row parser
//! never sees the rest of a large sheet. Anything after `sheetData`
//! (merges, autofilter) is lost in a truncated sheet.

use std::borrow::Cow;
use std::num::NonZeroUsize;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Result;

pub(super) const SHEET_ENDING: &str = "</sheetData></worksheet>";

/// The first `limit` rows of `xml`, still well-formed.
///
/// Returns the input unchanged when it has no more than `limit` rows.
pub(super) fn truncate_sheet_xml(xml: &[u8], limit: NonZeroUsize) -> Result<Cow<'_, [u8]>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut rows = 0usize;

    loop {
        let closed_row = match reader.read_event_into(&mut buf)? {
            Event::End(ref e) => e.local_name().as_ref() == b"row",
            Event::Empty(ref e) => e.local_name().as_ref() == b"row",
            Event::Eof => return Ok(Cow::Borrowed(xml)),
            _ => false,
        };
        buf.clear();

        if closed_row {
            rows += 1;
            if rows >= limit.get() {
                break;
            }
        }
    }

    let offset = reader.buffer_position();
    let mut out = Vec::with_capacity(offset + SHEET_ENDING.len());
    out.extend_from_slice(xml.get(..offset).unwrap_or(xml));
    out.extend_from_slice(SHEET_ENDING.as_bytes());
    log::debug!("truncated worksheet to {rows} rows at byte {offset}");
    Ok(Cow::Owned(out))
}
