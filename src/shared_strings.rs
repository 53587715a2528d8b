//! Shared string table (`xl/sharedStrings.xml`).
//!
//! Cells of type `s` store an index into this table instead of their text.
//! Indexes are handed out in first-use order and never change once assigned.

use std::collections::HashMap;
use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Result, XlstreamError};
use crate::xml_helpers::{xml_escape, XML_HEADER};

const SST_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Deduplicated, index-addressed string storage.
#[derive(Debug, Clone, Default)]
pub struct SharedStringTable {
    strings: Vec<String>,
    index: HashMap<String, usize>,
}

impl SharedStringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `value`, adding it to the table on first use.
    pub fn intern(&mut self, value: &str) -> usize {
        if let Some(&idx) = self.index.get(value) {
            return idx;
        }
        let idx = self.strings.len();
        self.strings.push(value.to_string());
        self.index.insert(value.to_string(), idx);
        idx
    }

    /// The string stored at `idx`.
    pub fn resolve(&self, idx: usize) -> Result<&str> {
        self.strings
            .get(idx)
            .map(String::as_str)
            .ok_or(XlstreamError::SharedStringOutOfRange(idx))
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Append a string read from an existing table.
    ///
    /// Duplicates keep their own slot so indexes stay aligned with the file;
    /// lookups by value return the first occurrence.
    fn push_read(&mut self, value: String) {
        let idx = self.strings.len();
        self.index.entry(value.clone()).or_insert(idx);
        self.strings.push(value);
    }

    /// Serialize as a `sst` part.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(128 + self.strings.len() * 24);
        xml.push_str(XML_HEADER);
        xml.push_str(&format!(
            "<sst xmlns=\"{SST_NS}\" count=\"{n}\" uniqueCount=\"{n}\">",
            n = self.strings.len()
        ));
        for s in &self.strings {
            if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
                xml.push_str("<si><t xml:space=\"preserve\">");
            } else {
                xml.push_str("<si><t>");
            }
            xml.push_str(&xml_escape(s));
            xml.push_str("</t></si>");
        }
        xml.push_str("</sst>");
        xml
    }
}

/// Read a `sst` part. Rich-text runs are concatenated; phonetic runs are skipped.
pub fn parse_shared_strings<R: BufRead>(reader: R) -> Result<SharedStringTable> {
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut table = SharedStringTable::new();
    let mut buf = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;
    let mut in_phonetic = false;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"rPh" => in_phonetic = true,
                b"t" if in_si && !in_phonetic => in_t = true,
                _ => {}
            },
            Event::Empty(ref e) => {
                // <si/> or <si><t/></si>
                if e.local_name().as_ref() == b"si" {
                    table.push_read(String::new());
                }
            }
            Event::Text(ref e) if in_t => current.push_str(&e.unescape()?),
            Event::CData(ref e) if in_t => {
                current.push_str(&String::from_utf8_lossy(e));
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"si" => {
                    table.push_read(std::mem::take(&mut current));
                    in_si = false;
                }
                b"rPh" => in_phonetic = false,
                b"t" => in_t = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    log::debug!("read {} shared strings", table.len());
    Ok(table)
}
