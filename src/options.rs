//! Decode and streaming options.
//!
//! Both option structs deserialize from JSON so the CLI and embedding
//! applications can keep them in a config file.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How many rows of each worksheet to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RowLimit {
    #[default]
    Unlimited,
    /// Stop after this many closed `<row>` elements per sheet.
    Rows(NonZeroUsize),
}

impl RowLimit {
    /// `None` and `Some(0)` both mean unlimited.
    pub fn from_count(count: Option<usize>) -> Self {
        count
            .and_then(NonZeroUsize::new)
            .map_or(Self::Unlimited, Self::Rows)
    }

    pub fn is_unlimited(self) -> bool {
        matches!(self, Self::Unlimited)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecodeOptions {
    /// Rows to read per sheet; absent or 0 reads everything.
    pub row_limit: Option<usize>,
    /// 0 uses rayon's global pool, 1 parses sheets sequentially, more
    /// builds a dedicated pool of that size.
    pub num_threads: usize,
}

impl DecodeOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_row_limit(mut self, rows: usize) -> Self {
        self.row_limit = Some(rows);
        self
    }

    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn row_limit(&self) -> RowLimit {
        RowLimit::from_count(self.row_limit)
    }
}

/// Compression applied to streamed archive members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Compression {
    #[default]
    Deflated,
    Stored,
}

impl Compression {
    pub(crate) fn method(self) -> zip::CompressionMethod {
        match self {
            Self::Deflated => zip::CompressionMethod::Deflated,
            Self::Stored => zip::CompressionMethod::Stored,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StreamOptions {
    pub compression: Compression,
    /// Flush the archive writer after every row.
    pub flush_every_row: bool,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            compression: Compression::Deflated,
            flush_every_row: true,
        }
    }
}

impl StreamOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
