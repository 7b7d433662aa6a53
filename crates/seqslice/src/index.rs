//! Record index over a remote sequence object.
//!
//! The index is the product of preprocessing: one entry per record, ordered
//! by byte offset, with enough metadata for partition planning to run
//! without touching the object again.

use seqslice_common::{ByteRange, Error, Result};
use serde::{Deserialize, Serialize};

/// Version of the index layout. Bumped when entry semantics change so that
/// persisted artifacts from older layouts are treated as cache misses.
pub const FORMAT_VERSION: u32 = 1;

/// One record in the index.
///
/// A record's span runs from its header sentinel to the next record's
/// sentinel (or the end of the object), so inter-record separators belong
/// to the preceding record and spans tile the object without gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Byte offset of the record's header sentinel
    pub offset: u64,

    /// Record identifier: the first whitespace-delimited token after the
    /// sentinel
    pub id: String,

    /// Span of the record in bytes, up to the next record start
    pub length: u64,
}

impl IndexEntry {
    /// One past the last byte of the record's span.
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }

    /// The record's span as a byte range.
    pub fn range(&self) -> ByteRange {
        ByteRange::new(self.offset, self.end())
    }
}

/// Fully materialized index over one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectIndex {
    /// Record entries, ascending by offset
    pub entries: Vec<IndexEntry>,

    /// Number of records in the object
    pub record_count: usize,

    /// Total object size in bytes
    pub total_size_bytes: u64,

    /// Index layout version
    pub format_version: u32,
}

impl ObjectIndex {
    /// Check the index invariants: entries sorted and span-contiguous,
    /// the last span ending at the object size, counts consistent.
    pub fn validate(&self) -> Result<()> {
        if self.record_count != self.entries.len() {
            return Err(Error::Internal(format!(
                "record_count {} does not match {} entries",
                self.record_count,
                self.entries.len()
            )));
        }

        for pair in self.entries.windows(2) {
            if pair[0].end() != pair[1].offset {
                return Err(Error::Internal(format!(
                    "index entries not contiguous: span ending at {} followed by offset {}",
                    pair[0].end(),
                    pair[1].offset
                )));
            }
        }

        if let Some(last) = self.entries.last() {
            if last.end() != self.total_size_bytes {
                return Err(Error::Internal(format!(
                    "last span ends at {} but object is {} bytes",
                    last.end(),
                    self.total_size_bytes
                )));
            }
        }

        Ok(())
    }

    /// Entries whose spans share at least one byte with `range`.
    pub fn entries_overlapping(&self, range: &ByteRange) -> Vec<IndexEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.range().overlaps(range))
            .cloned()
            .collect()
    }
}
