//! Per-range record scanning.
//!
//! [`scan_range`] is the parallel phase of preprocessing: a pure function of
//! one byte range plus the single byte preceding it. It reports where record
//! headers start and carries the fragments the merge phase needs to stitch
//! records split across range boundaries.

use seqslice_common::ByteRange;
use serde::{Deserialize, Serialize};

/// Byte that introduces a record header line.
pub const RECORD_SENTINEL: u8 = b'>';

/// A record header sighted within one scan range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderObservation {
    /// Absolute byte offset of the sentinel
    pub offset: u64,

    /// Header line bytes after the sentinel, up to the line break or the
    /// end of the range, whichever comes first
    pub line: Vec<u8>,

    /// True when the range ended before the header's line break; the line
    /// continues in the next range's head
    pub truncated: bool,
}

/// Everything one scan task observed about its range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeScan {
    /// The scanned range
    pub range: ByteRange,

    /// Bytes from the range start up to its first line break (exclusive).
    /// Used by the merge phase to complete a header line the previous range
    /// was cut inside of.
    pub head: Vec<u8>,

    /// Whether a line break terminated the head within this range
    pub head_complete: bool,

    /// Header sightings, ascending by offset
    pub headers: Vec<HeaderObservation>,
}

/// Scan one range of the object for record starts.
///
/// `data` holds exactly the bytes of `range`. `prev_byte` is the byte
/// immediately preceding the range, `None` at the start of the object. A
/// sentinel only starts a record at offset zero or directly after a line
/// break; a `>` inside a line is payload, not a header.
pub fn scan_range(data: &[u8], range: ByteRange, prev_byte: Option<u8>) -> RangeScan {
    debug_assert_eq!(data.len() as u64, range.len());

    let newline_at = |from: usize| data[from..].iter().position(|&b| b == b'\n').map(|p| from + p);

    let (head, head_complete) = match newline_at(0) {
        Some(pos) => (data[..pos].to_vec(), true),
        None => (data.to_vec(), false),
    };

    let mut headers = Vec::new();
    let mut at_line_start = range.start == 0 || prev_byte == Some(b'\n');

    for (i, &byte) in data.iter().enumerate() {
        if at_line_start && byte == RECORD_SENTINEL {
            let (line, truncated) = match newline_at(i + 1) {
                Some(pos) => (data[i + 1..pos].to_vec(), false),
                None => (data[i + 1..].to_vec(), true),
            };
            headers.push(HeaderObservation {
                offset: range.start + i as u64,
                line,
                truncated,
            });
        }
        at_line_start = byte == b'\n';
    }

    RangeScan {
        range,
        head,
        head_complete,
        headers,
    }
}
