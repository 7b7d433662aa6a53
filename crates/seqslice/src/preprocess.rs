//! Parallel index building.
//!
//! Preprocessing splits the object into contiguous scan ranges, fans the
//! range scans out through the execution backend, then folds the
//! observations in range order into one [`ObjectIndex`]. The fold is the
//! single serialization point: it runs after every scan task has finished,
//! because stitching a record split across a boundary needs both
//! neighbours. Any failed range fails the whole call; a partial index is
//! never returned.

use crate::config::PreprocessConfig;
use crate::executor::ExecutionBackend;
use crate::index::{IndexEntry, ObjectIndex, FORMAT_VERSION};
use crate::scan::{scan_range, RangeScan};
use seqslice_common::{ByteRange, Error, Result};
use seqslice_storage::RemoteObjectHandle;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Statistics from one preprocessing run.
#[derive(Debug, Default, Clone)]
pub struct PreprocessStats {
    /// Number of scan ranges dispatched
    pub ranges_scanned: usize,

    /// Number of records found
    pub records_found: usize,

    /// Total bytes read, including boundary bytes
    pub bytes_scanned: u64,

    /// Duration of the run (milliseconds)
    pub duration_ms: u64,
}

/// Builds the record index for one remote object.
pub struct Preprocessor {
    handle: Arc<RemoteObjectHandle>,
    config: PreprocessConfig,
}

impl Preprocessor {
    /// Create a new preprocessor
    pub fn new(handle: Arc<RemoteObjectHandle>, config: PreprocessConfig) -> Self {
        Self { handle, config }
    }

    /// Build the index.
    pub async fn run<E: ExecutionBackend>(&self, executor: &E) -> Result<ObjectIndex> {
        let (index, _stats) = self.run_with_stats(executor).await?;
        Ok(index)
    }

    /// Build the index and report scan statistics.
    pub async fn run_with_stats<E: ExecutionBackend>(
        &self,
        executor: &E,
    ) -> Result<(ObjectIndex, PreprocessStats)> {
        self.config.validate()?;

        let total_size = self.handle.size();
        if total_size == 0 {
            return Err(Error::Format(format!(
                "object '{}' is empty",
                self.handle.key()
            )));
        }

        let chunk_size = self.config.effective_chunk_size(total_size);
        let scan_ranges = scan_ranges(total_size, chunk_size);
        let started = Instant::now();

        debug!(
            key = %self.handle.key(),
            total_size,
            chunk_size,
            ranges = scan_ranges.len(),
            "Dispatching preprocessing scans"
        );

        let handle = Arc::clone(&self.handle);
        let scans = executor
            .map_ordered(scan_ranges, move |range| {
                let handle = Arc::clone(&handle);
                async move {
                    // Pull one extra byte ahead of the range so a sentinel
                    // at the range start can be classified
                    let fetch_start = range.start.saturating_sub(1);
                    let bytes = handle.read_range(fetch_start, range.end).await?;

                    let scan = if range.start > 0 {
                        scan_range(&bytes[1..], range, Some(bytes[0]))
                    } else {
                        scan_range(&bytes, range, None)
                    };
                    Ok(scan)
                }
            })
            .await?;

        let index = merge_scans(&scans, total_size)?;
        index.validate()?;

        let stats = PreprocessStats {
            ranges_scanned: scans.len(),
            records_found: index.record_count,
            bytes_scanned: total_size + scans.len().saturating_sub(1) as u64,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            key = %self.handle.key(),
            records = stats.records_found,
            ranges = stats.ranges_scanned,
            duration_ms = stats.duration_ms,
            "Preprocessing complete"
        );

        Ok((index, stats))
    }
}

/// Split `[0, total_size)` into contiguous ranges of at most `chunk_size`
/// bytes.
fn scan_ranges(total_size: u64, chunk_size: u64) -> Vec<ByteRange> {
    let count = total_size.div_ceil(chunk_size);
    (0..count)
        .map(|i| {
            let start = i * chunk_size;
            ByteRange::new(start, (start + chunk_size).min(total_size))
        })
        .collect()
}

/// A header whose span is still open while folding scans.
struct OpenRecord {
    offset: u64,
    line: Vec<u8>,
    truncated: bool,
}

impl OpenRecord {
    fn id(&self) -> String {
        String::from_utf8_lossy(&self.line)
            .split_ascii_whitespace()
            .next()
            .unwrap_or("")
            .to_string()
    }
}

/// Fold per-range observations, in range order, into one index.
///
/// A range that opens without a sentinel continues the record whose header
/// came before it; its head bytes complete that header's line when the
/// previous range was cut inside it.
fn merge_scans(scans: &[RangeScan], total_size: u64) -> Result<ObjectIndex> {
    verify_scan_coverage(scans, total_size)?;

    let mut starts: Vec<(u64, String)> = Vec::new();
    let mut open: Option<OpenRecord> = None;

    for scan in scans {
        if let Some(record) = open.as_mut() {
            if record.truncated {
                record.line.extend_from_slice(&scan.head);
                if scan.head_complete {
                    record.truncated = false;
                }
            }
        }

        for observation in &scan.headers {
            if let Some(record) = open.take() {
                starts.push((record.offset, record.id()));
            }
            open = Some(OpenRecord {
                offset: observation.offset,
                line: observation.line.clone(),
                truncated: observation.truncated,
            });
        }
    }

    if let Some(record) = open.take() {
        starts.push((record.offset, record.id()));
    }

    if starts.is_empty() {
        return Err(Error::Format(
            "no record header sentinel found in object".to_string(),
        ));
    }

    let entries: Vec<IndexEntry> = starts
        .iter()
        .enumerate()
        .map(|(i, (offset, id))| {
            let end = starts.get(i + 1).map(|(next, _)| *next).unwrap_or(total_size);
            IndexEntry {
                offset: *offset,
                id: id.clone(),
                length: end - offset,
            }
        })
        .collect();

    let record_count = entries.len();

    Ok(ObjectIndex {
        entries,
        record_count,
        total_size_bytes: total_size,
        format_version: FORMAT_VERSION,
    })
}

/// The merge cannot stitch boundary records unless the scans tile the
/// object exactly in order.
fn verify_scan_coverage(scans: &[RangeScan], total_size: u64) -> Result<()> {
    let mut expected_start = 0u64;
    for scan in scans {
        if scan.range.start != expected_start {
            return Err(Error::Internal(format!(
                "scan ranges not contiguous: expected start {}, got {}",
                expected_start, scan.range.start
            )));
        }
        expected_start = scan.range.end;
    }
    if expected_start != total_size {
        return Err(Error::Internal(format!(
            "scan ranges cover {} bytes of a {} byte object",
            expected_start, total_size
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mimic the fan-out synchronously: scan `data` in `chunk`-sized ranges
    /// with the real boundary-byte handoff.
    fn scan_chunks(data: &[u8], chunk: usize) -> Vec<RangeScan> {
        let mut scans = Vec::new();
        let mut start = 0usize;
        while start < data.len() {
            let end = (start + chunk).min(data.len());
            let range = ByteRange::new(start as u64, end as u64);
            let prev = if start > 0 { Some(data[start - 1]) } else { None };
            scans.push(scan_range(&data[start..end], range, prev));
            start = end;
        }
        scans
    }

    fn merged(data: &[u8], chunk: usize) -> Result<ObjectIndex> {
        merge_scans(&scan_chunks(data, chunk), data.len() as u64)
    }

    const TWO_RECORDS: &[u8] = b">alpha first record\nACGTACGT\nGGCC\n>beta\nTTTT\n";

    #[test]
    fn test_scan_ranges_tile_object() {
        let ranges = scan_ranges(29903, 3738);
        assert_eq!(ranges.len(), 8);
        assert_eq!(ranges[0], ByteRange::new(0, 3738));
        assert_eq!(ranges[7], ByteRange::new(26166, 29903));

        let ranges = scan_ranges(10, 100);
        assert_eq!(ranges, vec![ByteRange::new(0, 10)]);
    }

    #[test]
    fn test_merge_single_chunk() {
        let index = merged(TWO_RECORDS, TWO_RECORDS.len()).unwrap();
        assert_eq!(index.record_count, 2);
        assert_eq!(index.entries[0].id, "alpha");
        assert_eq!(index.entries[0].offset, 0);
        assert_eq!(index.entries[1].id, "beta");
        assert_eq!(
            index.entries[0].length + index.entries[1].length,
            TWO_RECORDS.len() as u64
        );
        index.validate().unwrap();
    }

    #[test]
    fn test_merge_is_chunking_invariant() {
        let reference = merged(TWO_RECORDS, TWO_RECORDS.len()).unwrap();
        for chunk in 1..=TWO_RECORDS.len() {
            let index = merged(TWO_RECORDS, chunk).unwrap();
            assert_eq!(index, reference, "chunk size {} diverged", chunk);
        }
    }

    #[test]
    fn test_merge_stitches_header_split_across_chunks() {
        // Chunk size 3 cuts inside both header lines
        let index = merged(TWO_RECORDS, 3).unwrap();
        assert_eq!(index.record_count, 2);
        assert_eq!(index.entries[0].id, "alpha");
        assert_eq!(index.entries[1].id, "beta");
    }

    #[test]
    fn test_merge_body_spill_is_continuation() {
        // Second chunk starts inside the body; it must not become a record
        let data = b">only one record\nACGTACGTACGTACGT\n";
        let index = merged(data, 20).unwrap();
        assert_eq!(index.record_count, 1);
        assert_eq!(index.entries[0].offset, 0);
        assert_eq!(index.entries[0].length, data.len() as u64);
    }

    #[test]
    fn test_merge_without_sentinel_is_format_error() {
        match merged(b"ACGT\nGGCC\n", 4) {
            Err(Error::Format(_)) => {}
            other => panic!("Expected Format error, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_rejects_gapped_scans() {
        let mut scans = scan_chunks(TWO_RECORDS, 10);
        scans.remove(1);
        match merge_scans(&scans, TWO_RECORDS.len() as u64) {
            Err(Error::Internal(_)) => {}
            other => panic!("Expected Internal error, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_leading_bytes_before_first_header() {
        // Bytes before the first sentinel belong to no record
        let data = b"; comment line\n>rec\nAC\n";
        let index = merged(data, 5).unwrap();
        assert_eq!(index.record_count, 1);
        assert_eq!(index.entries[0].offset, 15);
        assert_eq!(index.entries[0].end(), data.len() as u64);
    }
}
