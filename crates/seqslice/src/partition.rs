//! Partition planning.
//!
//! Planning is synchronous and purely computational: once the index exists
//! no I/O happens until a worker fetches its slice.

use crate::index::ObjectIndex;
use crate::slice::PartitionSlice;
use seqslice_common::{ByteRange, Error, Result};
use seqslice_storage::RemoteObjectHandle;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// How byte ranges are chosen for a target partition count.
///
/// A closed set of policies behind one `plan` capability, selected
/// explicitly by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum PartitionStrategy {
    /// Ceil-division into `num_chunks` contiguous byte ranges, the final
    /// range absorbing the remainder. Cuts are NOT aligned to record
    /// boundaries: a record crossing a cut is split across slices, and a
    /// per-slice parser will see its fragments as pseudo-records.
    ContiguousChunks { num_chunks: u64 },

    /// Like `ContiguousChunks`, but every cut point is snapped forward to
    /// the next record start, so no record is ever split. Trailing ranges
    /// may come out empty when records outnumber the cuts available.
    RecordAligned { num_chunks: u64 },
}

impl PartitionStrategy {
    /// Compute the byte ranges for this strategy.
    ///
    /// Guarantees on success: ranges are contiguous, non-overlapping, in
    /// ascending order, and their union is exactly `[0, total_size)`.
    pub fn plan(&self, index: &ObjectIndex) -> Result<Vec<ByteRange>> {
        let ranges = match self {
            PartitionStrategy::ContiguousChunks { num_chunks } => {
                plan_contiguous(index.total_size_bytes, *num_chunks)?
            }
            PartitionStrategy::RecordAligned { num_chunks } => {
                plan_record_aligned(index, *num_chunks)?
            }
        };

        verify_plan(&ranges, index.total_size_bytes)?;
        Ok(ranges)
    }
}

fn plan_contiguous(total_size: u64, num_chunks: u64) -> Result<Vec<ByteRange>> {
    if num_chunks == 0 {
        return Err(Error::InvalidArgument(
            "num_chunks must be at least 1".to_string(),
        ));
    }

    let chunk_size = total_size.div_ceil(num_chunks);

    Ok((0..num_chunks)
        .map(|i| {
            let start = (i * chunk_size).min(total_size);
            ByteRange::new(start, ((i + 1) * chunk_size).min(total_size))
        })
        .collect())
}

fn plan_record_aligned(index: &ObjectIndex, num_chunks: u64) -> Result<Vec<ByteRange>> {
    if num_chunks == 0 {
        return Err(Error::InvalidArgument(
            "num_chunks must be at least 1".to_string(),
        ));
    }

    let total_size = index.total_size_bytes;
    let chunk_size = total_size.div_ceil(num_chunks);

    let mut cuts = Vec::with_capacity(num_chunks as usize + 1);
    cuts.push(0);
    for i in 1..num_chunks {
        let unaligned = (i * chunk_size).min(total_size);
        // Snap forward to the next record start
        let at = index.entries.partition_point(|e| e.offset < unaligned);
        cuts.push(index.entries.get(at).map(|e| e.offset).unwrap_or(total_size));
    }
    cuts.push(total_size);

    Ok(cuts.windows(2).map(|w| ByteRange::new(w[0], w[1])).collect())
}

/// Check that `ranges` tile `[0, total_size)` exactly. A violation is a
/// planner bug, surfaced as [`Error::Internal`].
pub fn verify_plan(ranges: &[ByteRange], total_size: u64) -> Result<()> {
    let mut expected_start = 0u64;
    for range in ranges {
        if range.start != expected_start || range.end < range.start {
            return Err(Error::Internal(format!(
                "planned range {} breaks coverage at offset {}",
                range, expected_start
            )));
        }
        expected_start = range.end;
    }
    if expected_start != total_size {
        return Err(Error::Internal(format!(
            "planned ranges cover {} bytes of a {} byte object",
            expected_start, total_size
        )));
    }
    Ok(())
}

/// Plan a partitioning and wrap the ranges into lazily-fetched slices.
///
/// Slice `i` corresponds to planned range `i`; the ordering is preserved
/// end-to-end so per-partition results can be reassembled positionally.
pub fn partition(
    handle: &Arc<RemoteObjectHandle>,
    index: &ObjectIndex,
    strategy: &PartitionStrategy,
) -> Result<Vec<PartitionSlice>> {
    if handle.size() != index.total_size_bytes {
        return Err(Error::Precondition(format!(
            "index describes {} bytes but object '{}' has {}",
            index.total_size_bytes,
            handle.key(),
            handle.size()
        )));
    }

    let ranges = strategy.plan(index)?;

    debug!(
        key = %handle.key(),
        slices = ranges.len(),
        strategy = ?strategy,
        "Planned partitioning"
    );

    Ok(ranges
        .into_iter()
        .map(|range| {
            let covered = index.entries_overlapping(&range);
            PartitionSlice::new(Arc::clone(handle), range, covered)
        })
        .collect())
}
