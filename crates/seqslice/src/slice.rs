//! Lazily-fetched partition slices.

use crate::index::IndexEntry;
use bytes::Bytes;
use seqslice_common::{ByteRange, Error, Result};
use seqslice_storage::RemoteObjectHandle;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One byte range of a remote object, fetchable independently of every
/// other slice.
///
/// The slice shares the handle, owns no object data, and fetches nothing
/// until [`get`](PartitionSlice::get) is called. Fetches are idempotent and
/// uncached; concurrent `get` calls across slices are safe.
#[derive(Debug, Clone)]
pub struct PartitionSlice {
    handle: Arc<RemoteObjectHandle>,
    range: ByteRange,
    entries: Vec<IndexEntry>,
}

impl PartitionSlice {
    /// Create a slice over `range`, annotated with the index entries whose
    /// spans intersect it.
    pub fn new(handle: Arc<RemoteObjectHandle>, range: ByteRange, entries: Vec<IndexEntry>) -> Self {
        Self {
            handle,
            range,
            entries,
        }
    }

    /// The slice's byte range.
    pub fn range(&self) -> ByteRange {
        self.range
    }

    /// Index entries whose spans intersect this slice.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Number of bytes the slice covers.
    pub fn len_bytes(&self) -> u64 {
        self.range.len()
    }

    /// Whether the slice covers zero bytes.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Fetch the slice's bytes.
    ///
    /// Performs exactly one ranged read against the owning handle and
    /// returns the raw bytes of `[start, end)` — no decoding, no caching.
    /// Empty slices return empty bytes without touching the network.
    pub async fn get(&self) -> Result<Bytes> {
        if self.is_empty() {
            return Ok(Bytes::new());
        }
        self.handle.read_range(self.range.start, self.range.end).await
    }

    /// Detach into a serializable form that can cross a process boundary.
    /// No fetch happens.
    pub fn to_spec(&self) -> SliceSpec {
        SliceSpec {
            key: self.handle.key().to_string(),
            range: self.range,
            entries: self.entries.clone(),
        }
    }

    /// Rebind a detached spec to a live handle on the worker side.
    pub fn from_spec(spec: SliceSpec, handle: Arc<RemoteObjectHandle>) -> Result<Self> {
        if spec.key != handle.key() {
            return Err(Error::InvalidArgument(format!(
                "slice spec is for object '{}' but handle points at '{}'",
                spec.key,
                handle.key()
            )));
        }
        if spec.range.end > handle.size() {
            return Err(Error::InvalidArgument(format!(
                "slice range {} exceeds object size {}",
                spec.range,
                handle.size()
            )));
        }

        Ok(Self {
            handle,
            range: spec.range,
            entries: spec.entries,
        })
    }
}

/// The serializable, handle-free form of a [`PartitionSlice`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceSpec {
    /// Key of the object the slice belongs to
    pub key: String,

    /// The slice's byte range
    pub range: ByteRange,

    /// Index entries whose spans intersect the range
    pub entries: Vec<IndexEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqslice_storage::{LocalBackend, ObjectStore, ObjectStoreConfig, StorageBackend};
    use tempfile::TempDir;

    async fn handle_for(temp_dir: &TempDir, key: &str, data: &'static [u8]) -> Arc<RemoteObjectHandle> {
        let config = ObjectStoreConfig {
            backend: StorageBackend::Local {
                path: temp_dir.path().to_string_lossy().to_string(),
            },
            bucket: "test".to_string(),
            prefix: None,
        };
        let backend = LocalBackend::new(config).await.unwrap();
        backend.put(key, Bytes::from_static(data)).await.unwrap();
        let store: Arc<dyn ObjectStore> = Arc::new(backend);
        Arc::new(RemoteObjectHandle::resolve(store, key).await.unwrap())
    }

    #[tokio::test]
    async fn test_get_fetches_exactly_the_range() {
        let temp_dir = TempDir::new().unwrap();
        let handle = handle_for(&temp_dir, "obj", b">s1\nACGTACGT\n").await;

        let slice = PartitionSlice::new(Arc::clone(&handle), ByteRange::new(4, 8), Vec::new());
        assert_eq!(slice.get().await.unwrap().as_ref(), b"ACGT");

        // Fetch is idempotent
        assert_eq!(slice.get().await.unwrap().as_ref(), b"ACGT");
    }

    #[tokio::test]
    async fn test_empty_slice_returns_empty_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let handle = handle_for(&temp_dir, "obj", b"x").await;

        let slice = PartitionSlice::new(handle, ByteRange::new(1, 1), Vec::new());
        assert!(slice.is_empty());
        assert!(slice.get().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_spec_roundtrip_rebinds_without_fetching() {
        let temp_dir = TempDir::new().unwrap();
        let handle = handle_for(&temp_dir, "obj", b">s1\nACGTACGT\n").await;

        let slice = PartitionSlice::new(Arc::clone(&handle), ByteRange::new(0, 13), Vec::new());
        let spec = slice.to_spec();

        let json = serde_json::to_string(&spec).unwrap();
        let parsed: SliceSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, spec);

        let rebound = PartitionSlice::from_spec(parsed, Arc::clone(&handle)).unwrap();
        assert_eq!(rebound.range(), slice.range());
        assert_eq!(rebound.get().await.unwrap().as_ref(), b">s1\nACGTACGT\n");
    }

    #[tokio::test]
    async fn test_from_spec_rejects_wrong_object() {
        let temp_dir = TempDir::new().unwrap();
        let handle = handle_for(&temp_dir, "obj", b"0123456789").await;

        let wrong_key = SliceSpec {
            key: "other".to_string(),
            range: ByteRange::new(0, 4),
            entries: Vec::new(),
        };
        assert!(PartitionSlice::from_spec(wrong_key, Arc::clone(&handle)).is_err());

        let out_of_bounds = SliceSpec {
            key: "obj".to_string(),
            range: ByteRange::new(0, 999),
            entries: Vec::new(),
        };
        assert!(PartitionSlice::from_spec(out_of_bounds, handle).is_err());
    }
}
