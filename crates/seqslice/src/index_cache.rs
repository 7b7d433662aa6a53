//! Persisted index artifacts.
//!
//! A built [`ObjectIndex`] is written back to the object store, keyed by
//! the object key plus the preprocessing config fingerprint, so repeated
//! partition requests against the same object skip the scan. Anything
//! wrong with a stored artifact (missing, unparsable, stale layout, size
//! mismatch) is a cache miss, never an error.

use crate::index::{ObjectIndex, FORMAT_VERSION};
use bytes::Bytes;
use seqslice_common::Result;
use seqslice_storage::{ObjectStore, ObjectStoreError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Store-backed cache of serialized indexes.
pub struct IndexCache {
    store: Arc<dyn ObjectStore>,
}

impl IndexCache {
    /// Create a cache over the given store
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Key of the artifact for `(object key, config fingerprint)`.
    pub fn artifact_key(object_key: &str, fingerprint: &str) -> String {
        format!("{}.seqidx/{}.json", object_key, fingerprint)
    }

    /// Load a previously persisted index, if a usable one exists.
    ///
    /// `expected_size` guards against the remote object having been
    /// replaced since the artifact was written.
    pub async fn load(
        &self,
        object_key: &str,
        fingerprint: &str,
        expected_size: u64,
    ) -> Option<ObjectIndex> {
        let key = Self::artifact_key(object_key, fingerprint);

        let data = match self.store.get(&key).await {
            Ok(data) => data,
            Err(ObjectStoreError::NotFound { .. }) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read index artifact; rescanning");
                return None;
            }
        };

        let index: ObjectIndex = match serde_json::from_slice(&data) {
            Ok(index) => index,
            Err(e) => {
                warn!(key = %key, error = %e, "Unparsable index artifact; rescanning");
                return None;
            }
        };

        if index.format_version != FORMAT_VERSION {
            debug!(
                key = %key,
                artifact_version = index.format_version,
                "Index artifact has a stale layout; rescanning"
            );
            return None;
        }

        if index.total_size_bytes != expected_size || index.validate().is_err() {
            debug!(key = %key, "Index artifact does not match the object; rescanning");
            return None;
        }

        debug!(key = %key, records = index.record_count, "Loaded persisted index");
        Some(index)
    }

    /// Persist a built index.
    pub async fn store(
        &self,
        object_key: &str,
        fingerprint: &str,
        index: &ObjectIndex,
    ) -> Result<()> {
        let key = Self::artifact_key(object_key, fingerprint);
        let data = serde_json::to_vec(index)?;

        self.store
            .put(&key, Bytes::from(data))
            .await
            .map_err(seqslice_common::Error::from)?;

        debug!(key = %key, records = index.record_count, "Persisted index artifact");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexEntry;
    use seqslice_storage::{LocalBackend, ObjectStoreConfig, StorageBackend};
    use tempfile::TempDir;

    async fn cache(temp_dir: &TempDir) -> IndexCache {
        let config = ObjectStoreConfig {
            backend: StorageBackend::Local {
                path: temp_dir.path().to_string_lossy().to_string(),
            },
            bucket: "test".to_string(),
            prefix: None,
        };
        IndexCache::new(Arc::new(LocalBackend::new(config).await.unwrap()))
    }

    fn sample_index() -> ObjectIndex {
        ObjectIndex {
            entries: vec![IndexEntry {
                offset: 0,
                id: "seq1".to_string(),
                length: 100,
            }],
            record_count: 1,
            total_size_bytes: 100,
            format_version: FORMAT_VERSION,
        }
    }

    #[tokio::test]
    async fn test_store_then_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache(&temp_dir).await;
        let index = sample_index();

        cache.store("genome.fasta", "abc123", &index).await.unwrap();

        let loaded = cache.load("genome.fasta", "abc123", 100).await;
        assert_eq!(loaded, Some(index));
    }

    #[tokio::test]
    async fn test_load_miss_and_mismatches() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache(&temp_dir).await;
        let index = sample_index();

        // Nothing stored yet
        assert!(cache.load("genome.fasta", "abc123", 100).await.is_none());

        cache.store("genome.fasta", "abc123", &index).await.unwrap();

        // Different fingerprint
        assert!(cache.load("genome.fasta", "zzz999", 100).await.is_none());

        // Object size changed since the artifact was written
        assert!(cache.load("genome.fasta", "abc123", 200).await.is_none());
    }

    #[tokio::test]
    async fn test_load_garbage_artifact_is_a_miss() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache(&temp_dir).await;

        let key = IndexCache::artifact_key("genome.fasta", "abc123");
        cache
            .store
            .put(&key, Bytes::from_static(b"not json"))
            .await
            .unwrap();

        assert!(cache.load("genome.fasta", "abc123", 100).await.is_none());
    }

    #[tokio::test]
    async fn test_load_stale_format_version_is_a_miss() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache(&temp_dir).await;

        let mut index = sample_index();
        index.format_version = FORMAT_VERSION + 1;
        let key = IndexCache::artifact_key("genome.fasta", "abc123");
        cache
            .store
            .put(&key, Bytes::from(serde_json::to_vec(&index).unwrap()))
            .await
            .unwrap();

        assert!(cache.load("genome.fasta", "abc123", 100).await.is_none());
    }
}
