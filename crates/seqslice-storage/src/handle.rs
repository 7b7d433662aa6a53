//! Remote object handles.

use bytes::Bytes;
use seqslice_common::{Error, Result};
use std::sync::Arc;
use tracing::debug;

use crate::object_store::ObjectStore;

/// A resolved reference to one byte-addressable object in remote storage.
///
/// The handle owns no object data: it is a locator plus the size cached at
/// resolve time, shared across indexes, slices and attribute views. All
/// reads are pull-based ranged GETs against the backend; the remote object
/// is assumed write-once while handles to it are live. No retry happens at
/// this layer.
pub struct RemoteObjectHandle {
    store: Arc<dyn ObjectStore>,
    key: String,
    size: u64,
}

impl RemoteObjectHandle {
    /// Resolve a locator against the backend.
    ///
    /// Issues a single `head` request; fails with [`Error::NotFound`] when
    /// the key does not name an object. The returned handle is immutable.
    pub async fn resolve(store: Arc<dyn ObjectStore>, key: &str) -> Result<Self> {
        let metadata = store.head(key).await.map_err(Error::from)?;

        debug!(key = %key, size = metadata.size, "Resolved remote object");

        Ok(Self {
            store,
            key: key.to_string(),
            size: metadata.size,
        })
    }

    /// Object key within the backend.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Total object size in bytes, cached at resolve time.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The backing object store.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Read the half-open byte range `[start, end)` of the object.
    ///
    /// Issues exactly one ranged GET. `start == end` returns empty bytes
    /// without touching the network; `start > end` or `end > size()` fail
    /// with [`Error::InvalidArgument`].
    pub async fn read_range(&self, start: u64, end: u64) -> Result<Bytes> {
        if start > end || end > self.size {
            return Err(Error::InvalidArgument(format!(
                "range [{}, {}) out of bounds for object '{}' of {} bytes",
                start, end, self.key, self.size
            )));
        }

        if start == end {
            return Ok(Bytes::new());
        }

        let data = self
            .store
            .get_range(&self.key, start, end)
            .await
            .map_err(Error::from)?;

        Ok(data)
    }
}

impl std::fmt::Debug for RemoteObjectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteObjectHandle")
            .field("key", &self.key)
            .field("size", &self.size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_store::{
        backends::LocalBackend,
        config::{ObjectStoreConfig, StorageBackend},
    };
    use tempfile::TempDir;

    async fn store_with_object(
        temp_dir: &TempDir,
        key: &str,
        data: &'static [u8],
    ) -> Arc<dyn ObjectStore> {
        let config = ObjectStoreConfig {
            backend: StorageBackend::Local {
                path: temp_dir.path().to_string_lossy().to_string(),
            },
            bucket: "test".to_string(),
            prefix: None,
        };
        let backend = LocalBackend::new(config).await.unwrap();
        backend.put(key, Bytes::from_static(data)).await.unwrap();
        Arc::new(backend)
    }

    #[tokio::test]
    async fn test_resolve_caches_size() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with_object(&temp_dir, "obj", b"0123456789").await;

        let handle = RemoteObjectHandle::resolve(store, "obj").await.unwrap();
        assert_eq!(handle.size(), 10);
        assert_eq!(handle.key(), "obj");
    }

    #[tokio::test]
    async fn test_resolve_missing_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with_object(&temp_dir, "obj", b"x").await;

        match RemoteObjectHandle::resolve(store, "missing").await {
            Err(Error::NotFound(_)) => {}
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_range() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with_object(&temp_dir, "obj", b"0123456789").await;
        let handle = RemoteObjectHandle::resolve(store, "obj").await.unwrap();

        assert_eq!(handle.read_range(2, 6).await.unwrap().as_ref(), b"2345");
        assert_eq!(handle.read_range(0, 10).await.unwrap().as_ref(), b"0123456789");
    }

    #[tokio::test]
    async fn test_read_range_empty_and_out_of_bounds() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with_object(&temp_dir, "obj", b"0123456789").await;
        let handle = RemoteObjectHandle::resolve(store, "obj").await.unwrap();

        assert!(handle.read_range(4, 4).await.unwrap().is_empty());

        match handle.read_range(5, 11).await {
            Err(Error::InvalidArgument(_)) => {}
            other => panic!("Expected InvalidArgument, got {:?}", other),
        }

        match handle.read_range(6, 5).await {
            Err(Error::InvalidArgument(_)) => {}
            other => panic!("Expected InvalidArgument, got {:?}", other),
        }
    }
}
