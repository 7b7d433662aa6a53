//! Core object storage trait and factory.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::object_store::{
    config::ObjectStoreConfig,
    errors::{ObjectStoreError, ObjectStoreResult},
};

/// Core object storage trait
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Put an object into storage
    async fn put(&self, key: &str, data: Bytes) -> ObjectStoreResult<()>;

    /// Get an entire object from storage
    async fn get(&self, key: &str) -> ObjectStoreResult<Bytes>;

    /// Get the half-open byte range `[start, end)` of an object.
    ///
    /// `start < end` is the caller's responsibility; handles validate
    /// ranges against the object size before calling in.
    async fn get_range(&self, key: &str, start: u64, end: u64) -> ObjectStoreResult<Bytes>;

    /// Get object metadata without fetching the body
    async fn head(&self, key: &str) -> ObjectStoreResult<ObjectMetadata>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> ObjectStoreResult<bool>;

    /// Delete an object from storage
    async fn delete(&self, key: &str) -> ObjectStoreResult<()>;

    /// List objects with a given prefix
    async fn list(&self, prefix: &str) -> ObjectStoreResult<Vec<ObjectMetadata>>;
}

/// Object metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Object key
    pub key: String,

    /// Object size in bytes
    pub size: u64,

    /// Last modified timestamp
    pub last_modified: DateTime<Utc>,

    /// ETag (if available)
    pub etag: Option<String>,
}

impl ObjectMetadata {
    /// Create basic metadata
    pub fn new(key: String, size: u64) -> Self {
        Self {
            key,
            size,
            last_modified: Utc::now(),
            etag: None,
        }
    }
}

/// Factory function to create object store instances
pub async fn create_object_store(
    config: ObjectStoreConfig,
) -> ObjectStoreResult<Box<dyn ObjectStore>> {
    config
        .validate()
        .map_err(|msg| ObjectStoreError::InvalidConfiguration { message: msg })?;

    match &config.backend {
        crate::object_store::config::StorageBackend::S3 { .. } => {
            let backend = crate::object_store::backends::S3Backend::new(config).await?;
            Ok(Box::new(backend))
        }
        crate::object_store::config::StorageBackend::Local { .. } => {
            let backend = crate::object_store::backends::LocalBackend::new(config).await?;
            Ok(Box::new(backend))
        }
    }
}
