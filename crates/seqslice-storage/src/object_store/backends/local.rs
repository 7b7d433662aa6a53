//! Local filesystem backend implementation.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};
use tracing::{debug, instrument};

use crate::object_store::{
    config::{ObjectStoreConfig, StorageBackend},
    errors::{ObjectStoreError, ObjectStoreResult},
    storage::{ObjectMetadata, ObjectStore},
};

/// Local filesystem backend implementation
pub struct LocalBackend {
    root_path: PathBuf,
    prefix: Option<String>,
}

impl LocalBackend {
    /// Create a new local backend
    pub async fn new(config: ObjectStoreConfig) -> ObjectStoreResult<Self> {
        let root_path = match &config.backend {
            StorageBackend::Local { path } => PathBuf::from(path),
            _ => {
                return Err(ObjectStoreError::InvalidConfiguration {
                    message: "Expected Local backend configuration".to_string(),
                })
            }
        };

        if !root_path.exists() {
            fs::create_dir_all(&root_path).await.map_err(|e| {
                ObjectStoreError::InvalidConfiguration {
                    message: format!("Failed to create root directory: {}", e),
                }
            })?;
        }

        debug!("Created local backend at path: {:?}", root_path);

        Ok(Self {
            root_path,
            prefix: config.prefix,
        })
    }

    /// Build the full path including prefix
    fn build_path(&self, key: &str) -> PathBuf {
        let mut path = self.root_path.clone();

        if let Some(prefix) = &self.prefix {
            path = path.join(prefix);
        }

        for component in key.split('/') {
            if !component.is_empty() {
                path = path.join(component);
            }
        }

        path
    }

    /// Convert filesystem path back to key
    fn path_to_key(&self, path: &Path) -> ObjectStoreResult<String> {
        let relative_path = path
            .strip_prefix(&self.root_path)
            .map_err(|_| ObjectStoreError::Other("Invalid path".to_string()))?;

        let key = if let Some(prefix) = &self.prefix {
            relative_path
                .strip_prefix(prefix)
                .map_err(|_| ObjectStoreError::Other("Invalid prefixed path".to_string()))?
                .to_string_lossy()
                .to_string()
        } else {
            relative_path.to_string_lossy().to_string()
        };

        // Convert backslashes to forward slashes for consistency
        Ok(key.replace('\\', "/"))
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> ObjectStoreResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    ObjectStoreError::Other(format!("Failed to create directory: {}", e))
                })?;
            }
        }
        Ok(())
    }

    fn last_modified(metadata: &std::fs::Metadata) -> DateTime<Utc> {
        metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now())
    }

    /// Recursively list files
    async fn list_recursive(
        &self,
        dir_path: &Path,
        prefix: &str,
        objects: &mut Vec<ObjectMetadata>,
    ) -> ObjectStoreResult<()> {
        let mut entries = fs::read_dir(dir_path).await.map_err(|e| {
            ObjectStoreError::ListError {
                prefix: prefix.to_string(),
                details: format!("Failed to read directory {:?}: {}", dir_path, e),
            }
        })?;

        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            ObjectStoreError::ListError {
                prefix: prefix.to_string(),
                details: format!("Failed to read entry: {}", e),
            }
        })? {
            let path = entry.path();

            if path.is_file() {
                if let Ok(key) = self.path_to_key(&path) {
                    if key.starts_with(prefix) {
                        let metadata = entry.metadata().await.map_err(|e| {
                            ObjectStoreError::Other(format!("Failed to get metadata: {}", e))
                        })?;

                        objects.push(ObjectMetadata {
                            key,
                            size: metadata.len(),
                            last_modified: Self::last_modified(&metadata),
                            etag: None,
                        });
                    }
                }
            } else if path.is_dir() {
                Box::pin(self.list_recursive(&path, prefix, objects)).await?;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalBackend {
    #[instrument(skip(self, data))]
    async fn put(&self, key: &str, data: Bytes) -> ObjectStoreResult<()> {
        let path = self.build_path(key);

        self.ensure_parent_dir(&path).await?;

        fs::write(&path, &data)
            .await
            .map_err(|e| ObjectStoreError::WriteError {
                key: key.to_string(),
                details: format!("Failed to write file: {}", e),
            })?;

        debug!("Successfully wrote {} bytes to: {:?}", data.len(), path);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> ObjectStoreResult<Bytes> {
        let path = self.build_path(key);

        if !path.exists() {
            return Err(ObjectStoreError::NotFound {
                key: key.to_string(),
            });
        }

        let data = fs::read(&path)
            .await
            .map_err(|e| ObjectStoreError::ReadError {
                key: key.to_string(),
                details: format!("Failed to read file: {}", e),
            })?;

        debug!("Successfully read {} bytes from: {:?}", data.len(), path);
        Ok(Bytes::from(data))
    }

    #[instrument(skip(self))]
    async fn get_range(&self, key: &str, start: u64, end: u64) -> ObjectStoreResult<Bytes> {
        let path = self.build_path(key);

        if !path.exists() {
            return Err(ObjectStoreError::NotFound {
                key: key.to_string(),
            });
        }

        let mut file = fs::File::open(&path)
            .await
            .map_err(|e| ObjectStoreError::ReadError {
                key: key.to_string(),
                details: format!("Failed to open file: {}", e),
            })?;

        file.seek(SeekFrom::Start(start))
            .await
            .map_err(|e| ObjectStoreError::ReadError {
                key: key.to_string(),
                details: format!("Failed to seek: {}", e),
            })?;

        let length = end.saturating_sub(start);
        let mut buffer = Vec::with_capacity(length as usize);
        file.take(length)
            .read_to_end(&mut buffer)
            .await
            .map_err(|e| ObjectStoreError::ReadError {
                key: key.to_string(),
                details: format!("Failed to read range: {}", e),
            })?;

        debug!(
            "Successfully read range [{}, {}) of {:?}: {} bytes",
            start,
            end,
            path,
            buffer.len()
        );
        Ok(Bytes::from(buffer))
    }

    #[instrument(skip(self))]
    async fn head(&self, key: &str) -> ObjectStoreResult<ObjectMetadata> {
        let path = self.build_path(key);

        if !path.exists() {
            return Err(ObjectStoreError::NotFound {
                key: key.to_string(),
            });
        }

        let metadata = fs::metadata(&path)
            .await
            .map_err(|e| ObjectStoreError::Other(format!("Failed to get metadata: {}", e)))?;

        Ok(ObjectMetadata {
            key: key.to_string(),
            size: metadata.len(),
            last_modified: Self::last_modified(&metadata),
            etag: None,
        })
    }

    #[instrument(skip(self))]
    async fn exists(&self, key: &str) -> ObjectStoreResult<bool> {
        let path = self.build_path(key);
        Ok(path.exists() && path.is_file())
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> ObjectStoreResult<()> {
        let path = self.build_path(key);

        if !path.exists() {
            return Err(ObjectStoreError::NotFound {
                key: key.to_string(),
            });
        }

        fs::remove_file(&path)
            .await
            .map_err(|e| ObjectStoreError::Other(format!("Failed to delete file: {}", e)))?;

        debug!("Successfully deleted: {:?}", path);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, prefix: &str) -> ObjectStoreResult<Vec<ObjectMetadata>> {
        let mut objects = Vec::new();

        self.list_recursive(&self.root_path, prefix, &mut objects)
            .await?;

        debug!("Listed {} objects with prefix: {}", objects.len(), prefix);
        Ok(objects)
    }
}
