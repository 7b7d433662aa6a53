//! AWS S3 and S3-compatible storage backend implementation.

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::{
    config::Builder as S3ConfigBuilder, primitives::ByteStream, Client as S3Client,
    Error as S3Error,
};
use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, instrument};

use crate::object_store::{
    config::{ObjectStoreConfig, StorageBackend},
    errors::{ObjectStoreError, ObjectStoreResult},
    storage::{ObjectMetadata, ObjectStore},
};

/// AWS S3 backend implementation
pub struct S3Backend {
    client: S3Client,
    bucket: String,
    prefix: Option<String>,
}

impl S3Backend {
    /// Create a new S3 backend.
    ///
    /// Credentials come from the AWS default provider chain (environment,
    /// shared config, instance metadata).
    pub async fn new(config: ObjectStoreConfig) -> ObjectStoreResult<Self> {
        let (region, endpoint, force_path_style) = match &config.backend {
            StorageBackend::S3 {
                region,
                endpoint,
                force_path_style,
            } => (region.clone(), endpoint.clone(), *force_path_style),
            _ => {
                return Err(ObjectStoreError::InvalidConfiguration {
                    message: "Expected S3 backend configuration".to_string(),
                })
            }
        };

        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .load()
            .await;

        let mut s3_config_builder = S3ConfigBuilder::from(&aws_config);

        if let Some(endpoint_url) = endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(&endpoint_url);
        }

        if force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        let client = S3Client::from_conf(s3_config_builder.build());

        debug!(
            "Created S3 backend for bucket '{}' in region '{}'",
            config.bucket, region
        );

        Ok(Self {
            client,
            bucket: config.bucket,
            prefix: config.prefix,
        })
    }

    /// Build the full key including prefix
    fn build_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}/{}", prefix.trim_end_matches('/'), key),
            None => key.to_string(),
        }
    }

    /// Strip prefix from key
    fn strip_prefix<'a>(&self, key: &'a str) -> &'a str {
        if let Some(prefix) = &self.prefix {
            let prefix_with_slash = format!("{}/", prefix.trim_end_matches('/'));
            key.strip_prefix(&prefix_with_slash).unwrap_or(key)
        } else {
            key
        }
    }

    /// Convert S3 error to ObjectStoreError
    fn convert_error(&self, err: S3Error, key: &str) -> ObjectStoreError {
        match err {
            S3Error::NoSuchKey(_) | S3Error::NotFound(_) => ObjectStoreError::NotFound {
                key: key.to_string(),
            },
            S3Error::NoSuchBucket(_) => ObjectStoreError::NotFound {
                key: format!("bucket/{}", self.bucket),
            },
            _ => {
                if err.to_string().contains("Access Denied") {
                    ObjectStoreError::AccessDenied {
                        message: err.to_string(),
                    }
                } else {
                    ObjectStoreError::Aws(err.to_string())
                }
            }
        }
    }
}

#[async_trait]
impl ObjectStore for S3Backend {
    #[instrument(skip(self, data))]
    async fn put(&self, key: &str, data: Bytes) -> ObjectStoreResult<()> {
        let full_key = self.build_key(key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| self.convert_error(e.into(), key))?;

        debug!("Successfully put object: {}", full_key);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> ObjectStoreResult<Bytes> {
        let full_key = self.build_key(key);

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .send()
            .await
            .map_err(|e| self.convert_error(e.into(), key))?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| ObjectStoreError::NetworkError {
                message: e.to_string(),
            })?
            .into_bytes();

        debug!(
            "Successfully retrieved object: {} ({} bytes)",
            full_key,
            data.len()
        );
        Ok(data)
    }

    #[instrument(skip(self))]
    async fn get_range(&self, key: &str, start: u64, end: u64) -> ObjectStoreResult<Bytes> {
        if start >= end {
            return Ok(Bytes::new());
        }

        let full_key = self.build_key(key);

        // HTTP Range headers are inclusive on both ends
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .range(format!("bytes={}-{}", start, end - 1))
            .send()
            .await
            .map_err(|e| self.convert_error(e.into(), key))?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| ObjectStoreError::NetworkError {
                message: e.to_string(),
            })?
            .into_bytes();

        debug!(
            "Successfully retrieved range [{}, {}) of {}: {} bytes",
            start,
            end,
            full_key,
            data.len()
        );
        Ok(data)
    }

    #[instrument(skip(self))]
    async fn head(&self, key: &str) -> ObjectStoreResult<ObjectMetadata> {
        let full_key = self.build_key(key);

        let response = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .send()
            .await
            .map_err(|e| self.convert_error(e.into(), key))?;

        Ok(ObjectMetadata {
            key: key.to_string(),
            size: response.content_length.unwrap_or(0) as u64,
            last_modified: response
                .last_modified
                .and_then(|dt| chrono::DateTime::from_timestamp(dt.secs(), 0))
                .unwrap_or_else(Utc::now),
            etag: response.e_tag,
        })
    }

    #[instrument(skip(self))]
    async fn exists(&self, key: &str) -> ObjectStoreResult<bool> {
        match self.head(key).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> ObjectStoreResult<()> {
        let full_key = self.build_key(key);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .send()
            .await
            .map_err(|e| self.convert_error(e.into(), key))?;

        debug!("Successfully deleted object: {}", full_key);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, prefix: &str) -> ObjectStoreResult<Vec<ObjectMetadata>> {
        let full_prefix = self.build_key(prefix);

        let response = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(&full_prefix)
            .send()
            .await
            .map_err(|e| ObjectStoreError::ListError {
                prefix: prefix.to_string(),
                details: e.to_string(),
            })?;

        let mut objects = Vec::new();

        if let Some(contents) = response.contents {
            for object in contents {
                if let (Some(key), Some(size)) = (object.key, object.size) {
                    let stripped_key = self.strip_prefix(&key).to_string();

                    objects.push(ObjectMetadata {
                        key: stripped_key,
                        size: size as u64,
                        last_modified: object
                            .last_modified
                            .and_then(|dt| chrono::DateTime::from_timestamp(dt.secs(), 0))
                            .unwrap_or_else(Utc::now),
                        etag: object.e_tag,
                    });
                }
            }
        }

        debug!("Listed {} objects with prefix: {}", objects.len(), full_prefix);
        Ok(objects)
    }
}
