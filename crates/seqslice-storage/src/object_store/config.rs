//! Configuration structures for object storage backends.

use serde::{Deserialize, Serialize};

/// Main configuration for object storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    /// Storage backend configuration
    pub backend: StorageBackend,

    /// Bucket/container name
    pub bucket: String,

    /// Optional prefix for all keys
    pub prefix: Option<String>,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local {
                path: "./data/seqslice-storage".to_string(),
            },
            bucket: "seqslice".to_string(),
            prefix: None,
        }
    }
}

impl ObjectStoreConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        match &self.backend {
            StorageBackend::S3 { region, .. } => {
                if self.bucket.is_empty() {
                    return Err("S3 backend requires a bucket name".to_string());
                }
                if region.is_empty() {
                    return Err("S3 backend requires a region".to_string());
                }
            }
            StorageBackend::Local { path } => {
                if path.is_empty() {
                    return Err("Local backend requires a root path".to_string());
                }
            }
        }
        Ok(())
    }
}

/// Storage backend types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageBackend {
    /// AWS S3 or S3-compatible storage (MinIO, etc.)
    S3 {
        /// S3 region
        region: String,
        /// Custom endpoint for S3-compatible storage (e.g., MinIO)
        endpoint: Option<String>,
        /// Force path-style addressing (required for MinIO)
        force_path_style: bool,
    },

    /// Local filesystem
    Local {
        /// Root path for storage
        path: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ObjectStoreConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_s3_config_requires_region() {
        let config = ObjectStoreConfig {
            backend: StorageBackend::S3 {
                region: String::new(),
                endpoint: None,
                force_path_style: false,
            },
            bucket: "genomes".to_string(),
            prefix: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backend_serde_tag() {
        let config = ObjectStoreConfig {
            backend: StorageBackend::S3 {
                region: "us-east-1".to_string(),
                endpoint: Some("http://localhost:9000".to_string()),
                force_path_style: true,
            },
            bucket: "genomes".to_string(),
            prefix: Some("fasta".to_string()),
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"type\":\"s3\""));

        let parsed: ObjectStoreConfig = serde_json::from_str(&json).unwrap();
        match parsed.backend {
            StorageBackend::S3 { region, .. } => assert_eq!(region, "us-east-1"),
            _ => panic!("Expected S3 backend"),
        }
    }
}
