//! Preprocessing configuration.

use crate::index::FORMAT_VERSION;
use crate::scan::RECORD_SENTINEL;
use seqslice_common::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Configuration for the preprocessing pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Bytes per parallel scan range. `None` derives `ceil(size / 4)` from
    /// the object size.
    pub chunk_size: Option<u64>,

    /// Maximum concurrent scan tasks
    pub parallelism: usize,

    /// Whether to consult and update the persisted index artifact
    pub cache_index: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            chunk_size: None,
            parallelism: 4,
            cache_index: true,
        }
    }
}

impl PreprocessConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == Some(0) {
            return Err(Error::InvalidArgument(
                "chunk_size must be at least one byte".to_string(),
            ));
        }
        if self.parallelism == 0 {
            return Err(Error::InvalidArgument(
                "parallelism must be at least one task".to_string(),
            ));
        }
        Ok(())
    }

    /// Scan range size for an object of `total_size` bytes.
    pub fn effective_chunk_size(&self, total_size: u64) -> u64 {
        match self.chunk_size {
            Some(size) => size,
            None => (total_size.div_ceil(4)).max(1),
        }
    }

    /// Fingerprint of the scan-relevant configuration, used as part of the
    /// persisted index artifact key.
    ///
    /// Execution knobs (`parallelism`, `cache_index`) are excluded: they
    /// cannot change the scan result.
    pub fn fingerprint(&self) -> String {
        #[derive(Serialize)]
        struct ScanIdentity {
            chunk_size: Option<u64>,
            sentinel: u8,
            format_version: u32,
        }

        let identity = ScanIdentity {
            chunk_size: self.chunk_size,
            sentinel: RECORD_SENTINEL,
            format_version: FORMAT_VERSION,
        };

        // serde_json with a field-ordered struct is canonical enough here
        let encoded = serde_json::to_vec(&identity).unwrap_or_default();
        let digest = Sha256::digest(&encoded);

        let mut hex = String::with_capacity(16);
        for byte in digest.iter().take(8) {
            hex.push_str(&format!("{:02x}", byte));
        }
        hex
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PreprocessConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = PreprocessConfig {
            chunk_size: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PreprocessConfig {
            parallelism: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_effective_chunk_size_defaults_to_quarter() {
        let config = PreprocessConfig::default();
        assert_eq!(config.effective_chunk_size(100), 25);
        assert_eq!(config.effective_chunk_size(101), 26);
        assert_eq!(config.effective_chunk_size(1), 1);
        assert_eq!(config.effective_chunk_size(2), 1);

        let explicit = PreprocessConfig {
            chunk_size: Some(64),
            ..Default::default()
        };
        assert_eq!(explicit.effective_chunk_size(1_000_000), 64);
    }

    #[test]
    fn test_fingerprint_stability() {
        let a = PreprocessConfig::default();
        let b = PreprocessConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 16);

        // Execution knobs do not affect the fingerprint
        let more_parallel = PreprocessConfig {
            parallelism: 64,
            ..Default::default()
        };
        assert_eq!(a.fingerprint(), more_parallel.fingerprint());

        // Scan-relevant changes do
        let different_chunks = PreprocessConfig {
            chunk_size: Some(512),
            ..Default::default()
        };
        assert_ne!(a.fingerprint(), different_chunks.fingerprint());
    }
}
