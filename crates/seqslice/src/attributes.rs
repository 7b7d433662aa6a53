//! Read-only attribute view over a built index.

use crate::index::ObjectIndex;
use serde::{Deserialize, Serialize};

/// Typed, read-only metadata derived from an [`ObjectIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    /// Number of sequence records in the object
    pub num_sequences: usize,

    /// Total object size in bytes
    pub total_size_bytes: u64,

    /// Index layout version the attributes were derived from
    pub format_version: u32,
}

impl From<&ObjectIndex> for Attributes {
    fn from(index: &ObjectIndex) -> Self {
        Self {
            num_sequences: index.record_count,
            total_size_bytes: index.total_size_bytes,
            format_version: index.format_version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexEntry, FORMAT_VERSION};

    #[test]
    fn test_attributes_mirror_the_index() {
        let index = ObjectIndex {
            entries: vec![
                IndexEntry {
                    offset: 0,
                    id: "a".to_string(),
                    length: 60,
                },
                IndexEntry {
                    offset: 60,
                    id: "b".to_string(),
                    length: 40,
                },
            ],
            record_count: 2,
            total_size_bytes: 100,
            format_version: FORMAT_VERSION,
        };

        let attributes = Attributes::from(&index);
        assert_eq!(attributes.num_sequences, 2);
        assert_eq!(attributes.total_size_bytes, 100);
        assert_eq!(attributes.format_version, FORMAT_VERSION);
    }
}
