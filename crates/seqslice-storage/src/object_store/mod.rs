//! Object storage abstraction layer for seqslice.
//!
//! A unified async API over byte-addressable object storage backends. The
//! core crate only depends on `head` (size discovery) and `get_range`
//! (ranged reads); `put`/`get` exist for the persisted index artifact and
//! for tests that seed objects.

pub mod backends;
pub mod config;
pub mod errors;
pub mod storage;

pub use backends::{LocalBackend, S3Backend};
pub use config::{ObjectStoreConfig, StorageBackend};
pub use errors::{ObjectStoreError, ObjectStoreResult};
pub use storage::{create_object_store, ObjectMetadata, ObjectStore};
