//! Storage layer for seqslice.
//!
//! Provides the object storage abstraction (local filesystem and S3
//! backends) and the [`RemoteObjectHandle`] used by the core crate to issue
//! ranged reads against a single remote object.

pub mod handle;
pub mod object_store;

pub use handle::RemoteObjectHandle;
pub use object_store::{
    create_object_store, LocalBackend, ObjectMetadata, ObjectStore, ObjectStoreConfig,
    ObjectStoreError, ObjectStoreResult, S3Backend, StorageBackend,
};
