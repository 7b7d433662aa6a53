//! FASTA objects: the user-facing composition of handle, index and
//! partitioner.

use crate::attributes::Attributes;
use crate::config::PreprocessConfig;
use crate::executor::ExecutionBackend;
use crate::index::ObjectIndex;
use crate::index_cache::IndexCache;
use crate::partition::{partition, PartitionStrategy};
use crate::preprocess::Preprocessor;
use crate::slice::PartitionSlice;
use seqslice_common::{Error, Result};
use seqslice_storage::{ObjectStore, RemoteObjectHandle};
use std::sync::Arc;
use tracing::{info, warn};

/// A FASTA file in remote storage, viewed as a partitionable data source.
///
/// `open` resolves the handle, `preprocess` builds (or loads) the record
/// index, and `partition` turns the index into independently fetchable
/// slices. Attributes and partitioning both require the index; neither
/// triggers preprocessing implicitly.
pub struct FastaObject {
    handle: Arc<RemoteObjectHandle>,
    index: Option<ObjectIndex>,
    cache: IndexCache,
}

impl FastaObject {
    /// Resolve `key` against the store.
    pub async fn open(store: Arc<dyn ObjectStore>, key: &str) -> Result<Self> {
        let cache = IndexCache::new(Arc::clone(&store));
        let handle = RemoteObjectHandle::resolve(store, key).await?;

        Ok(Self {
            handle: Arc::new(handle),
            index: None,
            cache,
        })
    }

    /// The underlying object handle.
    pub fn handle(&self) -> &Arc<RemoteObjectHandle> {
        &self.handle
    }

    /// The built index, if preprocessing has run.
    pub fn index(&self) -> Option<&ObjectIndex> {
        self.index.as_ref()
    }

    /// Build the record index, scanning ranges in parallel through
    /// `executor`.
    ///
    /// When `config.cache_index` is set, a persisted artifact keyed by the
    /// object and the config fingerprint is consulted first and updated
    /// after a fresh scan. Re-running with an identical config on an
    /// unchanged object reproduces an identical index.
    pub async fn preprocess<E: ExecutionBackend>(
        &mut self,
        config: PreprocessConfig,
        executor: &E,
    ) -> Result<&ObjectIndex> {
        config.validate()?;
        let fingerprint = config.fingerprint();

        if config.cache_index {
            if let Some(cached) = self
                .cache
                .load(self.handle.key(), &fingerprint, self.handle.size())
                .await
            {
                info!(
                    key = %self.handle.key(),
                    records = cached.record_count,
                    "Reusing persisted index"
                );
                return Ok(&*self.index.insert(cached));
            }
        }

        let index = Preprocessor::new(Arc::clone(&self.handle), config.clone())
            .run(executor)
            .await?;

        if config.cache_index {
            if let Err(e) = self
                .cache
                .store(self.handle.key(), &fingerprint, &index)
                .await
            {
                warn!(key = %self.handle.key(), error = %e, "Failed to persist index artifact");
            }
        }

        Ok(&*self.index.insert(index))
    }

    /// Typed read-only view over the index metadata.
    ///
    /// Fails with [`Error::Precondition`] until `preprocess` has run.
    pub fn attributes(&self) -> Result<Attributes> {
        match &self.index {
            Some(index) => Ok(Attributes::from(index)),
            None => Err(Error::Precondition(format!(
                "object '{}' has not been preprocessed",
                self.handle.key()
            ))),
        }
    }

    /// Plan a partitioning of the object into lazily-fetched slices.
    ///
    /// Synchronous and I/O-free; argument errors surface before any
    /// network activity. Fails with [`Error::Precondition`] until
    /// `preprocess` has run.
    pub fn partition(&self, strategy: &PartitionStrategy) -> Result<Vec<PartitionSlice>> {
        let index = self.index.as_ref().ok_or_else(|| {
            Error::Precondition(format!(
                "object '{}' has not been preprocessed",
                self.handle.key()
            ))
        })?;

        partition(&self.handle, index, strategy)
    }
}

impl std::fmt::Debug for FastaObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastaObject")
            .field("handle", &self.handle)
            .field("indexed", &self.index.is_some())
            .finish()
    }
}
