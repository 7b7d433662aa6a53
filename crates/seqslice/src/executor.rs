//! Execution adapter.
//!
//! The boundary to whatever runs the work: preprocessing range scans and
//! user worker functions both go through [`ExecutionBackend::map_ordered`].
//! The core only relies on positional correspondence between units and
//! outputs; retries, back-pressure and scheduling are the backend's
//! business.

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt, TryStreamExt};
use futures::FutureExt;
use seqslice_common::Result;
use std::future::Future;

/// Maps an async task over an ordered sequence of opaque work units.
pub trait ExecutionBackend: Send + Sync {
    /// Run `f` over every unit, returning one output per unit in
    /// submission order. The first task error fails the whole call and
    /// abandons in-flight tasks.
    fn map_ordered<'a, U, T, F, Fut>(&'a self, units: Vec<U>, f: F) -> BoxFuture<'a, Result<Vec<T>>>
    where
        U: Send + 'a,
        T: Send + 'a,
        F: Fn(U) -> Fut + Send + Sync + 'a,
        Fut: Future<Output = Result<T>> + Send + 'a;
}

/// In-process execution backend with bounded concurrency.
#[derive(Debug, Clone)]
pub struct LocalExecutor {
    parallelism: usize,
}

impl LocalExecutor {
    /// Create an executor running at most `parallelism` tasks at once.
    pub fn new(parallelism: usize) -> Self {
        Self { parallelism }
    }
}

impl Default for LocalExecutor {
    fn default() -> Self {
        Self::new(4)
    }
}

impl ExecutionBackend for LocalExecutor {
    fn map_ordered<'a, U, T, F, Fut>(&'a self, units: Vec<U>, f: F) -> BoxFuture<'a, Result<Vec<T>>>
    where
        U: Send + 'a,
        T: Send + 'a,
        F: Fn(U) -> Fut + Send + Sync + 'a,
        Fut: Future<Output = Result<T>> + Send + 'a,
    {
        let parallelism = self.parallelism.max(1);

        // `buffered` (not `buffer_unordered`): output ordinals are part of
        // the contract
        stream::iter(units.into_iter().map(f))
            .buffered(parallelism)
            .try_collect::<Vec<T>>()
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqslice_common::Error;
    use std::time::Duration;

    #[tokio::test]
    async fn test_map_ordered_preserves_submission_order() {
        let executor = LocalExecutor::new(8);

        // Later units finish earlier; output order must still match input
        let results = executor
            .map_ordered((0u64..8).collect(), |i| async move {
                tokio::time::sleep(Duration::from_millis(80 - i * 10)).await;
                Ok(i * 2)
            })
            .await
            .unwrap();

        assert_eq!(results, vec![0, 2, 4, 6, 8, 10, 12, 14]);
    }

    #[tokio::test]
    async fn test_map_ordered_fails_whole_on_task_error() {
        let executor = LocalExecutor::new(4);

        let result = executor
            .map_ordered((0u64..8).collect(), |i| async move {
                if i == 3 {
                    Err(Error::Internal("task 3 exploded".to_string()))
                } else {
                    Ok(i)
                }
            })
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_map_ordered_empty_units() {
        let executor = LocalExecutor::default();
        let results: Vec<u64> = executor
            .map_ordered(Vec::new(), |i: u64| async move { Ok(i) })
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
