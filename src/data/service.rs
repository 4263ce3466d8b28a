//! Cached access to hook stats
//!
//! `StatsService` consults its `SnapshotCache` first and only goes to the
//! backend on a miss, writing the fresh snapshot back before returning it.

use std::future::Future;

use super::graphql::{StatsClient, StatsError};
use super::Snapshot;
use crate::cache::SnapshotCache;

/// Anything that can produce a fresh snapshot
pub trait StatsSource {
    /// Fetches a fresh snapshot, bypassing any cache
    fn fetch_snapshot(&self) -> impl Future<Output = Result<Snapshot, StatsError>> + Send;
}

impl StatsSource for StatsClient {
    fn fetch_snapshot(&self) -> impl Future<Output = Result<Snapshot, StatsError>> + Send {
        self.fetch_hook_infos()
    }
}

/// Long-lived owner of the snapshot cache
///
/// Build one per process and share it (e.g. through an `Arc`) with whatever
/// needs hook stats.
#[derive(Debug)]
pub struct StatsService<S = StatsClient> {
    source: S,
    cache: SnapshotCache<Snapshot>,
}

impl<S: StatsSource> StatsService<S> {
    /// Creates a service with an empty cache on the system clock
    pub fn new(source: S) -> Self {
        Self::with_cache(source, SnapshotCache::new())
    }

    /// Creates a service around an existing cache
    pub fn with_cache(source: S, cache: SnapshotCache<Snapshot>) -> Self {
        Self { source, cache }
    }

    /// The cache backing this service
    pub fn cache(&self) -> &SnapshotCache<Snapshot> {
        &self.cache
    }

    /// Returns hook stats, from cache when valid
    ///
    /// # Behavior
    /// - Cache hit: returns the cached snapshot without touching the backend
    /// - Cache miss: fetches, stores the result, then returns it
    /// - Fetch failure: returns the error and leaves the cache as it was
    pub async fn hook_infos(&self) -> Result<Snapshot, StatsError> {
        if let Some(snapshot) = self.cache.get() {
            return Ok(snapshot);
        }

        let snapshot = self.source.fetch_snapshot().await?;
        tracing::debug!(records = snapshot.len(), "caching fresh hook stats snapshot");
        self.cache.set(snapshot.clone());

        Ok(snapshot)
    }
}
