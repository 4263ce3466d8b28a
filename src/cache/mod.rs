//! In-memory snapshot cache with expiry and schema-version invalidation
//!
//! This module holds the single most recent snapshot fetched from the stats
//! backend, together with the time it was fetched and the schema version it was
//! stored under. Reads and writes never fail from the caller's point of view:
//! internal faults are logged and degrade to a cache miss.

pub mod clock;
mod snapshot;

use thiserror::Error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use snapshot::{
    CacheLookup, CacheState, MissReason, SnapshotCache, SNAPSHOT_SCHEMA_VERSION,
    SNAPSHOT_TTL_HOURS,
};

/// Internal faults raised while reading or writing the snapshot cache
///
/// These never escape `SnapshotCache::get` or `SnapshotCache::set`.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The clock could not produce the current time
    #[error("Clock error: {0}")]
    Clock(String),

    /// A thread panicked while holding the cache lock
    #[error("Cache lock poisoned")]
    Poisoned,
}
