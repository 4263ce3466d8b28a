//! Single-slot snapshot cache
//!
//! Provides a `SnapshotCache` that memoizes one expensive fetch. An entry is
//! served only while it is younger than the TTL and was stored under the
//! current schema version.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};

use super::clock::{Clock, SystemClock};
use super::CacheError;

/// Time-to-live for the cached snapshot in hours
pub const SNAPSHOT_TTL_HOURS: i64 = 1;

/// Shape version of the cached snapshot
///
/// Bump this whenever `HookInfo` changes incompatibly so that entries written
/// under the old shape are no longer served.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// The stored snapshot and the metadata needed to validate it
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was stored
    fetched_at: DateTime<Utc>,
    /// Schema version in effect when the data was stored
    stored_version: u32,
}

/// Why a read did not return data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissReason {
    /// Nothing has been written yet
    Empty,
    /// The entry is older than the TTL
    Expired,
    /// The entry was stored under a different schema version
    VersionMismatch,
}

/// Outcome of a cache lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup<T> {
    Hit(T),
    Miss(MissReason),
}

/// Coarse state of the cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Never written
    Empty,
    /// Written, within TTL and on the current schema version
    Fresh,
    /// Expired or written under another schema version
    Stale,
}

/// Memoizes at most one snapshot with time-based expiry
///
/// The cache is not keyed: each `set` replaces the whole entry. It is meant to
/// be owned by a long-lived service and shared by reference, not held globally.
/// Concurrent writers are serialized by an internal lock, so the last write
/// wins and a reader never sees a partially written entry.
#[derive(Debug)]
pub struct SnapshotCache<T> {
    entry: RwLock<Option<CacheEntry<T>>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    schema_version: u32,
}

impl<T: Clone> Default for SnapshotCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> SnapshotCache<T> {
    /// Creates an empty cache using the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty cache reading time from `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entry: RwLock::new(None),
            clock,
            ttl: Duration::hours(SNAPSHOT_TTL_HOURS),
            schema_version: SNAPSHOT_SCHEMA_VERSION,
        }
    }

    /// Returns the cached snapshot if it is still valid
    ///
    /// Returns `None` when the cache is empty, expired, or holds data from
    /// another schema version. Internal faults are logged and also reported
    /// as `None`.
    pub fn get(&self) -> Option<T> {
        match self.lookup() {
            Ok(CacheLookup::Hit(data)) => {
                tracing::debug!("snapshot cache hit");
                Some(data)
            }
            Ok(CacheLookup::Miss(reason)) => {
                tracing::debug!(?reason, "snapshot cache miss");
                None
            }
            Err(e) => {
                tracing::warn!("snapshot cache read failed, treating as miss: {}", e);
                None
            }
        }
    }

    /// Replaces the cached snapshot, stamping it with the current time
    ///
    /// On an internal fault the write is dropped and logged; any previous
    /// entry is left untouched.
    pub fn set(&self, data: T) {
        if let Err(e) = self.store(data) {
            tracing::warn!("snapshot cache write failed, keeping previous entry: {}", e);
        }
    }

    /// Reports whether the cache is empty, fresh or stale
    ///
    /// A fault while checking is reported as `Stale`.
    pub fn state(&self) -> CacheState {
        match self.lookup() {
            Ok(CacheLookup::Hit(_)) => CacheState::Fresh,
            Ok(CacheLookup::Miss(MissReason::Empty)) => CacheState::Empty,
            Ok(CacheLookup::Miss(_)) | Err(_) => CacheState::Stale,
        }
    }

    /// Checks the entry against the TTL and schema version
    pub fn lookup(&self) -> Result<CacheLookup<T>, CacheError> {
        let guard = self.entry.read().map_err(|_| CacheError::Poisoned)?;

        let Some(entry) = guard.as_ref() else {
            return Ok(CacheLookup::Miss(MissReason::Empty));
        };

        if entry.stored_version != self.schema_version {
            return Ok(CacheLookup::Miss(MissReason::VersionMismatch));
        }

        let now = self.clock.now()?;
        if now - entry.fetched_at >= self.ttl {
            return Ok(CacheLookup::Miss(MissReason::Expired));
        }

        Ok(CacheLookup::Hit(entry.data.clone()))
    }

    /// Stores `data` as the new entry
    ///
    /// The timestamp is taken before the lock so a clock fault leaves the old
    /// entry in place. The entry is replaced whole, so a poisoned lock is
    /// recovered here and cleared once the new entry is in.
    fn store(&self, data: T) -> Result<(), CacheError> {
        let fetched_at = self.clock.now()?;
        let mut guard = self.entry.write().unwrap_or_else(PoisonError::into_inner);

        *guard = Some(CacheEntry {
            data,
            fetched_at,
            stored_version: self.schema_version,
        });
        drop(guard);

        if self.entry.is_poisoned() {
            tracing::debug!("snapshot cache lock recovered by write");
            self.entry.clear_poison();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use chrono::TimeZone;
    use std::thread;

    fn records(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn create_test_cache() -> (SnapshotCache<Vec<String>>, Arc<ManualClock>) {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let cache = SnapshotCache::with_clock(clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_read_on_empty_cache_is_miss() {
        let (cache, _clock) = create_test_cache();

        assert!(cache.get().is_none());
        assert_eq!(cache.lookup().unwrap(), CacheLookup::Miss(MissReason::Empty));
        assert_eq!(cache.state(), CacheState::Empty);
    }

    #[test]
    fn test_write_then_read_returns_same_snapshot() {
        let (cache, _clock) = create_test_cache();
        let snapshot = records(&["ethereum", "base"]);

        cache.set(snapshot.clone());

        assert_eq!(cache.get(), Some(snapshot));
        assert_eq!(cache.state(), CacheState::Fresh);
    }

    #[test]
    fn test_entry_still_fresh_just_before_ttl() {
        let (cache, clock) = create_test_cache();
        cache.set(records(&["recordA"]));

        clock.advance(Duration::hours(SNAPSHOT_TTL_HOURS) - Duration::milliseconds(1));

        assert_eq!(cache.get(), Some(records(&["recordA"])));
    }

    #[test]
    fn test_entry_expires_at_ttl() {
        let (cache, clock) = create_test_cache();
        cache.set(records(&["recordA"]));

        clock.advance(Duration::hours(SNAPSHOT_TTL_HOURS));

        assert!(cache.get().is_none());
        assert_eq!(
            cache.lookup().unwrap(),
            CacheLookup::Miss(MissReason::Expired)
        );
        assert_eq!(cache.state(), CacheState::Stale);
    }

    #[test]
    fn test_schema_version_bump_invalidates_entry() {
        let (mut cache, _clock) = create_test_cache();
        cache.set(records(&["recordA"]));

        cache.schema_version = SNAPSHOT_SCHEMA_VERSION + 1;

        assert!(cache.get().is_none());
        assert_eq!(
            cache.lookup().unwrap(),
            CacheLookup::Miss(MissReason::VersionMismatch)
        );
    }

    #[test]
    fn test_write_after_version_bump_is_fresh_again() {
        let (mut cache, _clock) = create_test_cache();
        cache.set(records(&["old-shape"]));
        cache.schema_version = SNAPSHOT_SCHEMA_VERSION + 1;

        cache.set(records(&["new-shape"]));

        assert_eq!(cache.get(), Some(records(&["new-shape"])));
    }

    #[test]
    fn test_second_write_replaces_first() {
        let (cache, _clock) = create_test_cache();

        cache.set(records(&["recordA", "recordB"]));
        cache.set(records(&["recordC"]));

        assert_eq!(cache.get(), Some(records(&["recordC"])));
    }

    #[test]
    fn test_write_resets_expiry() {
        let (cache, clock) = create_test_cache();
        cache.set(records(&["recordA"]));
        clock.advance(Duration::minutes(50));

        cache.set(records(&["recordB"]));
        clock.advance(Duration::minutes(50));

        assert_eq!(cache.get(), Some(records(&["recordB"])));
    }

    #[test]
    fn test_clock_fault_during_read_is_miss() {
        let (cache, clock) = create_test_cache();
        cache.set(records(&["recordA"]));

        clock.set_failing(true);

        assert!(cache.get().is_none());
        assert!(cache.lookup().is_err());
        assert_eq!(cache.state(), CacheState::Stale);
    }

    #[test]
    fn test_clock_fault_during_write_keeps_previous_entry() {
        let (cache, clock) = create_test_cache();
        cache.set(records(&["recordA"]));

        clock.set_failing(true);
        cache.set(records(&["recordB"]));
        clock.set_failing(false);

        assert_eq!(cache.get(), Some(records(&["recordA"])));
    }

    #[test]
    fn test_clock_fault_during_first_write_leaves_cache_empty() {
        let (cache, clock) = create_test_cache();

        clock.set_failing(true);
        cache.set(records(&["recordA"]));
        clock.set_failing(false);

        assert_eq!(cache.state(), CacheState::Empty);
    }

    fn poison(cache: &Arc<SnapshotCache<Vec<String>>>) {
        let poisoner = Arc::clone(cache);
        let _ = thread::spawn(move || {
            let _guard = poisoner.entry.write().unwrap();
            panic!("poisoning the cache lock");
        })
        .join();
    }

    #[test]
    fn test_poisoned_lock_degrades_to_miss() {
        let (cache, _clock) = create_test_cache();
        cache.set(records(&["recordA"]));
        let cache = Arc::new(cache);

        poison(&cache);

        assert!(cache.get().is_none());
        assert!(matches!(cache.lookup(), Err(CacheError::Poisoned)));
        assert_eq!(cache.state(), CacheState::Stale);
    }

    #[test]
    fn test_write_after_poisoning_restores_fresh_entry() {
        let (cache, _clock) = create_test_cache();
        cache.set(records(&["recordA"]));
        let cache = Arc::new(cache);
        poison(&cache);

        cache.set(records(&["recordB"]));

        assert_eq!(cache.get(), Some(records(&["recordB"])));
        assert_eq!(cache.state(), CacheState::Fresh);

        cache.set(records(&["recordC"]));
        assert_eq!(cache.get(), Some(records(&["recordC"])));
    }

    #[test]
    fn test_write_recovers_poisoned_empty_cache() {
        let (cache, _clock) = create_test_cache();
        let cache = Arc::new(cache);
        poison(&cache);

        cache.set(records(&["recordA"]));

        assert_eq!(cache.get(), Some(records(&["recordA"])));
    }

    #[test]
    fn test_concurrent_writes_last_one_wins_whole() {
        let (cache, _clock) = create_test_cache();
        let cache = Arc::new(cache);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    cache.set(vec![format!("writer-{}", i), format!("writer-{}", i)]);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = cache.get().expect("Some write should be visible");
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0], snapshot[1], "Entry must come from a single write");
    }

    #[test]
    fn test_full_lifecycle_with_expiry_and_version_bump() {
        let (mut cache, clock) = create_test_cache();

        assert!(cache.get().is_none());

        cache.set(records(&["recordA"]));
        assert_eq!(cache.get(), Some(records(&["recordA"])));

        clock.advance(Duration::hours(SNAPSHOT_TTL_HOURS) + Duration::milliseconds(1));
        assert!(cache.get().is_none());

        cache.set(records(&["recordB"]));
        assert_eq!(cache.get(), Some(records(&["recordB"])));

        cache.schema_version += 1;
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_default_cache_uses_system_clock() {
        let cache: SnapshotCache<Vec<String>> = SnapshotCache::default();
        cache.set(records(&["recordA"]));
        assert_eq!(cache.get(), Some(records(&["recordA"])));
    }
}
