//! Time sources for the snapshot cache
//!
//! `SystemClock` is used in production. `ManualClock` lets tests move time
//! forward (or make the clock fail) without sleeping.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Duration, Utc};

use super::CacheError;

/// Source of the current time for expiry checks
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Returns the current time, or an error if it cannot be determined
    fn now(&self) -> Result<DateTime<Utc>, CacheError>;
}

/// Wall clock backed by `SystemTime`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<DateTime<Utc>, CacheError> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| CacheError::Clock(format!("system time is before the Unix epoch: {}", e)))?;

        let secs = i64::try_from(since_epoch.as_secs())
            .map_err(|_| CacheError::Clock("system time out of range".to_string()))?;

        DateTime::from_timestamp(secs, since_epoch.subsec_nanos())
            .ok_or_else(|| CacheError::Clock("system time out of range".to_string()))
    }
}

/// Clock whose time only changes when told to
///
/// Shared between a test and the cache through an `Arc`.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    failing: AtomicBool,
}

impl ManualClock {
    /// Creates a clock frozen at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
            failing: AtomicBool::new(false),
        }
    }

    /// Moves the clock forward by `by`
    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }

    /// Sets the clock to an exact time
    pub fn set(&self, to: DateTime<Utc>) {
        if let Ok(mut now) = self.now.lock() {
            *now = to;
        }
    }

    /// When `true`, every call to `now` returns a clock error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Result<DateTime<Utc>, CacheError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::Clock("manual clock set to fail".to_string()));
        }
        self.now
            .lock()
            .map(|now| *now)
            .map_err(|_| CacheError::Poisoned)
    }
}
