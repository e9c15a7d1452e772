//! Fixed-window rate limiting keyed by caller identity.
//!
//! Buckets live in an injectable [`BucketStore`]. The default store is an
//! in-process map, so limits are enforced per instance and reset on restart.
//! A bucket whose window has elapsed is replaced lazily on the next hit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::guard::clock::{Clock, SystemClock};
use crate::guard::GuardError;

pub const DEFAULT_MAX: u32 = 30;
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(60_000);

/// Prune expired buckets once the map grows past this many keys.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitOptions {
    pub max: u32,
    pub window: Duration,
}

impl Default for RateLimitOptions {
    fn default() -> Self {
        Self {
            max: DEFAULT_MAX,
            window: DEFAULT_WINDOW,
        }
    }
}

#[cfg(test)]
impl RateLimitOptions {
    pub fn new(max: u32, window: Duration) -> Self {
        Self { max, window }
    }
}

/// Counter plus the absolute time (epoch millis) at which it resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub count: u32,
    pub reset_at: u64,
}

impl Bucket {
    fn fresh(now: u64, window: Duration) -> Self {
        Self {
            count: 0,
            reset_at: now.saturating_add(window.as_millis() as u64),
        }
    }

    fn is_expired(&self, now: u64) -> bool {
        now >= self.reset_at
    }
}

/// Storage for rate-limit buckets.
///
/// `acquire` must be atomic per key: the expiry check, the comparison against
/// `max` and the increment happen as one step.
pub trait BucketStore: Send + Sync {
    /// Takes one unit from the bucket for `key`. Returns the updated bucket, or
    /// the unchanged full bucket as `Err` when the limit is already reached.
    fn acquire(&self, key: &str, now: u64, options: RateLimitOptions) -> Result<Bucket, Bucket>;

    /// Current bucket for `key`, ignoring expiry.
    #[cfg(test)]
    fn peek(&self, key: &str) -> Option<Bucket>;
}

/// In-process bucket map behind a single mutex.
#[derive(Debug, Default)]
pub struct MemoryBucketStore {
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl MemoryBucketStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl BucketStore for MemoryBucketStore {
    fn acquire(&self, key: &str, now: u64, options: RateLimitOptions) -> Result<Bucket, Bucket> {
        let mut buckets = self
            .buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if buckets.len() > PRUNE_THRESHOLD {
            let before = buckets.len();
            buckets.retain(|_, b| !b.is_expired(now));
            tracing::debug!(
                pruned = before - buckets.len(),
                remaining = buckets.len(),
                "pruned expired rate-limit buckets"
            );
        }

        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| Bucket::fresh(now, options.window));

        if bucket.is_expired(now) {
            *bucket = Bucket::fresh(now, options.window);
        }

        if bucket.count >= options.max {
            return Err(*bucket);
        }

        bucket.count += 1;
        Ok(*bucket)
    }

    #[cfg(test)]
    fn peek(&self, key: &str) -> Option<Bucket> {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
    }
}

pub struct RateLimiter {
    clock: Arc<dyn Clock>,
    store: Arc<dyn BucketStore>,
}

impl RateLimiter {
    pub fn new(clock: Arc<dyn Clock>, store: Arc<dyn BucketStore>) -> Self {
        Self { clock, store }
    }

    /// Production limiter: system clock, in-memory buckets.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(MemoryBucketStore::new()))
    }

    /// Counts one hit against `key`; fails once more than `max` hits land in
    /// the current window.
    pub fn assert_rate_limit(&self, key: &str, options: RateLimitOptions) -> Result<(), GuardError> {
        let now = self.clock.now_millis();
        match self.store.acquire(key, now, options) {
            Ok(_) => Ok(()),
            Err(bucket) => {
                tracing::warn!(
                    key,
                    count = bucket.count,
                    max = options.max,
                    "rate limit exceeded"
                );
                Err(GuardError::RateLimited)
            }
        }
    }

    /// Hits counted in the live window for `key` (0 if none or expired).
    #[cfg(test)]
    pub fn count(&self, key: &str) -> u32 {
        let now = self.clock.now_millis();
        match self.store.peek(key) {
            Some(bucket) if !bucket.is_expired(now) => bucket.count,
            _ => 0,
        }
    }
}
