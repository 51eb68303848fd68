//! Best-effort suppression of duplicate low-value telemetry.
//!
//! This cache is not a correctness mechanism. It lives in one process, is
//! lost on restart and is not shared between instances, so duplicates can
//! still reach the event log. Anything that must not happen twice checks the
//! event log instead.

use std::time::Duration;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tokio::sync::Mutex;

/// Default maximum number of keys to remember before LRU eviction.
const DEFAULT_CAPACITY: usize = 10_000;

/// Default time a key is remembered.
const DEFAULT_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// A bounded LRU set of recently seen keys with a time-to-live.
#[derive(Debug)]
pub struct TelemetryDedupe {
    /// Key to the time its event was last emitted, least recently seen first.
    seen: Mutex<IndexMap<String, DateTime<Utc>>>,
    capacity: usize,
    ttl: chrono::Duration,
}

impl Default for TelemetryDedupe {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl TelemetryDedupe {
    /// Create a cache holding at most `capacity` keys for `ttl` each.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            seen: Mutex::new(IndexMap::new()),
            capacity: capacity.max(1),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500)),
        }
    }

    /// Record a sighting of `key` at `now`.
    ///
    /// Returns `true` if the key was not emitted within the TTL, meaning the
    /// caller should emit its event. The window is fixed: it starts at the
    /// emitted sighting, and suppressed repeats do not extend it. Any
    /// sighting counts as recent use for LRU eviction.
    pub async fn first_sighting(&self, key: &str, now: DateTime<Utc>) -> bool {
        let mut seen = self.seen.lock().await;

        let (fresh, emitted_at) = match seen.shift_remove(key) {
            Some(emitted) if now.signed_duration_since(emitted) < self.ttl => (false, emitted),
            _ => (true, now),
        };
        seen.insert(key.to_string(), emitted_at);

        while seen.len() > self.capacity {
            seen.shift_remove_index(0);
        }

        fresh
    }

    /// Number of keys currently remembered.
    pub async fn len(&self) -> usize {
        self.seen.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
