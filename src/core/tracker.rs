//! Throttles URLs that keep timing out.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::core::client::constants::{TIMEOUT_SKIP_THRESHOLD, TIMEOUT_WINDOW};

#[derive(Debug, Clone, Copy)]
struct TimeoutRecord {
    consecutive_timeouts: u32,
    last_attempt_at: Instant,
}

/// Shared timeout bookkeeping, keyed by URL.
///
/// Once a URL has exhausted its retries on timeouts `threshold` times within
/// `window`, further requests to it are refused locally until the window has
/// passed since the last recorded timeout.
#[derive(Debug)]
pub struct TimeoutTracker {
    records: Mutex<HashMap<String, TimeoutRecord>>,
    threshold: u32,
    window: Duration,
}

impl Default for TimeoutTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeoutTracker {
    pub fn new() -> Self {
        Self::with_limits(TIMEOUT_SKIP_THRESHOLD, TIMEOUT_WINDOW)
    }

    pub fn with_limits(threshold: u32, window: Duration) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            threshold,
            window,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, TimeoutRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether requests to `url` should be short-circuited.
    ///
    /// A record older than the window is dropped here.
    pub fn should_skip(&self, url: &str) -> bool {
        let mut records = self.lock();
        let Some(record) = records.get(url) else {
            return false;
        };
        if record.last_attempt_at.elapsed() > self.window {
            records.remove(url);
            return false;
        }
        record.consecutive_timeouts >= self.threshold
    }

    /// Count one more timed-out request to `url` and return the new count.
    pub fn record_timeout(&self, url: &str) -> u32 {
        let now = Instant::now();
        let mut records = self.lock();
        let record = records.entry(url.to_owned()).or_insert(TimeoutRecord {
            consecutive_timeouts: 0,
            last_attempt_at: now,
        });
        if now.duration_since(record.last_attempt_at) > self.window {
            record.consecutive_timeouts = 1;
        } else {
            record.consecutive_timeouts += 1;
        }
        record.last_attempt_at = now;

        let count = record.consecutive_timeouts;
        if count >= self.threshold {
            tracing::warn!(url, count, "url keeps timing out; skipping it for a while");
        }
        count
    }

    /// Current count for `url` (0 when unknown or expired).
    pub fn timeouts(&self, url: &str) -> u32 {
        self.lock()
            .get(url)
            .filter(|r| r.last_attempt_at.elapsed() <= self.window)
            .map_or(0, |r| r.consecutive_timeouts)
    }

    pub fn reset(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
