//! Client-side sliding-window rate limiter.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Allows at most `max_requests` acquisitions in any `window`.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    stamps: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            stamps: Mutex::new(VecDeque::new()),
        }
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Instant>> {
        self.stamps.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take a slot now, or report how long until one frees up.
    fn take_or_wait(&self) -> Result<(), Duration> {
        let now = Instant::now();
        let mut stamps = self.lock();
        while let Some(front) = stamps.front() {
            if now.duration_since(*front) >= self.window {
                stamps.pop_front();
            } else {
                break;
            }
        }
        if stamps.len() < self.max_requests {
            stamps.push_back(now);
            return Ok(());
        }
        let oldest = stamps.front().copied().unwrap_or(now);
        Err(self.window.saturating_sub(now.duration_since(oldest)))
    }

    pub fn try_acquire(&self) -> bool {
        self.take_or_wait().is_ok()
    }

    /// Wait until a slot is free, then take it.
    pub async fn acquire(&self) {
        loop {
            match self.take_or_wait() {
                Ok(()) => return,
                Err(wait) => {
                    let wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
                    tracing::debug!(wait_ms, "rate limiter full; waiting");
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Acquisitions still inside the window.
    pub fn in_flight(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .iter()
            .filter(|t| now.duration_since(**t) < self.window)
            .count()
    }
}
