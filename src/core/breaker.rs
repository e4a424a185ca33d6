//! Per-service circuit breaker.
//!
//! Two states only: `Closed` and `Open`. After the cooldown the breaker
//! resets completely on the next check; there is no half-open trial request.
//!
//! ```ignore
//! breaker.try_acquire()?;
//! match call().await {
//!     Ok(_) => breaker.record_success(),
//!     Err(e) if e.is_rate_limit() => breaker.record_rate_limit(),
//!     Err(_) => breaker.record_failure(),
//! }
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::core::error::FeedError;
use crate::core::models::Service;

/// Tuning for one service's breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerConfig {
    /// Consecutive failures that open the breaker.
    pub threshold: u32,
    /// How long an ordinary trip keeps the breaker open.
    pub cooldown: Duration,
    /// How long a rate-limit trip keeps the breaker open.
    pub rate_limit_cooldown: Duration,
}

impl BreakerConfig {
    pub const fn new(threshold: u32, cooldown: Duration, rate_limit_cooldown: Duration) -> Self {
        Self {
            threshold,
            cooldown,
            rate_limit_cooldown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
}

/// Snapshot for status indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerStatus {
    pub state: BreakerState,
    pub failure_count: u32,
    /// Time until the breaker closes itself; `None` when closed.
    pub retry_in: Option<Duration>,
}

impl BreakerStatus {
    pub fn is_open(&self) -> bool {
        self.state == BreakerState::Open
    }
}

#[derive(Debug)]
struct Inner {
    is_open: bool,
    failure_count: u32,
    /// Cooldown of the current trip (ordinary or rate-limit).
    cooldown: Duration,
    last_failure_at: Option<Instant>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    service: Service,
    config: BreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(service: Service, config: BreakerConfig) -> Self {
        Self {
            service,
            config,
            inner: Mutex::new(Inner {
                is_open: false,
                failure_count: 0,
                cooldown: config.cooldown,
                last_failure_at: None,
            }),
        }
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn config(&self) -> BreakerConfig {
        self.config
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remaining open time, after resetting an expired trip.
    fn refresh(&self, inner: &mut Inner) -> Option<Duration> {
        if !inner.is_open {
            return None;
        }
        let since = inner
            .last_failure_at
            .map_or(Duration::MAX, |t| t.elapsed());
        if since >= inner.cooldown {
            info!(service = %self.service, "circuit breaker cooldown elapsed; resetting");
            self.clear(inner);
            None
        } else {
            Some(inner.cooldown - since)
        }
    }

    fn clear(&self, inner: &mut Inner) {
        inner.is_open = false;
        inner.failure_count = 0;
        inner.cooldown = self.config.cooldown;
    }

    /// Gate a call. Fails fast while open; an expired trip is reset and the
    /// call is admitted.
    pub fn try_acquire(&self) -> Result<(), FeedError> {
        let mut inner = self.lock();
        match self.refresh(&mut inner) {
            Some(retry_in) => Err(FeedError::CircuitOpen {
                service: self.service,
                retry_in,
            }),
            None => Ok(()),
        }
    }

    pub fn is_open(&self) -> bool {
        let mut inner = self.lock();
        self.refresh(&mut inner).is_some()
    }

    /// Zero the failure count. An open breaker stays open until its cooldown
    /// runs out.
    pub fn record_success(&self) {
        self.lock().failure_count = 0;
    }

    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.failure_count = inner.failure_count.saturating_add(1);
        inner.last_failure_at = Some(Instant::now());
        if inner.failure_count >= self.config.threshold && !inner.is_open {
            inner.is_open = true;
            inner.cooldown = self.config.cooldown;
            warn!(
                service = %self.service,
                failures = inner.failure_count,
                cooldown_secs = inner.cooldown.as_secs(),
                "circuit breaker opened"
            );
        }
    }

    /// Open immediately with the extended rate-limit cooldown.
    pub fn record_rate_limit(&self) {
        let mut inner = self.lock();
        inner.is_open = true;
        inner.failure_count = inner.failure_count.max(self.config.threshold);
        inner.cooldown = self.config.rate_limit_cooldown;
        inner.last_failure_at = Some(Instant::now());
        warn!(
            service = %self.service,
            cooldown_secs = inner.cooldown.as_secs(),
            "rate limited; circuit breaker opened"
        );
    }

    /// Unconditionally close the breaker.
    pub fn reset(&self) {
        let mut inner = self.lock();
        self.clear(&mut inner);
        inner.last_failure_at = None;
        info!(service = %self.service, "circuit breaker reset");
    }

    pub fn status(&self) -> BreakerStatus {
        let mut inner = self.lock();
        let retry_in = self.refresh(&mut inner);
        BreakerStatus {
            state: if retry_in.is_some() {
                BreakerState::Open
            } else {
                BreakerState::Closed
            },
            failure_count: inner.failure_count,
            retry_in,
        }
    }
}
