//! Longer-lived "stop calling this provider" switch, separate from the
//! breaker. Providers that report exhausted credits or a self-declared outage
//! are switched off for hours, not minutes.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::core::client::constants::{OUTAGE_COOLDOWN, QUOTA_COOLDOWN};
use crate::core::error::{FeedError, is_quota_message};
use crate::core::models::Service;

const OUTAGE_PHRASES: &[&str] = &[
    "server error",
    "service unavailable",
    "internal server error",
    "bad gateway",
];

/// Snapshot of one service's availability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityStatus {
    pub service: Service,
    pub disabled: bool,
    pub retry_in: Option<Duration>,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ApiAvailability {
    disabled_until: Mutex<HashMap<Service, Instant>>,
}

impl ApiAvailability {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Service, Instant>> {
        self.disabled_until
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Time left on the switch-off, clearing it once it has run out.
    pub fn disabled_for(&self, service: Service) -> Option<Duration> {
        let mut map = self.lock();
        let until = *map.get(&service)?;
        let now = Instant::now();
        if now >= until {
            map.remove(&service);
            info!(%service, "api re-enabled");
            None
        } else {
            Some(until - now)
        }
    }

    pub fn is_disabled(&self, service: Service) -> bool {
        self.disabled_for(service).is_some()
    }

    /// Gate used by service clients before any network traffic.
    pub fn check(&self, service: Service) -> Result<(), FeedError> {
        match self.disabled_for(service) {
            Some(retry_in) => Err(FeedError::ApiDisabled { service, retry_in }),
            None => Ok(()),
        }
    }

    pub fn disable(&self, service: Service, duration: Duration) {
        self.lock().insert(service, Instant::now() + duration);
        warn!(%service, secs = duration.as_secs(), "api disabled");
    }

    pub fn enable(&self, service: Service) {
        self.lock().remove(&service);
    }

    pub fn enable_all(&self) {
        self.lock().clear();
    }

    /// Inspect a provider error and switch the service off when it signals
    /// exhausted credits or an outage. Returns whether it did.
    pub fn handle_error(&self, service: Service, err: &FeedError) -> bool {
        let FeedError::Api { message, .. } = err else {
            return false;
        };
        if is_quota_message(message) {
            self.disable(service, QUOTA_COOLDOWN);
            return true;
        }
        let lower = message.to_ascii_lowercase();
        if OUTAGE_PHRASES.iter().any(|p| lower.contains(p)) {
            self.disable(service, OUTAGE_COOLDOWN);
            return true;
        }
        false
    }

    pub fn status(&self, service: Service) -> AvailabilityStatus {
        let retry_in = self.disabled_for(service);
        let message = match retry_in {
            Some(d) => format!(
                "{service} API disabled due to rate limits. Will retry in {} minutes",
                d.as_secs().div_ceil(60)
            ),
            None => format!("{service} API available"),
        };
        AvailabilityStatus {
            service,
            disabled: retry_in.is_some(),
            retry_in,
            message,
        }
    }
}
