use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::core::models::Service;

/// Who cancelled an in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortOrigin {
    /// The caller's cancellation token fired.
    External,
    /// The request scope was cancelled from inside the crate.
    Internal,
}

impl fmt::Display for AbortOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::External => f.write_str("aborted externally"),
            Self::Internal => f.write_str("cancelled"),
        }
    }
}

/// The primary error type for all fallible operations in this crate.
///
/// Every variant is produced at the point of failure (deadline timer, abort
/// listener, status check, decoder), so callers classify by matching on the
/// variant and never by inspecting the message. The `Display` output is meant
/// to be shown to end users as-is.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The per-attempt deadline elapsed before the server answered.
    #[error("Network request timed out. Please check your connection and try again.")]
    Timeout,

    /// The request was cancelled before it completed.
    #[error("Request was {0}")]
    Aborted(AbortOrigin),

    /// The server could not be reached (DNS, connect, reset, broken body).
    #[error("Network error - please check your connection")]
    Network {
        /// Low-level description kept for logs.
        detail: String,
    },

    /// The server answered with a non-2xx status.
    #[error("Request failed with HTTP status {status}")]
    Http {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// The provider reported that its rate limit or quota was exceeded.
    #[error("{service} rate limit exceeded - API temporarily unavailable")]
    RateLimited {
        /// The provider that throttled us.
        service: Service,
    },

    /// The body was not the JSON document we expected.
    #[error("Invalid response from API: {0}")]
    Parse(String),

    /// An HTML page came back where JSON was expected, which means the proxy
    /// itself is down or misrouted.
    #[error("API proxy returned HTML instead of JSON - service may be unavailable")]
    ProxyUnavailable,

    /// The URL has timed out too often recently and is being skipped.
    #[error("Request temporarily unavailable due to recent timeouts. Please try again later.")]
    TemporarilyUnavailable,

    /// The service's circuit breaker is open.
    #[error("{service} service temporarily unavailable - circuit breaker is open")]
    CircuitOpen {
        /// The guarded service.
        service: Service,
        /// Time left until the breaker resets itself.
        retry_in: Duration,
    },

    /// The service was switched off after a quota or outage signal.
    #[error("{service} API disabled after repeated limit errors")]
    ApiDisabled {
        /// The disabled service.
        service: Service,
        /// Time left until calls are allowed again.
        retry_in: Duration,
    },

    /// The provider answered 2xx but reported an error in its envelope.
    #[error("{service} API error: {message}")]
    Api {
        /// The provider that reported the error.
        service: Service,
        /// Provider-specific error code, when one was given.
        code: Option<i64>,
        /// Provider-supplied message.
        message: String,
    },

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("HTTP client configuration error: {0}")]
    Client(String),
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        FeedError::Parse(e.to_string())
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        FeedError::Client(e.to_string())
    }
}

impl FeedError {
    /// Whether a fresh attempt could plausibly succeed.
    ///
    /// Timeouts, connectivity failures and 5xx responses are transient; client
    /// errors, aborts and decoding problems are terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Network { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns the HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 429 responses and provider rate-limit envelopes.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited { .. }) || self.status() == Some(429)
    }

    /// 4xx responses other than 429 (which is treated as a rate limit).
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(s) if (400..500).contains(&s) && s != 429)
    }

    /// Errors that say the route to the provider is broken rather than the
    /// provider itself. A 5xx counts: the proxy answered but could not reach
    /// upstream.
    pub fn is_connectivity(&self) -> bool {
        match self {
            Self::ProxyUnavailable | Self::Network { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Classify an error reported inside a provider's JSON envelope.
    ///
    /// HTTP-style 429 codes and rate-limit wording become `RateLimited`;
    /// everything else is kept as `Api`.
    pub(crate) fn from_provider(service: Service, code: Option<i64>, message: impl Into<String>) -> Self {
        let message = message.into();
        if code == Some(429) || is_rate_limit_message(&message) {
            return Self::RateLimited { service };
        }
        Self::Api {
            service,
            code,
            message,
        }
    }

    /// Errors raised by a local gate before any network traffic happened.
    pub fn is_gated(&self) -> bool {
        matches!(
            self,
            Self::CircuitOpen { .. }
                | Self::ApiDisabled { .. }
                | Self::TemporarilyUnavailable
                | Self::ProxyUnavailable
        )
    }
}

/// Phrases providers use when a rate limit or quota is hit.
const RATE_LIMIT_PHRASES: &[&str] = &["rate limit", "too many requests", "api limit reached"];

/// Phrases providers use when a plan's credits are used up for the day.
const QUOTA_PHRASES: &[&str] = &[
    "run out of api credits",
    "daily limit",
    "api call limit",
    "credit limit",
    "quota exceeded",
];

pub(crate) fn is_rate_limit_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    RATE_LIMIT_PHRASES.iter().any(|p| lower.contains(p))
}

pub(crate) fn is_quota_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    QUOTA_PHRASES.iter().any(|p| lower.contains(p))
}
