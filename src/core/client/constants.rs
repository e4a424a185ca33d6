//! Centralized constants for default endpoints, timing and per-service tuning.

use std::time::Duration;

use crate::core::breaker::BreakerConfig;

/// Default desktop UA so the proxy's upstreams don't reject us as a bot.
pub(crate) const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (X11; Linux x86_64) ",
    "AppleWebKit/537.36 (KHTML, like Gecko) ",
    "Chrome/122.0.0.0 Safari/537.36"
);

/// Same-origin proxy base (service name and endpoint are appended).
pub(crate) const DEFAULT_PROXY_BASE: &str = "http://localhost:3000/api/proxy/";

/// Env var overriding the proxy base.
pub(crate) const ENV_PROXY_BASE: &str = "MARKETFEED_PROXY_BASE";

/// Env var that switches on development mode (`1` or `true`).
pub(crate) const ENV_DEV_MODE: &str = "MARKETFEED_DEV";

/// Advisory attached to every response served in development mode.
pub(crate) const DEV_MODE_REASON: &str = "Development mode - API calls disabled";

/* ---------------- retry ---------------- */

pub(crate) const DEFAULT_MAX_RETRIES: u32 = 3;
pub(crate) const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);
pub(crate) const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timed-out requests are retried at most this many times.
pub(crate) const TIMEOUT_RETRY_CAP: u32 = 2;

/// Clients that talk to slow upstreams use fewer retries.
pub(crate) const SERVICE_MAX_RETRIES: u32 = 2;

/* ---------------- timeout tracker ---------------- */

pub(crate) const TIMEOUT_WINDOW: Duration = Duration::from_secs(5 * 60);
pub(crate) const TIMEOUT_SKIP_THRESHOLD: u32 = 3;

/* ---------------- cache ---------------- */

pub(crate) const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
pub(crate) const LISTINGS_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
pub(crate) const QUOTES_CACHE_TTL: Duration = Duration::from_secs(2 * 60);
pub(crate) const GLOBAL_METRICS_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/* ---------------- availability ---------------- */

/// How long a service stays disabled after a quota-exhaustion message.
pub(crate) const QUOTA_COOLDOWN: Duration = Duration::from_secs(24 * 60 * 60);
/// How long a service stays disabled after the provider reports an outage.
pub(crate) const OUTAGE_COOLDOWN: Duration = Duration::from_secs(60 * 60);

/* ---------------- breakers ---------------- */

const MINUTE: u64 = 60;

pub(crate) const FINNHUB_BREAKER: BreakerConfig = BreakerConfig::new(
    3,
    Duration::from_secs(5 * MINUTE),
    Duration::from_secs(10 * MINUTE),
);

pub(crate) const COINMARKETCAP_BREAKER: BreakerConfig = BreakerConfig::new(
    3,
    Duration::from_secs(MINUTE),
    Duration::from_secs(15 * MINUTE),
);

pub(crate) const TWELVEDATA_BREAKER: BreakerConfig = BreakerConfig::new(
    3,
    Duration::from_secs(MINUTE),
    Duration::from_secs(10 * MINUTE),
);

pub(crate) const NEWSAPI_BREAKER: BreakerConfig = BreakerConfig::new(
    3,
    Duration::from_secs(MINUTE),
    Duration::from_secs(10 * MINUTE),
);

pub(crate) const YFINANCE_BREAKER: BreakerConfig = BreakerConfig::new(
    3,
    Duration::from_secs(MINUTE),
    Duration::from_secs(5 * MINUTE),
);

/* ---------------- rate limits (free/basic plans) ---------------- */

pub(crate) const COINMARKETCAP_REQUESTS_PER_MINUTE: usize = 333;
pub(crate) const TWELVEDATA_REQUESTS_PER_MINUTE: usize = 800;
pub(crate) const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(MINUTE);
