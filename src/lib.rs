//! marketfeed-rs: resilient market-data client.
//!
//! Talks to Finnhub, CoinMarketCap, Twelve Data, NewsAPI and YFinance through a
//! same-origin proxy. Every call goes through per-attempt deadlines, bounded
//! retries, a per-service circuit breaker and a short-lived response cache,
//! and ends in an [`Outcome`]: live, cached, or degraded fallback data with an
//! advisory message. Callers always get something to render.

pub mod core;

pub mod coinmarketcap;
pub mod fallback;
pub mod finnhub;
pub mod news;
pub mod newsapi;
pub mod ratelimit;
pub mod ticker;
pub mod twelvedata;
pub mod yfinance;

pub use crate::core::{
    AbortOrigin, BreakerConfig, BreakerState, BreakerStatus, CacheMode, CallOptions, CancelScope,
    CircuitBreaker, FeedClient, FeedClientBuilder, FeedError, FeedState, FetchOptions,
    HttpRequest, HttpResponse, Outcome, ReqwestTransport, ResponseCache, RetryPolicy,
    RobustFetch, SendFuture, Service, TimeoutTracker, Transport, TransportError,
};
pub use coinmarketcap::CoinMarketCapClient;
pub use fallback::{ApiAvailability, AvailabilityStatus, FallbackDataProvider};
pub use finnhub::FinnhubClient;
pub use news::NewsArticle;
pub use newsapi::NewsApiClient;
pub use ratelimit::RateLimiter;
pub use ticker::{AssetKind, Ticker};
pub use twelvedata::TwelveDataClient;
pub use yfinance::YFinanceClient;

/// Install a `fmt` subscriber filtered by `RUST_LOG`. Does nothing if a global
/// subscriber is already set.
#[cfg(feature = "tracing-subscriber")]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
