//! Composition root + builder.
//! Tuning defaults live in `constants`; per-call policy types in `retry`.

pub(crate) mod constants;
mod retry;

pub use retry::{CacheMode, RetryPolicy};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use constants::{
    COINMARKETCAP_BREAKER, COINMARKETCAP_REQUESTS_PER_MINUTE, DEFAULT_CACHE_TTL,
    DEFAULT_PROXY_BASE, ENV_DEV_MODE, ENV_PROXY_BASE, FINNHUB_BREAKER, NEWSAPI_BREAKER,
    RATE_LIMIT_WINDOW, SERVICE_MAX_RETRIES, TWELVEDATA_BREAKER, TWELVEDATA_REQUESTS_PER_MINUTE,
    USER_AGENT, YFINANCE_BREAKER,
};
use url::Url;

use crate::coinmarketcap::CoinMarketCapClient;
use crate::core::breaker::BreakerConfig;
use crate::core::error::FeedError;
use crate::core::fetch::RobustFetch;
use crate::core::models::Service;
use crate::core::net::{ReqwestTransport, Transport};
use crate::core::services::{ServiceSettings, Shared};
use crate::core::tracker::TimeoutTracker;
use crate::fallback::{ApiAvailability, FallbackDataProvider};
use crate::finnhub::FinnhubClient;
use crate::newsapi::NewsApiClient;
use crate::twelvedata::TwelveDataClient;
use crate::yfinance::YFinanceClient;

/// Owns one client per provider plus the state they share.
///
/// Cloning is cheap; clones share breakers, caches and the timeout tracker.
#[derive(Debug, Clone)]
pub struct FeedClient {
    finnhub: FinnhubClient,
    coinmarketcap: CoinMarketCapClient,
    twelvedata: TwelveDataClient,
    newsapi: NewsApiClient,
    yfinance: YFinanceClient,
    tracker: Arc<TimeoutTracker>,
    availability: Arc<ApiAvailability>,
    fallback: Arc<FallbackDataProvider>,
    dev_mode: bool,
}

impl FeedClient {
    /// Create a new builder.
    pub fn builder() -> FeedClientBuilder {
        FeedClientBuilder::default()
    }

    pub fn finnhub(&self) -> &FinnhubClient {
        &self.finnhub
    }

    pub fn coinmarketcap(&self) -> &CoinMarketCapClient {
        &self.coinmarketcap
    }

    pub fn twelvedata(&self) -> &TwelveDataClient {
        &self.twelvedata
    }

    pub fn newsapi(&self) -> &NewsApiClient {
        &self.newsapi
    }

    pub fn yfinance(&self) -> &YFinanceClient {
        &self.yfinance
    }

    /// The process-wide timeout bookkeeping shared by every client.
    pub fn tracker(&self) -> &Arc<TimeoutTracker> {
        &self.tracker
    }

    pub fn availability(&self) -> &Arc<ApiAvailability> {
        &self.availability
    }

    pub fn fallback(&self) -> &FallbackDataProvider {
        &self.fallback
    }

    pub fn is_dev_mode(&self) -> bool {
        self.dev_mode
    }

    /// Reset every breaker, availability switch and the timeout tracker.
    /// Caches are kept.
    pub fn reset_all(&self) {
        self.finnhub.reset();
        self.coinmarketcap.reset();
        self.twelvedata.reset();
        self.newsapi.reset();
        self.yfinance.reset();
        self.availability.enable_all();
        self.tracker.reset();
        tracing::info!("all services reset");
    }

    /// Drop every cached response.
    pub async fn clear_caches(&self) {
        self.finnhub.clear_cache().await;
        self.coinmarketcap.clear_cache().await;
        self.twelvedata.clear_cache().await;
        self.newsapi.clear_cache().await;
        self.yfinance.clear_cache().await;
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default, Debug)]
pub struct FeedClientBuilder {
    base_url: Option<Url>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry_policy: Option<RetryPolicy>,
    dev_mode: Option<bool>,
    cache_ttl: Option<Duration>,
    breakers: HashMap<Service, BreakerConfig>,
    api_keys: HashMap<Service, String>,
    rate_limits: HashMap<Service, Option<(usize, Duration)>>,
    transport: Option<Arc<dyn Transport>>,
    tracker: Option<Arc<TimeoutTracker>>,
    fallback_seed: Option<u64>,
}

impl FeedClientBuilder {
    /// Override the proxy base. Service names and endpoints are appended to it.
    /// Default: `$MARKETFEED_PROXY_BASE`, else `http://localhost:3000/api/proxy/`.
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Override the User-Agent of the default transport.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Per-attempt deadline for every client. Default: 10 s.
    #[must_use]
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Connect timeout of the default transport. Default: none.
    #[must_use]
    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Retry policy used by every client unless overridden per call.
    #[must_use]
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Skip the network entirely and serve fallback data.
    /// Default: `$MARKETFEED_DEV` set to `1` or `true`.
    #[must_use]
    pub const fn dev_mode(mut self, on: bool) -> Self {
        self.dev_mode = Some(on);
        self
    }

    /// Default TTL for endpoints without their own.
    #[must_use]
    pub fn cache_ttl(mut self, dur: Duration) -> Self {
        self.cache_ttl = Some(dur);
        self
    }

    #[must_use]
    pub fn breaker(mut self, service: Service, config: BreakerConfig) -> Self {
        self.breakers.insert(service, config);
        self
    }

    /// API key sent the way the provider expects it (query or header).
    #[must_use]
    pub fn api_key(mut self, service: Service, key: impl Into<String>) -> Self {
        self.api_keys.insert(service, key.into());
        self
    }

    /// Client-side request budget for `service`.
    #[must_use]
    pub fn rate_limit(mut self, service: Service, max_requests: usize, window: Duration) -> Self {
        self.rate_limits
            .insert(service, Some((max_requests, window)));
        self
    }

    /// Turn off the client-side limiter for `service`.
    #[must_use]
    pub fn no_rate_limit(mut self, service: Service) -> Self {
        self.rate_limits.insert(service, None);
        self
    }

    /// Replace the HTTP transport (tests, custom stacks).
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Share an existing timeout tracker instead of creating one.
    #[must_use]
    pub fn timeout_tracker(mut self, tracker: Arc<TimeoutTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Seed the fallback generator so synthetic data is reproducible.
    #[must_use]
    pub const fn fallback_seed(mut self, seed: u64) -> Self {
        self.fallback_seed = Some(seed);
        self
    }

    /// # Errors
    ///
    /// Returns `FeedError::Url` for an unparsable proxy base and
    /// `FeedError::Client` if the default HTTP client cannot be built.
    pub fn build(mut self) -> Result<FeedClient, FeedError> {
        let proxy_base = match self.base_url.take() {
            Some(url) => url,
            None => {
                let raw = std::env::var(ENV_PROXY_BASE)
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_PROXY_BASE.to_string());
                Url::parse(raw.trim())?
            }
        };
        let proxy_base = with_trailing_slash(proxy_base);
        let dev_mode = self.dev_mode.unwrap_or_else(dev_mode_from_env);

        let transport: Arc<dyn Transport> = match self.transport.take() {
            Some(t) => t,
            None => Arc::new(ReqwestTransport::build(
                self.user_agent.as_deref().unwrap_or(USER_AGENT),
                self.connect_timeout,
            )?),
        };
        let tracker = self.tracker.take().unwrap_or_default();
        let availability = Arc::new(ApiAvailability::new());
        let fallback = Arc::new(match self.fallback_seed {
            Some(seed) => FallbackDataProvider::seeded(seed),
            None => FallbackDataProvider::new(),
        });
        let shared = Shared {
            fetch: RobustFetch::new(transport, Arc::clone(&tracker)),
            availability: Arc::clone(&availability),
            fallback: Arc::clone(&fallback),
        };

        if dev_mode {
            tracing::info!("development mode: network calls disabled");
        }

        let settings = |service| self.settings_for(service, &proxy_base, dev_mode);
        Ok(FeedClient {
            finnhub: FinnhubClient::new(settings(Service::Finnhub), shared.clone())?,
            coinmarketcap: CoinMarketCapClient::new(
                settings(Service::CoinMarketCap),
                shared.clone(),
            )?,
            twelvedata: TwelveDataClient::new(settings(Service::TwelveData), shared.clone())?,
            newsapi: NewsApiClient::new(settings(Service::NewsApi), shared.clone())?,
            yfinance: YFinanceClient::new(settings(Service::YFinance), shared)?,
            tracker,
            availability,
            fallback,
            dev_mode,
        })
    }

    fn settings_for(&self, service: Service, proxy_base: &Url, dev_mode: bool) -> ServiceSettings {
        let mut retry = self
            .retry_policy
            .clone()
            .unwrap_or_else(|| default_retry(service));
        if let Some(t) = self.timeout {
            retry.timeout = t;
        }
        let rate_limit = match self.rate_limits.get(&service) {
            Some(custom) => *custom,
            None => default_rate_limit(service),
        };
        ServiceSettings {
            service,
            proxy_base: proxy_base.clone(),
            breaker: self
                .breakers
                .get(&service)
                .copied()
                .unwrap_or_else(|| default_breaker(service)),
            retry,
            cache_ttl: self.cache_ttl.unwrap_or(DEFAULT_CACHE_TTL),
            api_key: self.api_keys.get(&service).cloned(),
            dev_mode,
            track_proxy: service == Service::CoinMarketCap,
            rate_limit,
        }
    }
}

const fn default_breaker(service: Service) -> BreakerConfig {
    match service {
        Service::Finnhub => FINNHUB_BREAKER,
        Service::CoinMarketCap => COINMARKETCAP_BREAKER,
        Service::TwelveData => TWELVEDATA_BREAKER,
        Service::NewsApi => NEWSAPI_BREAKER,
        Service::YFinance => YFINANCE_BREAKER,
    }
}

fn default_retry(service: Service) -> RetryPolicy {
    match service {
        Service::CoinMarketCap | Service::YFinance => {
            RetryPolicy::default().max_retries(SERVICE_MAX_RETRIES)
        }
        _ => RetryPolicy::default(),
    }
}

const fn default_rate_limit(service: Service) -> Option<(usize, Duration)> {
    match service {
        Service::CoinMarketCap => Some((COINMARKETCAP_REQUESTS_PER_MINUTE, RATE_LIMIT_WINDOW)),
        Service::TwelveData => Some((TWELVEDATA_REQUESTS_PER_MINUTE, RATE_LIMIT_WINDOW)),
        _ => None,
    }
}

fn dev_mode_from_env() -> bool {
    std::env::var(ENV_DEV_MODE)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
