//! The per-service pipeline every provider client is built on.
//!
//! Order of checks on each call: development mode, cache (`CacheMode::Use`),
//! availability switch, proxy flag, circuit breaker, rate limiter, then
//! `RobustFetch`. Failures update the breaker and end in cached or synthetic
//! data, never in an `Err`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::core::breaker::{BreakerConfig, BreakerStatus, CircuitBreaker};
use crate::core::cache::ResponseCache;
use crate::core::client::constants::DEV_MODE_REASON;
use crate::core::client::{CacheMode, RetryPolicy};
use crate::core::error::{AbortOrigin, FeedError};
use crate::core::fetch::{FetchOptions, RobustFetch, decode_json};
use crate::core::models::{ApiKeyLocation, Service};
use crate::core::net::HttpRequest;
use crate::core::outcome::Outcome;
use crate::fallback::{ApiAvailability, AvailabilityStatus, FallbackDataProvider};
use crate::ratelimit::RateLimiter;

/// Per-call overrides, set through the client's builder-style methods.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub cache_mode: CacheMode,
    pub retry: Option<RetryPolicy>,
    pub cancel: Option<CancellationToken>,
}

/// Validates a provider's JSON envelope before it is decoded or cached.
pub(crate) type EnvelopeCheck = fn(Service, &serde_json::Value) -> Result<(), FeedError>;

/// One endpoint call: path under the service root, query pairs and cache TTL.
#[derive(Debug)]
pub(crate) struct Endpoint<'a> {
    pub(crate) path: &'a str,
    pub(crate) params: Vec<(&'static str, String)>,
    pub(crate) ttl: Option<Duration>,
}

impl<'a> Endpoint<'a> {
    pub(crate) fn new(path: &'a str) -> Self {
        Self {
            path,
            params: Vec::new(),
            ttl: None,
        }
    }

    #[must_use]
    pub(crate) fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }

    #[must_use]
    pub(crate) fn param_opt<V: ToString>(self, key: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.param(key, v.to_string()),
            None => self,
        }
    }

    #[must_use]
    pub(crate) fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    fn cache_key(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter().map(|(k, v)| (*k, v.as_str())))
            .finish();
        format!("{}?{query}", self.path)
    }
}

/// Everything needed to assemble one service's pipeline.
#[derive(Debug, Clone)]
pub(crate) struct ServiceSettings {
    pub(crate) service: Service,
    pub(crate) proxy_base: Url,
    pub(crate) breaker: BreakerConfig,
    pub(crate) retry: RetryPolicy,
    pub(crate) cache_ttl: Duration,
    pub(crate) api_key: Option<String>,
    pub(crate) dev_mode: bool,
    pub(crate) track_proxy: bool,
    pub(crate) rate_limit: Option<(usize, Duration)>,
}

/// Shared collaborators owned by the composition root.
#[derive(Debug, Clone)]
pub(crate) struct Shared {
    pub(crate) fetch: RobustFetch,
    pub(crate) availability: Arc<ApiAvailability>,
    pub(crate) fallback: Arc<FallbackDataProvider>,
}

#[derive(Debug)]
pub(crate) struct ServiceCore {
    service: Service,
    root: Url,
    fetch: RobustFetch,
    breaker: CircuitBreaker,
    cache: ResponseCache<String>,
    availability: Arc<ApiAvailability>,
    fallback: Arc<FallbackDataProvider>,
    proxy_down_since: Mutex<Option<Instant>>,
    track_proxy: bool,
    limiter: Option<RateLimiter>,
    api_key: Option<String>,
    dev_mode: bool,
    envelope: EnvelopeCheck,
}

impl ServiceCore {
    pub(crate) fn new(
        settings: ServiceSettings,
        shared: Shared,
        envelope: EnvelopeCheck,
    ) -> Result<Self, FeedError> {
        let root = settings
            .proxy_base
            .join(&format!("{}/", settings.service.path_segment()))?;
        Ok(Self {
            service: settings.service,
            root,
            fetch: shared.fetch.with_policy(settings.retry),
            breaker: CircuitBreaker::new(settings.service, settings.breaker),
            cache: ResponseCache::new(settings.cache_ttl),
            availability: shared.availability,
            fallback: shared.fallback,
            proxy_down_since: Mutex::new(None),
            track_proxy: settings.track_proxy,
            limiter: settings
                .rate_limit
                .map(|(max, window)| RateLimiter::new(max, window)),
            api_key: settings.api_key,
            dev_mode: settings.dev_mode,
            envelope,
        })
    }

    pub(crate) fn service(&self) -> Service {
        self.service
    }

    pub(crate) fn breaker_status(&self) -> BreakerStatus {
        self.breaker.status()
    }

    pub(crate) fn availability_status(&self) -> AvailabilityStatus {
        self.availability.status(self.service)
    }

    pub(crate) async fn clear_cache(&self) {
        self.cache.clear().await;
        info!(service = %self.service, "cache cleared");
    }

    pub(crate) async fn cache_len(&self) -> usize {
        self.cache.len().await
    }

    /// Close the breaker, forget the proxy flag and lift any switch-off.
    pub(crate) fn reset(&self) {
        self.breaker.reset();
        *self.proxy_lock() = None;
        self.availability.enable(self.service);
    }

    fn proxy_lock(&self) -> MutexGuard<'_, Option<Instant>> {
        self.proxy_down_since
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the proxy was seen down within the last breaker cooldown.
    pub(crate) fn proxy_unavailable(&self) -> bool {
        if !self.track_proxy {
            return false;
        }
        let mut since = self.proxy_lock();
        match *since {
            Some(t) if t.elapsed() < self.breaker.config().cooldown => true,
            Some(_) => {
                *since = None;
                false
            }
            None => false,
        }
    }

    fn mark_proxy(&self, available: bool) {
        if !self.track_proxy {
            return;
        }
        let mut since = self.proxy_lock();
        if available {
            *since = None;
        } else if since.is_none() {
            warn!(service = %self.service, "proxy marked unavailable");
            *since = Some(Instant::now());
        }
    }

    fn build_request(&self, endpoint: &Endpoint<'_>) -> Result<HttpRequest, FeedError> {
        let mut url = self.root.join(endpoint.path)?;
        {
            let mut qp = url.query_pairs_mut();
            for (k, v) in &endpoint.params {
                qp.append_pair(k, v);
            }
            if let (Some(key), Some(ApiKeyLocation::Query(name))) =
                (&self.api_key, self.service.api_key_location())
            {
                qp.append_pair(name, key);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        let mut req = HttpRequest::get(url);
        if let (Some(key), Some(ApiKeyLocation::Header(name))) =
            (&self.api_key, self.service.api_key_location())
        {
            req = req.header(name, key.clone());
        }
        Ok(req)
    }

    /// Local gates that refuse a call without touching the network.
    fn admit(&self) -> Result<(), FeedError> {
        self.availability.check(self.service)?;
        if self.proxy_unavailable() {
            return Err(FeedError::ProxyUnavailable);
        }
        self.breaker.try_acquire()
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let body = self.cache.get(key).await?;
        match serde_json::from_str(&body) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!(service = %self.service, key, error = %e, "cached body did not decode");
                None
            }
        }
    }

    /// Take a rate-limiter slot, giving up if the caller cancels first.
    async fn wait_for_slot(&self, cancel: Option<&CancellationToken>) -> Result<(), FeedError> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };
        match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => Err(FeedError::Aborted(AbortOrigin::External)),
                    () = limiter.acquire() => Ok(()),
                }
            }
            None => {
                limiter.acquire().await;
                Ok(())
            }
        }
    }

    /// Fetch, validate and decode. Returns the decoded value and the raw body
    /// for caching.
    async fn fetch_live<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint<'_>,
        opts: &CallOptions,
    ) -> Result<(T, String), FeedError> {
        self.wait_for_slot(opts.cancel.as_ref()).await?;
        let req = self.build_request(endpoint)?;
        let fetch_opts = FetchOptions {
            retry: opts.retry.as_ref(),
            cancel: opts.cancel.as_ref(),
        };
        let resp = self.fetch.fetch(&req, fetch_opts).await?;
        let value: serde_json::Value = decode_json(&resp)?;
        (self.envelope)(self.service, &value)?;
        let data = serde_json::from_value(value)?;
        Ok((data, resp.body))
    }

    fn record_failure(&self, err: &FeedError) {
        match err {
            // Caller gave up; says nothing about the provider.
            FeedError::Aborted(_) => {}
            // Already throttled locally.
            FeedError::TemporarilyUnavailable => {}
            e if e.is_rate_limit() => self.breaker.record_rate_limit(),
            e => {
                self.breaker.record_failure();
                if e.is_connectivity() {
                    self.mark_proxy(false);
                }
                self.availability.handle_error(self.service, e);
            }
        }
    }

    /// Run one endpoint call through the full pipeline.
    pub(crate) async fn call<T, F>(
        &self,
        endpoint: Endpoint<'_>,
        opts: &CallOptions,
        fallback: F,
    ) -> Outcome<T>
    where
        T: DeserializeOwned,
        F: FnOnce(&FallbackDataProvider) -> T,
    {
        let service = self.service;
        if self.dev_mode {
            return Outcome::degraded(fallback(&self.fallback), DEV_MODE_REASON);
        }

        let key = endpoint.cache_key();
        let ttl = endpoint.ttl.unwrap_or_else(|| self.cache.default_ttl());

        if opts.cache_mode == CacheMode::Use
            && let Some(v) = self.cached::<T>(&key).await
        {
            debug!(%service, key, "cache hit");
            return Outcome::Cached(v);
        }

        if let Err(err) = self.admit() {
            if opts.cache_mode != CacheMode::Bypass
                && let Some(v) = self.cached::<T>(&key).await
            {
                info!(%service, key, reason = %err, "serving cached data while service is gated");
                return Outcome::Cached(v);
            }
            info!(%service, key, reason = %err, "serving fallback data while service is gated");
            return Outcome::degraded(fallback(&self.fallback), err.to_string());
        }

        match self.fetch_live::<T>(&endpoint, opts).await {
            Ok((data, body)) => {
                self.breaker.record_success();
                self.mark_proxy(true);
                if opts.cache_mode != CacheMode::Bypass {
                    self.cache.set(key, body, ttl).await;
                }
                Outcome::Live(data)
            }
            Err(err) => {
                self.record_failure(&err);
                if opts.cache_mode != CacheMode::Bypass
                    && let Some(v) = self.cached::<T>(&key).await
                {
                    warn!(%service, key, error = %err, "live call failed; serving cached data");
                    return Outcome::degraded(v, err.to_string());
                }
                warn!(%service, key, error = %err, "live call failed; serving fallback data");
                Outcome::degraded(fallback(&self.fallback), err.to_string())
            }
        }
    }
}

/// Declares a provider client: a cheap-to-clone handle over one
/// [`ServiceCore`] plus the per-call options set through its builder methods.
macro_rules! service_client {
    ($(#[$meta:meta])* $name:ident, $envelope:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            core: ::std::sync::Arc<$crate::core::services::ServiceCore>,
            opts: $crate::core::services::CallOptions,
        }

        impl $name {
            pub(crate) fn new(
                settings: $crate::core::services::ServiceSettings,
                shared: $crate::core::services::Shared,
            ) -> Result<Self, $crate::core::error::FeedError> {
                let core = $crate::core::services::ServiceCore::new(settings, shared, $envelope)?;
                Ok(Self {
                    core: ::std::sync::Arc::new(core),
                    opts: $crate::core::services::CallOptions::default(),
                })
            }

            /// A handle whose calls use `mode` for the response cache.
            #[must_use]
            pub fn cache_mode(&self, mode: $crate::core::client::CacheMode) -> Self {
                let mut handle = self.clone();
                handle.opts.cache_mode = mode;
                handle
            }

            /// A handle whose calls use `policy` instead of the client default.
            #[must_use]
            pub fn retry_policy(&self, policy: $crate::core::client::RetryPolicy) -> Self {
                let mut handle = self.clone();
                handle.opts.retry = Some(policy);
                handle
            }

            /// A handle whose calls abort when `token` is cancelled.
            #[must_use]
            pub fn cancel_token(&self, token: ::tokio_util::sync::CancellationToken) -> Self {
                let mut handle = self.clone();
                handle.opts.cancel = Some(token);
                handle
            }

            pub fn service(&self) -> $crate::core::models::Service {
                self.core.service()
            }

            pub fn breaker_status(&self) -> $crate::core::breaker::BreakerStatus {
                self.core.breaker_status()
            }

            pub fn availability(&self) -> $crate::fallback::AvailabilityStatus {
                self.core.availability_status()
            }

            /// Close the breaker and clear this service's availability flags.
            pub fn reset(&self) {
                self.core.reset();
            }

            pub async fn clear_cache(&self) {
                self.core.clear_cache().await;
            }

            pub async fn cache_len(&self) -> usize {
                self.core.cache_len().await
            }
        }
    };
}

pub(crate) use service_client;
