//! CoinMarketCap cryptocurrency listings, quotes and market metrics.
//!
//! Unlike the other providers this client also tracks whether the proxy in
//! front of it is reachable: an HTML page or a connection failure marks it
//! down, and until the breaker cooldown has passed calls are answered from
//! the cache or the fallback generator without touching the network.

mod model;
mod wire;

pub use model::{
    CryptoMap, CryptoQuote, Cryptocurrency, Envelope, GlobalMetrics, GlobalMetricsResponse,
    GlobalQuote, Listings, MapEntry, Metadata, MetadataMap, Quotes, Status,
};

use crate::core::client::constants::{
    GLOBAL_METRICS_CACHE_TTL, LISTINGS_CACHE_TTL, QUOTES_CACHE_TTL,
};
use crate::core::outcome::Outcome;
use crate::core::services::{Endpoint, service_client};
use crate::ticker::Ticker;

/// Ranking window for [`CoinMarketCapClient::trending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendingPeriod {
    Hour,
    #[default]
    Day,
    Week,
    Month,
}

impl TrendingPeriod {
    pub const fn as_str(self) -> &'static str {
        match self {
            TrendingPeriod::Hour => "1h",
            TrendingPeriod::Day => "24h",
            TrendingPeriod::Week => "7d",
            TrendingPeriod::Month => "30d",
        }
    }
}

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

service_client!(
    /// Client for the CoinMarketCap proxy routes (`/coinmarketcap/...`).
    CoinMarketCapClient,
    wire::check_envelope
);

impl CoinMarketCapClient {
    /// Whether the proxy is currently believed reachable.
    pub fn is_proxy_available(&self) -> bool {
        !self.core.proxy_unavailable()
    }

    /// Latest listings, `limit` rows starting at rank `start` (1-based).
    #[tracing::instrument(skip(self), fields(service = "coinmarketcap"))]
    pub async fn listings_latest(
        &self,
        start: u32,
        limit: u32,
        convert: &str,
        sort: &str,
    ) -> Outcome<Listings> {
        let endpoint = Endpoint::new("listings")
            .param("start", start.to_string())
            .param("limit", limit.to_string())
            .param("convert", convert)
            .param("sort", sort)
            .ttl(LISTINGS_CACHE_TTL);
        self.core
            .call(endpoint, &self.opts, |fb| {
                fb.cmc_listings(start, limit, convert)
            })
            .await
    }

    /// Top `limit` coins by market cap as app tickers.
    pub async fn top_tickers(&self, limit: u32) -> Outcome<Vec<Ticker>> {
        self.listings_latest(1, limit, "USD", "market_cap")
            .await
            .map(|listings| listings.data.iter().map(Ticker::from).collect())
    }

    #[tracing::instrument(skip(self), fields(service = "coinmarketcap"))]
    pub async fn quotes_by_symbol(&self, symbols: &[&str], convert: &str) -> Outcome<Quotes> {
        let endpoint = Endpoint::new("quotes")
            .param("symbol", join(symbols))
            .param("convert", convert)
            .ttl(QUOTES_CACHE_TTL);
        self.core
            .call(endpoint, &self.opts, |fb| {
                fb.cmc_quotes_by_symbol(symbols, convert)
            })
            .await
    }

    #[tracing::instrument(skip(self), fields(service = "coinmarketcap"))]
    pub async fn quotes_by_id(&self, ids: &[i64], convert: &str) -> Outcome<Quotes> {
        let endpoint = Endpoint::new("quotes")
            .param("id", join(ids))
            .param("convert", convert)
            .ttl(QUOTES_CACHE_TTL);
        self.core
            .call(endpoint, &self.opts, |fb| fb.cmc_quotes_by_id(ids, convert))
            .await
    }

    /// Project metadata by symbol and/or id.
    #[tracing::instrument(skip(self), fields(service = "coinmarketcap"))]
    pub async fn metadata(&self, symbols: &[&str], ids: &[i64]) -> Outcome<MetadataMap> {
        let mut endpoint = Endpoint::new("info");
        if !symbols.is_empty() {
            endpoint = endpoint.param("symbol", join(symbols));
        }
        if !ids.is_empty() {
            endpoint = endpoint.param("id", join(ids));
        }
        self.core
            .call(endpoint, &self.opts, |fb| fb.cmc_metadata(symbols, ids))
            .await
    }

    /// Active coins whose symbol matches `query`.
    #[tracing::instrument(skip(self), fields(service = "coinmarketcap"))]
    pub async fn search(&self, query: &str) -> Outcome<CryptoMap> {
        let endpoint = Endpoint::new("map")
            .param("listing_status", "active")
            .param("symbol", query);
        self.core
            .call(endpoint, &self.opts, |fb| fb.cmc_map(query))
            .await
    }

    #[tracing::instrument(skip(self), fields(service = "coinmarketcap"))]
    pub async fn trending(&self, limit: u32, period: TrendingPeriod) -> Outcome<Listings> {
        let endpoint = Endpoint::new("trending")
            .param("limit", limit.to_string())
            .param("time_period", period.as_str());
        self.core
            .call(endpoint, &self.opts, |fb| fb.cmc_listings(1, limit, "USD"))
            .await
    }

    #[tracing::instrument(skip(self), fields(service = "coinmarketcap"))]
    pub async fn global_metrics(&self, convert: &str) -> Outcome<GlobalMetricsResponse> {
        let endpoint = Endpoint::new("global-metrics")
            .param("convert", convert)
            .ttl(GLOBAL_METRICS_CACHE_TTL);
        self.core
            .call(endpoint, &self.opts, |fb| fb.cmc_global_metrics(convert))
            .await
    }
}
