//! Twelve Data stock quotes, time series and market hours.

mod model;
mod wire;

pub use model::{
    Bar, FiftyTwoWeek, Interval, MarketState, Quote, SeriesMeta, SymbolMatch, SymbolSearch,
    TimeSeries,
};

use crate::core::client::constants::QUOTES_CACHE_TTL;
use crate::core::outcome::Outcome;
use crate::core::services::{Endpoint, service_client};
use crate::ticker::Ticker;
use wire::QuotesWire;

service_client!(
    /// Client for the Twelve Data proxy routes (`/twelvedata/...`).
    TwelveDataClient,
    wire::check_envelope
);

impl TwelveDataClient {
    #[tracing::instrument(skip(self), fields(service = "twelvedata"))]
    pub async fn quote(&self, symbol: &str) -> Outcome<Quote> {
        let endpoint = Endpoint::new("quote")
            .param("symbol", symbol)
            .ttl(QUOTES_CACHE_TTL);
        self.core
            .call(endpoint, &self.opts, |fb| fb.twelvedata_quote(symbol))
            .await
    }

    /// Quotes for several symbols in one request, in the order of `symbols`.
    #[tracing::instrument(skip(self), fields(service = "twelvedata"))]
    pub async fn quotes(&self, symbols: &[&str]) -> Outcome<Vec<Quote>> {
        let endpoint = Endpoint::new("quote")
            .param("symbol", symbols.join(","))
            .ttl(QUOTES_CACHE_TTL);
        self.core
            .call(endpoint, &self.opts, |fb| {
                QuotesWire::Many(
                    symbols
                        .iter()
                        .map(|s| (s.to_string(), fb.twelvedata_quote(s)))
                        .collect(),
                )
            })
            .await
            .map(|wire: QuotesWire| wire.into_ordered(symbols))
    }

    /// Quotes converted to app tickers.
    pub async fn tickers(&self, symbols: &[&str]) -> Outcome<Vec<Ticker>> {
        self.quotes(symbols)
            .await
            .map(|quotes| quotes.iter().map(Ticker::from).collect())
    }

    #[tracing::instrument(skip(self), fields(service = "twelvedata"))]
    pub async fn time_series(
        &self,
        symbol: &str,
        interval: Interval,
        output_size: u32,
    ) -> Outcome<TimeSeries> {
        let endpoint = Endpoint::new("time_series")
            .param("symbol", symbol)
            .param("interval", interval.as_str())
            .param("outputsize", output_size.to_string());
        self.core
            .call(endpoint, &self.opts, |fb| {
                fb.twelvedata_time_series(symbol, interval, output_size)
            })
            .await
    }

    /// Open/closed state for the given exchange codes, or all when empty.
    #[tracing::instrument(skip(self), fields(service = "twelvedata"))]
    pub async fn market_state(&self, markets: &[&str]) -> Outcome<Vec<MarketState>> {
        let mut endpoint = Endpoint::new("market_state");
        if !markets.is_empty() {
            endpoint = endpoint.param("code", markets.join(","));
        }
        self.core
            .call(endpoint, &self.opts, |fb| fb.twelvedata_market_state(markets))
            .await
    }

    #[tracing::instrument(skip(self), fields(service = "twelvedata"))]
    pub async fn symbol_search(&self, query: &str) -> Outcome<SymbolSearch> {
        let endpoint = Endpoint::new("symbol_search").param("symbol", query);
        self.core
            .call(endpoint, &self.opts, |fb| fb.twelvedata_symbol_search(query))
            .await
    }
}
