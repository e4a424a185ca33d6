//! Finnhub stock quotes, candles and symbol lookup.

mod model;
mod wire;

pub use model::{Candle, Candles, Quote, SymbolLookup, SymbolMatch};

use futures::future::join_all;

use crate::core::client::constants::QUOTES_CACHE_TTL;
use crate::core::outcome::Outcome;
use crate::core::services::{Endpoint, service_client};

service_client!(
    /// Client for the Finnhub proxy routes (`/finnhub/...`).
    ///
    /// Every method returns an [`Outcome`]; failures degrade to cached or
    /// synthetic data instead of surfacing as errors.
    FinnhubClient,
    wire::check_envelope
);

impl FinnhubClient {
    /// Real-time quote for one symbol.
    #[tracing::instrument(skip(self), fields(service = "finnhub"))]
    pub async fn quote(&self, symbol: &str) -> Outcome<Quote> {
        let endpoint = Endpoint::new("quote")
            .param("symbol", symbol)
            .ttl(QUOTES_CACHE_TTL);
        self.core
            .call(endpoint, &self.opts, |fb| fb.finnhub_quote(symbol))
            .await
            .map(|mut q: Quote| {
                q.symbol = symbol.to_string();
                q
            })
    }

    /// Quotes for several symbols, fetched concurrently. The result keeps the
    /// order of `symbols` and is degraded if any single quote is.
    pub async fn quotes(&self, symbols: &[&str]) -> Outcome<Vec<Quote>> {
        let outcomes = join_all(symbols.iter().map(|s| self.quote(s))).await;
        Outcome::collect(outcomes)
    }

    /// OHLCV candles. `resolution` is Finnhub's (`1`, `5`, `15`, `30`, `60`,
    /// `D`, `W`, `M`); `from`/`to` are Unix seconds.
    #[tracing::instrument(skip(self), fields(service = "finnhub"))]
    pub async fn candles(
        &self,
        symbol: &str,
        resolution: &str,
        from: Option<i64>,
        to: Option<i64>,
    ) -> Outcome<Candles> {
        let endpoint = Endpoint::new("candles")
            .param("symbol", symbol)
            .param("resolution", resolution)
            .param_opt("from", from)
            .param_opt("to", to);
        self.core
            .call(endpoint, &self.opts, |fb| {
                fb.finnhub_candles(symbol, resolution, from, to)
            })
            .await
    }

    #[tracing::instrument(skip(self), fields(service = "finnhub"))]
    pub async fn symbol_lookup(&self, query: &str) -> Outcome<SymbolLookup> {
        let endpoint = Endpoint::new("symbol-lookup").param("query", query);
        self.core
            .call(endpoint, &self.opts, |fb| fb.finnhub_lookup(query))
            .await
    }
}
