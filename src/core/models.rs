use std::fmt;

use serde::{Deserialize, Serialize};

/// External data providers reachable through the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Service {
    Finnhub,
    CoinMarketCap,
    TwelveData,
    NewsApi,
    YFinance,
}

impl Service {
    /// All services, in the order the composition root builds them.
    pub const ALL: [Service; 5] = [
        Service::Finnhub,
        Service::CoinMarketCap,
        Service::TwelveData,
        Service::NewsApi,
        Service::YFinance,
    ];

    /// Path segment under the proxy base (`/api/proxy/<segment>/...`).
    pub const fn path_segment(self) -> &'static str {
        match self {
            Service::Finnhub => "finnhub",
            Service::CoinMarketCap => "coinmarketcap",
            Service::TwelveData => "twelvedata",
            Service::NewsApi => "newsapi",
            Service::YFinance => "yfinance",
        }
    }

    /// Human-readable provider name.
    pub const fn display_name(self) -> &'static str {
        match self {
            Service::Finnhub => "Finnhub",
            Service::CoinMarketCap => "CoinMarketCap",
            Service::TwelveData => "Twelve Data",
            Service::NewsApi => "NewsAPI",
            Service::YFinance => "YFinance",
        }
    }

    /// Where the provider expects its API key, if it takes one.
    pub(crate) const fn api_key_location(self) -> Option<ApiKeyLocation> {
        match self {
            Service::Finnhub => Some(ApiKeyLocation::Query("token")),
            Service::CoinMarketCap => Some(ApiKeyLocation::Header("X-CMC_PRO_API_KEY")),
            Service::TwelveData => Some(ApiKeyLocation::Query("apikey")),
            Service::NewsApi => Some(ApiKeyLocation::Query("apiKey")),
            Service::YFinance => None,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ApiKeyLocation {
    Query(&'static str),
    Header(&'static str),
}
