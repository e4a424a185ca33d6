use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::wire::{de_f64_lenient, de_null_default, de_opt_f64_lenient, de_u64_lenient};

/// The `status` block every CoinMarketCap response carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Status {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub elapsed: Option<i64>,
    #[serde(default)]
    pub credit_count: Option<i64>,
    #[serde(default)]
    pub notice: Option<String>,
}

/// `{status, data}` as returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Status,
    pub data: T,
}

/// Market figures in one convert currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CryptoQuote {
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub price: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub volume_24h: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub volume_change_24h: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub percent_change_1h: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub percent_change_24h: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub percent_change_7d: f64,
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub percent_change_30d: Option<f64>,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub market_cap: f64,
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub market_cap_dominance: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub fully_diluted_market_cap: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cryptocurrency {
    pub id: i64,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub num_market_pairs: Option<u32>,
    #[serde(default)]
    pub date_added: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub max_supply: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub circulating_supply: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub total_supply: Option<f64>,
    #[serde(default)]
    pub cmc_rank: Option<u32>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    /// Keyed by convert currency (`"USD"`, `"EUR"`, ...).
    #[serde(default, deserialize_with = "de_null_default")]
    pub quote: HashMap<String, CryptoQuote>,
}

impl Cryptocurrency {
    pub fn quote_in(&self, currency: &str) -> Option<&CryptoQuote> {
        self.quote.get(currency)
    }

    pub fn usd(&self) -> Option<&CryptoQuote> {
        self.quote_in("USD")
    }
}

/// `/listings` and `/trending`.
pub type Listings = Envelope<Vec<Cryptocurrency>>;

/// `/quotes`, keyed by the requested symbol or id.
pub type Quotes = Envelope<HashMap<String, Cryptocurrency>>;

/// One row of the `/map` search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEntry {
    pub id: i64,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub is_active: Option<u8>,
    #[serde(default)]
    pub first_historical_data: Option<String>,
    #[serde(default)]
    pub last_historical_data: Option<String>,
}

pub type CryptoMap = Envelope<Vec<MapEntry>>;

/// Static project information from `/info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub id: i64,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub tags: Vec<String>,
    /// `website`, `twitter`, `reddit`, ... each with zero or more links.
    #[serde(default, deserialize_with = "de_null_default")]
    pub urls: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub date_added: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_launched: Option<DateTime<Utc>>,
}

pub type MetadataMap = Envelope<HashMap<String, Metadata>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GlobalQuote {
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub total_market_cap: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub total_volume_24h: f64,
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub altcoin_market_cap: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub altcoin_volume_24h: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub total_market_cap_yesterday_percentage_change: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub total_volume_24h_yesterday_percentage_change: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Market-wide figures from `/global-metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GlobalMetrics {
    #[serde(default, deserialize_with = "de_u64_lenient")]
    pub active_cryptocurrencies: u64,
    #[serde(default, deserialize_with = "de_u64_lenient")]
    pub total_cryptocurrencies: u64,
    #[serde(default, deserialize_with = "de_u64_lenient")]
    pub active_market_pairs: u64,
    #[serde(default, deserialize_with = "de_u64_lenient")]
    pub active_exchanges: u64,
    #[serde(default, deserialize_with = "de_u64_lenient")]
    pub total_exchanges: u64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub btc_dominance: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub eth_dominance: f64,
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub btc_dominance_24h_percentage_change: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub defi_market_cap: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub stablecoin_market_cap: Option<f64>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub quote: HashMap<String, GlobalQuote>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

pub type GlobalMetricsResponse = Envelope<GlobalMetrics>;
