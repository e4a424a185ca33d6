//! The app-level ticker record shared by every market-data surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coinmarketcap::Cryptocurrency;
use crate::twelvedata::Quote as TwelveDataQuote;

/// What kind of instrument a ticker is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Stock,
    Crypto,
    Forex,
    Commodity,
    Index,
}

/// Price, volume and social-sentiment snapshot for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    pub symbol: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub exchange: Option<String>,
    pub sector: Option<String>,
    pub market_cap: Option<f64>,

    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: f64,

    /// -100 (bearish) to 100 (bullish).
    pub sentiment_score: f64,
    pub bullish_count: u32,
    pub bearish_count: u32,
    pub neutral_count: u32,
    pub total_posts: u32,

    pub trending_score: f64,
    pub post_volume_24h: u32,
    pub sentiment_change_24h: f64,

    pub is_watched: Option<bool>,
    pub last_updated: DateTime<Utc>,
}

impl Ticker {
    /// A ticker with market fields set and every sentiment field zeroed.
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, kind: AssetKind) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            kind,
            exchange: None,
            sector: None,
            market_cap: None,
            price: 0.0,
            change: 0.0,
            change_percent: 0.0,
            volume: 0.0,
            sentiment_score: 0.0,
            bullish_count: 0,
            bearish_count: 0,
            neutral_count: 0,
            total_posts: 0,
            trending_score: 0.0,
            post_volume_24h: 0,
            sentiment_change_24h: 0.0,
            is_watched: None,
            last_updated: Utc::now(),
        }
    }
}

impl From<&TwelveDataQuote> for Ticker {
    fn from(q: &TwelveDataQuote) -> Self {
        let mut t = Ticker::new(q.symbol.clone(), q.name.clone(), AssetKind::Stock);
        t.exchange = Some(q.exchange.clone()).filter(|e| !e.is_empty());
        t.price = q.close;
        t.change = q.change;
        t.change_percent = q.percent_change;
        t.volume = q.volume;
        t
    }
}

impl From<&Cryptocurrency> for Ticker {
    /// Uses the USD quote. The absolute change is derived from the 24 h
    /// percentage and the CMC rank becomes the trending score.
    fn from(c: &Cryptocurrency) -> Self {
        let mut t = Ticker::new(c.symbol.clone(), c.name.clone(), AssetKind::Crypto);
        t.exchange = Some("CMC".to_string());
        if let Some(usd) = c.usd() {
            t.price = usd.price;
            t.change_percent = usd.percent_change_24h;
            t.change = usd.price * usd.percent_change_24h / 100.0;
            t.volume = usd.volume_24h;
            t.market_cap = Some(usd.market_cap);
            if let Some(ts) = usd.last_updated {
                t.last_updated = ts;
            }
        }
        t.trending_score = c
            .cmc_rank
            .map_or(0.0, |rank| (1000.0 - f64::from(rank)) / 10.0);
        t
    }
}
