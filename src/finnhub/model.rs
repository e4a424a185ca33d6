use serde::{Deserialize, Serialize};

use crate::core::wire::{de_f64_lenient, de_null_default, de_opt_f64_lenient};

/// Real-time quote (`/quote`). Finnhub answers with single-letter keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Not sent by Finnhub; filled in from the request.
    #[serde(default)]
    pub symbol: String,
    #[serde(rename = "c", default, deserialize_with = "de_f64_lenient")]
    pub current: f64,
    #[serde(rename = "d", default, deserialize_with = "de_opt_f64_lenient")]
    pub change: Option<f64>,
    #[serde(rename = "dp", default, deserialize_with = "de_opt_f64_lenient")]
    pub percent_change: Option<f64>,
    #[serde(rename = "h", default, deserialize_with = "de_f64_lenient")]
    pub high: f64,
    #[serde(rename = "l", default, deserialize_with = "de_f64_lenient")]
    pub low: f64,
    #[serde(rename = "o", default, deserialize_with = "de_f64_lenient")]
    pub open: f64,
    #[serde(rename = "pc", default, deserialize_with = "de_f64_lenient")]
    pub previous_close: f64,
    /// Unix seconds.
    #[serde(rename = "t", default)]
    pub timestamp: i64,
}

/// Column-oriented OHLCV series (`/candles`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Candles {
    #[serde(rename = "c", default, deserialize_with = "de_null_default")]
    pub close: Vec<f64>,
    #[serde(rename = "h", default, deserialize_with = "de_null_default")]
    pub high: Vec<f64>,
    #[serde(rename = "l", default, deserialize_with = "de_null_default")]
    pub low: Vec<f64>,
    #[serde(rename = "o", default, deserialize_with = "de_null_default")]
    pub open: Vec<f64>,
    /// `"ok"` or `"no_data"`.
    #[serde(rename = "s", default)]
    pub status: String,
    #[serde(rename = "t", default, deserialize_with = "de_null_default")]
    pub timestamps: Vec<i64>,
    #[serde(rename = "v", default, deserialize_with = "de_null_default")]
    pub volume: Vec<f64>,
}

/// One row of [`Candles`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub ts: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candles {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Zip the columns into rows, stopping at the shortest column.
    pub fn rows(&self) -> Vec<Candle> {
        self.timestamps
            .iter()
            .zip(&self.open)
            .zip(&self.high)
            .zip(&self.low)
            .zip(&self.close)
            .zip(&self.volume)
            .map(|(((((&ts, &open), &high), &low), &close), &volume)| Candle {
                ts,
                open,
                high,
                low,
                close,
                volume,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolMatch {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub display_symbol: String,
    pub symbol: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Result of `/symbol-lookup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SymbolLookup {
    #[serde(default)]
    pub count: u32,
    #[serde(default, deserialize_with = "de_null_default")]
    pub result: Vec<SymbolMatch>,
}
