use serde::{Deserialize, Serialize};

use crate::core::wire::{de_f64_lenient, de_null_default, de_opt_f64_lenient};

/// Twelve Data sends most numbers as strings; they are parsed on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Quote {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub exchange: String,
    #[serde(default)]
    pub mic_code: Option<String>,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub datetime: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub open: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub high: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub low: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub close: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub volume: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub previous_close: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub change: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub percent_change: f64,
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub average_volume: Option<f64>,
    #[serde(default)]
    pub is_market_open: bool,
    #[serde(default)]
    pub fifty_two_week: Option<FiftyTwoWeek>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FiftyTwoWeek {
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub low: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub high: f64,
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub low_change: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub high_change: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub low_change_percent: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub high_change_percent: Option<f64>,
    #[serde(default)]
    pub range: String,
}

/// Supported bar sizes for [`TimeSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interval {
    M1,
    M5,
    M15,
    M30,
    M45,
    H1,
    H2,
    H4,
    #[default]
    D1,
    W1,
    Mo1,
}

impl Interval {
    pub const fn as_str(self) -> &'static str {
        match self {
            Interval::M1 => "1min",
            Interval::M5 => "5min",
            Interval::M15 => "15min",
            Interval::M30 => "30min",
            Interval::M45 => "45min",
            Interval::H1 => "1h",
            Interval::H2 => "2h",
            Interval::H4 => "4h",
            Interval::D1 => "1day",
            Interval::W1 => "1week",
            Interval::Mo1 => "1month",
        }
    }

    pub(crate) const fn seconds(self) -> i64 {
        const MIN: i64 = 60;
        match self {
            Interval::M1 => MIN,
            Interval::M5 => 5 * MIN,
            Interval::M15 => 15 * MIN,
            Interval::M30 => 30 * MIN,
            Interval::M45 => 45 * MIN,
            Interval::H1 => 60 * MIN,
            Interval::H2 => 120 * MIN,
            Interval::H4 => 240 * MIN,
            Interval::D1 => 1440 * MIN,
            Interval::W1 => 7 * 1440 * MIN,
            Interval::Mo1 => 30 * 1440 * MIN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SeriesMeta {
    pub symbol: String,
    #[serde(default)]
    pub interval: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub exchange_timezone: String,
    #[serde(default)]
    pub exchange: String,
    #[serde(default)]
    pub mic_code: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub datetime: String,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub open: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub high: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub low: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub close: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub volume: f64,
}

/// `/time_series`; `values` are newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TimeSeries {
    #[serde(default)]
    pub meta: SeriesMeta,
    #[serde(default, deserialize_with = "de_null_default")]
    pub values: Vec<Bar>,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketState {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub is_market_open: bool,
    #[serde(default)]
    pub time_after_open: String,
    #[serde(default)]
    pub time_to_open: String,
    #[serde(default)]
    pub time_to_close: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMatch {
    pub symbol: String,
    #[serde(default)]
    pub instrument_name: String,
    #[serde(default)]
    pub exchange: String,
    #[serde(default)]
    pub mic_code: Option<String>,
    #[serde(default)]
    pub exchange_timezone: String,
    #[serde(default)]
    pub instrument_type: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub currency: String,
}

/// `/symbol_search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SymbolSearch {
    #[serde(default, deserialize_with = "de_null_default")]
    pub data: Vec<SymbolMatch>,
    #[serde(default)]
    pub status: String,
}
