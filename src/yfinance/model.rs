use serde::{Deserialize, Serialize};

use crate::core::wire::{de_f64_lenient, de_null_default};

/// One item of the proxy's `/news/latest` feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    pub id: String,
    pub headline: String,
    #[serde(default)]
    pub url: String,
    /// RFC 3339, `"N hours ago"` or `"Recently"`.
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub source: String,
    /// Scraper sentiment in `[-1, 1]`.
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub sentiment_score: f64,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NewsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub total: u32,
    #[serde(default, deserialize_with = "de_null_default")]
    pub articles: Vec<RawArticle>,
    #[serde(default)]
    pub error: Option<String>,
}
