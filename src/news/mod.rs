//! App-level news article shared by the NewsAPI and YFinance feeds.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSource {
    pub name: String,
    pub published_at: DateTime<Utc>,
}

/// A headline ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub id: String,
    pub headline: String,
    pub summary: String,
    /// 0 (bearish) to 100 (bullish); `None` when the feed carries no score.
    pub sentiment_score: Option<u8>,
    pub key_phrases: Vec<String>,
    pub source: ArticleSource,
    pub original_url: String,
    pub symbol: Option<String>,
}

const STOP_WORDS: &[&str] = &[
    "with", "from", "than", "that", "this", "they", "them", "their", "there", "then", "when",
    "where", "what", "will", "were", "been", "have", "said", "says", "would", "could", "should",
    "about", "after", "again", "among", "around", "before", "being", "below", "between",
    "during", "those", "under", "while",
];

/// Up to five lowercase words longer than three letters, stop words removed.
pub fn key_phrases(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 3 && !STOP_WORDS.contains(w))
        .take(5)
        .map(str::to_owned)
        .collect()
}

/// Map a score in `[-1, 1]` onto `0..=100`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rescale_sentiment(score: f64) -> u8 {
    let clamped = if score.is_finite() {
        score.clamp(-1.0, 1.0)
    } else {
        0.0
    };
    (((clamped + 1.0) / 2.0) * 100.0).round() as u8
}

/// Parse feed timestamps: RFC 3339, `"N minutes/hours/days ago"` and
/// `"Recently"`. Anything unrecognised is treated as `now`.
pub fn parse_published(raw: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("recently") {
        return now;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(&Utc);
    }
    if raw.contains("ago") {
        let n: i64 = raw
            .split_whitespace()
            .next()
            .and_then(|w| w.parse().ok())
            .unwrap_or(1);
        let back = if raw.contains("minute") {
            ChronoDuration::minutes(n)
        } else if raw.contains("hour") {
            ChronoDuration::hours(n)
        } else if raw.contains("day") {
            ChronoDuration::days(n)
        } else {
            ChronoDuration::zero()
        };
        return now - back;
    }
    now
}
