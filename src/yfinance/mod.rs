//! Latest market news scraped from Yahoo Finance by the proxy.

mod model;
mod wire;

pub use model::{NewsResponse, RawArticle};

use chrono::Utc;

use crate::core::outcome::Outcome;
use crate::core::services::{Endpoint, service_client};
use crate::news::{ArticleSource, NewsArticle, key_phrases, parse_published, rescale_sentiment};

service_client!(
    /// Client for the YFinance proxy routes (`/yfinance/...`).
    YFinanceClient,
    wire::check_envelope
);

impl From<&RawArticle> for NewsArticle {
    fn from(a: &RawArticle) -> Self {
        Self {
            id: a.id.clone(),
            headline: a.headline.clone(),
            summary: format!(
                "Latest market news from {}. Click to read the full article.",
                a.source
            ),
            sentiment_score: Some(rescale_sentiment(a.sentiment_score)),
            key_phrases: key_phrases(&a.headline),
            source: ArticleSource {
                name: a.source.clone(),
                published_at: parse_published(&a.time, Utc::now()),
            },
            original_url: a.url.clone(),
            symbol: a.symbol.clone(),
        }
    }
}

impl YFinanceClient {
    /// The raw feed as the proxy returns it.
    #[tracing::instrument(skip(self), fields(service = "yfinance"))]
    pub async fn latest_news_raw(&self) -> Outcome<NewsResponse> {
        self.core
            .call(Endpoint::new("news/latest"), &self.opts, |fb| {
                fb.yfinance_news(10)
            })
            .await
    }

    /// Latest headlines with sentiment rescaled to `0..=100`.
    pub async fn latest_news(&self) -> Outcome<Vec<NewsArticle>> {
        self.latest_news_raw()
            .await
            .map(|resp| resp.articles.iter().map(NewsArticle::from).collect())
    }
}
