use chrono::{TimeZone, Utc};
use httpmock::Method::GET;
use httpmock::MockServer;
use marketfeed_rs::newsapi::{Category, SearchQuery, SortBy};

use crate::common::live_client;

const HEADLINES: &str = r#"{
  "status": "ok",
  "totalResults": 2,
  "articles": [
    {"source": {"id": "reuters", "name": "Reuters"}, "author": "Staff",
     "title": "Chipmakers rally as demand outlook improves",
     "description": "Semiconductor stocks climbed on Tuesday.",
     "url": "https://example.com/a", "urlToImage": null,
     "publishedAt": "2024-05-01T10:00:00Z", "content": "..."},
    {"source": {"id": null, "name": "MarketWatch"},
     "title": "Treasury yields slip", "description": null,
     "url": "https://example.com/b", "publishedAt": "2024-05-01T09:30:00Z"}
  ]
}"#;

#[tokio::test]
async fn business_headlines_map_to_articles() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/proxy/newsapi/top-headlines")
            .query_param("country", "us")
            .query_param("category", "business")
            .query_param("pageSize", "2")
            .query_param("page", "1");
        then.status(200)
            .header("content-type", "application/json")
            .body(HEADLINES);
    });

    let out = live_client(&server.base_url())
        .newsapi()
        .business_articles(2)
        .await;
    mock.assert();
    assert!(out.is_live());

    let articles = out.into_data();
    assert_eq!(articles.len(), 2);
    let first = &articles[0];
    assert_eq!(first.id, "newsapi_https://example.com/a");
    assert_eq!(first.source.name, "Reuters");
    assert_eq!(
        first.source.published_at,
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    );
    assert_eq!(first.sentiment_score, None);
    assert!(first.key_phrases.contains(&"chipmakers".to_string()));
    assert_eq!(articles[1].summary, "No description available");
}

#[tokio::test]
async fn search_passes_every_parameter() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/proxy/newsapi/everything")
            .query_param("q", "bitcoin etf")
            .query_param("sortBy", "popularity")
            .query_param("pageSize", "5")
            .query_param("page", "2")
            .query_param("language", "de");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"status": "ok", "totalResults": 0, "articles": []}"#);
    });

    let query = SearchQuery::new("bitcoin etf")
        .sort_by(SortBy::Popularity)
        .page(2, 5)
        .language("de");
    let out = live_client(&server.base_url()).newsapi().search(&query).await;
    mock.assert();
    assert!(out.is_live());
    assert!(out.data().articles.is_empty());
}

#[tokio::test]
async fn newsapi_error_envelope_degrades() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/proxy/newsapi/top-headlines");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"status": "error", "code": "rateLimited", "message": "You have made too many requests recently."}"#);
    });

    let client = live_client(&server.base_url());
    let out = client
        .newsapi()
        .top_headlines("us", Some(Category::Technology), 3, 1)
        .await;
    assert!(out.is_degraded());
    assert_eq!(
        out.error(),
        Some("NewsAPI rate limit exceeded - API temporarily unavailable")
    );
    assert_eq!(out.data().articles.len(), 3);
    assert!(client.newsapi().breaker_status().is_open());
}

#[tokio::test]
async fn yfinance_sentiment_is_rescaled() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/proxy/yfinance/news/latest");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"status": "success", "source": "yahoo", "total": 2, "articles": [
                {"id": "n1", "headline": "Apple unveils new chips", "url": "https://example.com/1",
                 "time": "3 hours ago", "source": "Yahoo Finance", "sentiment_score": 0.5, "symbol": "AAPL"},
                {"id": "n2", "headline": "Oil slides on supply worries", "url": "https://example.com/2",
                 "time": "Recently", "source": "Reuters", "sentiment_score": "-1"}
            ]}"#);
    });

    let before = Utc::now();
    let out = live_client(&server.base_url()).yfinance().latest_news().await;
    assert!(out.is_live());

    let articles = out.into_data();
    assert_eq!(articles[0].sentiment_score, Some(75));
    assert_eq!(articles[1].sentiment_score, Some(0));
    assert_eq!(articles[0].symbol.as_deref(), Some("AAPL"));
    let age = before - articles[0].source.published_at;
    assert!(age.num_minutes() >= 179 && age.num_minutes() <= 181);
    assert!(articles[1].source.published_at >= before);
}

#[tokio::test]
async fn yfinance_error_field_degrades() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/proxy/yfinance/news/latest");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"status": "error", "articles": [], "error": "scraper blocked"}"#);
    });

    let out = live_client(&server.base_url()).yfinance().latest_news().await;
    assert!(out.is_degraded());
    assert_eq!(out.data().len(), 10);
    assert!(
        out.data()
            .iter()
            .all(|a| a.sentiment_score.is_some_and(|s| s <= 100))
    );
}
