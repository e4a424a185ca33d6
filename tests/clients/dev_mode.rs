use marketfeed_rs::FeedClient;
use url::Url;

use crate::common::{ScriptedTransport, builder_with, json};

const DEV_REASON: &str = "Development mode - API calls disabled";

#[tokio::test]
async fn dev_mode_never_touches_the_network() {
    let transport = ScriptedTransport::always(json("{}"));
    let client = builder_with(transport.clone())
        .dev_mode(true)
        .build()
        .unwrap();
    assert!(client.is_dev_mode());

    let quotes = client.finnhub().quotes(&["AAPL", "BTC"]).await;
    assert_eq!(quotes.error(), Some(DEV_REASON));
    assert_eq!(quotes.data().len(), 2);

    let listings = client.coinmarketcap().top_tickers(5).await;
    assert_eq!(listings.error(), Some(DEV_REASON));
    assert_eq!(listings.data().len(), 5);

    let news = client.yfinance().latest_news().await;
    assert!(news.is_degraded());
    assert!(!news.data().is_empty());

    assert_eq!(transport.calls(), 0);
    assert_eq!(client.finnhub().cache_len().await, 0);
}

#[tokio::test]
async fn proxy_base_without_trailing_slash_keeps_its_path() {
    let transport = ScriptedTransport::always(json(r#"{"c": 1.0}"#));
    let client = FeedClient::builder()
        .base_url(Url::parse("http://localhost:3000/api/proxy").unwrap())
        .transport(transport.clone())
        .dev_mode(false)
        .build()
        .unwrap();

    let _ = client.finnhub().quote("AAPL").await;
    let reqs = transport.requests();
    assert_eq!(reqs[0].url.path(), "/api/proxy/finnhub/quote");
    assert_eq!(reqs[0].url.query(), Some("symbol=AAPL"));
}
