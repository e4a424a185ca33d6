use httpmock::Method::GET;
use httpmock::MockServer;
use marketfeed_rs::twelvedata::Interval;

use crate::common::live_client;

#[tokio::test]
async fn batch_quotes_keep_request_order() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/proxy/twelvedata/quote")
            .query_param("symbol", "MSFT,AAPL");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{
              "AAPL": {"symbol": "AAPL", "name": "Apple Inc", "exchange": "NASDAQ", "currency": "USD",
                       "close": "190.50", "change": "1.20", "percent_change": "0.63", "volume": "51000000",
                       "previous_close": "189.30", "is_market_open": false},
              "MSFT": {"symbol": "MSFT", "name": "Microsoft Corp", "exchange": "NASDAQ", "currency": "USD",
                       "close": "410.00", "change": "-2.00", "percent_change": "-0.49", "volume": "20000000",
                       "fifty_two_week": {"low": "309.45", "high": "430.82", "range": "309.45 - 430.82"}}
            }"#);
    });

    let client = live_client(&server.base_url());
    let out = client.twelvedata().tickers(&["MSFT", "AAPL"]).await;
    mock.assert();
    assert!(out.is_live());

    let tickers = out.into_data();
    assert_eq!(
        tickers.iter().map(|t| t.symbol.as_str()).collect::<Vec<_>>(),
        ["MSFT", "AAPL"]
    );
    assert!((tickers[0].price - 410.0).abs() < 1e-9);
    assert!((tickers[1].change_percent - 0.63).abs() < 1e-9);
    assert_eq!(tickers[1].exchange.as_deref(), Some("NASDAQ"));
}

#[tokio::test]
async fn single_quote_is_not_keyed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/proxy/twelvedata/quote")
            .query_param("symbol", "NVDA");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"symbol": "NVDA", "name": "NVIDIA Corp", "close": "880.1"}"#);
    });

    let client = live_client(&server.base_url());
    let quotes = client.twelvedata().quotes(&["NVDA"]).await.into_data();
    assert_eq!(quotes.len(), 1);
    assert!((quotes[0].close - 880.1).abs() < 1e-9);
}

#[tokio::test]
async fn time_series_values_are_newest_first() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/proxy/twelvedata/time_series")
            .query_param("symbol", "AAPL")
            .query_param("interval", "1h")
            .query_param("outputsize", "2");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{
              "meta": {"symbol": "AAPL", "interval": "1h", "currency": "USD", "exchange_timezone": "America/New_York", "exchange": "NASDAQ", "type": "Common Stock"},
              "values": [
                {"datetime": "2024-05-01 15:30:00", "open": "190", "high": "191", "low": "189.5", "close": "190.7", "volume": "1200000"},
                {"datetime": "2024-05-01 14:30:00", "open": "189", "high": "190.2", "low": "188.8", "close": "190", "volume": "900000"}
              ],
              "status": "ok"
            }"#);
    });

    let ts = live_client(&server.base_url())
        .twelvedata()
        .time_series("AAPL", Interval::H1, 2)
        .await
        .into_data();
    assert_eq!(ts.meta.kind, "Common Stock");
    assert_eq!(ts.values.len(), 2);
    assert_eq!(ts.values[0].datetime, "2024-05-01 15:30:00");
    assert!((ts.values[1].close - 190.0).abs() < 1e-9);
}

#[tokio::test]
async fn error_status_degrades_with_provider_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/proxy/twelvedata/symbol_search");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"code": 401, "message": "**apikey** parameter is incorrect or not specified.", "status": "error"}"#);
    });

    let out = live_client(&server.base_url())
        .twelvedata()
        .symbol_search("micro")
        .await;
    assert!(out.is_degraded());
    assert!(out.error().unwrap().contains("apikey"));
    assert!(out.data().data.iter().any(|m| m.symbol == "MSFT" || m.symbol == "AMD"));
}

#[tokio::test]
async fn market_state_reads_an_array() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/proxy/twelvedata/market_state")
            .query_param("code", "XNYS");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"[{"name": "NYSE", "code": "XNYS", "country": "United States", "is_market_open": true,
                       "time_after_open": "02:10:00", "time_to_open": "00:00:00", "time_to_close": "04:50:00"}]"#);
    });

    let out = live_client(&server.base_url())
        .twelvedata()
        .market_state(&["XNYS"])
        .await;
    assert!(out.is_live());
    let markets = out.into_data();
    assert_eq!(markets.len(), 1);
    assert!(markets[0].is_market_open);
}
