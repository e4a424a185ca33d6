use std::time::Duration;

use marketfeed_rs::{
    BreakerState, CacheMode, HttpResponse, RetryPolicy, Service, TransportError,
};
use tokio_util::sync::CancellationToken;

use crate::common::{ScriptedTransport, Step, builder_with, client_with, json, status};

const AAPL: &str = r#"{"c": 190.5, "d": 1.5, "dp": 0.79, "h": 191, "l": 188, "o": 189, "pc": 189, "t": 1700000000}"#;

fn no_retries(transport: std::sync::Arc<ScriptedTransport>) -> marketfeed_rs::FeedClient {
    builder_with(transport)
        .retry_policy(RetryPolicy::no_retries())
        .build()
        .unwrap()
}

#[tokio::test]
async fn second_call_is_served_from_cache() {
    let transport = ScriptedTransport::always(json(AAPL));
    let client = client_with(transport.clone());

    let first = client.finnhub().quote("AAPL").await;
    assert!(first.is_live());
    assert_eq!(first.data().symbol, "AAPL");

    let second = client.finnhub().quote("AAPL").await;
    assert!(second.is_cached());
    assert!((second.data().current - 190.5).abs() < 1e-9);
    assert_eq!(transport.calls(), 1);
    assert_eq!(client.finnhub().cache_len().await, 1);
}

#[tokio::test]
async fn refresh_and_bypass_skip_the_cache_read() {
    let transport = ScriptedTransport::always(json(AAPL));
    let client = client_with(transport.clone());
    let finnhub = client.finnhub();

    assert!(finnhub.cache_mode(CacheMode::Bypass).quote("AAPL").await.is_live());
    assert_eq!(finnhub.cache_len().await, 0, "bypass never writes");

    assert!(finnhub.cache_mode(CacheMode::Refresh).quote("AAPL").await.is_live());
    assert!(finnhub.cache_mode(CacheMode::Refresh).quote("AAPL").await.is_live());
    assert_eq!(transport.calls(), 3);

    assert!(finnhub.quote("AAPL").await.is_cached());
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn failed_refresh_serves_stale_cache_as_degraded() {
    let transport = ScriptedTransport::new([json(AAPL), status(500)]);
    let client = no_retries(transport.clone());

    assert!(client.finnhub().quote("AAPL").await.is_live());
    let out = client.finnhub().cache_mode(CacheMode::Refresh).quote("AAPL").await;

    assert!(out.is_degraded());
    assert!((out.data().current - 190.5).abs() < 1e-9);
    assert_eq!(out.error(), Some("Request failed with HTTP status 500"));
    assert_eq!(client.finnhub().breaker_status().failure_count, 1);
}

#[tokio::test]
async fn failing_batch_degrades_to_one_fallback_per_symbol() {
    let transport =
        ScriptedTransport::always(Step::Fail(TransportError::Connect("refused".into())));
    let client = no_retries(transport.clone());

    let out = client.finnhub().quotes(&["AAPL", "MSFT"]).await;

    assert!(out.is_degraded());
    assert_eq!(
        out.error(),
        Some("Network error - please check your connection")
    );
    let quotes = out.into_data();
    assert_eq!(
        quotes.iter().map(|q| q.symbol.as_str()).collect::<Vec<_>>(),
        ["AAPL", "MSFT"]
    );
    assert!(quotes.iter().all(|q| q.current > 0.0));
}

#[tokio::test]
async fn breaker_opens_and_stops_network_calls() {
    let transport = ScriptedTransport::always(status(500));
    let client = no_retries(transport.clone());
    let finnhub = client.finnhub();

    for symbol in ["AAPL", "MSFT", "NVDA"] {
        assert!(finnhub.quote(symbol).await.is_degraded());
    }
    assert_eq!(transport.calls(), 3);
    assert_eq!(finnhub.breaker_status().state, BreakerState::Open);

    let out = finnhub.quote("TSLA").await;
    assert!(out.is_degraded());
    assert!(out.error().unwrap().contains("circuit breaker is open"));
    assert_eq!(out.data().symbol, "TSLA");
    assert_eq!(transport.calls(), 3);

    finnhub.reset();
    assert_eq!(finnhub.breaker_status().state, BreakerState::Closed);
    let _ = finnhub.quote("TSLA").await;
    assert_eq!(transport.calls(), 4);
}

#[tokio::test]
async fn gated_call_prefers_cached_data() {
    let transport = ScriptedTransport::new([json(AAPL), status(500)]);
    let client = no_retries(transport.clone());
    let finnhub = client.finnhub();

    assert!(finnhub.quote("AAPL").await.is_live());
    for symbol in ["MSFT", "NVDA", "TSLA"] {
        let _ = finnhub.quote(symbol).await;
    }
    assert!(finnhub.breaker_status().is_open());

    let out = finnhub.cache_mode(CacheMode::Refresh).quote("AAPL").await;
    assert!(out.is_cached());
    assert_eq!(transport.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn rate_limit_cooldown_outlasts_ordinary_failures() {
    let throttled = ScriptedTransport::always(status(429));
    let a = no_retries(throttled.clone());
    let _ = a.finnhub().quote("AAPL").await;
    let rate_limited = a.finnhub().breaker_status();
    assert!(rate_limited.is_open(), "a single 429 opens the breaker");

    let failing = ScriptedTransport::always(status(500));
    let b = no_retries(failing.clone());
    for symbol in ["AAPL", "MSFT", "NVDA"] {
        let _ = b.finnhub().quote(symbol).await;
    }
    let ordinary = b.finnhub().breaker_status();
    assert!(ordinary.is_open());

    assert_eq!(rate_limited.retry_in, Some(Duration::from_secs(10 * 60)));
    assert_eq!(ordinary.retry_in, Some(Duration::from_secs(5 * 60)));
}

#[tokio::test]
async fn caller_abort_does_not_count_as_failure() {
    let transport = ScriptedTransport::always(json(AAPL));
    let client = client_with(transport.clone());
    let token = CancellationToken::new();
    token.cancel();

    let out = client.finnhub().cancel_token(token).quote("AAPL").await;
    assert!(out.is_degraded());
    assert_eq!(out.error(), Some("Request was aborted externally"));
    assert_eq!(client.finnhub().breaker_status().failure_count, 0);
    assert_eq!(transport.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn html_marks_the_cmc_proxy_down_until_cooldown() {
    let page = HttpResponse::new(200, "<html><body>index</body></html>").with_content_type("text/html");
    let transport = ScriptedTransport::always(Step::Respond(page));
    let client = no_retries(transport.clone());
    let cmc = client.coinmarketcap();

    let out = cmc.listings_latest(1, 5, "USD", "market_cap").await;
    assert!(out.is_degraded());
    assert!(!cmc.is_proxy_available());

    let out = cmc.global_metrics("USD").await;
    assert_eq!(
        out.error(),
        Some("API proxy returned HTML instead of JSON - service may be unavailable")
    );
    assert_eq!(transport.calls(), 1);

    // CoinMarketCap's ordinary cooldown is one minute.
    tokio::time::advance(Duration::from_secs(61)).await;
    assert!(cmc.is_proxy_available());
    let _ = cmc.global_metrics("USD").await;
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn quota_message_switches_the_service_off() {
    let transport = ScriptedTransport::always(json(
        r#"{"code": 400, "message": "You have run out of API credits for the day.", "status": "error"}"#,
    ));
    let client = no_retries(transport.clone());
    let td = client.twelvedata();

    let out = td.quote("AAPL").await;
    assert!(out.is_degraded());
    assert_eq!(out.data().symbol, "AAPL");
    let status = td.availability();
    assert!(status.disabled);
    assert!(status.retry_in.unwrap() > Duration::from_secs(23 * 3600));
    assert!(client.availability().is_disabled(Service::TwelveData));
    assert!(!client.availability().is_disabled(Service::Finnhub));

    let out = td.quote("MSFT").await;
    assert!(out.error().unwrap().contains("disabled"));
    assert_eq!(transport.calls(), 1);

    client.reset_all();
    assert!(!td.availability().disabled);
}

#[tokio::test]
async fn api_keys_go_where_each_provider_expects_them() {
    let transport = ScriptedTransport::always(json(r#"{"status": {"error_code": 0}, "data": []}"#));
    let client = builder_with(transport.clone())
        .api_key(Service::Finnhub, "fh-key")
        .api_key(Service::CoinMarketCap, "cmc-key")
        .build()
        .unwrap();

    let _ = client.finnhub().symbol_lookup("apple").await;
    let _ = client.coinmarketcap().search("BTC").await;

    let reqs = transport.requests();
    assert_eq!(reqs.len(), 2);
    assert_eq!(reqs[0].url.path(), "/api/proxy/finnhub/symbol-lookup");
    assert!(reqs[0].url.query_pairs().any(|(k, v)| k == "token" && v == "fh-key"));
    assert!(reqs[0].headers.is_empty());

    assert_eq!(reqs[1].url.path(), "/api/proxy/coinmarketcap/map");
    assert!(!reqs[1].url.query_pairs().any(|(k, _)| k == "token"));
    assert!(
        reqs[1]
            .headers
            .iter()
            .any(|(k, v)| k == "X-CMC_PRO_API_KEY" && v == "cmc-key")
    );
}

#[tokio::test(start_paused = true)]
async fn client_side_rate_limit_spaces_requests() {
    let transport = ScriptedTransport::always(json(AAPL));
    let client = builder_with(transport.clone())
        .rate_limit(Service::Finnhub, 2, Duration::from_secs(1))
        .build()
        .unwrap();
    let finnhub = client.finnhub().cache_mode(CacheMode::Bypass);

    for _ in 0..3 {
        assert!(finnhub.quote("AAPL").await.is_live());
    }
    let times = transport.call_times();
    assert_eq!(times.len(), 3);
    assert_eq!(times[1] - times[0], Duration::ZERO);
    assert_eq!(times[2] - times[0], Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn html_error_page_marks_the_cmc_proxy_down() {
    let page = HttpResponse::new(502, "<!DOCTYPE html><html><body>Bad Gateway</body></html>")
        .with_content_type("text/html");
    let transport = ScriptedTransport::always(Step::Respond(page));
    let client = builder_with(transport.clone()).build().unwrap();
    let cmc = client.coinmarketcap();

    let out = cmc.global_metrics("USD").await;
    assert_eq!(
        out.error(),
        Some("API proxy returned HTML instead of JSON - service may be unavailable")
    );
    assert!(!cmc.is_proxy_available());
    assert_eq!(transport.calls(), 1, "an HTML page is not retried");

    let out = cmc.global_metrics("USD").await;
    assert!(out.is_degraded());
    assert_eq!(transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn cmc_server_errors_retry_twice_then_flag_the_proxy() {
    let transport = ScriptedTransport::always(status(503));
    let client = builder_with(transport.clone()).build().unwrap();
    let cmc = client.coinmarketcap();

    let out = cmc.listings_latest(1, 3, "USD", "market_cap").await;
    assert!(out.is_degraded());
    assert_eq!(transport.calls(), 3);
    assert!(!cmc.is_proxy_available());

    let _ = cmc.listings_latest(1, 3, "USD", "market_cap").await;
    assert_eq!(transport.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn cancel_while_waiting_for_a_rate_limit_slot() {
    let transport = ScriptedTransport::always(json(AAPL));
    let client = builder_with(transport.clone())
        .rate_limit(Service::Finnhub, 1, Duration::from_secs(60))
        .build()
        .unwrap();
    assert!(client.finnhub().quote("AAPL").await.is_live());

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let started = tokio::time::Instant::now();
    let out = client
        .finnhub()
        .cache_mode(CacheMode::Bypass)
        .cancel_token(token)
        .quote("AAPL")
        .await;
    assert_eq!(out.error(), Some("Request was aborted externally"));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(transport.calls(), 1);
    assert_eq!(client.finnhub().breaker_status().failure_count, 0);
}
