use std::sync::Arc;
use std::time::Duration;

use marketfeed_rs::{
    FeedError, FetchOptions, HttpRequest, RetryPolicy, RobustFetch, TimeoutTracker,
    TransportError,
};

use crate::common::{ScriptedTransport, Step, json, status, test_url};

fn fetcher(transport: Arc<ScriptedTransport>) -> RobustFetch {
    RobustFetch::new(transport, Arc::new(TimeoutTracker::new()))
}

#[tokio::test(start_paused = true)]
async fn timeouts_retry_twice_with_backoff() {
    let transport = ScriptedTransport::always(Step::Hang);
    let fetch = fetcher(transport.clone());
    let req = HttpRequest::get(test_url("finnhub/quote?symbol=AAPL"));

    let err = fetch.fetch(&req, FetchOptions::default()).await.unwrap_err();
    assert!(matches!(err, FeedError::Timeout), "got {err:?}");

    // Default policy: 10 s deadline, 1 s base delay doubling; timeouts are
    // retried at most twice.
    let times = transport.call_times();
    assert_eq!(times.len(), 3);
    assert_eq!(times[1] - times[0], Duration::from_secs(10 + 1));
    assert_eq!(times[2] - times[1], Duration::from_secs(10 + 2));
    assert_eq!(fetch.tracker().timeouts(req.url.as_str()), 1);
}

#[tokio::test(start_paused = true)]
async fn server_errors_use_the_full_retry_budget() {
    let transport = ScriptedTransport::always(status(503));
    let fetch = fetcher(transport.clone());
    let req = HttpRequest::get(test_url("coinmarketcap/listings"));

    let err = fetch.fetch(&req, FetchOptions::default()).await.unwrap_err();
    assert_eq!(err.status(), Some(503));

    let times = transport.call_times();
    assert_eq!(times.len(), 4);
    assert_eq!(times[1] - times[0], Duration::from_secs(1));
    assert_eq!(times[2] - times[1], Duration::from_secs(2));
    assert_eq!(times[3] - times[2], Duration::from_secs(4));
    // Only timeouts count against the url.
    assert_eq!(fetch.tracker().timeouts(req.url.as_str()), 0);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let transport = ScriptedTransport::always(status(404));
    let fetch = fetcher(transport.clone());
    let req = HttpRequest::get(test_url("finnhub/quote?symbol=NOPE"));

    let err = fetch.fetch(&req, FetchOptions::default()).await.unwrap_err();
    assert!(err.is_client_error());
    assert!(matches!(err, FeedError::Http { status: 404, .. }));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn network_error_then_success() {
    let transport = ScriptedTransport::new([
        Step::Fail(TransportError::Connect("connection refused".into())),
        json(r#"{"c": 1.0}"#),
    ]);
    let fetch = fetcher(transport.clone());
    let req = HttpRequest::get(test_url("finnhub/quote?symbol=AAPL"));

    let resp = fetch.fetch(&req, FetchOptions::default()).await.unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn per_call_policy_overrides_the_default() {
    let transport = ScriptedTransport::always(status(500));
    let fetch = fetcher(transport.clone());
    let req = HttpRequest::get(test_url("twelvedata/quote?symbol=AAPL"));
    let policy = RetryPolicy::default()
        .max_retries(1)
        .base_delay(Duration::from_millis(250));

    let _ = fetch
        .fetch(
            &req,
            FetchOptions {
                retry: Some(&policy),
                cancel: None,
            },
        )
        .await;

    let times = transport.call_times();
    assert_eq!(times.len(), 2);
    assert_eq!(times[1] - times[0], Duration::from_millis(250));
}

#[test]
fn backoff_grows_geometrically() {
    let p = RetryPolicy::default()
        .base_delay(Duration::from_millis(100))
        .backoff_multiplier(3.0);
    assert_eq!(p.delay_for(0), Duration::from_millis(100));
    assert_eq!(p.delay_for(1), Duration::from_millis(300));
    assert_eq!(p.delay_for(2), Duration::from_millis(900));
    assert_eq!(RetryPolicy::default().max_retries(5).timeout_retries(), 2);
    assert_eq!(RetryPolicy::no_retries().timeout_retries(), 0);
}

#[test]
fn delay_saturates_instead_of_overflowing() {
    let p = RetryPolicy::default().backoff_multiplier(10.0);
    assert_eq!(p.delay_for(20), Duration::MAX);
    assert_eq!(p.delay_for(u32::MAX), p.base_delay);
    assert!(p.delay_for(3) < p.delay_for(4));
}
