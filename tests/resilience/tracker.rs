use std::sync::Arc;
use std::time::Duration;

use marketfeed_rs::{
    FeedError, FetchOptions, HttpRequest, RetryPolicy, RobustFetch, TimeoutTracker,
};

use crate::common::{ScriptedTransport, Step, test_url};

#[tokio::test(start_paused = true)]
async fn three_exhausted_timeouts_skip_the_url() {
    let transport = ScriptedTransport::always(Step::Hang);
    let fetch = RobustFetch::new(transport.clone(), Arc::new(TimeoutTracker::new()))
        .with_policy(RetryPolicy::no_retries().timeout(Duration::from_secs(1)));
    let req = HttpRequest::get(test_url("yfinance/news/latest"));

    for n in 1..=3 {
        let err = fetch.fetch(&req, FetchOptions::default()).await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(fetch.tracker().timeouts(req.url.as_str()), n);
    }
    assert_eq!(transport.calls(), 3);

    let err = fetch.fetch(&req, FetchOptions::default()).await.unwrap_err();
    assert!(matches!(err, FeedError::TemporarilyUnavailable));
    assert_eq!(transport.calls(), 3, "skipped urls never reach the transport");

    // Other urls are unaffected.
    let other = HttpRequest::get(test_url("yfinance/news/other"));
    let err = fetch.fetch(&other, FetchOptions::default()).await.unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(transport.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn skip_lifts_once_the_window_passes() {
    let tracker = TimeoutTracker::with_limits(3, Duration::from_secs(300));
    let url = "http://proxy.test/api/proxy/finnhub/quote";
    for _ in 0..3 {
        tracker.record_timeout(url);
    }
    assert!(tracker.should_skip(url));

    tokio::time::advance(Duration::from_secs(301)).await;
    assert!(!tracker.should_skip(url));
    assert_eq!(tracker.timeouts(url), 0);
    assert!(tracker.is_empty());
}

#[tokio::test(start_paused = true)]
async fn a_stale_record_restarts_the_count() {
    let tracker = TimeoutTracker::with_limits(3, Duration::from_secs(300));
    let url = "http://proxy.test/api/proxy/finnhub/candles";
    tracker.record_timeout(url);
    tracker.record_timeout(url);
    tokio::time::advance(Duration::from_secs(400)).await;
    assert_eq!(tracker.record_timeout(url), 1);
    assert!(!tracker.should_skip(url));
}

#[test]
fn reset_forgets_everything() {
    let tracker = TimeoutTracker::new();
    tracker.record_timeout("a");
    tracker.record_timeout("b");
    assert_eq!(tracker.len(), 2);
    tracker.reset();
    assert!(tracker.is_empty());
}
