use std::sync::Arc;
use std::time::Duration;

use marketfeed_rs::{
    AbortOrigin, CancelScope, FeedError, FetchOptions, HttpRequest, RobustFetch, TimeoutTracker,
};
use tokio_util::sync::CancellationToken;

use crate::common::{ScriptedTransport, Step, status, test_url};

#[tokio::test]
async fn pre_cancelled_token_makes_no_request() {
    let transport = ScriptedTransport::always(status(200));
    let fetch = RobustFetch::new(transport.clone(), Arc::new(TimeoutTracker::new()));
    let token = CancellationToken::new();
    token.cancel();

    let err = fetch
        .fetch(
            &HttpRequest::get(test_url("finnhub/quote")),
            FetchOptions {
                retry: None,
                cancel: Some(&token),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, FeedError::Aborted(AbortOrigin::External)));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancelling_mid_attempt_aborts_without_retry() {
    let transport = ScriptedTransport::always(Step::Hang);
    let fetch = RobustFetch::new(transport.clone(), Arc::new(TimeoutTracker::new()));
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let err = fetch
        .fetch(
            &HttpRequest::get(test_url("finnhub/quote")),
            FetchOptions {
                retry: None,
                cancel: Some(&token),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, FeedError::Aborted(AbortOrigin::External)));
    assert_eq!(transport.calls(), 1);
    assert_eq!(fetch.tracker().len(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancelling_during_backoff_stops_the_loop() {
    let transport = ScriptedTransport::always(status(500));
    let fetch = RobustFetch::new(transport.clone(), Arc::new(TimeoutTracker::new()));
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        // First backoff is 1 s.
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let err = fetch
        .fetch(
            &HttpRequest::get(test_url("twelvedata/quote")),
            FetchOptions {
                retry: None,
                cancel: Some(&token),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, FeedError::Aborted(AbortOrigin::External)));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn scope_deadline_reports_timeout() {
    let scope = CancelScope::new(Duration::from_secs(1), None);
    let out = scope.run(std::future::pending::<()>()).await;
    assert!(matches!(out, Err(FeedError::Timeout)));
}

#[tokio::test]
async fn internal_cancel_is_not_external() {
    let scope = CancelScope::new(Duration::ZERO, None);
    scope.cancel();
    let out = scope.run(async { 1 }).await;
    assert!(matches!(out, Err(FeedError::Aborted(AbortOrigin::Internal))));
    assert!(!scope.externally_cancelled());
}

#[tokio::test]
async fn finish_is_idempotent() {
    let token = CancellationToken::new();
    let mut scope = CancelScope::new(Duration::from_secs(5), Some(&token));
    assert_eq!(scope.run(async { 7 }).await.unwrap(), 7);
    assert!(scope.finish());
    assert!(!scope.finish());
    assert!(scope.is_finished());

    // Cancelling after the attempt finished is not attributed to it.
    token.cancel();
    assert!(!scope.externally_cancelled());
}
