//! Single-request retry loop with per-attempt deadlines.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::cancel::CancelScope;
use crate::core::client::RetryPolicy;
use crate::core::error::{AbortOrigin, FeedError};
use crate::core::net::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::core::tracker::TimeoutTracker;

/// Per-call knobs for [`RobustFetch`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions<'a> {
    /// Overrides the fetcher's default policy.
    pub retry: Option<&'a RetryPolicy>,
    /// Caller's cancellation token.
    pub cancel: Option<&'a CancellationToken>,
}

/// What to do after a failed attempt.
#[derive(Debug, PartialEq, Eq)]
enum Next {
    Retry,
    Stop,
    /// Timeout retries are used up; stop and count it against the URL.
    StopAndRecordTimeout,
}

fn next_step(err: &FeedError, attempt: u32, policy: &RetryPolicy) -> Next {
    match err {
        FeedError::Timeout if attempt < policy.timeout_retries() => Next::Retry,
        FeedError::Timeout => Next::StopAndRecordTimeout,
        _ if !err.is_retryable() => Next::Stop,
        _ if attempt >= policy.max_retries => Next::Stop,
        _ => Next::Retry,
    }
}

fn classify_transport(err: TransportError) -> FeedError {
    match err {
        TransportError::Timeout => FeedError::Timeout,
        TransportError::Connect(detail) | TransportError::Other(detail) => {
            FeedError::Network { detail }
        }
    }
}

/// Executes requests with timeout, classification and exponential backoff.
#[derive(Debug, Clone)]
pub struct RobustFetch {
    transport: Arc<dyn Transport>,
    tracker: Arc<TimeoutTracker>,
    policy: RetryPolicy,
}

impl RobustFetch {
    pub fn new(transport: Arc<dyn Transport>, tracker: Arc<TimeoutTracker>) -> Self {
        Self {
            transport,
            tracker,
            policy: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn tracker(&self) -> &Arc<TimeoutTracker> {
        &self.tracker
    }

    /// Perform `req`, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns the classification of the last failed attempt, or
    /// `TemporarilyUnavailable` / `Aborted(External)` when no attempt was made.
    pub async fn fetch(
        &self,
        req: &HttpRequest,
        opts: FetchOptions<'_>,
    ) -> Result<HttpResponse, FeedError> {
        let url = req.url.as_str();
        if self.tracker.should_skip(url) {
            warn!(url, "skipping request after repeated timeouts");
            return Err(FeedError::TemporarilyUnavailable);
        }
        if opts.cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(FeedError::Aborted(AbortOrigin::External));
        }

        let policy = opts.retry.unwrap_or(&self.policy);
        let mut attempt: u32 = 0;
        loop {
            let mut scope = CancelScope::new(policy.timeout, opts.cancel);
            let outcome = scope.run(self.transport.send(req)).await;
            scope.finish();

            let err = match outcome {
                Ok(Ok(resp)) if resp.is_success() => {
                    debug!(url, attempt, status = resp.status, "fetch ok");
                    return Ok(resp);
                }
                Ok(Ok(resp)) if resp.looks_like_html() => FeedError::ProxyUnavailable,
                Ok(Ok(resp)) => FeedError::Http {
                    status: resp.status,
                    url: url.to_owned(),
                },
                Ok(Err(te)) => classify_transport(te),
                Err(e) => e,
            };

            match next_step(&err, attempt, policy) {
                Next::Retry => {}
                Next::Stop => {
                    warn!(url, attempts = attempt + 1, error = %err, "fetch failed");
                    return Err(err);
                }
                Next::StopAndRecordTimeout => {
                    let count = self.tracker.record_timeout(url);
                    warn!(url, attempts = attempt + 1, timeouts = count, "request timed out");
                    return Err(err);
                }
            }

            let delay = policy.delay_for(attempt);
            warn!(
                url,
                attempt = attempt + 1,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "fetch attempt failed; retrying"
            );
            match opts.cancel {
                Some(token) => {
                    tokio::select! {
                        biased;
                        () = token.cancelled() => {
                            return Err(FeedError::Aborted(AbortOrigin::External));
                        }
                        () = tokio::time::sleep(delay) => {}
                    }
                }
                None => tokio::time::sleep(delay).await,
            }
            attempt += 1;
        }
    }

    /// Like [`fetch`](Self::fetch), then decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Everything `fetch` returns, plus `ProxyUnavailable` for HTML bodies and
    /// `Parse` for non-JSON content types or malformed JSON.
    pub async fn fetch_json<T>(
        &self,
        req: &HttpRequest,
        opts: FetchOptions<'_>,
    ) -> Result<T, FeedError>
    where
        T: DeserializeOwned,
    {
        let resp = self.fetch(req, opts).await?;
        decode_json(&resp)
    }
}

pub(crate) fn decode_json<T: DeserializeOwned>(resp: &HttpResponse) -> Result<T, FeedError> {
    if resp.looks_like_html() {
        return Err(FeedError::ProxyUnavailable);
    }
    if !resp.is_json() {
        return Err(FeedError::Parse(format!(
            "expected JSON, got {}",
            resp.content_type.as_deref().unwrap_or("no content type")
        )));
    }
    Ok(serde_json::from_str(&resp.body)?)
}
