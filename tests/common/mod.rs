#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use marketfeed_rs::{
    FeedClient, HttpRequest, HttpResponse, SendFuture, Transport, TransportError,
};
use tokio::time::Instant;
use url::Url;

/// What the scripted transport does for one request.
#[derive(Debug, Clone)]
pub enum Step {
    Respond(HttpResponse),
    Fail(TransportError),
    /// Never answers; only a deadline or cancellation ends the attempt.
    Hang,
}

/// Plays back a fixed list of steps, repeating the last one forever.
#[derive(Debug)]
pub struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    last: Mutex<Option<Step>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(Instant, HttpRequest)>>,
}

impl ScriptedTransport {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into_iter().collect()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn always(step: Step) -> Arc<Self> {
        Self::new([step])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// When each request was sent.
    pub fn call_times(&self) -> Vec<Instant> {
        self.seen.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().iter().map(|(_, r)| r.clone()).collect()
    }

    fn next_step(&self) -> Step {
        let mut steps = self.steps.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        if let Some(step) = steps.pop_front() {
            *last = Some(step.clone());
            return step;
        }
        last.clone().unwrap_or(Step::Hang)
    }
}

impl Transport for ScriptedTransport {
    fn send<'a>(&'a self, req: &'a HttpRequest) -> SendFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push((Instant::now(), req.clone()));
        let step = self.next_step();
        Box::pin(async move {
            match step {
                Step::Respond(resp) => Ok(resp),
                Step::Fail(err) => Err(err),
                Step::Hang => std::future::pending().await,
            }
        })
    }
}

pub fn json(body: &str) -> Step {
    Step::Respond(HttpResponse::json(body))
}

pub fn status(code: u16) -> Step {
    Step::Respond(HttpResponse::new(code, "error").with_content_type("text/plain"))
}

pub fn test_url(path: &str) -> Url {
    Url::parse(&format!("http://proxy.test/api/proxy/{path}")).unwrap()
}

/// A client over `transport` with seeded fallbacks and no rate limiting.
pub fn client_with(transport: Arc<dyn Transport>) -> FeedClient {
    builder_with(transport).build().unwrap()
}

pub fn builder_with(transport: Arc<dyn Transport>) -> marketfeed_rs::FeedClientBuilder {
    let mut b = FeedClient::builder()
        .base_url(Url::parse("http://proxy.test/api/proxy/").unwrap())
        .transport(transport)
        .dev_mode(false)
        .fallback_seed(7);
    for service in marketfeed_rs::Service::ALL {
        b = b.no_rate_limit(service);
    }
    b
}

/// A client using the real HTTP transport against `server_base`.
pub fn live_client(server_base: &str) -> FeedClient {
    let mut b = FeedClient::builder()
        .base_url(Url::parse(&format!("{server_base}/api/proxy/")).unwrap())
        .dev_mode(false)
        .retry_policy(marketfeed_rs::RetryPolicy::no_retries())
        .fallback_seed(11);
    for service in marketfeed_rs::Service::ALL {
        b = b.no_rate_limit(service);
    }
    b.build().unwrap()
}
