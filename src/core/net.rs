//! HTTP plumbing: request/response values and the `Transport` seam.
//!
//! Everything above this module works on [`HttpRequest`] / [`HttpResponse`],
//! which keeps retry, breaker and cache logic testable with a scripted
//! transport instead of a live socket.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use url::Url;

/// A single GET-style request against a provider endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: Url,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: Url) -> Self {
        Self {
            url,
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A fully buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
        }
    }

    /// Convenience for a `200 application/json` response.
    pub fn json(body: impl Into<String>) -> Self {
        Self::new(200, body).with_content_type("application/json")
    }

    #[must_use]
    pub fn with_content_type(mut self, ct: impl Into<String>) -> Self {
        self.content_type = Some(ct.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `application/json` or any `+json` media type.
    pub fn is_json(&self) -> bool {
        self.content_type.as_deref().is_some_and(|ct| {
            let essence = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
            essence == "application/json" || essence.ends_with("+json")
        })
    }

    /// Proxies that lose their upstream tend to serve the app's index page.
    pub fn looks_like_html(&self) -> bool {
        let head = self.body.trim_start();
        let prefix: String = head.chars().take(15).collect::<String>().to_ascii_lowercase();
        prefix.starts_with("<!doctype") || prefix.starts_with("<html")
    }
}

/// Failures below the HTTP layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("transport timed out")]
    Timeout,
    #[error("{0}")]
    Other(String),
}

/// Boxed future returned by [`Transport::send`].
pub type SendFuture<'a> =
    Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'a>>;

/// Something that can execute an [`HttpRequest`].
///
/// Dropping the returned future must abandon the request; cancellation and
/// deadlines are enforced by dropping.
pub trait Transport: Send + Sync + fmt::Debug {
    fn send<'a>(&'a self, req: &'a HttpRequest) -> SendFuture<'a>;
}

/// The production transport, backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub(crate) fn build(
        user_agent: &str,
        connect_timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut httpb = reqwest::Client::builder().user_agent(user_agent);
        if let Some(ct) = connect_timeout {
            httpb = httpb.connect_timeout(ct);
        }
        Ok(Self::new(httpb.build()?))
    }
}

fn map_reqwest_error(e: &reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}

impl Transport for ReqwestTransport {
    fn send<'a>(&'a self, req: &'a HttpRequest) -> SendFuture<'a> {
        Box::pin(async move {
            let mut rb = self
                .http
                .get(req.url.clone())
                .header("accept", "application/json");
            for (name, value) in &req.headers {
                rb = rb.header(name.as_str(), value.as_str());
            }

            let resp = rb.send().await.map_err(|e| map_reqwest_error(&e))?;
            let status = resp.status().as_u16();
            let content_type = resp
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let body = resp.text().await.map_err(|e| map_reqwest_error(&e))?;

            Ok(HttpResponse {
                status,
                content_type,
                body,
            })
        })
    }
}
