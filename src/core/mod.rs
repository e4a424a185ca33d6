//! Core components of the `marketfeed-rs` client.
//!
//! This module contains the resilience building blocks every provider client
//! is assembled from:
//! - The [`FeedClient`] composition root and its builder.
//! - The primary [`FeedError`] type and the [`Outcome`] result wrapper.
//! - [`RobustFetch`], [`TimeoutTracker`], [`CircuitBreaker`] and [`ResponseCache`].

/// The composition root (`FeedClient`), builder, and configuration.
pub mod client;
/// The primary error type (`FeedError`) for the crate.
pub mod error;
/// Shared identifiers such as [`Service`].
pub mod models;

pub mod breaker;
pub mod cache;
pub mod cancel;
pub mod fetch;
pub mod net;
pub mod outcome;
pub mod tracker;

pub(crate) mod services;
pub(crate) mod wire;

// convenient re-exports so most code can just `use crate::core::FeedClient`
pub use breaker::{BreakerConfig, BreakerState, BreakerStatus, CircuitBreaker};
pub use cache::ResponseCache;
pub use cancel::CancelScope;
pub use client::{CacheMode, FeedClient, FeedClientBuilder, RetryPolicy};
pub use error::{AbortOrigin, FeedError};
pub use fetch::{FetchOptions, RobustFetch};
pub use models::Service;
pub use net::{HttpRequest, HttpResponse, ReqwestTransport, SendFuture, Transport, TransportError};
pub use outcome::{FeedState, Outcome};
pub use services::CallOptions;
pub use tracker::TimeoutTracker;
