use serde_json::Value;

use crate::core::error::FeedError;
use crate::core::models::Service;

/// NewsAPI error codes that mean the request budget is spent.
const RATE_LIMIT_CODES: &[&str] = &["rateLimited", "apiKeyExhausted"];

/// Failures come back as `{"status": "error", "code": "...", "message": "..."}`.
pub(super) fn check_envelope(service: Service, body: &Value) -> Result<(), FeedError> {
    if body.get("status").and_then(Value::as_str) != Some("error") {
        return Ok(());
    }
    let code = body.get("code").and_then(Value::as_str).unwrap_or_default();
    if RATE_LIMIT_CODES.contains(&code) {
        return Err(FeedError::RateLimited { service });
    }
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("API request failed");
    Err(FeedError::from_provider(service, None, message))
}
