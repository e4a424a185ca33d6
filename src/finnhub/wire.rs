use serde_json::Value;

use crate::core::error::FeedError;
use crate::core::models::Service;

/// Finnhub reports failures as `{"error": "..."}` with a 2xx status.
pub(super) fn check_envelope(service: Service, body: &Value) -> Result<(), FeedError> {
    match body.get("error").and_then(Value::as_str) {
        Some(message) => Err(FeedError::from_provider(service, None, message)),
        None => Ok(()),
    }
}
