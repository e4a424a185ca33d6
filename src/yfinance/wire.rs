use serde_json::Value;

use crate::core::error::FeedError;
use crate::core::models::Service;

/// The scraper sets `error` when Yahoo could not be reached.
pub(super) fn check_envelope(service: Service, body: &Value) -> Result<(), FeedError> {
    match body.get("error").and_then(Value::as_str) {
        Some(message) if !message.is_empty() => {
            Err(FeedError::from_provider(service, None, message))
        }
        _ => Ok(()),
    }
}
