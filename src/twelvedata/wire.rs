use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::model::Quote;
use crate::core::error::FeedError;
use crate::core::models::Service;

/// `/quote` answers a bare quote for one symbol and a symbol-keyed map for
/// several. `Many` is tried first: a bare quote never decodes as a map of
/// quotes because its values are strings and numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum QuotesWire {
    Many(HashMap<String, Quote>),
    One(Box<Quote>),
}

impl QuotesWire {
    /// Quotes in the order of `symbols`; symbols missing from the answer are
    /// skipped.
    pub(super) fn into_ordered(self, symbols: &[&str]) -> Vec<Quote> {
        match self {
            QuotesWire::One(q) => vec![*q],
            QuotesWire::Many(mut map) => symbols.iter().filter_map(|s| map.remove(*s)).collect(),
        }
    }
}

/// Twelve Data reports failures as `{"code": 4xx, "message": "...", "status": "error"}`.
pub(super) fn check_envelope(service: Service, body: &Value) -> Result<(), FeedError> {
    let is_error = body.get("status").and_then(Value::as_str) == Some("error")
        || body.get("code").is_some_and(Value::is_number);
    if !is_error {
        return Ok(());
    }
    let code = body.get("code").and_then(Value::as_i64);
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("API request failed");
    Err(FeedError::from_provider(service, code, message))
}
