use serde_json::Value;

use crate::core::error::FeedError;
use crate::core::models::Service;

/// CoinMarketCap codes that mean "slow down": per-minute and per-second caps.
const RATE_LIMIT_CODES: &[i64] = &[429, 1008];

/// Inspect `status.error_code`; anything non-zero is a failure even on 2xx.
pub(super) fn check_envelope(service: Service, body: &Value) -> Result<(), FeedError> {
    let Some(status) = body.get("status") else {
        return Ok(());
    };
    let code = status.get("error_code").and_then(Value::as_i64).unwrap_or(0);
    if code == 0 {
        return Ok(());
    }
    let message = status
        .get("error_message")
        .and_then(Value::as_str)
        .unwrap_or("API request failed");
    if RATE_LIMIT_CODES.contains(&code) {
        return Err(FeedError::RateLimited { service });
    }
    Err(FeedError::from_provider(service, Some(code), message))
}
