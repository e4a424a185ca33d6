//! Serde helpers for provider payloads that mix numbers and numeric strings.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum AnyNumber {
    F64(f64),
    Str(String),
}

fn parse_any(n: AnyNumber) -> Option<f64> {
    match n {
        AnyNumber::F64(f) => Some(f),
        AnyNumber::Str(s) => s.trim().parse::<f64>().ok(),
    }
}

/// `"187.42"`, `187.42` and `null` all decode; unparsable strings become `0.0`.
pub(crate) fn de_f64_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<AnyNumber>::deserialize(deserializer)?
        .and_then(parse_any)
        .unwrap_or_default())
}

/// Like [`de_f64_lenient`] but keeps "missing" distinct from zero.
pub(crate) fn de_opt_f64_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<AnyNumber>::deserialize(deserializer)?.and_then(parse_any))
}

/// Integer counts that some providers send as floats or strings.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn de_u64_lenient<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<AnyNumber>::deserialize(deserializer)?
        .and_then(parse_any)
        .filter(|f| f.is_finite() && *f >= 0.0)
        .map_or(0, |f| f.round() as u64))
}

/// `null` decodes as `T::default()`.
pub(crate) fn de_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
