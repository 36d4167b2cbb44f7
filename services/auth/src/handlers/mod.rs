pub mod code;
pub mod profile;
pub mod token;

use axum::http::HeaderMap;

/// Caller network origin used as a throttling key. Trusts the first
/// `x-forwarded-for` hop (the service sits behind the edge proxy); direct
/// connections collapse into one shared bucket.
pub(crate) fn caller_origin(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "direct".to_owned())
}
