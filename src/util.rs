//! Shared helpers for handlers and the service layer.

use axum::http::HeaderMap;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

pub const SECONDS_PER_DAY: i64 = 86400;

/// Convert an `expiry_days` request value into a lifetime in seconds.
/// Absent, zero or negative means a lifetime key (None).
pub fn expiry_seconds(expiry_days: Option<i64>) -> Option<i64> {
    expiry_days
        .filter(|days| *days > 0)
        .map(|days| days.saturating_mul(SECONDS_PER_DAY))
}

/// Extract client IP address and user-agent from request headers.
///
/// Tries `x-forwarded-for` first (for proxied requests), then `x-real-ip`.
pub fn extract_request_info(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let ip = headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    (ip, user_agent)
}

/// Decode `Authorization: Basic <base64(user:pass)>` into its two parts.
/// Returns None for any other scheme or a malformed value.
pub fn extract_basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}
