//! Small helpers for input sanitization and client identification.

use axum::http::HeaderMap;
use regex::Regex;

/// Strip characters that could smuggle markup or delimiters into downstream
/// logging and storage. Applied to usernames and passwords before any check.
#[must_use]
pub fn sanitize_input(text: &str) -> String {
    text.chars()
        .filter(|ch| !matches!(ch, '<' | '>' | '\'' | '"' | ';'))
        .collect()
}

/// Username format check on already-sanitized input.
#[must_use]
pub fn valid_username(username: &str) -> bool {
    (3..=50).contains(&username.len())
        && Regex::new(r"^[a-zA-Z0-9_-]+$").is_ok_and(|regex| regex.is_match(username))
}

/// Extract a client IP for rate limiting from common proxy headers.
#[must_use]
pub fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if forwarded.is_some() {
        return forwarded.map(str::to_string);
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
