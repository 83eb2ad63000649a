use axum::{
    http::{HeaderMap, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::auth::AuthError;

pub mod health;
pub use self::health::health;

pub mod login;
pub use self::login::token;

pub mod revoke;
pub use self::revoke::revoke_refresh;

pub mod me;
pub use self::me::me;

pub mod logs;
pub use self::logs::logs;

pub mod validate_ip;
pub use self::validate_ip::validate_ip;

/// Pull the bearer token out of the Authorization header, if any.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Render an auth failure for an untrusted caller: generic message outward,
/// specific kind into the logs.
pub(crate) fn auth_error_response(err: &AuthError) -> Response {
    match err {
        AuthError::Internal(inner) => error!("Auth operation failed: {inner:#}"),
        other => debug!("Auth operation refused: {other}"),
    }
    (err.status(), err.public_message().to_string()).into_response()
}
