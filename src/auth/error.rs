//! Auth failure taxonomy and its rendering at the HTTP boundary.
//!
//! Every failure keeps its specific kind for callers and for the event sink,
//! but untrusted clients only ever see a small set of generic messages:
//! credential failures collapse into one message so a caller cannot tell a
//! weak password from a wrong one, and all token failures collapse into a
//! single "Unauthorized".

use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("too many login attempts")]
    RateLimited,
    #[error("password matches the common-password denylist")]
    WeakPassword,
    #[error("unknown username or wrong password")]
    InvalidCredentials,
    #[error("token signature or payload is invalid")]
    InvalidToken,
    #[error("token has expired")]
    ExpiredToken,
    #[error("refresh token identifier is no longer registered")]
    RevokedToken,
    #[error("token subject does not resolve to an active user")]
    UnknownUser,
    #[error("refresh token identifier not found")]
    TokenNotFound,
    #[error("missing or malformed credentials")]
    Unauthenticated,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::WeakPassword | Self::InvalidCredentials => StatusCode::BAD_REQUEST,
            Self::InvalidToken
            | Self::ExpiredToken
            | Self::RevokedToken
            | Self::UnknownUser
            | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::TokenNotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to an untrusted caller.
    #[must_use]
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::RateLimited => "Too many attempts, try again later",
            Self::WeakPassword | Self::InvalidCredentials => "Invalid username or password",
            Self::InvalidToken
            | Self::ExpiredToken
            | Self::RevokedToken
            | Self::UnknownUser
            | Self::Unauthenticated => "Unauthorized",
            Self::TokenNotFound => "Token not found",
            Self::Internal(_) => "Internal server error",
        }
    }
}
