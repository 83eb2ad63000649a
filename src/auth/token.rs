//! Token issuance and validation.
//!
//! Access and refresh tokens share one HS256 secret and are distinguished
//! structurally: refresh tokens carry a `jti` claim, access tokens do not.
//! Refresh validity additionally requires the `jti` to still be registered in
//! the user's refresh set, which is what makes refresh tokens revocable while
//! access tokens are not.

use anyhow::anyhow;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    config::AuthConfig,
    error::AuthError,
    store::{User, UserStore},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Mints access and refresh tokens. Issuing a refresh token registers its
/// identifier with the store before the token is signed, so a signed token
/// never references an unregistered identifier.
pub struct TokenIssuer {
    config: AuthConfig,
    store: Arc<dyn UserStore>,
    encoding_key: EncodingKey,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(config: AuthConfig, store: Arc<dyn UserStore>) -> Self {
        let encoding_key =
            EncodingKey::from_secret(config.signing_secret().expose_secret().as_bytes());
        Self {
            config,
            store,
            encoding_key,
        }
    }

    /// Stateless: nothing is recorded server-side for access tokens.
    ///
    /// # Errors
    ///
    /// `Internal` if signing fails.
    pub fn issue_access_token(&self, username: &str) -> Result<String, AuthError> {
        let exp = Utc::now().timestamp() + self.config.access_token_ttl_seconds();
        let claims = Claims {
            sub: username.to_string(),
            exp,
            jti: None,
        };
        self.sign(&claims)
    }

    /// # Errors
    ///
    /// `Internal` if the registry mutation or signing fails. A registered
    /// identifier is not rolled back when signing fails afterwards; the
    /// orphaned entry expires with its TTL.
    pub async fn issue_refresh_token(&self, user: &User) -> Result<String, AuthError> {
        let jti = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::seconds(self.config.refresh_token_ttl_seconds());
        self.store
            .register_refresh_token(&user.username, jti, expires_at)
            .await?;
        let claims = Claims {
            sub: user.username.clone(),
            exp: expires_at.timestamp(),
            jti: Some(jti.to_string()),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|err| AuthError::Internal(anyhow!("failed to sign token: {err}")))
    }
}

/// Verifies a presented token and resolves it to a live user.
pub struct TokenValidator {
    store: Arc<dyn UserStore>,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    #[must_use]
    pub fn new(config: &AuthConfig, store: Arc<dyn UserStore>) -> Self {
        let decoding_key =
            DecodingKey::from_secret(config.signing_secret().expose_secret().as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; the default 60s leeway would keep expired tokens alive.
        validation.leeway = 0;
        Self {
            store,
            decoding_key,
            validation,
        }
    }

    /// # Errors
    ///
    /// `InvalidToken` for signature/shape failures, `ExpiredToken` for expiry,
    /// `UnknownUser` when the subject is gone or disabled, and `RevokedToken`
    /// when a refresh identifier is no longer registered.
    pub async fn resolve(&self, token: &str, kind: TokenKind) -> Result<User, AuthError> {
        let claims = self.decode_claims(token)?;

        let user = self
            .store
            .fetch(&claims.sub)
            .await?
            .ok_or(AuthError::UnknownUser)?;
        if user.disabled {
            return Err(AuthError::UnknownUser);
        }

        if kind == TokenKind::Refresh {
            let jti = claims
                .jti
                .as_deref()
                .and_then(|jti| Uuid::parse_str(jti).ok())
                .ok_or(AuthError::InvalidToken)?;
            let active = self
                .store
                .refresh_token_is_active(&user.username, jti, Utc::now())
                .await?;
            if !active {
                return Err(AuthError::RevokedToken);
            }
        }

        Ok(user)
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            })
    }
}
