//! Orchestration for the three boundary operations: login, refresh-token
//! revocation, and identity resolution for protected calls.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    config::AuthConfig,
    credentials::{CredentialVerifier, PasswordHasher},
    error::AuthError,
    events::{EventKind, EventSink, SecurityEvent},
    rate_limit::{RateLimitDecision, RateLimiter},
    store::{User, UserStore},
    token::{TokenIssuer, TokenKind, TokenValidator},
    utils::sanitize_input,
};

/// Successful login result.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

pub struct AuthSessionController {
    verifier: CredentialVerifier,
    issuer: TokenIssuer,
    validator: TokenValidator,
    store: Arc<dyn UserStore>,
    rate_limiter: Arc<dyn RateLimiter>,
    events: Arc<dyn EventSink>,
}

impl AuthSessionController {
    /// # Errors
    /// Returns an error if the credential verifier cannot be constructed.
    pub fn new(
        config: AuthConfig,
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
        rate_limiter: Arc<dyn RateLimiter>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self> {
        let verifier = CredentialVerifier::new(config.clone(), store.clone(), hasher)?;
        let issuer = TokenIssuer::new(config.clone(), store.clone());
        let validator = TokenValidator::new(&config, store.clone());
        Ok(Self {
            verifier,
            issuer,
            validator,
            store,
            rate_limiter,
            events,
        })
    }

    /// Full login flow: sanitize, denylist, rate limit, verify, issue.
    /// An event is recorded at every decision point.
    ///
    /// # Errors
    ///
    /// `WeakPassword` before any store or rate-window access, `RateLimited`
    /// when the client's window is exhausted, `InvalidCredentials` from
    /// verification, `Internal` on collaborator failure.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        client_ip: Option<&str>,
    ) -> Result<TokenPair, AuthError> {
        let username = sanitize_input(username);
        let password = sanitize_input(password);

        // Denylisted passwords are refused before the rate window or the
        // store is touched, for known and unknown usernames alike.
        if self.verifier.password_denied(&password) {
            self.emit(EventKind::LoginFailed, client_ip, Some(&username))?;
            return Err(AuthError::WeakPassword);
        }

        let client_key = client_ip.unwrap_or("unknown");
        if self.rate_limiter.check_and_record(client_key) == RateLimitDecision::Limited {
            self.emit(EventKind::RateLimited, client_ip, Some(&username))?;
            return Err(AuthError::RateLimited);
        }

        let user = match self.verifier.verify(&username, &password).await {
            Ok(user) => user,
            Err(err) => {
                self.emit(EventKind::LoginFailed, client_ip, Some(&username))?;
                return Err(err);
            }
        };

        let access_token = self.issuer.issue_access_token(&user.username)?;
        let refresh_token = self.issuer.issue_refresh_token(&user).await?;
        self.emit(EventKind::LoginSucceeded, client_ip, Some(&user.username))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
        })
    }

    /// Remove one refresh-token identifier from the caller's registry.
    /// The caller must already have been resolved from a valid access token.
    ///
    /// # Errors
    ///
    /// `TokenNotFound` when the identifier is not registered.
    pub async fn revoke_refresh(&self, user: &User, jti: Uuid) -> Result<(), AuthError> {
        let removed = self.store.revoke_refresh_token(&user.username, jti).await?;
        if !removed {
            return Err(AuthError::TokenNotFound);
        }
        self.emit(EventKind::TokenRevoked, None, Some(&user.username))?;
        Ok(())
    }

    /// Resolve an access token to its user. Used by every protected call.
    ///
    /// # Errors
    ///
    /// `InvalidToken`, `ExpiredToken`, or `UnknownUser` from validation.
    pub async fn resolve_identity(&self, access_token: &str) -> Result<User, AuthError> {
        self.validator.resolve(access_token, TokenKind::Access).await
    }

    /// Resolve a refresh token, including the registry membership check.
    ///
    /// # Errors
    ///
    /// As [`Self::resolve_identity`], plus `RevokedToken` when the identifier
    /// is no longer registered.
    pub async fn resolve_refresh(&self, refresh_token: &str) -> Result<User, AuthError> {
        self.validator.resolve(refresh_token, TokenKind::Refresh).await
    }

    /// Record that a request was refused for lacking a User-Agent header.
    /// Sink failures are logged, not surfaced: the request is refused anyway.
    pub fn record_missing_user_agent(&self, client_ip: Option<&str>) {
        let event = SecurityEvent::new(EventKind::MissingUserAgent, client_ip, None);
        if let Err(err) = self.events.record(&event) {
            error!("Failed to record security event: {err:#}");
        }
    }

    /// Everything the sink has recorded, oldest first.
    ///
    /// # Errors
    ///
    /// `Internal` when the sink cannot be read.
    pub fn recorded_events(&self) -> Result<Vec<SecurityEvent>, AuthError> {
        Ok(self.events.events()?)
    }

    fn emit(
        &self,
        kind: EventKind,
        client_ip: Option<&str>,
        username: Option<&str>,
    ) -> Result<(), AuthError> {
        self.events
            .record(&SecurityEvent::new(kind, client_ip, username))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::events::MemoryEventSink;
    use crate::auth::rate_limit::SlidingWindowLimiter;
    use crate::auth::store::MemoryUserStore;
    use crate::auth::token::Claims;
    use anyhow::{Context, anyhow};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
    use secrecy::SecretString;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const SECRET: &str = "test-secret";

    /// Hash is the password itself; keeps tests off the Argon2 cost.
    struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, password: &str) -> Result<String> {
            Ok(password.to_string())
        }

        fn verify(&self, password: &str, hash: &str) -> bool {
            password == hash
        }
    }

    /// Store wrapper counting lookups, to prove pre-lookup rejections.
    struct CountingStore {
        inner: MemoryUserStore,
        fetches: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                inner: MemoryUserStore::new(),
                fetches: AtomicUsize::new(0),
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UserStore for CountingStore {
        async fn fetch(&self, username: &str) -> Result<Option<User>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch(username).await
        }

        async fn upsert_user(&self, user: User) -> Result<()> {
            self.inner.upsert_user(user).await
        }

        async fn register_refresh_token(
            &self,
            username: &str,
            jti: Uuid,
            expires_at: DateTime<Utc>,
        ) -> Result<()> {
            self.inner
                .register_refresh_token(username, jti, expires_at)
                .await
        }

        async fn revoke_refresh_token(&self, username: &str, jti: Uuid) -> Result<bool> {
            self.inner.revoke_refresh_token(username, jti).await
        }

        async fn refresh_token_is_active(
            &self,
            username: &str,
            jti: Uuid,
            now: DateTime<Utc>,
        ) -> Result<bool> {
            self.inner.refresh_token_is_active(username, jti, now).await
        }
    }

    struct Harness {
        controller: AuthSessionController,
        store: Arc<CountingStore>,
        events: Arc<MemoryEventSink>,
    }

    async fn harness() -> Result<Harness> {
        let config = AuthConfig::new(SecretString::from(SECRET.to_string()));
        harness_with(config).await
    }

    async fn harness_with(config: AuthConfig) -> Result<Harness> {
        let store = Arc::new(CountingStore::new());
        store
            .upsert_user(User {
                username: "admin".to_string(),
                full_name: "Administrator".to_string(),
                password_hash: "CorrectHorse1!".to_string(),
                disabled: false,
            })
            .await?;
        let events = Arc::new(MemoryEventSink::new());
        let limiter = Arc::new(SlidingWindowLimiter::new(
            config.rate_limit(),
            config.rate_window(),
        ));
        let controller = AuthSessionController::new(
            config,
            store.clone() as Arc<dyn UserStore>,
            Arc::new(PlainHasher),
            limiter,
            events.clone(),
        )?;
        Ok(Harness {
            controller,
            store,
            events,
        })
    }

    fn refresh_jti(token: &str) -> Result<Uuid> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &validation,
        )?;
        let jti = data.claims.jti.context("refresh token has no jti")?;
        Ok(Uuid::parse_str(&jti)?)
    }

    fn event_kinds(events: &MemoryEventSink) -> Vec<EventKind> {
        events
            .events()
            .unwrap_or_default()
            .iter()
            .map(|event| event.event)
            .collect()
    }

    #[tokio::test]
    async fn login_happy_path_returns_both_tokens() -> Result<()> {
        let harness = harness().await?;
        let pair = harness
            .controller
            .login("admin", "CorrectHorse1!", Some("1.2.3.4"))
            .await
            .map_err(|err| anyhow!("login failed: {err}"))?;
        assert_eq!(pair.token_type, "bearer");
        assert!(!pair.access_token.is_empty());
        assert_ne!(pair.access_token, pair.refresh_token);

        let user = harness
            .controller
            .resolve_identity(&pair.access_token)
            .await
            .map_err(|err| anyhow!("resolve failed: {err}"))?;
        assert_eq!(user.username, "admin");

        assert_eq!(
            event_kinds(&harness.events),
            vec![EventKind::LoginSucceeded]
        );
        Ok(())
    }

    #[tokio::test]
    async fn sixth_attempt_in_window_is_rate_limited() -> Result<()> {
        let harness = harness().await?;
        for _ in 0..5 {
            let result = harness
                .controller
                .login("admin", "wrong", Some("1.2.3.4"))
                .await;
            assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        }
        // Even the correct password is refused now.
        let result = harness
            .controller
            .login("admin", "CorrectHorse1!", Some("1.2.3.4"))
            .await;
        assert!(matches!(result, Err(AuthError::RateLimited)));

        let kinds = event_kinds(&harness.events);
        assert_eq!(kinds.len(), 6);
        assert_eq!(kinds[5], EventKind::RateLimited);

        // A different client is unaffected.
        let result = harness
            .controller
            .login("admin", "CorrectHorse1!", Some("9.9.9.9"))
            .await;
        assert!(result.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn weak_password_skips_store_and_rate_window() -> Result<()> {
        let config = AuthConfig::new(SecretString::from(SECRET.to_string()))
            .with_rate_limit(1)
            .with_rate_window(Duration::from_secs(60));
        let harness = harness_with(config).await?;

        let result = harness
            .controller
            .login("admin", "123456", Some("9.9.9.9"))
            .await;
        assert!(matches!(result, Err(AuthError::WeakPassword)));
        assert_eq!(harness.store.fetch_count(), 0);

        // The weak attempt did not consume the single rate slot.
        let result = harness
            .controller
            .login("admin", "CorrectHorse1!", Some("9.9.9.9"))
            .await;
        assert!(result.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_logins_yield_independently_revocable_tokens() -> Result<()> {
        let harness = harness().await?;
        let first = harness
            .controller
            .login("admin", "CorrectHorse1!", Some("1.2.3.4"))
            .await
            .map_err(|err| anyhow!("{err}"))?;
        let second = harness
            .controller
            .login("admin", "CorrectHorse1!", Some("5.6.7.8"))
            .await
            .map_err(|err| anyhow!("{err}"))?;

        let first_jti = refresh_jti(&first.refresh_token)?;
        let second_jti = refresh_jti(&second.refresh_token)?;
        assert_ne!(first_jti, second_jti);

        let user = harness.store.fetch("admin").await?.context("seeded user")?;
        harness
            .controller
            .revoke_refresh(&user, first_jti)
            .await
            .map_err(|err| anyhow!("revoke failed: {err}"))?;

        assert!(matches!(
            harness.controller.resolve_refresh(&first.refresh_token).await,
            Err(AuthError::RevokedToken)
        ));
        assert!(harness
            .controller
            .resolve_refresh(&second.refresh_token)
            .await
            .is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn revoking_an_unknown_jti_reports_not_found() -> Result<()> {
        let harness = harness().await?;
        let user = harness.store.fetch("admin").await?.context("seeded user")?;
        let result = harness.controller.revoke_refresh(&user, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AuthError::TokenNotFound)));
        // No event for a failed revocation.
        assert!(event_kinds(&harness.events).is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn failed_login_records_an_event_with_client_and_user() -> Result<()> {
        let harness = harness().await?;
        let result = harness
            .controller
            .login("admin", "wrong", Some("1.2.3.4"))
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));

        let events = harness.events.events()?;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, EventKind::LoginFailed);
        assert_eq!(events[0].ip.as_deref(), Some("1.2.3.4"));
        assert_eq!(events[0].user.as_deref(), Some("admin"));
        Ok(())
    }

    #[tokio::test]
    async fn sanitized_credentials_still_log_in() -> Result<()> {
        let harness = harness().await?;
        // The stripped characters leave the stored credentials intact.
        let result = harness
            .controller
            .login("ad<min>", "CorrectHorse1!;", Some("1.2.3.4"))
            .await;
        assert!(result.is_ok());
        Ok(())
    }

    struct FailingSink;

    impl EventSink for FailingSink {
        fn record(&self, _event: &SecurityEvent) -> Result<()> {
            Err(anyhow!("sink unavailable"))
        }

        fn events(&self) -> Result<Vec<SecurityEvent>> {
            Err(anyhow!("sink unavailable"))
        }
    }

    #[tokio::test]
    async fn sink_failure_fails_the_operation() -> Result<()> {
        let config = AuthConfig::new(SecretString::from(SECRET.to_string()));
        let store = Arc::new(MemoryUserStore::new());
        store
            .upsert_user(User {
                username: "admin".to_string(),
                full_name: "Administrator".to_string(),
                password_hash: "CorrectHorse1!".to_string(),
                disabled: false,
            })
            .await?;
        let controller = AuthSessionController::new(
            config.clone(),
            store,
            Arc::new(PlainHasher),
            Arc::new(SlidingWindowLimiter::new(
                config.rate_limit(),
                config.rate_window(),
            )),
            Arc::new(FailingSink),
        )?;

        let result = controller
            .login("admin", "CorrectHorse1!", Some("1.2.3.4"))
            .await;
        assert!(matches!(result, Err(AuthError::Internal(_))));
        Ok(())
    }
}
