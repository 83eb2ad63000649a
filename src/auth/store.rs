//! Credential store abstraction and the in-memory implementation.
//!
//! The store owns user records and each user's refresh-token registry. All
//! mutations are atomic per user: the in-memory backend keeps one lock per
//! user record so concurrent logins for different users never serialize
//! against each other.

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Identity snapshot handed to callers. The refresh registry stays inside the
/// store and is only reachable through the registry operations below.
#[derive(Clone, Debug)]
pub struct User {
    pub username: String,
    pub full_name: String,
    pub password_hash: String,
    pub disabled: bool,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by username.
    async fn fetch(&self, username: &str) -> Result<Option<User>>;

    /// Create or replace a user record. Existing refresh tokens survive an
    /// update so a password change does not log out other sessions.
    async fn upsert_user(&self, user: User) -> Result<()>;

    /// Register a refresh-token identifier with its expiry. Identifiers are
    /// unique within a user's set and never reused; re-registering one is an
    /// error.
    async fn register_refresh_token(
        &self,
        username: &str,
        jti: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Remove a refresh-token identifier. Returns false when it was absent.
    async fn revoke_refresh_token(&self, username: &str, jti: Uuid) -> Result<bool>;

    /// Whether the identifier is still registered and unexpired. Expired
    /// entries are pruned lazily here, on presentation.
    async fn refresh_token_is_active(
        &self,
        username: &str,
        jti: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool>;
}

#[derive(Debug)]
struct UserRecord {
    user: User,
    refresh_tokens: HashMap<Uuid, DateTime<Utc>>,
}

/// In-memory store: a map of independently lockable user records.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, Arc<Mutex<UserRecord>>>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn record(&self, username: &str) -> Option<Arc<Mutex<UserRecord>>> {
        self.users.read().await.get(username).cloned()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn fetch(&self, username: &str) -> Result<Option<User>> {
        let Some(record) = self.record(username).await else {
            return Ok(None);
        };
        let record = record.lock().await;
        Ok(Some(record.user.clone()))
    }

    async fn upsert_user(&self, user: User) -> Result<()> {
        let mut users = self.users.write().await;
        if let Some(record) = users.get(&user.username) {
            record.lock().await.user = user;
        } else {
            users.insert(
                user.username.clone(),
                Arc::new(Mutex::new(UserRecord {
                    user,
                    refresh_tokens: HashMap::new(),
                })),
            );
        }
        Ok(())
    }

    async fn register_refresh_token(
        &self,
        username: &str,
        jti: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let Some(record) = self.record(username).await else {
            bail!("unknown user: {username}");
        };
        let mut record = record.lock().await;
        if record.refresh_tokens.contains_key(&jti) {
            bail!("refresh token identifier already registered: {jti}");
        }
        record.refresh_tokens.insert(jti, expires_at);
        Ok(())
    }

    async fn revoke_refresh_token(&self, username: &str, jti: Uuid) -> Result<bool> {
        let Some(record) = self.record(username).await else {
            return Ok(false);
        };
        let mut record = record.lock().await;
        Ok(record.refresh_tokens.remove(&jti).is_some())
    }

    async fn refresh_token_is_active(
        &self,
        username: &str,
        jti: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let Some(record) = self.record(username).await else {
            return Ok(false);
        };
        let mut record = record.lock().await;
        record.refresh_tokens.retain(|_, expires_at| *expires_at > now);
        Ok(record.refresh_tokens.contains_key(&jti))
    }
}
