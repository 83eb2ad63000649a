//! Auth configuration: token lifetimes, rate limits, and the signing secret.

use secrecy::SecretString;
use std::collections::BTreeSet;
use std::time::Duration;

const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_RATE_LIMIT: usize = 5;
const DEFAULT_RATE_WINDOW_SECONDS: u64 = 5 * 60;

/// Passwords rejected before any credential lookup, exact case-insensitive match.
const COMMON_PASSWORDS: [&str; 4] = ["123456", "senha", "qwerty", "password"];

#[derive(Clone, Debug)]
pub struct AuthConfig {
    signing_secret: SecretString,
    access_token_ttl_seconds: i64,
    refresh_token_ttl_seconds: i64,
    rate_limit: usize,
    rate_window: Duration,
    denied_passwords: BTreeSet<String>,
}

impl AuthConfig {
    #[must_use]
    pub fn new(signing_secret: SecretString) -> Self {
        Self {
            signing_secret,
            access_token_ttl_seconds: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            refresh_token_ttl_seconds: DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
            rate_limit: DEFAULT_RATE_LIMIT,
            rate_window: Duration::from_secs(DEFAULT_RATE_WINDOW_SECONDS),
            denied_passwords: COMMON_PASSWORDS
                .iter()
                .map(|password| (*password).to_string())
                .collect(),
        }
    }

    #[must_use]
    pub fn with_access_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_rate_limit(mut self, limit: usize) -> Self {
        self.rate_limit = limit;
        self
    }

    #[must_use]
    pub fn with_rate_window(mut self, window: Duration) -> Self {
        self.rate_window = window;
        self
    }

    /// Extend the denylist beyond the built-in set.
    #[must_use]
    pub fn with_denied_password(mut self, password: &str) -> Self {
        self.denied_passwords.insert(password.to_lowercase());
        self
    }

    #[must_use]
    pub fn signing_secret(&self) -> &SecretString {
        &self.signing_secret
    }

    #[must_use]
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.access_token_ttl_seconds
    }

    #[must_use]
    pub fn refresh_token_ttl_seconds(&self) -> i64 {
        self.refresh_token_ttl_seconds
    }

    #[must_use]
    pub fn rate_limit(&self) -> usize {
        self.rate_limit
    }

    #[must_use]
    pub fn rate_window(&self) -> Duration {
        self.rate_window
    }

    #[must_use]
    pub fn password_denied(&self, password: &str) -> bool {
        self.denied_passwords.contains(&password.to_lowercase())
    }
}
