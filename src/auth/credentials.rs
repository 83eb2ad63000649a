//! Password hashing primitive and credential verification.

use anyhow::{Result, anyhow};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
        rand_core::OsRng},
};
use std::sync::Arc;

use super::{config::AuthConfig, error::AuthError, store::{User, UserStore}, utils::sanitize_input};

/// Memory-hard hash/verify primitive. The verifier only ever needs
/// `verify(plain, hash) -> bool`; `hash` exists for seeding and registration.
pub trait PasswordHasher: Send + Sync {
    /// Hash a password for storage.
    /// # Errors
    /// Returns an error if salting or hashing fails.
    fn hash(&self, password: &str) -> Result<String>;

    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id with the crate's default parameters.
#[derive(Clone, Debug, Default)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| anyhow!("failed to hash password: {err}"))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        PasswordHash::new(hash)
            .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
            .is_ok()
    }
}

/// Validates a username/password pair against the credential store.
pub struct CredentialVerifier {
    config: AuthConfig,
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    // Verified against when the username does not exist, so unknown-username
    // and wrong-password failures share a latency class.
    dummy_hash: String,
}

impl CredentialVerifier {
    /// # Errors
    /// Returns an error if the hashing primitive cannot produce the dummy hash.
    pub fn new(
        config: AuthConfig,
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Result<Self> {
        let dummy_hash = hasher.hash("gardi-credential-pad")?;
        Ok(Self {
            config,
            store,
            hasher,
            dummy_hash,
        })
    }

    /// Whether the password sits on the common-password denylist.
    /// Checked before any lookup so weak submissions reject identically for
    /// existent and nonexistent usernames.
    #[must_use]
    pub fn password_denied(&self, password: &str) -> bool {
        self.config.password_denied(password)
    }

    /// Verify a credential pair. Inputs are sanitized here, before the
    /// denylist and store checks.
    ///
    /// # Errors
    ///
    /// `WeakPassword` for denylisted passwords; `InvalidCredentials` for an
    /// unknown username, a wrong password, or a disabled account — the three
    /// are indistinguishable to the caller.
    pub async fn verify(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = sanitize_input(username);
        let password = sanitize_input(password);

        if self.password_denied(&password) {
            return Err(AuthError::WeakPassword);
        }

        match self.store.fetch(&username).await? {
            Some(user) => {
                let verified = self.hasher.verify(&password, &user.password_hash);
                if verified && !user.disabled {
                    Ok(user)
                } else {
                    Err(AuthError::InvalidCredentials)
                }
            }
            None => {
                let _ = self.hasher.verify(&password, &self.dummy_hash);
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}
