use crate::api;
use crate::auth::{
    AuthConfig, AuthSessionController,
    credentials::{Argon2Hasher, PasswordHasher},
    events::{EventSink, FileEventSink, MemoryEventSink},
    rate_limit::SlidingWindowLimiter,
    store::{MemoryUserStore, User, UserStore},
};
use crate::cli::actions::Action;
use anyhow::Result;
use secrecy::ExposeSecret;
use std::{sync::Arc, time::Duration};
use tracing::info;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            secret,
            admin_password,
            events_file,
            access_token_ttl,
            refresh_token_ttl,
            rate_limit,
            rate_window,
        } => {
            let config = AuthConfig::new(secret)
                .with_access_token_ttl_seconds(access_token_ttl)
                .with_refresh_token_ttl_seconds(refresh_token_ttl)
                .with_rate_limit(rate_limit)
                .with_rate_window(Duration::from_secs(rate_window));

            let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher);
            let store: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());

            // Single seeded account until a database store lands.
            store
                .upsert_user(User {
                    username: "admin".to_string(),
                    full_name: "System Administrator".to_string(),
                    password_hash: hasher.hash(admin_password.expose_secret())?,
                    disabled: false,
                })
                .await?;

            let events: Arc<dyn EventSink> = match events_file {
                Some(path) => {
                    info!("Recording security events to {}", path.display());
                    Arc::new(FileEventSink::new(path))
                }
                None => Arc::new(MemoryEventSink::new()),
            };

            let rate_limiter = Arc::new(SlidingWindowLimiter::new(
                config.rate_limit(),
                config.rate_window(),
            ));

            let controller = Arc::new(AuthSessionController::new(
                config,
                store,
                hasher,
                rate_limiter,
                events,
            )?);

            api::new(port, controller).await?;
        }
    }

    Ok(())
}
