//! Credential verification, token issuance/validation, rate limiting, and
//! security event logging.

pub mod config;
pub mod controller;
pub mod credentials;
pub mod error;
pub mod events;
pub mod rate_limit;
pub mod store;
pub mod token;
pub mod utils;

pub use config::AuthConfig;
pub use controller::{AuthSessionController, TokenPair};
pub use error::AuthError;
