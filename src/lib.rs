//! # Gardi
//!
//! `gardi` is a small HTTP authentication service: it verifies credentials,
//! issues short-lived access tokens and revocable refresh tokens, throttles
//! login attempts per client, and records security events for every decision.
//!
//! ## Token model
//!
//! - **Access tokens** are stateless HS256 JWTs `{sub, exp}`. Once issued they
//!   stay valid until expiry; the short TTL is the only bound.
//! - **Refresh tokens** carry an extra `jti` claim whose identifier must still
//!   be present in the user's server-side refresh registry. Removing the
//!   identifier revokes that token without touching the user's other sessions.
//!
//! The credential store, password hasher, rate limiter, and event sink are all
//! trait seams, so production backends and in-memory test fakes plug into the
//! same controller.

pub mod api;
pub mod auth;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
