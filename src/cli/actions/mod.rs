pub mod server;

use secrecy::SecretString;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        secret: SecretString,
        admin_password: SecretString,
        events_file: Option<PathBuf>,
        access_token_ttl: i64,
        refresh_token_ttl: i64,
        rate_limit: usize,
        rate_window: u64,
    },
}
