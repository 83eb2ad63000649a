use crate::cli::actions::Action;
use anyhow::Result;
use secrecy::SecretString;
use std::path::PathBuf;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        secret: matches
            .get_one("secret")
            .map(|s: &String| SecretString::from(s.to_string()))
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --secret"))?,
        admin_password: matches
            .get_one("admin-password")
            .map(|s: &String| SecretString::from(s.to_string()))
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --admin-password"))?,
        events_file: matches.get_one::<PathBuf>("events-file").cloned(),
        access_token_ttl: matches
            .get_one::<i64>("access-token-ttl")
            .copied()
            .unwrap_or(900),
        refresh_token_ttl: matches
            .get_one::<i64>("refresh-token-ttl")
            .copied()
            .unwrap_or(604_800),
        rate_limit: matches.get_one::<usize>("rate-limit").copied().unwrap_or(5),
        rate_window: matches.get_one::<u64>("rate-window").copied().unwrap_or(300),
    })
}
