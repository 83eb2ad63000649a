use clap::{
    Arg, ColorChoice, Command,
    builder::{
        ValueParser,
        styling::{AnsiColor, Effects, Styles},
    },
};
use std::path::PathBuf;

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("gardi")
        .about("Authentication and session issuance")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("GARDI_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("secret")
                .short('s')
                .long("secret")
                .help("Secret used to sign and verify tokens")
                .env("GARDI_SECRET")
                .required(true),
        )
        .arg(
            Arg::new("admin-password")
                .long("admin-password")
                .help("Password for the seeded admin account")
                .env("GARDI_ADMIN_PASSWORD")
                .required(true),
        )
        .arg(
            Arg::new("events-file")
                .long("events-file")
                .help("Append security events to this file instead of keeping them in memory")
                .env("GARDI_EVENTS_FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("access-token-ttl")
                .long("access-token-ttl")
                .help("Access token lifetime in seconds")
                .default_value("900")
                .env("GARDI_ACCESS_TOKEN_TTL")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("refresh-token-ttl")
                .long("refresh-token-ttl")
                .help("Refresh token lifetime in seconds")
                .default_value("604800")
                .env("GARDI_REFRESH_TOKEN_TTL")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("rate-limit")
                .long("rate-limit")
                .help("Login attempts allowed per client within the rate window")
                .default_value("5")
                .env("GARDI_RATE_LIMIT")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("rate-window")
                .long("rate-window")
                .help("Rate limit window in seconds")
                .default_value("300")
                .env("GARDI_RATE_WINDOW")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("GARDI_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "gardi");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "Authentication and session issuance"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_check_port_and_secret() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "gardi",
            "--port",
            "8080",
            "--secret",
            "sw0rdf1sh",
            "--admin-password",
            "CorrectHorse1!",
        ]);

        assert_eq!(matches.get_one::<u16>("port").map(|s| *s), Some(8080));
        assert_eq!(
            matches.get_one::<String>("secret").map(|s| s.to_string()),
            Some("sw0rdf1sh".to_string())
        );
        assert_eq!(
            matches
                .get_one::<String>("admin-password")
                .map(|s| s.to_string()),
            Some("CorrectHorse1!".to_string())
        );
        assert_eq!(
            matches.get_one::<i64>("access-token-ttl").map(|s| *s),
            Some(900)
        );
        assert_eq!(
            matches.get_one::<i64>("refresh-token-ttl").map(|s| *s),
            Some(604_800)
        );
        assert_eq!(matches.get_one::<usize>("rate-limit").map(|s| *s), Some(5));
        assert_eq!(matches.get_one::<u64>("rate-window").map(|s| *s), Some(300));
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("GARDI_PORT", Some("443")),
                ("GARDI_SECRET", Some("sw0rdf1sh")),
                ("GARDI_ADMIN_PASSWORD", Some("CorrectHorse1!")),
                ("GARDI_EVENTS_FILE", Some("/var/log/gardi/events.jsonl")),
                ("GARDI_RATE_LIMIT", Some("10")),
                ("GARDI_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["gardi"]);
                assert_eq!(matches.get_one::<u16>("port").map(|s| *s), Some(443));
                assert_eq!(
                    matches.get_one::<String>("secret").map(|s| s.to_string()),
                    Some("sw0rdf1sh".to_string())
                );
                assert_eq!(
                    matches.get_one::<PathBuf>("events-file").cloned(),
                    Some(PathBuf::from("/var/log/gardi/events.jsonl"))
                );
                assert_eq!(matches.get_one::<usize>("rate-limit").map(|s| *s), Some(10));
                assert_eq!(matches.get_one::<u8>("verbosity").map(|s| *s), Some(2));
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("GARDI_LOG_LEVEL", Some(level)),
                    ("GARDI_SECRET", Some("sw0rdf1sh")),
                    ("GARDI_ADMIN_PASSWORD", Some("CorrectHorse1!")),
                ],
                || {
                    let command = new();
                    let matches = command.get_matches_from(vec!["gardi"]);
                    assert_eq!(
                        matches.get_one::<u8>("verbosity").map(|s| *s),
                        Some(index as u8)
                    );
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("GARDI_LOG_LEVEL", None::<String>)], || {
                let mut args = vec![
                    "gardi".to_string(),
                    "--secret".to_string(),
                    "sw0rdf1sh".to_string(),
                    "--admin-password".to_string(),
                    "CorrectHorse1!".to_string(),
                ];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    let v = format!("-{}", "v".repeat(index));
                    args.push(v);
                }

                let command = new();

                let matches = command.get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>("verbosity").map(|s| *s),
                    Some(index as u8)
                );
            });
        }
    }
}
