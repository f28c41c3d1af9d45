pub mod auth;
pub mod logging;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

pub const ARG_PORT: &str = "port";
pub const ARG_STATIC_DIR: &str = "static-dir";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("portal")
        .about("Session and access control for the administration portal")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("PORTAL_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_STATIC_DIR)
                .long(ARG_STATIC_DIR)
                .help("Directory with front-end assets; unmatched paths fall back to the app shell")
                .env("PORTAL_STATIC_DIR")
                .value_parser(clap::value_parser!(PathBuf)),
        );

    let command = auth::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::RefreshPolicy;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    // Keep ambient PORTAL_* variables from leaking into argument tests.
    fn with_cleared_env<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        temp_env::with_vars(
            [
                ("PORTAL_TOKEN_SECRET", None::<&str>),
                ("PORTAL_PORT", None::<&str>),
                ("PORTAL_LOG_LEVEL", None::<&str>),
                ("PORTAL_REFRESH_POLICY", None::<&str>),
                ("PORTAL_COOKIE_SECURE", None::<&str>),
                ("PORTAL_PUBLIC_PATHS", None::<&str>),
                ("PORTAL_USERS_FILE", None::<&str>),
                ("PORTAL_STATIC_DIR", None::<&str>),
            ],
            f,
        )
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "portal");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Session and access control for the administration portal".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        with_cleared_env(|| {
            let matches = new().get_matches_from(vec!["portal", "--token-secret", SECRET]);

            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8080));
            assert_eq!(
                matches.get_one::<u64>(auth::ARG_ACCESS_TTL_SECONDS).copied(),
                Some(900)
            );
            assert_eq!(
                matches.get_one::<u64>(auth::ARG_REFRESH_TTL_SECONDS).copied(),
                Some(604_800)
            );
            assert_eq!(
                matches.get_one::<RefreshPolicy>(auth::ARG_REFRESH_POLICY).copied(),
                Some(RefreshPolicy::Fixed)
            );
            assert_eq!(
                matches.get_one::<String>(auth::ARG_LOGIN_PATH).cloned(),
                Some("/login".to_string())
            );
            assert_eq!(matches.get_one::<bool>(auth::ARG_COOKIE_SECURE), None);
            assert_eq!(matches.get_one::<PathBuf>(ARG_STATIC_DIR), None);
        });
    }

    #[test]
    fn test_token_secret_required() {
        with_cleared_env(|| {
            let result = new().try_get_matches_from(vec!["portal"]);
            assert_eq!(
                result.map_err(|e| e.kind()).err(),
                Some(clap::error::ErrorKind::MissingRequiredArgument)
            );
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("PORTAL_TOKEN_SECRET", Some(SECRET)),
                ("PORTAL_PORT", Some("443")),
                ("PORTAL_REFRESH_POLICY", Some("sliding")),
                ("PORTAL_COOKIE_SECURE", Some("false")),
                ("PORTAL_PUBLIC_PATHS", Some("/status,/docs")),
                ("PORTAL_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["portal"]);
                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(443));
                assert_eq!(
                    matches.get_one::<RefreshPolicy>(auth::ARG_REFRESH_POLICY).copied(),
                    Some(RefreshPolicy::Sliding)
                );
                assert_eq!(
                    matches.get_one::<bool>(auth::ARG_COOKIE_SECURE).copied(),
                    Some(false)
                );
                let public: Vec<&String> = matches
                    .get_many::<String>(auth::ARG_PUBLIC_PATH)
                    .map(Iterator::collect)
                    .unwrap_or_default();
                assert_eq!(public, ["/status", "/docs"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_invalid_refresh_policy() {
        with_cleared_env(|| {
            let result = new().try_get_matches_from(vec![
                "portal",
                "--token-secret",
                SECRET,
                "--refresh-policy",
                "forever",
            ]);
            assert_eq!(
                result.map_err(|e| e.kind()).err(),
                Some(clap::error::ErrorKind::ValueValidation)
            );
        });
    }

    #[test]
    fn test_check_log_level_verbosity() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            with_cleared_env(|| {
                let mut args = vec![
                    "portal".to_string(),
                    "--token-secret".to_string(),
                    SECRET.to_string(),
                ];

                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }
}
