use crate::api::handlers::auth::RefreshPolicy;
use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;
use std::path::PathBuf;

pub const ARG_TOKEN_SECRET: &str = "token-secret";
pub const ARG_PUBLIC_BASE_URL: &str = "public-base-url";
pub const ARG_COOKIE_SECURE: &str = "cookie-secure";
pub const ARG_ACCESS_TTL_SECONDS: &str = "access-ttl-seconds";
pub const ARG_REFRESH_TTL_SECONDS: &str = "refresh-ttl-seconds";
pub const ARG_REFRESH_POLICY: &str = "refresh-policy";
pub const ARG_LOGIN_PATH: &str = "login-path";
pub const ARG_LANDING_PATH: &str = "landing-path";
pub const ARG_PUBLIC_PATH: &str = "public-path";
pub const ARG_USERS_FILE: &str = "users-file";

/// Session settings extracted from the command line.
#[derive(Debug)]
pub struct Options {
    pub token_secret: SecretString,
    pub public_base_url: String,
    pub cookie_secure: Option<bool>,
    pub access_ttl_seconds: u64,
    pub refresh_ttl_seconds: u64,
    pub refresh_policy: RefreshPolicy,
    pub login_path: String,
    pub landing_path: String,
    pub public_paths: Vec<String>,
    pub users_file: Option<PathBuf>,
}

impl Options {
    /// # Errors
    /// Returns an error if a required session argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let token_secret = matches
            .get_one::<String>(ARG_TOKEN_SECRET)
            .cloned()
            .map(SecretString::from)
            .context("missing required argument: --token-secret")?;

        Ok(Self {
            token_secret,
            public_base_url: matches
                .get_one::<String>(ARG_PUBLIC_BASE_URL)
                .cloned()
                .context("missing required argument: --public-base-url")?,
            cookie_secure: matches.get_one::<bool>(ARG_COOKIE_SECURE).copied(),
            access_ttl_seconds: matches
                .get_one::<u64>(ARG_ACCESS_TTL_SECONDS)
                .copied()
                .unwrap_or(900),
            refresh_ttl_seconds: matches
                .get_one::<u64>(ARG_REFRESH_TTL_SECONDS)
                .copied()
                .unwrap_or(604_800),
            refresh_policy: matches
                .get_one::<RefreshPolicy>(ARG_REFRESH_POLICY)
                .copied()
                .unwrap_or_default(),
            login_path: matches
                .get_one::<String>(ARG_LOGIN_PATH)
                .cloned()
                .context("missing required argument: --login-path")?,
            landing_path: matches
                .get_one::<String>(ARG_LANDING_PATH)
                .cloned()
                .context("missing required argument: --landing-path")?,
            public_paths: matches
                .get_many::<String>(ARG_PUBLIC_PATH)
                .map(|paths| paths.cloned().collect())
                .unwrap_or_default(),
            users_file: matches.get_one::<PathBuf>(ARG_USERS_FILE).cloned(),
        })
    }
}

pub fn with_args(command: Command) -> Command {
    let command = with_token_args(command);
    let command = with_cookie_args(command);
    with_route_args(command)
}

fn with_token_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long(ARG_TOKEN_SECRET)
                .help("HMAC secret used to sign session tokens (at least 32 bytes)")
                .env("PORTAL_TOKEN_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_ACCESS_TTL_SECONDS)
                .long(ARG_ACCESS_TTL_SECONDS)
                .help("Access token TTL in seconds")
                .env("PORTAL_ACCESS_TTL_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_REFRESH_TTL_SECONDS)
                .long(ARG_REFRESH_TTL_SECONDS)
                .help("Refresh token TTL in seconds")
                .env("PORTAL_REFRESH_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_REFRESH_POLICY)
                .long(ARG_REFRESH_POLICY)
                .help("Refresh token renewal: fixed keeps the original expiry, sliding reissues it")
                .env("PORTAL_REFRESH_POLICY")
                .default_value("fixed")
                .value_parser(clap::value_parser!(RefreshPolicy)),
        )
        .arg(
            Arg::new(ARG_USERS_FILE)
                .long(ARG_USERS_FILE)
                .help("JSON credential directory used to verify logins")
                .env("PORTAL_USERS_FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

fn with_cookie_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PUBLIC_BASE_URL)
                .long(ARG_PUBLIC_BASE_URL)
                .help("Public base URL; an https scheme marks cookies Secure")
                .env("PORTAL_PUBLIC_BASE_URL")
                .default_value("https://localhost"),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long(ARG_COOKIE_SECURE)
                .help("Force the Secure cookie attribute on or off")
                .env("PORTAL_COOKIE_SECURE")
                .value_parser(clap::value_parser!(bool)),
        )
}

fn with_route_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_LOGIN_PATH)
                .long(ARG_LOGIN_PATH)
                .help("Path of the login page")
                .env("PORTAL_LOGIN_PATH")
                .default_value("/login"),
        )
        .arg(
            Arg::new(ARG_LANDING_PATH)
                .long(ARG_LANDING_PATH)
                .help("Where a successful login lands without a redirect")
                .env("PORTAL_LANDING_PATH")
                .default_value("/"),
        )
        .arg(
            Arg::new(ARG_PUBLIC_PATH)
                .long(ARG_PUBLIC_PATH)
                .help("Extra path reachable without a session (repeatable)")
                .env("PORTAL_PUBLIC_PATHS")
                .value_delimiter(',')
                .action(ArgAction::Append),
        )
}
