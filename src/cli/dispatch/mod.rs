//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action the binary runs, currently only
//! starting the HTTP server with its session configuration.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_PORT, ARG_STATIC_DIR, auth};
use anyhow::Result;
use std::path::PathBuf;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let static_dir = matches.get_one::<PathBuf>(ARG_STATIC_DIR).cloned();

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        static_dir,
        token_secret: auth_opts.token_secret,
        public_base_url: auth_opts.public_base_url,
        cookie_secure: auth_opts.cookie_secure,
        access_ttl_seconds: auth_opts.access_ttl_seconds,
        refresh_ttl_seconds: auth_opts.refresh_ttl_seconds,
        refresh_policy: auth_opts.refresh_policy,
        login_path: auth_opts.login_path,
        landing_path: auth_opts.landing_path,
        public_paths: auth_opts.public_paths,
        users_file: auth_opts.users_file,
    }))
}
