//! Auth state and configuration.

use anyhow::{Result, bail};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::{
    cookies::{CookieManager, CookieProfile},
    credentials::CredentialVerifier,
    resolver::SessionResolver,
    token::TokenCodec,
};

const DEFAULT_ACCESS_TTL_SECONDS: u64 = 15 * 60;
const DEFAULT_REFRESH_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;
const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_LANDING_PATH: &str = "/";
const DEFAULT_PUBLIC_BASE_URL: &str = "https://localhost";
const MIN_TOKEN_SECRET_BYTES: usize = 32;

/// Routes registered ahead of the login shell; a login path may not reuse them.
const RESERVED_PATHS: [&str; 1] = ["/health"];

/// What `/api/auth/refresh` does with the refresh token.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RefreshPolicy {
    /// Only the access token is reissued; the session ends when the refresh token expires.
    #[default]
    Fixed,
    /// The refresh token is reissued too, so an active session keeps sliding forward.
    Sliding,
}

impl RefreshPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Sliding => "sliding",
        }
    }
}

impl fmt::Display for RefreshPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefreshPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "sliding" => Ok(Self::Sliding),
            other => Err(format!("invalid refresh policy: {other}")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    token_secret: SecretString,
    public_base_url: String,
    cookie_secure: Option<bool>,
    access_ttl_seconds: u64,
    refresh_ttl_seconds: u64,
    refresh_policy: RefreshPolicy,
    login_path: String,
    landing_path: String,
    public_paths: Vec<String>,
}

impl AuthConfig {
    #[must_use]
    pub fn new(token_secret: SecretString) -> Self {
        Self {
            token_secret,
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            cookie_secure: None,
            access_ttl_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            refresh_ttl_seconds: DEFAULT_REFRESH_TTL_SECONDS,
            refresh_policy: RefreshPolicy::default(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            landing_path: DEFAULT_LANDING_PATH.to_string(),
            public_paths: vec!["/health".to_string()],
        }
    }

    #[must_use]
    pub fn with_public_base_url(mut self, url: String) -> Self {
        self.public_base_url = url;
        self
    }

    /// Force the `Secure` attribute on or off instead of deriving it from the base URL.
    #[must_use]
    pub fn with_cookie_secure(mut self, secure: Option<bool>) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_access_ttl_seconds(mut self, seconds: u64) -> Self {
        self.access_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl_seconds(mut self, seconds: u64) -> Self {
        self.refresh_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = policy;
        self
    }

    #[must_use]
    pub fn with_login_path(mut self, path: String) -> Self {
        self.login_path = path;
        self
    }

    #[must_use]
    pub fn with_landing_path(mut self, path: String) -> Self {
        self.landing_path = path;
        self
    }

    /// Add paths reachable without a session cookie. The login path is always public.
    #[must_use]
    pub fn with_public_paths(mut self, paths: impl IntoIterator<Item = String>) -> Self {
        for path in paths {
            if !self.public_paths.contains(&path) {
                self.public_paths.push(path);
            }
        }
        self
    }

    /// Reject settings that would make sessions unusable or unsafe.
    ///
    /// # Errors
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.token_secret.expose_secret().len() < MIN_TOKEN_SECRET_BYTES {
            bail!("token secret must be at least {MIN_TOKEN_SECRET_BYTES} bytes");
        }
        if self.access_ttl_seconds == 0 || self.refresh_ttl_seconds == 0 {
            bail!("token TTLs must be greater than zero");
        }
        if self.access_ttl_seconds >= self.refresh_ttl_seconds {
            bail!("access token TTL must be shorter than refresh token TTL");
        }
        for path in [&self.login_path, &self.landing_path] {
            if !is_local_path(path) {
                bail!("{path} must be a local absolute path");
            }
        }
        validate_login_path(&self.login_path)
    }

    #[must_use]
    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    #[must_use]
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_seconds)
    }

    #[must_use]
    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_ttl_seconds)
    }

    #[must_use]
    pub fn refresh_policy(&self) -> RefreshPolicy {
        self.refresh_policy
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn landing_path(&self) -> &str {
        &self.landing_path
    }

    #[must_use]
    pub fn public_paths(&self) -> &[String] {
        &self.public_paths
    }

    /// `Secure` is on when the portal is served over HTTPS unless overridden.
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
            .unwrap_or_else(|| self.public_base_url.starts_with("https://"))
    }
}

/// The login path becomes a route and the base of every gate redirect, so it
/// must be a bare path that no other route owns.
fn validate_login_path(path: &str) -> Result<()> {
    if path.contains(['?', '#', '{', '}', '*']) {
        bail!("login path {path} must not carry a query, fragment or route pattern");
    }
    if path == "/" || path.ends_with('/') {
        bail!("login path {path} must not end with a slash");
    }
    if path == "/api" || path.starts_with("/api/") {
        bail!("login path {path} must not be under /api");
    }
    if RESERVED_PATHS.contains(&path) {
        bail!("login path {path} is already served by another route");
    }
    Ok(())
}

/// A path we are willing to redirect a browser to: `/x`, never `//host` or `/\host`.
pub(crate) fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(char::is_control)
}

/// Immutable, shared by every request.
pub struct AuthState {
    config: AuthConfig,
    codec: TokenCodec,
    cookies: CookieManager,
    credentials: Arc<dyn CredentialVerifier>,
}

impl fmt::Debug for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthState")
            .field("config", &self.config)
            .field("codec", &self.codec)
            .field("cookies", &self.cookies)
            .finish_non_exhaustive()
    }
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, credentials: Arc<dyn CredentialVerifier>) -> Self {
        let codec = TokenCodec::new(
            &config.token_secret,
            config.access_ttl(),
            config.refresh_ttl(),
        );
        let cookies = CookieManager::new(
            CookieProfile::new(config.cookie_secure()),
            config.access_ttl(),
            config.refresh_ttl(),
        );
        Self {
            config,
            codec,
            cookies,
            credentials,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    #[must_use]
    pub fn cookies(&self) -> &CookieManager {
        &self.cookies
    }

    #[must_use]
    pub fn sessions(&self) -> SessionResolver<'_> {
        SessionResolver::new(&self.codec)
    }

    pub(super) fn credentials(&self) -> &dyn CredentialVerifier {
        self.credentials.as_ref()
    }
}
