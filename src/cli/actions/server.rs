use crate::api::{
    self,
    handlers::auth::{
        AuthConfig, AuthState, CredentialVerifier, DenyAllCredentialVerifier, RefreshPolicy,
        StaticCredentialVerifier,
    },
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{path::PathBuf, sync::Arc};
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub static_dir: Option<PathBuf>,
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

impl Args {
    fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(self.token_secret.clone())
            .with_public_base_url(self.public_base_url.clone())
            .with_cookie_secure(self.cookie_secure)
            .with_access_ttl_seconds(self.access_ttl_seconds)
            .with_refresh_ttl_seconds(self.refresh_ttl_seconds)
            .with_refresh_policy(self.refresh_policy)
            .with_login_path(self.login_path.clone())
            .with_landing_path(self.landing_path.clone())
            .with_public_paths(self.public_paths.iter().cloned())
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the session settings are invalid, the credential
/// directory cannot be loaded, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = args.auth_config();
    auth_config
        .validate()
        .context("Invalid session configuration")?;

    let credentials: Arc<dyn CredentialVerifier> = match &args.users_file {
        Some(path) => {
            let verifier = StaticCredentialVerifier::from_path(path).with_context(|| {
                format!("Failed to load credential directory: {}", path.display())
            })?;
            info!(users = verifier.len(), "Loaded credential directory");
            Arc::new(verifier)
        }
        None => {
            warn!("No credential directory configured; every login will be rejected");
            Arc::new(DenyAllCredentialVerifier)
        }
    };

    info!(
        refresh_policy = %auth_config.refresh_policy(),
        secure_cookies = auth_config.cookie_secure(),
        "Session configuration loaded"
    );

    let auth_state = Arc::new(AuthState::new(auth_config, credentials));

    api::new(args.port, auth_state, args.static_dir.as_deref()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(secret: &str) -> Args {
        Args {
            port: 0,
            static_dir: None,
            token_secret: SecretString::from(secret.to_string()),
            public_base_url: "http://localhost:8080".to_string(),
            cookie_secure: None,
            access_ttl_seconds: 60,
            refresh_ttl_seconds: 3600,
            refresh_policy: RefreshPolicy::Sliding,
            login_path: "/signin".to_string(),
            landing_path: "/home".to_string(),
            public_paths: vec!["/status".to_string()],
            users_file: None,
        }
    }

    #[test]
    fn auth_config_carries_every_flag() {
        let config = args("0123456789abcdef0123456789abcdef").auth_config();
        assert!(config.validate().is_ok());
        assert!(!config.cookie_secure());
        assert_eq!(config.access_ttl().as_secs(), 60);
        assert_eq!(config.refresh_ttl().as_secs(), 3600);
        assert_eq!(config.refresh_policy(), RefreshPolicy::Sliding);
        assert_eq!(config.login_path(), "/signin");
        assert_eq!(config.landing_path(), "/home");
        assert!(config.public_paths().contains(&"/status".to_string()));
    }

    #[tokio::test]
    async fn short_secret_fails_before_binding() {
        let result = execute(args("short")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn login_path_owned_by_health_fails_before_binding() {
        let mut args = args("0123456789abcdef0123456789abcdef");
        args.login_path = "/health".to_string();
        let result = execute(args).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn missing_users_file_fails_before_binding() {
        let mut args = args("0123456789abcdef0123456789abcdef");
        args.users_file = Some(PathBuf::from("/nonexistent/portal-users.json"));
        let result = execute(args).await;
        assert!(result.is_err());
    }
}
