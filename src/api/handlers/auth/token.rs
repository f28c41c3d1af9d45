//! Signed session tokens.
//!
//! Flow Overview:
//! - `issue` signs a [`Subject`] with a class tag and `exp = now + ttl(class)`.
//! - `verify` returns `Some(Principal)` or `None`; callers never see why a
//!   token was refused. The cause is available from `inspect` and is logged at
//!   `debug` for operability.
//!
//! Security boundaries: a token read from the access slot must carry the
//! `access` class and vice versa, so a refresh token can never authorize an
//! API operation.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

use super::principal::{Principal, Subject};

/// TTL class of a session token.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenClass {
    Access,
    Refresh,
}

impl TokenClass {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// Why a token was refused. Never surfaced to clients.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TokenRejection {
    #[error("token absent")]
    Absent,
    #[error("token invalid")]
    Invalid,
    #[error("token expired")]
    Expired,
    #[error("token class does not match its slot")]
    WrongClass,
}

#[derive(Debug, thiserror::Error)]
#[error("failed to sign session token: {0}")]
pub struct SigningFailure(#[from] jsonwebtoken::errors::Error);

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    #[serde(flatten)]
    subject: Subject,
    cls: TokenClass,
    iat: i64,
    exp: i64,
}

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    #[must_use]
    pub fn new(secret: &SecretString, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let secret = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
            refresh_ttl,
        }
    }

    #[must_use]
    pub fn ttl(&self, class: TokenClass) -> Duration {
        match class {
            TokenClass::Access => self.access_ttl,
            TokenClass::Refresh => self.refresh_ttl,
        }
    }

    /// Sign a new token for `subject`.
    ///
    /// # Errors
    /// Returns [`SigningFailure`] if the claims cannot be encoded or signed.
    pub fn issue(&self, subject: &Subject, class: TokenClass) -> Result<String, SigningFailure> {
        self.issue_at(subject, class, now_epoch_seconds())
    }

    fn issue_at(
        &self,
        subject: &Subject,
        class: TokenClass,
        now: i64,
    ) -> Result<String, SigningFailure> {
        let ttl = i64::try_from(self.ttl(class).as_secs()).unwrap_or(i64::MAX);
        let claims = SessionClaims {
            subject: subject.clone(),
            cls: class,
            iat: now,
            exp: now.saturating_add(ttl),
        };
        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Verify a token read from the `class` slot.
    ///
    /// Returns `None` for empty, malformed, tampered, expired or misclassed
    /// tokens without telling them apart.
    #[must_use]
    pub fn verify(&self, token: &str, class: TokenClass) -> Option<Principal> {
        match self.inspect(token, class) {
            Ok(principal) => Some(principal),
            Err(rejection) => {
                debug!(token.class = class.as_str(), %rejection, "session token rejected");
                None
            }
        }
    }

    /// Verify a token and report the rejection cause.
    ///
    /// # Errors
    /// Returns the [`TokenRejection`] describing why the token was refused.
    pub fn inspect(&self, token: &str, class: TokenClass) -> Result<Principal, TokenRejection> {
        self.inspect_at(token, class, now_epoch_seconds())
    }

    fn inspect_at(
        &self,
        token: &str,
        class: TokenClass,
        now: i64,
    ) -> Result<Principal, TokenRejection> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenRejection::Absent);
        }

        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(
            |err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenRejection::Expired,
                _ => TokenRejection::Invalid,
            },
        )?;

        let claims = data.claims;
        // jsonwebtoken only rejects `exp < now`; a token is dead at `exp`.
        if claims.exp <= now {
            return Err(TokenRejection::Expired);
        }
        if claims.cls != class {
            return Err(TokenRejection::WrongClass);
        }

        Ok(Principal::verified(claims.subject, claims.cls, claims.exp))
    }
}

fn now_epoch_seconds() -> i64 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs();
    i64::try_from(secs).unwrap_or(i64::MAX)
}
