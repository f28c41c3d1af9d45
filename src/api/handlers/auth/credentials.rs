//! Password credential check used by login.
//!
//! The check itself sits behind [`CredentialVerifier`]; the session layer only
//! needs a yes/no answer and the [`Subject`] to sign into the new tokens.
//! [`StaticCredentialVerifier`] reads a JSON directory of Argon2 PHC hashes:
//!
//! ```json
//! { "users": [ { "enterCd": "ACME", "sabun": "1001", "roleCd": "ADMIN",
//!                "passwordHash": "$argon2id$v=19$...", "claims": { "orgNm": "HQ" } } ] }
//! ```

use argon2::{Argon2, PasswordHash, PasswordVerifier, password_hash};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use super::principal::Subject;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("failed to read credential directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid credential directory: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid password hash for {enter_cd}/{sabun}: {reason}")]
    Hash {
        enter_cd: String,
        sabun: String,
        reason: String,
    },
    #[error("credential check task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type VerifyFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<Subject>, CredentialError>> + Send + 'a>>;

pub trait CredentialVerifier: Send + Sync {
    /// Resolve tenant, user and password to the subject to sign, or `None` on mismatch.
    fn verify<'a>(&'a self, enter_cd: &'a str, sabun: &'a str, password: &'a str)
    -> VerifyFuture<'a>;
}

/// Rejects every login.
#[derive(Clone, Debug)]
pub struct DenyAllCredentialVerifier;

impl CredentialVerifier for DenyAllCredentialVerifier {
    fn verify<'a>(
        &'a self,
        _enter_cd: &'a str,
        _sabun: &'a str,
        _password: &'a str,
    ) -> VerifyFuture<'a> {
        Box::pin(async { Ok(None) })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Directory {
    users: Vec<DirectoryEntry>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DirectoryEntry {
    enter_cd: String,
    sabun: String,
    #[serde(default)]
    role_cd: Option<String>,
    password_hash: String,
    #[serde(default)]
    claims: BTreeMap<String, serde_json::Value>,
}

impl DirectoryEntry {
    fn subject(&self) -> Subject {
        Subject {
            enter_cd: self.enter_cd.clone(),
            sabun: self.sabun.clone(),
            role_cd: self.role_cd.clone(),
            claims: self.claims.clone(),
        }
    }
}

/// In-memory credential directory keyed by `(enterCd, sabun)`.
#[derive(Clone, Debug)]
pub struct StaticCredentialVerifier {
    entries: Arc<BTreeMap<(String, String), DirectoryEntry>>,
}

impl StaticCredentialVerifier {
    /// Load a directory file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or holds a malformed hash.
    pub fn from_path(path: &Path) -> Result<Self, CredentialError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse a directory document. Hashes are validated up front.
    ///
    /// # Errors
    /// Returns an error if the JSON is invalid or a hash is not a PHC string.
    pub fn from_json(raw: &str) -> Result<Self, CredentialError> {
        let directory: Directory = serde_json::from_str(raw)?;
        let mut entries = BTreeMap::new();
        for entry in directory.users {
            if let Err(err) = PasswordHash::new(&entry.password_hash) {
                return Err(CredentialError::Hash {
                    enter_cd: entry.enter_cd,
                    sabun: entry.sabun,
                    reason: err.to_string(),
                });
            }
            entries.insert((entry.enter_cd.clone(), entry.sabun.clone()), entry);
        }
        Ok(Self {
            entries: Arc::new(entries),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CredentialVerifier for StaticCredentialVerifier {
    fn verify<'a>(
        &'a self,
        enter_cd: &'a str,
        sabun: &'a str,
        password: &'a str,
    ) -> VerifyFuture<'a> {
        Box::pin(async move {
            let Some(entry) = self
                .entries
                .get(&(enter_cd.to_string(), sabun.to_string()))
                .cloned()
            else {
                return Ok(None);
            };

            // Argon2 is CPU bound; keep it off the async workers.
            let password = password.to_string();
            let hash = entry.password_hash.clone();
            let matches =
                tokio::task::spawn_blocking(move || password_matches(&hash, &password)).await?;

            match matches {
                Ok(true) => Ok(Some(entry.subject())),
                Ok(false) => Ok(None),
                Err(reason) => Err(CredentialError::Hash {
                    enter_cd: entry.enter_cd,
                    sabun: entry.sabun,
                    reason,
                }),
            }
        })
    }
}

fn password_matches(hash: &str, password: &str) -> Result<bool, String> {
    let parsed = PasswordHash::new(hash).map_err(|err| err.to_string())?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(err.to_string()),
    }
}
