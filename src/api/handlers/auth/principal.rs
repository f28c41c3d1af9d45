//! Authenticated principal and the claim set embedded in session tokens.
//!
//! A [`Subject`] is what gets signed into a token at login. A [`Principal`] is
//! what comes back out of a token after verification; it has no public
//! constructor, so holding one means a token was checked.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::token::TokenClass;

/// Identity claims carried by a session token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    /// Tenant (enterprise) identifier.
    pub enter_cd: String,
    /// User identifier within the tenant.
    pub sabun: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_cd: Option<String>,
    /// Additional issuer-chosen claims, e.g. organization name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    #[schema(value_type = Object)]
    pub claims: BTreeMap<String, serde_json::Value>,
}

impl Subject {
    #[must_use]
    pub fn new(enter_cd: impl Into<String>, sabun: impl Into<String>) -> Self {
        Self {
            enter_cd: enter_cd.into(),
            sabun: sabun.into(),
            role_cd: None,
            claims: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_role_cd(mut self, role_cd: impl Into<String>) -> Self {
        self.role_cd = Some(role_cd.into());
        self
    }

    #[must_use]
    pub fn with_claim(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.claims.insert(key.into(), value);
        self
    }
}

/// Verified identity for the lifetime of one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    subject: Subject,
    class: TokenClass,
    expires_at_unix: i64,
}

impl Principal {
    pub(super) fn verified(subject: Subject, class: TokenClass, expires_at_unix: i64) -> Self {
        Self {
            subject,
            class,
            expires_at_unix,
        }
    }

    /// Tenant scope for every downstream query.
    #[must_use]
    pub fn enter_cd(&self) -> &str {
        &self.subject.enter_cd
    }

    /// Actor identity for every downstream write.
    #[must_use]
    pub fn sabun(&self) -> &str {
        &self.subject.sabun
    }

    #[must_use]
    pub fn role_cd(&self) -> Option<&str> {
        self.subject.role_cd.as_deref()
    }

    #[must_use]
    pub fn claims(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.subject.claims
    }

    #[must_use]
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    #[must_use]
    pub fn class(&self) -> TokenClass {
        self.class
    }

    #[must_use]
    pub fn expires_at_unix(&self) -> i64 {
        self.expires_at_unix
    }
}
