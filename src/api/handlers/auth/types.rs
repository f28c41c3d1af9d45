//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

use super::principal::Principal;

#[derive(ToSchema, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub enter_cd: String,
    pub sabun: String,
    pub password: String,
    /// Where to send the browser after login, as attached by the edge gate.
    #[serde(default)]
    pub redirect: Option<String>,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("enter_cd", &self.enter_cd)
            .field("sabun", &self.sabun)
            .field("password", &"[REDACTED]")
            .field("redirect", &self.redirect)
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct LoginResponse {
    pub status: String,
    pub redirect: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub enter_cd: String,
    pub sabun: String,
    pub role_cd: Option<String>,
    #[schema(value_type = Object)]
    pub claims: BTreeMap<String, serde_json::Value>,
    pub expires_at: i64,
}

impl From<&Principal> for SessionResponse {
    fn from(principal: &Principal) -> Self {
        Self {
            enter_cd: principal.enter_cd().to_string(),
            sabun: principal.sabun().to_string(),
            role_cd: principal.role_cd().map(str::to_string),
            claims: principal.claims().clone(),
            expires_at: principal.expires_at_unix(),
        }
    }
}

/// Error body; the message never says which check failed.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use serde_json::json;

    #[test]
    fn login_request_reads_camel_case() -> Result<()> {
        let request: LoginRequest = serde_json::from_value(json!({
            "enterCd": "ACME",
            "sabun": "1001",
            "password": "hunter2",
        }))?;
        assert_eq!(request.enter_cd, "ACME");
        assert_eq!(request.sabun, "1001");
        assert!(request.redirect.is_none());
        Ok(())
    }

    #[test]
    fn login_request_debug_redacts_password() -> Result<()> {
        let request: LoginRequest = serde_json::from_value(json!({
            "enterCd": "ACME",
            "sabun": "1001",
            "password": "hunter2",
            "redirect": "/dashboard",
        }))?;
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("/dashboard"));
        Ok(())
    }

    #[test]
    fn error_body_shape_is_stable() -> Result<()> {
        let body = ErrorBody {
            message: "Unauthorized".to_string(),
        };
        let value = serde_json::to_value(&body)?;
        let message = value
            .get("message")
            .and_then(serde_json::Value::as_str)
            .context("missing message")?;
        assert_eq!(message, "Unauthorized");
        assert_eq!(value.as_object().map(serde_json::Map::len), Some(1));
        Ok(())
    }
}
