//! Access guard for protected operations.
//!
//! Flow Overview: read the access cookie, verify it, and hand back the
//! principal. Any failure becomes a plain 401; the handler never learns
//! whether the cookie was missing, expired or forged.
//!
//! Every query a protected handler runs is scoped by `principal.enter_cd()`.
//! Tenant identifiers in request bodies or query strings are never trusted.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use std::sync::Arc;

use super::{error::AuthError, principal::Principal, state::AuthState};

/// Resolve the access cookie into a principal, or fail with `Unauthorized`.
///
/// # Errors
/// Returns [`AuthError::Unauthorized`] when no valid access token is present.
pub fn require_access_principal(
    headers: &HeaderMap,
    auth: &AuthState,
) -> Result<Principal, AuthError> {
    auth.sessions()
        .resolve_access(headers)
        .ok_or(AuthError::Unauthorized)
}

/// Extractor form of [`require_access_principal`].
#[derive(Clone, Debug)]
pub struct AccessPrincipal(pub Principal);

impl<S> FromRequestParts<S> for AccessPrincipal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = parts
            .extensions
            .get::<Arc<AuthState>>()
            .cloned()
            .ok_or(AuthError::MissingState)?;
        require_access_principal(&parts.headers, &auth).map(Self)
    }
}
