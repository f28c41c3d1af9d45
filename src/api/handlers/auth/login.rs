//! Login endpoint.
//!
//! Flow Overview:
//! 1) Validate the request body.
//! 2) Ask the credential verifier for the subject behind `(enterCd, sabun)`.
//! 3) Sign an access and a refresh token for that subject.
//! 4) Set both cookies in one response and echo back a safe redirect target.

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    error::AuthError,
    state::{AuthState, is_local_path},
    token::TokenClass,
    types::{ErrorBody, LoginRequest, LoginResponse},
};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session cookies issued", body = LoginResponse),
        (status = 400, description = "Malformed login request", body = ErrorBody),
        (status = 401, description = "Credentials rejected", body = ErrorBody)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(request) = payload.map_err(|err| AuthError::BadRequest(err.body_text()))?;

    let enter_cd = request.enter_cd.trim();
    let sabun = request.sabun.trim();
    if enter_cd.is_empty() {
        return Err(AuthError::BadRequest("enterCd is required".to_string()));
    }
    if sabun.is_empty() {
        return Err(AuthError::BadRequest("sabun is required".to_string()));
    }
    if request.password.is_empty() {
        return Err(AuthError::BadRequest("password is required".to_string()));
    }

    let Some(subject) = auth_state
        .credentials()
        .verify(enter_cd, sabun, &request.password)
        .await?
    else {
        info!(enter_cd, "login rejected");
        return Err(AuthError::Unauthorized);
    };

    let access = auth_state.codec().issue(&subject, TokenClass::Access)?;
    let refresh = auth_state.codec().issue(&subject, TokenClass::Refresh)?;

    let mut headers = HeaderMap::new();
    auth_state
        .cookies()
        .apply_auth_cookies(&mut headers, &access, &refresh)?;

    info!(enter_cd = %subject.enter_cd, "session issued");

    let response = LoginResponse {
        status: "ok".to_string(),
        redirect: redirect_target(
            request.redirect.as_deref(),
            auth_state.config().landing_path(),
            auth_state.config().login_path(),
        ),
    };
    Ok((StatusCode::OK, headers, Json(response)))
}

/// Honor the edge gate's `redirect` only when it stays on this origin.
fn redirect_target(requested: Option<&str>, landing_path: &str, login_path: &str) -> String {
    requested
        .map(str::trim)
        .filter(|target| is_local_path(target))
        .filter(|target| {
            let path = target.split(['?', '#']).next().unwrap_or_default();
            path != login_path
        })
        .unwrap_or(landing_path)
        .to_string()
}
