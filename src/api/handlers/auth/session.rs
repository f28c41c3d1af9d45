//! Session endpoints: inspect, renew and end a cookie session.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::debug;

use super::{
    error::AuthError,
    guard::AccessPrincipal,
    state::{AuthState, RefreshPolicy},
    token::TokenClass,
    types::{ErrorBody, SessionResponse, StatusResponse},
};

#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 401, description = "Missing, invalid or expired access token", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn session(AccessPrincipal(principal): AccessPrincipal) -> Json<SessionResponse> {
    Json(SessionResponse::from(&principal))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "Access token renewed", body = StatusResponse),
        (status = 401, description = "Missing, invalid or expired refresh token", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn refresh(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, AuthError> {
    let principal = auth_state
        .sessions()
        .resolve_refresh(&headers)
        .ok_or(AuthError::Unauthorized)?;

    let access = auth_state
        .codec()
        .issue(principal.subject(), TokenClass::Access)?;

    let mut response_headers = HeaderMap::new();
    match auth_state.config().refresh_policy() {
        RefreshPolicy::Fixed => auth_state
            .cookies()
            .apply_access_cookie(&mut response_headers, &access)?,
        RefreshPolicy::Sliding => {
            let refresh = auth_state
                .codec()
                .issue(principal.subject(), TokenClass::Refresh)?;
            auth_state
                .cookies()
                .apply_auth_cookies(&mut response_headers, &access, &refresh)?;
        }
    }

    debug!(
        enter_cd = principal.enter_cd(),
        policy = %auth_state.config().refresh_policy(),
        "access token renewed"
    );

    Ok((StatusCode::OK, response_headers, Json(StatusResponse::ok())))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Session cookies cleared"),
        (status = 500, description = "Clearing cookies could not be rendered", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn logout(
    auth_state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, AuthError> {
    // Always clear, whether or not a session existed.
    let mut response_headers = HeaderMap::new();
    auth_state
        .cookies()
        .clear_auth_cookies(&mut response_headers)?;
    Ok((StatusCode::NO_CONTENT, response_headers))
}
