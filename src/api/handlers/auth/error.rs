//! Client-visible failures for auth and protected operations.
//!
//! Token problems never reach this type with detail: by the time a request
//! fails here, absent, invalid and expired tokens have all collapsed into
//! [`AuthError::Unauthorized`].

use axum::{
    Json,
    http::{StatusCode, header::InvalidHeaderValue},
    response::{IntoResponse, Response},
};
use tracing::error;

use super::{credentials::CredentialError, token::SigningFailure, types::ErrorBody};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    SigningFailure(#[from] SigningFailure),
    #[error("failed to render session cookie: {0}")]
    Cookie(#[from] InvalidHeaderValue),
    #[error("credential check failed: {0}")]
    Credentials(#[from] CredentialError),
    #[error("auth state is not installed on the router")]
    MissingState,
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::SigningFailure(_) | Self::Cookie(_) | Self::Credentials(_) | Self::MissingState => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Unauthorized => "Unauthorized".to_string(),
            Self::BadRequest(detail) => detail.clone(),
            _ => {
                error!("{self}");
                "Internal Server Error".to_string()
            }
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}
