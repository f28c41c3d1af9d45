//! Edge route gate.
//!
//! Runs in front of every route and decides, from the path and the presence
//! of a session cookie alone, whether a request may reach a page.
//!
//! - `api` paths always pass; API operations verify tokens themselves.
//! - Static assets always pass.
//! - Navigable pages pass when a session cookie is present or the path is
//!   public; otherwise the browser is sent to the login page with the
//!   original path and query in `redirect`.
//!
//! No token is verified here. A forged cookie gets a page shell and nothing
//! else: the data behind it still goes through the access guard.

use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::debug;
use url::form_urlencoded;

use super::handlers::auth::{AuthConfig, has_session_cookie};

const API_PREFIX: &str = "/api";
const STATIC_PREFIXES: [&str; 4] = ["/static/", "/assets/", "/images/", "/_next/"];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PathClass {
    Api,
    StaticAsset,
    Navigable,
}

#[derive(Clone, Debug)]
pub struct GateConfig {
    login_path: String,
    public_paths: Vec<String>,
}

impl GateConfig {
    #[must_use]
    pub fn new(login_path: impl Into<String>, public_paths: Vec<String>) -> Self {
        Self {
            login_path: login_path.into(),
            public_paths,
        }
    }

    #[must_use]
    pub fn from_auth_config(config: &AuthConfig) -> Self {
        Self::new(config.login_path(), config.public_paths().to_vec())
    }

    #[must_use]
    pub fn classify(&self, path: &str) -> PathClass {
        classify(path)
    }

    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        let path = normalize(path);
        path == normalize(&self.login_path)
            || self.public_paths.iter().any(|public| normalize(public) == path)
    }

    /// `<login>?redirect=<original path and query>`, URL-encoded.
    #[must_use]
    pub fn login_redirect(&self, uri: &Uri) -> String {
        let original = uri
            .path_and_query()
            .map_or_else(|| uri.path(), |path_and_query| path_and_query.as_str());
        let encoded: String = form_urlencoded::byte_serialize(original.as_bytes()).collect();
        format!("{}?redirect={encoded}", self.login_path)
    }
}

#[must_use]
pub fn classify(path: &str) -> PathClass {
    if path == API_PREFIX || path.starts_with("/api/") {
        PathClass::Api
    } else if is_asset_path(path) {
        PathClass::StaticAsset
    } else {
        PathClass::Navigable
    }
}

/// Known asset prefix, or a last segment with a file extension.
#[must_use]
pub fn is_asset_path(path: &str) -> bool {
    if STATIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return true;
    }
    let last = path.rsplit('/').next().unwrap_or_default();
    matches!(last.rsplit_once('.'), Some((stem, ext)) if !stem.is_empty() && !ext.is_empty())
}

fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

pub async fn route_gate(
    State(gate): State<Arc<GateConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    match gate.classify(path) {
        PathClass::Api | PathClass::StaticAsset => next.run(request).await,
        PathClass::Navigable => {
            if has_session_cookie(request.headers()) || gate.is_public(path) {
                next.run(request).await
            } else {
                let location = gate.login_redirect(request.uri());
                debug!(path, "no session cookie, redirecting to login");
                Redirect::to(&location).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::{
        Router,
        body::Body,
        http::{Request as HttpRequest, StatusCode, header::COOKIE, header::LOCATION},
        middleware,
        routing::get,
    };
    use tower::ServiceExt;

    fn gate() -> GateConfig {
        GateConfig::new("/login", vec!["/health".to_string()])
    }

    fn app() -> Router {
        Router::new()
            .route("/api/user/list", get(|| async { "api" }))
            .route("/dashboard", get(|| async { "dashboard" }))
            .route("/login", get(|| async { "login" }))
            .route("/images/logo.png", get(|| async { "png" }))
            .layer(middleware::from_fn_with_state(Arc::new(gate()), route_gate))
    }

    async fn send(uri: &str, cookie: Option<&str>) -> Result<Response> {
        let mut builder = HttpRequest::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        Ok(app().oneshot(builder.body(Body::empty())?).await?)
    }

    fn location(response: &Response) -> Option<&str> {
        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    #[test]
    fn classify_paths() {
        assert_eq!(classify("/api/user/list"), PathClass::Api);
        assert_eq!(classify("/api"), PathClass::Api);
        assert_eq!(classify("/apiary"), PathClass::Navigable);
        assert_eq!(classify("/images/logo.png"), PathClass::StaticAsset);
        assert_eq!(classify("/favicon.ico"), PathClass::StaticAsset);
        assert_eq!(classify("/_next/chunk"), PathClass::StaticAsset);
        assert_eq!(classify("/dashboard"), PathClass::Navigable);
        assert_eq!(classify("/"), PathClass::Navigable);
        assert_eq!(classify("/.hidden"), PathClass::Navigable);
    }

    #[test]
    fn public_paths_ignore_trailing_slash() {
        let gate = gate();
        assert!(gate.is_public("/login"));
        assert!(gate.is_public("/login/"));
        assert!(gate.is_public("/health"));
        assert!(!gate.is_public("/dashboard"));
        assert!(!gate.is_public("/"));
    }

    #[test]
    fn login_redirect_encodes_path_and_query() -> Result<()> {
        let gate = gate();
        let uri: Uri = "/code/list?grp=A1&page=2".parse()?;
        assert_eq!(
            gate.login_redirect(&uri),
            "/login?redirect=%2Fcode%2Flist%3Fgrp%3DA1%26page%3D2"
        );
        Ok(())
    }

    #[tokio::test]
    async fn api_passes_without_cookies() -> Result<()> {
        let response = send("/api/user/list", None).await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(location(&response).is_none());
        Ok(())
    }

    #[tokio::test]
    async fn navigation_without_session_redirects_to_login() -> Result<()> {
        let response = send("/dashboard", None).await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/login?redirect=%2Fdashboard"));
        Ok(())
    }

    #[tokio::test]
    async fn login_page_is_public() -> Result<()> {
        let response = send("/login", None).await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn cookie_presence_is_enough_at_the_edge() -> Result<()> {
        let response = send("/dashboard", Some("accessToken=not-even-a-jwt")).await?;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send("/dashboard", Some("refreshToken=opaque")).await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn empty_cookie_does_not_count() -> Result<()> {
        let response = send("/dashboard", Some("accessToken=; theme=dark")).await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        Ok(())
    }

    #[tokio::test]
    async fn static_assets_always_pass() -> Result<()> {
        let response = send("/images/logo.png", None).await?;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send("/images/logo.png", Some("accessToken=x")).await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }
}
