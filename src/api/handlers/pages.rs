//! Page shells for navigable routes.
//!
//! The front end renders into these shells; they carry no data. Anything a
//! page shows is fetched from `/api/*` and passes the access guard there.

use axum::{
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};

use crate::api::gate::is_asset_path;

const LOGIN_SHELL: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Sign in</title></head>
<body><main id="app" data-page="login"></main><script type="module" src="/static/app.js"></script></body>
</html>
"#;

const APP_SHELL: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Portal</title></head>
<body><main id="app"></main><script type="module" src="/static/app.js"></script></body>
</html>
"#;

pub async fn login() -> Html<&'static str> {
    Html(LOGIN_SHELL)
}

/// Fallback for every unmatched path. Missing assets are a 404, not a page.
pub async fn shell(uri: Uri) -> Response {
    if is_asset_path(uri.path()) {
        StatusCode::NOT_FOUND.into_response()
    } else {
        Html(APP_SHELL).into_response()
    }
}
