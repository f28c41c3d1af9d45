//! Resolve session cookies on an inbound request into a principal.
//!
//! Missing cookies, a missing `Cookie` header, and empty cookie values all
//! resolve to `None`, the same as a token that fails verification.

use axum::http::{HeaderMap, header::COOKIE};

use super::{
    cookies::{ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME},
    principal::Principal,
    token::{TokenClass, TokenCodec},
};

/// Read-only view over the token codec for request-side verification.
#[derive(Clone, Copy, Debug)]
pub struct SessionResolver<'a> {
    codec: &'a TokenCodec,
}

impl<'a> SessionResolver<'a> {
    #[must_use]
    pub fn new(codec: &'a TokenCodec) -> Self {
        Self { codec }
    }

    #[must_use]
    pub fn resolve_access(&self, headers: &HeaderMap) -> Option<Principal> {
        let token = cookie_value(headers, ACCESS_COOKIE_NAME)?;
        self.codec.verify(token, TokenClass::Access)
    }

    #[must_use]
    pub fn resolve_refresh(&self, headers: &HeaderMap) -> Option<Principal> {
        let token = cookie_value(headers, REFRESH_COOKIE_NAME)?;
        self.codec.verify(token, TokenClass::Refresh)
    }
}

/// True when either session cookie is present. No verification happens here.
pub(crate) fn has_session_cookie(headers: &HeaderMap) -> bool {
    cookie_value(headers, ACCESS_COOKIE_NAME).is_some()
        || cookie_value(headers, REFRESH_COOKIE_NAME).is_some()
}

/// First non-empty value for `name` across all `Cookie` headers.
pub(crate) fn cookie_value<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| val.trim())
        })
        .find(|val| !val.is_empty())
}
