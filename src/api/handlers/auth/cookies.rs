//! Session cookie writer.
//!
//! Every cookie this service sets or clears goes through one [`CookieProfile`],
//! so the attribute set used to clear a cookie always matches the one used to
//! set it. Browsers ignore clears with mismatched `Path`/`Secure`.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{InvalidHeaderValue, SET_COOKIE},
};
use std::time::Duration;

pub const ACCESS_COOKIE_NAME: &str = "accessToken";
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Process-wide cookie security attributes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CookieProfile {
    http_only: bool,
    secure: bool,
    same_site: &'static str,
    path: &'static str,
}

impl CookieProfile {
    #[must_use]
    pub fn new(secure: bool) -> Self {
        Self {
            http_only: true,
            secure,
            same_site: "Lax",
            path: "/",
        }
    }

    #[must_use]
    pub fn secure(&self) -> bool {
        self.secure
    }

    fn render(
        &self,
        name: &str,
        value: &str,
        max_age: u64,
    ) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!(
            "{name}={value}; Path={}; SameSite={}; Max-Age={max_age}",
            self.path, self.same_site
        );
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

/// Maps the access/refresh token pair onto `Set-Cookie` headers.
#[derive(Clone, Debug)]
pub struct CookieManager {
    profile: CookieProfile,
    access_max_age: u64,
    refresh_max_age: u64,
}

impl CookieManager {
    #[must_use]
    pub fn new(profile: CookieProfile, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            profile,
            access_max_age: access_ttl.as_secs(),
            refresh_max_age: refresh_ttl.as_secs(),
        }
    }

    #[must_use]
    pub fn profile(&self) -> &CookieProfile {
        &self.profile
    }

    /// Set both session cookies. Nothing is written unless both render.
    ///
    /// # Errors
    /// Returns an error if a token contains bytes not allowed in a header.
    pub fn apply_auth_cookies(
        &self,
        headers: &mut HeaderMap,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), InvalidHeaderValue> {
        let access = self
            .profile
            .render(ACCESS_COOKIE_NAME, access_token, self.access_max_age)?;
        let refresh =
            self.profile
                .render(REFRESH_COOKIE_NAME, refresh_token, self.refresh_max_age)?;
        headers.append(SET_COOKIE, access);
        headers.append(SET_COOKIE, refresh);
        Ok(())
    }

    /// Rewrite only the access cookie; the refresh cookie keeps its remaining lifetime.
    ///
    /// # Errors
    /// Returns an error if the token contains bytes not allowed in a header.
    pub fn apply_access_cookie(
        &self,
        headers: &mut HeaderMap,
        access_token: &str,
    ) -> Result<(), InvalidHeaderValue> {
        let access = self
            .profile
            .render(ACCESS_COOKIE_NAME, access_token, self.access_max_age)?;
        headers.append(SET_COOKIE, access);
        Ok(())
    }

    /// Expire both session cookies.
    ///
    /// # Errors
    /// Returns an error if the cookie cannot be rendered as a header value.
    pub fn clear_auth_cookies(&self, headers: &mut HeaderMap) -> Result<(), InvalidHeaderValue> {
        let access = self.profile.render(ACCESS_COOKIE_NAME, "", 0)?;
        let refresh = self.profile.render(REFRESH_COOKIE_NAME, "", 0)?;
        headers.append(SET_COOKIE, access);
        headers.append(SET_COOKIE, refresh);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::Result;

    /// Set-Cookie values in the order they were written.
    pub(crate) fn set_cookies(headers: &HeaderMap) -> Vec<String> {
        headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    /// Cookie header a browser would send after applying `headers` to an empty jar.
    pub(crate) fn browser_cookie_header(headers: &HeaderMap) -> String {
        let mut jar: Vec<(String, String)> = Vec::new();
        for cookie in set_cookies(headers) {
            let mut parts = cookie.split(';').map(str::trim);
            let Some((name, value)) = parts.next().and_then(|pair| pair.split_once('=')) else {
                continue;
            };
            jar.retain(|(existing, _)| existing != name);
            let expired = parts.any(|attr| attr.eq_ignore_ascii_case("Max-Age=0"));
            if !expired {
                jar.push((name.to_string(), value.to_string()));
            }
        }
        jar.iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn manager(secure: bool) -> CookieManager {
        CookieManager::new(
            CookieProfile::new(secure),
            Duration::from_secs(900),
            Duration::from_secs(604_800),
        )
    }

    #[test]
    fn apply_auth_cookies_sets_both_with_profile() -> Result<()> {
        let mut headers = HeaderMap::new();
        manager(true).apply_auth_cookies(&mut headers, "access", "refresh")?;
        assert_eq!(
            set_cookies(&headers),
            vec![
                "accessToken=access; Path=/; SameSite=Lax; Max-Age=900; HttpOnly; Secure"
                    .to_string(),
                "refreshToken=refresh; Path=/; SameSite=Lax; Max-Age=604800; HttpOnly; Secure"
                    .to_string(),
            ]
        );
        Ok(())
    }

    #[test]
    fn insecure_profile_omits_secure() -> Result<()> {
        let mut headers = HeaderMap::new();
        manager(false).apply_access_cookie(&mut headers, "access")?;
        assert_eq!(
            set_cookies(&headers),
            vec!["accessToken=access; Path=/; SameSite=Lax; Max-Age=900; HttpOnly".to_string()]
        );
        Ok(())
    }

    #[test]
    fn apply_access_cookie_leaves_refresh_untouched() -> Result<()> {
        let manager = manager(true);
        let mut headers = HeaderMap::new();
        manager.apply_auth_cookies(&mut headers, "access-1", "refresh-1")?;
        let refresh_before: Vec<String> = set_cookies(&headers)
            .into_iter()
            .filter(|c| c.starts_with(REFRESH_COOKIE_NAME))
            .collect();

        manager.apply_access_cookie(&mut headers, "access-2")?;

        let refresh_after: Vec<String> = set_cookies(&headers)
            .into_iter()
            .filter(|c| c.starts_with(REFRESH_COOKIE_NAME))
            .collect();
        assert_eq!(refresh_before, refresh_after);
        assert_eq!(
            browser_cookie_header(&headers),
            "refreshToken=refresh-1; accessToken=access-2"
        );

        let mut renewal = HeaderMap::new();
        manager.apply_access_cookie(&mut renewal, "access-3")?;
        assert!(
            set_cookies(&renewal)
                .iter()
                .all(|c| c.starts_with(ACCESS_COOKIE_NAME))
        );
        Ok(())
    }

    #[test]
    fn clear_uses_same_profile_with_zero_max_age() -> Result<()> {
        let mut headers = HeaderMap::new();
        manager(true).clear_auth_cookies(&mut headers)?;
        assert_eq!(
            set_cookies(&headers),
            vec![
                "accessToken=; Path=/; SameSite=Lax; Max-Age=0; HttpOnly; Secure".to_string(),
                "refreshToken=; Path=/; SameSite=Lax; Max-Age=0; HttpOnly; Secure".to_string(),
            ]
        );
        Ok(())
    }

    #[test]
    fn clear_after_apply_empties_the_jar() -> Result<()> {
        let manager = manager(false);
        let mut headers = HeaderMap::new();
        manager.apply_auth_cookies(&mut headers, "access", "refresh")?;
        manager.clear_auth_cookies(&mut headers)?;
        assert_eq!(browser_cookie_header(&headers), "");
        Ok(())
    }

    #[test]
    fn invalid_token_bytes_write_nothing() {
        let mut headers = HeaderMap::new();
        let result = manager(true).apply_auth_cookies(&mut headers, "access", "bad\nvalue");
        assert!(result.is_err());
        assert!(headers.is_empty());
    }
}
