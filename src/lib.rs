//! # Portal (Session & Access Control)
//!
//! `portal` fronts the business administration application. It owns the
//! session lifecycle and the request gating that every page and API operation
//! goes through before domain logic runs.
//!
//! ## Session Model
//!
//! A session is two signed cookies and nothing else; there is no server-side
//! session table.
//!
//! - **`accessToken`:** short-lived, authorizes individual API operations.
//! - **`refreshToken`:** long-lived, only used to mint new access tokens.
//!
//! Both cookies share one security profile (`HttpOnly`, `SameSite=Lax`,
//! `Path=/`, `Secure` when served over HTTPS). Clearing a cookie rewrites it
//! with the same profile and `Max-Age=0`.
//!
//! ## Two-Tier Gating
//!
//! - **Edge gate:** runs on every request and only checks that a session cookie
//!   is *present*. Unauthenticated navigation is redirected to the login page
//!   with a `redirect` parameter.
//! - **Access guard:** every protected API operation verifies the access token
//!   and obtains a [`Principal`](api::handlers::auth::Principal). Tenant scope
//!   (`enterCd`) and actor (`sabun`) are always taken from the principal, never
//!   from client input.
//!
//! Any verification failure surfaces as `401` with `{"message":"Unauthorized"}`.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
