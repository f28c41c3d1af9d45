//! Auth handlers and supporting modules.
//!
//! This module owns the cookie session: token signing, cookie writing,
//! request-side resolution and the access guard every protected operation
//! goes through.
//!
//! ## Token Lifetimes
//!
//! - **Access:** 15 minutes by default (`--access-ttl-seconds`).
//! - **Refresh:** 7 days by default (`--refresh-ttl-seconds`).
//!
//! With the `fixed` refresh policy the session ends when the refresh token
//! expires, no matter how active the user is. With `sliding`, every renewal
//! also reissues the refresh token.
//!
//! ## Failure Shape
//!
//! Verification failures stay `Option::None` inside this module and only
//! become an error at [`require_access_principal`], which always answers
//! `401 {"message":"Unauthorized"}`.

pub(crate) mod cookies;
pub(crate) mod credentials;
mod error;
pub(crate) mod guard;
pub(crate) mod login;
pub(crate) mod principal;
pub(crate) mod resolver;
pub(crate) mod session;
mod state;
pub(crate) mod token;
pub(crate) mod types;

pub use cookies::{ACCESS_COOKIE_NAME, CookieManager, CookieProfile, REFRESH_COOKIE_NAME};
pub use credentials::{
    CredentialError, CredentialVerifier, DenyAllCredentialVerifier, StaticCredentialVerifier,
    VerifyFuture,
};
pub use error::AuthError;
pub use guard::{AccessPrincipal, require_access_principal};
pub use principal::{Principal, Subject};
pub use resolver::SessionResolver;
pub use state::{AuthConfig, AuthState, RefreshPolicy};
pub use token::{SigningFailure, TokenClass, TokenCodec, TokenRejection};

pub(crate) use resolver::has_session_cookie;
