//! API handlers and page shells for the portal.

pub mod auth;
pub mod health;
pub mod pages;
