//! # fitness-auth
//!
//! Single source of truth for the Google Fit authorization flow:
//! - CSRF state generation and single-use validation for the OAuth 2.0
//!   Authorization Code grant
//! - Scope-grant verification against the set of required scopes
//! - AES-256-GCM encryption of the credential stored in a browser cookie
//! - The `CookieStore` capability the flow runs against, so the whole
//!   flow is testable without an HTTP server
//!
//! ## Architecture
//!
//! This crate holds no HTTP client and no web framework types. The
//! `domain` crate drives the flow (consent URL, code exchange) and the
//! `web` crate supplies the browser-backed `CookieStore`.

pub mod credential;
pub mod csrf;
pub mod error;
pub mod nonce;
pub mod scope;
pub mod session;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
