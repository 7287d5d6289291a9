//! CSRF defense for the authorization flow.
//!
//! The `state` sent to the provider is also stored in a short-lived
//! HttpOnly cookie, binding the eventual callback to the browser that
//! started the flow. A forged callback link carries a state the victim's
//! browser has no matching cookie for.

use subtle::ConstantTimeEq;

use crate::error::{Error, ErrorKind, OAuthErrorKind};
use crate::nonce;
use crate::session::{CookieOptions, CookieStore};

/// Name of the short-lived CSRF state cookie.
pub const STATE_COOKIE: &str = "oauth_state";

/// Issues and validates the one-time OAuth state token.
pub struct CsrfGuard {
    max_age_secs: i64,
    secure_cookies: bool,
}

impl CsrfGuard {
    pub fn new(max_age_secs: i64, secure_cookies: bool) -> Self {
        Self {
            max_age_secs,
            secure_cookies,
        }
    }

    /// Generate a fresh state and bind it to the browser via the state
    /// cookie. Issuing again overwrites any previous state.
    pub fn issue(&self, cookies: &mut dyn CookieStore) -> String {
        let state = nonce::generate();
        cookies.set(
            STATE_COOKIE,
            &state,
            &CookieOptions::short_lived(self.secure_cookies, self.max_age_secs),
        );
        state
    }

    /// Validate a returned state against the state cookie.
    ///
    /// The cookie is consumed on every outcome before the comparison result
    /// is returned, so validating the same state twice always fails the
    /// second time. Fails with `CsrfMismatch` when the cookie is absent or
    /// the values differ.
    pub fn validate(&self, cookies: &mut dyn CookieStore, received: &str) -> Result<(), Error> {
        let expected = cookies.get(STATE_COOKIE);
        cookies.clear(STATE_COOKIE);

        match expected {
            Some(expected) if secure_equals(&expected, received) => Ok(()),
            _ => Err(Error {
                source: None,
                error_kind: ErrorKind::OAuth(OAuthErrorKind::CsrfMismatch),
            }),
        }
    }
}

/// Constant-time comparison so a mismatch reveals nothing about how much
/// of the token matched.
fn secure_equals(expected: &str, provided: &str) -> bool {
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}
