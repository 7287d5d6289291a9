//! The credential persisted in the encrypted session cookie.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tokens and grant metadata returned by a successful code exchange.
///
/// This is the session cookie's plaintext payload. Token values are never
/// logged in full; `Debug` redacts them.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenCredential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Absolute expiry, converted from the provider's `expires_in` at
    /// exchange time. `None` when the provider reported no usable expiry.
    pub expires_at: Option<DateTime<Utc>>,
    pub token_type: String,
    /// Space-delimited scopes the user actually granted.
    pub scope: String,
}

/// Shorten a token to a loggable preview.
pub fn redact_token(token: &str) -> String {
    if token.chars().count() <= 8 {
        "***".to_string()
    } else {
        let prefix: String = token.chars().take(8).collect();
        format!("{prefix}...")
    }
}

impl fmt::Debug for TokenCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCredential")
            .field("access_token", &redact_token(&self.access_token))
            .field(
                "refresh_token",
                &self.refresh_token.as_deref().map(redact_token),
            )
            .field("expires_at", &self.expires_at)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .finish()
    }
}
