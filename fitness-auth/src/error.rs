//! Error types for the `fitness-auth` crate.
//!
//! Follows the same pattern as domain::error with a root Error struct and error kind enums.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for fitness-auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in fitness-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    OAuth(OAuthErrorKind),
    Session(SessionErrorKind),
}

/// Errors from the authorization flow itself.
#[derive(Debug, PartialEq)]
pub enum OAuthErrorKind {
    /// A required callback query parameter was absent.
    MissingParameter,
    /// The returned state did not match the state cookie, or the cookie was gone.
    CsrfMismatch,
    /// The code-for-token exchange failed (network, non-success status, or bad body).
    ExchangeFailed,
    /// The provider granted fewer scopes than required.
    InsufficientScope,
}

/// Errors from the encrypted session cookie.
#[derive(Debug, PartialEq)]
pub enum SessionErrorKind {
    EncryptionFailed,
    DecryptionFailed,
    /// The session cookie is absent or could not be decoded, decrypted, or parsed.
    /// Callers cannot distinguish which; they treat all of them as "not authenticated".
    Unreadable,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::OAuth(kind) => write!(f, "OAuth error: {:?}", kind),
            ErrorKind::Session(kind) => write!(f, "Session error: {:?}", kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}
