//! Error types for the `domain` layer.
use fitness_auth::error::{
    Error as FitnessAuthError, ErrorKind as FitnessAuthErrorKind, OAuthErrorKind, SessionErrorKind,
};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. The intent is to translate errors between layers while maintaining
/// layer boundaries. Ex. `domain` is dependent on `fitness-auth`, and `web` is dependent
/// on `domain`, but `web` should not be dependent, directly, on `fitness-auth`. Each layer
/// is free to define its own error kinds to whatever richness is needed at that layer.
/// Ultimately the various `error_kind`s are used by `web` to return appropriate HTTP
/// status codes and messages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Auth(AuthErrorKind),
    Config,
    Other(String),
}

/// Enum representing the authorization-flow failures that bubble up from the
/// `fitness-auth` layer, reduced to the subset of kinds that are relevant to
/// the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum AuthErrorKind {
    MissingParameter,
    CsrfMismatch,
    InsufficientScope,
    SessionUnreadable,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    OAuthExchange,
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `fitness-auth` layer to the `domain` layer.
impl From<FitnessAuthError> for Error {
    fn from(err: FitnessAuthError) -> Self {
        let error_kind = match &err.error_kind {
            FitnessAuthErrorKind::OAuth(kind) => match kind {
                OAuthErrorKind::MissingParameter => {
                    DomainErrorKind::Internal(InternalErrorKind::Auth(AuthErrorKind::MissingParameter))
                }
                OAuthErrorKind::CsrfMismatch => {
                    DomainErrorKind::Internal(InternalErrorKind::Auth(AuthErrorKind::CsrfMismatch))
                }
                OAuthErrorKind::InsufficientScope => DomainErrorKind::Internal(
                    InternalErrorKind::Auth(AuthErrorKind::InsufficientScope),
                ),
                OAuthErrorKind::ExchangeFailed => {
                    DomainErrorKind::External(ExternalErrorKind::OAuthExchange)
                }
            },
            FitnessAuthErrorKind::Session(kind) => match kind {
                SessionErrorKind::Unreadable | SessionErrorKind::DecryptionFailed => {
                    DomainErrorKind::Internal(InternalErrorKind::Auth(
                        AuthErrorKind::SessionUnreadable,
                    ))
                }
                SessionErrorKind::EncryptionFailed => DomainErrorKind::Internal(
                    InternalErrorKind::Other("Failed to seal session cookie".to_string()),
                ),
            },
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}
