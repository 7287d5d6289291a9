//! Verification of the scopes a user actually granted during consent.
//!
//! Google lets users deselect individual scopes on the consent screen, so a
//! callback can arrive with a valid code whose grant is too narrow to be
//! useful. The verifier compares the provider's space-delimited grant string
//! against the required set before any credential is persisted.

use std::collections::HashSet;

/// An ordered, non-empty set of required OAuth scope identifiers.
///
/// Order is preserved for building the consent request; comparison against
/// a grant ignores order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeSet {
    scopes: Vec<String>,
}

impl ScopeSet {
    /// Build a scope set, dropping empty entries.
    ///
    /// Returns `None` when no scopes remain; a flow with nothing to require
    /// is a configuration mistake, not a valid state.
    pub fn new(scopes: Vec<String>) -> Option<Self> {
        let scopes: Vec<String> = scopes
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if scopes.is_empty() {
            None
        } else {
            Some(Self { scopes })
        }
    }

    /// The required scopes in request order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    /// The scopes joined with single spaces, as OAuth request syntax wants them.
    pub fn join(&self) -> String {
        self.scopes.join(" ")
    }

    /// Check a provider grant string against the required set.
    ///
    /// The grant is split on whitespace and compared as a set. An absent or
    /// empty grant leaves every required scope missing. Pure and total: no
    /// I/O, no failure mode.
    pub fn verify(&self, granted: Option<&str>) -> ScopeCheck {
        let granted: HashSet<&str> = granted
            .map(|g| g.split_whitespace().collect())
            .unwrap_or_default();

        let missing = self
            .scopes
            .iter()
            .filter(|required| !granted.contains(required.as_str()))
            .cloned()
            .collect();

        ScopeCheck { missing }
    }
}

/// The outcome of comparing a grant against a [`ScopeSet`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeCheck {
    missing: Vec<String>,
}

impl ScopeCheck {
    /// True when every required scope was granted.
    pub fn satisfied(&self) -> bool {
        self.missing.is_empty()
    }

    /// The required scopes absent from the grant, in required order.
    pub fn missing(&self) -> &[String] {
        &self.missing
    }
}
