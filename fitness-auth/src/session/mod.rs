//! Encrypted cookie session support.
//!
//! The server keeps no session table; the encrypted cookie is the whole
//! session. Flow code talks to a [`CookieStore`] capability instead of any
//! web framework type, so the same logic runs against a real browser jar
//! in `web` and against [`MemoryCookies`] in tests.

use std::collections::HashMap;

pub mod cipher;
pub mod codec;

pub use cipher::SessionCipher;
pub use codec::SessionCodec;

/// Name of the encrypted credential cookie.
pub const SESSION_COOKIE: &str = "oauth_session";

/// `SameSite` policy for a cookie.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Attributes applied when a cookie is written.
///
/// Defaults are the safe baseline for this flow: `HttpOnly`,
/// `SameSite=Lax`, `Path=/`, browser-session lifetime, `Secure` off (the
/// caller turns it on outside local development).
#[derive(Debug, Clone, PartialEq)]
pub struct CookieOptions {
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
    /// Lifetime in seconds; `None` means a browser-session cookie.
    pub max_age: Option<i64>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            http_only: true,
            secure: false,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            max_age: None,
        }
    }
}

impl CookieOptions {
    /// Options for the long-lived (browser-session) credential cookie.
    pub fn session(secure: bool) -> Self {
        Self {
            secure,
            ..Self::default()
        }
    }

    /// Options for a short-lived cookie such as the CSRF state.
    pub fn short_lived(secure: bool, max_age_secs: i64) -> Self {
        Self {
            secure,
            max_age: Some(max_age_secs),
            ..Self::default()
        }
    }
}

/// Capability for reading and writing browser cookies.
///
/// `clear` must expire the cookie on the client (`Max-Age=0`), not merely
/// forget it server-side.
pub trait CookieStore {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&mut self, name: &str, value: &str, options: &CookieOptions);
    fn clear(&mut self, name: &str);
}

/// In-memory [`CookieStore`] for exercising the flow in tests.
///
/// Records the options each cookie was written with and every clear, so
/// tests can assert on cookie attributes and on clears that happen along
/// failure paths.
#[derive(Debug, Default)]
pub struct MemoryCookies {
    values: HashMap<String, String>,
    options: HashMap<String, CookieOptions>,
    cleared: Vec<String>,
}

impl MemoryCookies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a cookie as if the browser had sent it.
    pub fn insert(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The options the cookie was last written with, if it was written.
    pub fn options_for(&self, name: &str) -> Option<&CookieOptions> {
        self.options.get(name)
    }

    pub fn was_cleared(&self, name: &str) -> bool {
        self.cleared.iter().any(|n| n == name)
    }
}

impl CookieStore for MemoryCookies {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: &str, options: &CookieOptions) {
        self.values.insert(name.to_string(), value.to_string());
        self.options.insert(name.to_string(), options.clone());
    }

    fn clear(&mut self, name: &str) {
        self.values.remove(name);
        self.options.remove(name);
        self.cleared.push(name.to_string());
    }
}
