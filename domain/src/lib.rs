//! Business flow for the Google Fit authorization: the consent redirect,
//! the callback orchestration, and access to the credential sealed in the
//! encrypted session cookie.

// Re-exports so consumers of the `domain` crate do not need to depend on
// `fitness-auth` directly. `web` implements the browser cookie jar against
// the `CookieStore` capability and renders the stored credential, while the
// underlying flow machinery stays encapsulated here.
pub use fitness_auth::credential::{redact_token, TokenCredential};
pub use fitness_auth::session::{CookieOptions, CookieStore, MemoryCookies, SameSite};

pub mod authorization;
pub mod error;
pub mod gateway;
