//! Serialize-encrypt-encode pipeline between a value and its session cookie.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{CookieOptions, CookieStore, SessionCipher};
use crate::error::{Error, ErrorKind, SessionErrorKind};

fn unreadable() -> Error {
    // Deliberately carries no source: an absent cookie, a garbled one, and
    // a forged one must be indistinguishable to callers.
    Error {
        source: None,
        error_kind: ErrorKind::Session(SessionErrorKind::Unreadable),
    }
}

/// Writes and reads encrypted, base64url-encoded cookie payloads.
pub struct SessionCodec {
    cipher: SessionCipher,
}

impl SessionCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            cipher: SessionCipher::new(secret),
        }
    }

    /// JSON-encode and encrypt `value`, then set it as a cookie with the
    /// caller's options.
    pub fn store<T: Serialize>(
        &self,
        cookies: &mut dyn CookieStore,
        name: &str,
        value: &T,
        options: &CookieOptions,
    ) -> Result<(), Error> {
        let payload = serde_json::to_vec(value).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Session(SessionErrorKind::EncryptionFailed),
        })?;

        let blob = self.cipher.encrypt(&payload)?;
        let encoded = URL_SAFE_NO_PAD.encode(blob);

        cookies.set(name, &encoded, options);
        Ok(())
    }

    /// Read back a value stored with [`store`](Self::store).
    ///
    /// Every failure mode collapses into `SessionErrorKind::Unreadable`:
    /// cookie absent, base64 invalid, decryption rejected, JSON malformed.
    pub fn load<T: DeserializeOwned>(
        &self,
        cookies: &dyn CookieStore,
        name: &str,
    ) -> Result<T, Error> {
        let encoded = cookies.get(name).ok_or_else(unreadable)?;

        let blob = URL_SAFE_NO_PAD
            .decode(encoded.as_bytes())
            .map_err(|_| unreadable())?;

        let payload = self.cipher.decrypt(&blob).map_err(|_| unreadable())?;

        serde_json::from_slice(&payload).map_err(|_| unreadable())
    }
}
