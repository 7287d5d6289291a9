//! AES-256-GCM encryption for the session cookie payload.
//!
//! Every encryption draws a fresh random 12-byte IV, which is prepended to
//! the ciphertext; AES-GCM appends its 16-byte authentication tag, so a
//! valid blob is IV || ciphertext || tag and never shorter than 28 bytes.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::Rng;

use crate::error::{Error, ErrorKind, SessionErrorKind};

/// 12-byte IV size for AES-GCM
const IV_SIZE: usize = 12;
/// 16-byte authentication tag appended by AES-GCM
const TAG_SIZE: usize = 16;
/// AES-256 key size
const KEY_SIZE: usize = 32;

fn encryption_err() -> Error {
    Error {
        source: None,
        error_kind: ErrorKind::Session(SessionErrorKind::EncryptionFailed),
    }
}

fn decryption_err() -> Error {
    Error {
        source: None,
        error_kind: ErrorKind::Session(SessionErrorKind::DecryptionFailed),
    }
}

/// Symmetric cipher keyed from the configured session secret.
pub struct SessionCipher {
    key: [u8; KEY_SIZE],
}

impl SessionCipher {
    /// Derive the AES-256 key from an application secret of any length.
    ///
    /// The secret is narrowed deterministically: bytes past 32 are
    /// truncated and short secrets are zero-padded. This is narrowing, not
    /// hashing; changing it to a KDF would invalidate every session cookie
    /// already in the wild.
    pub fn new(secret: &[u8]) -> Self {
        let mut key = [0u8; KEY_SIZE];
        let len = secret.len().min(KEY_SIZE);
        key[..len].copy_from_slice(&secret[..len]);
        Self { key }
    }

    /// Encrypt a payload, returning IV || ciphertext || tag.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        let cipher = Aes256Gcm::new_from_slice(&self.key).map_err(|_| encryption_err())?;

        let mut iv_bytes = [0u8; IV_SIZE];
        rand::thread_rng().fill(&mut iv_bytes);
        let nonce = Nonce::from_slice(&iv_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| encryption_err())?;

        let mut blob = iv_bytes.to_vec();
        blob.extend(ciphertext);

        Ok(blob)
    }

    /// Decrypt a blob produced by [`encrypt`](Self::encrypt).
    ///
    /// Fails with `DecryptionFailed` when the blob is too short to contain
    /// an IV and tag, or when tag verification rejects it (wrong key or
    /// any modified byte).
    pub fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>, Error> {
        if blob.len() < IV_SIZE + TAG_SIZE {
            return Err(decryption_err());
        }

        let cipher = Aes256Gcm::new_from_slice(&self.key).map_err(|_| decryption_err())?;

        let (iv_bytes, ciphertext) = blob.split_at(IV_SIZE);
        let nonce = Nonce::from_slice(iv_bytes);

        cipher.decrypt(nonce, ciphertext).map_err(|_| decryption_err())
    }
}
