//! Random token generation for the OAuth state parameter.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;

/// Number of random bytes per token (256 bits of entropy).
const TOKEN_BYTES: usize = 32;

/// Generate a cryptographically random, URL-safe token.
///
/// Each call draws fresh bytes from the thread-local CSPRNG; tokens are
/// never derived from counters or timestamps.
pub fn generate() -> String {
    let random_bytes: [u8; TOKEN_BYTES] = rand::thread_rng().gen();
    URL_SAFE_NO_PAD.encode(random_bytes)
}
