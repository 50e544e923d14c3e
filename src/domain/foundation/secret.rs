//! Random bearer secrets (pairing keys, machine access tokens).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

/// Number of random bytes behind every generated secret (256 bits).
pub const SECRET_BYTES: usize = 32;

/// Generates a URL-safe secret from the operating system CSPRNG.
///
/// The result is 43 characters of unpadded base64url.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
