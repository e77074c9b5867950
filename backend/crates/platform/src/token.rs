//! Random Token Utilities
//!
//! CSPRNG-backed opaque tokens and constant-time comparison helpers.

use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// Length of persistent-login ("remember me") tokens.
pub const REMEMBER_TOKEN_LENGTH: usize = 60;

/// Generate a random alphanumeric token of the given length.
pub fn random_token(len: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate a remember-me token (60 alphanumeric characters).
pub fn remember_token() -> String {
    random_token(REMEMBER_TOKEN_LENGTH)
}

/// Compare two strings in constant time.
///
/// Both sides are hashed first so the comparison length never depends on
/// the inputs.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let digest_a: [u8; 32] = Sha256::digest(a.as_bytes()).into();
    let digest_b: [u8; 32] = Sha256::digest(b.as_bytes()).into();

    let mut diff = 0u8;
    for (x, y) in digest_a.iter().zip(digest_b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
