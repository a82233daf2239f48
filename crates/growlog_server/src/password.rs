//! Salted password hashing.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Hashes a password with a fresh 16-byte random salt. The stored form
/// is `hex(salt)$hex(sha256(salt || password))`.
#[must_use]
pub fn hash(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    format!("{}${}", to_hex(&salt), digest(&salt, password))
}

/// Checks a candidate password against a stored hash.
#[must_use]
pub fn verify(candidate: &str, stored: &str) -> bool {
    let Some((salt_hex, hash_hex)) = stored.split_once('$') else {
        return false;
    };
    let Some(salt) = from_hex(salt_hex) else {
        return false;
    };
    // Re-hash both sides so comparison time is independent of where the
    // digests first differ.
    Sha256::digest(digest(&salt, candidate)) == Sha256::digest(hash_hex)
}

fn digest(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    to_hex(&hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn from_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
        .collect()
}
