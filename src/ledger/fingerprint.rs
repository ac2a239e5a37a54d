//! Request fingerprinting for idempotency comparison.

use sha2::{Digest, Sha256};

/// Fingerprint length in hex characters (SHA-256).
pub const FINGERPRINT_LEN: usize = 64;

/// Lowercase hex SHA-256 of the raw request body.
///
/// The hash is taken over the bytes as received, before JSON decoding, so
/// two bodies that differ only in whitespace or key order produce different
/// fingerprints. The memo guards against byte-level replays, not semantic
/// equivalence.
pub fn fingerprint(body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body);
    hex::encode(hasher.finalize())
}

/// A well-formed fingerprint is exactly 64 lowercase hex characters.
pub fn is_valid_fingerprint(s: &str) -> bool {
    s.len() == FINGERPRINT_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
