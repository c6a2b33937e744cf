//! Stable fingerprints for generated artifacts.

use sha2::{Digest, Sha256};

/// First 16 hex characters of the SHA-256 of `input`.
///
/// Include-guard macros are derived from this: unique per artifact path,
/// stable across regenerations of the same project.
pub fn short_fingerprint(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(&digest[..8])
}
