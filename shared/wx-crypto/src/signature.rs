//! SHA-1 Request Signatures
//!
//! The platform signs a request by sorting its parameters, concatenating
//! them and hashing the result. Sorting makes the check independent of the
//! order the parameters are passed in.

use sha1::{Digest, Sha1};

/// SHA-1 of `content`, lowercase hex.
pub fn digest(content: &str) -> String {
    hex::encode(Sha1::digest(content.as_bytes()))
}

/// Sign `parts`: sort byte-wise, concatenate, digest.
pub fn sign(parts: &[&str]) -> String {
    let mut sorted = parts.to_vec();
    sorted.sort_unstable();
    digest(&sorted.concat())
}

/// Verify `signature` (hex, any case) against `parts`.
pub fn check(parts: &[&str], signature: &str) -> bool {
    let expected = sign(parts);
    let signature = signature.to_ascii_lowercase();
    // Constant-time comparison
    expected.len() == signature.len()
        && expected
            .as_bytes()
            .iter()
            .zip(signature.as_bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
