// src/envelope/src/content.rs
use sha2::{Digest, Sha256};

/// Content address of a ciphertext: lowercase hex SHA-256.
///
/// This is the value an owner anchors on the ledger so heirs can check a
/// downloaded blob against it.
pub fn content_id(ciphertext: &[u8]) -> String {
    hex::encode(Sha256::digest(ciphertext))
}

/// Checks a downloaded ciphertext against an anchored content id produced by
/// [`content_id`]. Content ids in other formats never match.
pub fn matches_content_id(ciphertext: &[u8], cid: &str) -> bool {
    content_id(ciphertext).eq_ignore_ascii_case(cid.trim())
}
