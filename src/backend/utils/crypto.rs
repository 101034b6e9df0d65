// src/backend/utils/crypto.rs
// Hashing helpers. The canister never encrypts or decrypts vault content.

use crate::models::common::{Did, FileId, FileKey, Timestamp};
use candid::Principal;
use sha2::{Digest, Sha256};

const DID_PREFIX: &str = "did:legacyvault:";
const DID_SUFFIX_LEN: usize = 10;

/// Calculates the SHA256 hash of byte data and returns it as a hex string.
pub fn calculate_sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Anchor registry key for a file: `sha256(file_id)` as hex.
pub fn file_key_for(file_id: &FileId) -> FileKey {
    calculate_sha256_hex(file_id.as_bytes())
}

/// A file key is 32 bytes written as 64 lowercase hex digits.
pub fn is_valid_file_key(key: &str) -> bool {
    key.len() == 64 && key.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Links an event body to its predecessor: `sha256(prev_hash || body)`.
pub fn chain_hash(prev_hash: Option<&str>, body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    if let Some(prev) = prev_hash {
        hasher.update(prev.as_bytes());
    }
    hasher.update(body);
    hex::encode(hasher.finalize())
}

fn derive_hex(domain: &str, owner: &Principal, seq: u64, now: Timestamp) -> String {
    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());
    hasher.update(owner.as_slice());
    hasher.update(seq.to_be_bytes());
    hasher.update(now.to_be_bytes());
    hex::encode(hasher.finalize())
}

/// Derives a unique file id from the owner, a monotonic sequence and time.
pub fn derive_file_id(owner: &Principal, seq: u64, now: Timestamp) -> FileId {
    derive_hex("file", owner, seq, now)[..24].to_string()
}

/// Derives `did:legacyvault:<10 hex chars>`.
pub fn derive_did(owner: &Principal, seq: u64, now: Timestamp) -> Did {
    let digest = derive_hex("did", owner, seq, now);
    format!("{}{}", DID_PREFIX, &digest[..DID_SUFFIX_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_key_is_hex_sha256_of_id() {
        let key = file_key_for(&"abc".to_string());
        assert_eq!(key, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
        assert!(is_valid_file_key(&key));
        assert!(!is_valid_file_key("BA7816"));
    }

    #[test]
    fn chain_hash_depends_on_predecessor() {
        let first = chain_hash(None, b"body");
        assert_ne!(chain_hash(Some(&first), b"body"), first);
        assert_eq!(chain_hash(Some(&first), b"body"), chain_hash(Some(&first), b"body"));
    }

    #[test]
    fn derived_ids_differ_per_sequence() {
        let owner = Principal::from_slice(&[1; 29]);
        assert_ne!(derive_file_id(&owner, 0, 10), derive_file_id(&owner, 1, 10));
        let did = derive_did(&owner, 0, 10);
        assert!(did.starts_with(DID_PREFIX));
        assert_eq!(did.len(), DID_PREFIX.len() + DID_SUFFIX_LEN);
    }
}
