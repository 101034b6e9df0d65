// src/envelope/src/envelope.rs
use crate::error::EnvelopeError;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

pub const IV_LEN: usize = 12;
pub const SALT_LEN: usize = 16;
pub const KEY_LEN: usize = 32;
pub const TAG_LEN: usize = 16;
pub const KDF_ITERATIONS: u32 = 100_000;

/// Tag written into every envelope produced by this crate.
pub const ALGORITHM: &str = "AES-256-GCM+PBKDF2-HMAC-SHA256";

fn default_algorithm() -> String {
    ALGORITHM.to_string()
}

/// Non-secret reconstruction metadata, serialized as
/// `{ "iv": [..12], "salt": [..16], "originalName": .., "type": .. }`.
///
/// Envelopes written before the algorithm tag existed have no `algorithm`
/// field and are read as [`ALGORITHM`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub iv: [u8; IV_LEN],
    pub salt: [u8; SALT_LEN],
    #[serde(rename = "originalName")]
    pub original_name: String,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

impl Envelope {
    pub fn from_json(json: &str) -> Result<Self, EnvelopeError> {
        serde_json::from_str(json).map_err(|e| EnvelopeError::InvalidEnvelope(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, EnvelopeError> {
        serde_json::to_string(self).map_err(|e| EnvelopeError::InvalidEnvelope(e.to_string()))
    }
}

/// Output of [`encrypt`]: the opaque ciphertext (GCM tag in its last 16
/// bytes) and the envelope needed to open it.
#[derive(Clone, Debug)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub envelope: Envelope,
}

fn derive_key(passphrase: &str, salt: &[u8; SALT_LEN]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, KDF_ITERATIONS, key.as_mut_slice());
    key
}

fn cipher_for(passphrase: &str, salt: &[u8; SALT_LEN]) -> Result<Aes256Gcm, EnvelopeError> {
    let key = derive_key(passphrase, salt);
    Aes256Gcm::new_from_slice(key.as_slice())
        .map_err(|e| EnvelopeError::EncryptionFailed(format!("Failed to create cipher: {}", e)))
}

/// Encrypts `plaintext` under `passphrase` with a fresh random IV and salt.
pub fn encrypt(
    plaintext: &[u8],
    passphrase: &str,
    original_name: &str,
    mime_type: &str,
) -> Result<Sealed, EnvelopeError> {
    let mut iv = [0u8; IV_LEN];
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut iv);
    OsRng.fill_bytes(&mut salt);
    encrypt_with(plaintext, passphrase, iv, salt, original_name, mime_type)
}

/// Deterministic form of [`encrypt`]: identical inputs give identical
/// ciphertext. Callers must never reuse an `(iv, salt)` pair for two
/// different encryptions.
pub fn encrypt_with(
    plaintext: &[u8],
    passphrase: &str,
    iv: [u8; IV_LEN],
    salt: [u8; SALT_LEN],
    original_name: &str,
    mime_type: &str,
) -> Result<Sealed, EnvelopeError> {
    let cipher = cipher_for(passphrase, &salt)?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|e| EnvelopeError::EncryptionFailed(e.to_string()))?;

    Ok(Sealed {
        ciphertext,
        envelope: Envelope {
            iv,
            salt,
            original_name: original_name.to_string(),
            mime_type: mime_type.to_string(),
            algorithm: default_algorithm(),
        },
    })
}

/// Opens `ciphertext` sealed by [`encrypt`]. Any tag mismatch, whatever its
/// cause, is reported as [`EnvelopeError::AuthenticationFailure`] and no
/// plaintext is returned.
pub fn decrypt(ciphertext: &[u8], passphrase: &str, envelope: &Envelope) -> Result<Vec<u8>, EnvelopeError> {
    if envelope.algorithm != ALGORITHM {
        return Err(EnvelopeError::UnsupportedAlgorithm(envelope.algorithm.clone()));
    }
    if ciphertext.len() < TAG_LEN {
        return Err(EnvelopeError::AuthenticationFailure);
    }

    let cipher = cipher_for(passphrase, &envelope.salt)?;
    cipher
        .decrypt(Nonce::from_slice(&envelope.iv), ciphertext)
        .map_err(|_| EnvelopeError::AuthenticationFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IV: [u8; IV_LEN] = [7; IV_LEN];
    const SALT: [u8; SALT_LEN] = [42; SALT_LEN];

    #[test]
    fn round_trip_recovers_plaintext() {
        let sealed = encrypt(b"Hello EternaVault", "test-passphrase", "hello.txt", "text/plain").unwrap();
        let opened = decrypt(&sealed.ciphertext, "test-passphrase", &sealed.envelope).unwrap();
        assert_eq!(opened, b"Hello EternaVault");
        assert_eq!(sealed.envelope.original_name, "hello.txt");
        assert_eq!(sealed.envelope.mime_type, "text/plain");
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let sealed = encrypt_with(b"", "p", IV, SALT, "empty", "").unwrap();
        assert_eq!(sealed.ciphertext.len(), TAG_LEN);
        assert!(decrypt(&sealed.ciphertext, "p", &sealed.envelope).unwrap().is_empty());
    }

    #[test]
    fn ciphertext_carries_trailing_tag() {
        let sealed = encrypt_with(b"twelve bytes", "p", IV, SALT, "f", "").unwrap();
        assert_eq!(sealed.ciphertext.len(), b"twelve bytes".len() + TAG_LEN);
    }

    #[test]
    fn fixed_iv_and_salt_are_deterministic() {
        let a = encrypt_with(b"same input", "correct-horse", IV, SALT, "f", "").unwrap();
        let b = encrypt_with(b"same input", "correct-horse", IV, SALT, "f", "").unwrap();
        assert_eq!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn every_encryption_draws_fresh_iv_and_salt() {
        let a = encrypt(b"same input", "correct-horse", "f", "").unwrap();
        let b = encrypt(b"same input", "correct-horse", "f", "").unwrap();
        assert_ne!(a.envelope.iv, b.envelope.iv);
        assert_ne!(a.envelope.salt, b.envelope.salt);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn wrong_passphrase_is_authentication_failure() {
        let sealed = encrypt_with(b"secret", "correct-horse", IV, SALT, "f", "").unwrap();
        let err = decrypt(&sealed.ciphertext, "battery-staple", &sealed.envelope).unwrap_err();
        assert_eq!(err, EnvelopeError::AuthenticationFailure);
        assert_eq!(err.to_string(), "wrong key");
    }

    #[test]
    fn flipped_ciphertext_byte_is_rejected() {
        let sealed = encrypt_with(b"secret bytes", "p", IV, SALT, "f", "").unwrap();
        for i in [0, sealed.ciphertext.len() - 1] {
            let mut tampered = sealed.ciphertext.clone();
            tampered[i] ^= 0x01;
            assert_eq!(
                decrypt(&tampered, "p", &sealed.envelope),
                Err(EnvelopeError::AuthenticationFailure)
            );
        }
    }

    #[test]
    fn mismatched_envelope_fields_are_rejected() {
        let sealed = encrypt_with(b"secret", "p", IV, SALT, "f", "").unwrap();

        let mut other_salt = sealed.envelope.clone();
        other_salt.salt[0] ^= 0xff;
        assert_eq!(decrypt(&sealed.ciphertext, "p", &other_salt), Err(EnvelopeError::AuthenticationFailure));

        let mut other_iv = sealed.envelope.clone();
        other_iv.iv[11] ^= 0xff;
        assert_eq!(decrypt(&sealed.ciphertext, "p", &other_iv), Err(EnvelopeError::AuthenticationFailure));
    }

    #[test]
    fn truncated_ciphertext_is_rejected() {
        let sealed = encrypt_with(b"secret", "p", IV, SALT, "f", "").unwrap();
        assert_eq!(decrypt(&sealed.ciphertext[..4], "p", &sealed.envelope), Err(EnvelopeError::AuthenticationFailure));
    }

    #[test]
    fn unknown_algorithm_is_refused() {
        let sealed = encrypt_with(b"secret", "p", IV, SALT, "f", "").unwrap();
        let mut envelope = sealed.envelope.clone();
        envelope.algorithm = "XOR".to_string();
        assert_eq!(
            decrypt(&sealed.ciphertext, "p", &envelope),
            Err(EnvelopeError::UnsupportedAlgorithm("XOR".to_string()))
        );
    }

    #[test]
    fn parses_browser_envelope_json() {
        let json = r#"{"iv":[1,2,3,4,5,6,7,8,9,10,11,12],"salt":[0,1,2,3,4,5,6,7,8,9,10,11,12,13,14,255],"originalName":"will.pdf","type":"application/pdf"}"#;
        let envelope = Envelope::from_json(json).unwrap();
        assert_eq!(envelope.iv[11], 12);
        assert_eq!(envelope.salt[15], 255);
        assert_eq!(envelope.original_name, "will.pdf");
        assert_eq!(envelope.mime_type, "application/pdf");
        assert_eq!(envelope.algorithm, ALGORITHM);
    }

    #[test]
    fn json_uses_integer_arrays_and_camel_case_names() {
        let sealed = encrypt_with(b"x", "p", IV, SALT, "a.txt", "text/plain").unwrap();
        let value: serde_json::Value = serde_json::from_str(&sealed.envelope.to_json().unwrap()).unwrap();
        assert_eq!(value["iv"].as_array().unwrap().len(), IV_LEN);
        assert_eq!(value["salt"][0], 42);
        assert_eq!(value["originalName"], "a.txt");
        assert_eq!(value["type"], "text/plain");
        assert_eq!(Envelope::from_json(&sealed.envelope.to_json().unwrap()).unwrap(), sealed.envelope);
    }

    #[test]
    fn rejects_short_iv_and_out_of_range_bytes() {
        let short_iv = r#"{"iv":[1,2,3],"salt":[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],"originalName":"f","type":""}"#;
        assert!(matches!(Envelope::from_json(short_iv), Err(EnvelopeError::InvalidEnvelope(_))));

        let big_byte = r#"{"iv":[256,0,0,0,0,0,0,0,0,0,0,0],"salt":[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],"originalName":"f","type":""}"#;
        assert!(matches!(Envelope::from_json(big_byte), Err(EnvelopeError::InvalidEnvelope(_))));
    }
}
