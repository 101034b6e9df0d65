// src/envelope/src/error.rs
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Wrong passphrase, corrupted ciphertext or mismatched envelope.
    #[error("wrong key")]
    AuthenticationFailure,

    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),
}
