// src/envelope/src/lib.rs
//! Client-side encryption for legacy vault files.
//!
//! Files are sealed with AES-256-GCM under a key derived from the owner's
//! passphrase (PBKDF2-HMAC-SHA-256). The [`Envelope`] carries the non-secret
//! parameters needed to reverse the operation and is stored next to the
//! ciphertext. There is no recovery path without the passphrase.

pub mod content;
pub mod envelope;
pub mod error;

pub use content::{content_id, matches_content_id};
pub use envelope::{decrypt, encrypt, encrypt_with, Envelope, Sealed, ALGORITHM, IV_LEN, KDF_ITERATIONS, SALT_LEN, TAG_LEN};
pub use error::EnvelopeError;
