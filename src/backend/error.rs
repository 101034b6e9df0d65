// src/backend/error.rs
use candid::CandidType;
use serde::Deserialize;
use thiserror::Error;

#[derive(CandidType, Deserialize, Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Owner is already marked deceased")]
    AlreadyDeceased,

    #[error("File key {0} is already anchored")]
    AlreadyAnchored(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The ledger could not be reached; safe to resubmit.
    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),

    /// The ledger received the write but did not commit it; safe to resubmit.
    #[error("Ledger write failed: {0}")]
    LedgerWriteFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Canister cycle balance too low for operation")]
    CycleLow,

    #[error("Internal canister error: {0}")]
    InternalError(String),
}

impl VaultError {
    /// Ledger-layer failures may be retried by resubmitting the same call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VaultError::LedgerUnavailable(_) | VaultError::LedgerWriteFailed(_))
    }
}
