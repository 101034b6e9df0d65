// src/backend/models/vault_file.rs
use crate::error::VaultError;
use crate::models::common::{Did, FileId, Timestamp};
use candid::CandidType;
use serde::{Deserialize, Serialize};

pub const IV_LEN: usize = 12;
pub const SALT_LEN: usize = 16;
pub const DEFAULT_ALGORITHM: &str = "AES-256-GCM+PBKDF2-HMAC-SHA256";

/// Envelope metadata stored next to a ciphertext. The canister only keeps
/// it for heirs; it is not secret and cannot open anything on its own.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EnvelopeMeta {
    #[serde(with = "serde_bytes")]
    pub iv: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub salt: Vec<u8>,
    pub original_name: String,
    pub mime_type: String,
    pub algorithm: String,
}

// Wire shape written by browsers and the envelope crate.
#[derive(Deserialize)]
struct EnvelopeJson {
    iv: Vec<u8>,
    salt: Vec<u8>,
    #[serde(rename = "originalName")]
    original_name: String,
    #[serde(rename = "type", default)]
    mime_type: String,
    algorithm: Option<String>,
}

impl EnvelopeMeta {
    /// Parses `{ "iv": [..], "salt": [..], "originalName": .., "type": .. }`.
    pub fn from_json(json: &str) -> Result<Self, VaultError> {
        let raw: EnvelopeJson = serde_json::from_str(json)
            .map_err(|e| VaultError::InvalidInput(format!("Malformed envelope JSON: {}", e)))?;
        let meta = EnvelopeMeta {
            iv: raw.iv,
            salt: raw.salt,
            original_name: raw.original_name,
            mime_type: raw.mime_type,
            algorithm: raw.algorithm.unwrap_or_else(|| DEFAULT_ALGORITHM.to_string()),
        };
        meta.validate()?;
        Ok(meta)
    }

    pub fn validate(&self) -> Result<(), VaultError> {
        if self.iv.len() != IV_LEN {
            return Err(VaultError::InvalidInput(format!(
                "Envelope iv must be {} bytes, got {}",
                IV_LEN,
                self.iv.len()
            )));
        }
        if self.salt.len() != SALT_LEN {
            return Err(VaultError::InvalidInput(format!(
                "Envelope salt must be {} bytes, got {}",
                SALT_LEN,
                self.salt.len()
            )));
        }
        Ok(())
    }
}

#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VaultFile {
    pub id: FileId,
    pub owner_did: Did,
    /// Opaque pointer into the external blob store.
    pub storage_ref: String,
    pub envelope: EnvelopeMeta,
    /// Content id recorded off-chain, candidate for anchoring.
    pub cid: Option<String>,
    /// Anchored content id; set exactly once together with `anchored`.
    pub content_hash: Option<String>,
    pub anchored: bool,
    pub anchor_tx_hash: Option<String>,
    pub anchor_attempts: u32,
    pub anchor_last_error: Option<String>,
    /// Last failure was a ledger-layer error; the timer may resubmit.
    pub anchor_retry_pending: bool,
    pub created_at: Timestamp,
}

impl VaultFile {
    pub fn record_cid(&mut self, cid: String) -> Result<(), VaultError> {
        if self.anchored {
            return Err(VaultError::InvalidState(format!(
                "File {} is anchored; its cid can no longer change",
                self.id
            )));
        }
        self.cid = Some(cid);
        Ok(())
    }

    /// The single `anchored` false -> true transition. `tx_hash` is None when
    /// the anchor was reconciled from an earlier submission.
    pub fn mark_anchored(&mut self, cid: String, tx_hash: Option<String>) -> Result<(), VaultError> {
        if self.anchored {
            return Err(VaultError::InvalidState(format!("File {} is already anchored", self.id)));
        }
        self.content_hash = Some(cid);
        self.anchored = true;
        self.anchor_tx_hash = tx_hash;
        self.anchor_last_error = None;
        self.anchor_retry_pending = false;
        Ok(())
    }

    pub fn record_anchor_failure(&mut self, error: &VaultError) {
        self.anchor_attempts = self.anchor_attempts.saturating_add(1);
        self.anchor_last_error = Some(error.to_string());
        self.anchor_retry_pending = error.is_retryable();
    }

    /// Anchors that failed on a retryable ledger error and may be resubmitted.
    pub fn awaiting_anchor_retry(&self) -> bool {
        !self.anchored && self.cid.is_some() && self.anchor_retry_pending
    }

    pub fn to_reference(&self) -> FileReference {
        FileReference {
            id: self.id.clone(),
            owner_did: self.owner_did.clone(),
            storage_ref: self.storage_ref.clone(),
            envelope: self.envelope.clone(),
            cid: self.content_hash.clone().or_else(|| self.cid.clone()),
            anchored: self.anchored,
            anchor_tx_hash: self.anchor_tx_hash.clone(),
        }
    }
}

/// File record handed to external collaborators and heirs. Never carries
/// ciphertext.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FileReference {
    pub id: FileId,
    pub owner_did: Did,
    pub storage_ref: String,
    pub envelope: EnvelopeMeta,
    pub cid: Option<String>,
    pub anchored: bool,
    pub anchor_tx_hash: Option<String>,
}
