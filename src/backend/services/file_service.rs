// src/backend/services/file_service.rs
// Off-chain file records registered by the owner. No ciphertext is ever stored here.

use crate::error::VaultError;
use crate::metrics;
use crate::models::common::{Address, Did, FileId, Timestamp};
use crate::models::vault_file::{EnvelopeMeta, FileReference, VaultFile};
use crate::services::{anchor_service, did_service};
use crate::storage::{counter, files};
use crate::utils::crypto::{derive_file_id, file_key_for};
use crate::utils::guards::check_owner;
use crate::utils::log;

pub const MAX_STORAGE_REF_LEN: usize = 512;

fn validate_cid(cid: &str) -> Result<String, VaultError> {
    let cid = cid.trim();
    if cid.is_empty() || cid.len() > anchor_service::MAX_CID_LEN {
        return Err(VaultError::InvalidInput("Cid is empty or too long".to_string()));
    }
    Ok(cid.to_string())
}

/// Registers a file uploaded by the owner. `envelope_json` is the metadata
/// object written next to the ciphertext.
pub fn register_file(
    caller: Address,
    owner_did: Did,
    storage_ref: String,
    envelope_json: &str,
    cid: Option<String>,
    now: Timestamp,
) -> Result<FileReference, VaultError> {
    check_owner(caller)?;
    if !did_service::is_registered(&owner_did) {
        return Err(VaultError::NotFound(format!("DID {} is not registered", owner_did)));
    }
    if storage_ref.trim().is_empty() || storage_ref.len() > MAX_STORAGE_REF_LEN {
        return Err(VaultError::InvalidInput("Storage reference is empty or too long".to_string()));
    }
    let envelope = EnvelopeMeta::from_json(envelope_json)?;
    let cid = cid.as_deref().map(validate_cid).transpose()?;

    let seq = counter::next_id().map_err(VaultError::StorageError)?;
    let id = derive_file_id(&caller, seq, now);
    if files::contains_file(&id) {
        return Err(VaultError::InternalError(format!("File id collision for {}", id)));
    }

    let file = VaultFile {
        id,
        owner_did,
        storage_ref,
        envelope,
        cid,
        content_hash: None,
        anchored: false,
        anchor_tx_hash: None,
        anchor_attempts: 0,
        anchor_last_error: None,
        anchor_retry_pending: false,
        created_at: now,
    };
    files::insert_file(&file);
    metrics::record_file_registered();
    log::info(format!("Registered file {} for {}", file.id, file.owner_did));
    Ok(file.to_reference())
}

/// Records the off-chain cid of a file that is not anchored yet. Once this
/// canister's ledger binds the file key, the cid is frozen.
pub fn record_file_cid(caller: Address, file_id: &FileId, cid: &str) -> Result<FileReference, VaultError> {
    check_owner(caller)?;
    let mut file = get_file(file_id)?;
    let file_key = file_key_for(file_id);
    if anchor_service::get_file_cid(&file_key).is_some() {
        return Err(VaultError::AlreadyAnchored(file_key));
    }
    file.record_cid(validate_cid(cid)?)?;
    files::insert_file(&file);
    Ok(file.to_reference())
}

/// Owner-side listing of the files filed under one DID.
pub fn list_files(caller: Address, owner_did: &str) -> Result<Vec<FileReference>, VaultError> {
    check_owner(caller)?;
    Ok(files::list_files(|file| file.owner_did == owner_did)
        .iter()
        .map(VaultFile::to_reference)
        .collect())
}

pub fn get_file(file_id: &FileId) -> Result<VaultFile, VaultError> {
    files::get_file(file_id).ok_or_else(|| VaultError::NotFound(format!("File {} not found", file_id)))
}

pub fn save_file(file: &VaultFile) {
    files::insert_file(file);
}

pub fn all_files() -> Vec<VaultFile> {
    files::list_files(|_| true)
}

pub fn files_awaiting_anchor_retry() -> Vec<VaultFile> {
    files::list_files(VaultFile::awaiting_anchor_retry)
}
