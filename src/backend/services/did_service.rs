// src/backend/services/did_service.rs
use crate::error::VaultError;
use crate::models::common::{Address, Timestamp};
use crate::models::did_record::DidRecord;
use crate::storage::{counter, dids};
use crate::utils::crypto::derive_did;
use crate::utils::guards::check_owner;
use crate::utils::log;

/// Mints a new owner DID.
pub fn register_did(caller: Address, now: Timestamp) -> Result<DidRecord, VaultError> {
    check_owner(caller)?;
    let seq = counter::next_id().map_err(VaultError::StorageError)?;
    let did = derive_did(&caller, seq, now);
    if dids::is_registered(&did) {
        return Err(VaultError::InternalError(format!("DID collision for {}", did)));
    }
    let record = DidRecord { did, created_at: now };
    dids::insert_did(&record);
    log::info(format!("Registered DID {}", record.did));
    Ok(record)
}

pub fn list_dids(caller: Address) -> Result<Vec<DidRecord>, VaultError> {
    check_owner(caller)?;
    Ok(dids::list_dids())
}

pub fn is_registered(did: &str) -> bool {
    dids::is_registered(did)
}
