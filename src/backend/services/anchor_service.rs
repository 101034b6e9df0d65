// src/backend/services/anchor_service.rs
// One-way file key -> cid bindings, recorded on the ledger log.

use crate::error::VaultError;
use crate::models::common::{Address, FileKey, Timestamp};
use crate::models::ledger_event::{LedgerEventKind, LedgerReceipt};
use crate::services::ledger_service;
use crate::storage::config::get_config;
use crate::storage::{anchors, files};
use crate::utils::crypto::is_valid_file_key;
use crate::utils::log;

pub const MAX_CID_LEN: usize = 128;

/// Binds `file_key` to `cid`. Owner only; a key can be bound exactly once,
/// a second call fails with `AlreadyAnchored` whatever the cid. The cid must
/// be the one recorded on the file, unless the call is forwarded by the
/// configured Coordinator canister, which holds the file records itself.
pub fn set_file_cid(caller: Address, file_key: FileKey, cid: String, now: Timestamp) -> Result<LedgerReceipt, VaultError> {
    let owner = ledger_service::owner()?;
    if caller != owner {
        return Err(VaultError::Unauthorized(format!(
            "Caller {} is not the vault owner and cannot anchor files",
            caller
        )));
    }
    if !is_valid_file_key(&file_key) {
        return Err(VaultError::InvalidInput(format!(
            "File key must be 64 lowercase hex characters, got '{}'",
            file_key
        )));
    }
    let cid = cid.trim().to_string();
    if cid.is_empty() || cid.len() > MAX_CID_LEN {
        return Err(VaultError::InvalidInput(format!(
            "Cid must be 1 to {} characters",
            MAX_CID_LEN
        )));
    }
    if let Some(existing) = anchors::get_cid(&file_key) {
        log::warn(format!(
            "Rejected re-anchor of {} (bound to {}, offered {})",
            file_key, existing, cid
        ));
        return Err(VaultError::AlreadyAnchored(file_key));
    }
    if get_config().coordinator != Some(caller) {
        ensure_recorded(&file_key, &cid)?;
    }

    bind_with_event(&file_key, &cid, || {
        ledger_service::append_event(caller, now, LedgerEventKind::FileCidSet { file_key: file_key.clone(), cid: cid.clone() })
    })
}

fn ensure_recorded(file_key: &FileKey, cid: &str) -> Result<(), VaultError> {
    match files::get_file_by_key(file_key) {
        Some(file) if file.cid.as_deref() == Some(cid) => Ok(()),
        Some(file) => Err(VaultError::NotFound(format!(
            "File {} has no recorded cid {}",
            file.id, cid
        ))),
        None => Err(VaultError::NotFound(format!("No file is registered under key {}", file_key))),
    }
}

/// Inserts the binding, then logs it. A failed append removes the binding.
fn bind_with_event<F>(file_key: &FileKey, cid: &str, append: F) -> Result<LedgerReceipt, VaultError>
where
    F: FnOnce() -> Result<LedgerReceipt, VaultError>,
{
    anchors::insert_new(file_key, cid).map_err(|_| VaultError::AlreadyAnchored(file_key.clone()))?;
    append().inspect_err(|e| {
        log::error(format!("Ledger append failed, unbinding {}: {}", file_key, e));
        anchors::remove(file_key);
    })
}

pub fn get_file_cid(file_key: &FileKey) -> Option<String> {
    anchors::get_cid(file_key)
}
