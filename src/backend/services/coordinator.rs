// src/backend/services/coordinator.rs
//! Heir-facing composition of the ledger, the anchor registry and the file
//! records. The Coordinator holds no key material: it only decides which
//! file references a caller may see and pushes owner writes to the ledger.

use crate::adapter::{with_retries, LedgerClient, RetryPolicy};
use crate::error::VaultError;
use crate::metrics;
use crate::models::common::{Address, AttestationPolicy, FileId, FileKey, Timestamp};
use crate::models::ledger_event::LedgerReceipt;
use crate::models::legacy_state::LegacyStatusView;
use crate::models::vault_file::FileReference;
use crate::services::file_service;
use crate::storage::config::LegacyConfig;
use crate::utils::crypto::file_key_for;
use crate::utils::log;

pub struct Coordinator<L: LedgerClient> {
    ledger: L,
    retry: RetryPolicy,
    owner: Address,
    attestation_policy: AttestationPolicy,
}

impl<L: LedgerClient> Coordinator<L> {
    pub fn new(ledger: L, config: &LegacyConfig) -> Self {
        Self {
            ledger,
            retry: RetryPolicy::new(config.max_ledger_attempts),
            owner: config.owner,
            attestation_policy: config.attestation_policy,
        }
    }

    fn ensure_owner(&self, caller: Address, action: &str) -> Result<(), VaultError> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(VaultError::Unauthorized(format!(
                "Caller {} is not the vault owner and cannot {}",
                caller, action
            )))
        }
    }

    async fn ensure_may_attest(&self, caller: Address) -> Result<(), VaultError> {
        if caller == self.owner {
            return Ok(());
        }
        if self.attestation_policy == AttestationPolicy::OwnerOrValidator
            && with_retries(self.retry, "is_validator", || self.ledger.is_validator(caller)).await?
        {
            return Ok(());
        }
        Err(VaultError::Unauthorized(format!(
            "Caller {} may not attest death under policy {:?}",
            caller, self.attestation_policy
        )))
    }

    /// Asks the ledger whether `heir` may access files now. A ledger failure
    /// is returned as an error, never as "granted".
    pub async fn can_access(&self, heir: Address) -> Result<bool, VaultError> {
        let granted = with_retries(self.retry, "can_access", || self.ledger.can_access(heir)).await?;
        metrics::record_access_check(granted);
        Ok(granted)
    }

    /// Every file reference of the vault if `heir` may access them, else none.
    pub async fn list_accessible_files(&self, heir: Address) -> Result<Vec<FileReference>, VaultError> {
        if !self.can_access(heir).await? {
            return Ok(Vec::new());
        }
        Ok(file_service::all_files().iter().map(|file| file.to_reference()).collect())
    }

    pub async fn get_accessible_file(&self, heir: Address, file_id: &FileId) -> Result<FileReference, VaultError> {
        if !self.can_access(heir).await? {
            return Err(VaultError::Unauthorized(format!(
                "Address {} may not access vault files yet",
                heir
            )));
        }
        file_service::get_file(file_id).map(|file| file.to_reference())
    }

    /// Anchors the recorded cid of an owner's file on the ledger.
    pub async fn request_anchor(&self, caller: Address, file_id: &FileId) -> Result<FileReference, VaultError> {
        self.ensure_owner(caller, "anchor files")?;
        self.anchor_file(file_id).await
    }

    async fn ledger_holds(&self, file_key: &FileKey, cid: &str) -> bool {
        matches!(
            self.ledger.get_file_cid(file_key.clone()).await,
            Ok(Some(existing)) if existing == cid
        )
    }

    /// Submits the anchor and flips `anchored` only on a confirmed write.
    /// On failure the file stays unanchored and the error is recorded on it.
    pub(crate) async fn anchor_file(&self, file_id: &FileId) -> Result<FileReference, VaultError> {
        let file = file_service::get_file(file_id)?;
        let file_key = file_key_for(&file.id);
        if file.anchored {
            return Err(VaultError::AlreadyAnchored(file_key));
        }
        let cid = file
            .cid
            .clone()
            .ok_or_else(|| VaultError::NotFound(format!("File {} has no recorded cid to anchor", file.id)))?;

        log::info(format!("Anchoring file {} (key {}) with cid {}", file.id, file_key, cid));
        let outcome = with_retries(self.retry, "set_file_cid", || {
            self.ledger.set_file_cid(file_key.clone(), cid.clone())
        })
        .await;

        let tx_hash = match outcome {
            Ok(receipt) => Some(receipt.tx_hash),
            Err(e) => {
                // An earlier submission may have landed with its response lost.
                if matches!(e, VaultError::AlreadyAnchored(_)) && self.ledger_holds(&file_key, &cid).await {
                    log::info(format!("Ledger already holds cid {} for file {}", cid, file.id));
                    None
                } else {
                    let mut file = file_service::get_file(file_id)?;
                    if !file.anchored {
                        file.record_anchor_failure(&e);
                        file_service::save_file(&file);
                    }
                    metrics::record_anchor_failure();
                    log::warn(format!("Anchor of file {} failed: {}", file_id, e));
                    return Err(e);
                }
            }
        };

        // Re-read: a concurrent anchor of the same file may have finished first.
        let mut file = file_service::get_file(file_id)?;
        if !file.anchored {
            file.mark_anchored(cid, tx_hash)?;
            file_service::save_file(&file);
            metrics::record_anchor_confirmed();
        }
        Ok(file.to_reference())
    }

    pub async fn register_heir(&self, caller: Address, heir: Address) -> Result<LedgerReceipt, VaultError> {
        self.ensure_owner(caller, "register heirs")?;
        with_retries(self.retry, "register_heirs", || self.ledger.register_heirs(vec![heir])).await
    }

    pub async fn schedule_unlock(&self, caller: Address, unlock_timestamp: Timestamp) -> Result<LedgerReceipt, VaultError> {
        self.ensure_owner(caller, "set the unlock timestamp")?;
        with_retries(self.retry, "set_unlock_timestamp", || {
            self.ledger.set_unlock_timestamp(unlock_timestamp)
        })
        .await
    }

    pub async fn add_validator(&self, caller: Address, validator: Address) -> Result<LedgerReceipt, VaultError> {
        self.ensure_owner(caller, "register validators")?;
        with_retries(self.retry, "register_validator", || self.ledger.register_validator(validator)).await
    }

    /// Submits the death attestation. A resubmission that finds the vault
    /// already deceased surfaces `AlreadyDeceased`.
    pub async fn notify_death(&self, caller: Address) -> Result<LedgerReceipt, VaultError> {
        self.ensure_may_attest(caller).await?;
        let receipt = with_retries(self.retry, "mark_deceased", || self.ledger.mark_deceased()).await?;
        log::info(format!("Death attested by {} at ledger sequence {}", caller, receipt.sequence));
        Ok(receipt)
    }

    pub async fn legacy_status(&self) -> Result<LegacyStatusView, VaultError> {
        with_retries(self.retry, "get_legacy_status", || self.ledger.get_legacy_status()).await
    }
}
