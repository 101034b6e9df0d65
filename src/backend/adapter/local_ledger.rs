// src/backend/adapter/local_ledger.rs
// Ledger client for the state held by this canister.

use crate::adapter::ledger_client::LedgerClient;
use crate::error::VaultError;
use crate::models::common::{Address, FileKey, Timestamp};
use crate::models::ledger_event::LedgerReceipt;
use crate::models::legacy_state::LegacyStatusView;
use crate::services::{anchor_service, ledger_service};

/// Submits writes as `caller` at time `now`, both taken from the current message.
#[derive(Clone, Copy, Debug)]
pub struct LocalLedger {
    pub caller: Address,
    pub now: Timestamp,
}

impl LocalLedger {
    pub fn new(caller: Address, now: Timestamp) -> Self {
        Self { caller, now }
    }
}

impl LedgerClient for LocalLedger {
    async fn register_heirs(&self, heirs: Vec<Address>) -> Result<LedgerReceipt, VaultError> {
        ledger_service::register_heirs(self.caller, heirs, self.now)
    }

    async fn set_unlock_timestamp(&self, unlock_timestamp: Timestamp) -> Result<LedgerReceipt, VaultError> {
        ledger_service::set_unlock_timestamp(self.caller, unlock_timestamp, self.now)
    }

    async fn mark_deceased(&self) -> Result<LedgerReceipt, VaultError> {
        ledger_service::mark_deceased(self.caller, self.now)
    }

    async fn register_validator(&self, validator: Address) -> Result<LedgerReceipt, VaultError> {
        ledger_service::register_validator(self.caller, validator, self.now)
    }

    async fn set_file_cid(&self, file_key: FileKey, cid: String) -> Result<LedgerReceipt, VaultError> {
        anchor_service::set_file_cid(self.caller, file_key, cid, self.now)
    }

    async fn can_access(&self, address: Address) -> Result<bool, VaultError> {
        Ok(ledger_service::can_access(&address, self.now))
    }

    async fn is_validator(&self, address: Address) -> Result<bool, VaultError> {
        Ok(ledger_service::is_validator(&address))
    }

    async fn get_file_cid(&self, file_key: FileKey) -> Result<Option<String>, VaultError> {
        Ok(anchor_service::get_file_cid(&file_key))
    }

    async fn get_legacy_status(&self) -> Result<LegacyStatusView, VaultError> {
        ledger_service::get_legacy_status(self.now)
    }
}
