// src/backend/adapter/mod.rs
pub mod canister_ledger;
pub mod ledger_client;
pub mod local_ledger;

pub use canister_ledger::CanisterLedger;
pub use ledger_client::{with_retries, LedgerClient, RetryPolicy};
pub use local_ledger::LocalLedger;

use crate::error::VaultError;
use crate::models::common::{Address, FileKey, LedgerBinding, Timestamp};
use crate::models::ledger_event::LedgerReceipt;
use crate::models::legacy_state::LegacyStatusView;

/// The ledger client selected by the canister's `LedgerBinding`.
#[derive(Clone, Copy, Debug)]
pub enum BoundLedger {
    Local(LocalLedger),
    Canister(CanisterLedger),
}

impl BoundLedger {
    pub fn new(binding: LedgerBinding, caller: Address, now: Timestamp) -> Self {
        match binding {
            LedgerBinding::Local => BoundLedger::Local(LocalLedger::new(caller, now)),
            LedgerBinding::Canister(canister_id) => BoundLedger::Canister(CanisterLedger::new(canister_id)),
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $method:ident ( $($arg:expr),* )) => {
        match $self {
            BoundLedger::Local(ledger) => ledger.$method($($arg),*).await,
            BoundLedger::Canister(ledger) => ledger.$method($($arg),*).await,
        }
    };
}

impl LedgerClient for BoundLedger {
    async fn register_heirs(&self, heirs: Vec<Address>) -> Result<LedgerReceipt, VaultError> {
        dispatch!(self, register_heirs(heirs))
    }

    async fn set_unlock_timestamp(&self, unlock_timestamp: Timestamp) -> Result<LedgerReceipt, VaultError> {
        dispatch!(self, set_unlock_timestamp(unlock_timestamp))
    }

    async fn mark_deceased(&self) -> Result<LedgerReceipt, VaultError> {
        dispatch!(self, mark_deceased())
    }

    async fn register_validator(&self, validator: Address) -> Result<LedgerReceipt, VaultError> {
        dispatch!(self, register_validator(validator))
    }

    async fn set_file_cid(&self, file_key: FileKey, cid: String) -> Result<LedgerReceipt, VaultError> {
        dispatch!(self, set_file_cid(file_key, cid))
    }

    async fn can_access(&self, address: Address) -> Result<bool, VaultError> {
        dispatch!(self, can_access(address))
    }

    async fn is_validator(&self, address: Address) -> Result<bool, VaultError> {
        dispatch!(self, is_validator(address))
    }

    async fn get_file_cid(&self, file_key: FileKey) -> Result<Option<String>, VaultError> {
        dispatch!(self, get_file_cid(file_key))
    }

    async fn get_legacy_status(&self) -> Result<LegacyStatusView, VaultError> {
        dispatch!(self, get_legacy_status())
    }
}
