// src/backend/adapter/canister_ledger.rs
// Ledger client for a vault ledger deployed in another canister. The remote
// ledger sees this canister as the caller, so it must be installed with this
// canister's principal as both its owner and its coordinator.

use crate::adapter::ledger_client::LedgerClient;
use crate::error::VaultError;
use crate::models::common::{Address, FileKey, Timestamp};
use crate::models::ledger_event::LedgerReceipt;
use crate::models::legacy_state::LegacyStatusView;
use crate::utils::log;
use candid::utils::{ArgumentDecoder, ArgumentEncoder};
use candid::{CandidType, Principal};
use ic_cdk::api::call::RejectionCode;
use serde::de::DeserializeOwned;

#[derive(Clone, Copy, Debug)]
pub struct CanisterLedger {
    pub canister_id: Principal,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Read,
    Write,
}

/// Maps a failed inter-canister call to the ledger error taxonomy. System
/// rejections mean the ledger was not reached. A trap or explicit reject
/// while executing a write means it was received but not committed.
fn map_rejection(kind: CallKind, method: &str, code: RejectionCode, message: String) -> VaultError {
    let detail = format!("{} rejected with {:?}: {}", method, code, message);
    match code {
        RejectionCode::CanisterError | RejectionCode::CanisterReject if kind == CallKind::Write => {
            VaultError::LedgerWriteFailed(detail)
        }
        _ => VaultError::LedgerUnavailable(detail),
    }
}

impl CanisterLedger {
    pub fn new(canister_id: Principal) -> Self {
        Self { canister_id }
    }

    async fn raw_call<A, R>(&self, kind: CallKind, method: &str, args: A) -> Result<R, VaultError>
    where
        A: ArgumentEncoder,
        R: for<'a> ArgumentDecoder<'a>,
    {
        let response: Result<R, (RejectionCode, String)> = ic_cdk::call(self.canister_id, method, args).await;
        response.map_err(|(code, message)| {
            log::warn(format!("Ledger canister {} call {} failed", self.canister_id, method));
            map_rejection(kind, method, code, message)
        })
    }

    /// Calls an endpoint returning `Result<T, VaultError>`.
    async fn call<A, T>(&self, kind: CallKind, method: &str, args: A) -> Result<T, VaultError>
    where
        A: ArgumentEncoder,
        T: CandidType + DeserializeOwned,
    {
        let (result,): (Result<T, VaultError>,) = self.raw_call(kind, method, args).await?;
        result
    }

    /// Calls a read endpoint returning a bare value.
    async fn read<A, T>(&self, method: &str, args: A) -> Result<T, VaultError>
    where
        A: ArgumentEncoder,
        T: CandidType + DeserializeOwned,
    {
        let (value,): (T,) = self.raw_call(CallKind::Read, method, args).await?;
        Ok(value)
    }
}

impl LedgerClient for CanisterLedger {
    async fn register_heirs(&self, heirs: Vec<Address>) -> Result<LedgerReceipt, VaultError> {
        self.call(CallKind::Write, "register_heirs", (heirs,)).await
    }

    async fn set_unlock_timestamp(&self, unlock_timestamp: Timestamp) -> Result<LedgerReceipt, VaultError> {
        self.call(CallKind::Write, "set_unlock_timestamp", (unlock_timestamp,)).await
    }

    async fn mark_deceased(&self) -> Result<LedgerReceipt, VaultError> {
        self.call(CallKind::Write, "mark_deceased", ()).await
    }

    async fn register_validator(&self, validator: Address) -> Result<LedgerReceipt, VaultError> {
        self.call(CallKind::Write, "register_validator", (validator,)).await
    }

    async fn set_file_cid(&self, file_key: FileKey, cid: String) -> Result<LedgerReceipt, VaultError> {
        self.call(CallKind::Write, "set_file_cid", (file_key, cid)).await
    }

    async fn can_access(&self, address: Address) -> Result<bool, VaultError> {
        self.read("can_access", (address,)).await
    }

    async fn is_validator(&self, address: Address) -> Result<bool, VaultError> {
        self.read("is_validator", (address,)).await
    }

    async fn get_file_cid(&self, file_key: FileKey) -> Result<Option<String>, VaultError> {
        self.read("get_file_cid", (file_key,)).await
    }

    async fn get_legacy_status(&self) -> Result<LegacyStatusView, VaultError> {
        self.call(CallKind::Read, "get_legacy_status", ()).await
    }
}
