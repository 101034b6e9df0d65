// src/backend/api.rs
// Candid API endpoint definitions (query/update functions)

use crate::{
    adapter::BoundLedger,
    error::VaultError,
    metrics::{self, LegacyMetrics},
    models::common::*,
    models::did_record::DidRecord,
    models::ledger_event::{LedgerEvent, LedgerReceipt},
    models::legacy_state::LegacyStatusView,
    models::vault_file::FileReference,
    services::{
        anchor_service, did_service, file_service, ledger_service,
        coordinator::Coordinator,
        scheduler::{self, AnchorSweepReport},
    },
    storage::config::get_config,
    utils::guards::{check_cycles, owner_guard},
    utils::rate_limit::rate_guard,
    utils::time::get_current_time_secs,
};
use candid::{CandidType, Deserialize, Principal};
use ic_cdk::caller;
use ic_cdk_macros::{query, update};
use validator::Validate;

// --- Validation Helper ---
fn validate_request<T: Validate>(req: &T) -> Result<(), VaultError> {
    req.validate().map_err(|e| VaultError::InvalidInput(e.to_string()))
}

/// Coordinator bound to the configured ledger, acting for the current caller.
fn coordinator() -> Coordinator<BoundLedger> {
    let config = get_config();
    let ledger = BoundLedger::new(config.ledger, caller(), get_current_time_secs());
    Coordinator::new(ledger, &config)
}

// --- Request/Response Structs ---

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct RegisterFileRequest {
    #[validate(length(min = 1, max = 64))]
    pub owner_did: Did,
    #[validate(length(min = 1, max = 512))]
    pub storage_ref: String,
    /// `{ "iv": [..], "salt": [..], "originalName": .., "type": .. }`
    #[validate(length(min = 1, max = 4096))]
    pub envelope_json: String,
    #[validate(length(min = 1, max = 128))]
    pub cid: Option<String>,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct RecordCidRequest {
    #[validate(length(min = 1, max = 64))]
    pub file_id: FileId,
    #[validate(length(min = 1, max = 128))]
    pub cid: String,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct EventsPageRequest {
    pub from: Sequence,
    #[validate(range(min = 1, max = 100))]
    pub limit: u32,
}

// ==================================
// == Ledger Endpoints ==
// ==================================
// The vault ledger state held by this canister. A coordinator bound to a
// remote ledger calls these on the remote canister.

#[update(guard = "rate_guard")]
fn register_heirs(heirs: Vec<Principal>) -> Result<LedgerReceipt, VaultError> {
    check_cycles()?;
    ledger_service::register_heirs(caller(), heirs, get_current_time_secs())
}

#[update(guard = "rate_guard")]
fn set_unlock_timestamp(unlock_timestamp: Timestamp) -> Result<LedgerReceipt, VaultError> {
    check_cycles()?;
    ledger_service::set_unlock_timestamp(caller(), unlock_timestamp, get_current_time_secs())
}

#[update(guard = "rate_guard")]
fn mark_deceased() -> Result<LedgerReceipt, VaultError> {
    check_cycles()?;
    ledger_service::mark_deceased(caller(), get_current_time_secs())
}

#[update(guard = "rate_guard")]
fn register_validator(validator: Principal) -> Result<LedgerReceipt, VaultError> {
    check_cycles()?;
    ledger_service::register_validator(caller(), validator, get_current_time_secs())
}

#[update(guard = "rate_guard")]
fn set_file_cid(file_key: FileKey, cid: String) -> Result<LedgerReceipt, VaultError> {
    check_cycles()?;
    anchor_service::set_file_cid(caller(), file_key, cid, get_current_time_secs())
}

#[query]
fn can_access(address: Principal) -> bool {
    ledger_service::can_access(&address, get_current_time_secs())
}

#[query]
fn is_validator(address: Principal) -> bool {
    ledger_service::is_validator(&address)
}

#[query]
fn get_file_cid(file_key: FileKey) -> Option<String> {
    anchor_service::get_file_cid(&file_key)
}

#[query]
fn get_legacy_status() -> Result<LegacyStatusView, VaultError> {
    ledger_service::get_legacy_status(get_current_time_secs())
}

#[query]
fn list_validators() -> Vec<Principal> {
    ledger_service::list_validators()
}

#[query(guard = "owner_guard")]
fn list_heirs() -> Vec<Principal> {
    ledger_service::list_heirs()
}

#[query]
fn get_ledger_events(req: EventsPageRequest) -> Result<Vec<LedgerEvent>, VaultError> {
    validate_request(&req)?;
    Ok(ledger_service::get_ledger_events(req.from, req.limit))
}

#[query]
fn verify_event_chain() -> Result<u64, VaultError> {
    ledger_service::verify_event_chain()
}

// ==================================
// == Coordinator Endpoints ==
// ==================================

#[update(guard = "rate_guard")]
fn register_did() -> Result<DidRecord, VaultError> {
    check_cycles()?;
    did_service::register_did(caller(), get_current_time_secs())
}

#[query]
fn list_dids() -> Result<Vec<DidRecord>, VaultError> {
    did_service::list_dids(caller())
}

#[update(guard = "rate_guard")]
fn register_file(req: RegisterFileRequest) -> Result<FileReference, VaultError> {
    validate_request(&req)?;
    check_cycles()?;
    file_service::register_file(
        caller(),
        req.owner_did,
        req.storage_ref,
        &req.envelope_json,
        req.cid,
        get_current_time_secs(),
    )
}

#[update(guard = "rate_guard")]
fn record_file_cid(req: RecordCidRequest) -> Result<FileReference, VaultError> {
    validate_request(&req)?;
    file_service::record_file_cid(caller(), &req.file_id, &req.cid)
}

#[query]
fn list_files(owner_did: Did) -> Result<Vec<FileReference>, VaultError> {
    file_service::list_files(caller(), &owner_did)
}

#[update(guard = "rate_guard")]
async fn request_anchor(file_id: FileId) -> Result<FileReference, VaultError> {
    check_cycles()?;
    coordinator().request_anchor(caller(), &file_id).await
}

/// Files the caller may fetch as an heir; empty while the vault is locked.
#[update(guard = "rate_guard")]
async fn list_accessible_files() -> Result<Vec<FileReference>, VaultError> {
    coordinator().list_accessible_files(caller()).await
}

#[update(guard = "rate_guard")]
async fn get_accessible_file(file_id: FileId) -> Result<FileReference, VaultError> {
    coordinator().get_accessible_file(caller(), &file_id).await
}

#[update(guard = "rate_guard")]
async fn register_heir(heir: Principal) -> Result<LedgerReceipt, VaultError> {
    check_cycles()?;
    coordinator().register_heir(caller(), heir).await
}

#[update(guard = "rate_guard")]
async fn schedule_unlock(unlock_timestamp: Timestamp) -> Result<LedgerReceipt, VaultError> {
    check_cycles()?;
    coordinator().schedule_unlock(caller(), unlock_timestamp).await
}

#[update(guard = "rate_guard")]
async fn add_validator(validator: Principal) -> Result<LedgerReceipt, VaultError> {
    check_cycles()?;
    coordinator().add_validator(caller(), validator).await
}

#[update(guard = "rate_guard")]
async fn notify_death() -> Result<LedgerReceipt, VaultError> {
    check_cycles()?;
    coordinator().notify_death(caller()).await
}

#[update]
async fn get_death_status() -> Result<LegacyStatusView, VaultError> {
    coordinator().legacy_status().await
}

#[update(guard = "owner_guard")]
async fn run_anchor_retry() -> AnchorSweepReport {
    scheduler::retry_pending_anchors(&coordinator(), get_current_time_secs()).await
}

#[query(guard = "owner_guard")]
fn get_metrics() -> LegacyMetrics {
    metrics::get_legacy_metrics()
}
