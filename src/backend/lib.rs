// src/backend/lib.rs

pub mod adapter;
pub mod api;
pub mod error;
pub mod metrics;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

// Types named in endpoint signatures, in scope for export_candid!
use crate::api::{EventsPageRequest, RecordCidRequest, RegisterFileRequest};
use crate::error::VaultError;
use crate::models::did_record::DidRecord;
use crate::models::ledger_event::{LedgerEvent, LedgerReceipt};
use crate::models::legacy_state::LegacyStatusView;
use crate::models::vault_file::FileReference;
use crate::models::common::*;
use crate::models::init::InitArgs;
use crate::metrics::LegacyMetrics;
use crate::services::{ledger_service, scheduler};
use crate::services::scheduler::AnchorSweepReport;
use crate::storage::config::{init_config, LegacyConfig};
use crate::utils::log;
use crate::utils::time::get_current_time_secs;
use candid::Principal;

#[ic_cdk::init]
fn init(args: InitArgs) {
    let config = LegacyConfig::from(args);
    let (owner, policy) = (config.owner, config.attestation_policy);
    if let Err(e) = init_config(config) {
        ic_cdk::trap(&format!("Failed to store config: {}", e));
    }
    if let Err(e) = ledger_service::genesis(owner, policy, get_current_time_secs()) {
        ic_cdk::trap(&format!("Vault genesis failed: {}", e));
    }
    scheduler::start_anchor_retry_timer();
    log::info("Legacy vault canister initialized.");
}

#[ic_cdk::post_upgrade]
fn post_upgrade() {
    // Stable structures keep config, ledger and files; only timers need restarting.
    scheduler::start_anchor_retry_timer();
    log::info("Legacy vault canister upgraded.");
}

// Export Candid interface
ic_cdk::export_candid!();
