// src/backend/storage/config.rs
use crate::models::common::{AttestationPolicy, LedgerBinding};
use crate::models::init::InitArgs;
use crate::storage::memory::{get_config_memory, Memory};
use crate::storage::storable::Cbor;
use candid::{CandidType, Principal};
use ic_stable_structures::StableCell;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

// Default values (used if init args omit them or the cell is uninitialized)
const DEFAULT_MAX_LEDGER_ATTEMPTS: u8 = 3;
const DEFAULT_ANCHOR_RETRY_INTERVAL_SECS: u64 = 60 * 60;
const DEFAULT_MIN_CYCLES_THRESHOLD: u128 = 10_000_000_000; // 10B cycles

#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LegacyConfig {
    pub owner: Principal,
    pub ledger: LedgerBinding,
    pub attestation_policy: AttestationPolicy,
    pub max_ledger_attempts: u8,
    pub anchor_retry_interval_secs: u64,
    pub min_cycles_threshold: u128,
    pub coordinator: Option<Principal>,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            owner: Principal::anonymous(),
            ledger: LedgerBinding::Local,
            attestation_policy: AttestationPolicy::OwnerOnly,
            max_ledger_attempts: DEFAULT_MAX_LEDGER_ATTEMPTS,
            anchor_retry_interval_secs: DEFAULT_ANCHOR_RETRY_INTERVAL_SECS,
            min_cycles_threshold: DEFAULT_MIN_CYCLES_THRESHOLD,
            coordinator: None,
        }
    }
}

impl From<InitArgs> for LegacyConfig {
    fn from(args: InitArgs) -> Self {
        let defaults = LegacyConfig::default();
        Self {
            owner: args.owner,
            ledger: args.ledger.unwrap_or(defaults.ledger),
            attestation_policy: args.attestation_policy.unwrap_or(defaults.attestation_policy),
            max_ledger_attempts: args.max_ledger_attempts.unwrap_or(defaults.max_ledger_attempts).max(1),
            anchor_retry_interval_secs: args
                .anchor_retry_interval_secs
                .unwrap_or(defaults.anchor_retry_interval_secs),
            min_cycles_threshold: args.min_cycles_threshold.unwrap_or(defaults.min_cycles_threshold),
            coordinator: args.coordinator,
        }
    }
}

thread_local! {
    static CONFIG: RefCell<StableCell<Cbor<LegacyConfig>, Memory>> = RefCell::new(
        StableCell::init(get_config_memory(), Cbor(LegacyConfig::default()))
            .expect("Failed to initialize config stable cell")
    );
}

/// Stores the configuration. Called from canister init only.
pub fn init_config(config: LegacyConfig) -> Result<(), String> {
    CONFIG.with(|cell| {
        cell.borrow_mut()
            .set(Cbor(config))
            .map(|_| ())
            .map_err(|e| format!("Failed to store config: {:?}", e))
    })
}

pub fn get_config() -> LegacyConfig {
    CONFIG.with(|cell| cell.borrow().get().0.clone())
}
