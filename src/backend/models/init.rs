use crate::models::common::{AttestationPolicy, LedgerBinding};
use candid::{CandidType, Principal};
use serde::Deserialize;

#[derive(CandidType, Deserialize, Debug, Clone)]
pub struct InitArgs {
    pub owner: Principal,
    pub ledger: Option<LedgerBinding>,
    pub attestation_policy: Option<AttestationPolicy>,
    pub max_ledger_attempts: Option<u8>,
    pub anchor_retry_interval_secs: Option<u64>,
    pub min_cycles_threshold: Option<u128>,
    /// Coordinator canister forwarding to this ledger; it holds the file records.
    pub coordinator: Option<Principal>,
}
