// src/backend/metrics.rs
use crate::storage::{get_metrics, update_metrics};
use crate::utils::log;
use candid::{CandidType, Deserialize};
use serde::Serialize;

#[derive(CandidType, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct LegacyMetrics {
    pub files_registered: u64,
    pub anchors_confirmed: u64,
    pub anchor_failures: u64,
    pub ledger_retries: u64,
    pub access_checks: u64,
    pub access_grants: u64,
    pub anchor_retry_last_run: Option<u64>, // Epoch seconds of last retry sweep
}

// Metrics are best effort: a failed update is logged, never surfaced.
fn record<F>(update_fn: F)
where
    F: FnOnce(&mut LegacyMetrics),
{
    if let Err(e) = update_metrics(update_fn) {
        log::warn(format!("Metrics update failed: {}", e));
    }
}

pub fn record_file_registered() {
    record(|m| m.files_registered = m.files_registered.saturating_add(1));
}

pub fn record_anchor_confirmed() {
    record(|m| m.anchors_confirmed = m.anchors_confirmed.saturating_add(1));
}

pub fn record_anchor_failure() {
    record(|m| m.anchor_failures = m.anchor_failures.saturating_add(1));
}

pub fn record_ledger_retry() {
    record(|m| m.ledger_retries = m.ledger_retries.saturating_add(1));
}

pub fn record_access_check(granted: bool) {
    record(|m| {
        m.access_checks = m.access_checks.saturating_add(1);
        if granted {
            m.access_grants = m.access_grants.saturating_add(1);
        }
    });
}

pub fn record_anchor_retry_run(now: u64) {
    record(|m| m.anchor_retry_last_run = Some(now));
}

pub fn get_legacy_metrics() -> LegacyMetrics {
    get_metrics()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_checks_count_grants_separately() {
        record_access_check(false);
        record_access_check(true);
        record_access_check(true);
        let metrics = get_legacy_metrics();
        assert_eq!(metrics.access_checks, 3);
        assert_eq!(metrics.access_grants, 2);
    }
}
