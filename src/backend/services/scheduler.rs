// src/backend/services/scheduler.rs
// Periodic resubmission of anchors that failed on a ledger-layer error.

use crate::adapter::{BoundLedger, LedgerClient};
use crate::metrics;
use crate::models::common::{LedgerBinding, Timestamp};
use crate::services::coordinator::Coordinator;
use crate::services::file_service;
use crate::storage::config::get_config;
use crate::utils::log;
use candid::CandidType;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::time::Duration;

#[derive(CandidType, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct AnchorSweepReport {
    pub attempted: u32,
    pub anchored: u32,
    pub failed: u32,
}

// Anchors in flight at once during a sweep.
const MAX_CONCURRENT_ANCHORS: usize = 8;

/// Resubmits every anchor awaiting retry, a bounded number at a time.
pub async fn retry_pending_anchors<L: LedgerClient>(coordinator: &Coordinator<L>, now: Timestamp) -> AnchorSweepReport {
    let pending = file_service::files_awaiting_anchor_retry();
    log::info(format!("⚙️ SCHEDULER: Retrying {} pending anchors", pending.len()));

    let results: Vec<_> = stream::iter(pending.iter().map(|file| coordinator.anchor_file(&file.id)))
        .buffer_unordered(MAX_CONCURRENT_ANCHORS)
        .collect()
        .await;

    let mut report = AnchorSweepReport { attempted: results.len() as u32, ..Default::default() };
    for result in results {
        match result {
            Ok(_) => report.anchored += 1,
            Err(_) => report.failed += 1,
        }
    }
    metrics::record_anchor_retry_run(now);
    log::info(format!(
        "⚙️ SCHEDULER: Anchor sweep done: {} anchored, {} still failing",
        report.anchored, report.failed
    ));
    report
}

/// Starts the retry timer when the ledger lives in another canister. With a
/// local ledger every write commits in the caller's message, so nothing is
/// ever left pending by transport failures.
pub fn start_anchor_retry_timer() {
    let config = get_config();
    if config.ledger == LedgerBinding::Local {
        return;
    }
    let interval = Duration::from_secs(config.anchor_retry_interval_secs.max(60));
    log::info(format!("⚙️ SCHEDULER: Anchor retry every {}s", interval.as_secs()));
    ic_cdk_timers::set_timer_interval(interval, || {
        ic_cdk::spawn(async {
            let config = get_config();
            let now = crate::utils::time::get_current_time_secs();
            let coordinator = Coordinator::new(BoundLedger::new(config.ledger, config.owner, now), &config);
            retry_pending_anchors(&coordinator, now).await;
        })
    });
}
