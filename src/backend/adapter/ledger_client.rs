// src/backend/adapter/ledger_client.rs
use crate::error::VaultError;
use crate::metrics;
use crate::models::common::{Address, FileKey, Timestamp};
use crate::models::ledger_event::LedgerReceipt;
use crate::models::legacy_state::LegacyStatusView;
use crate::utils::log;
use std::future::Future;

/// The ledger operations the Coordinator depends on. Each write is accepted
/// or rejected atomically, so a failed call may be resubmitted as is.
#[allow(async_fn_in_trait)]
pub trait LedgerClient {
    async fn register_heirs(&self, heirs: Vec<Address>) -> Result<LedgerReceipt, VaultError>;
    async fn set_unlock_timestamp(&self, unlock_timestamp: Timestamp) -> Result<LedgerReceipt, VaultError>;
    async fn mark_deceased(&self) -> Result<LedgerReceipt, VaultError>;
    async fn register_validator(&self, validator: Address) -> Result<LedgerReceipt, VaultError>;
    async fn set_file_cid(&self, file_key: FileKey, cid: String) -> Result<LedgerReceipt, VaultError>;

    async fn can_access(&self, address: Address) -> Result<bool, VaultError>;
    async fn is_validator(&self, address: Address) -> Result<bool, VaultError>;
    async fn get_file_cid(&self, file_key: FileKey) -> Result<Option<String>, VaultError>;
    async fn get_legacy_status(&self) -> Result<LegacyStatusView, VaultError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total submissions per call, including the first one. At least 1.
    pub max_attempts: u8,
}

impl RetryPolicy {
    pub fn new(max_attempts: u8) -> Self {
        Self { max_attempts: max_attempts.max(1) }
    }
}

/// Submits `op` until it succeeds, fails with a non-retryable error, or the
/// attempt budget runs out. The last error is returned unchanged.
pub async fn with_retries<T, F, Fut>(policy: RetryPolicy, op_name: &str, mut op: F) -> Result<T, VaultError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, VaultError>>,
{
    let mut attempt: u8 = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                log::warn(format!(
                    "Ledger call {} failed (attempt {}/{}): {}. Resubmitting.",
                    op_name, attempt, policy.max_attempts, e
                ));
                metrics::record_ledger_retry();
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    log::error(format!(
                        "Ledger call {} failed after {} attempts: {}",
                        op_name, attempt, e
                    ));
                }
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;

    #[test]
    fn resubmits_retryable_failures_until_success() {
        let calls = Cell::new(0);
        let result = block_on(with_retries(RetryPolicy::new(3), "op", || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 {
                    Err(VaultError::LedgerUnavailable("down".into()))
                } else {
                    Ok(n)
                }
            }
        }));
        assert_eq!(result, Ok(3));
        assert_eq!(metrics::get_legacy_metrics().ledger_retries, 2);
    }

    #[test]
    fn gives_up_after_budget() {
        let calls = Cell::new(0);
        let result: Result<(), _> = block_on(with_retries(RetryPolicy::new(2), "op", || {
            calls.set(calls.get() + 1);
            async { Err(VaultError::LedgerWriteFailed("trap".into())) }
        }));
        assert_eq!(result, Err(VaultError::LedgerWriteFailed("trap".into())));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn never_resubmits_rejections() {
        let calls = Cell::new(0);
        let result: Result<(), _> = block_on(with_retries(RetryPolicy::new(5), "op", || {
            calls.set(calls.get() + 1);
            async { Err(VaultError::AlreadyDeceased) }
        }));
        assert_eq!(result, Err(VaultError::AlreadyDeceased));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn zero_attempts_still_submits_once() {
        assert_eq!(RetryPolicy::new(0).max_attempts, 1);
    }
}
