// src/backend/utils/rate_limit.rs
use crate::error::VaultError;
use crate::models::common::TimestampNs;
use crate::storage::config::get_config;
use crate::utils::log;
use candid::Principal;
use std::cell::RefCell;
use std::collections::HashMap;

// --- Configuration ---
const RATE_LIMIT_CAPACITY: u32 = 20; // Max tokens in bucket (burst capacity)
const RATE_LIMIT_REFILL_RATE_PER_SEC: f64 = 1.0; // Tokens added per second

struct TokenBucket {
    tokens: f64,
    last_refill_time_ns: TimestampNs,
}

impl TokenBucket {
    fn new(now_ns: TimestampNs) -> Self {
        TokenBucket {
            tokens: RATE_LIMIT_CAPACITY as f64,
            last_refill_time_ns: now_ns,
        }
    }

    fn refill(&mut self, now_ns: TimestampNs) {
        let elapsed_secs = (now_ns.saturating_sub(self.last_refill_time_ns)) as f64 / 1_000_000_000.0;
        let tokens_to_add = elapsed_secs * RATE_LIMIT_REFILL_RATE_PER_SEC;

        self.tokens = (self.tokens + tokens_to_add).min(RATE_LIMIT_CAPACITY as f64);
        self.last_refill_time_ns = now_ns;
    }

    fn take(&mut self, now_ns: TimestampNs) -> bool {
        self.refill(now_ns);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

thread_local! {
    // In-memory map for rate limiting. Cleared on upgrade.
    static PRINCIPAL_BUCKETS: RefCell<HashMap<Principal, TokenBucket>> = RefCell::new(HashMap::new());
}

/// Takes one token from `caller`'s bucket. The configured owner is never
/// throttled: with a remote ledger that is the Coordinator canister, and all
/// forwarded writes arrive under its principal.
pub fn check_rate(caller: Principal, now_ns: TimestampNs) -> Result<(), VaultError> {
    if caller == get_config().owner {
        return Ok(());
    }
    PRINCIPAL_BUCKETS.with(|buckets_refcell| {
        let mut buckets = buckets_refcell.borrow_mut();
        let bucket = buckets.entry(caller).or_insert_with(|| TokenBucket::new(now_ns));

        if bucket.take(now_ns) {
            Ok(())
        } else {
            log::warn(format!("Rate limit hit for principal {}", caller));
            Err(VaultError::RateLimitExceeded(format!(
                "Rate limit exceeded for principal {}. Please try again later.",
                caller
            )))
        }
    })
}

/// Guard function for rate limiting canister update calls.
pub fn rate_guard() -> Result<(), String> {
    check_rate(ic_cdk::caller(), ic_cdk::api::time()).map_err(|e| e.to_string())
}
