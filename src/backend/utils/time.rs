use crate::models::common::{Timestamp, TimestampNs};

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Returns the current Internet Computer time as nanoseconds since epoch.
pub fn get_current_time_ns() -> TimestampNs {
    ic_cdk::api::time()
}

/// Current time in epoch seconds, the unit of unlock timestamps.
pub fn get_current_time_secs() -> Timestamp {
    ns_to_secs(get_current_time_ns())
}

pub fn ns_to_secs(ns: TimestampNs) -> Timestamp {
    ns / NANOS_PER_SEC
}
