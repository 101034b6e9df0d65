// src/backend/storage/mod.rs
// Stable memory management using ic-stable-structures

pub mod anchors;
pub mod config;
pub mod counter;
pub mod dids;
pub mod files;
pub mod ledger_log;
pub mod ledger_state;
pub mod memory;
pub mod metrics;
pub mod storable;

// Re-export key storage structures and functions for easier access
pub use memory::Memory;
pub use metrics::{get_metrics, update_metrics};
pub use storable::{Cbor, StorableString};
