pub mod common;
pub mod did_record;
pub mod init;
pub mod ledger_event;
pub mod legacy_state;
pub mod vault_file;

// Re-export common types/enums for easier access
pub use common::*;
