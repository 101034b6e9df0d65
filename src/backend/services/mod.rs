pub mod anchor_service;
pub mod coordinator;
pub mod did_service;
pub mod file_service;
pub mod ledger_service;
pub mod scheduler;
