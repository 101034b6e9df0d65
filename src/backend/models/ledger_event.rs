// src/backend/models/ledger_event.rs
use crate::models::common::{Address, FileKey, Sequence, Timestamp};
use candid::CandidType;
use serde::{Deserialize, Serialize};

/// One committed ledger write.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LedgerEvent {
    pub sequence: Sequence,
    /// Epoch seconds at commit.
    pub timestamp: Timestamp,
    /// Principal that submitted the write.
    pub actor: Address,
    pub kind: LedgerEventKind,
    /// Hex SHA-256 chaining this event to the previous one.
    pub tx_hash: String,
}

#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum LedgerEventKind {
    Genesis { owner: Address },
    HeirsRegistered { added: Vec<Address> },
    UnlockTimestampSet { previous: Option<Timestamp>, unlock_timestamp: Timestamp },
    MarkedDeceased { at: Timestamp },
    ValidatorRegistered { validator: Address },
    FileCidSet { file_key: FileKey, cid: String },
}

/// Confirmation returned by every successful ledger write.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LedgerReceipt {
    pub sequence: Sequence,
    pub tx_hash: String,
    pub event: LedgerEvent,
}

impl From<LedgerEvent> for LedgerReceipt {
    fn from(event: LedgerEvent) -> Self {
        Self {
            sequence: event.sequence,
            tx_hash: event.tx_hash.clone(),
            event,
        }
    }
}
