// src/backend/models/common.rs
use candid::{CandidType, Principal};
use serde::{Deserialize, Serialize};

pub type Address = Principal; // Identity credential of an owner, heir or validator
pub type FileId = String; // Opaque unique file identifier
pub type FileKey = String; // Hex SHA-256 of a FileId, the anchor registry key
pub type Did = String; // Owner identity handle, e.g. "did:legacyvault:3f9a0c1d2e"

pub type Timestamp = u64; // Epoch seconds
pub type TimestampNs = u64; // Nanoseconds since epoch
pub type Sequence = u64; // Position in the ledger event log

/// Who may attest the owner's death.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy, Default)]
pub enum AttestationPolicy {
    #[default]
    OwnerOnly,
    OwnerOrValidator,
}

/// Where the Coordinator sends ledger calls.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy, Default)]
pub enum LedgerBinding {
    /// The ledger state lives in this canister.
    #[default]
    Local,
    /// The ledger is another deployment of this canister.
    Canister(Principal),
}

/// Derived view of the unlock state machine; never stored.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
pub enum LegacyPhase {
    Locked,           // Not deceased, unlock time unset or in the future
    TimeUnlocked,     // Not deceased, unlock time reached
    DeceasedUnlocked, // Death attested
}
