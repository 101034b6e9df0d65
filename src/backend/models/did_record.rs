// src/backend/models/did_record.rs
use crate::models::common::{Did, Timestamp};
use candid::CandidType;
use serde::{Deserialize, Serialize};

#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DidRecord {
    pub did: Did,
    pub created_at: Timestamp,
}
