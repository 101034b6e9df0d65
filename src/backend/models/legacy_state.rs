// src/backend/models/legacy_state.rs
//! Authoritative per-vault unlock state.
//!
//! Fields are private: the state only changes through the operations below,
//! each of which checks the caller first. Time is always passed in so that
//! `can_access` stays a pure function of `(state, address, now)`.

use crate::error::VaultError;
use crate::models::common::{Address, AttestationPolicy, LegacyPhase, Timestamp};
use candid::CandidType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct LegacyStatus {
    deceased: bool,                    // Monotonic false -> true
    marked_at: Option<Timestamp>,      // Set once, with `deceased`
    unlock_timestamp: Option<Timestamp>, // None means no time trigger
}

impl LegacyStatus {
    pub fn deceased(&self) -> bool {
        self.deceased
    }

    pub fn marked_at(&self) -> Option<Timestamp> {
        self.marked_at
    }

    pub fn unlock_timestamp(&self) -> Option<Timestamp> {
        self.unlock_timestamp
    }
}

#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LegacyLedgerState {
    owner: Address,
    heirs: BTreeSet<Address>,
    validators: Vec<Address>, // Append-only, registration order
    status: LegacyStatus,
    attestation_policy: AttestationPolicy,
    created_at: Timestamp,
}

impl LegacyLedgerState {
    /// Creates the vault state at genesis.
    pub fn genesis(owner: Address, attestation_policy: AttestationPolicy, now: Timestamp) -> Self {
        Self {
            owner,
            heirs: BTreeSet::new(),
            validators: Vec::new(),
            status: LegacyStatus::default(),
            attestation_policy,
            created_at: now,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn status(&self) -> &LegacyStatus {
        &self.status
    }

    pub fn heirs(&self) -> impl Iterator<Item = &Address> {
        self.heirs.iter()
    }

    pub fn validators(&self) -> &[Address] {
        &self.validators
    }

    pub fn is_owner(&self, caller: &Address) -> bool {
        self.owner == *caller
    }

    fn ensure_owner(&self, caller: &Address, action: &str) -> Result<(), VaultError> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(VaultError::Unauthorized(format!(
                "Caller {} is not the vault owner and cannot {}",
                caller, action
            )))
        }
    }

    /// Adds each address to the heir set. Returns only the newly added ones;
    /// re-adding a known heir is a no-op.
    pub fn register_heirs(&mut self, caller: &Address, addresses: &[Address]) -> Result<Vec<Address>, VaultError> {
        self.ensure_owner(caller, "register heirs")?;
        let added = addresses
            .iter()
            .filter(|address| self.heirs.insert(**address))
            .copied()
            .collect();
        Ok(added)
    }

    /// Overwrites the unlock timestamp, returning the previous value.
    pub fn set_unlock_timestamp(
        &mut self,
        caller: &Address,
        unlock_timestamp: Timestamp,
    ) -> Result<Option<Timestamp>, VaultError> {
        self.ensure_owner(caller, "set the unlock timestamp")?;
        if self.status.deceased {
            return Err(VaultError::InvalidState(
                "Unlock timestamp is frozen once the owner is marked deceased".to_string(),
            ));
        }
        Ok(self.status.unlock_timestamp.replace(unlock_timestamp))
    }

    pub fn may_attest_death(&self, caller: &Address) -> bool {
        match self.attestation_policy {
            AttestationPolicy::OwnerOnly => self.is_owner(caller),
            AttestationPolicy::OwnerOrValidator => self.is_owner(caller) || self.is_validator(caller),
        }
    }

    /// Irreversibly marks the owner deceased. A second attestation is
    /// rejected with `AlreadyDeceased` and leaves `marked_at` untouched.
    pub fn mark_deceased(&mut self, caller: &Address, now: Timestamp) -> Result<(), VaultError> {
        if !self.may_attest_death(caller) {
            return Err(VaultError::Unauthorized(format!(
                "Caller {} may not attest death under policy {:?}",
                caller, self.attestation_policy
            )));
        }
        if self.status.deceased {
            return Err(VaultError::AlreadyDeceased);
        }
        self.status.deceased = true;
        self.status.marked_at = Some(now);
        Ok(())
    }

    /// Appends a validator. Returns false if it was already registered, in
    /// which case the set is unchanged.
    pub fn register_validator(&mut self, caller: &Address, validator: Address) -> Result<bool, VaultError> {
        self.ensure_owner(caller, "register validators")?;
        if self.is_validator(&validator) {
            return Ok(false);
        }
        self.validators.push(validator);
        Ok(true)
    }

    pub fn is_validator(&self, address: &Address) -> bool {
        self.validators.contains(address)
    }

    pub fn is_heir(&self, address: &Address) -> bool {
        self.heirs.contains(address)
    }

    pub fn phase(&self, now: Timestamp) -> LegacyPhase {
        if self.status.deceased {
            LegacyPhase::DeceasedUnlocked
        } else if self.status.unlock_timestamp.is_some_and(|ts| now >= ts) {
            LegacyPhase::TimeUnlocked
        } else {
            LegacyPhase::Locked
        }
    }

    /// `is_heir(address) && (deceased || now >= unlock_timestamp)`.
    pub fn can_access(&self, address: &Address, now: Timestamp) -> bool {
        self.is_heir(address) && self.phase(now) != LegacyPhase::Locked
    }

    pub fn status_view(&self, now: Timestamp) -> LegacyStatusView {
        LegacyStatusView {
            deceased: self.status.deceased,
            marked_at: self.status.marked_at,
            unlock_timestamp: self.status.unlock_timestamp,
            phase: self.phase(now),
        }
    }
}

/// Read-only snapshot of the unlock state at a given instant.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LegacyStatusView {
    pub deceased: bool,
    pub marked_at: Option<Timestamp>,
    pub unlock_timestamp: Option<Timestamp>,
    pub phase: LegacyPhase,
}

#[cfg(test)]
mod tests {
    use super::*;
    use candid::Principal;

    const T: Timestamp = 1_700_000_000;

    fn owner() -> Address {
        Principal::from_slice(&[1; 29])
    }

    fn heir() -> Address {
        Principal::from_slice(&[2; 29])
    }

    fn stranger() -> Address {
        Principal::from_slice(&[3; 29])
    }

    fn fresh() -> LegacyLedgerState {
        LegacyLedgerState::genesis(owner(), AttestationPolicy::OwnerOnly, T)
    }

    #[test]
    fn heir_is_locked_before_any_trigger() {
        let mut state = fresh();
        state.register_heirs(&owner(), &[heir()]).unwrap();
        state.set_unlock_timestamp(&owner(), T + 3600).unwrap();
        assert!(!state.can_access(&heir(), T + 10));
        assert_eq!(state.phase(T + 10), LegacyPhase::Locked);
    }

    #[test]
    fn unset_unlock_timestamp_never_opens_by_time() {
        let mut state = fresh();
        state.register_heirs(&owner(), &[heir()]).unwrap();
        assert!(!state.can_access(&heir(), u64::MAX));
    }

    #[test]
    fn time_trigger_opens_at_the_exact_instant() {
        let mut state = fresh();
        state.register_heirs(&owner(), &[heir()]).unwrap();
        state.set_unlock_timestamp(&owner(), T + 3600).unwrap();
        assert!(!state.can_access(&heir(), T + 3599));
        assert!(state.can_access(&heir(), T + 3600));
        assert_eq!(state.phase(T + 3600), LegacyPhase::TimeUnlocked);
    }

    #[test]
    fn death_trigger_opens_immediately() {
        let mut state = fresh();
        state.register_heirs(&owner(), &[heir()]).unwrap();
        state.set_unlock_timestamp(&owner(), T + 3600).unwrap();
        state.mark_deceased(&owner(), T + 20).unwrap();
        assert!(state.can_access(&heir(), T + 21));
        assert_eq!(state.status().marked_at(), Some(T + 20));
        assert_eq!(state.phase(T + 21), LegacyPhase::DeceasedUnlocked);
    }

    #[test]
    fn non_heirs_never_get_access() {
        let mut state = fresh();
        state.register_heirs(&owner(), &[heir()]).unwrap();
        state.set_unlock_timestamp(&owner(), T).unwrap();
        assert!(!state.can_access(&stranger(), T + 1));
        state.mark_deceased(&owner(), T + 2).unwrap();
        assert!(!state.can_access(&stranger(), T + 3));
        assert!(!state.can_access(&owner(), T + 3));
    }

    #[test]
    fn registering_heirs_is_idempotent() {
        let mut state = fresh();
        assert_eq!(state.register_heirs(&owner(), &[heir(), heir()]).unwrap(), vec![heir()]);
        assert!(state.register_heirs(&owner(), &[heir()]).unwrap().is_empty());
        assert_eq!(state.heirs().count(), 1);
    }

    #[test]
    fn writes_from_non_owner_are_unauthorized() {
        let mut state = fresh();
        let before = state.clone();
        assert!(matches!(state.register_heirs(&stranger(), &[stranger()]), Err(VaultError::Unauthorized(_))));
        assert!(matches!(state.set_unlock_timestamp(&stranger(), T), Err(VaultError::Unauthorized(_))));
        assert!(matches!(state.mark_deceased(&stranger(), T), Err(VaultError::Unauthorized(_))));
        assert!(matches!(state.register_validator(&stranger(), stranger()), Err(VaultError::Unauthorized(_))));
        assert_eq!(state, before);
    }

    #[test]
    fn unlock_timestamp_moves_both_ways_until_death_then_freezes() {
        let mut state = fresh();
        assert_eq!(state.set_unlock_timestamp(&owner(), T + 100).unwrap(), None);
        assert_eq!(state.set_unlock_timestamp(&owner(), T + 50).unwrap(), Some(T + 100));
        assert_eq!(state.set_unlock_timestamp(&owner(), T + 500).unwrap(), Some(T + 50));
        state.mark_deceased(&owner(), T + 1).unwrap();
        assert!(matches!(state.set_unlock_timestamp(&owner(), T + 900), Err(VaultError::InvalidState(_))));
        assert_eq!(state.status().unlock_timestamp(), Some(T + 500));
    }

    #[test]
    fn second_death_attestation_is_rejected_and_keeps_marked_at() {
        let mut state = fresh();
        state.mark_deceased(&owner(), T + 5).unwrap();
        assert_eq!(state.mark_deceased(&owner(), T + 9), Err(VaultError::AlreadyDeceased));
        assert!(state.status().deceased());
        assert_eq!(state.status().marked_at(), Some(T + 5));
    }

    #[test]
    fn validators_cannot_attest_under_owner_only_policy() {
        let mut state = fresh();
        assert!(state.register_validator(&owner(), stranger()).unwrap());
        assert!(state.is_validator(&stranger()));
        assert!(matches!(state.mark_deceased(&stranger(), T), Err(VaultError::Unauthorized(_))));
    }

    #[test]
    fn validators_attest_under_owner_or_validator_policy() {
        let mut state = LegacyLedgerState::genesis(owner(), AttestationPolicy::OwnerOrValidator, T);
        state.register_heirs(&owner(), &[heir()]).unwrap();
        assert!(matches!(state.mark_deceased(&stranger(), T), Err(VaultError::Unauthorized(_))));
        state.register_validator(&owner(), stranger()).unwrap();
        state.mark_deceased(&stranger(), T + 1).unwrap();
        assert!(state.can_access(&heir(), T + 1));
    }

    #[test]
    fn validator_set_is_append_only_and_ordered() {
        let mut state = fresh();
        assert!(state.register_validator(&owner(), heir()).unwrap());
        assert!(state.register_validator(&owner(), stranger()).unwrap());
        assert!(!state.register_validator(&owner(), heir()).unwrap());
        assert_eq!(state.validators(), &[heir(), stranger()]);
        assert!(!state.is_validator(&owner()));
    }
}
