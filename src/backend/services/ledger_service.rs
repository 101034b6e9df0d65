// src/backend/services/ledger_service.rs
//! The canister acting as the vault's shared ledger.
//!
//! Every write loads the state, applies one `LegacyLedgerState` operation,
//! persists it and appends exactly one hash-chained `LedgerEvent`. Writes are
//! totally ordered by the canister's message execution; a rejected write
//! leaves both the state and the log unchanged.

use crate::error::VaultError;
use crate::models::common::{Address, AttestationPolicy, Sequence, Timestamp};
use crate::models::ledger_event::{LedgerEvent, LedgerEventKind, LedgerReceipt};
use crate::models::legacy_state::{LegacyLedgerState, LegacyStatusView};
use crate::storage::storable::to_cbor_bytes;
use crate::storage::{ledger_log, ledger_state};
use crate::utils::crypto::chain_hash;
use crate::utils::log;

/// Upper bound on events returned by one `get_ledger_events` page.
pub const MAX_EVENTS_PAGE: usize = 100;

fn load_state() -> Result<LegacyLedgerState, VaultError> {
    ledger_state::get_state()
        .ok_or_else(|| VaultError::InvalidState("Vault ledger has no genesis state".to_string()))
}

/// Builds the next event in the chain without appending it.
fn next_event(actor: Address, now: Timestamp, kind: LedgerEventKind) -> Result<LedgerEvent, VaultError> {
    let sequence = ledger_log::next_sequence();
    let prev_hash = ledger_log::last_event().map(|event| event.tx_hash);
    let body = to_cbor_bytes(&(sequence, now, actor, &kind)).map_err(VaultError::InternalError)?;
    Ok(LedgerEvent {
        sequence,
        timestamp: now,
        actor,
        tx_hash: chain_hash(prev_hash.as_deref(), &body),
        kind,
    })
}

/// Appends an event for a write whose effect is already persisted.
pub(crate) fn append_event(
    actor: Address,
    now: Timestamp,
    kind: LedgerEventKind,
) -> Result<LedgerReceipt, VaultError> {
    let event = next_event(actor, now, kind)?;
    ledger_log::append(&event).map_err(VaultError::StorageError)?;
    log::info(format!(
        "Ledger event #{} committed by {}: {:?} (tx {})",
        event.sequence, event.actor, event.kind, event.tx_hash
    ));
    Ok(LedgerReceipt::from(event))
}

fn commit<F>(caller: Address, now: Timestamp, apply: F) -> Result<LedgerReceipt, VaultError>
where
    F: FnOnce(&mut LegacyLedgerState) -> Result<LedgerEventKind, VaultError>,
{
    let previous = load_state()?;
    let mut state = previous.clone();
    let kind = apply(&mut state)?;

    ledger_state::set_state(state).map_err(VaultError::StorageError)?;
    append_event(caller, now, kind).inspect_err(|e| {
        log::error(format!("Ledger append failed, restoring state: {}", e));
        if let Err(restore_err) = ledger_state::set_state(previous) {
            log::error(format!("Failed to restore ledger state: {}", restore_err));
        }
    })
}

/// Creates the vault state and the first log entry. Runs once, at init.
pub fn genesis(owner: Address, policy: AttestationPolicy, now: Timestamp) -> Result<LedgerReceipt, VaultError> {
    if ledger_state::get_state().is_some() || ledger_log::next_sequence() != 0 {
        return Err(VaultError::InvalidState("Vault ledger already has a genesis".to_string()));
    }
    ledger_state::set_state(LegacyLedgerState::genesis(owner, policy, now)).map_err(VaultError::StorageError)?;
    let receipt = append_event(owner, now, LedgerEventKind::Genesis { owner })?;
    log::info(format!("Vault genesis for owner {} under policy {:?}", owner, policy));
    Ok(receipt)
}

// --- Writes ---

pub fn register_heirs(caller: Address, heirs: Vec<Address>, now: Timestamp) -> Result<LedgerReceipt, VaultError> {
    if heirs.is_empty() {
        return Err(VaultError::InvalidInput("At least one heir address is required".to_string()));
    }
    commit(caller, now, |state| {
        let added = state.register_heirs(&caller, &heirs)?;
        Ok(LedgerEventKind::HeirsRegistered { added })
    })
}

pub fn set_unlock_timestamp(
    caller: Address,
    unlock_timestamp: Timestamp,
    now: Timestamp,
) -> Result<LedgerReceipt, VaultError> {
    commit(caller, now, |state| {
        let previous = state.set_unlock_timestamp(&caller, unlock_timestamp)?;
        Ok(LedgerEventKind::UnlockTimestampSet { previous, unlock_timestamp })
    })
}

pub fn mark_deceased(caller: Address, now: Timestamp) -> Result<LedgerReceipt, VaultError> {
    commit(caller, now, |state| {
        state.mark_deceased(&caller, now)?;
        Ok(LedgerEventKind::MarkedDeceased { at: now })
    })
}

/// Registers a validator. The emitted `ValidatorRegistered` event is the
/// write's confirmation, even when the address was already present.
pub fn register_validator(caller: Address, validator: Address, now: Timestamp) -> Result<LedgerReceipt, VaultError> {
    commit(caller, now, |state| {
        if !state.register_validator(&caller, validator)? {
            log::info(format!("Validator {} was already registered", validator));
        }
        Ok(LedgerEventKind::ValidatorRegistered { validator })
    })
}

// --- Reads (total: an uninitialized ledger answers "no") ---

pub fn owner() -> Result<Address, VaultError> {
    load_state().map(|state| state.owner())
}

pub fn can_access(address: &Address, now: Timestamp) -> bool {
    ledger_state::get_state().is_some_and(|state| state.can_access(address, now))
}

pub fn is_heir(address: &Address) -> bool {
    ledger_state::get_state().is_some_and(|state| state.is_heir(address))
}

pub fn is_validator(address: &Address) -> bool {
    ledger_state::get_state().is_some_and(|state| state.is_validator(address))
}

pub fn list_heirs() -> Vec<Address> {
    ledger_state::get_state()
        .map(|state| state.heirs().copied().collect())
        .unwrap_or_default()
}

pub fn get_legacy_status(now: Timestamp) -> Result<LegacyStatusView, VaultError> {
    load_state().map(|state| state.status_view(now))
}

/// Validator additions in registration order, replayed from the event log.
pub fn list_validators() -> Vec<Address> {
    let mut validators: Vec<Address> = Vec::new();
    for event in ledger_log::get_all_events() {
        if let LedgerEventKind::ValidatorRegistered { validator } = event.kind {
            if !validators.contains(&validator) {
                validators.push(validator);
            }
        }
    }
    validators
}

pub fn get_ledger_events(from: Sequence, limit: u32) -> Vec<LedgerEvent> {
    ledger_log::get_events(from, (limit as usize).min(MAX_EVENTS_PAGE))
}

/// Recomputes every `tx_hash` and checks sequences are dense.
/// Returns the number of verified events.
pub fn verify_event_chain() -> Result<u64, VaultError> {
    let mut prev_hash: Option<String> = None;
    let mut count: u64 = 0;
    for event in ledger_log::get_all_events() {
        if event.sequence != count {
            return Err(VaultError::InvalidState(format!(
                "Ledger gap: expected sequence {}, found {}",
                count, event.sequence
            )));
        }
        let body = to_cbor_bytes(&(event.sequence, event.timestamp, event.actor, &event.kind))
            .map_err(VaultError::InternalError)?;
        let expected = chain_hash(prev_hash.as_deref(), &body);
        if expected != event.tx_hash {
            return Err(VaultError::InvalidState(format!(
                "Ledger hash mismatch at sequence {}",
                event.sequence
            )));
        }
        prev_hash = Some(event.tx_hash);
        count += 1;
    }
    Ok(count)
}
