// src/backend/storage/ledger_state.rs
use crate::models::legacy_state::LegacyLedgerState;
use crate::storage::memory::{get_ledger_state_memory, Memory};
use crate::storage::storable::Cbor;
use ic_stable_structures::StableCell;
use std::cell::RefCell;

type StorableLedgerState = Cbor<Option<LegacyLedgerState>>;

thread_local! {
    /// The vault's unlock state. `None` until genesis.
    static LEDGER_STATE: RefCell<StableCell<StorableLedgerState, Memory>> = RefCell::new(
        StableCell::init(get_ledger_state_memory(), Cbor(None))
            .expect("Failed to initialize ledger state cell")
    );
}

pub fn get_state() -> Option<LegacyLedgerState> {
    LEDGER_STATE.with(|cell| cell.borrow().get().0.clone())
}

pub fn set_state(state: LegacyLedgerState) -> Result<(), String> {
    LEDGER_STATE.with(|cell| {
        cell.borrow_mut()
            .set(Cbor(Some(state)))
            .map(|_| ())
            .map_err(|e| format!("Failed to persist ledger state: {:?}", e))
    })
}
