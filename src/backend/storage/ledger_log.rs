// src/backend/storage/ledger_log.rs
use crate::models::common::Sequence;
use crate::models::ledger_event::LedgerEvent;
use crate::storage::memory::{get_ledger_log_memory, Memory};
use crate::storage::storable::Cbor;
use ic_stable_structures::StableBTreeMap;
use std::cell::RefCell;

type StorableLedgerEvent = Cbor<LedgerEvent>;

thread_local! {
    /// Append-only event log: Key = sequence (0-based, dense), Value = event
    static LOG: RefCell<StableBTreeMap<Sequence, StorableLedgerEvent, Memory>> = RefCell::new(
        StableBTreeMap::init(get_ledger_log_memory())
    );
}

/// Sequence number the next appended event will get.
pub fn next_sequence() -> Sequence {
    LOG.with(|map_ref| map_ref.borrow().len())
}

pub fn last_event() -> Option<LedgerEvent> {
    LOG.with(|map_ref| {
        let map = map_ref.borrow();
        let len = map.len();
        if len == 0 {
            None
        } else {
            map.get(&(len - 1)).map(|cbor| cbor.0)
        }
    })
}

/// Appends an event. Its sequence must be the next one in the log.
pub fn append(event: &LedgerEvent) -> Result<(), String> {
    LOG.with(|map_ref| {
        let mut map = map_ref.borrow_mut();
        let expected = map.len();
        if event.sequence != expected {
            return Err(format!(
                "Out-of-order ledger append: got sequence {}, expected {}",
                event.sequence, expected
            ));
        }
        map.insert(event.sequence, Cbor(event.clone()));
        Ok(())
    })
}

/// Returns up to `limit` events starting at sequence `from`.
pub fn get_events(from: Sequence, limit: usize) -> Vec<LedgerEvent> {
    LOG.with(|map_ref| {
        map_ref
            .borrow()
            .range(from..)
            .take(limit)
            .map(|(_seq, cbor)| cbor.0)
            .collect()
    })
}

pub fn get_all_events() -> Vec<LedgerEvent> {
    LOG.with(|map_ref| map_ref.borrow().iter().map(|(_seq, cbor)| cbor.0).collect())
}
