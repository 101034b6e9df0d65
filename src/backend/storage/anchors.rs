// src/backend/storage/anchors.rs
use crate::models::common::FileKey;
use crate::storage::memory::{get_anchors_memory, Memory};
use crate::storage::storable::{Cbor, StorableString};
use ic_stable_structures::StableBTreeMap;
use std::cell::RefCell;

thread_local! {
    /// Anchor registry: Key = file key (hex SHA-256 of the file id), Value = cid
    static ANCHORS: RefCell<StableBTreeMap<StorableString, StorableString, Memory>> = RefCell::new(
        StableBTreeMap::init(get_anchors_memory())
    );
}

pub fn get_cid(file_key: &FileKey) -> Option<String> {
    ANCHORS.with(|map_ref| map_ref.borrow().get(&Cbor(file_key.clone())).map(|cbor| cbor.0))
}

/// Inserts a mapping that must not exist yet. Returns the existing cid
/// untouched if the key is already bound.
pub fn insert_new(file_key: &FileKey, cid: &str) -> Result<(), String> {
    ANCHORS.with(|map_ref| {
        let mut map = map_ref.borrow_mut();
        let key = Cbor(file_key.clone());
        if let Some(existing) = map.get(&key) {
            return Err(existing.0);
        }
        map.insert(key, Cbor(cid.to_string()));
        Ok(())
    })
}

/// Drops a binding. Only used to undo an insert whose ledger event failed.
pub fn remove(file_key: &FileKey) -> Option<String> {
    ANCHORS.with(|map_ref| map_ref.borrow_mut().remove(&Cbor(file_key.clone())).map(|cbor| cbor.0))
}
