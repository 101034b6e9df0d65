// src/backend/storage/dids.rs
use crate::models::did_record::DidRecord;
use crate::storage::memory::{get_dids_memory, Memory};
use crate::storage::storable::{Cbor, StorableString};
use ic_stable_structures::StableBTreeMap;
use std::cell::RefCell;

thread_local! {
    static DIDS: RefCell<StableBTreeMap<StorableString, Cbor<DidRecord>, Memory>> = RefCell::new(
        StableBTreeMap::init(get_dids_memory())
    );
}

pub fn insert_did(record: &DidRecord) -> Option<DidRecord> {
    DIDS.with(|map_ref| {
        map_ref
            .borrow_mut()
            .insert(Cbor(record.did.clone()), Cbor(record.clone()))
            .map(|prev| prev.0)
    })
}

pub fn is_registered(did: &str) -> bool {
    DIDS.with(|map_ref| map_ref.borrow().contains_key(&Cbor(did.to_string())))
}

pub fn list_dids() -> Vec<DidRecord> {
    DIDS.with(|map_ref| map_ref.borrow().iter().map(|(_key, cbor)| cbor.0).collect())
}
