// src/backend/storage/files.rs
use crate::models::common::{FileId, FileKey};
use crate::models::vault_file::VaultFile;
use crate::storage::memory::{get_file_keys_memory, get_files_memory, Memory};
use crate::storage::storable::{Cbor, StorableString};
use crate::utils::crypto::file_key_for;
use ic_stable_structures::StableBTreeMap;
use std::cell::RefCell;

type StorableVaultFile = Cbor<VaultFile>;

thread_local! {
    /// Vault files: Key = file id, Value = VaultFile
    static FILES: RefCell<StableBTreeMap<StorableString, StorableVaultFile, Memory>> = RefCell::new(
        StableBTreeMap::init(get_files_memory())
    );

    /// Index: Key = file key, Value = file id
    static FILE_KEYS: RefCell<StableBTreeMap<StorableString, StorableString, Memory>> = RefCell::new(
        StableBTreeMap::init(get_file_keys_memory())
    );
}

/// Inserts or updates a file record, returning the previous record if any.
pub fn insert_file(file: &VaultFile) -> Option<VaultFile> {
    FILE_KEYS.with(|map_ref| {
        map_ref
            .borrow_mut()
            .insert(Cbor(file_key_for(&file.id)), Cbor(file.id.clone()))
    });
    FILES.with(|map_ref| {
        map_ref
            .borrow_mut()
            .insert(Cbor(file.id.clone()), Cbor(file.clone()))
            .map(|prev| prev.0)
    })
}

pub fn get_file(file_id: &FileId) -> Option<VaultFile> {
    FILES.with(|map_ref| map_ref.borrow().get(&Cbor(file_id.clone())).map(|cbor| cbor.0))
}

/// Looks a file up by its anchor registry key.
pub fn get_file_by_key(file_key: &FileKey) -> Option<VaultFile> {
    let file_id = FILE_KEYS.with(|map_ref| map_ref.borrow().get(&Cbor(file_key.clone())).map(|cbor| cbor.0))?;
    get_file(&file_id)
}

pub fn contains_file(file_id: &FileId) -> bool {
    FILES.with(|map_ref| map_ref.borrow().contains_key(&Cbor(file_id.clone())))
}

/// All file records in id order, optionally filtered.
pub fn list_files<F>(filter: F) -> Vec<VaultFile>
where
    F: Fn(&VaultFile) -> bool,
{
    FILES.with(|map_ref| {
        map_ref
            .borrow()
            .iter()
            .map(|(_key, cbor)| cbor.0)
            .filter(|file| filter(file))
            .collect()
    })
}
