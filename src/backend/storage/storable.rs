// src/backend/storage/storable.rs
use ic_stable_structures::{storable::Bound, Storable};
use serde::{de::DeserializeOwned, Serialize};
use std::borrow::Cow;

/// CBOR-encoded stable value. Every record type in stable memory goes
/// through this wrapper, so there is one encoding for the whole canister.
#[derive(Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub struct Cbor<T>(pub T)
where
    T: Serialize + DeserializeOwned;

/// CBOR bytes of an arbitrary value. Ledger hashes are computed over these.
pub fn to_cbor_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, String> {
    let mut writer = Vec::new();
    ciborium::ser::into_writer(value, &mut writer).map_err(|e| format!("CBOR encoding failed: {}", e))?;
    Ok(writer)
}

impl<T> Storable for Cbor<T>
where
    T: Serialize + DeserializeOwned,
{
    // Storable cannot return errors; a record that fails to encode or decode
    // means stable memory is unusable, so the message traps and rolls back.
    fn to_bytes(&self) -> Cow<'_, [u8]> {
        match to_cbor_bytes(&self.0) {
            Ok(bytes) => Cow::Owned(bytes),
            Err(e) => ic_cdk::trap(&format!("Stable write failed: {}", e)),
        }
    }

    fn from_bytes(bytes: Cow<'_, [u8]>) -> Self {
        match ciborium::de::from_reader(bytes.as_ref()) {
            Ok(value) => Cbor(value),
            Err(e) => ic_cdk::trap(&format!("Stable read failed: {}", e)),
        }
    }

    const BOUND: Bound = Bound::Unbounded;
}

/// Keys of file, DID and anchor maps.
pub type StorableString = Cbor<String>;
