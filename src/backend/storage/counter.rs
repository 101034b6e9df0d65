// src/backend/storage/counter.rs
use crate::storage::memory::{get_counter_memory, Memory};
use ic_stable_structures::StableCell;
use std::cell::RefCell;

thread_local! {
    /// Monotonic counter feeding file id and DID derivation.
    static ID_COUNTER: RefCell<StableCell<u64, Memory>> = RefCell::new(
        StableCell::init(get_counter_memory(), 0)
            .expect("Failed to initialize id counter cell")
    );
}

/// Returns the current value and increments the counter.
pub fn next_id() -> Result<u64, String> {
    ID_COUNTER.with(|cell_ref| {
        let current = *cell_ref.borrow().get();
        let next = current
            .checked_add(1)
            .ok_or_else(|| "Id counter overflow".to_string())?;
        cell_ref
            .borrow_mut()
            .set(next)
            .map_err(|e| format!("Failed to update id counter: {:?}", e))?;
        Ok(current)
    })
}
