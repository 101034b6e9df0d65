use crate::metrics::LegacyMetrics;
use crate::storage::memory::{get_metrics_memory, Memory};
use crate::storage::storable::Cbor;
use ic_stable_structures::StableCell;
use std::cell::RefCell;

type StorableLegacyMetrics = Cbor<LegacyMetrics>;

thread_local! {
    pub static METRICS_CELL: RefCell<StableCell<StorableLegacyMetrics, Memory>> = RefCell::new(
        StableCell::init(get_metrics_memory(), Cbor(LegacyMetrics::default()))
            .expect("Failed to initialize metrics stable cell")
    );
}

pub fn get_metrics() -> LegacyMetrics {
    METRICS_CELL.with(|cell| cell.borrow().get().0.clone())
}

/// Applies `update_fn` to a copy of the metrics and stores the result.
pub fn update_metrics<F>(update_fn: F) -> Result<(), String>
where
    F: FnOnce(&mut LegacyMetrics),
{
    METRICS_CELL.with(|cell| {
        let mut metrics = cell.borrow().get().0.clone();
        update_fn(&mut metrics);
        cell.borrow_mut()
            .set(Cbor(metrics))
            .map_err(|e| format!("Failed to update metrics: {:?}", e))?;
        Ok(())
    })
}
