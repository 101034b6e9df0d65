// src/backend/storage/memory.rs
use ic_stable_structures::memory_manager::{MemoryId, MemoryManager, VirtualMemory};
use ic_stable_structures::DefaultMemoryImpl;
use std::cell::RefCell;

// Define Memory IDs for stable structures
// Choose non-overlapping IDs
const CONFIG_MEM_ID: MemoryId = MemoryId::new(0);
const LEDGER_STATE_MEM_ID: MemoryId = MemoryId::new(1);
const LEDGER_LOG_MEM_ID: MemoryId = MemoryId::new(2);
const ANCHORS_MEM_ID: MemoryId = MemoryId::new(3);
const FILES_MEM_ID: MemoryId = MemoryId::new(4);
const DIDS_MEM_ID: MemoryId = MemoryId::new(5);
const METRICS_MEM_ID: MemoryId = MemoryId::new(6);
const COUNTER_MEM_ID: MemoryId = MemoryId::new(7);
const FILE_KEYS_MEM_ID: MemoryId = MemoryId::new(8);
// Reserve IDs 9-19 for future use

// Define memory type alias
pub type Memory = VirtualMemory<DefaultMemoryImpl>;

thread_local! {
    static MEMORY_MANAGER: RefCell<MemoryManager<DefaultMemoryImpl>> = RefCell::new(
        MemoryManager::init(DefaultMemoryImpl::default())
    );
}

/// Get memory instance for a specific MemoryId.
pub fn get_memory(id: MemoryId) -> Memory {
    MEMORY_MANAGER.with(|m| m.borrow().get(id))
}

pub fn get_config_memory() -> Memory {
    get_memory(CONFIG_MEM_ID)
}

pub fn get_ledger_state_memory() -> Memory {
    get_memory(LEDGER_STATE_MEM_ID)
}

pub fn get_ledger_log_memory() -> Memory {
    get_memory(LEDGER_LOG_MEM_ID)
}

pub fn get_anchors_memory() -> Memory {
    get_memory(ANCHORS_MEM_ID)
}

pub fn get_files_memory() -> Memory {
    get_memory(FILES_MEM_ID)
}

pub fn get_file_keys_memory() -> Memory {
    get_memory(FILE_KEYS_MEM_ID)
}

pub fn get_dids_memory() -> Memory {
    get_memory(DIDS_MEM_ID)
}

pub fn get_metrics_memory() -> Memory {
    get_memory(METRICS_MEM_ID)
}

pub fn get_counter_memory() -> Memory {
    get_memory(COUNTER_MEM_ID)
}
