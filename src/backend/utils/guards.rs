// src/backend/utils/guards.rs
use crate::error::VaultError;
use crate::storage::config::get_config;
use crate::utils::log;
use candid::Principal;

/// Checks if the canister has sufficient cycles.
///
/// # Errors
///
/// Returns `VaultError::CycleLow` if the balance is below the configured threshold.
pub fn check_cycles() -> Result<(), VaultError> {
    let threshold = get_config().min_cycles_threshold;
    let balance = ic_cdk::api::canister_balance128();
    if balance < threshold {
        log::warn(format!(
            "Cycle balance low: {} cycles, threshold: {}",
            balance, threshold
        ));
        Err(VaultError::CycleLow)
    } else {
        Ok(())
    }
}

/// Checks that `caller` is the configured vault owner.
///
/// # Errors
///
/// Returns `VaultError::Unauthorized` otherwise.
pub fn check_owner(caller: Principal) -> Result<(), VaultError> {
    let owner = get_config().owner;
    if caller == owner {
        Ok(())
    } else {
        Err(VaultError::Unauthorized(format!(
            "Caller {} is not the vault owner",
            caller
        )))
    }
}

/// Named guard for owner-only endpoints.
pub fn owner_guard() -> Result<(), String> {
    check_owner(ic_cdk::caller()).map_err(|e| e.to_string())
}
