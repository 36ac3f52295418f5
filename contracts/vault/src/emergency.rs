//! Emergency controller: the pause gate and recovery operations.
//!
//! ```text
//!   Active --pause()--> Paused --unpause()--> Active
//! ```
//!
//! Paused blocks entry (`deposit`, `mint`) and position management
//! (`rebalance`, `harvest`). Exit stays open: `withdraw`, `redeem` and share
//! transfers keep working so holders can leave with whatever liquidity the
//! vault holds. The recovery operations below are only available while
//! paused.

use soroban_sdk::{log, Address, Env};

use crate::adapter;
use crate::errors::VaultError;
use crate::harvest;
use crate::reserve::ReserveManager;
use crate::storage::VaultState;

pub fn require_active(state: &VaultState) -> Result<(), VaultError> {
    if state.paused {
        return Err(VaultError::VaultPaused);
    }
    Ok(())
}

pub fn require_paused(state: &VaultState) -> Result<(), VaultError> {
    if !state.paused {
        return Err(VaultError::NotPaused);
    }
    Ok(())
}

pub fn pause(state: &mut VaultState) -> Result<(), VaultError> {
    if state.paused {
        return Err(VaultError::AlreadyPaused);
    }
    state.paused = true;
    Ok(())
}

pub fn unpause(state: &mut VaultState) -> Result<(), VaultError> {
    if !state.paused {
        return Err(VaultError::AlreadyActive);
    }
    state.paused = false;
    Ok(())
}

/// Moves `amount` of any token the vault holds to `to`.
pub fn emergency_withdraw(
    env: &Env,
    state: &mut VaultState,
    reserve: &ReserveManager,
    token: &Address,
    amount: i128,
    to: &Address,
) -> Result<(), VaultError> {
    require_paused(state)?;
    if amount <= 0 {
        return Err(VaultError::ZeroAmount);
    }

    adapter::token_transfer(env, token, &env.current_contract_address(), to, amount)?;

    if token == reserve.adapter().asset() {
        harvest::on_outflow(state, amount);
    }
    log!(env, "emergency withdraw of {} executed", amount);
    Ok(())
}

/// Pulls the whole external position back into the reserve.
///
/// Returns what arrived. A pool with constrained liquidity may return less
/// than the position; the remainder stays deployed and the call can be
/// repeated.
pub fn recall_all(env: &Env, state: &VaultState, reserve: &ReserveManager) -> Result<i128, VaultError> {
    require_paused(state)?;
    let position = reserve.adapter().current_value()?;
    let recalled = reserve.adapter().recall(position)?;
    if recalled < position {
        log!(env, "recall_all returned {} of {}", recalled, position);
    }
    Ok(recalled)
}
