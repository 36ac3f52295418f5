//! Harvest engine: yield recognition and performance-fee extraction.
//!
//! Yield is measured against `harvest_baseline`, the asset level that is
//! principal rather than earnings. Deposits raise the baseline by what they
//! bring, withdrawals lower it pro rata to the shares they burn, and each
//! harvest resets it to the post-fee asset level, so yield is charged once.
//!
//! The baseline acts as a high-water mark: while the vault sits below it
//! there is no yield, no fee, and the baseline is left untouched.

use soroban_sdk::{log, Env};

use crate::errors::VaultError;
use crate::reserve::{portion, ReserveManager};
use crate::shares::{mul_div, Rounding};
use crate::storage::VaultState;

/// Outcome of one harvest.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HarvestOutcome {
    pub yield_amount: i128,
    pub fee: i128,
    pub recalled: i128,
}

pub fn ensure_due(state: &VaultState, now: u64) -> Result<(), VaultError> {
    let due = state
        .last_harvest_timestamp
        .saturating_add(state.config.harvest_interval_seconds);
    if now < due {
        return Err(VaultError::HarvestTooSoon);
    }
    Ok(())
}

/// Recognizes yield since the last harvest and pays the fee to the treasury.
pub fn harvest(
    env: &Env,
    state: &mut VaultState,
    reserve: &ReserveManager,
) -> Result<HarvestOutcome, VaultError> {
    let now = env.ledger().timestamp();
    ensure_due(state, now)?;

    let current_assets = reserve.total_assets()?;
    let yield_amount = (current_assets - state.harvest_baseline).max(0);
    let fee = portion(yield_amount, state.config.performance_fee_bp)?;

    let mut recalled = 0;
    if fee > 0 {
        recalled = reserve.ensure_liquid(fee)?;
        reserve.pay(&state.config.treasury, fee)?;
    }

    state.total_yield_harvested = state
        .total_yield_harvested
        .checked_add(yield_amount)
        .ok_or(VaultError::ArithmeticOverflow)?;
    state.total_fees_collected = state
        .total_fees_collected
        .checked_add(fee)
        .ok_or(VaultError::ArithmeticOverflow)?;
    if yield_amount > 0 {
        state.harvest_baseline = current_assets - fee;
    }
    state.last_harvest_timestamp = now;

    log!(env, "harvested {} yield, fee {}", yield_amount, fee);
    Ok(HarvestOutcome {
        yield_amount,
        fee,
        recalled,
    })
}

/// Raises the baseline by freshly deposited principal.
pub fn on_deposit(state: &mut VaultState, assets: i128) -> Result<(), VaultError> {
    state.harvest_baseline = state
        .harvest_baseline
        .checked_add(assets)
        .ok_or(VaultError::ArithmeticOverflow)?;
    Ok(())
}

/// Lowers the baseline by the burned shares' part of it.
///
/// Must be called with the supply from before the burn.
pub fn on_burn(state: &mut VaultState, burned: i128, supply_before: i128) -> Result<(), VaultError> {
    if supply_before <= 0 {
        return Ok(());
    }
    let released = mul_div(state.harvest_baseline, burned, supply_before, Rounding::Floor)?;
    state.harvest_baseline -= released;
    Ok(())
}

/// Lowers the baseline after underlying left the vault outside the share
/// flow (emergency withdrawal).
pub fn on_outflow(state: &mut VaultState, amount: i128) {
    state.harvest_baseline = (state.harvest_baseline - amount).max(0);
}
