//! Share ledger: asset/share conversion and holder bookkeeping.
//!
//! ## Conversion
//!
//! Every conversion adds one virtual share and one virtual asset to the
//! supply and the assets:
//!
//! ```text
//! shares = assets * (total_shares + 1) / (total_assets + 1)
//! assets = shares * (total_assets + 1) / (total_shares + 1)
//! ```
//!
//! On an empty vault this is exactly 1:1. Assets donated to the vault before
//! the first deposit are shared with the virtual share, so inflating the
//! price ahead of a victim's deposit costs the attacker at least as much as
//! the victim loses. Combined with `min_deposit` the attack is uneconomical.
//!
//! Rounding always favors the vault: deposit and redeem round down, mint and
//! withdraw round up.

use soroban_sdk::{log, Address, Env};

use crate::errors::VaultError;
use crate::storage::{self, VaultConfig, VaultState};

pub(crate) const VIRTUAL_SHARES: i128 = 1;
pub(crate) const VIRTUAL_ASSETS: i128 = 1;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Rounding {
    Floor,
    Ceil,
}

/// `x * y / denominator` with the requested rounding.
///
/// Inputs are non-negative amounts; `denominator` must be positive.
pub fn mul_div(x: i128, y: i128, denominator: i128, rounding: Rounding) -> Result<i128, VaultError> {
    if x < 0 || y < 0 || denominator <= 0 {
        return Err(VaultError::ArithmeticOverflow);
    }
    let product = x.checked_mul(y).ok_or(VaultError::ArithmeticOverflow)?;
    let quotient = product / denominator;
    match rounding {
        Rounding::Floor => Ok(quotient),
        Rounding::Ceil if product % denominator != 0 => {
            quotient.checked_add(1).ok_or(VaultError::ArithmeticOverflow)
        }
        Rounding::Ceil => Ok(quotient),
    }
}

pub fn to_shares(
    assets: i128,
    total_assets: i128,
    total_shares: i128,
    rounding: Rounding,
) -> Result<i128, VaultError> {
    let supply = total_shares
        .checked_add(VIRTUAL_SHARES)
        .ok_or(VaultError::ArithmeticOverflow)?;
    let backing = total_assets
        .checked_add(VIRTUAL_ASSETS)
        .ok_or(VaultError::ArithmeticOverflow)?;
    mul_div(assets, supply, backing, rounding)
}

pub fn to_assets(
    shares: i128,
    total_assets: i128,
    total_shares: i128,
    rounding: Rounding,
) -> Result<i128, VaultError> {
    let supply = total_shares
        .checked_add(VIRTUAL_SHARES)
        .ok_or(VaultError::ArithmeticOverflow)?;
    let backing = total_assets
        .checked_add(VIRTUAL_ASSETS)
        .ok_or(VaultError::ArithmeticOverflow)?;
    mul_div(shares, backing, supply, rounding)
}

/// Validates an incoming asset amount against the configured limits.
pub fn check_deposit_limits(
    env: &Env,
    config: &VaultConfig,
    total_assets: i128,
    assets: i128,
) -> Result<(), VaultError> {
    if assets <= 0 {
        return Err(VaultError::ZeroAmount);
    }
    if assets < config.min_deposit {
        log!(env, "deposit {} below minimum {}", assets, config.min_deposit);
        return Err(VaultError::BelowMinDeposit);
    }
    if assets > config.max_deposit_per_tx {
        log!(env, "deposit {} above per-tx cap {}", assets, config.max_deposit_per_tx);
        return Err(VaultError::ExceedsMaxDeposit);
    }
    let tvl_after = total_assets
        .checked_add(assets)
        .ok_or(VaultError::ArithmeticOverflow)?;
    if tvl_after > config.max_tvl {
        log!(env, "deposit would lift tvl to {} above cap {}", tvl_after, config.max_tvl);
        return Err(VaultError::ExceedsMaxTVL);
    }
    Ok(())
}

pub fn mint(env: &Env, state: &mut VaultState, to: &Address, shares: i128) -> Result<(), VaultError> {
    let balance = storage::read_shares(env, to)
        .checked_add(shares)
        .ok_or(VaultError::ArithmeticOverflow)?;
    state.total_shares = state
        .total_shares
        .checked_add(shares)
        .ok_or(VaultError::ArithmeticOverflow)?;
    storage::write_shares(env, to, balance);
    Ok(())
}

pub fn burn(env: &Env, state: &mut VaultState, from: &Address, shares: i128) -> Result<(), VaultError> {
    let balance = storage::read_shares(env, from);
    if balance < shares {
        log!(env, "burn of {} shares exceeds balance {}", shares, balance);
        return Err(VaultError::InsufficientShares);
    }
    state.total_shares = state
        .total_shares
        .checked_sub(shares)
        .filter(|total| *total >= 0)
        .ok_or(VaultError::ArithmeticOverflow)?;
    storage::write_shares(env, from, balance - shares);
    Ok(())
}

pub fn transfer(env: &Env, from: &Address, to: &Address, shares: i128) -> Result<(), VaultError> {
    if shares < 0 {
        return Err(VaultError::NegativeAmount);
    }
    let from_balance = storage::read_shares(env, from);
    if from_balance < shares {
        return Err(VaultError::InsufficientShares);
    }
    storage::write_shares(env, from, from_balance - shares);
    let to_balance = storage::read_shares(env, to)
        .checked_add(shares)
        .ok_or(VaultError::ArithmeticOverflow)?;
    storage::write_shares(env, to, to_balance);
    Ok(())
}

/// Consumes `shares` of the allowance `owner` granted to `spender`.
pub fn spend_allowance(
    env: &Env,
    owner: &Address,
    spender: &Address,
    shares: i128,
) -> Result<(), VaultError> {
    let allowance = storage::read_allowance(env, owner, spender);
    if allowance < shares {
        log!(env, "allowance {} short of {}", allowance, shares);
        return Err(VaultError::InsufficientAllowance);
    }
    storage::write_allowance(env, owner, spender, allowance - shares);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_vault_converts_one_to_one() {
        assert_eq!(to_shares(1000, 0, 0, Rounding::Floor), Ok(1000));
        assert_eq!(to_assets(1000, 0, 0, Rounding::Floor), Ok(1000));
    }

    #[test]
    fn deposit_after_accrual_rounds_down() {
        // 1050 assets backing 1000 shares
        assert_eq!(to_shares(1050, 1050, 1000, Rounding::Floor), Ok(1000));
        assert_eq!(to_shares(1, 1050, 1000, Rounding::Floor), Ok(0));
        assert_eq!(to_shares(1, 1050, 1000, Rounding::Ceil), Ok(1));
    }

    #[test]
    fn redeem_never_pays_more_than_mint_charges() {
        let (total_assets, total_shares) = (1_234_567, 1_000_003);
        for shares in [1_i128, 7, 999, 123_456] {
            let paid = to_assets(shares, total_assets, total_shares, Rounding::Ceil).unwrap();
            let returned = to_assets(shares, total_assets, total_shares, Rounding::Floor).unwrap();
            assert!(returned <= paid);
            assert!(paid - returned <= 1);
        }
    }

    #[test]
    fn donation_before_first_deposit_is_diluted() {
        // attacker holds 1 share and donates 10_000 directly to the reserve
        let shares = to_shares(10_000, 10_001, 1, Rounding::Floor).unwrap();
        assert_eq!(shares, 1);
        // the victim keeps two thirds of the deposit; the attacker eats the rest
        let value = to_assets(shares, 20_001, 2, Rounding::Floor).unwrap();
        assert!(value >= 6_000);
    }

    #[test]
    fn mul_div_rejects_overflow_and_bad_denominator() {
        assert_eq!(
            mul_div(i128::MAX, 2, 1, Rounding::Floor),
            Err(VaultError::ArithmeticOverflow)
        );
        assert_eq!(mul_div(1, 1, 0, Rounding::Floor), Err(VaultError::ArithmeticOverflow));
        assert_eq!(mul_div(10, 3, 4, Rounding::Ceil), Ok(8));
        assert_eq!(mul_div(10, 4, 4, Rounding::Ceil), Ok(10));
    }
}
