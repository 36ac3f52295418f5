//! Reserve manager: keeps a liquid buffer next to the external position.

use soroban_sdk::{log, Address, Env};

use crate::adapter::{token_transfer, YieldAdapter};
use crate::errors::VaultError;
use crate::shares::{mul_div, Rounding};

pub(crate) const BPS_DENOMINATOR: i128 = 10_000;

/// How a deposit was split between the reserve and the external position.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DepositSplit {
    pub reserved: i128,
    pub deployed: i128,
}

/// `floor(amount * bp / 10000)`.
pub fn portion(amount: i128, bp: u32) -> Result<i128, VaultError> {
    mul_div(amount, bp as i128, BPS_DENOMINATOR, Rounding::Floor)
}

pub struct ReserveManager<'a> {
    env: &'a Env,
    adapter: YieldAdapter<'a>,
}

impl<'a> ReserveManager<'a> {
    pub fn load(env: &'a Env) -> Result<Self, VaultError> {
        Ok(Self {
            env,
            adapter: YieldAdapter::load(env)?,
        })
    }

    pub fn adapter(&self) -> &YieldAdapter<'a> {
        &self.adapter
    }

    pub fn reserve_balance(&self) -> Result<i128, VaultError> {
        self.adapter.asset_balance()
    }

    /// Reserve plus the live value of the external position.
    pub fn total_assets(&self) -> Result<i128, VaultError> {
        self.reserve_balance()?
            .checked_add(self.adapter.current_value()?)
            .ok_or(VaultError::ArithmeticOverflow)
    }

    /// Moves `amount` of the underlying from `from` into the reserve.
    pub fn pull(&self, from: &Address, amount: i128) -> Result<(), VaultError> {
        token_transfer(
            self.env,
            self.adapter.asset(),
            from,
            &self.env.current_contract_address(),
            amount,
        )
    }

    /// Pays `amount` of the underlying out of the reserve.
    pub fn pay(&self, to: &Address, amount: i128) -> Result<(), VaultError> {
        token_transfer(
            self.env,
            self.adapter.asset(),
            &self.env.current_contract_address(),
            to,
            amount,
        )
    }

    /// Keeps `reserve_ratio_bp` of a fresh deposit liquid and deploys the rest.
    pub fn split_deposit(&self, amount: i128, reserve_ratio_bp: u32) -> Result<DepositSplit, VaultError> {
        let reserved = portion(amount, reserve_ratio_bp)?;
        let deployed = amount - reserved;
        self.adapter.deploy(deployed)?;
        Ok(DepositSplit { reserved, deployed })
    }

    /// Makes sure the reserve can cover `needed`, recalling the shortfall.
    ///
    /// Returns the amount recalled from the external position.
    pub fn ensure_liquid(&self, needed: i128) -> Result<i128, VaultError> {
        let reserve = self.reserve_balance()?;
        if reserve >= needed {
            return Ok(0);
        }
        let shortfall = needed - reserve;
        let recalled = self.adapter.recall(shortfall)?;
        if recalled < shortfall {
            log!(
                self.env,
                "recall returned {} of {} needed for {}",
                recalled,
                shortfall,
                needed
            );
            return Err(VaultError::InsufficientLiquidity);
        }
        Ok(recalled)
    }

    /// Brings the reserve back to its target.
    ///
    /// Below target the shortfall is recalled, bounded by what is deployed;
    /// a pool returning less than that fails with `InsufficientLiquidity`.
    /// Above twice the target the excess over the target is deployed. In
    /// between nothing moves, so a second call right after the first is a
    /// no-op. Returns the net amount moved into the external position
    /// (negative when funds were recalled).
    pub fn rebalance(&self, reserve_ratio_bp: u32) -> Result<i128, VaultError> {
        let reserve = self.reserve_balance()?;
        let deployed = self.adapter.current_value()?;
        let total = reserve
            .checked_add(deployed)
            .ok_or(VaultError::ArithmeticOverflow)?;
        let target = portion(total, reserve_ratio_bp)?;

        if reserve < target {
            let wanted = (target - reserve).min(deployed);
            let recalled = self.adapter.recall(wanted)?;
            if recalled < wanted {
                log!(self.env, "rebalance recalled {} of {}", recalled, wanted);
                return Err(VaultError::InsufficientLiquidity);
            }
            return Ok(-recalled);
        }

        let ceiling = target.checked_mul(2).ok_or(VaultError::ArithmeticOverflow)?;
        if reserve > ceiling {
            let excess = reserve - target;
            self.adapter.deploy(excess)?;
            return Ok(excess);
        }

        Ok(0)
    }
}
