#![cfg(test)]

//! In-memory lending pool used by the contract tests.
//!
//! The pool doubles as its own receipt token: `balance(id)` is the value of
//! `id`'s position, and `accrue` raises it to simulate interest. Knobs let a
//! test make supply or withdraw fail, make the position unreadable, credit
//! less than was supplied, burn more position than a withdrawal pays out, or
//! cap how much a single withdrawal returns.

use soroban_sdk::{contract, contracterror, contractimpl, contracttype, token, Address, Env};

use crate::adapter::ReserveData;

#[contracttype]
#[derive(Clone)]
pub enum PoolKey {
    Asset,
    Rate,
    Position(Address),
    LiquidityCap,
    FailSupply,
    FailWithdraw,
    FailBalance,
    SupplyHaircutBp,
    WithdrawHaircutBp,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum PoolError {
    SupplyDisabled = 1,
    UnknownAsset = 2,
    WithdrawDisabled = 3,
    BalanceUnavailable = 4,
}

#[contract]
pub struct MockLendingPool;

#[contractimpl]
impl MockLendingPool {
    pub fn setup(env: Env, asset: Address, rate: i128) {
        env.storage().instance().set(&PoolKey::Asset, &asset);
        env.storage().instance().set(&PoolKey::Rate, &rate);
    }

    pub fn reserve_data(env: Env, asset: Address) -> Result<ReserveData, PoolError> {
        let listed: Address = env
            .storage()
            .instance()
            .get(&PoolKey::Asset)
            .ok_or(PoolError::UnknownAsset)?;
        if listed != asset {
            return Err(PoolError::UnknownAsset);
        }
        Ok(ReserveData {
            receipt_token: env.current_contract_address(),
            current_liquidity_rate: env.storage().instance().get(&PoolKey::Rate).unwrap_or(0),
        })
    }

    pub fn supply(
        env: Env,
        from: Address,
        asset: Address,
        amount: i128,
        on_behalf_of: Address,
        _referral_code: u32,
    ) -> Result<(), PoolError> {
        from.require_auth();
        if Self::flag(&env, PoolKey::FailSupply) {
            return Err(PoolError::SupplyDisabled);
        }
        token::Client::new(&env, &asset).transfer(&from, &env.current_contract_address(), &amount);

        let haircut_bp: i128 = env
            .storage()
            .instance()
            .get(&PoolKey::SupplyHaircutBp)
            .unwrap_or(0);
        let credited = amount - amount * haircut_bp / 10_000;
        let position = Self::position(&env, &on_behalf_of);
        Self::write_position(&env, &on_behalf_of, position + credited);
        Ok(())
    }

    pub fn withdraw(
        env: Env,
        from: Address,
        asset: Address,
        amount: i128,
        to: Address,
    ) -> Result<i128, PoolError> {
        from.require_auth();
        if Self::flag(&env, PoolKey::FailWithdraw) {
            return Err(PoolError::WithdrawDisabled);
        }
        let position = Self::position(&env, &from);
        let cap: i128 = env
            .storage()
            .instance()
            .get(&PoolKey::LiquidityCap)
            .unwrap_or(i128::MAX);
        let sent = amount.min(position).min(cap);
        if sent <= 0 {
            return Ok(0);
        }
        let haircut_bp: i128 = env
            .storage()
            .instance()
            .get(&PoolKey::WithdrawHaircutBp)
            .unwrap_or(0);
        let burned = (sent + sent * haircut_bp / 10_000).min(position);
        Self::write_position(&env, &from, position - burned);
        token::Client::new(&env, &asset).transfer(&env.current_contract_address(), &to, &sent);
        Ok(sent)
    }

    pub fn balance(env: Env, id: Address) -> Result<i128, PoolError> {
        if Self::flag(&env, PoolKey::FailBalance) {
            return Err(PoolError::BalanceUnavailable);
        }
        Ok(Self::position(&env, &id))
    }

    /// Grows `id`'s position by `amount`. The test must fund the pool with
    /// the matching underlying for the interest to be withdrawable.
    pub fn accrue(env: Env, id: Address, amount: i128) {
        let position = Self::position(&env, &id);
        Self::write_position(&env, &id, position + amount);
    }

    /// Marks down `id`'s position, as after a bad-debt event.
    pub fn slash(env: Env, id: Address, amount: i128) {
        let position = Self::position(&env, &id);
        Self::write_position(&env, &id, (position - amount).max(0));
    }

    pub fn set_liquidity_cap(env: Env, cap: i128) {
        env.storage().instance().set(&PoolKey::LiquidityCap, &cap);
    }

    pub fn set_fail_supply(env: Env, fail: bool) {
        env.storage().instance().set(&PoolKey::FailSupply, &fail);
    }

    pub fn set_supply_haircut(env: Env, haircut_bp: i128) {
        env.storage().instance().set(&PoolKey::SupplyHaircutBp, &haircut_bp);
    }

    pub fn set_fail_withdraw(env: Env, fail: bool) {
        env.storage().instance().set(&PoolKey::FailWithdraw, &fail);
    }

    pub fn set_fail_balance(env: Env, fail: bool) {
        env.storage().instance().set(&PoolKey::FailBalance, &fail);
    }

    /// Extra position burned on each withdrawal, in bp of the amount sent.
    pub fn set_withdraw_haircut(env: Env, haircut_bp: i128) {
        env.storage().instance().set(&PoolKey::WithdrawHaircutBp, &haircut_bp);
    }
}

impl MockLendingPool {
    fn position(env: &Env, id: &Address) -> i128 {
        env.storage()
            .persistent()
            .get(&PoolKey::Position(id.clone()))
            .unwrap_or(0)
    }

    fn flag(env: &Env, key: PoolKey) -> bool {
        env.storage().instance().get(&key).unwrap_or(false)
    }

    fn write_position(env: &Env, id: &Address, value: i128) {
        env.storage()
            .persistent()
            .set(&PoolKey::Position(id.clone()), &value);
    }
}
