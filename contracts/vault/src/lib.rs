//! # Yield Vault Contract
//!
//! An ERC-4626 style vault for Soroban that deploys deposits into an external
//! lending pool and keeps a liquid reserve for withdrawals.
//!
//! ## Architecture Overview
//!
//! Users deposit the underlying asset and receive vault shares, a fungible
//! claim on a proportional part of the vault's total assets. Total assets are
//! the vault's own balance of the underlying (the *reserve*) plus the live
//! value of its position in the lending pool. The position accrues interest
//! on its own, so the price of a share rises without any action by the vault.
//!
//! ```text
//! total_assets = reserve + lending_pool.receipt_token.balance(vault)
//! ```
//!
//! The contract is split into one module per concern:
//!
//! - [`shares`]: conversion math and holder bookkeeping
//! - [`adapter`]: supply/withdraw calls to the lending pool, position value
//! - [`reserve`]: deposit split, withdrawal liquidity, rebalancing
//! - [`slippage`]: post-condition on the share price of every user flow
//! - [`harvest`]: yield recognition and performance fee
//! - [`emergency`]: pause gate and recovery operations
//!
//! ## Asset Flow
//!
//! ```text
//! Deposit Flow:
//! User → [Underlying] → [Vault reserve] ──reserve_ratio──> stays liquid
//!                              │
//!                              └──remainder──> [Lending pool] → receipt tokens
//!                      Shares minted to receiver
//!                      DepositEvent emitted
//!
//! Withdraw Flow:
//! User → [Vault.withdraw()] → reserve short? → recall from lending pool
//!                      Shares burned from owner
//!                      [Underlying] → receiver
//!                      WithdrawEvent emitted
//!
//! Harvest Flow (anyone, once per interval):
//! yield = total_assets - baseline
//! fee   = yield * performance_fee_bp / 10000 → treasury
//! HarvestEvent emitted
//! ```
//!
//! ## Atomicity
//!
//! Every entry point runs as one host invocation. Returning an error, or any
//! failed sub-invocation that is not caught, reverts every storage write and
//! token movement of the call. Calls to the lending pool go through `try_`
//! clients and surface as [`VaultError::AdapterOperationFailed`]. A
//! reentrancy flag guards every state-mutating entry point.
//!
//! ## Access Model
//!
//! - Users authorize their own deposits, withdrawals and share transfers
//!   (`require_auth()` on the acting address).
//! - The owner runs configuration and emergency operations; callers other
//!   than the owner get [`VaultError::Unauthorized`].
//! - `rebalance()` and `harvest()` are permissionless.
//! - Who may deposit at all (KYC, allow-lists) is decided by a wrapping
//!   access-control contract before it delegates to this one.

#![no_std]

use soroban_sdk::{contract, contractimpl, contracttype, log, Address, Env, Symbol};

pub mod adapter;
pub mod emergency;
pub mod errors;
pub mod events;
pub mod harvest;
pub mod reserve;
pub mod shares;
pub mod slippage;
pub mod storage;

pub use crate::errors::VaultError;
pub use crate::storage::{VaultConfig, VaultState};

use crate::events::{
    DepositEvent, EmergencyWithdrawEvent, HarvestEvent, LimitsUpdatedEvent, OwnershipEvent,
    RebalanceEvent, VaultInitializedEvent, WithdrawEvent,
};
use crate::reserve::{DepositSplit, ReserveManager};
use crate::shares::Rounding;
use crate::slippage::SlippageGuard;
use crate::storage::ReentrancyLock;

// ============================================================================
// DEFAULTS
// ============================================================================

/// 10% of total assets kept liquid.
pub const DEFAULT_RESERVE_RATIO_BP: u32 = 1_000;
/// 10% of recognized yield goes to the treasury.
pub const DEFAULT_PERFORMANCE_FEE_BP: u32 = 1_000;
/// Upper bound for the performance fee (30%).
pub const MAX_PERFORMANCE_FEE_BP: u32 = 3_000;
/// 0.5% tolerated share price drop inside one operation.
pub const DEFAULT_MAX_SLIPPAGE_BP: u32 = 50;
/// 1 USDC (7 decimal places).
pub const DEFAULT_MIN_DEPOSIT: i128 = 10_000_000;
/// 10K USDC per transaction.
pub const DEFAULT_MAX_DEPOSIT_PER_TX: i128 = 100_000_000_000;
/// 100M USDC total value locked.
pub const DEFAULT_MAX_TVL: i128 = 1_000_000_000_000_000;
pub const DEFAULT_HARVEST_INTERVAL_SECONDS: u64 = 86_400;
pub const MAX_BPS: u32 = 10_000;
pub const CONTRACT_VERSION: u32 = 1;

/// Snapshot returned by [`YieldVault::get_vault_stats`].
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultStats {
    pub total_assets: i128,
    pub total_shares: i128,
    pub reserve_balance: i128,
    pub external_balance: i128,
    pub total_deposited: i128,
    pub total_withdrawn: i128,
    pub total_yield_harvested: i128,
    pub total_fees_collected: i128,
}

// ============================================================================
// CONTRACT
// ============================================================================

/// Yield Vault - reserve-buffered lending vault on Soroban.
///
/// # Security Model
///
/// - Share price math rounds in the vault's favor in every direction
/// - A virtual share and a virtual asset dilute first-deposit donation attacks
/// - Every user flow is bounded by the slippage guard
/// - Deposits are capped per transaction and by total value locked
/// - Pausing stops deposits and position management; exits stay open
#[contract]
pub struct YieldVault;

#[contractimpl]
impl YieldVault {
    // ==========================================================================
    // INITIALIZATION
    // ==========================================================================

    /// Initializes the vault.
    ///
    /// Must be called exactly once after deployment. Looks up the lending
    /// pool's receipt token for `asset` and installs the default
    /// configuration.
    ///
    /// # Arguments
    /// * `env` - The Soroban environment
    /// * `owner` - Privileged operator (configuration, pause, emergency)
    /// * `asset` - The underlying token contract
    /// * `lending_pool` - The external lending pool
    /// * `treasury` - Recipient of performance fees
    ///
    /// # Errors
    /// - `AlreadyInitialized` if called a second time
    /// - `AdapterOperationFailed` if the pool does not answer `reserve_data`
    ///
    /// # Events
    /// Emits `VaultInitializedEvent` under `init`.
    pub fn initialize(
        env: Env,
        owner: Address,
        asset: Address,
        lending_pool: Address,
        treasury: Address,
    ) -> Result<(), VaultError> {
        if storage::is_initialized(&env) {
            return Err(VaultError::AlreadyInitialized);
        }
        owner.require_auth();

        let receipt_token = adapter::discover_receipt_token(&env, &lending_pool, &asset)?;

        storage::write_addresses(&env, &asset, &lending_pool, &receipt_token);
        storage::write_owner(&env, &owner);
        storage::write_version(&env, CONTRACT_VERSION);
        storage::write_state(
            &env,
            &VaultState {
                config: VaultConfig {
                    reserve_ratio_bp: DEFAULT_RESERVE_RATIO_BP,
                    performance_fee_bp: DEFAULT_PERFORMANCE_FEE_BP,
                    max_slippage_bp: DEFAULT_MAX_SLIPPAGE_BP,
                    min_deposit: DEFAULT_MIN_DEPOSIT,
                    max_deposit_per_tx: DEFAULT_MAX_DEPOSIT_PER_TX,
                    max_tvl: DEFAULT_MAX_TVL,
                    harvest_interval_seconds: DEFAULT_HARVEST_INTERVAL_SECONDS,
                    treasury: treasury.clone(),
                },
                total_shares: 0,
                total_deposited: 0,
                total_withdrawn: 0,
                total_yield_harvested: 0,
                total_fees_collected: 0,
                harvest_baseline: 0,
                last_harvest_timestamp: env.ledger().timestamp(),
                paused: false,
            },
        );
        storage::extend_instance(&env);

        events::initialized(
            &env,
            VaultInitializedEvent {
                owner,
                asset,
                lending_pool,
                receipt_token,
                treasury,
            },
        );
        Ok(())
    }

    // ==========================================================================
    // CORE LIFECYCLE - DEPOSIT / MINT
    // ==========================================================================

    /// Deposits `assets` of the underlying and mints shares to `receiver`.
    ///
    /// The reserve keeps `reserve_ratio_bp` of the deposit; the rest is
    /// supplied to the lending pool in the same invocation.
    ///
    /// # Arguments
    /// * `env` - The Soroban environment
    /// * `from` - Address paying the assets (must authorize)
    /// * `assets` - Amount of underlying to deposit
    /// * `receiver` - Address credited with the shares
    ///
    /// # Returns
    /// The number of shares minted, `floor(assets * (S + 1) / (A + 1))`.
    ///
    /// # Errors
    /// - `VaultPaused` while paused
    /// - `ZeroAmount`, `BelowMinDeposit`, `ExceedsMaxDeposit`, `ExceedsMaxTVL`
    /// - `AdapterOperationFailed` if the lending pool rejects the supply
    /// - `SlippageExceeded` if the supply lost value beyond tolerance
    ///
    /// # Events
    /// Emits `DepositEvent` under `deposit`.
    pub fn deposit(env: Env, from: Address, assets: i128, receiver: Address) -> Result<i128, VaultError> {
        from.require_auth();
        let _lock = ReentrancyLock::acquire(&env)?;
        storage::extend_instance(&env);

        let mut state = storage::read_state(&env)?;
        emergency::require_active(&state)?;
        let reserve = ReserveManager::load(&env)?;
        let total_assets = reserve.total_assets()?;

        shares::check_deposit_limits(&env, &state.config, total_assets, assets)?;
        let minted = shares::to_shares(assets, total_assets, state.total_shares, Rounding::Floor)?;
        if minted == 0 {
            return Err(VaultError::ZeroAmount);
        }

        let guard = SlippageGuard::new(total_assets, state.total_shares, state.config.max_slippage_bp);
        let split = Self::enter(&env, &mut state, &reserve, &from, &receiver, assets, minted)?;
        guard.check(&env, reserve.total_assets()?, state.total_shares)?;

        storage::write_state(&env, &state);
        events::deposit(
            &env,
            DepositEvent {
                caller: from,
                receiver,
                assets,
                shares: minted,
                reserved: split.reserved,
                deployed: split.deployed,
            },
        );
        Ok(minted)
    }

    /// Mints exactly `shares` to `receiver`, pulling the assets they cost.
    ///
    /// # Returns
    /// The assets charged, `ceil(shares * (A + 1) / (S + 1))`.
    ///
    /// # Errors
    /// Same as [`deposit`](Self::deposit); the limits apply to the charged
    /// asset amount.
    pub fn mint(env: Env, from: Address, shares: i128, receiver: Address) -> Result<i128, VaultError> {
        from.require_auth();
        let _lock = ReentrancyLock::acquire(&env)?;
        storage::extend_instance(&env);

        let mut state = storage::read_state(&env)?;
        emergency::require_active(&state)?;
        if shares <= 0 {
            return Err(VaultError::ZeroAmount);
        }
        let reserve = ReserveManager::load(&env)?;
        let total_assets = reserve.total_assets()?;

        let assets = shares::to_assets(shares, total_assets, state.total_shares, Rounding::Ceil)?;
        shares::check_deposit_limits(&env, &state.config, total_assets, assets)?;

        let guard = SlippageGuard::new(total_assets, state.total_shares, state.config.max_slippage_bp);
        let split = Self::enter(&env, &mut state, &reserve, &from, &receiver, assets, shares)?;
        guard.check(&env, reserve.total_assets()?, state.total_shares)?;

        storage::write_state(&env, &state);
        events::deposit(
            &env,
            DepositEvent {
                caller: from,
                receiver,
                assets,
                shares,
                reserved: split.reserved,
                deployed: split.deployed,
            },
        );
        Ok(assets)
    }

    // ==========================================================================
    // CORE LIFECYCLE - WITHDRAW / REDEEM
    // ==========================================================================

    /// Withdraws exactly `assets` to `receiver`, burning `owner`'s shares.
    ///
    /// The reserve pays first; any shortfall is recalled from the lending
    /// pool. Available while paused.
    ///
    /// # Arguments
    /// * `env` - The Soroban environment
    /// * `caller` - The acting address (must authorize); spends allowance
    ///   when it is not `owner`
    /// * `assets` - Amount of underlying to withdraw
    /// * `receiver` - Address receiving the underlying
    /// * `owner` - Address whose shares are burned
    ///
    /// # Returns
    /// The number of shares burned, `ceil(assets * (S + 1) / (A + 1))`.
    ///
    /// # Errors
    /// - `ZeroAmount`
    /// - `InsufficientLiquidity` if `assets` exceeds total assets or the pool
    ///   returns less than the shortfall
    /// - `InsufficientShares`, `InsufficientAllowance`
    /// - `AdapterOperationFailed`, `SlippageExceeded`
    ///
    /// # Events
    /// Emits `WithdrawEvent` under `withdraw`.
    pub fn withdraw(
        env: Env,
        caller: Address,
        assets: i128,
        receiver: Address,
        owner: Address,
    ) -> Result<i128, VaultError> {
        caller.require_auth();
        let _lock = ReentrancyLock::acquire(&env)?;
        storage::extend_instance(&env);

        let mut state = storage::read_state(&env)?;
        if assets <= 0 {
            return Err(VaultError::ZeroAmount);
        }
        let reserve = ReserveManager::load(&env)?;
        let total_assets = reserve.total_assets()?;
        if assets > total_assets {
            log!(&env, "withdraw of {} exceeds total assets {}", assets, total_assets);
            return Err(VaultError::InsufficientLiquidity);
        }

        let burned = shares::to_shares(assets, total_assets, state.total_shares, Rounding::Ceil)?;

        let guard = SlippageGuard::new(total_assets, state.total_shares, state.config.max_slippage_bp);
        let recalled = Self::exit(&env, &mut state, &reserve, &caller, &receiver, &owner, assets, burned)?;
        guard.check(&env, reserve.total_assets()?, state.total_shares)?;

        storage::write_state(&env, &state);
        events::withdraw(
            &env,
            WithdrawEvent {
                caller,
                receiver,
                owner,
                assets,
                shares: burned,
                recalled,
            },
        );
        Ok(burned)
    }

    /// Redeems exactly `shares` of `owner` for the underlying.
    ///
    /// # Returns
    /// The assets paid, `floor(shares * (A + 1) / (S + 1))`.
    ///
    /// # Errors
    /// Same as [`withdraw`](Self::withdraw).
    pub fn redeem(
        env: Env,
        caller: Address,
        shares: i128,
        receiver: Address,
        owner: Address,
    ) -> Result<i128, VaultError> {
        caller.require_auth();
        let _lock = ReentrancyLock::acquire(&env)?;
        storage::extend_instance(&env);

        let mut state = storage::read_state(&env)?;
        if shares <= 0 {
            return Err(VaultError::ZeroAmount);
        }
        let reserve = ReserveManager::load(&env)?;
        let total_assets = reserve.total_assets()?;

        let assets = shares::to_assets(shares, total_assets, state.total_shares, Rounding::Floor)?;
        if assets == 0 {
            return Err(VaultError::ZeroAmount);
        }

        let guard = SlippageGuard::new(total_assets, state.total_shares, state.config.max_slippage_bp);
        let recalled = Self::exit(&env, &mut state, &reserve, &caller, &receiver, &owner, assets, shares)?;
        guard.check(&env, reserve.total_assets()?, state.total_shares)?;

        storage::write_state(&env, &state);
        events::withdraw(
            &env,
            WithdrawEvent {
                caller,
                receiver,
                owner,
                assets,
                shares,
                recalled,
            },
        );
        Ok(assets)
    }

    // ==========================================================================
    // LIQUIDITY MANAGEMENT
    // ==========================================================================

    /// Moves funds between the reserve and the lending pool so the reserve
    /// sits at `reserve_ratio_bp` of total assets.
    ///
    /// Permissionless and idempotent: nothing moves while the reserve is
    /// between the target and twice the target.
    ///
    /// # Returns
    /// Net amount moved into the lending pool; negative when recalled.
    ///
    /// # Errors
    /// - `VaultPaused` while paused
    /// - `AdapterOperationFailed`
    ///
    /// # Events
    /// Emits `RebalanceEvent` under `rebalance` when funds moved.
    pub fn rebalance(env: Env) -> Result<i128, VaultError> {
        let _lock = ReentrancyLock::acquire(&env)?;
        storage::extend_instance(&env);

        let state = storage::read_state(&env)?;
        emergency::require_active(&state)?;
        let reserve = ReserveManager::load(&env)?;

        let reserve_before = reserve.reserve_balance()?;
        let moved = reserve.rebalance(state.config.reserve_ratio_bp)?;
        if moved != 0 {
            events::rebalance(
                &env,
                RebalanceEvent {
                    reserve_before,
                    reserve_after: reserve.reserve_balance()?,
                    moved,
                },
            );
        }
        Ok(moved)
    }

    /// Recognizes yield accrued since the last harvest and sends the
    /// performance fee to the treasury.
    ///
    /// # Returns
    /// The fee paid.
    ///
    /// # Errors
    /// - `HarvestTooSoon` before `last_harvest_timestamp + harvest_interval_seconds`
    /// - `VaultPaused` while paused
    /// - `InsufficientLiquidity` if the fee cannot be sourced
    ///
    /// # Events
    /// Emits `HarvestEvent` under `harvest`.
    pub fn harvest(env: Env) -> Result<i128, VaultError> {
        let _lock = ReentrancyLock::acquire(&env)?;
        storage::extend_instance(&env);

        let mut state = storage::read_state(&env)?;
        emergency::require_active(&state)?;
        let reserve = ReserveManager::load(&env)?;

        let outcome = harvest::harvest(&env, &mut state, &reserve)?;

        storage::write_state(&env, &state);
        events::harvest(
            &env,
            HarvestEvent {
                yield_amount: outcome.yield_amount,
                fee: outcome.fee,
                treasury: state.config.treasury.clone(),
                timestamp: state.last_harvest_timestamp,
            },
        );
        Ok(outcome.fee)
    }

    // ==========================================================================
    // PREVIEWS AND CONVERSIONS
    // ==========================================================================

    pub fn total_assets(env: Env) -> Result<i128, VaultError> {
        ReserveManager::load(&env)?.total_assets()
    }

    /// Shares minted for `assets` right now, rounded down.
    pub fn preview_deposit(env: Env, assets: i128) -> Result<i128, VaultError> {
        Self::convert(&env, assets, true, Rounding::Floor)
    }

    /// Assets charged for minting `shares` right now, rounded up.
    pub fn preview_mint(env: Env, shares: i128) -> Result<i128, VaultError> {
        Self::convert(&env, shares, false, Rounding::Ceil)
    }

    /// Shares burned for withdrawing `assets` right now, rounded up.
    pub fn preview_withdraw(env: Env, assets: i128) -> Result<i128, VaultError> {
        Self::convert(&env, assets, true, Rounding::Ceil)
    }

    /// Assets paid for redeeming `shares` right now, rounded down.
    pub fn preview_redeem(env: Env, shares: i128) -> Result<i128, VaultError> {
        Self::convert(&env, shares, false, Rounding::Floor)
    }

    pub fn convert_to_shares(env: Env, assets: i128) -> Result<i128, VaultError> {
        Self::convert(&env, assets, true, Rounding::Floor)
    }

    pub fn convert_to_assets(env: Env, shares: i128) -> Result<i128, VaultError> {
        Self::convert(&env, shares, false, Rounding::Floor)
    }

    /// Largest deposit that would currently pass every limit, or zero.
    pub fn max_deposit(env: Env, _receiver: Address) -> Result<i128, VaultError> {
        let state = storage::read_state(&env)?;
        if state.paused {
            return Ok(0);
        }
        let total_assets = ReserveManager::load(&env)?.total_assets()?;
        let room = (state.config.max_tvl - total_assets).max(0);
        let max = room.min(state.config.max_deposit_per_tx);
        if max < state.config.min_deposit {
            return Ok(0);
        }
        Ok(max)
    }

    pub fn max_mint(env: Env, receiver: Address) -> Result<i128, VaultError> {
        let assets = Self::max_deposit(env.clone(), receiver)?;
        Self::convert(&env, assets, true, Rounding::Floor)
    }

    pub fn max_withdraw(env: Env, owner: Address) -> Result<i128, VaultError> {
        let balance = storage::read_shares(&env, &owner);
        Self::convert(&env, balance, false, Rounding::Floor)
    }

    pub fn max_redeem(env: Env, owner: Address) -> i128 {
        storage::read_shares(&env, &owner)
    }

    // ==========================================================================
    // SHARE TOKEN
    // ==========================================================================

    pub fn balance(env: Env, id: Address) -> i128 {
        storage::read_shares(&env, &id)
    }

    pub fn total_supply(env: Env) -> Result<i128, VaultError> {
        Ok(storage::read_state(&env)?.total_shares)
    }

    /// Moves `amount` shares from `from` to `to`.
    ///
    /// # Events
    /// Emits `ShareTransferEvent` under `transfer`.
    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), VaultError> {
        from.require_auth();
        let _lock = ReentrancyLock::acquire(&env)?;
        storage::extend_instance(&env);

        shares::transfer(&env, &from, &to, amount)?;
        events::share_transfer(&env, from, to, amount);
        Ok(())
    }

    /// Moves `amount` shares from `from` to `to` on `spender`'s allowance.
    pub fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), VaultError> {
        spender.require_auth();
        let _lock = ReentrancyLock::acquire(&env)?;
        storage::extend_instance(&env);
        if amount < 0 {
            return Err(VaultError::NegativeAmount);
        }

        shares::spend_allowance(&env, &from, &spender, amount)?;
        shares::transfer(&env, &from, &to, amount)?;
        events::share_transfer(&env, from, to, amount);
        Ok(())
    }

    /// Sets the allowance of `spender` over `owner`'s shares to `amount`.
    /// Withdraw, redeem and `transfer_from` by `spender` consume it.
    pub fn approve(env: Env, owner: Address, spender: Address, amount: i128) -> Result<(), VaultError> {
        owner.require_auth();
        let _lock = ReentrancyLock::acquire(&env)?;
        if amount < 0 {
            return Err(VaultError::NegativeAmount);
        }
        storage::extend_instance(&env);

        storage::write_allowance(&env, &owner, &spender, amount);
        events::share_approval(&env, owner, spender, amount);
        Ok(())
    }

    pub fn allowance(env: Env, owner: Address, spender: Address) -> i128 {
        storage::read_allowance(&env, &owner, &spender)
    }

    // ==========================================================================
    // ADMINISTRATIVE - CONFIGURATION
    // ==========================================================================

    /// Sets the target reserve share of total assets.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the owner
    /// - `InvalidRatio` above 10000 bp
    pub fn set_reserve_ratio(env: Env, caller: Address, reserve_ratio_bp: u32) -> Result<(), VaultError> {
        Self::require_owner(&env, &caller)?;
        let _lock = ReentrancyLock::acquire(&env)?;
        if reserve_ratio_bp > MAX_BPS {
            return Err(VaultError::InvalidRatio);
        }

        let mut state = storage::read_state(&env)?;
        let old = state.config.reserve_ratio_bp;
        state.config.reserve_ratio_bp = reserve_ratio_bp;
        storage::write_state(&env, &state);

        events::parameter_updated(
            &env,
            Symbol::new(&env, "reserve_ratio_bp"),
            old as i128,
            reserve_ratio_bp as i128,
        );
        Ok(())
    }

    /// Sets the performance fee taken on harvest.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the owner
    /// - `InvalidFee` above [`MAX_PERFORMANCE_FEE_BP`]
    pub fn set_performance_fee(env: Env, caller: Address, performance_fee_bp: u32) -> Result<(), VaultError> {
        Self::require_owner(&env, &caller)?;
        let _lock = ReentrancyLock::acquire(&env)?;
        if performance_fee_bp > MAX_PERFORMANCE_FEE_BP {
            return Err(VaultError::InvalidFee);
        }

        let mut state = storage::read_state(&env)?;
        let old = state.config.performance_fee_bp;
        state.config.performance_fee_bp = performance_fee_bp;
        storage::write_state(&env, &state);

        events::parameter_updated(
            &env,
            Symbol::new(&env, "performance_fee_bp"),
            old as i128,
            performance_fee_bp as i128,
        );
        Ok(())
    }

    /// Sets the tolerated share price drop per operation.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the owner
    /// - `InvalidRatio` above 10000 bp
    pub fn set_max_slippage(env: Env, caller: Address, max_slippage_bp: u32) -> Result<(), VaultError> {
        Self::require_owner(&env, &caller)?;
        let _lock = ReentrancyLock::acquire(&env)?;
        if max_slippage_bp > MAX_BPS {
            return Err(VaultError::InvalidRatio);
        }

        let mut state = storage::read_state(&env)?;
        let old = state.config.max_slippage_bp;
        state.config.max_slippage_bp = max_slippage_bp;
        storage::write_state(&env, &state);

        events::parameter_updated(
            &env,
            Symbol::new(&env, "max_slippage_bp"),
            old as i128,
            max_slippage_bp as i128,
        );
        Ok(())
    }

    /// Sets the minimum deposit, the per-transaction cap and the TVL cap.
    ///
    /// Lowering a cap below the current level does not touch existing
    /// positions; it only rejects new deposits.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the owner
    /// - `InvalidLimits` unless `0 < min_deposit <= max_deposit_per_tx` and
    ///   `min_deposit <= max_tvl`
    ///
    /// # Events
    /// Emits `LimitsUpdatedEvent` under `limits`.
    pub fn set_limits(
        env: Env,
        caller: Address,
        min_deposit: i128,
        max_deposit_per_tx: i128,
        max_tvl: i128,
    ) -> Result<(), VaultError> {
        Self::require_owner(&env, &caller)?;
        let _lock = ReentrancyLock::acquire(&env)?;
        if min_deposit <= 0 || max_deposit_per_tx < min_deposit || max_tvl < min_deposit {
            return Err(VaultError::InvalidLimits);
        }

        let mut state = storage::read_state(&env)?;
        let event = LimitsUpdatedEvent {
            old_min: state.config.min_deposit,
            new_min: min_deposit,
            old_max: state.config.max_deposit_per_tx,
            new_max: max_deposit_per_tx,
            old_tvl: state.config.max_tvl,
            new_tvl: max_tvl,
        };
        state.config.min_deposit = min_deposit;
        state.config.max_deposit_per_tx = max_deposit_per_tx;
        state.config.max_tvl = max_tvl;
        storage::write_state(&env, &state);

        events::limits_updated(&env, event);
        Ok(())
    }

    pub fn set_harvest_interval(env: Env, caller: Address, harvest_interval_seconds: u64) -> Result<(), VaultError> {
        Self::require_owner(&env, &caller)?;
        let _lock = ReentrancyLock::acquire(&env)?;

        let mut state = storage::read_state(&env)?;
        let old = state.config.harvest_interval_seconds;
        state.config.harvest_interval_seconds = harvest_interval_seconds;
        storage::write_state(&env, &state);

        events::parameter_updated(
            &env,
            Symbol::new(&env, "harvest_interval"),
            old as i128,
            harvest_interval_seconds as i128,
        );
        Ok(())
    }

    pub fn set_treasury(env: Env, caller: Address, treasury: Address) -> Result<(), VaultError> {
        Self::require_owner(&env, &caller)?;
        let _lock = ReentrancyLock::acquire(&env)?;

        let mut state = storage::read_state(&env)?;
        let old = state.config.treasury.clone();
        state.config.treasury = treasury.clone();
        storage::write_state(&env, &state);

        events::treasury_updated(&env, old, treasury);
        Ok(())
    }

    /// First step of an ownership transfer. The new owner must call
    /// [`accept_ownership`](Self::accept_ownership).
    pub fn propose_owner(env: Env, caller: Address, new_owner: Address) -> Result<(), VaultError> {
        Self::require_owner(&env, &caller)?;
        let _lock = ReentrancyLock::acquire(&env)?;
        storage::write_pending_owner(&env, &new_owner);
        events::ownership(
            &env,
            OwnershipEvent {
                old_owner: caller,
                new_owner,
                pending: true,
            },
        );
        Ok(())
    }

    pub fn accept_ownership(env: Env, new_owner: Address) -> Result<(), VaultError> {
        new_owner.require_auth();
        let _lock = ReentrancyLock::acquire(&env)?;
        storage::extend_instance(&env);
        let pending = storage::read_pending_owner(&env).ok_or(VaultError::NoPendingOwner)?;
        if pending != new_owner {
            return Err(VaultError::Unauthorized);
        }
        let old_owner = storage::read_owner(&env)?;
        storage::write_owner(&env, &new_owner);
        storage::clear_pending_owner(&env);
        events::ownership(
            &env,
            OwnershipEvent {
                old_owner,
                new_owner,
                pending: false,
            },
        );
        Ok(())
    }

    // ==========================================================================
    // ADMINISTRATIVE - PAUSE AND EMERGENCY
    // ==========================================================================

    /// Pauses the vault.
    ///
    /// While paused deposits, mints, rebalancing and harvesting fail with
    /// `VaultPaused`; withdrawals, redemptions and share transfers continue.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the owner
    /// - `AlreadyPaused`
    ///
    /// # Events
    /// Emits `PauseEvent` under `pause`.
    pub fn pause(env: Env, caller: Address) -> Result<(), VaultError> {
        Self::require_owner(&env, &caller)?;
        let _lock = ReentrancyLock::acquire(&env)?;

        let mut state = storage::read_state(&env)?;
        emergency::pause(&mut state)?;
        storage::write_state(&env, &state);

        events::paused(&env, caller);
        Ok(())
    }

    /// Unpauses the vault.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the owner
    /// - `AlreadyActive`
    pub fn unpause(env: Env, caller: Address) -> Result<(), VaultError> {
        Self::require_owner(&env, &caller)?;
        let _lock = ReentrancyLock::acquire(&env)?;

        let mut state = storage::read_state(&env)?;
        emergency::unpause(&mut state)?;
        storage::write_state(&env, &state);

        events::unpaused(&env, caller);
        Ok(())
    }

    /// Sends `amount` of any token held by the vault to `to`.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the owner
    /// - `NotPaused` unless the vault is paused
    /// - `InsufficientLiquidity` if the vault holds less than `amount`
    ///
    /// # Events
    /// Emits `EmergencyWithdrawEvent` under `emergency`.
    pub fn emergency_withdraw(
        env: Env,
        caller: Address,
        token: Address,
        amount: i128,
        to: Address,
    ) -> Result<(), VaultError> {
        Self::require_owner(&env, &caller)?;
        let _lock = ReentrancyLock::acquire(&env)?;

        let mut state = storage::read_state(&env)?;
        let reserve = ReserveManager::load(&env)?;
        emergency::emergency_withdraw(&env, &mut state, &reserve, &token, amount, &to)?;
        storage::write_state(&env, &state);

        events::emergency_withdraw(&env, EmergencyWithdrawEvent { token, amount, to });
        Ok(())
    }

    /// Recalls the whole lending position into the reserve.
    ///
    /// # Returns
    /// The amount that arrived in the reserve.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the owner
    /// - `NotPaused` unless the vault is paused
    /// - `AdapterOperationFailed`
    pub fn emergency_recall_all(env: Env, caller: Address) -> Result<i128, VaultError> {
        Self::require_owner(&env, &caller)?;
        let _lock = ReentrancyLock::acquire(&env)?;

        let state = storage::read_state(&env)?;
        let reserve = ReserveManager::load(&env)?;
        let recalled = emergency::recall_all(&env, &state, &reserve)?;

        events::recall_all(&env, recalled);
        Ok(recalled)
    }

    // ==========================================================================
    // READ FUNCTIONS
    // ==========================================================================

    /// Returns the accounting snapshot of the vault.
    ///
    /// `total_assets == reserve_balance + external_balance` holds for every
    /// snapshot.
    pub fn get_vault_stats(env: Env) -> Result<VaultStats, VaultError> {
        let state = storage::read_state(&env)?;
        let reserve = ReserveManager::load(&env)?;
        let reserve_balance = reserve.reserve_balance()?;
        let external_balance = reserve.adapter().current_value()?;
        Ok(VaultStats {
            total_assets: reserve_balance
                .checked_add(external_balance)
                .ok_or(VaultError::ArithmeticOverflow)?,
            total_shares: state.total_shares,
            reserve_balance,
            external_balance,
            total_deposited: state.total_deposited,
            total_withdrawn: state.total_withdrawn,
            total_yield_harvested: state.total_yield_harvested,
            total_fees_collected: state.total_fees_collected,
        })
    }

    pub fn get_config(env: Env) -> Result<VaultConfig, VaultError> {
        Ok(storage::read_state(&env)?.config)
    }

    pub fn get_state(env: Env) -> Result<VaultState, VaultError> {
        storage::read_state(&env)
    }

    pub fn get_owner(env: Env) -> Result<Address, VaultError> {
        storage::read_owner(&env)
    }

    pub fn get_pending_owner(env: Env) -> Option<Address> {
        storage::read_pending_owner(&env)
    }

    pub fn get_asset(env: Env) -> Result<Address, VaultError> {
        storage::read_asset(&env)
    }

    pub fn get_lending_pool(env: Env) -> Result<Address, VaultError> {
        storage::read_lending_pool(&env)
    }

    pub fn get_receipt_token(env: Env) -> Result<Address, VaultError> {
        storage::read_receipt_token(&env)
    }

    pub fn get_treasury(env: Env) -> Result<Address, VaultError> {
        Ok(storage::read_state(&env)?.config.treasury)
    }

    pub fn is_paused(env: Env) -> bool {
        storage::read_state(&env)
            .map(|state| state.paused)
            .unwrap_or(false)
    }

    pub fn get_version(env: Env) -> u32 {
        storage::read_version(&env)
    }
}

// ============================================================================
// INTERNAL HELPERS
// ============================================================================

impl YieldVault {
    /// Validates that `caller` authorized the call and is the owner.
    fn require_owner(env: &Env, caller: &Address) -> Result<(), VaultError> {
        caller.require_auth();
        let owner = storage::read_owner(env)?;
        if *caller != owner {
            log!(env, "privileged call from non-owner");
            return Err(VaultError::Unauthorized);
        }
        storage::extend_instance(env);
        Ok(())
    }

    /// Converts at the current price. `to_shares` selects the direction.
    fn convert(env: &Env, amount: i128, to_shares: bool, rounding: Rounding) -> Result<i128, VaultError> {
        if amount < 0 {
            return Err(VaultError::NegativeAmount);
        }
        let state = storage::read_state(env)?;
        let total_assets = ReserveManager::load(env)?.total_assets()?;
        if to_shares {
            shares::to_shares(amount, total_assets, state.total_shares, rounding)
        } else {
            shares::to_assets(amount, total_assets, state.total_shares, rounding)
        }
    }

    /// Shared tail of deposit and mint: pull, mint, split.
    fn enter(
        env: &Env,
        state: &mut VaultState,
        reserve: &ReserveManager,
        from: &Address,
        receiver: &Address,
        assets: i128,
        minted: i128,
    ) -> Result<DepositSplit, VaultError> {
        reserve.pull(from, assets)?;
        shares::mint(env, state, receiver, minted)?;
        state.total_deposited = state
            .total_deposited
            .checked_add(assets)
            .ok_or(VaultError::ArithmeticOverflow)?;
        harvest::on_deposit(state, assets)?;
        reserve.split_deposit(assets, state.config.reserve_ratio_bp)
    }

    /// Shared tail of withdraw and redeem: allowance, burn, source, pay.
    ///
    /// Returns the amount recalled from the lending pool.
    #[allow(clippy::too_many_arguments)]
    fn exit(
        env: &Env,
        state: &mut VaultState,
        reserve: &ReserveManager,
        caller: &Address,
        receiver: &Address,
        owner: &Address,
        assets: i128,
        burned: i128,
    ) -> Result<i128, VaultError> {
        if caller != owner {
            shares::spend_allowance(env, owner, caller, burned)?;
        }
        let supply_before = state.total_shares;
        shares::burn(env, state, owner, burned)?;
        harvest::on_burn(state, burned, supply_before)?;

        let recalled = reserve.ensure_liquid(assets)?;
        reserve.pay(receiver, assets)?;
        state.total_withdrawn = state
            .total_withdrawn
            .checked_add(assets)
            .ok_or(VaultError::ArithmeticOverflow)?;
        Ok(recalled)
    }
}

#[cfg(test)]
mod testutils;
