//! Storage layout, the vault state record, TTL management and the
//! reentrancy lock.
//!
//! ## Layout
//!
//! ### Instance storage (contract-wide, lives as long as the contract)
//! - `State`: the [`VaultState`] record (configuration, counters, pause flag)
//! - `Owner` / `PendingOwner`: privileged operator and a proposed successor
//! - `Asset`, `LendingPool`, `ReceiptToken`: addresses fixed at initialization
//! - `Locked`: reentrancy flag, present only while an operation runs
//! - `Version`: contract version for upgrade tracking
//!
//! ### Persistent storage (per holder)
//! - `Shares(holder)`: share balance, removed when it drops to zero
//! - `Allowance(owner, spender)`: shares `spender` may move for `owner`

use soroban_sdk::{contracttype, Address, Env};

use crate::errors::VaultError;

pub(crate) const DAY_IN_LEDGERS: u32 = 17_280;
pub(crate) const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub(crate) const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;
pub(crate) const HOLDER_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub(crate) const HOLDER_LIFETIME_THRESHOLD: u32 = HOLDER_BUMP_AMOUNT - DAY_IN_LEDGERS;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AllowanceKey {
    pub owner: Address,
    pub spender: Address,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    State,
    Owner,
    PendingOwner,
    Asset,
    LendingPool,
    ReceiptToken,
    Locked,
    Version,
    Shares(Address),
    Allowance(AllowanceKey),
}

/// Parameters the owner may tune after deployment.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultConfig {
    /// Target share of total assets kept liquid, in basis points.
    pub reserve_ratio_bp: u32,
    /// Share of recognized yield sent to the treasury on harvest.
    pub performance_fee_bp: u32,
    /// Largest tolerated drop of the share price inside one operation.
    pub max_slippage_bp: u32,
    pub min_deposit: i128,
    pub max_deposit_per_tx: i128,
    pub max_tvl: i128,
    pub harvest_interval_seconds: u64,
    pub treasury: Address,
}

/// The single state record of a vault instance.
///
/// Every entry point reads it once, mutates the local copy and writes it back
/// before returning. A failed operation never writes it.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultState {
    pub config: VaultConfig,
    pub total_shares: i128,
    pub total_deposited: i128,
    pub total_withdrawn: i128,
    pub total_yield_harvested: i128,
    pub total_fees_collected: i128,
    /// Asset level that is principal rather than yield; see `harvest`.
    pub harvest_baseline: i128,
    pub last_harvest_timestamp: u64,
    pub paused: bool,
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::State)
}

pub fn read_state(env: &Env) -> Result<VaultState, VaultError> {
    env.storage()
        .instance()
        .get(&DataKey::State)
        .ok_or(VaultError::NotInitialized)
}

pub fn write_state(env: &Env, state: &VaultState) {
    env.storage().instance().set(&DataKey::State, state);
}

fn read_address(env: &Env, key: &DataKey) -> Result<Address, VaultError> {
    env.storage()
        .instance()
        .get(key)
        .ok_or(VaultError::NotInitialized)
}

pub fn read_owner(env: &Env) -> Result<Address, VaultError> {
    read_address(env, &DataKey::Owner)
}

pub fn write_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&DataKey::Owner, owner);
}

pub fn read_pending_owner(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::PendingOwner)
}

pub fn write_pending_owner(env: &Env, pending: &Address) {
    env.storage().instance().set(&DataKey::PendingOwner, pending);
}

pub fn clear_pending_owner(env: &Env) {
    env.storage().instance().remove(&DataKey::PendingOwner);
}

pub fn read_asset(env: &Env) -> Result<Address, VaultError> {
    read_address(env, &DataKey::Asset)
}

pub fn read_lending_pool(env: &Env) -> Result<Address, VaultError> {
    read_address(env, &DataKey::LendingPool)
}

pub fn read_receipt_token(env: &Env) -> Result<Address, VaultError> {
    read_address(env, &DataKey::ReceiptToken)
}

pub fn write_addresses(env: &Env, asset: &Address, lending_pool: &Address, receipt_token: &Address) {
    let instance = env.storage().instance();
    instance.set(&DataKey::Asset, asset);
    instance.set(&DataKey::LendingPool, lending_pool);
    instance.set(&DataKey::ReceiptToken, receipt_token);
}

pub fn read_version(env: &Env) -> u32 {
    env.storage().instance().get(&DataKey::Version).unwrap_or(1)
}

pub fn write_version(env: &Env, version: u32) {
    env.storage().instance().set(&DataKey::Version, &version);
}

pub fn extend_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn read_shares(env: &Env, holder: &Address) -> i128 {
    let key = DataKey::Shares(holder.clone());
    match env.storage().persistent().get::<DataKey, i128>(&key) {
        Some(balance) => {
            env.storage()
                .persistent()
                .extend_ttl(&key, HOLDER_LIFETIME_THRESHOLD, HOLDER_BUMP_AMOUNT);
            balance
        }
        None => 0,
    }
}

/// Writes a holder balance; a zero balance removes the holder entry.
pub fn write_shares(env: &Env, holder: &Address, balance: i128) {
    let key = DataKey::Shares(holder.clone());
    if balance == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &balance);
        env.storage()
            .persistent()
            .extend_ttl(&key, HOLDER_LIFETIME_THRESHOLD, HOLDER_BUMP_AMOUNT);
    }
}

pub fn read_allowance(env: &Env, owner: &Address, spender: &Address) -> i128 {
    let key = DataKey::Allowance(AllowanceKey {
        owner: owner.clone(),
        spender: spender.clone(),
    });
    env.storage().persistent().get(&key).unwrap_or(0)
}

pub fn write_allowance(env: &Env, owner: &Address, spender: &Address, amount: i128) {
    let key = DataKey::Allowance(AllowanceKey {
        owner: owner.clone(),
        spender: spender.clone(),
    });
    if amount == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &amount);
        env.storage()
            .persistent()
            .extend_ttl(&key, HOLDER_LIFETIME_THRESHOLD, HOLDER_BUMP_AMOUNT);
    }
}

/// Scoped reentrancy flag.
///
/// Acquired at the top of every state-mutating entry point. The flag is
/// cleared when the lock is dropped, so every return path (including `?`
/// early returns) releases it.
pub struct ReentrancyLock<'a> {
    env: &'a Env,
}

impl<'a> ReentrancyLock<'a> {
    pub fn acquire(env: &'a Env) -> Result<Self, VaultError> {
        let locked: bool = env
            .storage()
            .instance()
            .get(&DataKey::Locked)
            .unwrap_or(false);
        if locked {
            return Err(VaultError::Reentrancy);
        }
        env.storage().instance().set(&DataKey::Locked, &true);
        Ok(Self { env })
    }

    pub fn is_held(env: &Env) -> bool {
        env.storage().instance().has(&DataKey::Locked)
    }
}

impl Drop for ReentrancyLock<'_> {
    fn drop(&mut self) {
        self.env.storage().instance().remove(&DataKey::Locked);
    }
}
