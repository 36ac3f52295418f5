//! Event payloads and publishers.
//!
//! Every state change publishes one event under a single `symbol_short!`
//! topic. Indexers and the operator's monitoring read these; failed
//! invocations publish nothing.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultInitializedEvent {
    pub owner: Address,
    pub asset: Address,
    pub lending_pool: Address,
    pub receipt_token: Address,
    pub treasury: Address,
}

/// Published by `deposit` and `mint`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositEvent {
    pub caller: Address,
    pub receiver: Address,
    pub assets: i128,
    pub shares: i128,
    /// Part of `assets` kept in the reserve.
    pub reserved: i128,
    /// Part of `assets` supplied to the lending pool.
    pub deployed: i128,
}

/// Published by `withdraw` and `redeem`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawEvent {
    pub caller: Address,
    pub receiver: Address,
    pub owner: Address,
    pub assets: i128,
    pub shares: i128,
    /// Amount pulled back from the lending pool to serve the withdrawal.
    pub recalled: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RebalanceEvent {
    pub reserve_before: i128,
    pub reserve_after: i128,
    /// Net amount moved into the lending pool; negative when recalled.
    pub moved: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HarvestEvent {
    pub yield_amount: i128,
    pub fee: i128,
    pub treasury: Address,
    pub timestamp: u64,
}

/// Published by every single-value parameter setter.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParameterUpdatedEvent {
    pub name: Symbol,
    pub old_value: i128,
    pub new_value: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LimitsUpdatedEvent {
    pub old_min: i128,
    pub new_min: i128,
    pub old_max: i128,
    pub new_max: i128,
    pub old_tvl: i128,
    pub new_tvl: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TreasuryUpdatedEvent {
    pub old_treasury: Address,
    pub new_treasury: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PauseEvent {
    pub paused: bool,
    pub caller: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyWithdrawEvent {
    pub token: Address,
    pub amount: i128,
    pub to: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecallAllEvent {
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnershipEvent {
    pub old_owner: Address,
    pub new_owner: Address,
    /// True while the transfer still waits for acceptance.
    pub pending: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShareTransferEvent {
    pub from: Address,
    pub to: Address,
    pub shares: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShareApprovalEvent {
    pub owner: Address,
    pub spender: Address,
    pub shares: i128,
}

pub fn initialized(env: &Env, event: VaultInitializedEvent) {
    env.events().publish((symbol_short!("init"),), event);
}

pub fn deposit(env: &Env, event: DepositEvent) {
    env.events().publish((symbol_short!("deposit"),), event);
}

pub fn withdraw(env: &Env, event: WithdrawEvent) {
    env.events().publish((symbol_short!("withdraw"),), event);
}

pub fn rebalance(env: &Env, event: RebalanceEvent) {
    env.events().publish((symbol_short!("rebalance"),), event);
}

pub fn harvest(env: &Env, event: HarvestEvent) {
    env.events().publish((symbol_short!("harvest"),), event);
}

pub fn parameter_updated(env: &Env, name: Symbol, old_value: i128, new_value: i128) {
    env.events().publish(
        (symbol_short!("params"),),
        ParameterUpdatedEvent {
            name,
            old_value,
            new_value,
        },
    );
}

pub fn limits_updated(env: &Env, event: LimitsUpdatedEvent) {
    env.events().publish((symbol_short!("limits"),), event);
}

pub fn treasury_updated(env: &Env, old_treasury: Address, new_treasury: Address) {
    env.events().publish(
        (symbol_short!("treasury"),),
        TreasuryUpdatedEvent {
            old_treasury,
            new_treasury,
        },
    );
}

pub fn paused(env: &Env, caller: Address) {
    env.events()
        .publish((symbol_short!("pause"),), PauseEvent { paused: true, caller });
}

pub fn unpaused(env: &Env, caller: Address) {
    env.events()
        .publish((symbol_short!("unpause"),), PauseEvent { paused: false, caller });
}

pub fn emergency_withdraw(env: &Env, event: EmergencyWithdrawEvent) {
    env.events().publish((symbol_short!("emergency"),), event);
}

pub fn recall_all(env: &Env, amount: i128) {
    env.events()
        .publish((symbol_short!("recall"),), RecallAllEvent { amount });
}

pub fn ownership(env: &Env, event: OwnershipEvent) {
    env.events().publish((symbol_short!("owner"),), event);
}

pub fn share_transfer(env: &Env, from: Address, to: Address, shares: i128) {
    env.events().publish(
        (symbol_short!("transfer"),),
        ShareTransferEvent { from, to, shares },
    );
}

pub fn share_approval(env: &Env, owner: Address, spender: Address, shares: i128) {
    env.events().publish(
        (symbol_short!("approve"),),
        ShareApprovalEvent {
            owner,
            spender,
            shares,
        },
    );
}
