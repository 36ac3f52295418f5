//! External calls: the lending pool adapter and typed token helpers.
//!
//! The pool follows the Aave-style supply/withdraw model. Supplying credits
//! the vault with a rebasing receipt token whose balance grows as interest
//! accrues; that balance is the value of the external position. It is read
//! fresh at every point of use and never stored.
//!
//! Every call leaving the vault goes through a `try_` client, so a failing
//! token or pool surfaces as a [`VaultError`] instead of a foreign error.

use soroban_sdk::{
    auth::{ContractContext, InvokerContractAuthEntry, SubContractInvocation},
    contractclient, contracttype, log, token, vec, Address, Env, IntoVal, Symbol,
};

use crate::errors::VaultError;
use crate::storage;

/// Referral code passed on every supply. The vault has no referral program.
pub(crate) const REFERRAL_CODE: u32 = 0;

/// Reserve metadata published by the lending pool for an asset.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReserveData {
    /// Token minted to suppliers; its balance is the position value.
    pub receipt_token: Address,
    /// Current supply rate, informational only.
    pub current_liquidity_rate: i128,
}

#[contractclient(name = "LendingPoolClient")]
pub trait LendingPool {
    /// Pulls `amount` of `asset` from `from` and credits `on_behalf_of`.
    fn supply(
        env: Env,
        from: Address,
        asset: Address,
        amount: i128,
        on_behalf_of: Address,
        referral_code: u32,
    );

    /// Reduces `from`'s position and sends up to `amount` to `to`.
    /// Returns what was actually sent.
    fn withdraw(env: Env, from: Address, asset: Address, amount: i128, to: Address) -> i128;

    fn reserve_data(env: Env, asset: Address) -> ReserveData;
}

/// Balance of `id` in `token`.
pub fn token_balance(env: &Env, token: &Address, id: &Address) -> Result<i128, VaultError> {
    match token::Client::new(env, token).try_balance(id) {
        Ok(Ok(balance)) if balance >= 0 => Ok(balance),
        _ => {
            log!(env, "token balance read failed");
            Err(VaultError::AdapterOperationFailed)
        }
    }
}

/// Moves `amount` of `token` from `from` to `to`.
///
/// A sender holding less than `amount` fails with `InsufficientLiquidity`;
/// any other failure of the token contract with `AdapterOperationFailed`.
pub fn token_transfer(
    env: &Env,
    token: &Address,
    from: &Address,
    to: &Address,
    amount: i128,
) -> Result<(), VaultError> {
    let held = token_balance(env, token, from)?;
    if held < amount {
        log!(env, "transfer of {} exceeds sender balance {}", amount, held);
        return Err(VaultError::InsufficientLiquidity);
    }
    match token::Client::new(env, token).try_transfer(from, to, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => {
            log!(env, "token transfer of {} failed", amount);
            Err(VaultError::AdapterOperationFailed)
        }
    }
}

/// Asks the pool for the receipt token of `asset`. Called once, at
/// initialization.
pub fn discover_receipt_token(
    env: &Env,
    lending_pool: &Address,
    asset: &Address,
) -> Result<Address, VaultError> {
    match LendingPoolClient::new(env, lending_pool).try_reserve_data(asset) {
        Ok(Ok(data)) => Ok(data.receipt_token),
        _ => {
            log!(env, "reserve_data lookup failed");
            Err(VaultError::AdapterOperationFailed)
        }
    }
}

pub struct YieldAdapter<'a> {
    env: &'a Env,
    asset: Address,
    lending_pool: Address,
    receipt_token: Address,
}

impl<'a> YieldAdapter<'a> {
    pub fn load(env: &'a Env) -> Result<Self, VaultError> {
        Ok(Self {
            env,
            asset: storage::read_asset(env)?,
            lending_pool: storage::read_lending_pool(env)?,
            receipt_token: storage::read_receipt_token(env)?,
        })
    }

    pub fn asset(&self) -> &Address {
        &self.asset
    }

    /// The vault's own balance of the underlying asset.
    pub fn asset_balance(&self) -> Result<i128, VaultError> {
        token_balance(self.env, &self.asset, &self.env.current_contract_address())
    }

    /// Present value of the external position.
    pub fn current_value(&self) -> Result<i128, VaultError> {
        let receipt = token::Client::new(self.env, &self.receipt_token);
        match receipt.try_balance(&self.env.current_contract_address()) {
            Ok(Ok(value)) if value >= 0 => Ok(value),
            _ => {
                log!(self.env, "receipt token balance read failed");
                Err(VaultError::AdapterOperationFailed)
            }
        }
    }

    /// Supplies `amount` of the underlying to the pool.
    pub fn deploy(&self, amount: i128) -> Result<(), VaultError> {
        if amount <= 0 {
            return Ok(());
        }
        let vault = self.env.current_contract_address();

        // the pool pulls the funds itself, one level below our call
        self.env.authorize_as_current_contract(vec![
            self.env,
            InvokerContractAuthEntry::Contract(SubContractInvocation {
                context: ContractContext {
                    contract: self.asset.clone(),
                    fn_name: Symbol::new(self.env, "transfer"),
                    args: (vault.clone(), self.lending_pool.clone(), amount).into_val(self.env),
                },
                sub_invocations: vec![self.env],
            }),
        ]);

        let pool = LendingPoolClient::new(self.env, &self.lending_pool);
        match pool.try_supply(&vault, &self.asset, &amount, &vault, &REFERRAL_CODE) {
            Ok(Ok(())) => Ok(()),
            _ => {
                log!(self.env, "supply of {} to lending pool failed", amount);
                Err(VaultError::AdapterOperationFailed)
            }
        }
    }

    /// Withdraws up to `amount` from the pool into the reserve.
    ///
    /// Returns the amount that actually arrived, measured on the vault's own
    /// balance rather than taken from the pool's reply.
    pub fn recall(&self, amount: i128) -> Result<i128, VaultError> {
        if amount <= 0 {
            return Ok(0);
        }
        let vault = self.env.current_contract_address();
        let before = self.asset_balance()?;

        let pool = LendingPoolClient::new(self.env, &self.lending_pool);
        let reported = match pool.try_withdraw(&vault, &self.asset, &amount, &vault) {
            Ok(Ok(reported)) => reported,
            _ => {
                log!(self.env, "withdraw of {} from lending pool failed", amount);
                return Err(VaultError::AdapterOperationFailed);
            }
        };

        let received = self
            .asset_balance()?
            .checked_sub(before)
            .filter(|received| *received >= 0)
            .ok_or(VaultError::AdapterOperationFailed)?;
        if received != reported {
            log!(self.env, "pool reported {} but {} arrived", reported, received);
        }
        Ok(received)
    }
}
