//! Slippage guard for deposit, mint, withdraw and redeem.
//!
//! The guard snapshots assets and supply before an operation and compares
//! the share price after it. Every rounding rule in [`crate::shares`] moves
//! the price up, so exact accounting never trips the guard. A price drop can
//! only come from the external protocol (value lost on supply or recall); if
//! it exceeds `max_slippage_bp` the operation fails and the host reverts it.

use soroban_sdk::{log, Env};

use crate::errors::VaultError;
use crate::reserve::BPS_DENOMINATOR;
use crate::shares::{mul_div, to_assets, Rounding, VIRTUAL_ASSETS, VIRTUAL_SHARES};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SlippageGuard {
    assets_before: i128,
    shares_before: i128,
    max_slippage_bp: u32,
}

impl SlippageGuard {
    pub fn new(assets_before: i128, shares_before: i128, max_slippage_bp: u32) -> Self {
        Self {
            assets_before,
            shares_before,
            max_slippage_bp,
        }
    }

    /// Checks the post-state against the snapshot.
    ///
    /// The pre-state supply (plus the virtual share) is valued at the
    /// post-state price through the redeem formula; it must be worth at
    /// least its pre-state backing less the tolerance.
    pub fn check(&self, env: &Env, assets_after: i128, shares_after: i128) -> Result<(), VaultError> {
        let supply_before = self
            .shares_before
            .checked_add(VIRTUAL_SHARES)
            .ok_or(VaultError::ArithmeticOverflow)?;
        let expected = self
            .assets_before
            .checked_add(VIRTUAL_ASSETS)
            .ok_or(VaultError::ArithmeticOverflow)?;

        let realized = to_assets(supply_before, assets_after, shares_after, Rounding::Floor)?;
        let floor = mul_div(
            expected,
            BPS_DENOMINATOR - self.max_slippage_bp as i128,
            BPS_DENOMINATOR,
            Rounding::Ceil,
        )?;

        if realized < floor {
            log!(
                env,
                "share price slipped: {} realized against {} expected",
                realized,
                expected
            );
            return Err(VaultError::SlippageExceeded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shares::to_shares;

    #[test]
    fn exact_deposit_passes_with_zero_tolerance() {
        let env = Env::default();
        let guard = SlippageGuard::new(1050, 1000, 0);
        let minted = to_shares(1050, 1050, 1000, Rounding::Floor).unwrap();
        assert_eq!(guard.check(&env, 2100, 1000 + minted), Ok(()));
    }

    #[test]
    fn exact_withdraw_passes_with_zero_tolerance() {
        let env = Env::default();
        let guard = SlippageGuard::new(1050, 1000, 0);
        let burned = to_shares(333, 1050, 1000, Rounding::Ceil).unwrap();
        assert_eq!(guard.check(&env, 1050 - 333, 1000 - burned), Ok(()));
    }

    #[test]
    fn lossy_deposit_is_rejected() {
        let env = Env::default();
        let guard = SlippageGuard::new(1000, 1000, 50);
        // 1000 deposited, 1000 shares minted, only 980 credited
        assert_eq!(guard.check(&env, 1980, 2000), Err(VaultError::SlippageExceeded));
    }

    #[test]
    fn loss_within_tolerance_passes() {
        let env = Env::default();
        let guard = SlippageGuard::new(1000, 1000, 100);
        assert_eq!(guard.check(&env, 1996, 2000), Ok(()));
    }
}
