//! Full-range conversion interface
//!
//! A converter program decreases a position to zero, re-mints the proceeds
//! over the widest aligned range and locks the new NFT. It runs outside the
//! registry; this module is the contract both sides agree on.

use anchor_lang::prelude::*;
use crate::clmm::{DecreaseLiquidityV2Args, OpenPositionV2Args};
use crate::errors::LockerError;
use crate::state::{FeeTier, LockParams};

/// Everything a converter needs to turn a position into a full-range lock
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct FullRangeLockRequest {
    pub lock: LockParams,
    pub fee_name: String,
    /// Bounds on the decrease step
    pub amount_0_min_decrease: u64,
    pub amount_1_min_decrease: u64,
    /// Bounds on the re-mint step
    pub amount_0_min_mint: u64,
    pub amount_1_min_mint: u64,
}

impl FullRangeLockRequest {
    /// Fail before any balance moves. The whitelist answer goes first.
    pub fn validate(&self, position_manager_allowed: bool) -> Result<()> {
        require!(position_manager_allowed, LockerError::PositionManagerNotAllowed);
        self.lock.validate()?;
        FeeTier::validate_name(&self.fee_name)
    }

    /// Remove all of `liquidity` under the decrease bounds
    pub fn decrease_args(&self, liquidity: u128) -> DecreaseLiquidityV2Args {
        DecreaseLiquidityV2Args::remove(liquidity, self.amount_0_min_decrease, self.amount_1_min_decrease)
    }

    /// Mint over the maximal range from the recovered balances.
    ///
    /// The limiting side is picked from the pool price so neither maximum is
    /// exceeded.
    pub fn remint_args(
        &self,
        tick_spacing: u16,
        sqrt_price_x64: u128,
        balance_0: u64,
        balance_1: u64,
    ) -> OpenPositionV2Args {
        let base_flag = Some(token_0_is_limiting(sqrt_price_x64, balance_0, balance_1));
        OpenPositionV2Args::full_range(0, balance_0, balance_1, tick_spacing, base_flag)
    }

    /// Re-mint must have used at least the mint bounds
    pub fn check_mint(&self, used_0: u64, used_1: u64) -> Result<()> {
        require!(
            used_0 >= self.amount_0_min_mint && used_1 >= self.amount_1_min_mint,
            LockerError::SlippageExceeded
        );
        Ok(())
    }
}

/// True when `balance_0` priced in token 1 does not exceed `balance_1`
fn token_0_is_limiting(sqrt_price_x64: u128, balance_0: u64, balance_1: u64) -> bool {
    let sqrt = sqrt_price_x64 >> 32;
    let half = (balance_0 as u128).saturating_mul(sqrt) >> 32;
    let value_0 = half.saturating_mul(sqrt) >> 32;
    value_0 <= balance_1 as u128
}
