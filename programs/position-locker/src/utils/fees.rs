//! Fee arithmetic
//!
//! Every share is floored, so rounding always favours the lock owner.

use anchor_lang::prelude::*;
use crate::clmm::TokenAmounts;
use crate::constants::BPS_DENOMINATOR;
use crate::errors::LockerError;

/// floor(amount * bps / 10000)
pub fn bps_share(amount: u64, bps: u16) -> Result<u64> {
    let share = (amount as u128)
        .checked_mul(bps as u128)
        .ok_or(LockerError::Overflow)?
        / BPS_DENOMINATOR as u128;
    u64::try_from(share).map_err(|_| error!(LockerError::Overflow))
}

/// Liquidity skimmed on entry: floor(liquidity * lp_fee_bps / 10000)
pub fn liquidity_share(liquidity: u128, bps: u16) -> Result<u128> {
    let scaled = liquidity
        .checked_mul(bps as u128)
        .ok_or(LockerError::Overflow)?;
    Ok(scaled / BPS_DENOMINATOR as u128)
}

/// One token amount split between the protocol and the payee
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeSplit {
    pub fee: u64,
    pub net: u64,
}

impl FeeSplit {
    pub fn of(gross: u64, bps: u16) -> Result<Self> {
        let fee = bps_share(gross, bps)?;
        Ok(Self {
            fee,
            net: gross - fee,
        })
    }
}

/// A harvested amount clamped by a caller cap.
///
/// The capped part goes to the caller's recipient and the rest to the lock's
/// collect address, each net of the collect fee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectSplit {
    pub to_recipient: u64,
    pub to_collect_address: u64,
    pub fee: u64,
}

impl CollectSplit {
    pub fn new(gross: u64, cap: u64, bps: u16) -> Result<Self> {
        let capped = FeeSplit::of(gross.min(cap), bps)?;
        let overflow = FeeSplit::of(gross.saturating_sub(cap), bps)?;
        Ok(Self {
            to_recipient: capped.net,
            to_collect_address: overflow.net,
            fee: capped.fee.checked_add(overflow.fee).ok_or(LockerError::Overflow)?,
        })
    }

    pub fn total(&self) -> u64 {
        self.to_recipient + self.to_collect_address + self.fee
    }
}

/// Both tokens of one collect, split against the caller's caps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectPayout {
    pub token_0: CollectSplit,
    pub token_1: CollectSplit,
}

impl CollectPayout {
    /// `None` when the harvest brought in nothing
    pub fn plan(gross: TokenAmounts, caps: TokenAmounts, bps: u16) -> Result<Option<Self>> {
        if gross.is_zero() {
            return Ok(None);
        }
        Ok(Some(Self {
            token_0: CollectSplit::new(gross.amount_0, caps.amount_0, bps)?,
            token_1: CollectSplit::new(gross.amount_1, caps.amount_1, bps)?,
        }))
    }

    pub fn to_recipient(&self) -> TokenAmounts {
        TokenAmounts {
            amount_0: self.token_0.to_recipient,
            amount_1: self.token_1.to_recipient,
        }
    }

    pub fn to_collect_address(&self) -> TokenAmounts {
        TokenAmounts {
            amount_0: self.token_0.to_collect_address,
            amount_1: self.token_1.to_collect_address,
        }
    }

    pub fn fee(&self) -> TokenAmounts {
        TokenAmounts {
            amount_0: self.token_0.fee,
            amount_1: self.token_1.fee,
        }
    }
}

/// Proceeds of an owner decrease. The collect fee applies to the harvested
/// fees only, never to principal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecreasePayout {
    pub to_owner: TokenAmounts,
    pub fee: TokenAmounts,
}

impl DecreasePayout {
    pub fn new(fees: TokenAmounts, principal: TokenAmounts, bps: u16) -> Result<Self> {
        let fee_0 = FeeSplit::of(fees.amount_0, bps)?;
        let fee_1 = FeeSplit::of(fees.amount_1, bps)?;
        Ok(Self {
            to_owner: TokenAmounts {
                amount_0: principal.amount_0.checked_add(fee_0.net).ok_or(LockerError::Overflow)?,
                amount_1: principal.amount_1.checked_add(fee_1.net).ok_or(LockerError::Overflow)?,
            },
            fee: TokenAmounts {
                amount_0: fee_0.fee,
                amount_1: fee_1.fee,
            },
        })
    }
}

/// What an increase hands back to the depositor
pub fn increase_refund(received: TokenAmounts, used: TokenAmounts) -> Result<TokenAmounts> {
    Ok(TokenAmounts {
        amount_0: received.amount_0.checked_sub(used.amount_0).ok_or(LockerError::Overflow)?,
        amount_1: received.amount_1.checked_sub(used.amount_1).ok_or(LockerError::Overflow)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn collect_fee_is_floored() {
        assert_eq!(FeeSplit::of(100, 200).unwrap(), FeeSplit { fee: 2, net: 98 });
        assert_eq!(FeeSplit::of(150, 200).unwrap(), FeeSplit { fee: 3, net: 147 });
        assert_eq!(FeeSplit::of(49, 200).unwrap(), FeeSplit { fee: 0, net: 49 });
        assert_eq!(FeeSplit::of(0, 10_000).unwrap(), FeeSplit::default());
    }

    #[test]
    fn full_rate_takes_everything() {
        assert_eq!(FeeSplit::of(u64::MAX, 10_000).unwrap().net, 0);
        assert_eq!(bps_share(u64::MAX, 10_000).unwrap(), u64::MAX);
    }

    #[test]
    fn liquidity_share_of_one_percent() {
        assert_eq!(liquidity_share(1_000_000, 100).unwrap(), 10_000);
        assert_eq!(liquidity_share(99, 100).unwrap(), 0);
        assert_eq!(liquidity_share(1_000_000, 0).unwrap(), 0);
        assert_eq!(liquidity_share(u128::MAX, 2).unwrap_err(), LockerError::Overflow.into());
    }

    #[test]
    fn uncapped_collect_goes_to_recipient() {
        let split = CollectSplit::new(150, u64::MAX, 200).unwrap();
        assert_eq!(split, CollectSplit { to_recipient: 147, to_collect_address: 0, fee: 3 });
    }

    #[test]
    fn overflow_above_cap_goes_to_collect_address() {
        let split = CollectSplit::new(1_000, 400, 200).unwrap();
        assert_eq!(split.to_recipient, 392);
        assert_eq!(split.to_collect_address, 588);
        assert_eq!(split.fee, 20);

        let zero_cap = CollectSplit::new(1_000, 0, 0).unwrap();
        assert_eq!(zero_cap.to_recipient, 0);
        assert_eq!(zero_cap.to_collect_address, 1_000);
    }

    #[test]
    fn empty_harvest_plans_nothing() {
        let caps = TokenAmounts { amount_0: 10, amount_1: 10 };
        assert_eq!(CollectPayout::plan(TokenAmounts::default(), caps, 200).unwrap(), None);
    }

    #[test]
    fn decrease_fee_skips_principal() {
        let fees = TokenAmounts { amount_0: 100, amount_1: 0 };
        let principal = TokenAmounts { amount_0: 5_000, amount_1: 7_000 };
        let payout = DecreasePayout::new(fees, principal, 200).unwrap();
        assert_eq!(payout.fee, TokenAmounts { amount_0: 2, amount_1: 0 });
        assert_eq!(payout.to_owner, TokenAmounts { amount_0: 5_098, amount_1: 7_000 });
    }

    #[test]
    fn refund_cannot_exceed_deposit() {
        let received = TokenAmounts { amount_0: 10, amount_1: 10 };
        let used = TokenAmounts { amount_0: 11, amount_1: 0 };
        assert_eq!(increase_refund(received, used).unwrap_err(), LockerError::Overflow.into());
    }

    proptest! {
        #[test]
        fn split_conserves_value(gross in any::<u64>(), bps in 0u16..=10_000) {
            let split = FeeSplit::of(gross, bps).unwrap();
            prop_assert_eq!(split.fee + split.net, gross);
            prop_assert!(split.fee as u128 * 10_000 <= gross as u128 * bps as u128);
        }

        #[test]
        fn collect_split_conserves_value(
            gross in 0u64..=u64::MAX / 2,
            cap in any::<u64>(),
            bps in 0u16..=10_000,
        ) {
            let split = CollectSplit::new(gross, cap, bps).unwrap();
            prop_assert_eq!(split.total(), gross);
            prop_assert!(split.to_recipient <= cap);
        }
    }
}
