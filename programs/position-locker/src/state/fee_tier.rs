use anchor_lang::prelude::*;
use crate::constants::*;
use crate::errors::LockerError;

/// Named fee schedule selectable at lock time
#[account]
#[derive(Default, Debug)]
pub struct FeeTier {
    pub registry: Pubkey,

    /// Tier name, also part of the PDA seeds
    pub name: String,

    /// Share of the position's liquidity removed on entry
    pub lp_fee_bps: u16,

    /// Share of every fee collection
    pub collect_fee_bps: u16,

    /// Flat fee charged on entry, in `flat_fee_token` base units
    pub flat_fee: u64,

    /// Mint of the flat fee. Default key means native lamports.
    pub flat_fee_token: Pubkey,

    /// PDA bump seed
    pub bump: u8,
}

impl FeeTier {
    pub const LEN: usize = 8  // discriminator
        + 32  // registry
        + 4 + MAX_FEE_NAME_LEN  // name
        + 2   // lp_fee_bps
        + 2   // collect_fee_bps
        + 8   // flat_fee
        + 32  // flat_fee_token
        + 1   // bump
        + 16; // padding

    pub fn validate_name(name: &str) -> Result<()> {
        require!(
            !name.is_empty() && name.len() <= MAX_FEE_NAME_LEN,
            LockerError::InvalidFeeName
        );
        Ok(())
    }

    pub fn set(
        &mut self,
        lp_fee_bps: u16,
        collect_fee_bps: u16,
        flat_fee: u64,
        flat_fee_token: Pubkey,
    ) -> Result<()> {
        validate_rates(lp_fee_bps, collect_fee_bps)?;
        self.lp_fee_bps = lp_fee_bps;
        self.collect_fee_bps = collect_fee_bps;
        self.flat_fee = flat_fee;
        self.flat_fee_token = flat_fee_token;
        Ok(())
    }

    pub fn resolved(&self) -> ResolvedFee {
        ResolvedFee {
            lp_fee_bps: self.lp_fee_bps,
            collect_fee_bps: self.collect_fee_bps,
            flat_fee: self.flat_fee,
            flat_fee_token: self.flat_fee_token,
        }
    }
}

pub fn validate_rates(lp_fee_bps: u16, collect_fee_bps: u16) -> Result<()> {
    require!(
        lp_fee_bps <= BPS_DENOMINATOR && collect_fee_bps <= BPS_DENOMINATOR,
        LockerError::InvalidFee
    );
    Ok(())
}

/// The fee schedule a lock is actually charged with
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolvedFee {
    pub lp_fee_bps: u16,
    pub collect_fee_bps: u16,
    pub flat_fee: u64,
    pub flat_fee_token: Pubkey,
}

impl ResolvedFee {
    pub fn charges_flat_fee(&self) -> bool {
        self.flat_fee > 0
    }

    pub fn is_native_flat_fee(&self) -> bool {
        self.flat_fee_token == Pubkey::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_above_denominator_are_rejected() {
        let mut tier = FeeTier::default();
        assert!(tier.set(10_000, 0, 0, Pubkey::default()).is_ok());
        assert_eq!(
            tier.set(10_001, 0, 0, Pubkey::default()).unwrap_err(),
            LockerError::InvalidFee.into()
        );
        assert_eq!(
            tier.set(0, 10_001, 0, Pubkey::default()).unwrap_err(),
            LockerError::InvalidFee.into()
        );
        assert_eq!(tier.lp_fee_bps, 10_000);
    }

    #[test]
    fn names_must_fit_a_seed() {
        assert!(FeeTier::validate_name(DEFAULT_FEE_NAME).is_ok());
        assert!(FeeTier::validate_name(&"x".repeat(MAX_FEE_NAME_LEN)).is_ok());
        assert_eq!(
            FeeTier::validate_name(&"x".repeat(MAX_FEE_NAME_LEN + 1)).unwrap_err(),
            LockerError::InvalidFeeName.into()
        );
        assert_eq!(FeeTier::validate_name("").unwrap_err(), LockerError::InvalidFeeName.into());
    }

    #[test]
    fn native_flat_fee_uses_the_default_key() {
        let mut tier = FeeTier::default();
        tier.set(100, 0, 1_500_000_000, Pubkey::default()).unwrap();
        let fee = tier.resolved();
        assert!(fee.charges_flat_fee());
        assert!(fee.is_native_flat_fee());

        tier.set(100, 0, 10, Pubkey::new_unique()).unwrap();
        assert!(!tier.resolved().is_native_flat_fee());
    }
}
