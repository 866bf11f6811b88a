use anchor_lang::prelude::*;
use solana_keccak_hasher as keccak;
use crate::constants::*;
use crate::errors::LockerError;
use crate::signature::{abi_word_bool, abi_word_u64, verify_signature, EthAddress};
use super::fee_tier::{validate_rates, ResolvedFee};

/// Off-chain signed fee override
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct SignedFeeMessage {
    /// Single-use reference code
    pub ref_code: [u8; 32],
    /// true: primary signer, false: secondary signer
    pub use_primary_signer: bool,
    pub lp_fee_bps: u16,
    pub collect_fee_bps: u16,
    /// Wallet the override is issued to
    pub bound_user: Pubkey,
    /// r ‖ s ‖ v
    pub signature: [u8; 65],
}

impl SignedFeeMessage {
    /// keccak256(prefix ‖ refCode ‖ selector ‖ lpFee ‖ collectFee ‖ user)
    pub fn message_hash(&self) -> [u8; 32] {
        keccak::hashv(&[
            &FEE_MESSAGE_PREFIX[..],
            &self.ref_code[..],
            &abi_word_bool(self.use_primary_signer)[..],
            &abi_word_u64(self.lp_fee_bps as u64)[..],
            &abi_word_u64(self.collect_fee_bps as u64)[..],
            self.bound_user.as_ref(),
        ])
        .to_bytes()
    }

    /// Signed overrides never carry a flat fee
    pub fn resolved(&self) -> ResolvedFee {
        ResolvedFee {
            lp_fee_bps: self.lp_fee_bps,
            collect_fee_bps: self.collect_fee_bps,
            flat_fee: 0,
            flat_fee_token: Pubkey::default(),
        }
    }
}

/// Signer configuration for fee overrides of one registry
#[account]
#[derive(Default, Debug)]
pub struct FeeResolver {
    pub registry: Pubkey,

    /// Admin of signers, thresholds and exemptions
    pub authority: Pubkey,

    /// May sign any fee, including zero
    pub primary_signer: EthAddress,

    /// Bounded below by the thresholds
    pub secondary_signer: EthAddress,

    pub secondary_min_lp_fee_bps: u16,

    pub secondary_min_collect_fee_bps: u16,

    /// PDA bump seed
    pub bump: u8,
}

impl FeeResolver {
    pub const LEN: usize = 8  // discriminator
        + 32  // registry
        + 32  // authority
        + 20  // primary_signer
        + 20  // secondary_signer
        + 2   // secondary_min_lp_fee_bps
        + 2   // secondary_min_collect_fee_bps
        + 1   // bump
        + 16; // padding

    pub fn signer_for(&self, use_primary_signer: bool) -> &EthAddress {
        if use_primary_signer {
            &self.primary_signer
        } else {
            &self.secondary_signer
        }
    }

    /// Verify and decode without consuming the reference code
    pub fn preview(&self, message: &SignedFeeMessage) -> Result<ResolvedFee> {
        validate_rates(message.lp_fee_bps, message.collect_fee_bps)?;
        let signed = verify_signature(
            &message.message_hash(),
            &message.signature,
            self.signer_for(message.use_primary_signer),
        )?;
        require!(signed, LockerError::SignerMismatch);
        Ok(message.resolved())
    }

    /// Verify, bind to `caller`, burn the reference code and enforce the
    /// secondary signer's floor. The returned fee must be applied exactly once.
    pub fn resolve_and_consume(
        &self,
        message: &SignedFeeMessage,
        caller: &Pubkey,
        nonce: &mut NonceRecord,
        now: i64,
    ) -> Result<ResolvedFee> {
        let fee = self.preview(message)?;
        require_keys_eq!(*caller, message.bound_user, LockerError::CallerMismatch);
        require!(!nonce.used, LockerError::ReplayedNonce);
        nonce.consume(message.ref_code, *caller, now);

        if !message.use_primary_signer {
            require!(
                fee.lp_fee_bps >= self.secondary_min_lp_fee_bps
                    && fee.collect_fee_bps >= self.secondary_min_collect_fee_bps,
                LockerError::BelowThreshold
            );
        }
        Ok(fee)
    }
}

/// Marks a reference code as spent
#[account]
#[derive(Default, Debug)]
pub struct NonceRecord {
    pub ref_code: [u8; 32],
    pub used: bool,
    pub used_by: Pubkey,
    pub used_at: i64,
    pub bump: u8,
}

impl NonceRecord {
    pub const LEN: usize = 8  // discriminator
        + 32  // ref_code
        + 1   // used
        + 32  // used_by
        + 8   // used_at
        + 1;  // bump

    pub fn consume(&mut self, ref_code: [u8; 32], used_by: Pubkey, now: i64) {
        self.ref_code = ref_code;
        self.used = true;
        self.used_by = used_by;
        self.used_at = now;
    }
}

/// Wallet exempt from flat fees
#[account]
#[derive(Default)]
pub struct FeeExemption {
    pub registry: Pubkey,
    pub wallet: Pubkey,
    pub exempt: bool,
    pub bump: u8,
}

impl FeeExemption {
    pub const LEN: usize = 8  // discriminator
        + 32  // registry
        + 32  // wallet
        + 1   // exempt
        + 1;  // bump
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::test_signer::TestSigner;

    struct Fixture {
        primary: TestSigner,
        secondary: TestSigner,
        resolver: FeeResolver,
        user: Pubkey,
    }

    fn fixture() -> Fixture {
        let primary = TestSigner::new(11);
        let secondary = TestSigner::new(22);
        let resolver = FeeResolver {
            primary_signer: primary.address(),
            secondary_signer: secondary.address(),
            secondary_min_lp_fee_bps: 30,
            secondary_min_collect_fee_bps: 30,
            ..FeeResolver::default()
        };
        Fixture {
            primary,
            secondary,
            resolver,
            user: Pubkey::new_unique(),
        }
    }

    fn signed(
        signer: &TestSigner,
        use_primary_signer: bool,
        fees: (u16, u16),
        user: Pubkey,
        ref_code: u8,
    ) -> SignedFeeMessage {
        let mut message = SignedFeeMessage {
            ref_code: [ref_code; 32],
            use_primary_signer,
            lp_fee_bps: fees.0,
            collect_fee_bps: fees.1,
            bound_user: user,
            signature: [0u8; 65],
        };
        message.signature = signer.sign(&message.message_hash());
        message
    }

    #[test]
    fn primary_signer_may_authorize_zero_fees() {
        let f = fixture();
        let message = signed(&f.primary, true, (0, 0), f.user, 1);
        let mut nonce = NonceRecord::default();

        let fee = f.resolver.resolve_and_consume(&message, &f.user, &mut nonce, 10).unwrap();
        assert_eq!(fee, ResolvedFee::default());
        assert!(nonce.used);
        assert_eq!(nonce.used_by, f.user);
    }

    #[test]
    fn secondary_signer_is_held_to_the_floor() {
        let f = fixture();
        let message = signed(&f.secondary, false, (0, 0), f.user, 2);
        assert_eq!(
            f.resolver
                .resolve_and_consume(&message, &f.user, &mut NonceRecord::default(), 10)
                .unwrap_err(),
            LockerError::BelowThreshold.into()
        );

        let message = signed(&f.secondary, false, (30, 30), f.user, 3);
        let fee = f.resolver
            .resolve_and_consume(&message, &f.user, &mut NonceRecord::default(), 10)
            .unwrap();
        assert_eq!((fee.lp_fee_bps, fee.collect_fee_bps), (30, 30));
    }

    #[test]
    fn reference_codes_are_single_use() {
        let f = fixture();
        let message = signed(&f.primary, true, (10, 10), f.user, 4);
        let mut nonce = NonceRecord::default();
        f.resolver.resolve_and_consume(&message, &f.user, &mut nonce, 10).unwrap();
        assert_eq!(
            f.resolver.resolve_and_consume(&message, &f.user, &mut nonce, 11).unwrap_err(),
            LockerError::ReplayedNonce.into()
        );
    }

    #[test]
    fn bound_user_must_be_the_caller() {
        let f = fixture();
        let message = signed(&f.primary, true, (10, 10), f.user, 5);
        let mut nonce = NonceRecord::default();
        assert_eq!(
            f.resolver
                .resolve_and_consume(&message, &Pubkey::new_unique(), &mut nonce, 10)
                .unwrap_err(),
            LockerError::CallerMismatch.into()
        );
        assert!(!nonce.used);
    }

    #[test]
    fn selector_must_match_the_actual_signer() {
        let f = fixture();
        // secondary key claiming to be the primary
        let message = signed(&f.secondary, true, (0, 0), f.user, 6);
        assert_eq!(f.resolver.preview(&message).unwrap_err(), LockerError::SignerMismatch.into());
    }

    #[test]
    fn preview_does_not_consume() {
        let f = fixture();
        let message = signed(&f.primary, true, (25, 75), f.user, 7);
        let fee = f.resolver.preview(&message).unwrap();
        assert_eq!((fee.lp_fee_bps, fee.collect_fee_bps, fee.flat_fee), (25, 75, 0));
        assert!(f.resolver.preview(&message).is_ok());
    }

    #[test]
    fn altered_fields_break_the_signature() {
        let f = fixture();
        let mut message = signed(&f.primary, true, (0, 0), f.user, 8);
        message.collect_fee_bps = 1;
        assert_eq!(f.resolver.preview(&message).unwrap_err(), LockerError::SignerMismatch.into());
    }

    #[test]
    fn rates_above_denominator_are_rejected_before_recovery() {
        let f = fixture();
        let message = signed(&f.primary, true, (10_001, 0), f.user, 9);
        assert_eq!(f.resolver.preview(&message).unwrap_err(), LockerError::InvalidFee.into());
    }
}
