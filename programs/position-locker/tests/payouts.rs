//! Token flows of the harvesting instructions
//!
//! `collect`, `decrease_liquidity`, `increase_liquidity`, `withdraw` and
//! `migrate` measure what arrives in a transit vault and then pay out the
//! plan built here, so the amounts below are the amounts each destination
//! account receives.

use anchor_lang::prelude::Pubkey;
use position_locker::clmm::{PoolState, TokenAmounts};
use position_locker::errors::LockerError;
use position_locker::instructions::admin_refund::{custody_vault_address, is_custody_vault};
use position_locker::utils::{increase_refund, CollectPayout, DecreasePayout};

fn amounts(amount_0: u64, amount_1: u64) -> TokenAmounts {
    TokenAmounts { amount_0, amount_1 }
}

fn pool(status: u8) -> PoolState {
    PoolState {
        amm_config: Pubkey::new_unique(),
        token_mint_0: Pubkey::new_unique(),
        token_mint_1: Pubkey::new_unique(),
        token_vault_0: Pubkey::new_unique(),
        token_vault_1: Pubkey::new_unique(),
        mint_decimals_0: 6,
        mint_decimals_1: 9,
        tick_spacing: 60,
        liquidity: 1_000_000,
        sqrt_price_x64: 1 << 64,
        tick_current: 0,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_pays_recipient_fee_receiver_and_collect_address() {
        // 2% collect fee, recipient capped at 400 of token 0
        let payout = CollectPayout::plan(amounts(1_000, 50), amounts(400, u64::MAX), 200)
            .unwrap()
            .expect("fees were harvested");

        assert_eq!(payout.to_recipient(), amounts(392, 49));
        assert_eq!(payout.to_collect_address(), amounts(588, 0));
        assert_eq!(payout.fee(), amounts(20, 1));
        assert_eq!(payout.token_0.total(), 1_000);
        assert_eq!(payout.token_1.total(), 50);
    }

    #[test]
    fn auto_collector_caps_bound_its_own_receiver() {
        // The bot takes 100 per token into its receiver, the rest goes on
        let payout = CollectPayout::plan(amounts(300, 300), amounts(100, 100), 0)
            .unwrap()
            .expect("fees were harvested");
        assert_eq!(payout.to_recipient(), amounts(100, 100));
        assert_eq!(payout.to_collect_address(), amounts(200, 200));
    }

    #[test]
    fn collect_with_nothing_harvested_moves_nothing() {
        assert_eq!(CollectPayout::plan(amounts(0, 0), amounts(5, 5), 200).unwrap(), None);
    }

    #[test]
    fn withdraw_harvest_is_uncapped() {
        let payout = CollectPayout::plan(amounts(u64::MAX / 2, 7), TokenAmounts::UNCAPPED, 100)
            .unwrap()
            .expect("fees were harvested");
        assert_eq!(payout.to_collect_address(), amounts(0, 0));
        assert_eq!(payout.token_0.total(), u64::MAX / 2);
    }

    #[test]
    fn decrease_charges_fees_but_not_principal() {
        let fees = amounts(1_000, 0);
        let principal = amounts(50_000, 80_000);
        let payout = DecreasePayout::new(fees, principal, 500).unwrap();

        assert_eq!(payout.fee, amounts(50, 0));
        assert_eq!(payout.to_owner, amounts(50_950, 80_000));
    }

    #[test]
    fn decrease_with_full_rate_keeps_principal_whole() {
        let payout = DecreasePayout::new(amounts(10, 10), amounts(3, 4), 10_000).unwrap();
        assert_eq!(payout.to_owner, amounts(3, 4));
        assert_eq!(payout.fee, amounts(10, 10));
    }

    #[test]
    fn increase_refunds_what_the_position_did_not_take() {
        let refund = increase_refund(amounts(1_000, 2_000), amounts(1_000, 1_250)).unwrap();
        assert_eq!(refund, amounts(0, 750));
    }

    #[test]
    fn increase_cannot_use_more_than_arrived() {
        assert_eq!(
            increase_refund(amounts(10, 10), amounts(10, 11)).unwrap_err(),
            LockerError::Overflow.into()
        );
    }

    #[test]
    fn paused_pools_gate_harvest_and_increase() {
        assert!(pool(0).can_harvest());
        assert!(pool(0).can_increase_liquidity());

        // decrease disabled
        assert!(!pool(0b00010).can_harvest());
        // collect fee disabled
        assert!(!pool(0b00100).can_harvest());
        // open/increase disabled only
        assert!(pool(0b00001).can_harvest());
        assert!(!pool(0b00001).can_increase_liquidity());
        // swaps paused do not matter here
        assert!(pool(0b10000).can_harvest());
    }

    #[test]
    fn rescue_refuses_custody_but_not_transit() {
        let registry = Pubkey::new_unique();
        let nft_mint = Pubkey::new_unique();
        let custody = custody_vault_address(&registry, &nft_mint);
        assert!(is_custody_vault(&registry, &nft_mint, &custody));

        let (transit, _) = Pubkey::find_program_address(
            &[position_locker::constants::TRANSIT_SEED, registry.as_ref(), nft_mint.as_ref()],
            &position_locker::ID,
        );
        assert!(!is_custody_vault(&registry, &nft_mint, &transit));
    }
}
