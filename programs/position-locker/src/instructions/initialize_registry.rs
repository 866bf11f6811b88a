use anchor_lang::prelude::*;
use crate::state::*;
use crate::constants::*;
use crate::errors::LockerError;
use crate::events::{RegistryInitialized, FeeTierUpdated};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct InitializeRegistryParams {
    pub auto_collect_account: Pubkey,
    pub lp_fee_receiver: Pubkey,
    pub collect_fee_receiver: Pubkey,
    /// Country list program, default key while none is deployed
    pub country_list: Pubkey,
}

#[derive(Accounts)]
#[instruction(registry_id: u64)]
pub struct InitializeRegistry<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        init,
        payer = authority,
        space = Registry::LEN,
        seeds = [REGISTRY_SEED, &registry_id.to_le_bytes()],
        bump
    )]
    pub registry: Box<Account<'info, Registry>>,

    #[account(
        init,
        payer = authority,
        space = FeeTier::LEN,
        seeds = [FEE_TIER_SEED, registry.key().as_ref(), DEFAULT_FEE_NAME.as_bytes()],
        bump
    )]
    pub default_fee_tier: Box<Account<'info, FeeTier>>,

    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<InitializeRegistry>,
    registry_id: u64,
    params: InitializeRegistryParams,
) -> Result<()> {
    require_keys_neq!(params.lp_fee_receiver, Pubkey::default(), LockerError::NullAddress);
    require_keys_neq!(params.collect_fee_receiver, Pubkey::default(), LockerError::NullAddress);

    let registry_key = ctx.accounts.registry.key();
    let registry = &mut ctx.accounts.registry;
    registry.registry_id = registry_id;
    registry.authority = ctx.accounts.authority.key();
    registry.auto_collect_account = params.auto_collect_account;
    registry.lp_fee_receiver = params.lp_fee_receiver;
    registry.collect_fee_receiver = params.collect_fee_receiver;
    registry.country_list = params.country_list;
    registry.migrator = None;
    registry.migrate_in = None;
    registry.locks_length = 0;
    registry.bump = ctx.bumps.registry;

    let tier = &mut ctx.accounts.default_fee_tier;
    tier.registry = registry_key;
    tier.name = DEFAULT_FEE_NAME.to_string();
    tier.set(DEFAULT_LP_FEE_BPS, DEFAULT_COLLECT_FEE_BPS, 0, Pubkey::default())?;
    tier.bump = ctx.bumps.default_fee_tier;

    msg!("Registry {} initialized", registry_id);

    emit!(RegistryInitialized {
        registry: registry_key,
        registry_id,
        authority: registry.authority,
    });

    emit!(FeeTierUpdated {
        registry: registry_key,
        name: tier.name.clone(),
        lp_fee_bps: tier.lp_fee_bps,
        collect_fee_bps: tier.collect_fee_bps,
        flat_fee: tier.flat_fee,
        flat_fee_token: tier.flat_fee_token,
    });

    Ok(())
}
