use anchor_lang::prelude::*;
use crate::state::*;
use crate::constants::*;
use crate::errors::LockerError;
use crate::events::{FeeResolverUpdated, FeeAccountWhitelisted};
use crate::signature::EthAddress;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct FeeResolverParams {
    pub primary_signer: EthAddress,
    pub secondary_signer: EthAddress,
    pub secondary_min_lp_fee_bps: u16,
    pub secondary_min_collect_fee_bps: u16,
}

#[derive(Accounts)]
pub struct InitializeFeeResolver<'info> {
    #[account(
        mut,
        address = registry.authority @ LockerError::Unauthorized
    )]
    pub authority: Signer<'info>,

    #[account(
        seeds = [REGISTRY_SEED, &registry.registry_id.to_le_bytes()],
        bump = registry.bump
    )]
    pub registry: Box<Account<'info, Registry>>,

    #[account(
        init,
        payer = authority,
        space = FeeResolver::LEN,
        seeds = [FEE_RESOLVER_SEED, registry.key().as_ref()],
        bump
    )]
    pub fee_resolver: Box<Account<'info, FeeResolver>>,

    pub system_program: Program<'info, System>,
}

pub fn initialize_fee_resolver_handler(
    ctx: Context<InitializeFeeResolver>,
    params: FeeResolverParams,
) -> Result<()> {
    validate_rates(params.secondary_min_lp_fee_bps, params.secondary_min_collect_fee_bps)?;

    let resolver = &mut ctx.accounts.fee_resolver;
    resolver.registry = ctx.accounts.registry.key();
    resolver.authority = ctx.accounts.authority.key();
    resolver.primary_signer = params.primary_signer;
    resolver.secondary_signer = params.secondary_signer;
    resolver.secondary_min_lp_fee_bps = params.secondary_min_lp_fee_bps;
    resolver.secondary_min_collect_fee_bps = params.secondary_min_collect_fee_bps;
    resolver.bump = ctx.bumps.fee_resolver;

    emit_resolver(resolver);
    Ok(())
}

#[derive(Accounts)]
pub struct UpdateFeeResolver<'info> {
    #[account(
        address = fee_resolver.authority @ LockerError::Unauthorized
    )]
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [FEE_RESOLVER_SEED, fee_resolver.registry.as_ref()],
        bump = fee_resolver.bump
    )]
    pub fee_resolver: Box<Account<'info, FeeResolver>>,
}

pub fn set_fee_resolver_signers_handler(
    ctx: Context<UpdateFeeResolver>,
    primary_signer: EthAddress,
    secondary_signer: EthAddress,
) -> Result<()> {
    let resolver = &mut ctx.accounts.fee_resolver;
    resolver.primary_signer = primary_signer;
    resolver.secondary_signer = secondary_signer;

    emit_resolver(resolver);
    Ok(())
}

pub fn set_secondary_thresholds_handler(
    ctx: Context<UpdateFeeResolver>,
    min_lp_fee_bps: u16,
    min_collect_fee_bps: u16,
) -> Result<()> {
    validate_rates(min_lp_fee_bps, min_collect_fee_bps)?;

    let resolver = &mut ctx.accounts.fee_resolver;
    resolver.secondary_min_lp_fee_bps = min_lp_fee_bps;
    resolver.secondary_min_collect_fee_bps = min_collect_fee_bps;

    emit_resolver(resolver);
    Ok(())
}

fn emit_resolver(resolver: &Account<FeeResolver>) {
    emit!(FeeResolverUpdated {
        fee_resolver: resolver.key(),
        primary_signer: resolver.primary_signer,
        secondary_signer: resolver.secondary_signer,
        secondary_min_lp_fee_bps: resolver.secondary_min_lp_fee_bps,
        secondary_min_collect_fee_bps: resolver.secondary_min_collect_fee_bps,
    });
}

// ============ Flat Fee Exemptions ============

#[derive(Accounts)]
#[instruction(wallet: Pubkey)]
pub struct WhitelistFeeAccount<'info> {
    #[account(
        mut,
        address = fee_resolver.authority @ LockerError::Unauthorized
    )]
    pub authority: Signer<'info>,

    #[account(
        seeds = [FEE_RESOLVER_SEED, fee_resolver.registry.as_ref()],
        bump = fee_resolver.bump
    )]
    pub fee_resolver: Box<Account<'info, FeeResolver>>,

    #[account(
        init_if_needed,
        payer = authority,
        space = FeeExemption::LEN,
        seeds = [FEE_EXEMPT_SEED, fee_resolver.key().as_ref(), wallet.as_ref()],
        bump
    )]
    pub fee_exemption: Account<'info, FeeExemption>,

    pub system_program: Program<'info, System>,
}

pub fn whitelist_fee_account_handler(
    ctx: Context<WhitelistFeeAccount>,
    wallet: Pubkey,
    exempt: bool,
) -> Result<()> {
    let exemption = &mut ctx.accounts.fee_exemption;
    exemption.registry = ctx.accounts.fee_resolver.registry;
    exemption.wallet = wallet;
    exemption.exempt = exempt;
    exemption.bump = ctx.bumps.fee_exemption;

    emit!(FeeAccountWhitelisted {
        fee_resolver: ctx.accounts.fee_resolver.key(),
        wallet,
        exempt,
    });

    Ok(())
}

// ============ Preview ============

#[derive(Accounts)]
pub struct PreviewSignedFee<'info> {
    #[account(
        seeds = [FEE_RESOLVER_SEED, fee_resolver.registry.as_ref()],
        bump = fee_resolver.bump
    )]
    pub fee_resolver: Box<Account<'info, FeeResolver>>,
}

/// Verify and decode a signed fee without consuming its reference code
pub fn preview_signed_fee_handler(
    ctx: Context<PreviewSignedFee>,
    message: SignedFeeMessage,
) -> Result<ResolvedFee> {
    ctx.accounts.fee_resolver.preview(&message)
}
