use anchor_lang::prelude::*;
use anchor_spl::token::Token;
use anchor_spl::token_2022::Token2022;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::state::*;
use crate::constants::*;
use crate::errors::LockerError;
use crate::events::LiquidityDecreased;
use crate::clmm::{self, ClmmPositionAccounts, DecreaseLiquidityV2Args};
use crate::utils::{transfer_from_vault, DecreasePayout};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct DecreaseLiquidityParams {
    pub liquidity: u128,
    pub amount_0_min: u64,
    pub amount_1_min: u64,
}

/// Remove liquidity from an unlocked position without withdrawing the NFT
#[derive(Accounts)]
#[instruction(lock_id: u64)]
pub struct DecreaseLockedLiquidity<'info> {
    pub owner: Signer<'info>,

    #[account(
        seeds = [REGISTRY_SEED, &registry.registry_id.to_le_bytes()],
        bump = registry.bump
    )]
    pub registry: Box<Account<'info, Registry>>,

    #[account(
        seeds = [LOCK_SEED, registry.key().as_ref(), &lock_id.to_le_bytes()],
        bump = lock.bump
    )]
    pub lock: Box<Account<'info, Lock>>,

    /// CHECK: The lock's position manager program
    #[account(address = lock.position_manager @ LockerError::InvalidPosition)]
    pub position_manager: UncheckedAccount<'info>,

    #[account(
        seeds = [CUSTODY_SEED, registry.key().as_ref(), lock.nft_mint.as_ref()],
        bump
    )]
    pub custody_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mint::token_program = token_program_0)]
    pub mint_0: Box<InterfaceAccount<'info, Mint>>,

    #[account(mint::token_program = token_program_1)]
    pub mint_1: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        seeds = [TRANSIT_SEED, registry.key().as_ref(), mint_0.key().as_ref()],
        bump,
        token::mint = mint_0,
        token::authority = registry,
        token::token_program = token_program_0
    )]
    pub transit_0: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [TRANSIT_SEED, registry.key().as_ref(), mint_1.key().as_ref()],
        bump,
        token::mint = mint_1,
        token::authority = registry,
        token::token_program = token_program_1
    )]
    pub transit_1: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Owner-chosen destination for principal and net fees
    #[account(mut, token::mint = mint_0, token::token_program = token_program_0)]
    pub destination_token_0: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, token::mint = mint_1, token::token_program = token_program_1)]
    pub destination_token_1: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = mint_0,
        token::token_program = token_program_0,
        constraint = collect_fee_token_0.owner == registry.collect_fee_receiver @ LockerError::InvalidAccountData
    )]
    pub collect_fee_token_0: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = mint_1,
        token::token_program = token_program_1,
        constraint = collect_fee_token_1.owner == registry.collect_fee_receiver @ LockerError::InvalidAccountData
    )]
    pub collect_fee_token_1: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
    pub token_program_2022: Program<'info, Token2022>,
    pub token_program_0: Interface<'info, TokenInterface>,
    pub token_program_1: Interface<'info, TokenInterface>,
}

pub fn handler<'info>(
    mut ctx: Context<'_, '_, 'info, 'info, DecreaseLockedLiquidity<'info>>,
    lock_id: u64,
    params: DecreaseLiquidityParams,
) -> Result<()> {
    let accounts = &mut ctx.accounts;
    let lock = (**accounts.lock).clone();
    lock.assert_owner(&accounts.owner.key())?;
    lock.assert_unlocked(Clock::get()?.unix_timestamp)?;
    require!(params.liquidity > 0, LockerError::ZeroAmount);

    let position_accounts = ClmmPositionAccounts::from_remaining(ctx.remaining_accounts)?;
    require_keys_eq!(position_accounts.pool_state.key(), lock.pool, LockerError::InvalidPool);
    let (_, pool) = position_accounts.load(&lock.position_manager, &lock.nft_mint)?;
    clmm::check_pool_mints(&pool, &accounts.mint_0.key(), &accounts.mint_1.key())?;
    require!(pool.can_harvest(), LockerError::PoolPaused);

    let registry_id = accounts.registry.registry_id.to_le_bytes();
    let registry_bump = [accounts.registry.bump];
    let registry_seeds: &[&[u8]] = &[REGISTRY_SEED, &registry_id, &registry_bump];
    let signer_seeds = &[registry_seeds];

    let cpi = clmm::position_cpi(
        accounts.position_manager.to_account_info(),
        accounts.registry.to_account_info(),
        accounts.custody_vault.to_account_info(),
        accounts.token_program.to_account_info(),
        accounts.token_program_2022.to_account_info(),
        &accounts.mint_0,
        &accounts.mint_1,
        position_accounts,
    );

    // Fees first so the collect fee never touches principal
    let fees = cpi.decrease_into(
        &DecreaseLiquidityV2Args::collect_fees_only(),
        &mut accounts.transit_0,
        &mut accounts.transit_1,
        signer_seeds,
    )?;
    let principal = cpi.decrease_into(
        &DecreaseLiquidityV2Args::remove(
            params.liquidity,
            params.amount_0_min,
            params.amount_1_min,
        ),
        &mut accounts.transit_0,
        &mut accounts.transit_1,
        signer_seeds,
    )?;

    let payout = DecreasePayout::new(fees, principal, lock.collect_fee_bps)?;

    let registry_info = accounts.registry.to_account_info();
    let transit_0 = accounts.transit_0.to_account_info();
    let transit_1 = accounts.transit_1.to_account_info();
    let token_program_0 = accounts.token_program_0.to_account_info();
    let token_program_1 = accounts.token_program_1.to_account_info();

    transfer_from_vault(
        &transit_0,
        &accounts.destination_token_0.to_account_info(),
        &accounts.mint_0,
        &registry_info,
        &token_program_0,
        signer_seeds,
        payout.to_owner.amount_0,
    )?;
    transfer_from_vault(
        &transit_1,
        &accounts.destination_token_1.to_account_info(),
        &accounts.mint_1,
        &registry_info,
        &token_program_1,
        signer_seeds,
        payout.to_owner.amount_1,
    )?;
    transfer_from_vault(
        &transit_0,
        &accounts.collect_fee_token_0.to_account_info(),
        &accounts.mint_0,
        &registry_info,
        &token_program_0,
        signer_seeds,
        payout.fee.amount_0,
    )?;
    transfer_from_vault(
        &transit_1,
        &accounts.collect_fee_token_1.to_account_info(),
        &accounts.mint_1,
        &registry_info,
        &token_program_1,
        signer_seeds,
        payout.fee.amount_1,
    )?;

    msg!("Lock {} decreased by {}", lock_id, params.liquidity);

    emit!(LiquidityDecreased {
        lock_id,
        liquidity: params.liquidity,
        amount_0: principal.amount_0,
        amount_1: principal.amount_1,
    });

    Ok(())
}
