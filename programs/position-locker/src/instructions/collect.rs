use anchor_lang::prelude::*;
use anchor_spl::token::Token;
use anchor_spl::token_2022::Token2022;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::state::*;
use crate::constants::*;
use crate::errors::LockerError;
use crate::events::FeesCollected;
use crate::clmm::{self, ClmmPositionAccounts, DecreaseLiquidityV2Args, TokenAmounts};
use crate::utils::{pay_collect_split, CollectPayout, SplitDestinations};

/// Harvest a locked position's fees
///
/// Fees pass through the registry's transit vaults so the amounts are
/// measured, then the collect fee is split off. Anything above the caller's
/// caps goes to the lock's collect address. The registry's auto-collector
/// may name its own fee receiver as `recipient`.
#[derive(Accounts)]
#[instruction(lock_id: u64)]
pub struct Collect<'info> {
    pub caller: Signer<'info>,

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

    /// CHECK: Wallet the capped fees are paid to
    pub recipient: UncheckedAccount<'info>,

    #[account(
        mut,
        token::mint = mint_0,
        token::authority = recipient,
        token::token_program = token_program_0
    )]
    pub recipient_token_0: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = mint_1,
        token::authority = recipient,
        token::token_program = token_program_1
    )]
    pub recipient_token_1: Box<InterfaceAccount<'info, TokenAccount>>,

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

    /// Required when harvested fees exceed a cap
    #[account(
        mut,
        token::mint = mint_0,
        token::token_program = token_program_0,
        constraint = collect_address_token_0.owner == lock.collect_address @ LockerError::InvalidAccountData
    )]
    pub collect_address_token_0: Option<Box<InterfaceAccount<'info, TokenAccount>>>,

    #[account(
        mut,
        token::mint = mint_1,
        token::token_program = token_program_1,
        constraint = collect_address_token_1.owner == lock.collect_address @ LockerError::InvalidAccountData
    )]
    pub collect_address_token_1: Option<Box<InterfaceAccount<'info, TokenAccount>>>,

    pub token_program: Program<'info, Token>,
    pub token_program_2022: Program<'info, Token2022>,
    pub token_program_0: Interface<'info, TokenInterface>,
    pub token_program_1: Interface<'info, TokenInterface>,
}

pub fn handler<'info>(
    mut ctx: Context<'_, '_, 'info, 'info, Collect<'info>>,
    lock_id: u64,
    amount_0_max: u64,
    amount_1_max: u64,
) -> Result<()> {
    let accounts = &mut ctx.accounts;
    let lock = (**accounts.lock).clone();
    lock.assert_can_collect(
        &accounts.caller.key(),
        &accounts.recipient.key(),
        &accounts.registry.auto_collect_account,
    )?;

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
    let gross = cpi.decrease_into(
        &DecreaseLiquidityV2Args::collect_fees_only(),
        &mut accounts.transit_0,
        &mut accounts.transit_1,
        signer_seeds,
    )?;

    let caps = TokenAmounts {
        amount_0: amount_0_max,
        amount_1: amount_1_max,
    };
    let Some(payout) = CollectPayout::plan(gross, caps, lock.collect_fee_bps)? else {
        msg!("Lock {}: nothing to collect", lock_id);
        return Ok(());
    };

    let registry_info = accounts.registry.to_account_info();
    let collect_address_0 = accounts.collect_address_token_0.as_ref().map(|a| a.to_account_info());
    let collect_address_1 = accounts.collect_address_token_1.as_ref().map(|a| a.to_account_info());

    pay_collect_split(
        &accounts.transit_0.to_account_info(),
        &accounts.mint_0,
        &registry_info,
        &accounts.token_program_0.to_account_info(),
        signer_seeds,
        &payout.token_0,
        SplitDestinations {
            recipient: &accounts.recipient_token_0.to_account_info(),
            fee_receiver: &accounts.collect_fee_token_0.to_account_info(),
            collect_address: collect_address_0.as_ref(),
        },
    )?;
    pay_collect_split(
        &accounts.transit_1.to_account_info(),
        &accounts.mint_1,
        &registry_info,
        &accounts.token_program_1.to_account_info(),
        signer_seeds,
        &payout.token_1,
        SplitDestinations {
            recipient: &accounts.recipient_token_1.to_account_info(),
            fee_receiver: &accounts.collect_fee_token_1.to_account_info(),
            collect_address: collect_address_1.as_ref(),
        },
    )?;

    msg!("Lock {} collected {} / {}", lock_id, gross.amount_0, gross.amount_1);

    emit!(FeesCollected {
        lock_id,
        recipient: accounts.recipient.key(),
        amount_0: payout.token_0.to_recipient,
        amount_1: payout.token_1.to_recipient,
        overflow_0: payout.token_0.to_collect_address,
        overflow_1: payout.token_1.to_collect_address,
        fee_0: payout.token_0.fee,
        fee_1: payout.token_1.fee,
    });

    Ok(())
}
