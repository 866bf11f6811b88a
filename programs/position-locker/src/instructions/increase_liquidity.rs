use anchor_lang::prelude::*;
use anchor_spl::token::Token;
use anchor_spl::token_2022::Token2022;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::state::*;
use crate::constants::*;
use crate::errors::LockerError;
use crate::events::LiquidityIncreased;
use crate::clmm::{self, ClmmPositionAccounts, IncreaseLiquidityV2Args, TokenAmounts};
use crate::utils::{increase_refund, transfer_from_user, transfer_from_vault};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct IncreaseLiquidityParams {
    /// 0 lets `base_flag` size the deposit from one side
    pub liquidity: u128,
    pub amount_0_max: u64,
    pub amount_1_max: u64,
    pub base_flag: Option<bool>,
}

/// Top up a locked position. Anyone may add liquidity.
#[derive(Accounts)]
#[instruction(lock_id: u64)]
pub struct IncreaseLockedLiquidity<'info> {
    pub depositor: Signer<'info>,

    #[account(
        seeds = [REGISTRY_SEED, &registry.registry_id.to_le_bytes()],
        bump = registry.bump
    )]
    pub registry: Box<Account<'info, Registry>>,

    #[account(
        seeds = [LOCK_SEED, registry.key().as_ref(), &lock_id.to_le_bytes()],
        bump = lock.bump,
        constraint = lock.is_active() @ LockerError::LockNotActive
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

    #[account(
        mut,
        token::mint = mint_0,
        token::authority = depositor,
        token::token_program = token_program_0
    )]
    pub depositor_token_0: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = mint_1,
        token::authority = depositor,
        token::token_program = token_program_1
    )]
    pub depositor_token_1: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
    pub token_program_2022: Program<'info, Token2022>,
    pub token_program_0: Interface<'info, TokenInterface>,
    pub token_program_1: Interface<'info, TokenInterface>,
}

pub fn handler<'info>(
    mut ctx: Context<'_, '_, 'info, 'info, IncreaseLockedLiquidity<'info>>,
    lock_id: u64,
    params: IncreaseLiquidityParams,
) -> Result<()> {
    require!(
        params.amount_0_max > 0 || params.amount_1_max > 0,
        LockerError::ZeroAmount
    );

    let accounts = &mut ctx.accounts;
    let lock = (**accounts.lock).clone();

    let position_accounts = ClmmPositionAccounts::from_remaining(ctx.remaining_accounts)?;
    require_keys_eq!(position_accounts.pool_state.key(), lock.pool, LockerError::InvalidPool);
    let (_, pool) = position_accounts.load(&lock.position_manager, &lock.nft_mint)?;
    clmm::check_pool_mints(&pool, &accounts.mint_0.key(), &accounts.mint_1.key())?;
    require!(pool.can_increase_liquidity(), LockerError::PoolPaused);

    let base_0 = accounts.transit_0.amount;
    let base_1 = accounts.transit_1.amount;

    let token_program_0 = accounts.token_program_0.to_account_info();
    let token_program_1 = accounts.token_program_1.to_account_info();
    transfer_from_user(
        &accounts.depositor_token_0.to_account_info(),
        &accounts.transit_0.to_account_info(),
        &accounts.mint_0,
        &accounts.depositor,
        &token_program_0,
        params.amount_0_max,
    )?;
    transfer_from_user(
        &accounts.depositor_token_1.to_account_info(),
        &accounts.transit_1.to_account_info(),
        &accounts.mint_1,
        &accounts.depositor,
        &token_program_1,
        params.amount_1_max,
    )?;
    accounts.transit_0.reload()?;
    accounts.transit_1.reload()?;

    // Transfer fees on either mint shrink what actually arrived
    let received_0 = accounts.transit_0.amount.checked_sub(base_0).ok_or(LockerError::Overflow)?;
    let received_1 = accounts.transit_1.amount.checked_sub(base_1).ok_or(LockerError::Overflow)?;

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
    let used = cpi.increase_from(
        &IncreaseLiquidityV2Args {
            liquidity: params.liquidity,
            amount_0_max: received_0,
            amount_1_max: received_1,
            base_flag: params.base_flag,
        },
        &mut accounts.transit_0,
        &mut accounts.transit_1,
        signer_seeds,
    )?;

    let received = TokenAmounts {
        amount_0: received_0,
        amount_1: received_1,
    };
    let refund = increase_refund(received, used)?;

    let registry_info = accounts.registry.to_account_info();
    transfer_from_vault(
        &accounts.transit_0.to_account_info(),
        &accounts.depositor_token_0.to_account_info(),
        &accounts.mint_0,
        &registry_info,
        &token_program_0,
        signer_seeds,
        refund.amount_0,
    )?;
    transfer_from_vault(
        &accounts.transit_1.to_account_info(),
        &accounts.depositor_token_1.to_account_info(),
        &accounts.mint_1,
        &registry_info,
        &token_program_1,
        signer_seeds,
        refund.amount_1,
    )?;

    msg!("Lock {} increased by {} / {}", lock_id, used.amount_0, used.amount_1);

    emit!(LiquidityIncreased {
        lock_id,
        depositor: accounts.depositor.key(),
        amount_0: used.amount_0,
        amount_1: used.amount_1,
    });

    Ok(())
}
