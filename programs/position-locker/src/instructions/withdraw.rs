use anchor_lang::prelude::*;
use anchor_spl::token::Token;
use anchor_spl::token_2022::Token2022;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::state::*;
use crate::constants::*;
use crate::errors::LockerError;
use crate::events::{FeesCollected, LockWithdrawn};
use crate::clmm::{self, ClmmPositionAccounts, DecreaseLiquidityV2Args, TokenAmounts};
use crate::utils::{close_vault, pay_collect_split, transfer_from_vault, CollectPayout, SplitDestinations};

/// Release an expired lock: final fee harvest to the collect address, then
/// the NFT to the owner's chosen account.
///
/// The lock leaves its owner's index. When it is not the last entry, the
/// last entry and its lock come along so that lock can move into the freed
/// slot. The unused entry's rent goes back to the owner.
#[derive(Accounts)]
#[instruction(lock_id: u64)]
pub struct Withdraw<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [REGISTRY_SEED, &registry.registry_id.to_le_bytes()],
        bump = registry.bump
    )]
    pub registry: Box<Account<'info, Registry>>,

    #[account(
        mut,
        seeds = [LOCK_SEED, registry.key().as_ref(), &lock_id.to_le_bytes()],
        bump = lock.bump
    )]
    pub lock: Box<Account<'info, Lock>>,

    #[account(
        mut,
        seeds = [USER_LOCKS_SEED, registry.key().as_ref(), owner.key().as_ref()],
        bump = user_locks.bump
    )]
    pub user_locks: Box<Account<'info, UserLocks>>,

    #[account(
        mut,
        seeds = [USER_LOCK_SLOT_SEED, user_locks.key().as_ref(), &lock.index_slot.to_le_bytes()],
        bump = user_lock_slot.bump
    )]
    pub user_lock_slot: Box<Account<'info, UserLockSlot>>,

    /// Last entry of the owner's index, unless this lock holds it
    #[account(mut)]
    pub last_user_lock_slot: Option<Box<Account<'info, UserLockSlot>>>,

    /// The lock `last_user_lock_slot` points at
    #[account(mut)]
    pub moved_lock: Option<Box<Account<'info, Lock>>>,

    /// CHECK: The lock's position manager program
    #[account(address = lock.position_manager @ LockerError::InvalidPosition)]
    pub position_manager: UncheckedAccount<'info>,

    #[account(
        address = lock.nft_mint @ LockerError::InvalidPosition,
        mint::token_program = nft_token_program
    )]
    pub nft_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        seeds = [CUSTODY_SEED, registry.key().as_ref(), nft_mint.key().as_ref()],
        bump
    )]
    pub custody_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = nft_mint,
        token::token_program = nft_token_program
    )]
    pub recipient_nft_account: Box<InterfaceAccount<'info, TokenAccount>>,

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
        token::token_program = token_program_0,
        constraint = collect_address_token_0.owner == lock.collect_address @ LockerError::InvalidAccountData
    )]
    pub collect_address_token_0: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = mint_1,
        token::token_program = token_program_1,
        constraint = collect_address_token_1.owner == lock.collect_address @ LockerError::InvalidAccountData
    )]
    pub collect_address_token_1: Box<InterfaceAccount<'info, TokenAccount>>,

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
    pub nft_token_program: Interface<'info, TokenInterface>,
}

pub fn handler<'info>(
    mut ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
    lock_id: u64,
) -> Result<()> {
    let accounts = &mut ctx.accounts;
    let lock = (**accounts.lock).clone();

    // ============ Checks ============
    lock.assert_owner(&accounts.owner.key())?;
    lock.assert_withdrawable(Clock::get()?.unix_timestamp)?;

    let position_accounts = ClmmPositionAccounts::from_remaining(ctx.remaining_accounts)?;
    require_keys_eq!(position_accounts.pool_state.key(), lock.pool, LockerError::InvalidPool);
    let (_, pool) = position_accounts.load(&lock.position_manager, &lock.nft_mint)?;
    clmm::check_pool_mints(&pool, &accounts.mint_0.key(), &accounts.mint_1.key())?;

    // ============ Effects ============
    let owner_info = accounts.owner.to_account_info();
    unindex_lock(
        &accounts.registry.key(),
        &lock,
        &mut accounts.user_locks,
        &mut accounts.user_lock_slot,
        accounts.last_user_lock_slot.as_deref_mut(),
        accounts.moved_lock.as_deref_mut(),
        &owner_info,
    )?;
    accounts.lock.tombstone();

    // ============ Interactions ============
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
    let registry_info = accounts.registry.to_account_info();
    // A paused pool must not strand the NFT; its fees stay on the position
    if pool.can_harvest() {
        let gross = cpi.decrease_into(
            &DecreaseLiquidityV2Args::collect_fees_only(),
            &mut accounts.transit_0,
            &mut accounts.transit_1,
            signer_seeds,
        )?;
        if let Some(payout) = CollectPayout::plan(gross, TokenAmounts::UNCAPPED, lock.collect_fee_bps)? {
            pay_collect_split(
                &accounts.transit_0.to_account_info(),
                &accounts.mint_0,
                &registry_info,
                &accounts.token_program_0.to_account_info(),
                signer_seeds,
                &payout.token_0,
                SplitDestinations {
                    recipient: &accounts.collect_address_token_0.to_account_info(),
                    fee_receiver: &accounts.collect_fee_token_0.to_account_info(),
                    collect_address: None,
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
                    recipient: &accounts.collect_address_token_1.to_account_info(),
                    fee_receiver: &accounts.collect_fee_token_1.to_account_info(),
                    collect_address: None,
                },
            )?;

            emit!(FeesCollected {
                lock_id,
                recipient: lock.collect_address,
                amount_0: payout.token_0.to_recipient,
                amount_1: payout.token_1.to_recipient,
                overflow_0: 0,
                overflow_1: 0,
                fee_0: payout.token_0.fee,
                fee_1: payout.token_1.fee,
            });
        }
    } else {
        msg!("Lock {}: pool paused, final harvest skipped", lock_id);
    }

    let nft_token_program = accounts.nft_token_program.to_account_info();
    let custody_info = accounts.custody_vault.to_account_info();
    transfer_from_vault(
        &custody_info,
        &accounts.recipient_nft_account.to_account_info(),
        &accounts.nft_mint,
        &registry_info,
        &nft_token_program,
        signer_seeds,
        1,
    )?;
    close_vault(
        &custody_info,
        &accounts.owner.to_account_info(),
        &registry_info,
        &nft_token_program,
        signer_seeds,
    )?;

    msg!("Lock {} withdrawn", lock_id);

    emit!(LockWithdrawn {
        lock_id,
        owner: lock.owner,
        recipient: accounts.recipient_nft_account.owner,
    });

    Ok(())
}
