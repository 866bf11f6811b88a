use anchor_lang::prelude::*;
use anchor_spl::token::Token;
use anchor_spl::token_2022::Token2022;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::state::*;
use crate::constants::*;
use crate::errors::LockerError;
use crate::events::{FeesCollected, LockMigrated};
use crate::clmm::{self, ClmmPositionAccounts, DecreaseLiquidityV2Args, PositionSnapshot, TokenAmounts};
use crate::utils::{close_vault, pay_collect_split, transfer_from_vault, CollectPayout, SplitDestinations};
use super::lock::emit_created;

/// Move a lock to the successor registry through its bridge.
///
/// Liquidity stays in the position; only the NFT changes custody. Pending
/// fees are paid to the collect address on the way out and no entry fee is
/// charged on the way in.
#[derive(Accounts)]
#[instruction(lock_id: u64)]
pub struct Migrate<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [REGISTRY_SEED, &source_registry.registry_id.to_le_bytes()],
        bump = source_registry.bump
    )]
    pub source_registry: Box<Account<'info, Registry>>,

    #[account(
        mut,
        seeds = [LOCK_SEED, source_registry.key().as_ref(), &lock_id.to_le_bytes()],
        bump = source_lock.bump
    )]
    pub source_lock: Box<Account<'info, Lock>>,

    #[account(
        mut,
        seeds = [USER_LOCKS_SEED, source_registry.key().as_ref(), owner.key().as_ref()],
        bump = source_user_locks.bump
    )]
    pub source_user_locks: Box<Account<'info, UserLocks>>,

    #[account(
        mut,
        seeds = [USER_LOCK_SLOT_SEED, source_user_locks.key().as_ref(), &source_lock.index_slot.to_le_bytes()],
        bump = source_user_lock_slot.bump
    )]
    pub source_user_lock_slot: Box<Account<'info, UserLockSlot>>,

    /// Last entry of the source index, unless this lock holds it
    #[account(mut)]
    pub source_last_user_lock_slot: Option<Box<Account<'info, UserLockSlot>>>,

    #[account(mut)]
    pub source_moved_lock: Option<Box<Account<'info, Lock>>>,

    pub bridge: Box<Account<'info, MigrationBridge>>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED, &destination_registry.registry_id.to_le_bytes()],
        bump = destination_registry.bump
    )]
    pub destination_registry: Box<Account<'info, Registry>>,

    #[account(
        init,
        payer = owner,
        space = Lock::LEN,
        seeds = [LOCK_SEED, destination_registry.key().as_ref(), &destination_registry.locks_length.to_le_bytes()],
        bump
    )]
    pub destination_lock: Box<Account<'info, Lock>>,

    #[account(
        init_if_needed,
        payer = owner,
        space = UserLocks::LEN,
        seeds = [USER_LOCKS_SEED, destination_registry.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub destination_user_locks: Box<Account<'info, UserLocks>>,

    #[account(
        init,
        payer = owner,
        space = UserLockSlot::LEN,
        seeds = [
            USER_LOCK_SLOT_SEED,
            destination_user_locks.key().as_ref(),
            &destination_user_locks.count.to_le_bytes()
        ],
        bump
    )]
    pub destination_user_lock_slot: Box<Account<'info, UserLockSlot>>,

    /// CHECK: The lock's position manager program
    #[account(address = source_lock.position_manager @ LockerError::InvalidPosition)]
    pub position_manager: UncheckedAccount<'info>,

    #[account(
        address = source_lock.nft_mint @ LockerError::InvalidPosition,
        mint::token_program = nft_token_program
    )]
    pub nft_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        seeds = [CUSTODY_SEED, source_registry.key().as_ref(), nft_mint.key().as_ref()],
        bump
    )]
    pub source_custody_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init,
        payer = owner,
        seeds = [CUSTODY_SEED, destination_registry.key().as_ref(), nft_mint.key().as_ref()],
        bump,
        token::mint = nft_mint,
        token::authority = destination_registry,
        token::token_program = nft_token_program
    )]
    pub destination_custody_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mint::token_program = token_program_0)]
    pub mint_0: Box<InterfaceAccount<'info, Mint>>,

    #[account(mint::token_program = token_program_1)]
    pub mint_1: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        seeds = [TRANSIT_SEED, source_registry.key().as_ref(), mint_0.key().as_ref()],
        bump,
        token::mint = mint_0,
        token::authority = source_registry,
        token::token_program = token_program_0
    )]
    pub transit_0: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [TRANSIT_SEED, source_registry.key().as_ref(), mint_1.key().as_ref()],
        bump,
        token::mint = mint_1,
        token::authority = source_registry,
        token::token_program = token_program_1
    )]
    pub transit_1: Box<InterfaceAccount<'info, TokenAccount>>,

    /// The destination registry's transit vaults, for harvests after the move
    #[account(
        init_if_needed,
        payer = owner,
        seeds = [TRANSIT_SEED, destination_registry.key().as_ref(), mint_0.key().as_ref()],
        bump,
        token::mint = mint_0,
        token::authority = destination_registry,
        token::token_program = token_program_0
    )]
    pub destination_transit_0: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init_if_needed,
        payer = owner,
        seeds = [TRANSIT_SEED, destination_registry.key().as_ref(), mint_1.key().as_ref()],
        bump,
        token::mint = mint_1,
        token::authority = destination_registry,
        token::token_program = token_program_1
    )]
    pub destination_transit_1: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = mint_0,
        token::token_program = token_program_0,
        constraint = collect_address_token_0.owner == source_lock.collect_address @ LockerError::InvalidAccountData
    )]
    pub collect_address_token_0: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = mint_1,
        token::token_program = token_program_1,
        constraint = collect_address_token_1.owner == source_lock.collect_address @ LockerError::InvalidAccountData
    )]
    pub collect_address_token_1: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = mint_0,
        token::token_program = token_program_0,
        constraint = collect_fee_token_0.owner == source_registry.collect_fee_receiver @ LockerError::InvalidAccountData
    )]
    pub collect_fee_token_0: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = mint_1,
        token::token_program = token_program_1,
        constraint = collect_fee_token_1.owner == source_registry.collect_fee_receiver @ LockerError::InvalidAccountData
    )]
    pub collect_fee_token_1: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
    pub token_program_2022: Program<'info, Token2022>,
    pub token_program_0: Interface<'info, TokenInterface>,
    pub token_program_1: Interface<'info, TokenInterface>,
    pub nft_token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

/// Source and destination must both have wired `bridge`, in that order of checks
pub fn check_bridge(
    source: &Registry,
    source_key: &Pubkey,
    destination: &Registry,
    destination_key: &Pubkey,
    bridge: &MigrationBridge,
    bridge_key: &Pubkey,
) -> Result<()> {
    source.check_migrator(bridge_key)?;
    bridge.assert_endpoints(source_key, destination_key)?;
    destination.check_migrate_in(bridge_key)
}

pub fn handler<'info>(
    mut ctx: Context<'_, '_, 'info, 'info, Migrate<'info>>,
    lock_id: u64,
) -> Result<()> {
    let accounts = &mut ctx.accounts;
    let source_lock = (**accounts.source_lock).clone();

    // ============ Checks ============
    source_lock.assert_owner(&accounts.owner.key())?;
    check_bridge(
        &accounts.source_registry,
        &accounts.source_registry.key(),
        &accounts.destination_registry,
        &accounts.destination_registry.key(),
        &accounts.bridge,
        &accounts.bridge.key(),
    )?;

    let position_accounts = ClmmPositionAccounts::from_remaining(ctx.remaining_accounts)?;
    require_keys_eq!(position_accounts.pool_state.key(), source_lock.pool, LockerError::InvalidPool);
    let (position, pool) = position_accounts.load(&source_lock.position_manager, &source_lock.nft_mint)?;
    clmm::check_pool_mints(&pool, &accounts.mint_0.key(), &accounts.mint_1.key())?;

    // ============ Effects ============
    let destination_key = accounts.destination_registry.key();
    let destination_lock_id = accounts.destination_registry.next_lock_id()?;
    let mut record = source_lock.migrated(destination_lock_id, ctx.bumps.destination_lock);
    index_lock(
        destination_key,
        &mut accounts.destination_user_locks,
        ctx.bumps.destination_user_locks,
        &mut accounts.destination_user_lock_slot,
        ctx.bumps.destination_user_lock_slot,
        &mut record,
    )?;
    accounts.destination_lock.set_inner(record);

    let owner = accounts.owner.key();
    let owner_info = accounts.owner.to_account_info();
    unindex_lock(
        &accounts.source_registry.key(),
        &source_lock,
        &mut accounts.source_user_locks,
        &mut accounts.source_user_lock_slot,
        accounts.source_last_user_lock_slot.as_deref_mut(),
        accounts.source_moved_lock.as_deref_mut(),
        &owner_info,
    )?;
    accounts.source_lock.tombstone();

    // ============ Interactions ============
    let registry_id = accounts.source_registry.registry_id.to_le_bytes();
    let registry_bump = [accounts.source_registry.bump];
    let registry_seeds: &[&[u8]] = &[REGISTRY_SEED, &registry_id, &registry_bump];
    let signer_seeds = &[registry_seeds];

    let cpi = clmm::position_cpi(
        accounts.position_manager.to_account_info(),
        accounts.source_registry.to_account_info(),
        accounts.source_custody_vault.to_account_info(),
        accounts.token_program.to_account_info(),
        accounts.token_program_2022.to_account_info(),
        &accounts.mint_0,
        &accounts.mint_1,
        position_accounts,
    );
    let registry_info = accounts.source_registry.to_account_info();
    // A paused pool must not block the move; its fees stay on the position
    if pool.can_harvest() {
        let gross = cpi.decrease_into(
            &DecreaseLiquidityV2Args::collect_fees_only(),
            &mut accounts.transit_0,
            &mut accounts.transit_1,
            signer_seeds,
        )?;
        if let Some(payout) = CollectPayout::plan(gross, TokenAmounts::UNCAPPED, source_lock.collect_fee_bps)? {
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
                recipient: source_lock.collect_address,
                amount_0: payout.token_0.to_recipient,
                amount_1: payout.token_1.to_recipient,
                overflow_0: 0,
                overflow_1: 0,
                fee_0: payout.token_0.fee,
                fee_1: payout.token_1.fee,
            });
        }
    } else {
        msg!("Lock {}: pool paused, harvest skipped", lock_id);
    }

    let nft_token_program = accounts.nft_token_program.to_account_info();
    let source_vault = accounts.source_custody_vault.to_account_info();
    transfer_from_vault(
        &source_vault,
        &accounts.destination_custody_vault.to_account_info(),
        &accounts.nft_mint,
        &registry_info,
        &nft_token_program,
        signer_seeds,
        1,
    )?;
    close_vault(
        &source_vault,
        &accounts.owner.to_account_info(),
        &registry_info,
        &nft_token_program,
        signer_seeds,
    )?;

    msg!("Lock {} migrated to lock {} in {}", lock_id, destination_lock_id, destination_key);

    emit!(LockMigrated {
        source_registry: accounts.source_registry.key(),
        source_lock_id: lock_id,
        destination_registry: destination_key,
        destination_lock_id,
        owner,
    });
    emit_created(&accounts.destination_lock, PositionSnapshot::from(&position));

    Ok(())
}
