use anchor_lang::prelude::*;
use crate::state::*;
use super::relock::UpdateLock;
use crate::constants::*;
use crate::errors::LockerError;
use crate::events::{LockOwnershipTransferStarted, LockOwnershipTransferred};

/// Propose a new owner; it takes effect once they accept
pub fn transfer_lock_ownership_handler(
    ctx: Context<UpdateLock>,
    lock_id: u64,
    new_owner: Pubkey,
) -> Result<()> {
    let lock = &mut ctx.accounts.lock;
    lock.assert_owner(&ctx.accounts.owner.key())?;
    lock.begin_ownership_transfer(new_owner)?;

    emit!(LockOwnershipTransferStarted {
        lock_id,
        current_owner: lock.owner,
        pending_owner: new_owner,
    });

    Ok(())
}

/// The lock moves from the old owner's index to the new owner's. The old
/// owner gets back the rent of the entry this frees.
#[derive(Accounts)]
#[instruction(lock_id: u64)]
pub struct AcceptLockOwnership<'info> {
    #[account(mut)]
    pub new_owner: Signer<'info>,

    /// CHECK: Current owner, receives the freed entry's rent
    #[account(mut, address = lock.owner @ LockerError::Unauthorized)]
    pub old_owner: UncheckedAccount<'info>,

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
        seeds = [USER_LOCKS_SEED, registry.key().as_ref(), lock.owner.as_ref()],
        bump = old_owner_locks.bump
    )]
    pub old_owner_locks: Box<Account<'info, UserLocks>>,

    #[account(
        mut,
        seeds = [USER_LOCK_SLOT_SEED, old_owner_locks.key().as_ref(), &lock.index_slot.to_le_bytes()],
        bump = old_owner_lock_slot.bump
    )]
    pub old_owner_lock_slot: Box<Account<'info, UserLockSlot>>,

    /// Last entry of the old owner's index, unless this lock holds it
    #[account(mut)]
    pub old_owner_last_slot: Option<Box<Account<'info, UserLockSlot>>>,

    #[account(mut)]
    pub moved_lock: Option<Box<Account<'info, Lock>>>,

    #[account(
        init_if_needed,
        payer = new_owner,
        space = UserLocks::LEN,
        seeds = [USER_LOCKS_SEED, registry.key().as_ref(), new_owner.key().as_ref()],
        bump
    )]
    pub new_owner_locks: Box<Account<'info, UserLocks>>,

    #[account(
        init,
        payer = new_owner,
        space = UserLockSlot::LEN,
        seeds = [USER_LOCK_SLOT_SEED, new_owner_locks.key().as_ref(), &new_owner_locks.count.to_le_bytes()],
        bump
    )]
    pub new_owner_lock_slot: Box<Account<'info, UserLockSlot>>,

    pub system_program: Program<'info, System>,
}

/// Complete a pending transfer and move the lock between owner indexes
pub fn accept_lock_ownership_handler(
    mut ctx: Context<AcceptLockOwnership>,
    lock_id: u64,
    collect_address: Pubkey,
) -> Result<()> {
    let accounts = &mut ctx.accounts;
    let new_owner = accounts.new_owner.key();
    let registry_key = accounts.registry.key();

    let before = (**accounts.lock).clone();
    let mut record = before.clone();
    let old_owner = record.accept_ownership(&new_owner, collect_address)?;

    let old_owner_info = accounts.old_owner.to_account_info();
    unindex_lock(
        &registry_key,
        &before,
        &mut accounts.old_owner_locks,
        &mut accounts.old_owner_lock_slot,
        accounts.old_owner_last_slot.as_deref_mut(),
        accounts.moved_lock.as_deref_mut(),
        &old_owner_info,
    )?;
    index_lock(
        registry_key,
        &mut accounts.new_owner_locks,
        ctx.bumps.new_owner_locks,
        &mut accounts.new_owner_lock_slot,
        ctx.bumps.new_owner_lock_slot,
        &mut record,
    )?;
    accounts.lock.set_inner(record);

    msg!("Lock {} ownership {} -> {}", lock_id, old_owner, new_owner);

    emit!(LockOwnershipTransferred {
        lock_id,
        old_owner,
        new_owner,
        collect_address,
    });

    Ok(())
}
