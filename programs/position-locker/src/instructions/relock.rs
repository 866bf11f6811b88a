use anchor_lang::prelude::*;
use crate::state::*;
use crate::constants::*;
use crate::events::{LockRelocked, AdditionalCollectorSet};

/// Owner-only edits of a single lock record
#[derive(Accounts)]
#[instruction(lock_id: u64)]
pub struct UpdateLock<'info> {
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
}

/// Extend the unlock date. Strictly later only; `ETERNAL_LOCK` is allowed.
pub fn relock_handler(ctx: Context<UpdateLock>, lock_id: u64, unlock_date: i64) -> Result<()> {
    let lock = &mut ctx.accounts.lock;
    lock.assert_owner(&ctx.accounts.owner.key())?;
    lock.relock(unlock_date)?;

    msg!("Lock {} relocked until {}", lock_id, unlock_date);

    emit!(LockRelocked {
        lock_id,
        unlock_date,
    });

    Ok(())
}

/// Default key removes the collector
pub fn set_additional_collector_handler(
    ctx: Context<UpdateLock>,
    lock_id: u64,
    additional_collector: Pubkey,
) -> Result<()> {
    let lock = &mut ctx.accounts.lock;
    lock.assert_owner(&ctx.accounts.owner.key())?;
    lock.additional_collector = additional_collector;

    emit!(AdditionalCollectorSet {
        lock_id,
        additional_collector,
    });

    Ok(())
}
