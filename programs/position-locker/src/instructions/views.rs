use anchor_lang::prelude::*;
use crate::state::*;
use crate::constants::*;
use crate::errors::LockerError;

// ============ Lock Lookups ============

#[derive(Accounts)]
#[instruction(lock_id: u64)]
pub struct GetLock<'info> {
    #[account(
        seeds = [REGISTRY_SEED, &registry.registry_id.to_le_bytes()],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,

    #[account(
        seeds = [LOCK_SEED, registry.key().as_ref(), &lock_id.to_le_bytes()],
        bump = lock.bump
    )]
    pub lock: Account<'info, Lock>,
}

pub fn get_lock_handler(ctx: Context<GetLock>, _lock_id: u64) -> Result<Lock> {
    Ok((*ctx.accounts.lock).clone())
}

#[derive(Accounts)]
#[instruction(owner: Pubkey, index: u64)]
pub struct GetUserLockAtIndex<'info> {
    #[account(
        seeds = [REGISTRY_SEED, &registry.registry_id.to_le_bytes()],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,

    #[account(
        seeds = [USER_LOCKS_SEED, registry.key().as_ref(), owner.as_ref()],
        bump = user_locks.bump
    )]
    pub user_locks: Account<'info, UserLocks>,

    #[account(
        seeds = [USER_LOCK_SLOT_SEED, user_locks.key().as_ref(), &index.to_le_bytes()],
        bump = user_lock_slot.bump
    )]
    pub user_lock_slot: Account<'info, UserLockSlot>,

    /// The lock `user_lock_slot` names, checked in the handler
    pub lock: Account<'info, Lock>,
}

/// `lock` (at `lock_key`) is the one the owner's index holds at `index`
pub fn check_indexed_lock(
    registry: &Pubkey,
    user_locks: &UserLocks,
    entry: &UserLockSlot,
    index: u64,
    lock: &Lock,
    lock_key: &Pubkey,
) -> Result<()> {
    require!(index < user_locks.len(), LockerError::IndexOutOfRange);
    require!(
        entry.slot == index && entry.lock_id == lock.lock_id && lock.owner == user_locks.owner,
        LockerError::LockNotIndexed
    );
    require_keys_eq!(*lock_key, lock.address(registry)?, LockerError::LockNotIndexed);
    Ok(())
}

pub fn get_user_lock_at_index_handler(
    ctx: Context<GetUserLockAtIndex>,
    _owner: Pubkey,
    index: u64,
) -> Result<Lock> {
    let lock = &ctx.accounts.lock;
    check_indexed_lock(
        &ctx.accounts.registry.key(),
        &ctx.accounts.user_locks,
        &ctx.accounts.user_lock_slot,
        index,
        lock,
        &lock.key(),
    )?;
    Ok((**lock).clone())
}

#[derive(Accounts)]
#[instruction(owner: Pubkey)]
pub struct GetNumUserLocks<'info> {
    #[account(
        seeds = [REGISTRY_SEED, &registry.registry_id.to_le_bytes()],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,

    /// CHECK: Owner index, possibly never created
    #[account(seeds = [USER_LOCKS_SEED, registry.key().as_ref(), owner.as_ref()], bump)]
    pub user_locks: UncheckedAccount<'info>,
}

pub fn get_num_user_locks_handler(ctx: Context<GetNumUserLocks>, _owner: Pubkey) -> Result<u64> {
    let info = ctx.accounts.user_locks.to_account_info();
    if info.data_is_empty() {
        return Ok(0);
    }
    require_keys_eq!(*info.owner, crate::ID, LockerError::InvalidAccountData);
    let data = info.try_borrow_data()?;
    let user_locks = UserLocks::try_deserialize(&mut &data[..])?;
    Ok(user_locks.len())
}

// ============ Registry Lookups ============

#[derive(Accounts)]
pub struct GetRegistry<'info> {
    #[account(
        seeds = [REGISTRY_SEED, &registry.registry_id.to_le_bytes()],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,
}

pub fn get_locks_length_handler(ctx: Context<GetRegistry>) -> Result<u64> {
    Ok(ctx.accounts.registry.locks_length)
}

#[derive(Accounts)]
#[instruction(name: String)]
pub struct GetFee<'info> {
    #[account(
        seeds = [REGISTRY_SEED, &registry.registry_id.to_le_bytes()],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,

    #[account(
        seeds = [FEE_TIER_SEED, registry.key().as_ref(), name.as_bytes()],
        bump = fee_tier.bump
    )]
    pub fee_tier: Account<'info, FeeTier>,
}

pub fn get_fee_handler(ctx: Context<GetFee>, _name: String) -> Result<FeeTier> {
    Ok((*ctx.accounts.fee_tier).clone())
}

// ============ Whitelist Pre-check ============

/// Called by the full-range converter before it touches any balance
#[derive(Accounts)]
pub struct CheckPositionManager<'info> {
    #[account(
        seeds = [REGISTRY_SEED, &registry.registry_id.to_le_bytes()],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,

    /// CHECK: Position manager program being asked about
    pub position_manager: UncheckedAccount<'info>,

    /// CHECK: Whitelist entry, possibly never created
    #[account(
        seeds = [POSITION_MANAGER_SEED, registry.key().as_ref(), position_manager.key().as_ref()],
        bump
    )]
    pub allowed_position_manager: UncheckedAccount<'info>,
}

/// True when the raw whitelist account exists, belongs to this program and is enabled
pub fn is_position_manager_allowed(owner: &Pubkey, data: &[u8]) -> bool {
    if data.is_empty() || *owner != crate::ID {
        return false;
    }
    let mut bytes = data;
    AllowedPositionManager::try_deserialize(&mut bytes)
        .map(|entry| entry.allowed)
        .unwrap_or(false)
}

pub fn check_position_manager_handler(ctx: Context<CheckPositionManager>) -> Result<()> {
    let info = ctx.accounts.allowed_position_manager.to_account_info();
    let allowed = is_position_manager_allowed(info.owner, &info.try_borrow_data()?);
    require!(allowed, LockerError::PositionManagerNotAllowed);
    Ok(())
}
