use anchor_lang::prelude::*;
use crate::errors::LockerError;
use super::lock::Lock;

/// Header of one owner's lock index in one registry.
///
/// Entries live in their own `UserLockSlot` PDAs, one per slot, so adding or
/// removing a lock touches a fixed number of accounts however many locks the
/// owner holds. Order is not stable: removal moves the last entry into the
/// freed slot.
#[account]
#[derive(Default, Debug)]
pub struct UserLocks {
    pub registry: Pubkey,
    pub owner: Pubkey,
    /// Entries in use, slots `0..count`
    pub count: u64,
    pub bump: u8,
}

impl UserLocks {
    pub const LEN: usize = 8  // discriminator
        + 32  // registry
        + 32  // owner
        + 8   // count
        + 1   // bump
        + 15; // padding

    /// Bind a freshly created index to its owner
    pub fn bind(&mut self, registry: Pubkey, owner: Pubkey, bump: u8) {
        if self.owner == Pubkey::default() {
            self.registry = registry;
            self.owner = owner;
            self.bump = bump;
        }
    }

    pub fn len(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Append `lock` in slot `count` and record the slot on the lock
    pub fn push(
        &mut self,
        user_locks_key: &Pubkey,
        entry: &mut UserLockSlot,
        entry_bump: u8,
        lock: &mut Lock,
    ) -> Result<()> {
        require_keys_eq!(lock.owner, self.owner, LockerError::LockNotIndexed);

        let slot = self.count;
        *entry = UserLockSlot {
            user_locks: *user_locks_key,
            slot,
            lock_id: lock.lock_id,
            bump: entry_bump,
        };
        lock.index_slot = slot;
        self.count = slot.checked_add(1).ok_or(LockerError::Overflow)?;
        Ok(())
    }

    /// Swap-and-pop removal of `lock`, held in `entry`.
    ///
    /// Unless `lock` sits in the last slot, `last` must carry the last entry
    /// and the lock it points at; that lock moves into the freed slot.
    pub fn swap_remove(
        &mut self,
        user_locks_key: &Pubkey,
        lock: &Lock,
        entry: &mut UserLockSlot,
        last: Option<(&mut UserLockSlot, &mut Lock)>,
    ) -> Result<VacatedSlot> {
        require!(self.count > 0, LockerError::LockNotIndexed);
        require!(
            entry.user_locks == *user_locks_key
                && entry.slot == lock.index_slot
                && entry.lock_id == lock.lock_id,
            LockerError::LockNotIndexed
        );

        let last_slot = self.count - 1;
        if lock.index_slot == last_slot {
            self.count = last_slot;
            return Ok(VacatedSlot::Removed);
        }

        let (last_entry, moved) = last.ok_or(LockerError::LastSlotRequired)?;
        require!(
            last_entry.user_locks == *user_locks_key
                && last_entry.slot == last_slot
                && moved.lock_id == last_entry.lock_id
                && moved.index_slot == last_slot
                && moved.owner == self.owner,
            LockerError::LockNotIndexed
        );

        entry.lock_id = moved.lock_id;
        moved.index_slot = lock.index_slot;
        self.count = last_slot;
        Ok(VacatedSlot::Last)
    }
}

/// Which entry account a removal leaves unused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VacatedSlot {
    /// The removed lock was last; its own entry goes
    Removed,
    /// The last entry was moved down and goes
    Last,
}

/// One entry of an owner's index, at `["user_lock_slot", user_locks, slot]`
#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct UserLockSlot {
    pub user_locks: Pubkey,
    pub slot: u64,
    pub lock_id: u64,
    pub bump: u8,
}

impl UserLockSlot {
    pub const LEN: usize = 8  // discriminator
        + 32  // user_locks
        + 8   // slot
        + 8   // lock_id
        + 1   // bump
        + 7;  // padding
}

/// Add a freshly committed lock to its owner's index
pub fn index_lock<'info>(
    registry: Pubkey,
    user_locks: &mut Account<'info, UserLocks>,
    user_locks_bump: u8,
    entry: &mut Account<'info, UserLockSlot>,
    entry_bump: u8,
    lock: &mut Lock,
) -> Result<()> {
    let user_locks_key = user_locks.key();
    user_locks.bind(registry, lock.owner, user_locks_bump);
    user_locks.push(&user_locks_key, entry, entry_bump, lock)
}

/// Drop `lock` from its owner's index and close the entry left unused.
/// `lock` is the record as it was before this instruction touched it.
pub fn unindex_lock<'info>(
    registry: &Pubkey,
    lock: &Lock,
    user_locks: &mut Account<'info, UserLocks>,
    entry: &mut Account<'info, UserLockSlot>,
    mut last_entry: Option<&mut Account<'info, UserLockSlot>>,
    moved_lock: Option<&mut Account<'info, Lock>>,
    rent_receiver: &AccountInfo<'info>,
) -> Result<()> {
    if let Some(moved_lock) = moved_lock.as_ref() {
        require_keys_eq!(
            moved_lock.key(),
            moved_lock.address(registry)?,
            LockerError::LockNotIndexed
        );
    }

    let user_locks_key = user_locks.key();
    let last = match (last_entry.as_deref_mut(), moved_lock) {
        (Some(last_entry), Some(moved_lock)) => Some((&mut **last_entry, &mut **moved_lock)),
        _ => None,
    };
    let vacated = user_locks.swap_remove(&user_locks_key, lock, entry, last)?;

    match (vacated, last_entry) {
        (VacatedSlot::Last, Some(last_entry)) => last_entry.close(rent_receiver.clone()),
        _ => entry.close(rent_receiver.clone()),
    }
}
