use anchor_lang::prelude::*;
use crate::constants::*;
use crate::errors::LockerError;

/// How a lock came to exist in this registry
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum LockOrigin {
    /// Created by `lock` / `lock_with_signed_fee`
    #[default]
    Direct,
    /// Inserted by the migration bridge
    Migrated,
}

/// Caller-chosen configuration for a new lock
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct LockParams {
    /// Receives fees accrued before the lock and anything that does not fit back
    pub dust_recipient: Pubkey,
    pub owner: Pubkey,
    /// May trigger fee collection, nothing else. Default key for none.
    pub additional_collector: Pubkey,
    /// Destination of net collected fees
    pub collect_address: Pubkey,
    /// Unix seconds, or `ETERNAL_LOCK`
    pub unlock_date: i64,
    pub country_code: u16,
}

impl LockParams {
    pub fn validate(&self) -> Result<()> {
        require_keys_neq!(self.owner, Pubkey::default(), LockerError::NullAddress);
        require_keys_neq!(self.collect_address, Pubkey::default(), LockerError::NullAddress);
        require_keys_neq!(self.dust_recipient, Pubkey::default(), LockerError::NullAddress);
        validate_unlock_date(self.unlock_date)
    }
}

/// Reject unlock dates that were obviously given in milliseconds
pub fn validate_unlock_date(unlock_date: i64) -> Result<()> {
    require!(
        unlock_date == ETERNAL_LOCK || unlock_date < MAX_UNLOCK_DATE_SECONDS,
        LockerError::TimestampMagnitude
    );
    Ok(())
}

/// What the registry physically holds for a lock
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CustodyRef {
    pub position_manager: Pubkey,
    pub nft_mint: Pubkey,
    pub pool: Pubkey,
}

/// A custodied position NFT, its time gate and its fee configuration
#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct Lock {
    /// Sequential id inside the registry
    pub lock_id: u64,

    /// Position manager program that minted the NFT
    pub position_manager: Pubkey,

    /// Position NFT mint (the asset id)
    pub nft_mint: Pubkey,

    /// Pool the position belongs to
    pub pool: Pubkey,

    pub owner: Pubkey,

    /// Set while an ownership transfer is pending
    pub pending_owner: Pubkey,

    pub additional_collector: Pubkey,

    pub dust_recipient: Pubkey,

    pub collect_address: Pubkey,

    /// Unix seconds; `ETERNAL_LOCK` disables withdrawal forever
    pub unlock_date: i64,

    pub country_code: u16,

    /// Collect fee captured when the lock was created
    pub collect_fee_bps: u16,

    pub origin: LockOrigin,

    /// Slot of this lock in its owner's index
    pub index_slot: u64,

    /// PDA bump seed (survives the tombstone)
    pub bump: u8,
}

impl Lock {
    pub const LEN: usize = 8  // discriminator
        + 8   // lock_id
        + 32  // position_manager
        + 32  // nft_mint
        + 32  // pool
        + 32  // owner
        + 32  // pending_owner
        + 32  // additional_collector
        + 32  // dust_recipient
        + 32  // collect_address
        + 8   // unlock_date
        + 2   // country_code
        + 2   // collect_fee_bps
        + 1   // origin
        + 8   // index_slot
        + 1   // bump
        + 16; // padding

    /// Build a fresh lock record
    pub fn open(
        lock_id: u64,
        custody: CustodyRef,
        params: &LockParams,
        collect_fee_bps: u16,
        origin: LockOrigin,
        bump: u8,
    ) -> Self {
        Self {
            lock_id,
            position_manager: custody.position_manager,
            nft_mint: custody.nft_mint,
            pool: custody.pool,
            owner: params.owner,
            pending_owner: Pubkey::default(),
            additional_collector: params.additional_collector,
            dust_recipient: params.dust_recipient,
            collect_address: params.collect_address,
            unlock_date: params.unlock_date,
            country_code: params.country_code,
            collect_fee_bps,
            origin,
            index_slot: 0,
            bump,
        }
    }

    /// Copy of this lock as it will live in the destination registry
    pub fn migrated(&self, lock_id: u64, bump: u8) -> Self {
        Self {
            lock_id,
            pending_owner: Pubkey::default(),
            origin: LockOrigin::Migrated,
            bump,
            ..self.clone()
        }
    }

    /// PDA of this record under `registry`, from its stored bump
    pub fn address(&self, registry: &Pubkey) -> Result<Pubkey> {
        Pubkey::create_program_address(
            &[LOCK_SEED, registry.as_ref(), &self.lock_id.to_le_bytes(), &[self.bump]],
            &crate::ID,
        )
        .map_err(|_| error!(LockerError::LockNotIndexed))
    }

    pub fn custody(&self) -> CustodyRef {
        CustodyRef {
            position_manager: self.position_manager,
            nft_mint: self.nft_mint,
            pool: self.pool,
        }
    }

    pub fn is_active(&self) -> bool {
        self.owner != Pubkey::default()
    }

    pub fn is_eternal(&self) -> bool {
        self.unlock_date == ETERNAL_LOCK
    }

    pub fn assert_owner(&self, caller: &Pubkey) -> Result<()> {
        require!(self.is_active(), LockerError::LockNotActive);
        require_keys_eq!(*caller, self.owner, LockerError::Unauthorized);
        Ok(())
    }

    /// Owner, additional collector, or the registry's auto collector.
    ///
    /// The auto collector names its own fee receiver as `recipient`; its caps
    /// bound what that receiver gets and the rest goes to `collect_address`.
    pub fn assert_can_collect(
        &self,
        caller: &Pubkey,
        recipient: &Pubkey,
        auto_collect_account: &Pubkey,
    ) -> Result<()> {
        require!(self.is_active(), LockerError::LockNotActive);
        require_keys_neq!(*recipient, Pubkey::default(), LockerError::NullAddress);
        let is_collector = *caller == self.owner
            || (self.additional_collector != Pubkey::default()
                && *caller == self.additional_collector);
        let is_auto_collect =
            *auto_collect_account != Pubkey::default() && *caller == *auto_collect_account;
        require!(is_collector || is_auto_collect, LockerError::Unauthorized);
        Ok(())
    }

    pub fn assert_unlocked(&self, now: i64) -> Result<()> {
        require!(now >= self.unlock_date, LockerError::TooEarly);
        Ok(())
    }

    pub fn assert_withdrawable(&self, now: i64) -> Result<()> {
        require!(!self.is_eternal(), LockerError::EternallyLocked);
        self.assert_unlocked(now)
    }

    /// Push the unlock date further out
    pub fn relock(&mut self, unlock_date: i64) -> Result<()> {
        require!(unlock_date > self.unlock_date, LockerError::InvalidDate);
        validate_unlock_date(unlock_date)?;
        self.unlock_date = unlock_date;
        Ok(())
    }

    pub fn begin_ownership_transfer(&mut self, new_owner: Pubkey) -> Result<()> {
        require_keys_neq!(new_owner, Pubkey::default(), LockerError::NullAddress);
        require_keys_neq!(new_owner, self.owner, LockerError::SameOwner);
        self.pending_owner = new_owner;
        Ok(())
    }

    /// Complete a pending transfer. Returns the previous owner.
    pub fn accept_ownership(&mut self, caller: &Pubkey, collect_address: Pubkey) -> Result<Pubkey> {
        require!(self.is_active(), LockerError::LockNotActive);
        require!(
            self.pending_owner != Pubkey::default() && *caller == self.pending_owner,
            LockerError::Unauthorized
        );
        require_keys_neq!(collect_address, Pubkey::default(), LockerError::NullAddress);

        let old_owner = self.owner;
        self.owner = self.pending_owner;
        self.pending_owner = Pubkey::default();
        self.collect_address = collect_address;
        Ok(old_owner)
    }

    /// Zero the record after its terminal transition
    pub fn tombstone(&mut self) {
        *self = Self {
            bump: self.bump,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(owner: Pubkey, unlock_date: i64) -> LockParams {
        LockParams {
            dust_recipient: owner,
            owner,
            additional_collector: Pubkey::default(),
            collect_address: owner,
            unlock_date,
            country_code: 20,
        }
    }

    fn custody() -> CustodyRef {
        CustodyRef {
            position_manager: Pubkey::new_unique(),
            nft_mint: Pubkey::new_unique(),
            pool: Pubkey::new_unique(),
        }
    }

    fn open_lock(owner: Pubkey, unlock_date: i64) -> Lock {
        Lock::open(0, custody(), &params(owner, unlock_date), 200, LockOrigin::Direct, 254)
    }

    #[test]
    fn millisecond_unlock_dates_are_rejected() {
        let owner = Pubkey::new_unique();
        assert!(params(owner, 1_700_000_000).validate().is_ok());
        assert!(params(owner, ETERNAL_LOCK).validate().is_ok());
        assert_eq!(
            params(owner, 1_700_000_000_000).validate().unwrap_err(),
            LockerError::TimestampMagnitude.into()
        );
        assert_eq!(
            params(owner, MAX_UNLOCK_DATE_SECONDS).validate().unwrap_err(),
            LockerError::TimestampMagnitude.into()
        );
    }

    #[test]
    fn empty_owner_or_collect_address_is_rejected() {
        let mut p = params(Pubkey::new_unique(), 100);
        p.collect_address = Pubkey::default();
        assert_eq!(p.validate().unwrap_err(), LockerError::NullAddress.into());

        let mut p = params(Pubkey::new_unique(), 100);
        p.owner = Pubkey::default();
        assert_eq!(p.validate().unwrap_err(), LockerError::NullAddress.into());
    }

    #[test]
    fn withdrawal_is_time_gated() {
        let lock = open_lock(Pubkey::new_unique(), 1_000);
        assert_eq!(lock.assert_withdrawable(999).unwrap_err(), LockerError::TooEarly.into());
        assert_eq!(lock.assert_unlocked(999).unwrap_err(), LockerError::TooEarly.into());
        assert!(lock.assert_withdrawable(1_000).is_ok());
        assert!(lock.assert_unlocked(5_000).is_ok());
    }

    #[test]
    fn eternal_lock_is_never_withdrawable() {
        let mut lock = open_lock(Pubkey::new_unique(), 1_000);
        lock.relock(ETERNAL_LOCK).unwrap();
        assert!(lock.is_eternal());
        for now in [0, 1_000, 9_999_999_999, i64::MAX - 1, i64::MAX] {
            assert_eq!(
                lock.assert_withdrawable(now).unwrap_err(),
                LockerError::EternallyLocked.into()
            );
        }
    }

    #[test]
    fn relock_requires_a_strictly_later_date() {
        let mut lock = open_lock(Pubkey::new_unique(), 1_000);
        assert_eq!(lock.relock(1_000).unwrap_err(), LockerError::InvalidDate.into());
        assert_eq!(lock.relock(999).unwrap_err(), LockerError::InvalidDate.into());
        assert_eq!(
            lock.relock(1_000_000_000_000).unwrap_err(),
            LockerError::TimestampMagnitude.into()
        );
        lock.relock(1_001).unwrap();
        assert_eq!(lock.unlock_date, 1_001);

        lock.relock(ETERNAL_LOCK).unwrap();
        assert_eq!(lock.relock(ETERNAL_LOCK).unwrap_err(), LockerError::InvalidDate.into());
    }

    #[test]
    fn only_owner_passes_owner_check() {
        let owner = Pubkey::new_unique();
        let lock = open_lock(owner, 1_000);
        assert!(lock.assert_owner(&owner).is_ok());
        assert_eq!(
            lock.assert_owner(&Pubkey::new_unique()).unwrap_err(),
            LockerError::Unauthorized.into()
        );
    }

    #[test]
    fn collect_permissions() {
        let owner = Pubkey::new_unique();
        let collector = Pubkey::new_unique();
        let bot = Pubkey::new_unique();
        let stranger = Pubkey::new_unique();
        let mut lock = open_lock(owner, 1_000);
        lock.collect_address = Pubkey::new_unique();

        assert!(lock.assert_can_collect(&owner, &stranger, &bot).is_ok());
        assert_eq!(
            lock.assert_can_collect(&collector, &collector, &bot).unwrap_err(),
            LockerError::Unauthorized.into()
        );

        lock.additional_collector = collector;
        assert!(lock.assert_can_collect(&collector, &collector, &bot).is_ok());

        assert_eq!(
            lock.assert_can_collect(&stranger, &lock.collect_address.clone(), &bot).unwrap_err(),
            LockerError::Unauthorized.into()
        );
    }

    #[test]
    fn auto_collector_pays_its_own_receiver() {
        let owner = Pubkey::new_unique();
        let bot = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        let mut lock = open_lock(owner, 1_000);
        lock.collect_address = Pubkey::new_unique();

        // bob is neither the owner nor the collect address
        assert!(lock.assert_can_collect(&bot, &bob, &bot).is_ok());
        assert!(lock.assert_can_collect(&bot, &lock.collect_address.clone(), &bot).is_ok());

        // while bob holds the role, the old bot is just a stranger
        assert_eq!(
            lock.assert_can_collect(&bot, &bob, &bob).unwrap_err(),
            LockerError::Unauthorized.into()
        );

        // an unset role matches nobody
        assert_eq!(
            lock.assert_can_collect(&Pubkey::default(), &bob, &Pubkey::default()).unwrap_err(),
            LockerError::Unauthorized.into()
        );
    }

    #[test]
    fn two_step_ownership_transfer() {
        let owner = Pubkey::new_unique();
        let new_owner = Pubkey::new_unique();
        let new_collect = Pubkey::new_unique();
        let mut lock = open_lock(owner, 1_000);

        assert_eq!(lock.begin_ownership_transfer(owner).unwrap_err(), LockerError::SameOwner.into());
        lock.begin_ownership_transfer(new_owner).unwrap();
        assert_eq!(lock.owner, owner);
        assert_eq!(lock.pending_owner, new_owner);

        assert_eq!(
            lock.accept_ownership(&Pubkey::new_unique(), new_collect).unwrap_err(),
            LockerError::Unauthorized.into()
        );
        assert_eq!(lock.owner, owner);

        let old = lock.accept_ownership(&new_owner, new_collect).unwrap();
        assert_eq!(old, owner);
        assert_eq!(lock.owner, new_owner);
        assert_eq!(lock.pending_owner, Pubkey::default());
        assert_eq!(lock.collect_address, new_collect);

        // nothing pending any more
        assert_eq!(
            lock.accept_ownership(&new_owner, new_collect).unwrap_err(),
            LockerError::Unauthorized.into()
        );
    }

    #[test]
    fn tombstone_zeroes_everything_but_the_bump() {
        let mut lock = open_lock(Pubkey::new_unique(), 1_000);
        lock.lock_id = 7;
        lock.tombstone();
        assert_eq!(lock, Lock { bump: 254, ..Lock::default() });
        assert!(!lock.is_active());
        assert_eq!(
            lock.assert_owner(&Pubkey::default()).unwrap_err(),
            LockerError::LockNotActive.into()
        );
    }

    #[test]
    fn migrated_copy_keeps_the_economic_state() {
        let mut source = open_lock(Pubkey::new_unique(), 1_000);
        source.additional_collector = Pubkey::new_unique();
        source.pending_owner = Pubkey::new_unique();
        source.lock_id = 3;

        let copy = source.migrated(0, 250);
        assert_eq!(copy.lock_id, 0);
        assert_eq!(copy.bump, 250);
        assert_eq!(copy.origin, LockOrigin::Migrated);
        assert_eq!(copy.pending_owner, Pubkey::default());
        assert_eq!(copy.custody(), source.custody());
        assert_eq!(copy.owner, source.owner);
        assert_eq!(copy.additional_collector, source.additional_collector);
        assert_eq!(copy.collect_address, source.collect_address);
        assert_eq!(copy.dust_recipient, source.dust_recipient);
        assert_eq!(copy.unlock_date, source.unlock_date);
        assert_eq!(copy.country_code, source.country_code);
        assert_eq!(copy.collect_fee_bps, source.collect_fee_bps);
    }

    #[test]
    fn address_matches_the_seeded_pda() {
        let registry = Pubkey::new_unique();
        let (expected, bump) = Pubkey::find_program_address(
            &[LOCK_SEED, registry.as_ref(), &7u64.to_le_bytes()],
            &crate::ID,
        );
        let lock = Lock { lock_id: 7, bump, ..Lock::default() };
        assert_eq!(lock.address(&registry).unwrap(), expected);

        let other = Lock { lock_id: 8, bump, ..Lock::default() };
        assert_ne!(other.address(&registry).ok(), Some(expected));
    }
}
