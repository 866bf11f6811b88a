//! Lock records and owner indexes through create, transfer, withdraw and
//! migration, driven through the same state calls the handlers make.

use anchor_lang::prelude::Pubkey;
use position_locker::constants::ETERNAL_LOCK;
use position_locker::errors::LockerError;
use position_locker::instructions::admin_refund::custody_vault_address;
use position_locker::instructions::migrate::check_bridge;
use position_locker::state::*;

/// One owner's index as the program stores it: header, entry accounts and
/// the lock records the entries name
struct Index {
    key: Pubkey,
    header: UserLocks,
    entries: Vec<UserLockSlot>,
}

impl Index {
    fn new(registry: Pubkey, owner: Pubkey) -> Self {
        let mut header = UserLocks::default();
        header.bind(registry, owner, 255);
        Self {
            key: Pubkey::new_unique(),
            header,
            entries: Vec::new(),
        }
    }

    fn add(&mut self, lock: &mut Lock) {
        let mut entry = UserLockSlot::default();
        self.header.push(&self.key, &mut entry, 254, lock).unwrap();
        self.entries.push(entry);
    }

    /// Drop `lock`, moving the last lock in `locks` down when needed
    fn drop_lock(&mut self, lock: &Lock, locks: &mut [Lock]) -> VacatedSlot {
        let slot = lock.index_slot as usize;
        let last = self.entries.len() - 1;
        let vacated = if slot == last {
            self.header
                .swap_remove(&self.key, lock, &mut self.entries[slot], None)
                .unwrap()
        } else {
            let moved_at = locks
                .iter()
                .position(|l| l.index_slot as usize == last && l.owner == self.header.owner)
                .unwrap();
            let (head, tail) = self.entries.split_at_mut(last);
            self.header
                .swap_remove(&self.key, lock, &mut head[slot], Some((&mut tail[0], &mut locks[moved_at])))
                .unwrap()
        };
        self.entries.pop();
        vacated
    }

    fn ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.entries.iter().map(|e| e.lock_id).collect();
        ids.sort_unstable();
        ids
    }
}

fn params(owner: Pubkey) -> LockParams {
    LockParams {
        dust_recipient: Pubkey::new_unique(),
        owner,
        additional_collector: Pubkey::default(),
        collect_address: Pubkey::new_unique(),
        unlock_date: 1_700_000_000,
        country_code: 0,
    }
}

fn open(registry: &mut Registry, owner: Pubkey) -> Lock {
    let custody = CustodyRef {
        position_manager: Pubkey::new_unique(),
        nft_mint: Pubkey::new_unique(),
        pool: Pubkey::new_unique(),
    };
    let lock_id = registry.next_lock_id().unwrap();
    Lock::open(lock_id, custody, &params(owner), 200, LockOrigin::Direct, 253)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn withdrawing_drops_the_lock_from_the_owner_count() {
        let registry_key = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mut registry = Registry::default();
        let mut index = Index::new(registry_key, owner);

        let mut locks: Vec<Lock> = (0..3).map(|_| open(&mut registry, owner)).collect();
        for lock in locks.iter_mut() {
            index.add(lock);
        }
        assert_eq!(index.header.len(), 3);

        // Withdraw lock 0 after its unlock date
        let withdrawn = locks[0].clone();
        withdrawn.assert_withdrawable(1_700_000_001).unwrap();
        assert_eq!(index.drop_lock(&withdrawn, &mut locks), VacatedSlot::Last);
        locks[0].tombstone();

        assert_eq!(index.header.len(), 2);
        assert_eq!(index.ids(), vec![1, 2]);
        assert_eq!(locks[2].index_slot, 0);
        assert!(!locks[0].is_active());
        assert_eq!(registry.locks_length, 3);
    }

    #[test]
    fn eternal_locks_stay_indexed() {
        let mut registry = Registry::default();
        let owner = Pubkey::new_unique();
        let mut lock = open(&mut registry, owner);
        lock.unlock_date = ETERNAL_LOCK;
        assert_eq!(
            lock.assert_withdrawable(i64::MAX).unwrap_err(),
            LockerError::EternallyLocked.into()
        );
    }

    #[test]
    fn ownership_transfer_moves_the_lock_between_indexes() {
        let registry_key = Pubkey::new_unique();
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        let mut registry = Registry::default();
        let mut alice_index = Index::new(registry_key, alice);
        let mut bob_index = Index::new(registry_key, bob);

        let mut locks: Vec<Lock> = (0..2).map(|_| open(&mut registry, alice)).collect();
        for lock in locks.iter_mut() {
            alice_index.add(lock);
        }

        locks[1].begin_ownership_transfer(bob).unwrap();
        let before = locks[1].clone();
        let mut record = before.clone();
        let new_collect = Pubkey::new_unique();
        assert_eq!(record.accept_ownership(&bob, new_collect).unwrap(), alice);

        assert_eq!(alice_index.drop_lock(&before, &mut locks), VacatedSlot::Removed);
        bob_index.add(&mut record);
        locks[1] = record;

        assert_eq!(alice_index.ids(), vec![0]);
        assert_eq!(bob_index.ids(), vec![1]);
        assert_eq!(locks[1].owner, bob);
        assert_eq!(locks[1].collect_address, new_collect);
        assert_eq!(locks[1].index_slot, 0);
    }

    #[test]
    fn migration_rebuilds_the_lock_in_the_destination_registry() {
        let source_key = Pubkey::new_unique();
        let destination_key = Pubkey::new_unique();
        let bridge_key = Pubkey::new_unique();
        let owner = Pubkey::new_unique();

        let mut source = Registry { migrator: Some(bridge_key), ..Registry::default() };
        let mut destination = Registry {
            migrate_in: Some(bridge_key),
            locks_length: 41,
            ..Registry::default()
        };
        let bridge = MigrationBridge {
            source_registry: source_key,
            destination_registry: destination_key,
            bump: 250,
        };
        check_bridge(&source, &source_key, &destination, &destination_key, &bridge, &bridge_key)
            .unwrap();

        let mut source_index = Index::new(source_key, owner);
        let mut destination_index = Index::new(destination_key, owner);
        let mut locks = vec![open(&mut source, owner)];
        source_index.add(&mut locks[0]);

        let source_lock = locks[0].clone();
        let destination_lock_id = destination.next_lock_id().unwrap();
        let mut migrated = source_lock.migrated(destination_lock_id, 249);
        destination_index.add(&mut migrated);
        source_index.drop_lock(&source_lock, &mut locks);
        locks[0].tombstone();

        assert_eq!(migrated.lock_id, 41);
        assert_eq!(migrated.origin, LockOrigin::Migrated);
        assert_eq!(migrated.collect_fee_bps, source_lock.collect_fee_bps);
        assert_eq!(migrated.unlock_date, source_lock.unlock_date);
        assert_eq!(migrated.owner, owner);
        assert!(source_index.header.is_empty());
        assert_eq!(destination_index.ids(), vec![41]);
        assert!(!locks[0].is_active());

        assert_ne!(
            custody_vault_address(&source_key, &source_lock.nft_mint),
            custody_vault_address(&destination_key, &migrated.nft_mint)
        );
    }

    #[test]
    fn migration_needs_both_ends_wired() {
        let source_key = Pubkey::new_unique();
        let destination_key = Pubkey::new_unique();
        let bridge_key = Pubkey::new_unique();
        let bridge = MigrationBridge {
            source_registry: source_key,
            destination_registry: destination_key,
            bump: 250,
        };
        let source = Registry { migrator: Some(bridge_key), ..Registry::default() };
        let unwired = Registry::default();
        assert_eq!(
            check_bridge(&source, &source_key, &unwired, &destination_key, &bridge, &bridge_key)
                .unwrap_err(),
            LockerError::UnrecognizedCaller.into()
        );
    }
}
