pub mod registry;
pub mod lock;
pub mod user_locks;
pub mod fee_tier;
pub mod fee_resolver;
pub mod migration_bridge;

pub use registry::*;
pub use lock::*;
pub use user_locks::*;
pub use fee_tier::*;
pub use fee_resolver::*;
pub use migration_bridge::*;

#[cfg(test)]
mod lifecycle_tests {
    use anchor_lang::prelude::*;
    use super::*;
    use crate::constants::*;
    use crate::errors::LockerError;
    use crate::utils::liquidity_share;

    const NOW: i64 = 1_750_000_000;

    /// State transitions of `lock` followed by `withdraw`, without the CPIs
    #[test]
    fn lock_then_withdraw_after_the_unlock_date() {
        let owner = Pubkey::new_unique();
        let registry_key = Pubkey::new_unique();
        let mut registry = Registry::default();

        let mut tier = FeeTier::default();
        tier.set(100, 0, 1_500_000_000, Pubkey::default()).unwrap();
        let fee = tier.resolved();
        assert!(fee.charges_flat_fee() && fee.is_native_flat_fee());

        let params = LockParams {
            dust_recipient: owner,
            owner,
            additional_collector: Pubkey::default(),
            collect_address: owner,
            unlock_date: NOW + 100,
            country_code: 20,
        };
        params.validate().unwrap();

        let custody = CustodyRef {
            position_manager: Pubkey::new_unique(),
            nft_mint: Pubkey::new_unique(),
            pool: Pubkey::new_unique(),
        };
        let lock_id = registry.next_lock_id().unwrap();
        let mut lock = Lock::open(lock_id, custody, &params, fee.collect_fee_bps, LockOrigin::Direct, 253);
        let index_key = Pubkey::new_unique();
        let mut index = UserLocks::default();
        let mut entry = UserLockSlot::default();
        index.bind(registry_key, owner, 252);
        index.push(&index_key, &mut entry, 251, &mut lock).unwrap();
        assert_eq!(index.len(), 1);

        assert_eq!(lock_id, 0);
        assert_eq!(registry.locks_length, 1);
        assert_eq!(lock.country_code, 20);

        // 1% of the position goes to the LP fee receiver
        let liquidity: u128 = 5_000_000;
        let skimmed = liquidity_share(liquidity, fee.lp_fee_bps).unwrap();
        assert_eq!(skimmed, 50_000);
        assert_eq!(liquidity - skimmed, 4_950_000);

        assert_eq!(lock.assert_withdrawable(NOW + 99).unwrap_err(), LockerError::TooEarly.into());

        lock.assert_owner(&owner).unwrap();
        lock.assert_withdrawable(NOW + 100).unwrap();
        let before = lock.clone();
        assert_eq!(
            index.swap_remove(&index_key, &before, &mut entry, None).unwrap(),
            VacatedSlot::Removed
        );
        lock.tombstone();

        assert!(index.is_empty());
        assert!(!lock.is_active());
        assert_eq!(lock, Lock { bump: 253, ..Lock::default() });
        assert_eq!(lock.assert_owner(&owner).unwrap_err(), LockerError::LockNotActive.into());

        // ids are never reused
        assert_eq!(registry.next_lock_id().unwrap(), 1);
    }

    #[test]
    fn migrated_lock_lands_under_the_next_destination_id() {
        let owner = Pubkey::new_unique();
        let bridge_key = Pubkey::new_unique();
        let source_key = Pubkey::new_unique();
        let destination_key = Pubkey::new_unique();

        let mut source = Registry { migrator: Some(bridge_key), ..Registry::default() };
        let mut destination = Registry {
            migrate_in: Some(bridge_key),
            locks_length: 41,
            ..Registry::default()
        };
        let bridge = MigrationBridge {
            source_registry: source_key,
            destination_registry: destination_key,
            bump: 255,
        };

        let params = LockParams {
            dust_recipient: Pubkey::new_unique(),
            owner,
            additional_collector: Pubkey::new_unique(),
            collect_address: Pubkey::new_unique(),
            unlock_date: ETERNAL_LOCK,
            country_code: 7,
        };
        let custody = CustodyRef {
            position_manager: Pubkey::new_unique(),
            nft_mint: Pubkey::new_unique(),
            pool: Pubkey::new_unique(),
        };
        let source_id = source.next_lock_id().unwrap();
        let mut source_lock = Lock::open(source_id, custody, &params, 250, LockOrigin::Direct, 200);

        source.check_migrator(&bridge_key).unwrap();
        bridge.assert_endpoints(&source_key, &destination_key).unwrap();
        destination.check_migrate_in(&bridge_key).unwrap();

        let destination_id = destination.next_lock_id().unwrap();
        let migrated = source_lock.migrated(destination_id, 199);
        source_lock.tombstone();

        assert_eq!(destination_id, 41);
        assert_eq!(migrated.custody(), custody);
        assert_eq!(migrated.owner, owner);
        assert_eq!(migrated.unlock_date, ETERNAL_LOCK);
        assert_eq!(migrated.collect_fee_bps, 250);
        assert_eq!(migrated.origin, LockOrigin::Migrated);
        assert!(!source_lock.is_active());
    }
}
