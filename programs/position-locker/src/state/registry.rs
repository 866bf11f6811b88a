use anchor_lang::prelude::*;
use crate::errors::LockerError;

/// One locker instance. Several registries (successive versions) can live in
/// the same program; each owns its locks, fee tiers and custody vaults.
#[account]
#[derive(Default, Debug)]
pub struct Registry {
    /// Identifier used in the registry PDA seeds
    pub registry_id: u64,

    /// Admin allowed to change fees, whitelist and migration wiring
    pub authority: Pubkey,

    /// Bot allowed to collect on behalf of owners into its own fee receiver
    pub auto_collect_account: Pubkey,

    /// Receives the liquidity skimmed on entry and flat fees
    pub lp_fee_receiver: Pubkey,

    /// Receives the collect fee share of harvested fees
    pub collect_fee_receiver: Pubkey,

    /// Country list program consulted on lock creation
    pub country_list: Pubkey,

    /// Bridge this registry hands locks to when owners migrate
    pub migrator: Option<Pubkey>,

    /// Bridge allowed to insert fee-free migrated locks into this registry
    pub migrate_in: Option<Pubkey>,

    /// Total locks ever created here. Also the next lock id.
    pub locks_length: u64,

    /// PDA bump seed
    pub bump: u8,
}

impl Registry {
    pub const LEN: usize = 8  // discriminator
        + 8   // registry_id
        + 32  // authority
        + 32  // auto_collect_account
        + 32  // lp_fee_receiver
        + 32  // collect_fee_receiver
        + 32  // country_list
        + 33  // migrator
        + 33  // migrate_in
        + 8   // locks_length
        + 1   // bump
        + 32; // padding

    /// Hand out the next lock id. Ids are dense and never reused.
    pub fn next_lock_id(&mut self) -> Result<u64> {
        let lock_id = self.locks_length;
        self.locks_length = lock_id.checked_add(1).ok_or(LockerError::Overflow)?;
        Ok(lock_id)
    }

    /// The outbound bridge must be wired and must be `bridge`.
    pub fn check_migrator(&self, bridge: &Pubkey) -> Result<()> {
        match self.migrator {
            Some(migrator) if migrator == *bridge => Ok(()),
            _ => err!(LockerError::MigratorNotConfigured),
        }
    }

    /// Only the wired inbound bridge may insert migrated locks.
    pub fn check_migrate_in(&self, bridge: &Pubkey) -> Result<()> {
        match self.migrate_in {
            Some(migrate_in) if migrate_in == *bridge => Ok(()),
            _ => err!(LockerError::UnrecognizedCaller),
        }
    }
}

/// Whitelist entry for a position manager program (the CLMM or one of its forks)
#[account]
#[derive(Default)]
pub struct AllowedPositionManager {
    pub registry: Pubkey,
    pub program: Pubkey,
    pub allowed: bool,
    pub bump: u8,
}

impl AllowedPositionManager {
    pub const LEN: usize = 8  // discriminator
        + 32  // registry
        + 32  // program
        + 1   // allowed
        + 1   // bump
        + 8;  // padding
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_ids_are_dense_from_zero() {
        let mut registry = Registry::default();
        assert_eq!(registry.next_lock_id().unwrap(), 0);
        assert_eq!(registry.next_lock_id().unwrap(), 1);
        assert_eq!(registry.next_lock_id().unwrap(), 2);
        assert_eq!(registry.locks_length, 3);
    }

    #[test]
    fn migrator_must_be_wired_to_the_given_bridge() {
        let bridge = Pubkey::new_unique();
        let mut registry = Registry::default();
        assert_eq!(
            registry.check_migrator(&bridge).unwrap_err(),
            LockerError::MigratorNotConfigured.into()
        );

        registry.migrator = Some(Pubkey::new_unique());
        assert_eq!(
            registry.check_migrator(&bridge).unwrap_err(),
            LockerError::MigratorNotConfigured.into()
        );

        registry.migrator = Some(bridge);
        assert!(registry.check_migrator(&bridge).is_ok());
    }

    #[test]
    fn migrate_in_rejects_other_callers() {
        let bridge = Pubkey::new_unique();
        let mut registry = Registry::default();
        assert_eq!(
            registry.check_migrate_in(&bridge).unwrap_err(),
            LockerError::UnrecognizedCaller.into()
        );
        registry.migrate_in = Some(bridge);
        assert!(registry.check_migrate_in(&bridge).is_ok());
        assert!(registry.check_migrate_in(&Pubkey::new_unique()).is_err());
    }
}
