use anchor_lang::prelude::*;
use crate::clmm::PositionSnapshot;
use crate::state::LockOrigin;

// ============================================================
// LOCK LIFECYCLE EVENTS
// ============================================================

#[event]
pub struct LockCreated {
    pub lock_id: u64,
    pub position_manager: Pubkey,
    pub nft_mint: Pubkey,
    pub owner: Pubkey,
    pub additional_collector: Pubkey,
    pub collect_address: Pubkey,
    pub unlock_date: i64,
    pub country_code: u16,
    pub collect_fee_bps: u16,
    pub pool: Pubkey,
    /// Position before any entry fee was taken
    pub snapshot: PositionSnapshot,
    pub origin: LockOrigin,
}

#[event]
pub struct LockWithdrawn {
    pub lock_id: u64,
    pub owner: Pubkey,
    pub recipient: Pubkey,
}

#[event]
pub struct LockRelocked {
    pub lock_id: u64,
    pub unlock_date: i64,
}

#[event]
pub struct LockOwnershipTransferStarted {
    pub lock_id: u64,
    pub current_owner: Pubkey,
    pub pending_owner: Pubkey,
}

#[event]
pub struct LockOwnershipTransferred {
    pub lock_id: u64,
    pub old_owner: Pubkey,
    pub new_owner: Pubkey,
    pub collect_address: Pubkey,
}

#[event]
pub struct AdditionalCollectorSet {
    pub lock_id: u64,
    pub additional_collector: Pubkey,
}

#[event]
pub struct LockMigrated {
    pub source_registry: Pubkey,
    pub source_lock_id: u64,
    pub destination_registry: Pubkey,
    pub destination_lock_id: u64,
    pub owner: Pubkey,
}

// ============================================================
// FEE AND LIQUIDITY EVENTS
// ============================================================

#[event]
pub struct EntryFeesCharged {
    pub lock_id: u64,
    pub lp_fee_bps: u16,
    pub liquidity_removed: u128,
    pub flat_fee: u64,
    pub flat_fee_token: Pubkey,
    pub flat_fee_exempt: bool,
}

#[event]
pub struct FeesCollected {
    pub lock_id: u64,
    pub recipient: Pubkey,
    pub amount_0: u64,
    pub amount_1: u64,
    pub overflow_0: u64,
    pub overflow_1: u64,
    pub fee_0: u64,
    pub fee_1: u64,
}

#[event]
pub struct LiquidityDecreased {
    pub lock_id: u64,
    pub liquidity: u128,
    pub amount_0: u64,
    pub amount_1: u64,
}

#[event]
pub struct LiquidityIncreased {
    pub lock_id: u64,
    pub depositor: Pubkey,
    pub amount_0: u64,
    pub amount_1: u64,
}

#[event]
pub struct SignedFeeUsed {
    pub fee_resolver: Pubkey,
    pub ref_code: [u8; 32],
    pub user: Pubkey,
    pub use_primary_signer: bool,
    pub lp_fee_bps: u16,
    pub collect_fee_bps: u16,
}

// ============================================================
// ADMIN EVENTS
// ============================================================

#[event]
pub struct RegistryInitialized {
    pub registry: Pubkey,
    pub registry_id: u64,
    pub authority: Pubkey,
}

#[event]
pub struct FeeParamsUpdated {
    pub registry: Pubkey,
    pub auto_collect_account: Pubkey,
    pub lp_fee_receiver: Pubkey,
    pub collect_fee_receiver: Pubkey,
}

#[event]
pub struct CountryListUpdated {
    pub registry: Pubkey,
    pub country_list: Pubkey,
}

#[event]
pub struct RegistryAuthorityTransferred {
    pub registry: Pubkey,
    pub old_authority: Pubkey,
    pub new_authority: Pubkey,
}

#[event]
pub struct FeeTierUpdated {
    pub registry: Pubkey,
    pub name: String,
    pub lp_fee_bps: u16,
    pub collect_fee_bps: u16,
    pub flat_fee: u64,
    pub flat_fee_token: Pubkey,
}

#[event]
pub struct FeeTierRemoved {
    pub registry: Pubkey,
    pub name: String,
}

#[event]
pub struct PositionManagerAllowed {
    pub registry: Pubkey,
    pub program: Pubkey,
    pub allowed: bool,
}

#[event]
pub struct MigrationBridgeCreated {
    pub bridge: Pubkey,
    pub source_registry: Pubkey,
    pub destination_registry: Pubkey,
}

#[event]
pub struct MigratorSet {
    pub registry: Pubkey,
    pub migrator: Option<Pubkey>,
}

#[event]
pub struct MigrateInSet {
    pub registry: Pubkey,
    pub migrate_in: Option<Pubkey>,
}

#[event]
pub struct FeeResolverUpdated {
    pub fee_resolver: Pubkey,
    pub primary_signer: [u8; 20],
    pub secondary_signer: [u8; 20],
    pub secondary_min_lp_fee_bps: u16,
    pub secondary_min_collect_fee_bps: u16,
}

#[event]
pub struct FeeAccountWhitelisted {
    pub fee_resolver: Pubkey,
    pub wallet: Pubkey,
    pub exempt: bool,
}

#[event]
pub struct AdminRefund {
    pub registry: Pubkey,
    pub source: Pubkey,
    pub destination: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
}
