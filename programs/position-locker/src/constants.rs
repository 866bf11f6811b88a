// ============================================================
// BASIS POINTS
// ============================================================

/// Basis points denominator (100% = 10000 BPS)
pub const BPS_DENOMINATOR: u16 = 10000;

// ============================================================
// TIME
// ============================================================

/// Unlock date that never arrives. Withdrawal is disabled for good.
pub const ETERNAL_LOCK: i64 = i64::MAX;

/// Unlock dates at or above this are assumed to be milliseconds, not seconds
pub const MAX_UNLOCK_DATE_SECONDS: i64 = 10_000_000_000;

// ============================================================
// FEE TIERS
// ============================================================

/// Longest fee tier name (bounded by the PDA seed length)
pub const MAX_FEE_NAME_LEN: usize = 32;

/// Tier created together with every registry
pub const DEFAULT_FEE_NAME: &str = "DEFAULT";

/// DEFAULT tier: share of liquidity skimmed on entry (0.5%)
pub const DEFAULT_LP_FEE_BPS: u16 = 50;

/// DEFAULT tier: share of every fee collection (2%)
pub const DEFAULT_COLLECT_FEE_BPS: u16 = 200;

// ============================================================
// SIGNED FEE OVERRIDES
// ============================================================

/// Domain separator hashed in front of every signed fee message
pub const FEE_MESSAGE_PREFIX: &[u8; 32] = b"position-locker/fee-override/v01";

/// Personal-message prefix applied by wallet `signMessage` over a 32 byte hash
pub const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

// ============================================================
// PDA SEEDS
// ============================================================

pub const REGISTRY_SEED: &[u8] = b"registry";
pub const LOCK_SEED: &[u8] = b"lock";
pub const USER_LOCKS_SEED: &[u8] = b"user_locks";
pub const USER_LOCK_SLOT_SEED: &[u8] = b"user_lock_slot";
pub const CUSTODY_SEED: &[u8] = b"custody";
pub const TRANSIT_SEED: &[u8] = b"transit";
pub const FEE_TIER_SEED: &[u8] = b"fee_tier";
pub const POSITION_MANAGER_SEED: &[u8] = b"position_manager";
pub const FEE_RESOLVER_SEED: &[u8] = b"fee_resolver";
pub const NONCE_SEED: &[u8] = b"nonce";
pub const FEE_EXEMPT_SEED: &[u8] = b"fee_exempt";
pub const BRIDGE_SEED: &[u8] = b"bridge";
