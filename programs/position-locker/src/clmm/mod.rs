//! Concentrated-liquidity position manager integration (Raydium CLMM and forks)
//!
//! The locker never does liquidity math itself. It reads position and pool
//! state by byte offset and drives the position through CPI while the
//! registry PDA holds the position NFT.
//!
//! ## Key Components
//!
//! - **accounts**: byte-offset readers for `PoolState` / `PersonalPositionState`
//! - **instructions**: discriminators and argument encoding
//! - **cpi**: remaining-account parsing and the signed CPI calls
//!
//! ## Operations used
//!
//! - `decrease_liquidity_v2` with `liquidity = 0` - harvest fees only
//! - `decrease_liquidity_v2` - remove liquidity (entry fee, owner decrease)
//! - `increase_liquidity_v2` - top up a locked position
//!
//! Every position manager is whitelisted per registry, so forks with the same
//! interface are supported under their own program ids.

pub mod accounts;
pub mod instructions;
pub mod cpi;

pub use accounts::*;
pub use instructions::*;
pub use cpi::*;

/// Tick bounds of the position manager
pub mod tick {
    pub const MIN_TICK: i32 = -443636;
    pub const MAX_TICK: i32 = 443636;
    /// Ticks per tick array
    pub const TICK_ARRAY_SIZE: i32 = 60;
}

/// Widest tick range aligned to `tick_spacing`
pub fn full_range_ticks(tick_spacing: u16) -> (i32, i32) {
    let spacing = tick_spacing.max(1) as i32;
    let lower = -(-tick::MIN_TICK / spacing) * spacing;
    let upper = (tick::MAX_TICK / spacing) * spacing;
    (lower, upper)
}
