pub mod initialize_registry;
pub mod admin;
pub mod fee_resolver;
pub mod lock;
pub mod collect;
pub mod decrease_liquidity;
pub mod increase_liquidity;
pub mod withdraw;
pub mod relock;
pub mod ownership;
pub mod migrate;
pub mod admin_refund;
pub mod views;

// Glob re-exports for Anchor compatibility
// Note: "ambiguous glob re-exports" warning for `handler` is benign -
// lib.rs uses fully qualified paths (e.g., instructions::collect::handler)
#[allow(ambiguous_glob_reexports)]
pub use initialize_registry::*;
pub use admin::*;
pub use fee_resolver::*;
pub use lock::*;
pub use collect::*;
pub use decrease_liquidity::*;
pub use increase_liquidity::*;
pub use withdraw::*;
pub use relock::*;
pub use ownership::*;
pub use migrate::*;
pub use admin_refund::*;
pub use views::*;
