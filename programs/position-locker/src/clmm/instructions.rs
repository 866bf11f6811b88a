//! Position manager instruction data
//!
//! Discriminators are the first 8 bytes of `sha256("global:<instruction_name>")`.

use anchor_lang::error::ErrorCode;
use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::AccountMeta;

// ============================================================
// INSTRUCTION DISCRIMINATORS
// ============================================================

pub mod discriminators {
    /// open_position_v2
    pub const OPEN_POSITION_V2: [u8; 8] = [77, 184, 74, 214, 112, 86, 241, 199];

    /// increase_liquidity_v2
    pub const INCREASE_LIQUIDITY_V2: [u8; 8] = [133, 29, 89, 223, 69, 238, 176, 10];

    /// decrease_liquidity_v2
    pub const DECREASE_LIQUIDITY_V2: [u8; 8] = [58, 127, 188, 62, 79, 82, 196, 96];
}

fn encode<T: AnchorSerialize>(discriminator: [u8; 8], args: &T) -> Result<Vec<u8>> {
    let mut data = discriminator.to_vec();
    args.serialize(&mut data)
        .map_err(|_| ErrorCode::InstructionDidNotSerialize)?;
    Ok(data)
}

// ============================================================
// OPEN POSITION V2
// ============================================================

/// Arguments for `open_position_v2`. The locker only builds these for the
/// full-range conversion flow, which runs outside the registry.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct OpenPositionV2Args {
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    pub tick_array_lower_start_index: i32,
    pub tick_array_upper_start_index: i32,
    pub liquidity: u128,
    pub amount_0_max: u64,
    pub amount_1_max: u64,
    pub with_metadata: bool,
    pub base_flag: Option<bool>,
}

impl OpenPositionV2Args {
    /// Widest aligned range for `tick_spacing`.
    ///
    /// With `liquidity = 0` the position manager derives liquidity from
    /// `amount_0_max` (`base_flag = Some(true)`) or `amount_1_max` (`Some(false)`).
    pub fn full_range(
        liquidity: u128,
        amount_0_max: u64,
        amount_1_max: u64,
        tick_spacing: u16,
        base_flag: Option<bool>,
    ) -> Self {
        let (tick_lower, tick_upper) = super::full_range_ticks(tick_spacing);
        Self {
            tick_lower_index: tick_lower,
            tick_upper_index: tick_upper,
            tick_array_lower_start_index: get_tick_array_start_index(tick_lower, tick_spacing),
            tick_array_upper_start_index: get_tick_array_start_index(tick_upper, tick_spacing),
            liquidity,
            amount_0_max,
            amount_1_max,
            with_metadata: true,
            base_flag,
        }
    }

    pub fn to_instruction_data(&self) -> Result<Vec<u8>> {
        encode(discriminators::OPEN_POSITION_V2, self)
    }
}

// ============================================================
// INCREASE LIQUIDITY V2
// ============================================================

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct IncreaseLiquidityV2Args {
    /// Liquidity to add (0 lets `base_flag` pick the limiting side)
    pub liquidity: u128,
    pub amount_0_max: u64,
    pub amount_1_max: u64,
    pub base_flag: Option<bool>,
}

impl IncreaseLiquidityV2Args {
    pub fn to_instruction_data(&self) -> Result<Vec<u8>> {
        encode(discriminators::INCREASE_LIQUIDITY_V2, self)
    }
}

// ============================================================
// DECREASE LIQUIDITY V2
// ============================================================

/// `liquidity = 0` collects fees without touching the position size
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct DecreaseLiquidityV2Args {
    pub liquidity: u128,
    pub amount_0_min: u64,
    pub amount_1_min: u64,
}

impl DecreaseLiquidityV2Args {
    pub fn collect_fees_only() -> Self {
        Self {
            liquidity: 0,
            amount_0_min: 0,
            amount_1_min: 0,
        }
    }

    pub fn remove(liquidity: u128, amount_0_min: u64, amount_1_min: u64) -> Self {
        Self {
            liquidity,
            amount_0_min,
            amount_1_min,
        }
    }

    pub fn to_instruction_data(&self) -> Result<Vec<u8>> {
        encode(discriminators::DECREASE_LIQUIDITY_V2, self)
    }
}

// ============================================================
// HELPERS
// ============================================================

/// Start index of the tick array containing `tick`
pub fn get_tick_array_start_index(tick: i32, tick_spacing: u16) -> i32 {
    let ticks_per_array = super::tick::TICK_ARRAY_SIZE * tick_spacing as i32;
    tick.div_euclid(ticks_per_array) * ticks_per_array
}

pub fn writable(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new(pubkey, false)
}

pub fn readonly(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new_readonly(pubkey, false)
}

pub fn readonly_signer(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new_readonly(pubkey, true)
}
