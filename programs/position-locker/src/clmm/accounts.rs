//! Position manager account readers
//!
//! Only the fields the locker needs are decoded. Offsets are relative to the
//! end of the 8 byte Anchor discriminator.
//!
//! | Account | Fields read |
//! |---------|-------------|
//! | PoolState | mints, vaults, tick spacing, price, status |
//! | PersonalPositionState | nft mint, pool, range, liquidity, fees owed |

use anchor_lang::prelude::*;
use crate::errors::LockerError;

/// Discriminator length for position manager accounts
pub const CLMM_ACCOUNT_DISCRIMINATOR_LEN: usize = 8;

// ============================================================
// DESERIALIZATION HELPERS
// ============================================================

/// Byte-offset deserialization of foreign accounts
pub trait ClmmAccountDeserialize: Sized {
    /// Bytes needed after the discriminator
    const BODY_LEN: usize;

    fn discriminator() -> [u8; 8];

    fn read_body(body: &[u8]) -> Result<Self>;

    /// Deserialize full account data (discriminator included)
    fn try_deserialize(data: &[u8]) -> Result<Self> {
        require!(
            data.len() >= CLMM_ACCOUNT_DISCRIMINATOR_LEN + Self::BODY_LEN,
            LockerError::InvalidAccountData
        );
        require!(
            data[..CLMM_ACCOUNT_DISCRIMINATOR_LEN] == Self::discriminator(),
            LockerError::InvalidAccountData
        );
        Self::read_body(&data[CLMM_ACCOUNT_DISCRIMINATOR_LEN..])
    }
}

fn read<const N: usize>(body: &[u8], offset: usize) -> Result<[u8; N]> {
    body.get(offset..offset + N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| error!(LockerError::InvalidAccountData))
}

fn read_pubkey(body: &[u8], offset: usize) -> Result<Pubkey> {
    Ok(Pubkey::new_from_array(read::<32>(body, offset)?))
}

// ============================================================
// POOL STATE
// ============================================================

/// Subset of the pool account
#[derive(Clone, Debug)]
pub struct PoolState {
    pub amm_config: Pubkey,
    pub token_mint_0: Pubkey,
    pub token_mint_1: Pubkey,
    pub token_vault_0: Pubkey,
    pub token_vault_1: Pubkey,
    pub mint_decimals_0: u8,
    pub mint_decimals_1: u8,
    pub tick_spacing: u16,
    pub liquidity: u128,
    /// Q64.64
    pub sqrt_price_x64: u128,
    pub tick_current: i32,
    /// bit0 open/increase, bit1 decrease, bit2 collect fee, bit3 rewards, bit4 swap
    pub status: u8,
}

impl PoolState {
    pub fn can_increase_liquidity(&self) -> bool {
        self.status & 0b00001 == 0
    }

    pub fn can_decrease_liquidity(&self) -> bool {
        self.status & 0b00010 == 0
    }

    pub fn can_collect_fee(&self) -> bool {
        self.status & 0b00100 == 0
    }

    /// Fees come out through a zero-liquidity decrease, so both bits matter
    pub fn can_harvest(&self) -> bool {
        self.can_decrease_liquidity() && self.can_collect_fee()
    }
}

impl ClmmAccountDeserialize for PoolState {
    const BODY_LEN: usize = 382;

    fn discriminator() -> [u8; 8] {
        [247, 237, 227, 245, 215, 195, 222, 70]
    }

    fn read_body(body: &[u8]) -> Result<Self> {
        Ok(Self {
            amm_config: read_pubkey(body, 1)?,
            token_mint_0: read_pubkey(body, 65)?,
            token_mint_1: read_pubkey(body, 97)?,
            token_vault_0: read_pubkey(body, 129)?,
            token_vault_1: read_pubkey(body, 161)?,
            mint_decimals_0: read::<1>(body, 225)?[0],
            mint_decimals_1: read::<1>(body, 226)?[0],
            tick_spacing: u16::from_le_bytes(read(body, 227)?),
            liquidity: u128::from_le_bytes(read(body, 229)?),
            sqrt_price_x64: u128::from_le_bytes(read(body, 245)?),
            tick_current: i32::from_le_bytes(read(body, 261)?),
            status: read::<1>(body, 381)?[0],
        })
    }
}

// ============================================================
// PERSONAL POSITION STATE
// ============================================================

/// The position behind a position NFT
#[derive(Clone, Debug)]
pub struct PersonalPositionState {
    pub nft_mint: Pubkey,
    pub pool_id: Pubkey,
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    pub liquidity: u128,
    pub fee_growth_inside_0_last_x64: u128,
    pub fee_growth_inside_1_last_x64: u128,
    pub token_fees_owed_0: u64,
    pub token_fees_owed_1: u64,
}

impl PersonalPositionState {
    pub fn is_full_range(&self, tick_spacing: u16) -> bool {
        let (lower, upper) = super::full_range_ticks(tick_spacing);
        self.tick_lower_index == lower && self.tick_upper_index == upper
    }
}

impl ClmmAccountDeserialize for PersonalPositionState {
    const BODY_LEN: usize = 137;

    fn discriminator() -> [u8; 8] {
        // sha256("account:PersonalPositionState")[..8]
        [70, 111, 150, 126, 230, 15, 25, 117]
    }

    fn read_body(body: &[u8]) -> Result<Self> {
        Ok(Self {
            nft_mint: read_pubkey(body, 1)?,
            pool_id: read_pubkey(body, 33)?,
            tick_lower_index: i32::from_le_bytes(read(body, 65)?),
            tick_upper_index: i32::from_le_bytes(read(body, 69)?),
            liquidity: u128::from_le_bytes(read(body, 73)?),
            fee_growth_inside_0_last_x64: u128::from_le_bytes(read(body, 89)?),
            fee_growth_inside_1_last_x64: u128::from_le_bytes(read(body, 105)?),
            token_fees_owed_0: u64::from_le_bytes(read(body, 121)?),
            token_fees_owed_1: u64::from_le_bytes(read(body, 129)?),
        })
    }
}

/// Position state recorded in lock events
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PositionSnapshot {
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    pub liquidity: u128,
    pub fee_growth_inside_0_last_x64: u128,
    pub fee_growth_inside_1_last_x64: u128,
    pub tokens_owed_0: u64,
    pub tokens_owed_1: u64,
}

impl From<&PersonalPositionState> for PositionSnapshot {
    fn from(position: &PersonalPositionState) -> Self {
        Self {
            tick_lower_index: position.tick_lower_index,
            tick_upper_index: position.tick_upper_index,
            liquidity: position.liquidity,
            fee_growth_inside_0_last_x64: position.fee_growth_inside_0_last_x64,
            fee_growth_inside_1_last_x64: position.fee_growth_inside_1_last_x64,
            tokens_owed_0: position.token_fees_owed_0,
            tokens_owed_1: position.token_fees_owed_1,
        }
    }
}

// ============================================================
// PDA DERIVATION
// ============================================================

pub mod pda_seeds {
    pub const POSITION_SEED: &[u8] = b"position";
}

/// Derive the PersonalPositionState PDA of a position NFT
pub fn derive_personal_position_pda(nft_mint: &Pubkey, position_manager: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[pda_seeds::POSITION_SEED, nft_mint.as_ref()], position_manager)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position_bytes(nft_mint: Pubkey, pool: Pubkey) -> Vec<u8> {
        let mut data = PersonalPositionState::discriminator().to_vec();
        let mut body = vec![0u8; 281 - 8];
        body[0] = 254;
        body[1..33].copy_from_slice(nft_mint.as_ref());
        body[33..65].copy_from_slice(pool.as_ref());
        body[65..69].copy_from_slice(&(-443580i32).to_le_bytes());
        body[69..73].copy_from_slice(&443580i32.to_le_bytes());
        body[73..89].copy_from_slice(&1_000_000u128.to_le_bytes());
        body[121..129].copy_from_slice(&11u64.to_le_bytes());
        body[129..137].copy_from_slice(&22u64.to_le_bytes());
        data.extend(body);
        data
    }

    #[test]
    fn reads_personal_position_fields() {
        let nft_mint = Pubkey::new_unique();
        let pool = Pubkey::new_unique();
        let position =
            PersonalPositionState::try_deserialize(&position_bytes(nft_mint, pool)).unwrap();
        assert_eq!(position.nft_mint, nft_mint);
        assert_eq!(position.pool_id, pool);
        assert_eq!(position.tick_lower_index, -443580);
        assert_eq!(position.tick_upper_index, 443580);
        assert_eq!(position.liquidity, 1_000_000);
        assert_eq!(position.token_fees_owed_0, 11);
        assert_eq!(position.token_fees_owed_1, 22);
        assert!(position.is_full_range(60));
        assert!(!position.is_full_range(10));

        let snapshot = PositionSnapshot::from(&position);
        assert_eq!(snapshot.liquidity, 1_000_000);
        assert_eq!((snapshot.tokens_owed_0, snapshot.tokens_owed_1), (11, 22));
    }

    #[test]
    fn rejects_wrong_discriminator_and_short_data() {
        let mut data = position_bytes(Pubkey::new_unique(), Pubkey::new_unique());
        data[0] ^= 1;
        assert_eq!(
            PersonalPositionState::try_deserialize(&data).unwrap_err(),
            LockerError::InvalidAccountData.into()
        );
        assert_eq!(
            PersonalPositionState::try_deserialize(&[0u8; 40]).unwrap_err(),
            LockerError::InvalidAccountData.into()
        );
    }

    #[test]
    fn reads_pool_fields() {
        let mint_0 = Pubkey::new_unique();
        let vault_1 = Pubkey::new_unique();
        let mut data = PoolState::discriminator().to_vec();
        let mut body = vec![0u8; 1544 - 8];
        body[65..97].copy_from_slice(mint_0.as_ref());
        body[161..193].copy_from_slice(vault_1.as_ref());
        body[227..229].copy_from_slice(&60u16.to_le_bytes());
        body[381] = 0b00100;
        data.extend(body);

        let pool = PoolState::try_deserialize(&data).unwrap();
        assert_eq!(pool.token_mint_0, mint_0);
        assert_eq!(pool.token_vault_1, vault_1);
        assert_eq!(pool.tick_spacing, 60);
        assert!(!pool.can_collect_fee());
        assert!(pool.can_decrease_liquidity());
        assert!(!pool.can_harvest());
        assert!(pool.can_increase_liquidity());
    }

    #[test]
    fn status_bits_gate_each_operation() {
        let pool = |status: u8| PoolState {
            amm_config: Pubkey::default(),
            token_mint_0: Pubkey::default(),
            token_mint_1: Pubkey::default(),
            token_vault_0: Pubkey::default(),
            token_vault_1: Pubkey::default(),
            mint_decimals_0: 6,
            mint_decimals_1: 9,
            tick_spacing: 60,
            liquidity: 0,
            sqrt_price_x64: 0,
            tick_current: 0,
            status,
        };
        assert!(pool(0).can_harvest() && pool(0).can_increase_liquidity());
        assert!(!pool(0b00001).can_increase_liquidity());
        assert!(pool(0b00001).can_harvest());
        assert!(!pool(0b00010).can_harvest());
        // swaps and rewards paused leave the locker alone
        assert!(pool(0b11000).can_harvest() && pool(0b11000).can_increase_liquidity());
    }
}
