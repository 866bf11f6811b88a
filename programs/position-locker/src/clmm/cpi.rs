//! Signed CPI into the position manager
//!
//! The registry PDA owns every custodied position NFT and signs as
//! `nft_owner`. Proceeds land in registry transit vaults and amounts are
//! measured from the vault balances, never trusted from the callee.
//!
//! Position accounts travel in `remaining_accounts`, in this order:
//!
//! | # | Account |
//! |---|---------|
//! | 0 | personal_position (writable) |
//! | 1 | pool_state (writable) |
//! | 2 | protocol_position (writable) |
//! | 3 | token_vault_0 (writable) |
//! | 4 | token_vault_1 (writable) |
//! | 5 | tick_array_lower (writable) |
//! | 6 | tick_array_upper (writable) |
//! | 7 | memo_program |
//! | 8 | tick_array_bitmap_extension (writable) |

use anchor_lang::prelude::*;
use anchor_lang::solana_program::{instruction::Instruction, program::invoke_signed};
use anchor_spl::token_interface::{Mint, TokenAccount};
use crate::errors::LockerError;
use super::accounts::*;
use super::instructions::*;

/// Token amounts moved by one CPI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenAmounts {
    pub amount_0: u64,
    pub amount_1: u64,
}

impl TokenAmounts {
    /// No cap on either token
    pub const UNCAPPED: Self = Self {
        amount_0: u64::MAX,
        amount_1: u64::MAX,
    };

    pub fn is_zero(&self) -> bool {
        self.amount_0 == 0 && self.amount_1 == 0
    }
}

/// Position manager accounts taken from `remaining_accounts`
#[derive(Clone)]
pub struct ClmmPositionAccounts<'info> {
    pub personal_position: AccountInfo<'info>,
    pub pool_state: AccountInfo<'info>,
    pub protocol_position: AccountInfo<'info>,
    pub token_vault_0: AccountInfo<'info>,
    pub token_vault_1: AccountInfo<'info>,
    pub tick_array_lower: AccountInfo<'info>,
    pub tick_array_upper: AccountInfo<'info>,
    pub memo_program: AccountInfo<'info>,
    pub tick_array_bitmap_extension: AccountInfo<'info>,
}

impl<'info> ClmmPositionAccounts<'info> {
    pub const COUNT: usize = 9;

    pub fn from_remaining(remaining: &[AccountInfo<'info>]) -> Result<Self> {
        require!(remaining.len() >= Self::COUNT, LockerError::MissingPositionAccounts);
        Ok(Self {
            personal_position: remaining[0].clone(),
            pool_state: remaining[1].clone(),
            protocol_position: remaining[2].clone(),
            token_vault_0: remaining[3].clone(),
            token_vault_1: remaining[4].clone(),
            tick_array_lower: remaining[5].clone(),
            tick_array_upper: remaining[6].clone(),
            memo_program: remaining[7].clone(),
            tick_array_bitmap_extension: remaining[8].clone(),
        })
    }

    /// Read and cross-check the position and its pool.
    ///
    /// Both accounts must be owned by `position_manager`, the position must be
    /// the PDA of `nft_mint`, and the pool vaults must be the ones passed in.
    pub fn load(
        &self,
        position_manager: &Pubkey,
        nft_mint: &Pubkey,
    ) -> Result<(PersonalPositionState, PoolState)> {
        require_keys_eq!(*self.personal_position.owner, *position_manager, LockerError::InvalidPosition);
        require_keys_eq!(*self.pool_state.owner, *position_manager, LockerError::InvalidPool);

        let (expected_position, _) = derive_personal_position_pda(nft_mint, position_manager);
        require_keys_eq!(self.personal_position.key(), expected_position, LockerError::InvalidPosition);

        let position = {
            let data = self.personal_position.try_borrow_data()?;
            PersonalPositionState::try_deserialize(&data)?
        };
        require_keys_eq!(position.nft_mint, *nft_mint, LockerError::InvalidPosition);
        require_keys_eq!(position.pool_id, self.pool_state.key(), LockerError::InvalidPool);

        let pool = {
            let data = self.pool_state.try_borrow_data()?;
            PoolState::try_deserialize(&data)?
        };
        require_keys_eq!(pool.token_vault_0, self.token_vault_0.key(), LockerError::InvalidPool);
        require_keys_eq!(pool.token_vault_1, self.token_vault_1.key(), LockerError::InvalidPool);

        Ok((position, pool))
    }
}

/// Require the caller-supplied mints to be the pool's pair, in order
pub fn check_pool_mints(pool: &PoolState, mint_0: &Pubkey, mint_1: &Pubkey) -> Result<()> {
    require_keys_eq!(pool.token_mint_0, *mint_0, LockerError::InvalidMint);
    require_keys_eq!(pool.token_mint_1, *mint_1, LockerError::InvalidMint);
    Ok(())
}

/// Everything needed to act on one custodied position
pub struct PositionCpi<'info> {
    pub program: AccountInfo<'info>,
    /// Registry PDA
    pub nft_owner: AccountInfo<'info>,
    /// Custody vault holding the NFT
    pub nft_account: AccountInfo<'info>,
    pub token_program: AccountInfo<'info>,
    pub token_program_2022: AccountInfo<'info>,
    pub vault_0_mint: AccountInfo<'info>,
    pub vault_1_mint: AccountInfo<'info>,
    pub position: ClmmPositionAccounts<'info>,
}

impl<'info> PositionCpi<'info> {
    /// `decrease_liquidity_v2` paying out to the given token accounts
    pub fn decrease_liquidity(
        &self,
        args: &DecreaseLiquidityV2Args,
        recipient_0: &AccountInfo<'info>,
        recipient_1: &AccountInfo<'info>,
        signer_seeds: &[&[&[u8]]],
    ) -> Result<()> {
        let p = &self.position;
        let account_metas = vec![
            readonly_signer(self.nft_owner.key()),
            readonly(self.nft_account.key()),
            writable(p.personal_position.key()),
            writable(p.pool_state.key()),
            writable(p.protocol_position.key()),
            writable(p.token_vault_0.key()),
            writable(p.token_vault_1.key()),
            writable(p.tick_array_lower.key()),
            writable(p.tick_array_upper.key()),
            writable(recipient_0.key()),
            writable(recipient_1.key()),
            readonly(self.token_program.key()),
            readonly(self.token_program_2022.key()),
            readonly(p.memo_program.key()),
            readonly(self.vault_0_mint.key()),
            readonly(self.vault_1_mint.key()),
            writable(p.tick_array_bitmap_extension.key()),
        ];

        let ix = Instruction {
            program_id: self.program.key(),
            accounts: account_metas,
            data: args.to_instruction_data()?,
        };

        let account_infos = vec![
            self.nft_owner.clone(),
            self.nft_account.clone(),
            p.personal_position.clone(),
            p.pool_state.clone(),
            p.protocol_position.clone(),
            p.token_vault_0.clone(),
            p.token_vault_1.clone(),
            p.tick_array_lower.clone(),
            p.tick_array_upper.clone(),
            recipient_0.clone(),
            recipient_1.clone(),
            self.token_program.clone(),
            self.token_program_2022.clone(),
            p.memo_program.clone(),
            self.vault_0_mint.clone(),
            self.vault_1_mint.clone(),
            p.tick_array_bitmap_extension.clone(),
            self.program.clone(),
        ];

        invoke_signed(&ix, &account_infos, signer_seeds)?;
        Ok(())
    }

    /// Harvest pending fees without touching liquidity
    pub fn collect_fees(
        &self,
        recipient_0: &AccountInfo<'info>,
        recipient_1: &AccountInfo<'info>,
        signer_seeds: &[&[&[u8]]],
    ) -> Result<()> {
        self.decrease_liquidity(
            &DecreaseLiquidityV2Args::collect_fees_only(),
            recipient_0,
            recipient_1,
            signer_seeds,
        )
    }

    /// `increase_liquidity_v2` funded from the given token accounts, which the
    /// NFT owner (the registry) must control
    pub fn increase_liquidity(
        &self,
        args: &IncreaseLiquidityV2Args,
        token_account_0: &AccountInfo<'info>,
        token_account_1: &AccountInfo<'info>,
        signer_seeds: &[&[&[u8]]],
    ) -> Result<()> {
        let p = &self.position;
        let account_metas = vec![
            readonly_signer(self.nft_owner.key()),
            readonly(self.nft_account.key()),
            writable(p.pool_state.key()),
            writable(p.protocol_position.key()),
            writable(p.personal_position.key()),
            writable(p.tick_array_lower.key()),
            writable(p.tick_array_upper.key()),
            writable(token_account_0.key()),
            writable(token_account_1.key()),
            writable(p.token_vault_0.key()),
            writable(p.token_vault_1.key()),
            readonly(self.token_program.key()),
            readonly(self.token_program_2022.key()),
            readonly(self.vault_0_mint.key()),
            readonly(self.vault_1_mint.key()),
            writable(p.tick_array_bitmap_extension.key()),
        ];

        let ix = Instruction {
            program_id: self.program.key(),
            accounts: account_metas,
            data: args.to_instruction_data()?,
        };

        let account_infos = vec![
            self.nft_owner.clone(),
            self.nft_account.clone(),
            p.pool_state.clone(),
            p.protocol_position.clone(),
            p.personal_position.clone(),
            p.tick_array_lower.clone(),
            p.tick_array_upper.clone(),
            token_account_0.clone(),
            token_account_1.clone(),
            p.token_vault_0.clone(),
            p.token_vault_1.clone(),
            self.token_program.clone(),
            self.token_program_2022.clone(),
            self.vault_0_mint.clone(),
            self.vault_1_mint.clone(),
            p.tick_array_bitmap_extension.clone(),
            self.program.clone(),
        ];

        invoke_signed(&ix, &account_infos, signer_seeds)?;
        Ok(())
    }

    /// Decrease into registry vaults and return what actually arrived
    pub fn decrease_into(
        &self,
        args: &DecreaseLiquidityV2Args,
        vault_0: &mut InterfaceAccount<'info, TokenAccount>,
        vault_1: &mut InterfaceAccount<'info, TokenAccount>,
        signer_seeds: &[&[&[u8]]],
    ) -> Result<TokenAmounts> {
        let before_0 = vault_0.amount;
        let before_1 = vault_1.amount;

        self.decrease_liquidity(
            args,
            &vault_0.to_account_info(),
            &vault_1.to_account_info(),
            signer_seeds,
        )?;

        vault_0.reload()?;
        vault_1.reload()?;
        Ok(TokenAmounts {
            amount_0: vault_0.amount.checked_sub(before_0).ok_or(LockerError::Overflow)?,
            amount_1: vault_1.amount.checked_sub(before_1).ok_or(LockerError::Overflow)?,
        })
    }

    /// Increase from registry vaults and return what was consumed
    pub fn increase_from(
        &self,
        args: &IncreaseLiquidityV2Args,
        vault_0: &mut InterfaceAccount<'info, TokenAccount>,
        vault_1: &mut InterfaceAccount<'info, TokenAccount>,
        signer_seeds: &[&[&[u8]]],
    ) -> Result<TokenAmounts> {
        let before_0 = vault_0.amount;
        let before_1 = vault_1.amount;

        self.increase_liquidity(
            args,
            &vault_0.to_account_info(),
            &vault_1.to_account_info(),
            signer_seeds,
        )?;

        vault_0.reload()?;
        vault_1.reload()?;
        Ok(TokenAmounts {
            amount_0: before_0.checked_sub(vault_0.amount).ok_or(LockerError::Overflow)?,
            amount_1: before_1.checked_sub(vault_1.amount).ok_or(LockerError::Overflow)?,
        })
    }
}

/// Shorthand for building a `PositionCpi` from typed accounts
pub fn position_cpi<'info>(
    program: AccountInfo<'info>,
    registry: AccountInfo<'info>,
    custody_vault: AccountInfo<'info>,
    token_program: AccountInfo<'info>,
    token_program_2022: AccountInfo<'info>,
    mint_0: &InterfaceAccount<'info, Mint>,
    mint_1: &InterfaceAccount<'info, Mint>,
    position: ClmmPositionAccounts<'info>,
) -> PositionCpi<'info> {
    PositionCpi {
        program,
        nft_owner: registry,
        nft_account: custody_vault,
        token_program,
        token_program_2022,
        vault_0_mint: mint_0.to_account_info(),
        vault_1_mint: mint_1.to_account_info(),
        position,
    }
}
