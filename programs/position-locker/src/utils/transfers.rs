//! Token transfer utilities
//!
//! Every SPL movement uses `transfer_checked` so Token-2022 mints work too.

use anchor_lang::prelude::*;
use anchor_lang::system_program;
use anchor_spl::token_interface::{self, CloseAccount, Mint, TransferChecked};
use crate::errors::LockerError;
use super::fees::CollectSplit;

/// Transfer tokens out of a registry-owned vault using the registry PDA
/// as authority. Zero amounts are skipped.
pub fn transfer_from_vault<'info>(
    vault: &AccountInfo<'info>,
    to: &AccountInfo<'info>,
    mint: &InterfaceAccount<'info, Mint>,
    vault_authority: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
    authority_seeds: &[&[&[u8]]],
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    let cpi_accounts = TransferChecked {
        from: vault.clone(),
        mint: mint.to_account_info(),
        to: to.clone(),
        authority: vault_authority.clone(),
    };
    let cpi_ctx = CpiContext::new_with_signer(token_program.clone(), cpi_accounts, authority_seeds);
    token_interface::transfer_checked(cpi_ctx, amount, mint.decimals)
}

/// Transfer tokens from a signer-owned account
pub fn transfer_from_user<'info>(
    user_token: &AccountInfo<'info>,
    to: &AccountInfo<'info>,
    mint: &InterfaceAccount<'info, Mint>,
    authority: &Signer<'info>,
    token_program: &AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    let cpi_accounts = TransferChecked {
        from: user_token.clone(),
        mint: mint.to_account_info(),
        to: to.clone(),
        authority: authority.to_account_info(),
    };
    let cpi_ctx = CpiContext::new(token_program.clone(), cpi_accounts);
    token_interface::transfer_checked(cpi_ctx, amount, mint.decimals)
}

/// Close an emptied custody vault, returning its rent
pub fn close_vault<'info>(
    vault: &AccountInfo<'info>,
    destination: &AccountInfo<'info>,
    vault_authority: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
    authority_seeds: &[&[&[u8]]],
) -> Result<()> {
    let cpi_accounts = CloseAccount {
        account: vault.clone(),
        destination: destination.clone(),
        authority: vault_authority.clone(),
    };
    let cpi_ctx = CpiContext::new_with_signer(token_program.clone(), cpi_accounts, authority_seeds);
    token_interface::close_account(cpi_ctx)
}

/// Native SOL payment from a signer
pub fn transfer_lamports<'info>(
    from: &Signer<'info>,
    to: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    system_program::transfer(
        CpiContext::new(
            system_program.clone(),
            system_program::Transfer {
                from: from.to_account_info(),
                to: to.clone(),
            },
        ),
        amount,
    )
}

/// Where one token's harvested fees go
pub struct SplitDestinations<'a, 'info> {
    pub recipient: &'a AccountInfo<'info>,
    pub fee_receiver: &'a AccountInfo<'info>,
    /// Required only when part of the split overflows a cap
    pub collect_address: Option<&'a AccountInfo<'info>>,
}

/// Pay a collect split out of a transit vault
pub fn pay_collect_split<'info>(
    transit: &AccountInfo<'info>,
    mint: &InterfaceAccount<'info, Mint>,
    registry: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
    authority_seeds: &[&[&[u8]]],
    split: &CollectSplit,
    to: SplitDestinations<'_, 'info>,
) -> Result<()> {
    transfer_from_vault(transit, to.recipient, mint, registry, token_program, authority_seeds, split.to_recipient)?;
    transfer_from_vault(transit, to.fee_receiver, mint, registry, token_program, authority_seeds, split.fee)?;
    if split.to_collect_address > 0 {
        let collect_address = to.collect_address.ok_or(LockerError::CollectAccountsRequired)?;
        transfer_from_vault(
            transit,
            collect_address,
            mint,
            registry,
            token_program,
            authority_seeds,
            split.to_collect_address,
        )?;
    }
    Ok(())
}
