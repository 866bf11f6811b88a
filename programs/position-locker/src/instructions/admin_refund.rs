use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::state::*;
use crate::constants::*;
use crate::errors::LockerError;
use crate::events::AdminRefund;
use crate::utils::transfer_from_vault;

/// Return tokens mis-sent to a registry-owned account
#[derive(Accounts)]
pub struct AdminRefundTokens<'info> {
    #[account(address = registry.authority @ LockerError::Unauthorized)]
    pub authority: Signer<'info>,

    #[account(
        seeds = [REGISTRY_SEED, &registry.registry_id.to_le_bytes()],
        bump = registry.bump
    )]
    pub registry: Box<Account<'info, Registry>>,

    #[account(mint::token_program = token_program)]
    pub mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        token::mint = mint,
        token::authority = registry,
        token::token_program = token_program
    )]
    pub source: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = mint,
        token::token_program = token_program
    )]
    pub destination: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// Custody vault address of `mint` under `registry`
pub fn custody_vault_address(registry: &Pubkey, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[CUSTODY_SEED, registry.as_ref(), mint.as_ref()], &crate::ID).0
}

pub fn is_custody_vault(registry: &Pubkey, mint: &Pubkey, account: &Pubkey) -> bool {
    custody_vault_address(registry, mint) == *account
}

pub fn handler(ctx: Context<AdminRefundTokens>, amount: u64) -> Result<()> {
    let accounts = &ctx.accounts;
    let registry_key = accounts.registry.key();
    let source_key = accounts.source.key();

    require!(amount > 0, LockerError::ZeroAmount);
    require!(
        !is_custody_vault(&registry_key, &accounts.mint.key(), &source_key),
        LockerError::CustodiedAsset
    );

    let registry_id = accounts.registry.registry_id.to_le_bytes();
    let registry_bump = [accounts.registry.bump];
    let registry_seeds: &[&[u8]] = &[REGISTRY_SEED, &registry_id, &registry_bump];
    let signer_seeds = &[registry_seeds];

    transfer_from_vault(
        &accounts.source.to_account_info(),
        &accounts.destination.to_account_info(),
        &accounts.mint,
        &accounts.registry.to_account_info(),
        &accounts.token_program.to_account_info(),
        signer_seeds,
        amount,
    )?;

    msg!("Refunded {} of {} from {}", amount, accounts.mint.key(), source_key);

    emit!(AdminRefund {
        registry: registry_key,
        source: source_key,
        destination: accounts.destination.key(),
        mint: accounts.mint.key(),
        amount,
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custody_vaults_are_recognised_per_registry_and_mint() {
        let registry = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let vault = custody_vault_address(&registry, &mint);

        assert!(is_custody_vault(&registry, &mint, &vault));
        assert!(!is_custody_vault(&Pubkey::new_unique(), &mint, &vault));
        assert!(!is_custody_vault(&registry, &Pubkey::new_unique(), &vault));
    }

    #[test]
    fn transit_vaults_are_refundable() {
        let registry = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let (transit, _) = Pubkey::find_program_address(
            &[TRANSIT_SEED, registry.as_ref(), mint.as_ref()],
            &crate::ID,
        );
        assert!(!is_custody_vault(&registry, &mint, &transit));
    }
}
