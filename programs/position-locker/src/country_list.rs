//! Country list oracle
//!
//! An external program answering `is_country_allowed(u16) -> bool` through
//! return data. Its state account (if any) is passed straight through.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    instruction::{AccountMeta, Instruction},
    program::{get_return_data, invoke},
};
use crate::errors::LockerError;

/// sha256("global:is_country_allowed")[..8]
pub const IS_COUNTRY_ALLOWED_DISCRIMINATOR: [u8; 8] = [113, 87, 72, 163, 229, 60, 103, 226];

pub fn is_country_allowed_data(country_code: u16) -> Vec<u8> {
    let mut data = IS_COUNTRY_ALLOWED_DISCRIMINATOR.to_vec();
    data.extend_from_slice(&country_code.to_le_bytes());
    data
}

/// Decode the oracle's answer. Anything but a single true byte from the
/// configured program is a rejection.
pub fn decode_answer(country_list: &Pubkey, return_data: Option<(Pubkey, Vec<u8>)>) -> bool {
    matches!(
        return_data,
        Some((program_id, data)) if program_id == *country_list && data.first() == Some(&1)
    )
}

/// Ask the configured oracle about `country_code`
pub fn query<'info>(
    country_list: &AccountInfo<'info>,
    country_list_state: Option<&AccountInfo<'info>>,
    country_code: u16,
) -> Result<bool> {
    let mut accounts = Vec::with_capacity(1);
    let mut infos = Vec::with_capacity(2);
    if let Some(state) = country_list_state {
        accounts.push(AccountMeta::new_readonly(state.key(), false));
        infos.push(state.clone());
    }
    infos.push(country_list.clone());

    let ix = Instruction {
        program_id: country_list.key(),
        accounts,
        data: is_country_allowed_data(country_code),
    };
    invoke(&ix, &infos)?;

    Ok(decode_answer(country_list.key, get_return_data()))
}

/// Reject creation unless the oracle allows `country_code`.
///
/// Local and dev clusters without an oracle configured skip the check.
pub fn check_country<'info>(
    configured: &Pubkey,
    country_list: Option<&AccountInfo<'info>>,
    country_list_state: Option<&AccountInfo<'info>>,
    country_code: u16,
) -> Result<()> {
    if *configured == Pubkey::default() {
        #[cfg(any(feature = "localnet", feature = "devnet"))]
        {
            msg!("Country list not configured, skipping check for {}", country_code);
            return Ok(());
        }
        #[cfg(not(any(feature = "localnet", feature = "devnet")))]
        return err!(LockerError::CountryListNotConfigured);
    }

    let country_list = country_list.ok_or(LockerError::CountryListNotConfigured)?;
    require_keys_eq!(country_list.key(), *configured, LockerError::CountryListNotConfigured);
    require!(query(country_list, country_list_state, country_code)?, LockerError::JurisdictionRejected);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_data_is_discriminator_then_code() {
        let data = is_country_allowed_data(20);
        assert_eq!(&data[..8], &IS_COUNTRY_ALLOWED_DISCRIMINATOR);
        assert_eq!(&data[8..], &[20, 0]);
    }

    #[test]
    fn only_a_true_byte_from_the_oracle_allows() {
        let oracle = Pubkey::new_unique();
        assert!(decode_answer(&oracle, Some((oracle, vec![1]))));
        assert!(!decode_answer(&oracle, Some((oracle, vec![0]))));
        assert!(!decode_answer(&oracle, Some((oracle, vec![]))));
        assert!(!decode_answer(&oracle, Some((Pubkey::new_unique(), vec![1]))));
        assert!(!decode_answer(&oracle, None));
    }
}
