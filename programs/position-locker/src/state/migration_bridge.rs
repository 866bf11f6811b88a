use anchor_lang::prelude::*;
use crate::errors::LockerError;

/// Capability binding exactly one source registry to one destination registry.
/// It grants nothing by itself: the source must name it as migrator and the
/// destination must name it as its inbound bridge.
#[account]
#[derive(Default, Debug)]
pub struct MigrationBridge {
    pub source_registry: Pubkey,
    pub destination_registry: Pubkey,
    pub bump: u8,
}

impl MigrationBridge {
    pub const LEN: usize = 8  // discriminator
        + 32  // source_registry
        + 32  // destination_registry
        + 1   // bump
        + 8;  // padding

    pub fn assert_endpoints(&self, source: &Pubkey, destination: &Pubkey) -> Result<()> {
        require_keys_eq!(self.source_registry, *source, LockerError::UnrecognizedCaller);
        require_keys_eq!(self.destination_registry, *destination, LockerError::UnrecognizedCaller);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_fixed() {
        let source = Pubkey::new_unique();
        let destination = Pubkey::new_unique();
        let bridge = MigrationBridge {
            source_registry: source,
            destination_registry: destination,
            bump: 255,
        };
        assert!(bridge.assert_endpoints(&source, &destination).is_ok());
        assert_eq!(
            bridge.assert_endpoints(&destination, &source).unwrap_err(),
            LockerError::UnrecognizedCaller.into()
        );
        assert_eq!(
            bridge.assert_endpoints(&source, &Pubkey::new_unique()).unwrap_err(),
            LockerError::UnrecognizedCaller.into()
        );
    }
}
