use anchor_lang::prelude::*;

#[error_code]
pub enum LockerError {
    // ============================================================
    // AUTHORIZATION ERRORS
    // ============================================================

    #[msg("Unauthorized")]
    Unauthorized,

    #[msg("Call did not originate from the configured registry")]
    UnrecognizedCaller,

    #[msg("Signed fee is bound to a different user")]
    CallerMismatch,

    // ============================================================
    // TEMPORAL ERRORS
    // ============================================================

    #[msg("Lock has not reached its unlock date")]
    TooEarly,

    #[msg("Lock is eternal and can never be withdrawn")]
    EternallyLocked,

    #[msg("New unlock date must be later than the current one")]
    InvalidDate,

    #[msg("Unlock date looks like milliseconds, expected seconds")]
    TimestampMagnitude,

    // ============================================================
    // VALIDATION ERRORS
    // ============================================================

    #[msg("Country code rejected by the country list")]
    JurisdictionRejected,

    #[msg("Token account holds a custodied position")]
    CustodiedAsset,

    #[msg("Address must not be empty")]
    NullAddress,

    #[msg("Fee exceeds 100%")]
    InvalidFee,

    #[msg("Fee tier name is empty or too long")]
    InvalidFeeName,

    #[msg("Invalid account data or discriminator mismatch")]
    InvalidAccountData,

    #[msg("Pool does not match the locked position")]
    InvalidPool,

    #[msg("Position does not match the locked NFT")]
    InvalidPosition,

    #[msg("Token mint does not match the pool")]
    InvalidMint,

    #[msg("Pool has paused this operation")]
    PoolPaused,

    #[msg("Position manager accounts are missing")]
    MissingPositionAccounts,

    #[msg("Lock is not active")]
    LockNotActive,

    #[msg("Lock does not belong to this index")]
    LockNotIndexed,

    #[msg("Last index slot and its lock are required")]
    LastSlotRequired,

    #[msg("Index out of range")]
    IndexOutOfRange,

    #[msg("Flat fee accounts are missing or do not match the tier")]
    InvalidFlatFeeAccounts,

    #[msg("Country list program not configured")]
    CountryListNotConfigured,

    #[msg("Position manager is not whitelisted")]
    PositionManagerNotAllowed,

    #[msg("Amount is zero")]
    ZeroAmount,

    #[msg("Slippage tolerance exceeded")]
    SlippageExceeded,

    #[msg("Collect address token accounts are required above the cap")]
    CollectAccountsRequired,

    // ============================================================
    // CONFIGURATION ERRORS
    // ============================================================

    #[msg("Migrator not configured")]
    MigratorNotConfigured,

    // ============================================================
    // CRYPTOGRAPHIC ERRORS
    // ============================================================

    #[msg("Reference code already used")]
    ReplayedNonce,

    #[msg("Fee below the secondary signer threshold")]
    BelowThreshold,

    #[msg("Malformed signature")]
    InvalidSignature,

    #[msg("Recovered signer does not match the selected signer")]
    SignerMismatch,

    // ============================================================
    // REDUNDANT ACTION ERRORS
    // ============================================================

    #[msg("New owner is the current owner")]
    SameOwner,

    // ============================================================
    // MATH ERRORS
    // ============================================================

    #[msg("Arithmetic overflow")]
    Overflow,
}
