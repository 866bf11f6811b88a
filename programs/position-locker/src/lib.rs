use anchor_lang::prelude::*;

pub mod clmm;
pub mod constants;
pub mod country_list;
pub mod errors;
pub mod events;
pub mod full_range;
pub mod instructions;
pub mod signature;
pub mod state;
pub mod utils;

use instructions::*;
use signature::EthAddress;
use state::{FeeTier, Lock, LockParams, ResolvedFee, SignedFeeMessage};

declare_id!("Fy2tX9y7LQgMcW42c8fvBJJS1eMad2Ry6GNQyMtCo8nP");

#[program]
pub mod position_locker {
    use super::*;

    // ============ Registry Setup ============

    /// Create a registry and its DEFAULT fee tier
    pub fn initialize_registry(
        ctx: Context<InitializeRegistry>,
        registry_id: u64,
        params: InitializeRegistryParams,
    ) -> Result<()> {
        instructions::initialize_registry::handler(ctx, registry_id, params)
    }

    /// Set the auto collector and the two fee receivers
    pub fn set_fee_params(
        ctx: Context<UpdateRegistry>,
        auto_collect_account: Pubkey,
        lp_fee_receiver: Pubkey,
        collect_fee_receiver: Pubkey,
    ) -> Result<()> {
        instructions::admin::set_fee_params_handler(
            ctx,
            auto_collect_account,
            lp_fee_receiver,
            collect_fee_receiver,
        )
    }

    pub fn set_country_list(ctx: Context<UpdateRegistry>, country_list: Pubkey) -> Result<()> {
        instructions::admin::set_country_list_handler(ctx, country_list)
    }

    pub fn transfer_registry_authority(
        ctx: Context<UpdateRegistry>,
        new_authority: Pubkey,
    ) -> Result<()> {
        instructions::admin::transfer_registry_authority_handler(ctx, new_authority)
    }

    // ============ Fee Tiers ============

    /// Create or overwrite a named fee tier
    pub fn add_or_edit_fee(
        ctx: Context<AddOrEditFee>,
        name: String,
        lp_fee_bps: u16,
        collect_fee_bps: u16,
        flat_fee: u64,
        flat_fee_token: Pubkey,
    ) -> Result<()> {
        instructions::admin::add_or_edit_fee_handler(
            ctx,
            name,
            lp_fee_bps,
            collect_fee_bps,
            flat_fee,
            flat_fee_token,
        )
    }

    /// Delete a fee tier; existing locks keep the rate they captured
    pub fn remove_fee(ctx: Context<RemoveFee>) -> Result<()> {
        instructions::admin::remove_fee_handler(ctx)
    }

    // ============ Position Manager Whitelist ============

    pub fn allow_position_manager(ctx: Context<AllowPositionManager>, allowed: bool) -> Result<()> {
        instructions::admin::allow_position_manager_handler(ctx, allowed)
    }

    /// Fails unless the position manager is whitelisted
    pub fn check_position_manager(ctx: Context<CheckPositionManager>) -> Result<()> {
        instructions::views::check_position_manager_handler(ctx)
    }

    // ============ Signed Fee Resolver ============

    pub fn initialize_fee_resolver(
        ctx: Context<InitializeFeeResolver>,
        params: FeeResolverParams,
    ) -> Result<()> {
        instructions::fee_resolver::initialize_fee_resolver_handler(ctx, params)
    }

    pub fn set_fee_resolver_signers(
        ctx: Context<UpdateFeeResolver>,
        primary_signer: EthAddress,
        secondary_signer: EthAddress,
    ) -> Result<()> {
        instructions::fee_resolver::set_fee_resolver_signers_handler(
            ctx,
            primary_signer,
            secondary_signer,
        )
    }

    /// Floors the secondary signer may not go below
    pub fn set_secondary_thresholds(
        ctx: Context<UpdateFeeResolver>,
        min_lp_fee_bps: u16,
        min_collect_fee_bps: u16,
    ) -> Result<()> {
        instructions::fee_resolver::set_secondary_thresholds_handler(
            ctx,
            min_lp_fee_bps,
            min_collect_fee_bps,
        )
    }

    /// Exempt (or stop exempting) a wallet from flat fees
    pub fn whitelist_fee_account(
        ctx: Context<WhitelistFeeAccount>,
        wallet: Pubkey,
        exempt: bool,
    ) -> Result<()> {
        instructions::fee_resolver::whitelist_fee_account_handler(ctx, wallet, exempt)
    }

    /// Verify and decode a signed fee without consuming its reference code
    pub fn preview_signed_fee(
        ctx: Context<PreviewSignedFee>,
        message: SignedFeeMessage,
    ) -> Result<ResolvedFee> {
        instructions::fee_resolver::preview_signed_fee_handler(ctx, message)
    }

    // ============ Lock Lifecycle ============

    /// Lock a position NFT under a named fee tier
    pub fn lock<'info>(
        ctx: Context<'_, '_, 'info, 'info, CreateLock<'info>>,
        params: LockParams,
        fee_name: String,
    ) -> Result<()> {
        instructions::lock::handler(ctx, params, fee_name)
    }

    /// Lock a position NFT under a signed fee override
    pub fn lock_with_signed_fee<'info>(
        ctx: Context<'_, '_, 'info, 'info, CreateLockWithSignedFee<'info>>,
        params: LockParams,
        message: SignedFeeMessage,
    ) -> Result<()> {
        instructions::lock::signed_fee_handler(ctx, params, message)
    }

    /// Harvest fees, capped per token
    pub fn collect<'info>(
        ctx: Context<'_, '_, 'info, 'info, Collect<'info>>,
        lock_id: u64,
        amount_0_max: u64,
        amount_1_max: u64,
    ) -> Result<()> {
        instructions::collect::handler(ctx, lock_id, amount_0_max, amount_1_max)
    }

    /// Remove liquidity from an unlocked position
    pub fn decrease_liquidity<'info>(
        ctx: Context<'_, '_, 'info, 'info, DecreaseLockedLiquidity<'info>>,
        lock_id: u64,
        params: DecreaseLiquidityParams,
    ) -> Result<()> {
        instructions::decrease_liquidity::handler(ctx, lock_id, params)
    }

    /// Add liquidity to a locked position (anyone may fund it)
    pub fn increase_liquidity<'info>(
        ctx: Context<'_, '_, 'info, 'info, IncreaseLockedLiquidity<'info>>,
        lock_id: u64,
        params: IncreaseLiquidityParams,
    ) -> Result<()> {
        instructions::increase_liquidity::handler(ctx, lock_id, params)
    }

    /// Release the NFT after the unlock date
    pub fn withdraw<'info>(
        ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
        lock_id: u64,
    ) -> Result<()> {
        instructions::withdraw::handler(ctx, lock_id)
    }

    /// Push the unlock date later
    pub fn relock(ctx: Context<UpdateLock>, lock_id: u64, unlock_date: i64) -> Result<()> {
        instructions::relock::relock_handler(ctx, lock_id, unlock_date)
    }

    pub fn set_additional_collector(
        ctx: Context<UpdateLock>,
        lock_id: u64,
        additional_collector: Pubkey,
    ) -> Result<()> {
        instructions::relock::set_additional_collector_handler(ctx, lock_id, additional_collector)
    }

    // ============ Lock Ownership ============

    pub fn transfer_lock_ownership(
        ctx: Context<UpdateLock>,
        lock_id: u64,
        new_owner: Pubkey,
    ) -> Result<()> {
        instructions::ownership::transfer_lock_ownership_handler(ctx, lock_id, new_owner)
    }

    /// Pending owner accepts and names their collect address
    pub fn accept_lock_ownership(
        ctx: Context<AcceptLockOwnership>,
        lock_id: u64,
        collect_address: Pubkey,
    ) -> Result<()> {
        instructions::ownership::accept_lock_ownership_handler(ctx, lock_id, collect_address)
    }

    // ============ Migration ============

    /// Bind a (source, destination) registry pair
    pub fn create_migration_bridge(ctx: Context<CreateMigrationBridge>) -> Result<()> {
        instructions::admin::create_migration_bridge_handler(ctx)
    }

    /// Outbound bridge of a registry (None disables migration)
    pub fn set_migrator(ctx: Context<UpdateRegistry>, migrator: Option<Pubkey>) -> Result<()> {
        instructions::admin::set_migrator_handler(ctx, migrator)
    }

    /// Inbound bridge of a registry
    pub fn set_migrate_in(ctx: Context<UpdateRegistry>, migrate_in: Option<Pubkey>) -> Result<()> {
        instructions::admin::set_migrate_in_handler(ctx, migrate_in)
    }

    /// Move a lock to the successor registry
    pub fn migrate<'info>(
        ctx: Context<'_, '_, 'info, 'info, Migrate<'info>>,
        lock_id: u64,
    ) -> Result<()> {
        instructions::migrate::handler(ctx, lock_id)
    }

    // ============ Admin Functions ============

    /// Return tokens mis-sent to a registry-owned account
    pub fn admin_refund(ctx: Context<AdminRefundTokens>, amount: u64) -> Result<()> {
        instructions::admin_refund::handler(ctx, amount)
    }

    // ============ Read Accessors ============

    pub fn get_lock(ctx: Context<GetLock>, lock_id: u64) -> Result<Lock> {
        instructions::views::get_lock_handler(ctx, lock_id)
    }

    pub fn get_user_lock_at_index(
        ctx: Context<GetUserLockAtIndex>,
        owner: Pubkey,
        index: u64,
    ) -> Result<Lock> {
        instructions::views::get_user_lock_at_index_handler(ctx, owner, index)
    }

    pub fn get_num_user_locks(ctx: Context<GetNumUserLocks>, owner: Pubkey) -> Result<u64> {
        instructions::views::get_num_user_locks_handler(ctx, owner)
    }

    pub fn get_locks_length(ctx: Context<GetRegistry>) -> Result<u64> {
        instructions::views::get_locks_length_handler(ctx)
    }

    pub fn get_fee(ctx: Context<GetFee>, name: String) -> Result<FeeTier> {
        instructions::views::get_fee_handler(ctx, name)
    }
}
