use anchor_lang::prelude::*;
use crate::state::*;
use crate::constants::*;
use crate::errors::LockerError;
use crate::events::{
    FeeParamsUpdated, CountryListUpdated, RegistryAuthorityTransferred, FeeTierUpdated,
    FeeTierRemoved, PositionManagerAllowed, MigrationBridgeCreated, MigratorSet, MigrateInSet,
};

/// Registry settings gated on the registry authority
#[derive(Accounts)]
pub struct UpdateRegistry<'info> {
    #[account(
        address = registry.authority @ LockerError::Unauthorized
    )]
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED, &registry.registry_id.to_le_bytes()],
        bump = registry.bump
    )]
    pub registry: Box<Account<'info, Registry>>,
}

pub fn set_fee_params_handler(
    ctx: Context<UpdateRegistry>,
    auto_collect_account: Pubkey,
    lp_fee_receiver: Pubkey,
    collect_fee_receiver: Pubkey,
) -> Result<()> {
    require_keys_neq!(lp_fee_receiver, Pubkey::default(), LockerError::NullAddress);
    require_keys_neq!(collect_fee_receiver, Pubkey::default(), LockerError::NullAddress);

    let registry_key = ctx.accounts.registry.key();
    let registry = &mut ctx.accounts.registry;
    registry.auto_collect_account = auto_collect_account;
    registry.lp_fee_receiver = lp_fee_receiver;
    registry.collect_fee_receiver = collect_fee_receiver;

    emit!(FeeParamsUpdated {
        registry: registry_key,
        auto_collect_account,
        lp_fee_receiver,
        collect_fee_receiver,
    });

    Ok(())
}

pub fn set_country_list_handler(ctx: Context<UpdateRegistry>, country_list: Pubkey) -> Result<()> {
    let registry_key = ctx.accounts.registry.key();
    ctx.accounts.registry.country_list = country_list;

    emit!(CountryListUpdated {
        registry: registry_key,
        country_list,
    });

    Ok(())
}

pub fn transfer_registry_authority_handler(
    ctx: Context<UpdateRegistry>,
    new_authority: Pubkey,
) -> Result<()> {
    require_keys_neq!(new_authority, Pubkey::default(), LockerError::NullAddress);

    let registry_key = ctx.accounts.registry.key();
    let registry = &mut ctx.accounts.registry;
    let old_authority = registry.authority;
    registry.authority = new_authority;

    msg!("Registry authority {} -> {}", old_authority, new_authority);

    emit!(RegistryAuthorityTransferred {
        registry: registry_key,
        old_authority,
        new_authority,
    });

    Ok(())
}

/// The source authority points its registry at an outbound bridge.
/// `None` disables migration.
pub fn set_migrator_handler(ctx: Context<UpdateRegistry>, migrator: Option<Pubkey>) -> Result<()> {
    let registry_key = ctx.accounts.registry.key();
    ctx.accounts.registry.migrator = migrator;

    emit!(MigratorSet {
        registry: registry_key,
        migrator,
    });

    Ok(())
}

/// The destination authority accepts migrated locks from a bridge
pub fn set_migrate_in_handler(ctx: Context<UpdateRegistry>, migrate_in: Option<Pubkey>) -> Result<()> {
    let registry_key = ctx.accounts.registry.key();
    ctx.accounts.registry.migrate_in = migrate_in;

    emit!(MigrateInSet {
        registry: registry_key,
        migrate_in,
    });

    Ok(())
}

// ============ Fee Tiers ============

#[derive(Accounts)]
#[instruction(name: String)]
pub struct AddOrEditFee<'info> {
    #[account(
        mut,
        address = registry.authority @ LockerError::Unauthorized
    )]
    pub authority: Signer<'info>,

    #[account(
        seeds = [REGISTRY_SEED, &registry.registry_id.to_le_bytes()],
        bump = registry.bump
    )]
    pub registry: Box<Account<'info, Registry>>,

    #[account(
        init_if_needed,
        payer = authority,
        space = FeeTier::LEN,
        seeds = [FEE_TIER_SEED, registry.key().as_ref(), name.as_bytes()],
        bump
    )]
    pub fee_tier: Box<Account<'info, FeeTier>>,

    pub system_program: Program<'info, System>,
}

pub fn add_or_edit_fee_handler(
    ctx: Context<AddOrEditFee>,
    name: String,
    lp_fee_bps: u16,
    collect_fee_bps: u16,
    flat_fee: u64,
    flat_fee_token: Pubkey,
) -> Result<()> {
    FeeTier::validate_name(&name)?;

    let registry_key = ctx.accounts.registry.key();
    let tier = &mut ctx.accounts.fee_tier;
    tier.set(lp_fee_bps, collect_fee_bps, flat_fee, flat_fee_token)?;
    tier.registry = registry_key;
    tier.name = name;
    tier.bump = ctx.bumps.fee_tier;

    emit!(FeeTierUpdated {
        registry: registry_key,
        name: tier.name.clone(),
        lp_fee_bps,
        collect_fee_bps,
        flat_fee,
        flat_fee_token,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct RemoveFee<'info> {
    #[account(
        mut,
        address = registry.authority @ LockerError::Unauthorized
    )]
    pub authority: Signer<'info>,

    #[account(
        seeds = [REGISTRY_SEED, &registry.registry_id.to_le_bytes()],
        bump = registry.bump
    )]
    pub registry: Box<Account<'info, Registry>>,

    #[account(
        mut,
        close = authority,
        seeds = [FEE_TIER_SEED, registry.key().as_ref(), fee_tier.name.as_bytes()],
        bump = fee_tier.bump
    )]
    pub fee_tier: Box<Account<'info, FeeTier>>,
}

pub fn remove_fee_handler(ctx: Context<RemoveFee>) -> Result<()> {
    emit!(FeeTierRemoved {
        registry: ctx.accounts.registry.key(),
        name: ctx.accounts.fee_tier.name.clone(),
    });

    Ok(())
}

// ============ Position Manager Whitelist ============

#[derive(Accounts)]
pub struct AllowPositionManager<'info> {
    #[account(
        mut,
        address = registry.authority @ LockerError::Unauthorized
    )]
    pub authority: Signer<'info>,

    #[account(
        seeds = [REGISTRY_SEED, &registry.registry_id.to_le_bytes()],
        bump = registry.bump
    )]
    pub registry: Box<Account<'info, Registry>>,

    /// CHECK: Any program id; only its key is recorded
    pub position_manager: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = authority,
        space = AllowedPositionManager::LEN,
        seeds = [POSITION_MANAGER_SEED, registry.key().as_ref(), position_manager.key().as_ref()],
        bump
    )]
    pub allowed_position_manager: Account<'info, AllowedPositionManager>,

    pub system_program: Program<'info, System>,
}

pub fn allow_position_manager_handler(ctx: Context<AllowPositionManager>, allowed: bool) -> Result<()> {
    let registry_key = ctx.accounts.registry.key();
    let program = ctx.accounts.position_manager.key();

    let entry = &mut ctx.accounts.allowed_position_manager;
    entry.registry = registry_key;
    entry.program = program;
    entry.allowed = allowed;
    entry.bump = ctx.bumps.allowed_position_manager;

    emit!(PositionManagerAllowed {
        registry: registry_key,
        program,
        allowed,
    });

    Ok(())
}

// ============ Migration Bridge ============

/// Bind a source registry to a destination. Created by the source authority;
/// the destination still has to opt in through `set_migrate_in`.
#[derive(Accounts)]
pub struct CreateMigrationBridge<'info> {
    #[account(
        mut,
        address = source_registry.authority @ LockerError::Unauthorized
    )]
    pub authority: Signer<'info>,

    #[account(
        seeds = [REGISTRY_SEED, &source_registry.registry_id.to_le_bytes()],
        bump = source_registry.bump
    )]
    pub source_registry: Box<Account<'info, Registry>>,

    #[account(
        seeds = [REGISTRY_SEED, &destination_registry.registry_id.to_le_bytes()],
        bump = destination_registry.bump,
        constraint = destination_registry.key() != source_registry.key() @ LockerError::UnrecognizedCaller
    )]
    pub destination_registry: Box<Account<'info, Registry>>,

    #[account(
        init,
        payer = authority,
        space = MigrationBridge::LEN,
        seeds = [BRIDGE_SEED, source_registry.key().as_ref(), destination_registry.key().as_ref()],
        bump
    )]
    pub bridge: Account<'info, MigrationBridge>,

    pub system_program: Program<'info, System>,
}

pub fn create_migration_bridge_handler(ctx: Context<CreateMigrationBridge>) -> Result<()> {
    let bridge = &mut ctx.accounts.bridge;
    bridge.source_registry = ctx.accounts.source_registry.key();
    bridge.destination_registry = ctx.accounts.destination_registry.key();
    bridge.bump = ctx.bumps.bridge;

    emit!(MigrationBridgeCreated {
        bridge: bridge.key(),
        source_registry: bridge.source_registry,
        destination_registry: bridge.destination_registry,
    });

    Ok(())
}
