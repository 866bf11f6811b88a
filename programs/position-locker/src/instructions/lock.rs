use anchor_lang::prelude::*;
use anchor_spl::token::Token;
use anchor_spl::token_2022::Token2022;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::state::*;
use crate::constants::*;
use crate::errors::LockerError;
use crate::events::{LockCreated, EntryFeesCharged, SignedFeeUsed};
use crate::clmm::{self, ClmmPositionAccounts, DecreaseLiquidityV2Args, PositionCpi, PositionSnapshot};
use crate::country_list;
use crate::utils::{liquidity_share, transfer_from_user, transfer_lamports};

/// Accounts both lock entry points need: the new records, custody and the
/// entry fee payouts
#[derive(Accounts)]
#[instruction(params: LockParams)]
pub struct LockCore<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED, &registry.registry_id.to_le_bytes()],
        bump = registry.bump
    )]
    pub registry: Box<Account<'info, Registry>>,

    /// CHECK: Whitelisted through `allowed_position_manager`
    #[account(executable)]
    pub position_manager: UncheckedAccount<'info>,

    #[account(
        seeds = [POSITION_MANAGER_SEED, registry.key().as_ref(), position_manager.key().as_ref()],
        bump = allowed_position_manager.bump,
        constraint = allowed_position_manager.allowed @ LockerError::PositionManagerNotAllowed
    )]
    pub allowed_position_manager: Box<Account<'info, AllowedPositionManager>>,

    #[account(
        init,
        payer = payer,
        space = Lock::LEN,
        seeds = [LOCK_SEED, registry.key().as_ref(), &registry.locks_length.to_le_bytes()],
        bump
    )]
    pub lock: Box<Account<'info, Lock>>,

    #[account(
        init_if_needed,
        payer = payer,
        space = UserLocks::LEN,
        seeds = [USER_LOCKS_SEED, registry.key().as_ref(), params.owner.as_ref()],
        bump
    )]
    pub user_locks: Box<Account<'info, UserLocks>>,

    #[account(
        init,
        payer = payer,
        space = UserLockSlot::LEN,
        seeds = [USER_LOCK_SLOT_SEED, user_locks.key().as_ref(), &user_locks.count.to_le_bytes()],
        bump
    )]
    pub user_lock_slot: Box<Account<'info, UserLockSlot>>,

    #[account(
        mint::token_program = nft_token_program,
        constraint = nft_mint.supply == 1 && nft_mint.decimals == 0 @ LockerError::InvalidPosition
    )]
    pub nft_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        token::mint = nft_mint,
        token::authority = payer,
        token::token_program = nft_token_program
    )]
    pub payer_nft_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init,
        payer = payer,
        seeds = [CUSTODY_SEED, registry.key().as_ref(), nft_mint.key().as_ref()],
        bump,
        token::mint = nft_mint,
        token::authority = registry,
        token::token_program = nft_token_program
    )]
    pub custody_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mint::token_program = token_program_0)]
    pub mint_0: Box<InterfaceAccount<'info, Mint>>,

    #[account(mint::token_program = token_program_1)]
    pub mint_1: Box<InterfaceAccount<'info, Mint>>,

    /// Created with the first lock on the pair; every later fee harvest
    /// passes through it
    #[account(
        init_if_needed,
        payer = payer,
        seeds = [TRANSIT_SEED, registry.key().as_ref(), mint_0.key().as_ref()],
        bump,
        token::mint = mint_0,
        token::authority = registry,
        token::token_program = token_program_0
    )]
    pub transit_0: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init_if_needed,
        payer = payer,
        seeds = [TRANSIT_SEED, registry.key().as_ref(), mint_1.key().as_ref()],
        bump,
        token::mint = mint_1,
        token::authority = registry,
        token::token_program = token_program_1
    )]
    pub transit_1: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Pre-lock fees land here
    #[account(
        mut,
        token::mint = mint_0,
        token::token_program = token_program_0,
        constraint = dust_token_0.owner == params.dust_recipient @ LockerError::InvalidAccountData
    )]
    pub dust_token_0: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = mint_1,
        token::token_program = token_program_1,
        constraint = dust_token_1.owner == params.dust_recipient @ LockerError::InvalidAccountData
    )]
    pub dust_token_1: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Skimmed liquidity lands here
    #[account(
        mut,
        token::mint = mint_0,
        token::token_program = token_program_0,
        constraint = lp_fee_token_0.owner == registry.lp_fee_receiver @ LockerError::InvalidAccountData
    )]
    pub lp_fee_token_0: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = mint_1,
        token::token_program = token_program_1,
        constraint = lp_fee_token_1.owner == registry.lp_fee_receiver @ LockerError::InvalidAccountData
    )]
    pub lp_fee_token_1: Box<InterfaceAccount<'info, TokenAccount>>,

    /// CHECK: Must be the registry's country list program
    pub country_list: Option<UncheckedAccount<'info>>,

    /// CHECK: Passed through to the country list program
    pub country_list_state: Option<UncheckedAccount<'info>>,

    pub token_program: Program<'info, Token>,
    pub token_program_2022: Program<'info, Token2022>,
    pub token_program_0: Interface<'info, TokenInterface>,
    pub token_program_1: Interface<'info, TokenInterface>,
    pub nft_token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

/// Lock a position NFT under a named fee tier
#[derive(Accounts)]
#[instruction(params: LockParams, fee_name: String)]
pub struct CreateLock<'info> {
    pub core: LockCore<'info>,

    #[account(
        seeds = [FEE_TIER_SEED, core.registry.key().as_ref(), fee_name.as_bytes()],
        bump = fee_tier.bump
    )]
    pub fee_tier: Box<Account<'info, FeeTier>>,

    /// CHECK: Native flat fee destination
    #[account(
        mut,
        address = core.registry.lp_fee_receiver @ LockerError::InvalidFlatFeeAccounts
    )]
    pub lp_fee_receiver: UncheckedAccount<'info>,

    /// Required for token flat fees
    pub flat_fee_mint: Option<Box<InterfaceAccount<'info, Mint>>>,

    #[account(mut)]
    pub payer_flat_fee_account: Option<Box<InterfaceAccount<'info, TokenAccount>>>,

    #[account(mut)]
    pub receiver_flat_fee_account: Option<Box<InterfaceAccount<'info, TokenAccount>>>,

    pub flat_fee_token_program: Option<Interface<'info, TokenInterface>>,

    /// Waives the flat fee when set for the payer
    pub fee_exemption: Option<Account<'info, FeeExemption>>,
}

/// Lock a position NFT under a signed fee override
#[derive(Accounts)]
#[instruction(params: LockParams, message: SignedFeeMessage)]
pub struct CreateLockWithSignedFee<'info> {
    pub core: LockCore<'info>,

    #[account(
        seeds = [FEE_RESOLVER_SEED, core.registry.key().as_ref()],
        bump = fee_resolver.bump
    )]
    pub fee_resolver: Box<Account<'info, FeeResolver>>,

    #[account(
        init_if_needed,
        payer = core.payer,
        space = NonceRecord::LEN,
        seeds = [NONCE_SEED, fee_resolver.key().as_ref(), message.ref_code.as_ref()],
        bump
    )]
    pub nonce_record: Box<Account<'info, NonceRecord>>,
}

// ============ Shared Steps ============

/// What `open_lock` leaves for the entry point to report
pub(crate) struct OpenedLock {
    pub lock_id: u64,
    pub liquidity_removed: u128,
    pub snapshot: PositionSnapshot,
}

/// Everything between the fee being known and the flat fee: checks, the
/// lock record and its index entry, custody of the NFT and the entry skim.
pub(crate) fn open_lock<'info>(
    core: &mut LockCore<'info>,
    bumps: &LockCoreBumps,
    remaining_accounts: &[AccountInfo<'info>],
    params: &LockParams,
    fee: &ResolvedFee,
) -> Result<OpenedLock> {
    // ============ Checks ============
    params.validate()?;
    country_list::check_country(
        &core.registry.country_list,
        core.country_list.as_deref(),
        core.country_list_state.as_deref(),
        params.country_code,
    )?;

    let position_accounts = ClmmPositionAccounts::from_remaining(remaining_accounts)?;
    let (position, pool) =
        position_accounts.load(&core.position_manager.key(), &core.nft_mint.key())?;
    clmm::check_pool_mints(&pool, &core.mint_0.key(), &core.mint_1.key())?;
    require!(pool.can_harvest(), LockerError::PoolPaused);
    let snapshot = PositionSnapshot::from(&position);

    // ============ Effects ============
    let custody = CustodyRef {
        position_manager: core.position_manager.key(),
        nft_mint: core.nft_mint.key(),
        pool: position.pool_id,
    };
    let lock_id = core.registry.next_lock_id()?;
    let mut record = Lock::open(
        lock_id,
        custody,
        params,
        fee.collect_fee_bps,
        LockOrigin::Direct,
        bumps.lock,
    );
    index_lock(
        core.registry.key(),
        &mut core.user_locks,
        bumps.user_locks,
        &mut core.user_lock_slot,
        bumps.user_lock_slot,
        &mut record,
    )?;
    core.lock.set_inner(record);

    // ============ Interactions ============
    transfer_from_user(
        &core.payer_nft_account.to_account_info(),
        &core.custody_vault.to_account_info(),
        &core.nft_mint,
        &core.payer,
        &core.nft_token_program.to_account_info(),
        1,
    )?;

    let registry_id = core.registry.registry_id.to_le_bytes();
    let registry_bump = [core.registry.bump];
    let registry_seeds: &[&[u8]] = &[REGISTRY_SEED, &registry_id, &registry_bump];
    let signer_seeds = &[registry_seeds];

    let cpi = clmm::position_cpi(
        core.position_manager.to_account_info(),
        core.registry.to_account_info(),
        core.custody_vault.to_account_info(),
        core.token_program.to_account_info(),
        core.token_program_2022.to_account_info(),
        &core.mint_0,
        &core.mint_1,
        position_accounts,
    );
    let liquidity_removed = apply_entry_fees(
        &cpi,
        EntryPayouts {
            dust_token_0: &core.dust_token_0.to_account_info(),
            dust_token_1: &core.dust_token_1.to_account_info(),
            lp_fee_token_0: &core.lp_fee_token_0.to_account_info(),
            lp_fee_token_1: &core.lp_fee_token_1.to_account_info(),
        },
        position.liquidity,
        fee.lp_fee_bps,
        signer_seeds,
    )?;

    Ok(OpenedLock {
        lock_id,
        liquidity_removed,
        snapshot,
    })
}

/// Token accounts the entry flow pays out to
pub(crate) struct EntryPayouts<'a, 'info> {
    pub dust_token_0: &'a AccountInfo<'info>,
    pub dust_token_1: &'a AccountInfo<'info>,
    pub lp_fee_token_0: &'a AccountInfo<'info>,
    pub lp_fee_token_1: &'a AccountInfo<'info>,
}

/// With the NFT already in custody: hand pre-lock fees to the dust
/// recipient and skim the entry share of liquidity to the LP fee receiver.
/// Returns the liquidity removed.
pub(crate) fn apply_entry_fees<'info>(
    cpi: &PositionCpi<'info>,
    payouts: EntryPayouts<'_, 'info>,
    liquidity: u128,
    lp_fee_bps: u16,
    signer_seeds: &[&[&[u8]]],
) -> Result<u128> {
    cpi.collect_fees(payouts.dust_token_0, payouts.dust_token_1, signer_seeds)?;

    let skimmed = liquidity_share(liquidity, lp_fee_bps)?;
    if skimmed > 0 {
        cpi.decrease_liquidity(
            &DecreaseLiquidityV2Args::remove(skimmed, 0, 0),
            payouts.lp_fee_token_0,
            payouts.lp_fee_token_1,
            signer_seeds,
        )?;
    }
    Ok(skimmed)
}

pub(crate) fn emit_created(lock: &Lock, snapshot: PositionSnapshot) {
    emit!(LockCreated {
        lock_id: lock.lock_id,
        position_manager: lock.position_manager,
        nft_mint: lock.nft_mint,
        owner: lock.owner,
        additional_collector: lock.additional_collector,
        collect_address: lock.collect_address,
        unlock_date: lock.unlock_date,
        country_code: lock.country_code,
        collect_fee_bps: lock.collect_fee_bps,
        pool: lock.pool,
        snapshot,
        origin: lock.origin,
    });
}

// ============ Handlers ============

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, CreateLock<'info>>,
    params: LockParams,
    _fee_name: String,
) -> Result<()> {
    let fee = ctx.accounts.fee_tier.resolved();
    let flat_fee_exempt = is_flat_fee_exempt(&ctx.accounts)?;

    let opened = open_lock(
        &mut ctx.accounts.core,
        &ctx.bumps.core,
        ctx.remaining_accounts,
        &params,
        &fee,
    )?;

    if fee.charges_flat_fee() && !flat_fee_exempt {
        charge_flat_fee(&ctx.accounts, &fee)?;
    }

    msg!("Lock {} created for {}", opened.lock_id, params.owner);

    emit_created(&ctx.accounts.core.lock, opened.snapshot);
    emit!(EntryFeesCharged {
        lock_id: opened.lock_id,
        lp_fee_bps: fee.lp_fee_bps,
        liquidity_removed: opened.liquidity_removed,
        flat_fee: if flat_fee_exempt { 0 } else { fee.flat_fee },
        flat_fee_token: fee.flat_fee_token,
        flat_fee_exempt,
    });

    Ok(())
}

pub fn signed_fee_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, CreateLockWithSignedFee<'info>>,
    params: LockParams,
    message: SignedFeeMessage,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let payer_key = ctx.accounts.core.payer.key();
    let fee = {
        let resolver = &ctx.accounts.fee_resolver;
        let nonce = &mut ctx.accounts.nonce_record;
        let fee = resolver.resolve_and_consume(&message, &payer_key, nonce, now)?;
        nonce.bump = ctx.bumps.nonce_record;
        fee
    };

    let opened = open_lock(
        &mut ctx.accounts.core,
        &ctx.bumps.core,
        ctx.remaining_accounts,
        &params,
        &fee,
    )?;

    msg!("Lock {} created for {} with signed fee", opened.lock_id, params.owner);

    emit!(SignedFeeUsed {
        fee_resolver: ctx.accounts.fee_resolver.key(),
        ref_code: message.ref_code,
        user: payer_key,
        use_primary_signer: message.use_primary_signer,
        lp_fee_bps: fee.lp_fee_bps,
        collect_fee_bps: fee.collect_fee_bps,
    });
    emit_created(&ctx.accounts.core.lock, opened.snapshot);
    emit!(EntryFeesCharged {
        lock_id: opened.lock_id,
        lp_fee_bps: fee.lp_fee_bps,
        liquidity_removed: opened.liquidity_removed,
        flat_fee: 0,
        flat_fee_token: Pubkey::default(),
        flat_fee_exempt: false,
    });

    Ok(())
}

// ============ Flat Fee ============

/// An exemption only counts for the payer and this registry
fn is_flat_fee_exempt(accounts: &CreateLock) -> Result<bool> {
    let Some(exemption) = accounts.fee_exemption.as_ref() else {
        return Ok(false);
    };
    require_keys_eq!(exemption.registry, accounts.core.registry.key(), LockerError::InvalidAccountData);
    require_keys_eq!(exemption.wallet, accounts.core.payer.key(), LockerError::InvalidAccountData);
    Ok(exemption.exempt)
}

fn charge_flat_fee<'info>(accounts: &CreateLock<'info>, fee: &ResolvedFee) -> Result<()> {
    let core = &accounts.core;
    if fee.is_native_flat_fee() {
        return transfer_lamports(
            &core.payer,
            &accounts.lp_fee_receiver.to_account_info(),
            &core.system_program.to_account_info(),
            fee.flat_fee,
        );
    }

    let (Some(mint), Some(from), Some(to), Some(token_program)) = (
        accounts.flat_fee_mint.as_ref(),
        accounts.payer_flat_fee_account.as_ref(),
        accounts.receiver_flat_fee_account.as_ref(),
        accounts.flat_fee_token_program.as_ref(),
    ) else {
        return err!(LockerError::InvalidFlatFeeAccounts);
    };
    require_keys_eq!(mint.key(), fee.flat_fee_token, LockerError::InvalidFlatFeeAccounts);
    require_keys_eq!(to.mint, fee.flat_fee_token, LockerError::InvalidFlatFeeAccounts);
    require_keys_eq!(to.owner, core.registry.lp_fee_receiver, LockerError::InvalidFlatFeeAccounts);

    transfer_from_user(
        &from.to_account_info(),
        &to.to_account_info(),
        mint,
        &core.payer,
        &token_program.to_account_info(),
        fee.flat_fee,
    )
}
