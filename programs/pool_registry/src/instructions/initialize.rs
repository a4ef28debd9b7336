// programs/pool_registry/src/instructions/initialize.rs

use anchor_lang::prelude::*;
use underwriting_core::protocol_constants::MAX_CLAIM_FEE_BPS;
use crate::state::{PoolState, RateModel, RegistryConfig};
use crate::events::{OrchestratorSet, PoolAdded, RegistryInitialized};
use crate::errors::RegistryError;

// =============================================================================
// INITIALIZE REGISTRY
// =============================================================================

#[derive(Accounts)]
pub struct InitializeRegistry<'info> {
    #[account(
        init,
        payer = owner,
        space = 8 + RegistryConfig::INIT_SPACE,
        seeds = [RegistryConfig::SEED_PREFIX],
        bump
    )]
    pub registry_config: Account<'info, RegistryConfig>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn initialize_registry(ctx: Context<InitializeRegistry>, orchestrator: Pubkey) -> Result<()> {
    require!(orchestrator != Pubkey::default(), RegistryError::InvalidAddress);

    let clock = Clock::get()?;
    let config = &mut ctx.accounts.registry_config;
    config.owner = ctx.accounts.owner.key();
    config.orchestrator = orchestrator;
    config.pool_count = 0;
    config.bump = ctx.bumps.registry_config;

    emit!(RegistryInitialized {
        owner: config.owner,
        orchestrator,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

// =============================================================================
// SET ORCHESTRATOR
// =============================================================================

#[derive(Accounts)]
pub struct SetRegistryOrchestrator<'info> {
    #[account(
        mut,
        seeds = [RegistryConfig::SEED_PREFIX],
        bump = registry_config.bump,
        has_one = owner @ RegistryError::Unauthorized
    )]
    pub registry_config: Account<'info, RegistryConfig>,

    pub owner: Signer<'info>,
}

pub fn set_orchestrator(ctx: Context<SetRegistryOrchestrator>, orchestrator: Pubkey) -> Result<()> {
    require!(orchestrator != Pubkey::default(), RegistryError::InvalidAddress);

    let config = &mut ctx.accounts.registry_config;
    let previous = config.orchestrator;
    config.orchestrator = orchestrator;

    emit!(OrchestratorSet {
        previous,
        orchestrator,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

// =============================================================================
// ADD POOL
// =============================================================================

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct AddPoolParams {
    pub protected_asset_mint: Pubkey,
    pub fee_recipient: Pubkey,
    pub claim_fee_bps: u16,
    pub rate_model: RateModel,
}

#[derive(Accounts)]
pub struct AddPool<'info> {
    #[account(
        mut,
        seeds = [RegistryConfig::SEED_PREFIX],
        bump = registry_config.bump,
        has_one = owner @ RegistryError::Unauthorized
    )]
    pub registry_config: Account<'info, RegistryConfig>,

    #[account(
        init,
        payer = owner,
        space = 8 + PoolState::INIT_SPACE,
        seeds = [PoolState::SEED_PREFIX, &registry_config.pool_count.to_le_bytes()],
        bump
    )]
    pub pool_state: Account<'info, PoolState>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn add_pool(ctx: Context<AddPool>, params: AddPoolParams) -> Result<()> {
    require!(
        params.claim_fee_bps <= MAX_CLAIM_FEE_BPS,
        RegistryError::InvalidFee
    );
    require!(params.rate_model.is_valid(), RegistryError::InvalidRateModel);
    require!(
        params.fee_recipient != Pubkey::default()
            && params.protected_asset_mint != Pubkey::default(),
        RegistryError::InvalidAddress
    );

    let clock = Clock::get()?;
    let config = &mut ctx.accounts.registry_config;
    let pool = &mut ctx.accounts.pool_state;

    let pool_id = config.pool_count;
    pool.pool_id = pool_id;
    pool.protected_asset_mint = params.protected_asset_mint;
    pool.total_capital_pledged = 0;
    pool.total_coverage_sold = 0;
    pool.capital_pending_withdrawal = 0;
    pool.is_paused = false;
    pool.paused_at = 0;
    pool.fee_recipient = params.fee_recipient;
    pool.claim_fee_bps = params.claim_fee_bps;
    pool.rate_model = params.rate_model;
    pool.adapter_allocations = Vec::new();
    pool.created_at = clock.unix_timestamp;
    pool.bump = ctx.bumps.pool_state;

    config.pool_count = config
        .pool_count
        .checked_add(1)
        .ok_or(RegistryError::MathOverflow)?;

    emit!(PoolAdded {
        pool_id,
        protected_asset_mint: params.protected_asset_mint,
        fee_recipient: params.fee_recipient,
        claim_fee_bps: params.claim_fee_bps,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
