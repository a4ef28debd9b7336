// programs/risk_manager/src/instructions/initialize.rs

use anchor_lang::prelude::*;
use underwriting_core::seeds;
use crate::state::RiskManagerConfig;
use crate::events::{AddressesSet, CommitteeSet, MaxAllocationsSet, RiskManagerInitialized};
use crate::errors::RiskError;

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct InitializeRiskManagerParams {
    pub governance: Pubkey,
    pub policy_manager: Pubkey,
    pub reserve_vault: Pubkey,
    /// Defaults to DEFAULT_MAX_ALLOCATIONS
    pub max_allocations_per_underwriter: Option<u8>,
    /// Defaults to DEFAULT_DEALLOCATION_NOTICE_SECS
    pub deallocation_notice_secs: Option<i64>,
}

#[derive(Accounts)]
pub struct InitializeRiskManager<'info> {
    #[account(
        init,
        payer = owner,
        space = 8 + RiskManagerConfig::INIT_SPACE,
        seeds = [RiskManagerConfig::SEED_PREFIX],
        bump
    )]
    pub risk_config: Account<'info, RiskManagerConfig>,

    /// CHECK: orchestrator PDA, holds no data
    #[account(
        seeds = [seeds::ORCHESTRATOR],
        bump
    )]
    pub orchestrator: UncheckedAccount<'info>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn initialize_risk_manager(
    ctx: Context<InitializeRiskManager>,
    params: InitializeRiskManagerParams,
) -> Result<()> {
    require!(params.governance != Pubkey::default(), RiskError::InvalidAddress);
    require!(params.policy_manager != Pubkey::default(), RiskError::InvalidAddress);
    require!(params.reserve_vault != Pubkey::default(), RiskError::InvalidAddress);

    let max_allocations = params
        .max_allocations_per_underwriter
        .unwrap_or(RiskManagerConfig::DEFAULT_MAX_ALLOCATIONS);
    require!(
        RiskManagerConfig::is_valid_max_allocations(max_allocations),
        RiskError::InvalidAllocationLimit
    );

    let notice = params
        .deallocation_notice_secs
        .unwrap_or(RiskManagerConfig::DEFAULT_DEALLOCATION_NOTICE_SECS);
    require!(notice >= 0, RiskError::InvalidNoticePeriod);

    let config = &mut ctx.accounts.risk_config;
    config.owner = ctx.accounts.owner.key();
    config.governance = params.governance;
    config.policy_manager = params.policy_manager;
    config.reserve_vault = params.reserve_vault;
    config.max_allocations_per_underwriter = max_allocations;
    config.deallocation_notice_secs = notice;
    config.orchestrator_bump = ctx.bumps.orchestrator;
    config.bump = ctx.bumps.risk_config;

    emit!(RiskManagerInitialized {
        owner: config.owner,
        orchestrator: ctx.accounts.orchestrator.key(),
        governance: config.governance,
        policy_manager: config.policy_manager,
        reserve_vault: config.reserve_vault,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Risk manager initialized, orchestrator {}", ctx.accounts.orchestrator.key());
    Ok(())
}

// =============================================================================
// OWNER SETTERS
// =============================================================================

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct SetAddressesParams {
    pub governance: Pubkey,
    pub policy_manager: Pubkey,
    pub reserve_vault: Pubkey,
}

#[derive(Accounts)]
pub struct UpdateRiskConfig<'info> {
    #[account(
        mut,
        seeds = [RiskManagerConfig::SEED_PREFIX],
        bump = risk_config.bump,
        has_one = owner @ RiskError::Unauthorized
    )]
    pub risk_config: Account<'info, RiskManagerConfig>,

    pub owner: Signer<'info>,
}

pub fn set_addresses(ctx: Context<UpdateRiskConfig>, params: SetAddressesParams) -> Result<()> {
    require!(params.governance != Pubkey::default(), RiskError::InvalidAddress);
    require!(params.policy_manager != Pubkey::default(), RiskError::InvalidAddress);
    require!(params.reserve_vault != Pubkey::default(), RiskError::InvalidAddress);

    let config = &mut ctx.accounts.risk_config;
    config.governance = params.governance;
    config.policy_manager = params.policy_manager;
    config.reserve_vault = params.reserve_vault;

    emit!(AddressesSet {
        governance: params.governance,
        policy_manager: params.policy_manager,
        reserve_vault: params.reserve_vault,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

pub fn set_max_allocations(ctx: Context<UpdateRiskConfig>, max_allocations: u8) -> Result<()> {
    require!(
        RiskManagerConfig::is_valid_max_allocations(max_allocations),
        RiskError::InvalidAllocationLimit
    );
    ctx.accounts.risk_config.max_allocations_per_underwriter = max_allocations;

    emit!(MaxAllocationsSet {
        max_allocations,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

pub fn set_deallocation_notice(ctx: Context<UpdateRiskConfig>, notice_secs: i64) -> Result<()> {
    require!(notice_secs >= 0, RiskError::InvalidNoticePeriod);
    ctx.accounts.risk_config.deallocation_notice_secs = notice_secs;
    Ok(())
}

// =============================================================================
// COMMITTEE
// =============================================================================

#[derive(Accounts)]
pub struct SetCommittee<'info> {
    #[account(
        mut,
        seeds = [RiskManagerConfig::SEED_PREFIX],
        bump = risk_config.bump,
        constraint = governance.key() == risk_config.governance @ RiskError::NotGovernance
    )]
    pub risk_config: Account<'info, RiskManagerConfig>,

    pub governance: Signer<'info>,
}

/// Hand governance to a new committee (current committee only)
pub fn set_committee(ctx: Context<SetCommittee>, committee: Pubkey) -> Result<()> {
    require!(committee != Pubkey::default(), RiskError::InvalidAddress);

    let config = &mut ctx.accounts.risk_config;
    let previous = config.governance;
    config.governance = committee;

    emit!(CommitteeSet {
        previous,
        governance: committee,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
