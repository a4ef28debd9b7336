// programs/capital_pool/src/instructions/initialize.rs

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};
use crate::state::{CapitalPoolConfig, VaultAuthority};
use crate::events::{CapitalPoolInitialized, NoticePeriodSet, OrchestratorSet};
use crate::errors::CapitalError;

// =============================================================================
// INITIALIZE
// =============================================================================

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct InitializeCapitalPoolParams {
    /// Overrides DEFAULT_NOTICE_PERIOD_SECS
    pub notice_period_secs: Option<i64>,
}

#[derive(Accounts)]
pub struct InitializeCapitalPool<'info> {
    #[account(
        init,
        payer = owner,
        space = 8 + CapitalPoolConfig::INIT_SPACE,
        seeds = [CapitalPoolConfig::SEED_PREFIX],
        bump
    )]
    pub config: Box<Account<'info, CapitalPoolConfig>>,

    #[account(
        init,
        payer = owner,
        space = 8 + VaultAuthority::INIT_SPACE,
        seeds = [VaultAuthority::SEED_PREFIX],
        bump
    )]
    pub vault_authority: Box<Account<'info, VaultAuthority>>,

    /// Idle balance: swept adapters and gathered payouts
    #[account(
        init,
        payer = owner,
        token::mint = asset_mint,
        token::authority = vault_authority,
        seeds = [VaultAuthority::IDLE_VAULT_SEED],
        bump
    )]
    pub idle_vault: Box<Account<'info, TokenAccount>>,

    pub asset_mint: Account<'info, Mint>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn initialize_capital_pool(
    ctx: Context<InitializeCapitalPool>,
    params: InitializeCapitalPoolParams,
) -> Result<()> {
    let notice_period_secs = params
        .notice_period_secs
        .unwrap_or(CapitalPoolConfig::DEFAULT_NOTICE_PERIOD_SECS);
    require!(notice_period_secs >= 0, CapitalError::InvalidNoticePeriod);

    let clock = Clock::get()?;

    let config = &mut ctx.accounts.config;
    config.owner = ctx.accounts.owner.key();
    config.orchestrator = Pubkey::default();
    config.asset_mint = ctx.accounts.asset_mint.key();
    config.notice_period_secs = notice_period_secs;
    config.total_master_shares = 0;
    config.total_system_value = 0;
    config.unrealized_payouts = 0;
    config.active_adapter_count = 0;
    config.last_sync_at = clock.unix_timestamp;
    config.bump = ctx.bumps.config;

    let vault_authority = &mut ctx.accounts.vault_authority;
    vault_authority.idle_vault = ctx.accounts.idle_vault.key();
    vault_authority.asset_mint = ctx.accounts.asset_mint.key();
    vault_authority.bump = ctx.bumps.vault_authority;

    emit!(CapitalPoolInitialized {
        owner: ctx.accounts.owner.key(),
        asset_mint: ctx.accounts.asset_mint.key(),
        idle_vault: ctx.accounts.idle_vault.key(),
        notice_period_secs,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

// =============================================================================
// OWNER SETTERS
// =============================================================================

#[derive(Accounts)]
pub struct UpdateCapitalConfig<'info> {
    #[account(
        mut,
        seeds = [CapitalPoolConfig::SEED_PREFIX],
        bump = config.bump,
        has_one = owner @ CapitalError::Unauthorized
    )]
    pub config: Account<'info, CapitalPoolConfig>,

    pub owner: Signer<'info>,
}

/// One-time wiring of the risk manager PDA
pub fn set_orchestrator(ctx: Context<UpdateCapitalConfig>, orchestrator: Pubkey) -> Result<()> {
    require!(orchestrator != Pubkey::default(), CapitalError::InvalidAddress);

    let config = &mut ctx.accounts.config;
    require!(!config.is_orchestrator_set(), CapitalError::OrchestratorAlreadySet);
    config.orchestrator = orchestrator;

    emit!(OrchestratorSet {
        orchestrator,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

pub fn set_notice_period(ctx: Context<UpdateCapitalConfig>, notice_period_secs: i64) -> Result<()> {
    require!(notice_period_secs >= 0, CapitalError::InvalidNoticePeriod);

    let config = &mut ctx.accounts.config;
    let previous = config.notice_period_secs;
    config.notice_period_secs = notice_period_secs;

    emit!(NoticePeriodSet {
        previous,
        notice_period_secs,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
