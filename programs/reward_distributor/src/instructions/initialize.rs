// programs/reward_distributor/src/instructions/initialize.rs

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};
use crate::state::RewardConfig;
use crate::events::{OrchestratorSet, ReserveSet, RewardDistributorInitialized, RewardVaultCreated};
use crate::errors::RewardError;

// =============================================================================
// INITIALIZE
// =============================================================================

#[derive(Accounts)]
pub struct InitializeRewardDistributor<'info> {
    #[account(
        init,
        payer = owner,
        space = 8 + RewardConfig::INIT_SPACE,
        seeds = [RewardConfig::SEED_PREFIX],
        bump
    )]
    pub reward_config: Account<'info, RewardConfig>,

    /// CHECK: PDA that owns every reward vault, holds no data
    #[account(
        seeds = [RewardConfig::AUTHORITY_SEED],
        bump
    )]
    pub reward_authority: UncheckedAccount<'info>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn initialize_reward_distributor(
    ctx: Context<InitializeRewardDistributor>,
    orchestrator: Pubkey,
    reserve: Pubkey,
) -> Result<()> {
    require!(
        orchestrator != Pubkey::default() && reserve != Pubkey::default(),
        RewardError::InvalidAddress
    );

    let config = &mut ctx.accounts.reward_config;
    config.owner = ctx.accounts.owner.key();
    config.orchestrator = orchestrator;
    config.reserve = reserve;
    config.authority_bump = ctx.bumps.reward_authority;
    config.bump = ctx.bumps.reward_config;

    emit!(RewardDistributorInitialized {
        owner: config.owner,
        orchestrator,
        reserve,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

// =============================================================================
// OWNER SETTERS
// =============================================================================

#[derive(Accounts)]
pub struct UpdateRewardConfig<'info> {
    #[account(
        mut,
        seeds = [RewardConfig::SEED_PREFIX],
        bump = reward_config.bump,
        has_one = owner @ RewardError::Unauthorized
    )]
    pub reward_config: Account<'info, RewardConfig>,

    pub owner: Signer<'info>,
}

pub fn set_orchestrator(ctx: Context<UpdateRewardConfig>, orchestrator: Pubkey) -> Result<()> {
    require!(orchestrator != Pubkey::default(), RewardError::InvalidAddress);

    let config = &mut ctx.accounts.reward_config;
    let previous = config.orchestrator;
    config.orchestrator = orchestrator;

    emit!(OrchestratorSet {
        previous,
        orchestrator,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

pub fn set_reserve(ctx: Context<UpdateRewardConfig>, reserve: Pubkey) -> Result<()> {
    require!(reserve != Pubkey::default(), RewardError::InvalidAddress);

    let config = &mut ctx.accounts.reward_config;
    let previous = config.reserve;
    config.reserve = reserve;

    emit!(ReserveSet {
        previous,
        reserve,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

// =============================================================================
// REWARD VAULTS
// =============================================================================

/// One vault per reward mint, shared by every pool
#[derive(Accounts)]
pub struct InitRewardVault<'info> {
    #[account(
        seeds = [RewardConfig::SEED_PREFIX],
        bump = reward_config.bump,
        has_one = owner @ RewardError::Unauthorized
    )]
    pub reward_config: Account<'info, RewardConfig>,

    /// CHECK: vault authority PDA
    #[account(
        seeds = [RewardConfig::AUTHORITY_SEED],
        bump = reward_config.authority_bump
    )]
    pub reward_authority: UncheckedAccount<'info>,

    #[account(
        init,
        payer = owner,
        token::mint = reward_mint,
        token::authority = reward_authority,
        seeds = [RewardConfig::VAULT_SEED, reward_mint.key().as_ref()],
        bump
    )]
    pub reward_vault: Box<Account<'info, TokenAccount>>,

    pub reward_mint: Account<'info, Mint>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn init_reward_vault(ctx: Context<InitRewardVault>) -> Result<()> {
    emit!(RewardVaultCreated {
        mint: ctx.accounts.reward_mint.key(),
        vault: ctx.accounts.reward_vault.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
