// programs/loss_distributor/src/instructions/initialize.rs

use anchor_lang::prelude::*;
use crate::state::LossConfig;
use crate::events::{LossDistributorInitialized, OrchestratorSet};
use crate::errors::LossError;

#[derive(Accounts)]
pub struct InitializeLossDistributor<'info> {
    #[account(
        init,
        payer = owner,
        space = 8 + LossConfig::INIT_SPACE,
        seeds = [LossConfig::SEED_PREFIX],
        bump
    )]
    pub loss_config: Account<'info, LossConfig>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn initialize_loss_distributor(
    ctx: Context<InitializeLossDistributor>,
    orchestrator: Pubkey,
) -> Result<()> {
    require!(orchestrator != Pubkey::default(), LossError::InvalidAddress);

    let config = &mut ctx.accounts.loss_config;
    config.owner = ctx.accounts.owner.key();
    config.orchestrator = orchestrator;
    config.bump = ctx.bumps.loss_config;

    emit!(LossDistributorInitialized {
        owner: config.owner,
        orchestrator,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct SetLossOrchestrator<'info> {
    #[account(
        mut,
        seeds = [LossConfig::SEED_PREFIX],
        bump = loss_config.bump,
        has_one = owner @ LossError::Unauthorized
    )]
    pub loss_config: Account<'info, LossConfig>,

    pub owner: Signer<'info>,
}

pub fn set_orchestrator(ctx: Context<SetLossOrchestrator>, orchestrator: Pubkey) -> Result<()> {
    require!(orchestrator != Pubkey::default(), LossError::InvalidAddress);

    let config = &mut ctx.accounts.loss_config;
    let previous = config.orchestrator;
    config.orchestrator = orchestrator;

    emit!(OrchestratorSet {
        previous,
        orchestrator,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
