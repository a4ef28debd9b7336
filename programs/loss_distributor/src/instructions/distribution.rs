// programs/loss_distributor/src/instructions/distribution.rs
//
// Loss Socialization
// ==================
// distribute_loss is O(1) per claim: it bumps the pool tracker and nothing else.
// Each underwriter pays their share later, when the orchestrator realizes it
// ahead of any operation that changes their pledge or trusts their principal.

use anchor_lang::prelude::*;
use crate::state::{LossCheckpoint, LossConfig, PoolLossTracker};
use crate::events::{LossDistributed, LossesRealized};
use crate::errors::LossError;

// =============================================================================
// DISTRIBUTE LOSS
// =============================================================================

#[derive(Accounts)]
#[instruction(pool_id: u64)]
pub struct DistributeLoss<'info> {
    #[account(
        seeds = [LossConfig::SEED_PREFIX],
        bump = loss_config.bump,
    )]
    pub loss_config: Account<'info, LossConfig>,

    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + PoolLossTracker::INIT_SPACE,
        seeds = [PoolLossTracker::SEED_PREFIX, &pool_id.to_le_bytes()],
        bump
    )]
    pub loss_tracker: Account<'info, PoolLossTracker>,

    #[account(
        constraint = orchestrator.key() == loss_config.orchestrator @ LossError::Unauthorized
    )]
    pub orchestrator: Signer<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn distribute_loss(
    ctx: Context<DistributeLoss>,
    pool_id: u64,
    loss_amount: u64,
    total_pledge: u64,
) -> Result<()> {
    let clock = Clock::get()?;
    let tracker = &mut ctx.accounts.loss_tracker;

    tracker.pool_id = pool_id;
    tracker.bump = ctx.bumps.loss_tracker;

    let applied = tracker
        .record_loss(loss_amount, total_pledge)
        .ok_or(LossError::MathOverflow)?;

    if !applied {
        msg!("Loss of {} for pool {} skipped: no pledge to absorb it", loss_amount, pool_id);
        return Ok(());
    }

    tracker.last_distribution_at = clock.unix_timestamp;

    emit!(LossDistributed {
        pool_id,
        loss_amount,
        total_pledge,
        loss_per_pledge: tracker.loss_per_pledge,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

// =============================================================================
// REALIZE LOSSES
// =============================================================================

#[derive(Accounts)]
#[instruction(underwriter: Pubkey, pool_id: u64)]
pub struct RealizeLosses<'info> {
    #[account(
        seeds = [LossConfig::SEED_PREFIX],
        bump = loss_config.bump,
    )]
    pub loss_config: Account<'info, LossConfig>,

    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + PoolLossTracker::INIT_SPACE,
        seeds = [PoolLossTracker::SEED_PREFIX, &pool_id.to_le_bytes()],
        bump
    )]
    pub loss_tracker: Account<'info, PoolLossTracker>,

    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + LossCheckpoint::INIT_SPACE,
        seeds = [LossCheckpoint::SEED_PREFIX, underwriter.as_ref(), &pool_id.to_le_bytes()],
        bump
    )]
    pub loss_checkpoint: Account<'info, LossCheckpoint>,

    #[account(
        constraint = orchestrator.key() == loss_config.orchestrator @ LossError::Unauthorized
    )]
    pub orchestrator: Signer<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// Realize the pending loss for `pledge` and advance the checkpoint.
/// Returns the realized amount; the orchestrator charges it to the share ledger.
pub fn realize_losses(
    ctx: Context<RealizeLosses>,
    underwriter: Pubkey,
    pool_id: u64,
    pledge: u64,
) -> Result<u64> {
    let clock = Clock::get()?;
    let tracker = &mut ctx.accounts.loss_tracker;
    let checkpoint = &mut ctx.accounts.loss_checkpoint;

    tracker.pool_id = pool_id;
    tracker.bump = ctx.bumps.loss_tracker;

    // Fresh checkpoints start at zero and advance to the tracker below
    if !checkpoint.is_initialized() {
        checkpoint.underwriter = underwriter;
        checkpoint.pool_id = pool_id;
        checkpoint.bump = ctx.bumps.loss_checkpoint;
    }

    let pending = checkpoint
        .realize(tracker, pledge)
        .ok_or(LossError::MathOverflow)?;

    if pending > 0 {
        emit!(LossesRealized {
            underwriter,
            pool_id,
            pledge,
            amount: pending,
            checkpoint: checkpoint.checkpoint,
            timestamp: clock.unix_timestamp,
        });
    }

    Ok(pending)
}

// =============================================================================
// VIEWS
// =============================================================================

/// Tracker and checkpoint may not exist yet; both then count as zero.
#[derive(Accounts)]
#[instruction(underwriter: Pubkey, pool_id: u64)]
pub struct GetPendingLosses<'info> {
    /// CHECK: address fixed by seeds, deserialized only when created
    #[account(
        seeds = [PoolLossTracker::SEED_PREFIX, &pool_id.to_le_bytes()],
        bump,
    )]
    pub loss_tracker: UncheckedAccount<'info>,

    /// CHECK: address fixed by seeds, deserialized only when created
    #[account(
        seeds = [LossCheckpoint::SEED_PREFIX, underwriter.as_ref(), &pool_id.to_le_bytes()],
        bump,
    )]
    pub loss_checkpoint: UncheckedAccount<'info>,
}

pub fn get_pending_losses(
    ctx: Context<GetPendingLosses>,
    _underwriter: Pubkey,
    _pool_id: u64,
    pledge: u64,
) -> Result<u64> {
    let tracker_info = ctx.accounts.loss_tracker.to_account_info();
    if tracker_info.data_is_empty() {
        return Ok(0);
    }
    let tracker = Account::<PoolLossTracker>::try_from(Box::leak(Box::new(tracker_info)))?;

    let checkpoint_info = ctx.accounts.loss_checkpoint.to_account_info();
    let checkpoint = if checkpoint_info.data_is_empty() {
        0
    } else {
        Account::<LossCheckpoint>::try_from(Box::leak(Box::new(checkpoint_info)))?.checkpoint
    };

    let pending = tracker
        .pending_for(checkpoint, pledge)
        .ok_or(LossError::MathOverflow)?;
    Ok(pending)
}
