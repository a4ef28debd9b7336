// programs/reward_distributor/src/instructions/distribution.rs
//
// Reward Accrual
// ==============
// The orchestrator moves tokens into the mint's reward vault, then calls
// distribute to bump the pool's stream. Underwriters settle lazily: every
// pledge change goes through update_user_state at the old pledge first.

use anchor_lang::prelude::*;
use crate::state::{PoolRewards, RewardConfig, UnderwriterRewards};
use crate::events::RewardDistributed;
use crate::errors::RewardError;

// =============================================================================
// DISTRIBUTE
// =============================================================================

#[derive(Accounts)]
#[instruction(pool_id: u64)]
pub struct Distribute<'info> {
    #[account(
        seeds = [RewardConfig::SEED_PREFIX],
        bump = reward_config.bump,
    )]
    pub reward_config: Account<'info, RewardConfig>,

    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + PoolRewards::INIT_SPACE,
        seeds = [PoolRewards::SEED_PREFIX, &pool_id.to_le_bytes()],
        bump
    )]
    pub pool_rewards: Account<'info, PoolRewards>,

    #[account(
        constraint = orchestrator.key() == reward_config.orchestrator @ RewardError::Unauthorized
    )]
    pub orchestrator: Signer<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn distribute(
    ctx: Context<Distribute>,
    pool_id: u64,
    mint: Pubkey,
    amount: u64,
    total_pledge: u64,
) -> Result<()> {
    let pool = &mut ctx.accounts.pool_rewards;
    pool.pool_id = pool_id;
    pool.bump = ctx.bumps.pool_rewards;

    if !pool.record_reward(mint, amount, total_pledge)? {
        msg!("Reward of {} for pool {} skipped: no pledge", amount, pool_id);
        return Ok(());
    }

    let reward_per_pledge = pool
        .stream(&mint)
        .map(|s| s.reward_per_pledge)
        .unwrap_or_default();

    emit!(RewardDistributed {
        pool_id,
        mint,
        amount,
        total_pledge,
        reward_per_pledge,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

// =============================================================================
// UPDATE USER STATE
// =============================================================================

#[derive(Accounts)]
#[instruction(underwriter: Pubkey, pool_id: u64)]
pub struct UpdateUserState<'info> {
    #[account(
        seeds = [RewardConfig::SEED_PREFIX],
        bump = reward_config.bump,
    )]
    pub reward_config: Account<'info, RewardConfig>,

    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + PoolRewards::INIT_SPACE,
        seeds = [PoolRewards::SEED_PREFIX, &pool_id.to_le_bytes()],
        bump
    )]
    pub pool_rewards: Account<'info, PoolRewards>,

    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + UnderwriterRewards::INIT_SPACE,
        seeds = [UnderwriterRewards::SEED_PREFIX, underwriter.as_ref(), &pool_id.to_le_bytes()],
        bump
    )]
    pub underwriter_rewards: Account<'info, UnderwriterRewards>,

    #[account(
        constraint = orchestrator.key() == reward_config.orchestrator @ RewardError::Unauthorized
    )]
    pub orchestrator: Signer<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// Settle every stream at the pledge in force before a change
pub fn update_user_state(
    ctx: Context<UpdateUserState>,
    underwriter: Pubkey,
    pool_id: u64,
    pledge: u64,
) -> Result<()> {
    let pool = &mut ctx.accounts.pool_rewards;
    pool.pool_id = pool_id;
    pool.bump = ctx.bumps.pool_rewards;

    let rewards = &mut ctx.accounts.underwriter_rewards;
    if !rewards.is_initialized() {
        rewards.underwriter = underwriter;
        rewards.pool_id = pool_id;
        rewards.bump = ctx.bumps.underwriter_rewards;
    }

    rewards.accrue_all(pool, pledge)?;
    Ok(())
}

// =============================================================================
// VIEWS
// =============================================================================

/// Pool streams and checkpoints may not exist yet; both then count as zero.
#[derive(Accounts)]
#[instruction(underwriter: Pubkey, pool_id: u64)]
pub struct PendingRewards<'info> {
    /// CHECK: address fixed by seeds, deserialized only when created
    #[account(
        seeds = [PoolRewards::SEED_PREFIX, &pool_id.to_le_bytes()],
        bump,
    )]
    pub pool_rewards: UncheckedAccount<'info>,

    /// CHECK: address fixed by seeds, deserialized only when created
    #[account(
        seeds = [UnderwriterRewards::SEED_PREFIX, underwriter.as_ref(), &pool_id.to_le_bytes()],
        bump,
    )]
    pub underwriter_rewards: UncheckedAccount<'info>,
}

pub fn pending_rewards(
    ctx: Context<PendingRewards>,
    _underwriter: Pubkey,
    _pool_id: u64,
    mint: Pubkey,
    pledge: u64,
) -> Result<u64> {
    let pool_info = ctx.accounts.pool_rewards.to_account_info();
    if pool_info.data_is_empty() {
        return Ok(0);
    }
    let pool = Account::<PoolRewards>::try_from(Box::leak(Box::new(pool_info)))?;

    let rewards_info = ctx.accounts.underwriter_rewards.to_account_info();
    let rewards = if rewards_info.data_is_empty() {
        UnderwriterRewards::default()
    } else {
        Account::<UnderwriterRewards>::try_from(Box::leak(Box::new(rewards_info)))?.into_inner()
    };

    let pending = rewards
        .pending(&pool, &mint, pledge)
        .ok_or(RewardError::MathOverflow)?;
    Ok(pending)
}
