// programs/risk_manager/src/instructions/rewards.rs
//
// Reward claims aggregated over several pools.
//
// remaining_accounts, one group per requested pool:
//   [pool_state, pool_rewards, underwriter_rewards, reward_mint, reward_vault, destination]

use anchor_lang::prelude::*;
use crate::state::UnderwriterPosition;
use crate::events::RewardsClaimed;
use crate::errors::RiskError;
use super::ledger::*;

const CLAIM_GROUP_LEN: usize = 6;

#[derive(Accounts)]
pub struct ClaimRewards<'info> {
    pub ledger: Ledger<'info>,

    #[account(
        seeds = [UnderwriterPosition::SEED_PREFIX, underwriter.key().as_ref()],
        bump = position.bump,
    )]
    pub position: Box<Account<'info, UnderwriterPosition>>,

    /// CHECK: reward vault authority, seeds checked by reward_distributor
    pub reward_authority: UncheckedAccount<'info>,

    #[account(mut)]
    pub underwriter: Signer<'info>,
}

/// Claim premium (capital asset) rewards from each pool
pub fn claim_premium_rewards<'info>(
    ctx: Context<'_, '_, '_, 'info, ClaimRewards<'info>>,
    pool_ids: Vec<u64>,
) -> Result<u64> {
    claim_from_pools(ctx, pool_ids, false)
}

/// Claim each pool's distressed asset received from claimants
pub fn claim_distressed_assets<'info>(
    ctx: Context<'_, '_, '_, 'info, ClaimRewards<'info>>,
    pool_ids: Vec<u64>,
) -> Result<u64> {
    claim_from_pools(ctx, pool_ids, true)
}

fn claim_from_pools<'info>(
    ctx: Context<'_, '_, '_, 'info, ClaimRewards<'info>>,
    pool_ids: Vec<u64>,
    distressed: bool,
) -> Result<u64> {
    require!(!pool_ids.is_empty(), RiskError::InvalidAmount);
    require!(
        ctx.remaining_accounts.len() == pool_ids.len() * CLAIM_GROUP_LEN,
        RiskError::InvalidRemainingAccounts
    );

    let ledger = &ctx.accounts.ledger;
    let position = &ctx.accounts.position;
    let underwriter = ctx.accounts.underwriter.key();

    let mut total: u64 = 0;
    for (pool_id, group) in pool_ids.iter().zip(ctx.remaining_accounts.chunks(CLAIM_GROUP_LEN)) {
        let pool = load_pool_state(&group[0])?;
        require!(pool.pool_id == *pool_id, RiskError::PoolAccountMismatch);

        let expected_mint = if distressed {
            pool.protected_asset_mint
        } else {
            ledger.capital_config.asset_mint
        };
        require_keys_eq!(group[3].key(), expected_mint, RiskError::InvalidTokenAccount);

        let paid = ledger.cpi_claim_reward(
            reward_distributor::cpi::accounts::Claim {
                reward_config: ledger.reward_config.to_account_info(),
                reward_authority: ctx.accounts.reward_authority.to_account_info(),
                pool_rewards: group[1].clone(),
                underwriter_rewards: group[2].clone(),
                reward_mint: group[3].clone(),
                reward_vault: group[4].clone(),
                destination: group[5].clone(),
                orchestrator: ledger.orchestrator.to_account_info(),
                payer: ctx.accounts.underwriter.to_account_info(),
                token_program: ledger.token_program.to_account_info(),
                system_program: ledger.system_program.to_account_info(),
            },
            underwriter,
            *pool_id,
            position.pledge_of(*pool_id),
        )?;
        total = total.checked_add(paid).ok_or(RiskError::MathOverflow)?;
    }

    emit!(RewardsClaimed {
        underwriter,
        pools: pool_ids.len() as u8,
        total,
        distressed,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(total)
}
