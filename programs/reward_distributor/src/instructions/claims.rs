// programs/reward_distributor/src/instructions/claims.rs

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount};
use crate::state::{PoolRewards, RewardConfig, UnderwriterRewards};
use crate::events::RewardClaimed;
use crate::errors::RewardError;

// =============================================================================
// CLAIM (ORCHESTRATOR, ON BEHALF OF AN UNDERWRITER)
// =============================================================================

#[derive(Accounts)]
#[instruction(underwriter: Pubkey, pool_id: u64)]
pub struct Claim<'info> {
    #[account(
        seeds = [RewardConfig::SEED_PREFIX],
        bump = reward_config.bump,
    )]
    pub reward_config: Box<Account<'info, RewardConfig>>,

    /// CHECK: vault authority PDA
    #[account(
        seeds = [RewardConfig::AUTHORITY_SEED],
        bump = reward_config.authority_bump
    )]
    pub reward_authority: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + PoolRewards::INIT_SPACE,
        seeds = [PoolRewards::SEED_PREFIX, &pool_id.to_le_bytes()],
        bump
    )]
    pub pool_rewards: Box<Account<'info, PoolRewards>>,

    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + UnderwriterRewards::INIT_SPACE,
        seeds = [UnderwriterRewards::SEED_PREFIX, underwriter.as_ref(), &pool_id.to_le_bytes()],
        bump
    )]
    pub underwriter_rewards: Box<Account<'info, UnderwriterRewards>>,

    pub reward_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [RewardConfig::VAULT_SEED, reward_mint.key().as_ref()],
        bump
    )]
    pub reward_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = destination.owner == underwriter @ RewardError::InvalidTokenAccount,
        constraint = destination.mint == reward_mint.key() @ RewardError::InvalidTokenAccount
    )]
    pub destination: Box<Account<'info, TokenAccount>>,

    #[account(
        constraint = orchestrator.key() == reward_config.orchestrator @ RewardError::Unauthorized
    )]
    pub orchestrator: Signer<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

/// Settle and pay everything `underwriter` has earned in `reward_mint` for one pool.
/// Returns the amount paid.
pub fn claim(
    ctx: Context<Claim>,
    underwriter: Pubkey,
    pool_id: u64,
    pledge: u64,
) -> Result<u64> {
    let pool = &mut ctx.accounts.pool_rewards;
    pool.pool_id = pool_id;
    pool.bump = ctx.bumps.pool_rewards;

    let rewards = &mut ctx.accounts.underwriter_rewards;
    if !rewards.is_initialized() {
        rewards.underwriter = underwriter;
        rewards.pool_id = pool_id;
        rewards.bump = ctx.bumps.underwriter_rewards;
    }

    let mint = ctx.accounts.reward_mint.key();
    let amount = rewards.take_claimable(pool, &mint, pledge)?;
    if amount == 0 {
        return Ok(0);
    }

    pay_from_vault(
        &ctx.accounts.reward_config,
        ctx.accounts.reward_authority.to_account_info(),
        &ctx.accounts.reward_vault,
        ctx.accounts.destination.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        amount,
    )?;

    emit!(RewardClaimed {
        beneficiary: underwriter,
        pool_id,
        mint,
        amount,
        destination: ctx.accounts.destination.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(amount)
}

// =============================================================================
// CLAIM FOR RESERVE
// =============================================================================

#[derive(Accounts)]
#[instruction(user: Pubkey, pool_id: u64)]
pub struct ClaimForReserve<'info> {
    #[account(
        seeds = [RewardConfig::SEED_PREFIX],
        bump = reward_config.bump,
    )]
    pub reward_config: Box<Account<'info, RewardConfig>>,

    /// CHECK: vault authority PDA
    #[account(
        seeds = [RewardConfig::AUTHORITY_SEED],
        bump = reward_config.authority_bump
    )]
    pub reward_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [PoolRewards::SEED_PREFIX, &pool_id.to_le_bytes()],
        bump = pool_rewards.bump,
    )]
    pub pool_rewards: Box<Account<'info, PoolRewards>>,

    /// Must already exist: a user who never pledged has nothing to settle
    #[account(
        mut,
        seeds = [UnderwriterRewards::SEED_PREFIX, user.as_ref(), &pool_id.to_le_bytes()],
        bump = underwriter_rewards.bump,
        constraint = underwriter_rewards.underwriter == user @ RewardError::Unauthorized
    )]
    pub underwriter_rewards: Box<Account<'info, UnderwriterRewards>>,

    pub reward_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [RewardConfig::VAULT_SEED, reward_mint.key().as_ref()],
        bump
    )]
    pub reward_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = destination.owner == user @ RewardError::InvalidTokenAccount,
        constraint = destination.mint == reward_mint.key() @ RewardError::InvalidTokenAccount
    )]
    pub destination: Box<Account<'info, TokenAccount>>,

    #[account(
        constraint = reserve.key() == reward_config.reserve @ RewardError::NotReserve
    )]
    pub reserve: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

/// The catastrophe reserve settles `user`'s checkpoint and pays the user.
/// `pledge` is the user's stake as recorded by the reserve.
pub fn claim_for_reserve(
    ctx: Context<ClaimForReserve>,
    user: Pubkey,
    pool_id: u64,
    pledge: u64,
) -> Result<u64> {
    let pool = &mut ctx.accounts.pool_rewards;
    let rewards = &mut ctx.accounts.underwriter_rewards;

    let mint = ctx.accounts.reward_mint.key();
    let amount = rewards.take_claimable(pool, &mint, pledge)?;
    if amount == 0 {
        return Ok(0);
    }

    pay_from_vault(
        &ctx.accounts.reward_config,
        ctx.accounts.reward_authority.to_account_info(),
        &ctx.accounts.reward_vault,
        ctx.accounts.destination.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        amount,
    )?;

    emit!(RewardClaimed {
        beneficiary: user,
        pool_id,
        mint,
        amount,
        destination: ctx.accounts.destination.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(amount)
}

fn pay_from_vault<'info>(
    config: &RewardConfig,
    authority: AccountInfo<'info>,
    vault: &Account<'info, TokenAccount>,
    destination: AccountInfo<'info>,
    token_program: AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    require!(vault.amount >= amount, RewardError::InsufficientVaultBalance);

    let seeds = &[RewardConfig::AUTHORITY_SEED, &[config.authority_bump]];
    let signer_seeds = &[&seeds[..]];

    token::transfer(
        CpiContext::new_with_signer(
            token_program,
            token::Transfer {
                from: vault.to_account_info(),
                to: destination,
                authority,
            },
            signer_seeds,
        ),
        amount,
    )
}
