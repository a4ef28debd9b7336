// programs/risk_manager/src/instructions/claims.rs
//
// Policy manager entry points: claim processing, premium distribution and
// coverage sold bookkeeping.
//
// Claim flow:
//   1. spread the coverage amount as a loss over the pool's pledgers
//   2. release the coverage sold
//   3. book the claimant's distressed asset as a reward to the pledgers
//   4. pay claimant and fee recipient from the pool's adapters, fee first
//   5. cover any shortfall from the reserve vault (orchestrator is delegate)

use anchor_lang::prelude::*;
use anchor_spl::token::{self, TokenAccount, Transfer};
use capital_pool::instructions::PayoutParams;
use pool_registry::state::PoolState;
use reward_distributor::reward_helpers;
use underwriting_core::seeds;
use crate::state::ClaimSplit;
use crate::events::{ClaimProcessed, CoverageSoldUpdated, PremiumDistributed};
use crate::errors::RiskError;
use super::ledger::*;

// =============================================================================
// PROCESS CLAIM
// =============================================================================

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct ProcessClaimParams {
    pub policy_id: u64,
    pub pool_id: u64,
    pub coverage_amount: u64,
}

/// remaining_accounts: (yield_adapter, adapter_vault) per entry of the pool's
/// adapter_allocations, in that order
#[derive(Accounts)]
#[instruction(params: ProcessClaimParams)]
pub struct ProcessClaim<'info> {
    pub ledger: Ledger<'info>,

    #[account(mut)]
    pub policy_manager: Signer<'info>,

    pub claimant: Signer<'info>,

    #[account(
        mut,
        constraint = pool_state.pool_id == params.pool_id @ RiskError::InvalidPoolId
    )]
    pub pool_state: Box<Account<'info, PoolState>>,

    /// CHECK: seeds checked by loss_distributor
    #[account(mut)]
    pub loss_tracker: UncheckedAccount<'info>,

    /// CHECK: seeds checked by reward_distributor
    #[account(mut)]
    pub pool_rewards: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = claimant_distressed_token.owner == claimant.key() @ RiskError::InvalidTokenAccount,
        constraint = claimant_distressed_token.mint == pool_state.protected_asset_mint @ RiskError::InvalidTokenAccount
    )]
    pub claimant_distressed_token: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = distressed_vault.key() == reward_helpers::reward_vault_address(&pool_state.protected_asset_mint)
            @ RiskError::InvalidTokenAccount
    )]
    pub distressed_vault: Box<Account<'info, TokenAccount>>,

    /// CHECK: validated by the capital pool
    pub vault_authority: UncheckedAccount<'info>,

    /// CHECK: validated by the capital pool
    #[account(mut)]
    pub idle_vault: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = claimant_token.owner == claimant.key() @ RiskError::InvalidTokenAccount
    )]
    pub claimant_token: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = fee_token.owner == pool_state.fee_recipient @ RiskError::InvalidTokenAccount
    )]
    pub fee_token: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub reserve_vault: Box<Account<'info, TokenAccount>>,
}

pub fn process_claim<'info>(
    ctx: Context<'_, '_, '_, 'info, ProcessClaim<'info>>,
    params: ProcessClaimParams,
) -> Result<()> {
    let ledger = &ctx.accounts.ledger;
    let config = &ledger.risk_config;
    require_keys_eq!(
        ctx.accounts.policy_manager.key(),
        config.policy_manager,
        RiskError::NotPolicyManager
    );
    require_keys_eq!(
        ctx.accounts.reserve_vault.key(),
        config.reserve_vault,
        RiskError::InvalidTokenAccount
    );
    require!(
        ctx.accounts.claimant_token.mint == ledger.capital_config.asset_mint,
        RiskError::InvalidTokenAccount
    );
    require!(params.coverage_amount > 0, RiskError::InvalidAmount);

    let pool_id = params.pool_id;
    let coverage = params.coverage_amount;
    let pool = &ctx.accounts.pool_state;
    let total_pledge = pool.total_capital_pledged;
    let distressed_mint = pool.protected_asset_mint;
    let capital_per_adapter = adapter_capital(pool);
    let split = ClaimSplit::compute(coverage, pool.claim_fee_bps, pool.total_adapter_capital())
        .ok_or(RiskError::MathOverflow)?;

    let payer = ctx.accounts.policy_manager.to_account_info();
    let pool_state = ctx.accounts.pool_state.to_account_info();

    // Ledger state first
    ledger.cpi_distribute_loss(
        &payer,
        &ctx.accounts.loss_tracker.to_account_info(),
        pool_id,
        coverage,
        total_pledge,
    )?;
    ledger.cpi_update_coverage_sold(&pool_state, pool_id, coverage, false)?;
    if total_pledge > 0 {
        ledger.cpi_distribute_reward(
            &payer,
            &ctx.accounts.pool_rewards.to_account_info(),
            pool_id,
            distressed_mint,
            coverage,
            total_pledge,
        )?;
    }

    // Transfers
    if total_pledge > 0 {
        token::transfer(
            CpiContext::new(
                ledger.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.claimant_distressed_token.to_account_info(),
                    to: ctx.accounts.distressed_vault.to_account_info(),
                    authority: ctx.accounts.claimant.to_account_info(),
                },
            ),
            coverage,
        )?;
    }

    if split.from_pool() > 0 {
        require!(
            ctx.remaining_accounts.len() == capital_per_adapter.len() * 2,
            RiskError::InvalidRemainingAccounts
        );
        ledger.cpi_execute_payout(
            capital_pool::cpi::accounts::ExecutePayout {
                config: ledger.capital_config.to_account_info(),
                vault_authority: ctx.accounts.vault_authority.to_account_info(),
                idle_vault: ctx.accounts.idle_vault.to_account_info(),
                claimant_token: ctx.accounts.claimant_token.to_account_info(),
                fee_token: ctx.accounts.fee_token.to_account_info(),
                orchestrator: ledger.orchestrator.to_account_info(),
                token_program: ledger.token_program.to_account_info(),
            },
            ctx.remaining_accounts.to_vec(),
            PayoutParams {
                claimant_amount: split.pool_to_claimant,
                fee_amount: split.pool_to_fee,
                total_capital_from_pool: split.from_pool(),
                capital_per_adapter,
            },
        )?;
    }

    if split.from_reserve() > 0 {
        let reserve = &ctx.accounts.reserve_vault;
        require!(
            reserve.mint == ledger.capital_config.asset_mint,
            RiskError::InvalidTokenAccount
        );
        require!(
            reserve.delegated_amount >= split.from_reserve() && reserve.amount >= split.from_reserve(),
            RiskError::ReserveShortfall
        );
        draw_from_reserve(
            ledger,
            reserve.to_account_info(),
            ctx.accounts.claimant_token.to_account_info(),
            split.reserve_to_claimant,
        )?;
        draw_from_reserve(
            ledger,
            reserve.to_account_info(),
            ctx.accounts.fee_token.to_account_info(),
            split.reserve_to_fee,
        )?;
    }

    emit!(ClaimProcessed {
        policy_id: params.policy_id,
        pool_id,
        claimant: ctx.accounts.claimant.key(),
        coverage_amount: coverage,
        fee: split.fee,
        paid_from_pool: split.from_pool(),
        paid_from_reserve: split.from_reserve(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!(
        "Claim {} on pool {}: {} from pool, {} from reserve",
        params.policy_id,
        pool_id,
        split.from_pool(),
        split.from_reserve()
    );
    Ok(())
}

/// Spend the orchestrator's delegation on the reserve vault
fn draw_from_reserve<'info>(
    ledger: &Ledger<'info>,
    reserve_vault: AccountInfo<'info>,
    destination: AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    let bump = [ledger.risk_config.orchestrator_bump];
    let orchestrator_seeds: &[&[u8]] = &[seeds::ORCHESTRATOR, &bump];
    let signer_seeds = &[orchestrator_seeds];

    token::transfer(
        CpiContext::new_with_signer(
            ledger.token_program.to_account_info(),
            Transfer {
                from: reserve_vault,
                to: destination,
                authority: ledger.orchestrator.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )
}

// =============================================================================
// PREMIUMS
// =============================================================================

#[derive(Accounts)]
#[instruction(pool_id: u64)]
pub struct DistributePremium<'info> {
    pub ledger: Ledger<'info>,

    #[account(mut)]
    pub policy_manager: Signer<'info>,

    #[account(
        constraint = pool_state.pool_id == pool_id @ RiskError::InvalidPoolId
    )]
    pub pool_state: Box<Account<'info, PoolState>>,

    /// CHECK: seeds checked by reward_distributor
    #[account(mut)]
    pub pool_rewards: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = premium_source.owner == policy_manager.key() @ RiskError::InvalidTokenAccount
    )]
    pub premium_source: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub premium_vault: Box<Account<'info, TokenAccount>>,
}

/// Move premium into the reward vault and spread it over the pool's pledge
pub fn distribute_premium(ctx: Context<DistributePremium>, pool_id: u64, amount: u64) -> Result<()> {
    let ledger = &ctx.accounts.ledger;
    require_keys_eq!(
        ctx.accounts.policy_manager.key(),
        ledger.risk_config.policy_manager,
        RiskError::NotPolicyManager
    );
    require!(amount > 0, RiskError::InvalidAmount);

    let asset_mint = ledger.capital_config.asset_mint;
    require!(
        ctx.accounts.premium_source.mint == asset_mint,
        RiskError::InvalidTokenAccount
    );
    require_keys_eq!(
        ctx.accounts.premium_vault.key(),
        reward_helpers::reward_vault_address(&asset_mint),
        RiskError::InvalidTokenAccount
    );

    let total_pledge = ctx.accounts.pool_state.total_capital_pledged;
    if total_pledge == 0 {
        msg!("Premium for pool {} skipped: no pledge", pool_id);
        return Ok(());
    }

    ledger.cpi_distribute_reward(
        &ctx.accounts.policy_manager.to_account_info(),
        &ctx.accounts.pool_rewards.to_account_info(),
        pool_id,
        asset_mint,
        amount,
        total_pledge,
    )?;

    token::transfer(
        CpiContext::new(
            ledger.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.premium_source.to_account_info(),
                to: ctx.accounts.premium_vault.to_account_info(),
                authority: ctx.accounts.policy_manager.to_account_info(),
            },
        ),
        amount,
    )?;

    emit!(PremiumDistributed {
        pool_id,
        amount,
        total_pledge,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

// =============================================================================
// COVERAGE SOLD
// =============================================================================

#[derive(Accounts)]
#[instruction(pool_id: u64)]
pub struct UpdateCoverage<'info> {
    pub ledger: Ledger<'info>,

    pub policy_manager: Signer<'info>,

    #[account(
        mut,
        constraint = pool_state.pool_id == pool_id @ RiskError::InvalidPoolId
    )]
    pub pool_state: Box<Account<'info, PoolState>>,
}

/// A sale must fit the capital not already sold or reserved for exit
pub fn update_coverage_sold(
    ctx: Context<UpdateCoverage>,
    pool_id: u64,
    amount: u64,
    is_sale: bool,
) -> Result<()> {
    let ledger = &ctx.accounts.ledger;
    require_keys_eq!(
        ctx.accounts.policy_manager.key(),
        ledger.risk_config.policy_manager,
        RiskError::NotPolicyManager
    );
    require!(amount > 0, RiskError::InvalidAmount);

    let pool = &ctx.accounts.pool_state;
    if is_sale {
        require!(!pool.is_paused, RiskError::PoolPaused);
        require!(amount <= pool.available_capital(), RiskError::InsufficientCapacity);
    }

    ledger.cpi_update_coverage_sold(&ctx.accounts.pool_state.to_account_info(), pool_id, amount, is_sale)?;

    emit!(CoverageSoldUpdated {
        pool_id,
        amount,
        is_sale,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
