// programs/pool_registry/src/instructions/allocation.rs
//
// Orchestrator-only pool bookkeeping: pledged capital per adapter,
// pending-withdrawal reservations and coverage sold.

use anchor_lang::prelude::*;
use crate::state::{PoolState, RegistryConfig};
use crate::events::{CapitalAllocationUpdated, CoverageSoldUpdated, PendingWithdrawalUpdated};
use crate::errors::RegistryError;

/// Shared context for every orchestrator-gated pool mutation
#[derive(Accounts)]
#[instruction(pool_id: u64)]
pub struct UpdatePool<'info> {
    #[account(
        seeds = [RegistryConfig::SEED_PREFIX],
        bump = registry_config.bump,
        constraint = registry_config.is_valid_pool_id(pool_id) @ RegistryError::InvalidPoolId
    )]
    pub registry_config: Account<'info, RegistryConfig>,

    #[account(
        mut,
        seeds = [PoolState::SEED_PREFIX, &pool_id.to_le_bytes()],
        bump = pool_state.bump,
    )]
    pub pool_state: Account<'info, PoolState>,

    #[account(
        constraint = orchestrator.key() == registry_config.orchestrator @ RegistryError::Unauthorized
    )]
    pub orchestrator: Signer<'info>,
}

// =============================================================================
// CAPITAL ALLOCATION
// =============================================================================

pub fn update_capital_allocation(
    ctx: Context<UpdatePool>,
    pool_id: u64,
    yield_choice: u8,
    amount: u64,
    is_allocation: bool,
) -> Result<()> {
    let pool = &mut ctx.accounts.pool_state;

    if is_allocation {
        pool.total_capital_pledged = pool
            .total_capital_pledged
            .checked_add(amount)
            .ok_or(RegistryError::MathOverflow)?;
        pool.add_adapter_capital(yield_choice, amount)
            .ok_or(RegistryError::AdapterLimitReached)?;
    } else {
        pool.total_capital_pledged = pool.total_capital_pledged.saturating_sub(amount);
        pool.remove_adapter_capital(yield_choice, amount);
    }

    emit!(CapitalAllocationUpdated {
        pool_id,
        yield_choice,
        amount,
        is_allocation,
        total_capital_pledged: pool.total_capital_pledged,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

// =============================================================================
// PENDING WITHDRAWAL
// =============================================================================

pub fn update_capital_pending_withdrawal(
    ctx: Context<UpdatePool>,
    pool_id: u64,
    amount: u64,
    is_request: bool,
) -> Result<()> {
    let pool = &mut ctx.accounts.pool_state;

    pool.capital_pending_withdrawal = if is_request {
        pool.capital_pending_withdrawal
            .checked_add(amount)
            .ok_or(RegistryError::MathOverflow)?
    } else {
        pool.capital_pending_withdrawal.saturating_sub(amount)
    };

    emit!(PendingWithdrawalUpdated {
        pool_id,
        amount,
        is_request,
        capital_pending_withdrawal: pool.capital_pending_withdrawal,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

// =============================================================================
// COVERAGE SOLD
// =============================================================================

pub fn update_coverage_sold(
    ctx: Context<UpdatePool>,
    pool_id: u64,
    amount: u64,
    is_sale: bool,
) -> Result<()> {
    let pool = &mut ctx.accounts.pool_state;

    pool.total_coverage_sold = if is_sale {
        pool.total_coverage_sold
            .checked_add(amount)
            .ok_or(RegistryError::MathOverflow)?
    } else {
        pool.total_coverage_sold.saturating_sub(amount)
    };

    emit!(CoverageSoldUpdated {
        pool_id,
        amount,
        is_sale,
        total_coverage_sold: pool.total_coverage_sold,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
