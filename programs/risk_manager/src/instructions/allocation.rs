// programs/risk_manager/src/instructions/allocation.rs
//
// Pledge lifecycle per pool:
//   Unallocated -> Allocated -> { DeallocationRequested -> Deallocated } | Liquidated
//
// remaining_accounts: one pool group per existing pledge, followed for
// allocate_capital by one group per newly requested pool.

use anchor_lang::prelude::*;
use capital_pool::state::UnderwriterAccount;
use underwriting_core::PledgeStatus;
use crate::state::UnderwriterPosition;
use crate::events::{CapitalAllocated, CapitalDeallocated, DeallocationRequested};
use crate::errors::RiskError;
use super::ledger::*;

#[derive(Accounts)]
pub struct ManageAllocation<'info> {
    pub ledger: Ledger<'info>,

    #[account(
        mut,
        seeds = [UnderwriterPosition::SEED_PREFIX, underwriter.key().as_ref()],
        bump = position.bump,
    )]
    pub position: Box<Account<'info, UnderwriterPosition>>,

    #[account(
        mut,
        constraint = underwriter_account.owner == underwriter.key() @ RiskError::Unauthorized
    )]
    pub underwriter_account: Box<Account<'info, UnderwriterAccount>>,

    #[account(mut)]
    pub underwriter: Signer<'info>,
}

// =============================================================================
// ALLOCATE
// =============================================================================

pub fn allocate_capital<'info>(
    ctx: Context<'_, '_, '_, 'info, ManageAllocation<'info>>,
    pool_ids: Vec<u64>,
) -> Result<()> {
    require!(!pool_ids.is_empty(), RiskError::InvalidAmount);

    let underwriter = ctx.accounts.underwriter.key();
    let payer = ctx.accounts.underwriter.to_account_info();
    let underwriter_account = ctx.accounts.underwriter_account.to_account_info();

    let existing = ctx.accounts.position.pledges.len();
    let groups = pool_groups(ctx.remaining_accounts, existing + pool_ids.len())?;
    let (existing_groups, new_groups) = groups.split_at(existing);

    settle_underwriter(
        &ctx.accounts.ledger,
        &payer,
        underwriter,
        &underwriter_account,
        &mut ctx.accounts.position,
        existing_groups,
        false,
    )?;

    // Principal after the losses just charged
    ctx.accounts.underwriter_account.reload()?;
    let principal = ctx.accounts.underwriter_account.total_deposited_principal;
    let yield_choice = ctx
        .accounts
        .underwriter_account
        .yield_choice
        .ok_or(RiskError::NoCapitalToAllocate)?;

    let ledger = &ctx.accounts.ledger;
    let position = &mut ctx.accounts.position;
    let max_allocations = ledger.risk_config.max_allocations_per_underwriter;
    position.add_pledges(&pool_ids, principal, yield_choice, max_allocations)?;

    let now = Clock::get()?.unix_timestamp;
    for (pool_id, group) in pool_ids.iter().zip(new_groups.iter()) {
        let pool = group.load_pool(*pool_id)?;
        require!(!pool.is_paused, RiskError::PoolPaused);

        // Pin reward and loss checkpoints before the pledge exists
        ledger.cpi_update_user_state(&payer, group, underwriter, *pool_id, 0)?;
        ledger.cpi_realize_losses(&payer, group, underwriter, *pool_id, 0)?;

        ledger.cpi_update_capital_allocation(&group.pool_state, *pool_id, yield_choice, principal, true)?;

        emit!(CapitalAllocated {
            underwriter,
            pool_id: *pool_id,
            pledge: principal,
            yield_choice,
            timestamp: now,
        });
    }

    Ok(())
}

// =============================================================================
// DEALLOCATE
// =============================================================================

/// Reserve the pledge for exit and start the deallocation notice period
pub fn request_deallocate_from_pool<'info>(
    ctx: Context<'_, '_, '_, 'info, ManageAllocation<'info>>,
    pool_id: u64,
) -> Result<()> {
    let underwriter = ctx.accounts.underwriter.key();
    let payer = ctx.accounts.underwriter.to_account_info();
    let underwriter_account = ctx.accounts.underwriter_account.to_account_info();

    let ledger = &ctx.accounts.ledger;
    let position = &mut ctx.accounts.position;
    let index = position
        .pledges
        .iter()
        .position(|p| p.pool_id == pool_id)
        .ok_or(RiskError::NotAllocated)?;
    require!(
        position.pledges[index]
            .status
            .can_transition_to(PledgeStatus::DeallocationRequested),
        RiskError::DeallocationAlreadyRequested
    );

    let groups = pool_groups(ctx.remaining_accounts, position.pledges.len())?;
    settle_underwriter(ledger, &payer, underwriter, &underwriter_account, position, &groups, false)?;

    let group = &groups[index];
    let pool = group.load_pool(pool_id)?;
    let pledge = &mut position.pledges[index];
    let amount = pledge.unreserved();
    require!(pool.can_release(amount), RiskError::RejectedByOrchestrator);

    ledger.cpi_update_pending_withdrawal(&group.pool_state, pool_id, amount, true)?;

    let now = Clock::get()?.unix_timestamp;
    pledge.deallocation_reserved = amount;
    pledge.status = PledgeStatus::DeallocationRequested;
    pledge.deallocation_requested_at = now;

    emit!(DeallocationRequested {
        underwriter,
        pool_id,
        amount,
        ready_at: now.saturating_add(ledger.risk_config.deallocation_notice_secs),
        timestamp: now,
    });

    Ok(())
}

/// Complete a matured deallocation: drop the pledge and its reservations
pub fn deallocate_from_pool<'info>(
    ctx: Context<'_, '_, '_, 'info, ManageAllocation<'info>>,
    pool_id: u64,
) -> Result<()> {
    let underwriter = ctx.accounts.underwriter.key();
    let payer = ctx.accounts.underwriter.to_account_info();
    let underwriter_account = ctx.accounts.underwriter_account.to_account_info();

    let ledger = &ctx.accounts.ledger;
    let position = &mut ctx.accounts.position;
    let index = position
        .pledges
        .iter()
        .position(|p| p.pool_id == pool_id)
        .ok_or(RiskError::NotAllocated)?;

    let now = Clock::get()?.unix_timestamp;
    let pledge = &position.pledges[index];
    require!(
        pledge.status == PledgeStatus::DeallocationRequested,
        RiskError::NoActiveRequest
    );
    require!(
        pledge.is_deallocation_ready(now, ledger.risk_config.deallocation_notice_secs),
        RiskError::NoticePeriodActive
    );

    let groups = pool_groups(ctx.remaining_accounts, position.pledges.len())?;
    settle_underwriter(ledger, &payer, underwriter, &underwriter_account, position, &groups, false)?;

    let group = &groups[index];
    let pledge = position.pledges[index];
    ledger.cpi_update_pending_withdrawal(&group.pool_state, pool_id, pledge.reserved(), false)?;
    ledger.cpi_update_capital_allocation(
        &group.pool_state,
        pool_id,
        pledge.yield_choice,
        pledge.pledge,
        false,
    )?;
    position.remove_pledge(pool_id);

    emit!(CapitalDeallocated {
        underwriter,
        pool_id,
        amount: pledge.pledge,
        timestamp: now,
    });

    Ok(())
}
