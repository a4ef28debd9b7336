// programs/risk_manager/src/instructions/liquidation.rs

use anchor_lang::prelude::*;
use capital_pool::state::UnderwriterAccount;
use underwriting_core::PledgeStatus;
use crate::state::{is_insolvent, UnderwriterPosition};
use crate::events::UnderwriterLiquidated;
use crate::errors::RiskError;
use super::ledger::*;

/// remaining_accounts: one pool group per pledge of the liquidated underwriter
#[derive(Accounts)]
#[instruction(underwriter: Pubkey)]
pub struct LiquidateUnderwriter<'info> {
    pub ledger: Ledger<'info>,

    #[account(mut)]
    pub liquidator: Signer<'info>,

    #[account(
        mut,
        seeds = [UnderwriterPosition::SEED_PREFIX, underwriter.as_ref()],
        bump = position.bump,
    )]
    pub position: Box<Account<'info, UnderwriterPosition>>,

    #[account(
        mut,
        constraint = underwriter_account.owner == underwriter @ RiskError::Unauthorized
    )]
    pub underwriter_account: Box<Account<'info, UnderwriterAccount>>,
}

/// Permissionless. Realizes everything pending, forces withdrawal
/// realization and drops every pledge.
pub fn liquidate_insolvent_underwriter<'info>(
    ctx: Context<'_, '_, '_, 'info, LiquidateUnderwriter<'info>>,
    underwriter: Pubkey,
) -> Result<()> {
    let payer = ctx.accounts.liquidator.to_account_info();
    let underwriter_account = ctx.accounts.underwriter_account.to_account_info();
    let shares = ctx.accounts.underwriter_account.master_shares;

    let ledger = &ctx.accounts.ledger;
    let position = &mut ctx.accounts.position;
    let groups = pool_groups(ctx.remaining_accounts, position.pledges.len())?;

    let mut pending: u64 = 0;
    for (pledge, group) in position.pledges.iter().zip(groups.iter()) {
        group.load_pool(pledge.pool_id)?;
        let loss = group.pending_loss(&underwriter, pledge.pool_id, pledge.pledge)?;
        pending = pending.checked_add(loss).ok_or(RiskError::MathOverflow)?;
    }
    let share_value = ledger
        .capital_config
        .shares_to_value(shares)
        .ok_or(RiskError::MathOverflow)?;
    require!(is_insolvent(pending, share_value, shares), RiskError::NotInsolvent);

    let applied = settle_underwriter(ledger, &payer, underwriter, &underwriter_account, position, &groups, true)?;

    for (pledge, group) in position.pledges.iter_mut().zip(groups.iter()) {
        ledger.cpi_update_pending_withdrawal(&group.pool_state, pledge.pool_id, pledge.reserved(), false)?;
        ledger.cpi_update_capital_allocation(
            &group.pool_state,
            pledge.pool_id,
            pledge.yield_choice,
            pledge.pledge,
            false,
        )?;
        pledge.status = PledgeStatus::Liquidated;
    }
    let cleared = position.clear();

    emit!(UnderwriterLiquidated {
        liquidator: payer.key(),
        underwriter,
        losses_applied: applied,
        pools_cleared: cleared.len() as u8,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Underwriter {} liquidated: {} realized", underwriter, applied);
    Ok(())
}
