// programs/risk_manager/src/instructions/capital.rs
//
// Underwriter capital flows, wrapped around the capital pool:
//   settle losses and rewards -> capital pool call -> resync pledges
//
// remaining_accounts: one pool group per pledge (see ledger.rs),
// except cancel which takes one pool_state per pledge.

use anchor_lang::prelude::*;
use crate::state::{withdrawal_reservation, UnderwriterPosition};
use crate::events::{CapitalDeposited, WithdrawalRequestApproved, WithdrawalRequestReleased, WithdrawalSettled};
use crate::errors::RiskError;
use super::ledger::*;

// =============================================================================
// DEPOSIT
// =============================================================================

#[derive(Accounts)]
pub struct DepositCapital<'info> {
    pub ledger: Ledger<'info>,

    #[account(
        init_if_needed,
        payer = underwriter,
        space = 8 + UnderwriterPosition::INIT_SPACE,
        seeds = [UnderwriterPosition::SEED_PREFIX, underwriter.key().as_ref()],
        bump
    )]
    pub position: Box<Account<'info, UnderwriterPosition>>,

    /// CHECK: capital pool share account, created there on first deposit
    #[account(mut)]
    pub underwriter_account: UncheckedAccount<'info>,

    /// CHECK: validated by the capital pool
    #[account(mut)]
    pub yield_adapter: UncheckedAccount<'info>,

    /// CHECK: validated by the capital pool
    #[account(mut)]
    pub adapter_vault: UncheckedAccount<'info>,

    /// CHECK: validated by the capital pool
    #[account(mut)]
    pub underwriter_token: UncheckedAccount<'info>,

    #[account(mut)]
    pub underwriter: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn deposit<'info>(
    ctx: Context<'_, '_, '_, 'info, DepositCapital<'info>>,
    amount: u64,
    yield_choice: u8,
) -> Result<()> {
    require!(amount > 0, RiskError::InvalidAmount);

    let underwriter = ctx.accounts.underwriter.key();
    let payer = ctx.accounts.underwriter.to_account_info();
    let underwriter_account = ctx.accounts.underwriter_account.to_account_info();

    let ledger = &ctx.accounts.ledger;
    let position = &mut ctx.accounts.position;
    if !position.is_initialized() {
        position.underwriter = underwriter;
        position.bump = ctx.bumps.position;
    }
    require!(
        position.pledges.iter().all(|p| p.yield_choice == yield_choice),
        RiskError::YieldChoiceMismatch
    );

    let groups = pool_groups(ctx.remaining_accounts, position.pledges.len())?;
    settle_underwriter(ledger, &payer, underwriter, &underwriter_account, position, &groups, false)?;

    let shares = ledger.cpi_deposit(
        capital_pool::cpi::accounts::Deposit {
            config: ledger.capital_config.to_account_info(),
            underwriter_account: underwriter_account.clone(),
            yield_adapter: ctx.accounts.yield_adapter.to_account_info(),
            adapter_vault: ctx.accounts.adapter_vault.to_account_info(),
            underwriter_token: ctx.accounts.underwriter_token.to_account_info(),
            underwriter: payer.clone(),
            orchestrator: ledger.orchestrator.to_account_info(),
            token_program: ledger.token_program.to_account_info(),
            system_program: ledger.system_program.to_account_info(),
        },
        amount,
        yield_choice,
    )?;

    position.grow_all(amount).ok_or(RiskError::MathOverflow)?;
    let mut grown: u8 = 0;
    for (pledge, group) in position.pledges.iter().zip(groups.iter()) {
        if !pledge.status.is_active() {
            continue;
        }
        ledger.cpi_update_capital_allocation(
            &group.pool_state,
            pledge.pool_id,
            pledge.yield_choice,
            amount,
            true,
        )?;
        grown += 1;
    }

    emit!(CapitalDeposited {
        underwriter,
        amount,
        shares,
        yield_choice,
        pledges_grown: grown,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

// =============================================================================
// WITHDRAWAL REQUESTS
// =============================================================================

#[derive(Accounts)]
pub struct UpdateWithdrawal<'info> {
    pub ledger: Ledger<'info>,

    #[account(
        mut,
        seeds = [UnderwriterPosition::SEED_PREFIX, underwriter.key().as_ref()],
        bump = position.bump,
    )]
    pub position: Box<Account<'info, UnderwriterPosition>>,

    /// CHECK: validated by the capital pool
    #[account(mut)]
    pub underwriter_account: UncheckedAccount<'info>,

    #[account(mut)]
    pub underwriter: Signer<'info>,
}

/// Start the notice period for `shares`. Each pledged pool must be able to
/// release the matching pledge without leaving coverage sold uncovered.
pub fn request_withdrawal<'info>(
    ctx: Context<'_, '_, '_, 'info, UpdateWithdrawal<'info>>,
    shares: u64,
) -> Result<()> {
    require!(shares > 0, RiskError::InvalidAmount);

    let underwriter = ctx.accounts.underwriter.key();
    let payer = ctx.accounts.underwriter.to_account_info();
    let underwriter_account = ctx.accounts.underwriter_account.to_account_info();
    let groups = pool_groups(ctx.remaining_accounts, ctx.accounts.position.pledges.len())?;

    settle_underwriter(
        &ctx.accounts.ledger,
        &payer,
        underwriter,
        &underwriter_account,
        &mut ctx.accounts.position,
        &groups,
        false,
    )?;

    // Losses just charged changed the share price
    ctx.accounts.ledger.capital_config.reload()?;
    let value = ctx
        .accounts
        .ledger
        .capital_config
        .shares_to_value(shares)
        .ok_or(RiskError::MathOverflow)?;

    let ledger = &ctx.accounts.ledger;
    let position = &mut ctx.accounts.position;

    let mut reservations = Vec::with_capacity(position.pledges.len());
    for (pledge, group) in position.pledges.iter().zip(groups.iter()) {
        let pool = group.load_pool(pledge.pool_id)?;
        let amount = withdrawal_reservation(pledge, value);
        require!(pool.can_release(amount), RiskError::RejectedByOrchestrator);
        reservations.push(amount);
    }

    let requested_value = ledger.cpi_request_withdrawal(&underwriter_account, &payer, shares)?;

    for ((pledge, group), amount) in position
        .pledges
        .iter_mut()
        .zip(groups.iter())
        .zip(reservations)
    {
        ledger.cpi_update_pending_withdrawal(&group.pool_state, pledge.pool_id, amount, true)?;
        pledge.withdrawal_reserved = amount;
    }

    emit!(WithdrawalRequestApproved {
        underwriter,
        shares,
        value: requested_value,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

/// remaining_accounts: one pool_state per pledge
pub fn cancel_withdrawal_request<'info>(
    ctx: Context<'_, '_, '_, 'info, UpdateWithdrawal<'info>>,
) -> Result<()> {
    let underwriter = ctx.accounts.underwriter.key();
    let payer = ctx.accounts.underwriter.to_account_info();
    let underwriter_account = ctx.accounts.underwriter_account.to_account_info();

    let ledger = &ctx.accounts.ledger;
    let position = &mut ctx.accounts.position;
    require!(
        ctx.remaining_accounts.len() == position.pledges.len(),
        RiskError::InvalidRemainingAccounts
    );

    let shares = ledger.cpi_cancel_withdrawal_request(&underwriter_account, &payer)?;

    for (pledge, pool_state) in position.pledges.iter_mut().zip(ctx.remaining_accounts.iter()) {
        let pool = load_pool_state(pool_state)?;
        require!(pool.pool_id == pledge.pool_id, RiskError::PoolAccountMismatch);

        let reserved = std::mem::take(&mut pledge.withdrawal_reserved);
        ledger.cpi_update_pending_withdrawal(pool_state, pledge.pool_id, reserved, false)?;
    }

    emit!(WithdrawalRequestReleased {
        underwriter,
        shares,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

// =============================================================================
// EXECUTE WITHDRAWAL
// =============================================================================

#[derive(Accounts)]
pub struct ExecuteWithdrawal<'info> {
    pub ledger: Ledger<'info>,

    #[account(
        mut,
        seeds = [UnderwriterPosition::SEED_PREFIX, underwriter.key().as_ref()],
        bump = position.bump,
    )]
    pub position: Box<Account<'info, UnderwriterPosition>>,

    /// CHECK: validated by the capital pool
    #[account(mut)]
    pub underwriter_account: UncheckedAccount<'info>,

    /// CHECK: validated by the capital pool
    pub vault_authority: UncheckedAccount<'info>,

    /// CHECK: validated by the capital pool
    #[account(mut)]
    pub yield_adapter: UncheckedAccount<'info>,

    /// CHECK: validated by the capital pool
    #[account(mut)]
    pub adapter_vault: UncheckedAccount<'info>,

    /// CHECK: validated by the capital pool
    #[account(mut)]
    pub idle_vault: UncheckedAccount<'info>,

    /// CHECK: validated by the capital pool
    #[account(mut)]
    pub underwriter_token: UncheckedAccount<'info>,

    #[account(mut)]
    pub underwriter: Signer<'info>,
}

/// Pay out a matured request, release its reservations and shrink pledges by
/// the principal removed. Pledges left at zero are dropped.
pub fn execute_withdrawal<'info>(
    ctx: Context<'_, '_, '_, 'info, ExecuteWithdrawal<'info>>,
) -> Result<()> {
    let underwriter = ctx.accounts.underwriter.key();
    let payer = ctx.accounts.underwriter.to_account_info();
    let underwriter_account = ctx.accounts.underwriter_account.to_account_info();

    let ledger = &ctx.accounts.ledger;
    let position = &mut ctx.accounts.position;
    let groups = pool_groups(ctx.remaining_accounts, position.pledges.len())?;

    settle_underwriter(ledger, &payer, underwriter, &underwriter_account, position, &groups, false)?;

    let receipt = ledger.cpi_execute_withdrawal(capital_pool::cpi::accounts::ExecuteWithdrawal {
        config: ledger.capital_config.to_account_info(),
        vault_authority: ctx.accounts.vault_authority.to_account_info(),
        underwriter_account: underwriter_account.clone(),
        yield_adapter: ctx.accounts.yield_adapter.to_account_info(),
        adapter_vault: ctx.accounts.adapter_vault.to_account_info(),
        idle_vault: ctx.accounts.idle_vault.to_account_info(),
        underwriter_token: ctx.accounts.underwriter_token.to_account_info(),
        underwriter: payer.clone(),
        orchestrator: ledger.orchestrator.to_account_info(),
        token_program: ledger.token_program.to_account_info(),
    })?;

    let reductions = position.shrink_all(receipt.principal_removed, receipt.is_full);
    for ((pledge, group), reduction) in position
        .pledges
        .iter_mut()
        .zip(groups.iter())
        .zip(reductions)
    {
        let mut released = std::mem::take(&mut pledge.withdrawal_reserved);
        if pledge.pledge == 0 {
            released = released.saturating_add(std::mem::take(&mut pledge.deallocation_reserved));
        }
        ledger.cpi_update_pending_withdrawal(&group.pool_state, pledge.pool_id, released, false)?;
        ledger.cpi_update_capital_allocation(
            &group.pool_state,
            pledge.pool_id,
            pledge.yield_choice,
            reduction,
            false,
        )?;
    }
    position.remove_empty();

    emit!(WithdrawalSettled {
        underwriter,
        value: receipt.value,
        principal_removed: receipt.principal_removed,
        is_full: receipt.is_full,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
