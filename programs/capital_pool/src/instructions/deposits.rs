// programs/capital_pool/src/instructions/deposits.rs
//
// Underwriter capital flows. Every entry point here is reached through the
// orchestrator, which realizes pending losses and resyncs pledges around
// the call. The underwriter signs the outer transaction.
//
// Withdrawal lifecycle per account:
//   NoRequest -> Requested(t) -> { Executed | Cancelled }

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount};
use crate::state::{CapitalPoolConfig, UnderwriterAccount, VaultAuthority, WithdrawalReceipt, YieldAdapter};
use crate::events::{Deposited, WithdrawalExecuted, WithdrawalRequestCancelled, WithdrawalRequested};
use crate::errors::CapitalError;
use super::adapters::transfer_from_vault;

// =============================================================================
// DEPOSIT
// =============================================================================

#[derive(Accounts)]
#[instruction(amount: u64, yield_choice: u8)]
pub struct Deposit<'info> {
    #[account(
        mut,
        seeds = [CapitalPoolConfig::SEED_PREFIX],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, CapitalPoolConfig>>,

    #[account(
        init_if_needed,
        payer = underwriter,
        space = 8 + UnderwriterAccount::INIT_SPACE,
        seeds = [UnderwriterAccount::SEED_PREFIX, underwriter.key().as_ref()],
        bump
    )]
    pub underwriter_account: Box<Account<'info, UnderwriterAccount>>,

    #[account(
        mut,
        seeds = [YieldAdapter::SEED_PREFIX, &[yield_choice]],
        bump = yield_adapter.bump,
        constraint = yield_adapter.is_active @ CapitalError::AdapterNotConfigured
    )]
    pub yield_adapter: Box<Account<'info, YieldAdapter>>,

    #[account(
        mut,
        constraint = adapter_vault.key() == yield_adapter.vault @ CapitalError::InvalidAdapterAccount
    )]
    pub adapter_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = underwriter_token.owner == underwriter.key() @ CapitalError::InvalidTokenAccount,
        constraint = underwriter_token.mint == config.asset_mint @ CapitalError::InvalidTokenAccount
    )]
    pub underwriter_token: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub underwriter: Signer<'info>,

    #[account(
        constraint = orchestrator.key() == config.orchestrator @ CapitalError::Unauthorized
    )]
    pub orchestrator: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

/// Mint shares for `amount` and forward the funds to the chosen adapter.
/// Returns the shares minted.
pub fn deposit(ctx: Context<Deposit>, amount: u64, yield_choice: u8) -> Result<u64> {
    let clock = Clock::get()?;
    let underwriter = ctx.accounts.underwriter.key();

    let account = &mut ctx.accounts.underwriter_account;
    if !account.is_initialized() {
        account.owner = underwriter;
        account.created_at = clock.unix_timestamp;
        account.bump = ctx.bumps.underwriter_account;
    }

    let shares = account.record_deposit(&mut ctx.accounts.config, amount, yield_choice)?;

    let adapter = &mut ctx.accounts.yield_adapter;
    adapter.total_deposited = adapter
        .total_deposited
        .checked_add(amount)
        .ok_or(CapitalError::MathOverflow)?;

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            token::Transfer {
                from: ctx.accounts.underwriter_token.to_account_info(),
                to: ctx.accounts.adapter_vault.to_account_info(),
                authority: ctx.accounts.underwriter.to_account_info(),
            },
        ),
        amount,
    )?;

    emit!(Deposited {
        underwriter,
        amount,
        shares_minted: shares,
        yield_choice,
        timestamp: clock.unix_timestamp,
    });

    Ok(shares)
}

// =============================================================================
// REQUEST / CANCEL
// =============================================================================

/// Shared context for request and cancel
#[derive(Accounts)]
pub struct UpdateWithdrawalRequest<'info> {
    #[account(
        seeds = [CapitalPoolConfig::SEED_PREFIX],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, CapitalPoolConfig>>,

    #[account(
        mut,
        seeds = [UnderwriterAccount::SEED_PREFIX, underwriter.key().as_ref()],
        bump = underwriter_account.bump,
    )]
    pub underwriter_account: Box<Account<'info, UnderwriterAccount>>,

    pub underwriter: Signer<'info>,

    #[account(
        constraint = orchestrator.key() == config.orchestrator @ CapitalError::Unauthorized
    )]
    pub orchestrator: Signer<'info>,
}

/// Record a withdrawal request. Returns the current value of the shares,
/// which the orchestrator reserves in each pledged pool.
pub fn request_withdrawal(ctx: Context<UpdateWithdrawalRequest>, shares: u64) -> Result<u64> {
    let clock = Clock::get()?;
    let config = &ctx.accounts.config;
    let account = &mut ctx.accounts.underwriter_account;

    let value = account.request_withdrawal(config, shares, clock.unix_timestamp)?;
    let ready_at = account
        .withdrawal_status()
        .ready_at(config.notice_period_secs)
        .ok_or(CapitalError::MathOverflow)?;

    emit!(WithdrawalRequested {
        underwriter: account.owner,
        shares,
        value,
        ready_at,
        timestamp: clock.unix_timestamp,
    });

    Ok(value)
}

/// Returns the shares the cancelled request held
pub fn cancel_withdrawal_request(ctx: Context<UpdateWithdrawalRequest>) -> Result<u64> {
    let account = &mut ctx.accounts.underwriter_account;
    let shares = account.cancel_withdrawal()?;

    emit!(WithdrawalRequestCancelled {
        underwriter: account.owner,
        shares,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(shares)
}

// =============================================================================
// EXECUTE
// =============================================================================

#[derive(Accounts)]
pub struct ExecuteWithdrawal<'info> {
    #[account(
        mut,
        seeds = [CapitalPoolConfig::SEED_PREFIX],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, CapitalPoolConfig>>,

    #[account(
        seeds = [VaultAuthority::SEED_PREFIX],
        bump = vault_authority.bump,
    )]
    pub vault_authority: Box<Account<'info, VaultAuthority>>,

    #[account(
        mut,
        seeds = [UnderwriterAccount::SEED_PREFIX, underwriter.key().as_ref()],
        bump = underwriter_account.bump,
    )]
    pub underwriter_account: Box<Account<'info, UnderwriterAccount>>,

    #[account(
        mut,
        seeds = [YieldAdapter::SEED_PREFIX, &[yield_adapter.yield_choice]],
        bump = yield_adapter.bump,
    )]
    pub yield_adapter: Box<Account<'info, YieldAdapter>>,

    #[account(
        mut,
        constraint = adapter_vault.key() == yield_adapter.vault @ CapitalError::InvalidAdapterAccount
    )]
    pub adapter_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = idle_vault.key() == vault_authority.idle_vault @ CapitalError::InvalidAdapterAccount
    )]
    pub idle_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = underwriter_token.owner == underwriter.key() @ CapitalError::InvalidTokenAccount,
        constraint = underwriter_token.mint == config.asset_mint @ CapitalError::InvalidTokenAccount
    )]
    pub underwriter_token: Box<Account<'info, TokenAccount>>,

    pub underwriter: Signer<'info>,

    #[account(
        constraint = orchestrator.key() == config.orchestrator @ CapitalError::Unauthorized
    )]
    pub orchestrator: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

/// Burn the requested shares and pay their value, idle balance first.
pub fn execute_withdrawal(ctx: Context<ExecuteWithdrawal>) -> Result<WithdrawalReceipt> {
    let clock = Clock::get()?;

    if let Some(choice) = ctx.accounts.underwriter_account.yield_choice {
        require!(
            choice == ctx.accounts.yield_adapter.yield_choice,
            CapitalError::InvalidAdapterAccount
        );
    }

    let receipt = ctx
        .accounts
        .underwriter_account
        .execute_withdrawal(&mut ctx.accounts.config, clock.unix_timestamp)?;

    let from_idle = receipt.value.min(ctx.accounts.idle_vault.amount);
    let from_adapter = receipt.value - from_idle;
    require!(
        ctx.accounts.adapter_vault.amount >= from_adapter,
        CapitalError::InsufficientLiquidity
    );

    let adapter = &mut ctx.accounts.yield_adapter;
    adapter.total_withdrawn = adapter.total_withdrawn.saturating_add(from_adapter);

    if from_idle > 0 {
        transfer_from_vault(
            &ctx.accounts.vault_authority,
            ctx.accounts.idle_vault.to_account_info(),
            ctx.accounts.underwriter_token.to_account_info(),
            ctx.accounts.token_program.to_account_info(),
            from_idle,
        )?;
    }
    if from_adapter > 0 {
        transfer_from_vault(
            &ctx.accounts.vault_authority,
            ctx.accounts.adapter_vault.to_account_info(),
            ctx.accounts.underwriter_token.to_account_info(),
            ctx.accounts.token_program.to_account_info(),
            from_adapter,
        )?;
    }

    emit!(WithdrawalExecuted {
        underwriter: ctx.accounts.underwriter.key(),
        shares_burned: receipt.shares_burned,
        value: receipt.value,
        principal_removed: receipt.principal_removed,
        is_full: receipt.is_full,
        timestamp: clock.unix_timestamp,
    });

    Ok(receipt)
}
