// programs/capital_pool/src/instructions/ledger.rs

use anchor_lang::prelude::*;
use anchor_spl::token::TokenAccount;
use crate::state::{CapitalPoolConfig, UnderwriterAccount, VaultAuthority};
use crate::events::{LossesApplied, SystemValueSynced};
use crate::errors::CapitalError;
use super::adapters::load_adapter_pair;

// =============================================================================
// YIELD SYNC
// =============================================================================

/// Permissionless. remaining_accounts: (yield_adapter, adapter_vault) pairs
/// covering every active adapter exactly once.
#[derive(Accounts)]
pub struct SyncYield<'info> {
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
        constraint = idle_vault.key() == vault_authority.idle_vault @ CapitalError::InvalidAdapterAccount
    )]
    pub idle_vault: Box<Account<'info, TokenAccount>>,
}

/// Reprice shares against what the adapters and idle vault actually hold.
/// Payouts not yet realized as underwriter losses stay counted so a claim
/// cannot be socialized across every holder by a sync.
pub fn sync_yield_and_adjust_system_value<'info>(
    ctx: Context<'_, '_, '_, 'info, SyncYield<'info>>,
) -> Result<u64> {
    let remaining = ctx.remaining_accounts;
    require!(remaining.len() % 2 == 0, CapitalError::IncompleteAdapterSet);

    let mut seen: Vec<u8> = Vec::with_capacity(remaining.len() / 2);
    let mut held = ctx.accounts.idle_vault.amount;

    for pair in remaining.chunks(2) {
        let (adapter, vault) = load_adapter_pair(&pair[0], &pair[1])?;
        if !adapter.is_active {
            continue;
        }
        require!(
            !seen.contains(&adapter.yield_choice),
            CapitalError::IncompleteAdapterSet
        );
        seen.push(adapter.yield_choice);
        held = held.checked_add(vault.amount).ok_or(CapitalError::MathOverflow)?;
    }

    let config = &mut ctx.accounts.config;
    require!(
        seen.len() == config.active_adapter_count as usize,
        CapitalError::IncompleteAdapterSet
    );

    let clock = Clock::get()?;
    let previous_value = config.total_system_value;
    let new_value = config.synced_value(held).ok_or(CapitalError::MathOverflow)?;
    config.total_system_value = new_value;
    config.last_sync_at = clock.unix_timestamp;

    emit!(SystemValueSynced {
        previous_value,
        new_value,
        idle_balance: ctx.accounts.idle_vault.amount,
        unrealized_payouts: config.unrealized_payouts,
        timestamp: clock.unix_timestamp,
    });

    Ok(new_value)
}

// =============================================================================
// LOSS REALIZATION
// =============================================================================

#[derive(Accounts)]
#[instruction(underwriter: Pubkey)]
pub struct ApplyLosses<'info> {
    #[account(
        mut,
        seeds = [CapitalPoolConfig::SEED_PREFIX],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, CapitalPoolConfig>>,

    #[account(
        mut,
        seeds = [UnderwriterAccount::SEED_PREFIX, underwriter.as_ref()],
        bump = underwriter_account.bump,
    )]
    pub underwriter_account: Box<Account<'info, UnderwriterAccount>>,

    #[account(
        constraint = orchestrator.key() == config.orchestrator @ CapitalError::Unauthorized
    )]
    pub orchestrator: Signer<'info>,
}

/// Charge realized pool losses to one underwriter. Returns the amount applied,
/// which is clamped at the account's principal.
pub fn apply_losses(
    ctx: Context<ApplyLosses>,
    underwriter: Pubkey,
    loss_amount: u64,
    is_withdrawal_realization: bool,
) -> Result<u64> {
    let application = ctx.accounts.underwriter_account.apply_loss(
        &mut ctx.accounts.config,
        loss_amount,
        is_withdrawal_realization,
    )?;

    emit!(LossesApplied {
        underwriter,
        requested: loss_amount,
        applied: application.applied,
        shares_burned: application.shares_burned,
        is_withdrawal_realization,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(application.applied)
}

// =============================================================================
// VIEWS
// =============================================================================

#[derive(Accounts)]
pub struct ReadConfig<'info> {
    #[account(
        seeds = [CapitalPoolConfig::SEED_PREFIX],
        bump = config.bump,
    )]
    pub config: Account<'info, CapitalPoolConfig>,
}

pub fn shares_to_value(ctx: Context<ReadConfig>, shares: u64) -> Result<u64> {
    let value = ctx
        .accounts
        .config
        .shares_to_value(shares)
        .ok_or(CapitalError::MathOverflow)?;
    Ok(value)
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct UnderwriterSnapshot {
    pub master_shares: u64,
    pub share_value: u64,
    pub total_deposited_principal: u64,
    pub yield_choice: Option<u8>,
    pub withdrawal_request_shares: u64,
    pub withdrawal_request_timestamp: i64,
}

#[derive(Accounts)]
#[instruction(underwriter: Pubkey)]
pub struct ReadUnderwriter<'info> {
    #[account(
        seeds = [CapitalPoolConfig::SEED_PREFIX],
        bump = config.bump,
    )]
    pub config: Account<'info, CapitalPoolConfig>,

    #[account(
        seeds = [UnderwriterAccount::SEED_PREFIX, underwriter.as_ref()],
        bump = underwriter_account.bump,
    )]
    pub underwriter_account: Account<'info, UnderwriterAccount>,
}

pub fn get_underwriter_account(
    ctx: Context<ReadUnderwriter>,
    _underwriter: Pubkey,
) -> Result<UnderwriterSnapshot> {
    let account = &ctx.accounts.underwriter_account;
    let share_value = ctx
        .accounts
        .config
        .shares_to_value(account.master_shares)
        .ok_or(CapitalError::MathOverflow)?;

    Ok(UnderwriterSnapshot {
        master_shares: account.master_shares,
        share_value,
        total_deposited_principal: account.total_deposited_principal,
        yield_choice: account.yield_choice,
        withdrawal_request_shares: account.withdrawal_request_shares,
        withdrawal_request_timestamp: account.withdrawal_request_timestamp,
    })
}
