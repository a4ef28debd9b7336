// programs/capital_pool/src/instructions/payouts.rs
//
// Claim payouts. Funds are gathered from every adapter the pool holds capital
// in, pro rata to the registry's per-adapter allocation, into the idle vault,
// then paid to the claimant and the pool's fee recipient.
//
// The payout is booked in unrealized_payouts until each pledger's share is
// realized as a loss against their account.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::state::{plan_gather, AdapterCapital, CapitalPoolConfig, VaultAuthority};
use crate::events::PayoutExecuted;
use crate::errors::CapitalError;
use super::adapters::{load_adapter_pair, transfer_from_vault};

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct PayoutParams {
    pub claimant_amount: u64,
    pub fee_amount: u64,
    /// claimant_amount + fee_amount
    pub total_capital_from_pool: u64,
    /// Pool capital per adapter, in the order of the remaining account pairs
    pub capital_per_adapter: Vec<AdapterCapital>,
}

/// remaining_accounts: (yield_adapter, adapter_vault) per capital_per_adapter entry
#[derive(Accounts)]
pub struct ExecutePayout<'info> {
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
        constraint = idle_vault.key() == vault_authority.idle_vault @ CapitalError::InvalidAdapterAccount
    )]
    pub idle_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = claimant_token.mint == config.asset_mint @ CapitalError::InvalidTokenAccount
    )]
    pub claimant_token: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = fee_token.mint == config.asset_mint @ CapitalError::InvalidTokenAccount
    )]
    pub fee_token: Box<Account<'info, TokenAccount>>,

    #[account(
        constraint = orchestrator.key() == config.orchestrator @ CapitalError::Unauthorized
    )]
    pub orchestrator: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn execute_payout<'info>(
    ctx: Context<'_, '_, '_, 'info, ExecutePayout<'info>>,
    params: PayoutParams,
) -> Result<()> {
    let total = params.total_capital_from_pool;
    require!(total > 0, CapitalError::InvalidAmount);
    require!(
        params.claimant_amount.checked_add(params.fee_amount) == Some(total),
        CapitalError::InvalidAmount
    );

    let parts = plan_gather(total, &params.capital_per_adapter)
        .ok_or(CapitalError::PayoutExceedsPoolCapital)?;

    let remaining = ctx.remaining_accounts;
    require!(
        remaining.len() == params.capital_per_adapter.len() * 2,
        CapitalError::InvalidAdapterAccount
    );

    let config = &mut ctx.accounts.config;
    config.unrealized_payouts = config
        .unrealized_payouts
        .checked_add(total)
        .ok_or(CapitalError::MathOverflow)?;

    let mut gathered = 0u64;
    for ((pair, entry), part) in remaining
        .chunks(2)
        .zip(params.capital_per_adapter.iter())
        .zip(parts.iter())
    {
        let (adapter, vault) = load_adapter_pair(&pair[0], &pair[1])?;
        require!(
            adapter.yield_choice == entry.yield_choice,
            CapitalError::InvalidAdapterAccount
        );

        let take = (*part).min(vault.amount);
        if take == 0 {
            continue;
        }
        transfer_from_vault(
            &ctx.accounts.vault_authority,
            pair[1].clone(),
            ctx.accounts.idle_vault.to_account_info(),
            ctx.accounts.token_program.to_account_info(),
            take,
        )?;
        gathered = gathered.checked_add(take).ok_or(CapitalError::MathOverflow)?;
    }

    require!(gathered >= total, CapitalError::InsufficientFundsGathered);

    if params.claimant_amount > 0 {
        transfer_from_vault(
            &ctx.accounts.vault_authority,
            ctx.accounts.idle_vault.to_account_info(),
            ctx.accounts.claimant_token.to_account_info(),
            ctx.accounts.token_program.to_account_info(),
            params.claimant_amount,
        )?;
    }
    if params.fee_amount > 0 {
        transfer_from_vault(
            &ctx.accounts.vault_authority,
            ctx.accounts.idle_vault.to_account_info(),
            ctx.accounts.fee_token.to_account_info(),
            ctx.accounts.token_program.to_account_info(),
            params.fee_amount,
        )?;
    }

    emit!(PayoutExecuted {
        claimant_destination: ctx.accounts.claimant_token.key(),
        claimant_amount: params.claimant_amount,
        fee_destination: ctx.accounts.fee_token.key(),
        fee_amount: params.fee_amount,
        total_capital_from_pool: total,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
