// programs/capital_pool/src/instructions/adapters.rs
//
// Yield adapters are token vaults owned by the vault authority, one per
// yield choice. Held value is the vault balance.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount};
use crate::state::{CapitalPoolConfig, VaultAuthority, YieldAdapter};
use crate::events::{YieldAdapterDeactivated, YieldAdapterRegistered};
use crate::errors::CapitalError;

// =============================================================================
// REGISTER
// =============================================================================

#[derive(Accounts)]
#[instruction(yield_choice: u8)]
pub struct RegisterYieldAdapter<'info> {
    #[account(
        mut,
        seeds = [CapitalPoolConfig::SEED_PREFIX],
        bump = config.bump,
        has_one = owner @ CapitalError::Unauthorized
    )]
    pub config: Box<Account<'info, CapitalPoolConfig>>,

    #[account(
        seeds = [VaultAuthority::SEED_PREFIX],
        bump = vault_authority.bump,
    )]
    pub vault_authority: Box<Account<'info, VaultAuthority>>,

    #[account(
        init,
        payer = owner,
        space = 8 + YieldAdapter::INIT_SPACE,
        seeds = [YieldAdapter::SEED_PREFIX, &[yield_choice]],
        bump
    )]
    pub yield_adapter: Box<Account<'info, YieldAdapter>>,

    #[account(
        init,
        payer = owner,
        token::mint = asset_mint,
        token::authority = vault_authority,
        seeds = [YieldAdapter::VAULT_SEED, &[yield_choice]],
        bump
    )]
    pub adapter_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        constraint = asset_mint.key() == config.asset_mint @ CapitalError::InvalidTokenAccount
    )]
    pub asset_mint: Account<'info, Mint>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn register_yield_adapter(ctx: Context<RegisterYieldAdapter>, yield_choice: u8) -> Result<()> {
    let adapter = &mut ctx.accounts.yield_adapter;
    adapter.yield_choice = yield_choice;
    adapter.vault = ctx.accounts.adapter_vault.key();
    adapter.is_active = true;
    adapter.total_deposited = 0;
    adapter.total_withdrawn = 0;
    adapter.bump = ctx.bumps.yield_adapter;

    let config = &mut ctx.accounts.config;
    config.active_adapter_count = config
        .active_adapter_count
        .checked_add(1)
        .ok_or(CapitalError::MathOverflow)?;

    emit!(YieldAdapterRegistered {
        yield_choice,
        vault: adapter.vault,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

// =============================================================================
// DEACTIVATE
// =============================================================================

#[derive(Accounts)]
pub struct DeactivateYieldAdapter<'info> {
    #[account(
        mut,
        seeds = [CapitalPoolConfig::SEED_PREFIX],
        bump = config.bump,
        has_one = owner @ CapitalError::Unauthorized
    )]
    pub config: Box<Account<'info, CapitalPoolConfig>>,

    #[account(
        seeds = [VaultAuthority::SEED_PREFIX],
        bump = vault_authority.bump,
    )]
    pub vault_authority: Box<Account<'info, VaultAuthority>>,

    #[account(
        mut,
        seeds = [YieldAdapter::SEED_PREFIX, &[yield_adapter.yield_choice]],
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
        constraint = idle_vault.key() == vault_authority.idle_vault @ CapitalError::InvalidAdapterAccount
    )]
    pub idle_vault: Box<Account<'info, TokenAccount>>,

    pub owner: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

/// Retire an adapter and sweep its balance into the idle vault.
/// Swept funds stay in the system value, so share price does not move.
pub fn deactivate_yield_adapter(ctx: Context<DeactivateYieldAdapter>) -> Result<()> {
    let swept = ctx.accounts.adapter_vault.amount;

    let adapter = &mut ctx.accounts.yield_adapter;
    adapter.is_active = false;
    let yield_choice = adapter.yield_choice;

    let config = &mut ctx.accounts.config;
    config.active_adapter_count = config.active_adapter_count.saturating_sub(1);

    if swept > 0 {
        transfer_from_vault(
            &ctx.accounts.vault_authority,
            ctx.accounts.adapter_vault.to_account_info(),
            ctx.accounts.idle_vault.to_account_info(),
            ctx.accounts.token_program.to_account_info(),
            swept,
        )?;
    }

    emit!(YieldAdapterDeactivated {
        yield_choice,
        swept,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

/// Move tokens out of a vault owned by the vault authority
pub(crate) fn transfer_from_vault<'info>(
    vault_authority: &Account<'info, VaultAuthority>,
    from: AccountInfo<'info>,
    to: AccountInfo<'info>,
    token_program: AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    let seeds = &[VaultAuthority::SEED_PREFIX, &[vault_authority.bump]];
    let signer_seeds = &[&seeds[..]];

    token::transfer(
        CpiContext::new_with_signer(
            token_program,
            token::Transfer {
                from,
                to,
                authority: vault_authority.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )
}

/// Load an adapter and its vault from a (yield_adapter, vault) account pair
pub(crate) fn load_adapter_pair(
    adapter_info: &AccountInfo,
    vault_info: &AccountInfo,
) -> Result<(YieldAdapter, TokenAccount)> {
    require_keys_eq!(*adapter_info.owner, crate::ID, CapitalError::InvalidAdapterAccount);
    let adapter = YieldAdapter::try_deserialize(&mut &adapter_info.try_borrow_data()?[..])?;

    require_keys_eq!(vault_info.key(), adapter.vault, CapitalError::InvalidAdapterAccount);
    require_keys_eq!(*vault_info.owner, token::ID, CapitalError::InvalidAdapterAccount);
    let vault = TokenAccount::try_deserialize(&mut &vault_info.try_borrow_data()?[..])?;

    Ok((adapter, vault))
}
