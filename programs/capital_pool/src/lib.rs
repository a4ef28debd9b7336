// programs/capital_pool/src/lib.rs
//
// Capital Pool Program
// ====================
// The underwriter share ledger:
// - Master shares priced against total system value
// - Deposits forwarded to one yield adapter per underwriter
// - Time-locked withdrawals (request -> notice period -> execute)
// - Yield sync as the only path that reprices every share at once
// - Per-underwriter loss realization and claim payouts
//
// Capital flows and loss realization accept only the orchestrator PDA,
// wired once by the owner after deployment.

use anchor_lang::prelude::*;

pub mod state;
pub mod errors;
pub mod events;
pub mod instructions;

use instructions::*;
use state::WithdrawalReceipt;

declare_id!("9k2XXyRe3fhPUdRLsJfs7Q9GD24DK6nWpiEknimAJk4Q");

#[program]
pub mod capital_pool {
    use super::*;

    // ==================== INITIALIZATION ====================

    pub fn initialize_capital_pool(
        ctx: Context<InitializeCapitalPool>,
        params: InitializeCapitalPoolParams,
    ) -> Result<()> {
        instructions::initialize::initialize_capital_pool(ctx, params)
    }

    /// Wire the orchestrator (owner only, once)
    pub fn set_orchestrator(ctx: Context<UpdateCapitalConfig>, orchestrator: Pubkey) -> Result<()> {
        instructions::initialize::set_orchestrator(ctx, orchestrator)
    }

    pub fn set_notice_period(ctx: Context<UpdateCapitalConfig>, notice_period_secs: i64) -> Result<()> {
        instructions::initialize::set_notice_period(ctx, notice_period_secs)
    }

    // ==================== YIELD ADAPTERS ====================

    pub fn register_yield_adapter(ctx: Context<RegisterYieldAdapter>, yield_choice: u8) -> Result<()> {
        instructions::adapters::register_yield_adapter(ctx, yield_choice)
    }

    pub fn deactivate_yield_adapter(ctx: Context<DeactivateYieldAdapter>) -> Result<()> {
        instructions::adapters::deactivate_yield_adapter(ctx)
    }

    // ==================== UNDERWRITER FLOWS (ORCHESTRATOR) ====================

    pub fn deposit(ctx: Context<Deposit>, amount: u64, yield_choice: u8) -> Result<u64> {
        instructions::deposits::deposit(ctx, amount, yield_choice)
    }

    pub fn request_withdrawal(ctx: Context<UpdateWithdrawalRequest>, shares: u64) -> Result<u64> {
        instructions::deposits::request_withdrawal(ctx, shares)
    }

    pub fn cancel_withdrawal_request(ctx: Context<UpdateWithdrawalRequest>) -> Result<u64> {
        instructions::deposits::cancel_withdrawal_request(ctx)
    }

    pub fn execute_withdrawal(ctx: Context<ExecuteWithdrawal>) -> Result<WithdrawalReceipt> {
        instructions::deposits::execute_withdrawal(ctx)
    }

    // ==================== LEDGER ====================

    /// Permissionless repricing against adapter and idle balances
    pub fn sync_yield_and_adjust_system_value<'info>(
        ctx: Context<'_, '_, '_, 'info, SyncYield<'info>>,
    ) -> Result<u64> {
        instructions::ledger::sync_yield_and_adjust_system_value(ctx)
    }

    pub fn apply_losses(
        ctx: Context<ApplyLosses>,
        underwriter: Pubkey,
        loss_amount: u64,
        is_withdrawal_realization: bool,
    ) -> Result<u64> {
        instructions::ledger::apply_losses(ctx, underwriter, loss_amount, is_withdrawal_realization)
    }

    pub fn execute_payout<'info>(
        ctx: Context<'_, '_, '_, 'info, ExecutePayout<'info>>,
        params: PayoutParams,
    ) -> Result<()> {
        instructions::payouts::execute_payout(ctx, params)
    }

    // ==================== VIEWS ====================

    pub fn shares_to_value(ctx: Context<ReadConfig>, shares: u64) -> Result<u64> {
        instructions::ledger::shares_to_value(ctx, shares)
    }

    pub fn get_underwriter_account(
        ctx: Context<ReadUnderwriter>,
        underwriter: Pubkey,
    ) -> Result<UnderwriterSnapshot> {
        instructions::ledger::get_underwriter_account(ctx, underwriter)
    }
}

/// Public helpers for CPI callers
pub mod capital_helpers {
    use super::*;

    pub fn config_address() -> Pubkey {
        Pubkey::find_program_address(&[state::CapitalPoolConfig::SEED_PREFIX], &ID).0
    }

    pub fn vault_authority_address() -> Pubkey {
        Pubkey::find_program_address(&[state::VaultAuthority::SEED_PREFIX], &ID).0
    }

    pub fn idle_vault_address() -> Pubkey {
        Pubkey::find_program_address(&[state::VaultAuthority::IDLE_VAULT_SEED], &ID).0
    }

    pub fn underwriter_account_address(underwriter: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[state::UnderwriterAccount::SEED_PREFIX, underwriter.as_ref()],
            &ID,
        )
        .0
    }

    pub fn yield_adapter_address(yield_choice: u8) -> Pubkey {
        Pubkey::find_program_address(&[state::YieldAdapter::SEED_PREFIX, &[yield_choice]], &ID).0
    }

    pub fn adapter_vault_address(yield_choice: u8) -> Pubkey {
        Pubkey::find_program_address(&[state::YieldAdapter::VAULT_SEED, &[yield_choice]], &ID).0
    }
}
