// programs/pool_registry/src/lib.rs
//
// Pool Registry Program
// =====================
// Per-pool state store for the underwriting ledger:
// - Pledged capital totals and capital per yield adapter
// - Coverage sold and pending-withdrawal reservations
// - Pause flag (incident reporting) and claim fee recipient
// - Kinked premium rate model
//
// Pool mutations accept exactly one caller: the orchestrator PDA injected
// at initialization. The owner only creates pools and rotates the orchestrator.

use anchor_lang::prelude::*;

pub mod state;
pub mod errors;
pub mod events;
pub mod instructions;

use instructions::*;

declare_id!("AtfYH3j4Cc1QvRCHYFtctiVAjpJMhJ8u2FbPyurwoGt7");

#[program]
pub mod pool_registry {
    use super::*;

    // ==================== INITIALIZATION ====================

    /// Initialize the registry with its orchestrator
    pub fn initialize_registry(ctx: Context<InitializeRegistry>, orchestrator: Pubkey) -> Result<()> {
        instructions::initialize::initialize_registry(ctx, orchestrator)
    }

    /// Rotate the orchestrator (owner only)
    pub fn set_orchestrator(ctx: Context<SetRegistryOrchestrator>, orchestrator: Pubkey) -> Result<()> {
        instructions::initialize::set_orchestrator(ctx, orchestrator)
    }

    /// Create the next pool (owner only)
    pub fn add_pool(ctx: Context<AddPool>, params: AddPoolParams) -> Result<()> {
        instructions::initialize::add_pool(ctx, params)
    }

    // ==================== BOOKKEEPING (ORCHESTRATOR) ====================

    pub fn update_capital_allocation(
        ctx: Context<UpdatePool>,
        pool_id: u64,
        yield_choice: u8,
        amount: u64,
        is_allocation: bool,
    ) -> Result<()> {
        instructions::allocation::update_capital_allocation(ctx, pool_id, yield_choice, amount, is_allocation)
    }

    pub fn update_capital_pending_withdrawal(
        ctx: Context<UpdatePool>,
        pool_id: u64,
        amount: u64,
        is_request: bool,
    ) -> Result<()> {
        instructions::allocation::update_capital_pending_withdrawal(ctx, pool_id, amount, is_request)
    }

    pub fn update_coverage_sold(
        ctx: Context<UpdatePool>,
        pool_id: u64,
        amount: u64,
        is_sale: bool,
    ) -> Result<()> {
        instructions::allocation::update_coverage_sold(ctx, pool_id, amount, is_sale)
    }

    // ==================== GOVERNANCE RELAY (ORCHESTRATOR) ====================

    pub fn set_pause_state(ctx: Context<UpdatePool>, pool_id: u64, is_paused: bool) -> Result<()> {
        instructions::governance::set_pause_state(ctx, pool_id, is_paused)
    }

    pub fn set_fee_recipient(ctx: Context<UpdatePool>, pool_id: u64, fee_recipient: Pubkey) -> Result<()> {
        instructions::governance::set_fee_recipient(ctx, pool_id, fee_recipient)
    }
}

/// Public helpers for CPI callers
pub mod registry_helpers {
    use super::*;

    pub fn registry_config_address() -> Pubkey {
        Pubkey::find_program_address(&[state::RegistryConfig::SEED_PREFIX], &ID).0
    }

    pub fn pool_state_address(pool_id: u64) -> Pubkey {
        Pubkey::find_program_address(
            &[state::PoolState::SEED_PREFIX, &pool_id.to_le_bytes()],
            &ID,
        )
        .0
    }
}
