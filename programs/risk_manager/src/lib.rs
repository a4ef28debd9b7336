// programs/risk_manager/src/lib.rs
//
// Risk Manager Program
// ====================
// The orchestrator of the underwriting ledger. Its PDA ["orchestrator"] is
// the only key the leaf programs accept for restricted calls:
// - Underwriter capital flows, wrapped in loss realization and pledge resync
// - Pledge allocation and time-locked deallocation per pool
// - Claim processing: loss socialization, payout, reserve shortfall
// - Permissionless liquidation of insolvent underwriters
// - Governance relays (incident pause, fee recipient)
// - Multi-pool reward claims
//
// Leaf programs never call each other; every cross-program step goes through here.

use anchor_lang::prelude::*;

pub mod state;
pub mod errors;
pub mod events;
pub mod instructions;

use instructions::*;

declare_id!("8n3iGPAtYCAWAoWW57Z8Bp3eWcxfrnB14VwXGAHMM1AH");

#[program]
pub mod risk_manager {
    use super::*;

    // ==================== INITIALIZATION ====================

    pub fn initialize_risk_manager(
        ctx: Context<InitializeRiskManager>,
        params: InitializeRiskManagerParams,
    ) -> Result<()> {
        instructions::initialize::initialize_risk_manager(ctx, params)
    }

    /// Rotate governance, policy manager and reserve vault (owner only)
    pub fn set_addresses(ctx: Context<UpdateRiskConfig>, params: SetAddressesParams) -> Result<()> {
        instructions::initialize::set_addresses(ctx, params)
    }

    pub fn set_max_allocations(ctx: Context<UpdateRiskConfig>, max_allocations: u8) -> Result<()> {
        instructions::initialize::set_max_allocations(ctx, max_allocations)
    }

    pub fn set_deallocation_notice(ctx: Context<UpdateRiskConfig>, notice_secs: i64) -> Result<()> {
        instructions::initialize::set_deallocation_notice(ctx, notice_secs)
    }

    /// Hand governance to a new committee (governance only)
    pub fn set_committee(ctx: Context<SetCommittee>, committee: Pubkey) -> Result<()> {
        instructions::initialize::set_committee(ctx, committee)
    }

    // ==================== CAPITAL ====================

    pub fn deposit<'info>(
        ctx: Context<'_, '_, '_, 'info, DepositCapital<'info>>,
        amount: u64,
        yield_choice: u8,
    ) -> Result<()> {
        instructions::capital::deposit(ctx, amount, yield_choice)
    }

    pub fn request_withdrawal<'info>(
        ctx: Context<'_, '_, '_, 'info, UpdateWithdrawal<'info>>,
        shares: u64,
    ) -> Result<()> {
        instructions::capital::request_withdrawal(ctx, shares)
    }

    pub fn cancel_withdrawal_request<'info>(
        ctx: Context<'_, '_, '_, 'info, UpdateWithdrawal<'info>>,
    ) -> Result<()> {
        instructions::capital::cancel_withdrawal_request(ctx)
    }

    pub fn execute_withdrawal<'info>(
        ctx: Context<'_, '_, '_, 'info, ExecuteWithdrawal<'info>>,
    ) -> Result<()> {
        instructions::capital::execute_withdrawal(ctx)
    }

    // ==================== ALLOCATION ====================

    pub fn allocate_capital<'info>(
        ctx: Context<'_, '_, '_, 'info, ManageAllocation<'info>>,
        pool_ids: Vec<u64>,
    ) -> Result<()> {
        instructions::allocation::allocate_capital(ctx, pool_ids)
    }

    pub fn request_deallocate_from_pool<'info>(
        ctx: Context<'_, '_, '_, 'info, ManageAllocation<'info>>,
        pool_id: u64,
    ) -> Result<()> {
        instructions::allocation::request_deallocate_from_pool(ctx, pool_id)
    }

    pub fn deallocate_from_pool<'info>(
        ctx: Context<'_, '_, '_, 'info, ManageAllocation<'info>>,
        pool_id: u64,
    ) -> Result<()> {
        instructions::allocation::deallocate_from_pool(ctx, pool_id)
    }

    // ==================== POLICY MANAGER ====================

    pub fn process_claim<'info>(
        ctx: Context<'_, '_, '_, 'info, ProcessClaim<'info>>,
        params: ProcessClaimParams,
    ) -> Result<()> {
        instructions::claims::process_claim(ctx, params)
    }

    pub fn distribute_premium(ctx: Context<DistributePremium>, pool_id: u64, amount: u64) -> Result<()> {
        instructions::claims::distribute_premium(ctx, pool_id, amount)
    }

    pub fn update_coverage_sold(
        ctx: Context<UpdateCoverage>,
        pool_id: u64,
        amount: u64,
        is_sale: bool,
    ) -> Result<()> {
        instructions::claims::update_coverage_sold(ctx, pool_id, amount, is_sale)
    }

    // ==================== LIQUIDATION ====================

    /// Anyone may liquidate an underwriter whose pending losses exhaust their shares
    pub fn liquidate_insolvent_underwriter<'info>(
        ctx: Context<'_, '_, '_, 'info, LiquidateUnderwriter<'info>>,
        underwriter: Pubkey,
    ) -> Result<()> {
        instructions::liquidation::liquidate_insolvent_underwriter(ctx, underwriter)
    }

    // ==================== GOVERNANCE ====================

    pub fn report_incident(ctx: Context<GovernPool>, pool_id: u64, pause: bool) -> Result<()> {
        instructions::governance::report_incident(ctx, pool_id, pause)
    }

    pub fn set_pool_fee_recipient(
        ctx: Context<GovernPool>,
        pool_id: u64,
        fee_recipient: Pubkey,
    ) -> Result<()> {
        instructions::governance::set_pool_fee_recipient(ctx, pool_id, fee_recipient)
    }

    // ==================== REWARDS ====================

    pub fn claim_premium_rewards<'info>(
        ctx: Context<'_, '_, '_, 'info, ClaimRewards<'info>>,
        pool_ids: Vec<u64>,
    ) -> Result<u64> {
        instructions::rewards::claim_premium_rewards(ctx, pool_ids)
    }

    pub fn claim_distressed_assets<'info>(
        ctx: Context<'_, '_, '_, 'info, ClaimRewards<'info>>,
        pool_ids: Vec<u64>,
    ) -> Result<u64> {
        instructions::rewards::claim_distressed_assets(ctx, pool_ids)
    }
}

/// Public helpers for clients
pub mod risk_helpers {
    use super::*;

    pub fn risk_config_address() -> Pubkey {
        Pubkey::find_program_address(&[state::RiskManagerConfig::SEED_PREFIX], &ID).0
    }

    /// The key every leaf config must hold as `orchestrator`
    pub fn orchestrator_address() -> Pubkey {
        underwriting_core::orchestrator_address(&ID).0
    }

    pub fn position_address(underwriter: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[state::UnderwriterPosition::SEED_PREFIX, underwriter.as_ref()],
            &ID,
        )
        .0
    }
}
