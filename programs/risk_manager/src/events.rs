// programs/risk_manager/src/events.rs

use anchor_lang::prelude::*;

#[event]
pub struct RiskManagerInitialized {
    pub owner: Pubkey,
    pub orchestrator: Pubkey,
    pub governance: Pubkey,
    pub policy_manager: Pubkey,
    pub reserve_vault: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct AddressesSet {
    pub governance: Pubkey,
    pub policy_manager: Pubkey,
    pub reserve_vault: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct CommitteeSet {
    pub previous: Pubkey,
    pub governance: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct MaxAllocationsSet {
    pub max_allocations: u8,
    pub timestamp: i64,
}

#[event]
pub struct LossesRealized {
    pub underwriter: Pubkey,
    pub pools: u8,
    pub total_loss: u64,
    pub applied: u64,
    pub timestamp: i64,
}

#[event]
pub struct CapitalDeposited {
    pub underwriter: Pubkey,
    pub amount: u64,
    pub shares: u64,
    pub yield_choice: u8,
    pub pledges_grown: u8,
    pub timestamp: i64,
}

#[event]
pub struct WithdrawalRequestApproved {
    pub underwriter: Pubkey,
    pub shares: u64,
    pub value: u64,
    pub timestamp: i64,
}

#[event]
pub struct WithdrawalRequestReleased {
    pub underwriter: Pubkey,
    pub shares: u64,
    pub timestamp: i64,
}

#[event]
pub struct WithdrawalSettled {
    pub underwriter: Pubkey,
    pub value: u64,
    pub principal_removed: u64,
    pub is_full: bool,
    pub timestamp: i64,
}

#[event]
pub struct CapitalAllocated {
    pub underwriter: Pubkey,
    pub pool_id: u64,
    pub pledge: u64,
    pub yield_choice: u8,
    pub timestamp: i64,
}

#[event]
pub struct DeallocationRequested {
    pub underwriter: Pubkey,
    pub pool_id: u64,
    pub amount: u64,
    pub ready_at: i64,
    pub timestamp: i64,
}

#[event]
pub struct CapitalDeallocated {
    pub underwriter: Pubkey,
    pub pool_id: u64,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct ClaimProcessed {
    pub policy_id: u64,
    pub pool_id: u64,
    pub claimant: Pubkey,
    pub coverage_amount: u64,
    pub fee: u64,
    pub paid_from_pool: u64,
    pub paid_from_reserve: u64,
    pub timestamp: i64,
}

#[event]
pub struct PremiumDistributed {
    pub pool_id: u64,
    pub amount: u64,
    pub total_pledge: u64,
    pub timestamp: i64,
}

#[event]
pub struct CoverageSoldUpdated {
    pub pool_id: u64,
    pub amount: u64,
    pub is_sale: bool,
    pub timestamp: i64,
}

#[event]
pub struct UnderwriterLiquidated {
    pub liquidator: Pubkey,
    pub underwriter: Pubkey,
    pub losses_applied: u64,
    pub pools_cleared: u8,
    pub timestamp: i64,
}

#[event]
pub struct IncidentReported {
    pub pool_id: u64,
    pub is_paused: bool,
    pub reporter: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct PoolFeeRecipientSet {
    pub pool_id: u64,
    pub fee_recipient: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct RewardsClaimed {
    pub underwriter: Pubkey,
    pub pools: u8,
    pub total: u64,
    pub distressed: bool,
    pub timestamp: i64,
}
