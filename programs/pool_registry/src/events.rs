// programs/pool_registry/src/events.rs

use anchor_lang::prelude::*;

/// Emitted when the registry is initialized
#[event]
pub struct RegistryInitialized {
    pub owner: Pubkey,
    pub orchestrator: Pubkey,
    pub timestamp: i64,
}

/// Emitted when the orchestrator is rotated
#[event]
pub struct OrchestratorSet {
    pub previous: Pubkey,
    pub orchestrator: Pubkey,
    pub timestamp: i64,
}

/// Emitted when a pool is created
#[event]
pub struct PoolAdded {
    pub pool_id: u64,
    pub protected_asset_mint: Pubkey,
    pub fee_recipient: Pubkey,
    pub claim_fee_bps: u16,
    pub timestamp: i64,
}

#[event]
pub struct CapitalAllocationUpdated {
    pub pool_id: u64,
    pub yield_choice: u8,
    pub amount: u64,
    pub is_allocation: bool,
    pub total_capital_pledged: u64,
    pub timestamp: i64,
}

#[event]
pub struct PendingWithdrawalUpdated {
    pub pool_id: u64,
    pub amount: u64,
    pub is_request: bool,
    pub capital_pending_withdrawal: u64,
    pub timestamp: i64,
}

#[event]
pub struct CoverageSoldUpdated {
    pub pool_id: u64,
    pub amount: u64,
    pub is_sale: bool,
    pub total_coverage_sold: u64,
    pub timestamp: i64,
}

/// Emitted when governance pauses or unpauses a pool
#[event]
pub struct PauseStateSet {
    pub pool_id: u64,
    pub is_paused: bool,
    pub timestamp: i64,
}

#[event]
pub struct FeeRecipientSet {
    pub pool_id: u64,
    pub fee_recipient: Pubkey,
    pub timestamp: i64,
}
