// programs/loss_distributor/src/events.rs

use anchor_lang::prelude::*;

#[event]
pub struct LossDistributorInitialized {
    pub owner: Pubkey,
    pub orchestrator: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct OrchestratorSet {
    pub previous: Pubkey,
    pub orchestrator: Pubkey,
    pub timestamp: i64,
}

/// Emitted when a claim loss is spread over a pool's pledges
#[event]
pub struct LossDistributed {
    pub pool_id: u64,
    pub loss_amount: u64,
    pub total_pledge: u64,
    pub loss_per_pledge: u128,
    pub timestamp: i64,
}

/// Emitted when an underwriter's pending loss is realized
#[event]
pub struct LossesRealized {
    pub underwriter: Pubkey,
    pub pool_id: u64,
    pub pledge: u64,
    pub amount: u64,
    pub checkpoint: u128,
    pub timestamp: i64,
}
