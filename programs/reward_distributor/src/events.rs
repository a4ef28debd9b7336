// programs/reward_distributor/src/events.rs

use anchor_lang::prelude::*;

#[event]
pub struct RewardDistributorInitialized {
    pub owner: Pubkey,
    pub orchestrator: Pubkey,
    pub reserve: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct OrchestratorSet {
    pub previous: Pubkey,
    pub orchestrator: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct ReserveSet {
    pub previous: Pubkey,
    pub reserve: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct RewardVaultCreated {
    pub mint: Pubkey,
    pub vault: Pubkey,
    pub timestamp: i64,
}

/// Emitted when rewards are spread over a pool's pledges
#[event]
pub struct RewardDistributed {
    pub pool_id: u64,
    pub mint: Pubkey,
    pub amount: u64,
    pub total_pledge: u64,
    pub reward_per_pledge: u128,
    pub timestamp: i64,
}

#[event]
pub struct RewardClaimed {
    pub beneficiary: Pubkey,
    pub pool_id: u64,
    pub mint: Pubkey,
    pub amount: u64,
    pub destination: Pubkey,
    pub timestamp: i64,
}
