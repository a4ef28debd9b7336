// programs/capital_pool/src/events.rs

use anchor_lang::prelude::*;

#[event]
pub struct CapitalPoolInitialized {
    pub owner: Pubkey,
    pub asset_mint: Pubkey,
    pub idle_vault: Pubkey,
    pub notice_period_secs: i64,
    pub timestamp: i64,
}

#[event]
pub struct OrchestratorSet {
    pub orchestrator: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct NoticePeriodSet {
    pub previous: i64,
    pub notice_period_secs: i64,
    pub timestamp: i64,
}

#[event]
pub struct YieldAdapterRegistered {
    pub yield_choice: u8,
    pub vault: Pubkey,
    pub timestamp: i64,
}

/// Emitted when an adapter is retired and its balance swept to idle
#[event]
pub struct YieldAdapterDeactivated {
    pub yield_choice: u8,
    pub swept: u64,
    pub timestamp: i64,
}

#[event]
pub struct Deposited {
    pub underwriter: Pubkey,
    pub amount: u64,
    pub shares_minted: u64,
    pub yield_choice: u8,
    pub timestamp: i64,
}

#[event]
pub struct WithdrawalRequested {
    pub underwriter: Pubkey,
    pub shares: u64,
    pub value: u64,
    pub ready_at: i64,
    pub timestamp: i64,
}

#[event]
pub struct WithdrawalRequestCancelled {
    pub underwriter: Pubkey,
    pub shares: u64,
    pub timestamp: i64,
}

#[event]
pub struct WithdrawalExecuted {
    pub underwriter: Pubkey,
    pub shares_burned: u64,
    pub value: u64,
    pub principal_removed: u64,
    pub is_full: bool,
    pub timestamp: i64,
}

#[event]
pub struct SystemValueSynced {
    pub previous_value: u64,
    pub new_value: u64,
    pub idle_balance: u64,
    pub unrealized_payouts: u64,
    pub timestamp: i64,
}

#[event]
pub struct LossesApplied {
    pub underwriter: Pubkey,
    pub requested: u64,
    pub applied: u64,
    pub shares_burned: u64,
    pub is_withdrawal_realization: bool,
    pub timestamp: i64,
}

#[event]
pub struct PayoutExecuted {
    pub claimant_destination: Pubkey,
    pub claimant_amount: u64,
    pub fee_destination: Pubkey,
    pub fee_amount: u64,
    pub total_capital_from_pool: u64,
    pub timestamp: i64,
}
