// programs/underwriting_core/src/lib.rs
//
// Underwriting Core - Shared Constants and Ledger Math
// ====================================================
//
// This crate provides:
// - Fixed-point tracker math (PRECISION = 1e18, floor division)
// - Share <-> value conversion for the capital pool
// - Withdrawal and pledge lifecycle state machines
// - Seeds and limits shared across the ledger programs
//
// It carries no entrypoint. Every program in the workspace links it directly.

use anchor_lang::prelude::*;

// =============================================================================
// SUBMODULES
// =============================================================================

/// Fixed-point and share arithmetic
pub mod math;

/// Withdrawal / pledge state machines
pub mod lifecycle;

pub use lifecycle::{PledgeStatus, WithdrawalStatus};

// =============================================================================
// SHARED SEEDS
// =============================================================================

/// Seeds that more than one program has to agree on
pub mod seeds {
    /// Orchestrator authority PDA, owned by the risk manager.
    /// Every leaf program stores the derived key and requires it as signer.
    pub const ORCHESTRATOR: &[u8] = b"orchestrator";

    /// Pool state PDA prefix (pool registry)
    pub const POOL_STATE: &[u8] = b"pool_state";

    /// Per-pool loss tracker PDA prefix (loss distributor)
    pub const LOSS_TRACKER: &[u8] = b"loss_tracker";

    /// Per-underwriter, per-pool loss checkpoint PDA prefix (loss distributor)
    pub const LOSS_CHECKPOINT: &[u8] = b"loss_checkpoint";

    /// Per-pool reward streams PDA prefix (reward distributor)
    pub const POOL_REWARDS: &[u8] = b"pool_rewards";

    /// Per-underwriter, per-pool reward checkpoints PDA prefix (reward distributor)
    pub const UNDERWRITER_REWARDS: &[u8] = b"underwriter_rewards";

    /// Underwriter share account PDA prefix (capital pool)
    pub const UNDERWRITER_ACCOUNT: &[u8] = b"underwriter";
}

/// Derive the orchestrator PDA for a given risk manager program id
pub fn orchestrator_address(risk_manager_program: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::ORCHESTRATOR], risk_manager_program)
}

// =============================================================================
// PROTOCOL LIMITS
// =============================================================================

pub mod protocol_constants {
    /// Seconds per day
    pub const SECONDS_PER_DAY: i64 = 86_400;

    /// Default withdrawal notice period (30 days)
    pub const DEFAULT_NOTICE_PERIOD_SECS: i64 = 30 * SECONDS_PER_DAY;

    /// Default deallocation notice period (30 days)
    pub const DEFAULT_DEALLOCATION_NOTICE_SECS: i64 = 30 * SECONDS_PER_DAY;

    /// Hard cap on pools one underwriter can pledge to (account sizing)
    pub const MAX_ALLOCATIONS_CAP: usize = 10;

    /// Default max pools per underwriter
    pub const DEFAULT_MAX_ALLOCATIONS: u8 = 5;

    /// Max yield adapters a single pool can hold capital in
    pub const MAX_POOL_ADAPTERS: usize = 8;

    /// Max distinct reward mints per pool
    pub const MAX_REWARD_TOKENS: usize = 4;

    /// Maximum claim fee (10%)
    pub const MAX_CLAIM_FEE_BPS: u16 = 1_000;

    /// Re-export BPS_DENOMINATOR for convenience
    pub const BPS_DENOMINATOR: u64 = super::math::BPS_DENOMINATOR;
}
