// programs/risk_manager/src/errors.rs

use anchor_lang::prelude::*;

#[error_code]
pub enum RiskError {
    #[msg("Unauthorized")]
    Unauthorized,

    #[msg("Not the governance committee")]
    NotGovernance,

    #[msg("Not the policy manager")]
    NotPolicyManager,

    #[msg("Zero address not allowed")]
    InvalidAddress,

    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    #[msg("Pool does not exist")]
    InvalidPoolId,

    #[msg("Pool is paused")]
    PoolPaused,

    #[msg("No principal to allocate")]
    NoCapitalToAllocate,

    #[msg("Already allocated to this pool")]
    AlreadyAllocated,

    #[msg("Not allocated to this pool")]
    NotAllocated,

    #[msg("Allocation limit exceeded")]
    AllocationLimitExceeded,

    #[msg("Max allocations must be between 1 and the account capacity")]
    InvalidAllocationLimit,

    #[msg("Deallocation already requested")]
    DeallocationAlreadyRequested,

    #[msg("No active request")]
    NoActiveRequest,

    #[msg("Notice period still active")]
    NoticePeriodActive,

    #[msg("Notice period must be non-negative")]
    InvalidNoticePeriod,

    #[msg("Rejected by orchestrator: coverage sold would be under-collateralized")]
    RejectedByOrchestrator,

    #[msg("Underwriter is not insolvent")]
    NotInsolvent,

    #[msg("Coverage sale exceeds available pool capital")]
    InsufficientCapacity,

    #[msg("Yield choice does not match existing pledges")]
    YieldChoiceMismatch,

    #[msg("Remaining accounts do not match the underwriter's pledges")]
    InvalidRemainingAccounts,

    #[msg("Account does not belong to the expected pool")]
    PoolAccountMismatch,

    #[msg("Token account mint or owner mismatch")]
    InvalidTokenAccount,

    #[msg("Reserve vault delegation cannot cover the shortfall")]
    ReserveShortfall,

    #[msg("Math overflow")]
    MathOverflow,
}
