// programs/capital_pool/src/errors.rs

use anchor_lang::prelude::*;

#[error_code]
pub enum CapitalError {
    #[msg("CP: Not orchestrator")]
    Unauthorized,

    #[msg("Orchestrator already set")]
    OrchestratorAlreadySet,

    #[msg("Orchestrator not set")]
    OrchestratorNotSet,

    #[msg("Zero address not allowed")]
    InvalidAddress,

    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    #[msg("Deposit too small to mint a share")]
    ZeroSharesMinted,

    #[msg("No active yield adapter for this choice")]
    AdapterNotConfigured,

    #[msg("Yield adapter already active")]
    AdapterAlreadyActive,

    #[msg("Yield choice is fixed while shares are held")]
    YieldChoiceLocked,

    #[msg("Insufficient shares")]
    InsufficientShares,

    #[msg("A withdrawal request is already pending")]
    WithdrawalAlreadyRequested,

    #[msg("No active withdrawal request")]
    NoActiveRequest,

    #[msg("Notice period still active")]
    NoticePeriodActive,

    #[msg("Notice period must be non-negative")]
    InvalidNoticePeriod,

    #[msg("Idle and adapter balances cannot cover the withdrawal")]
    InsufficientLiquidity,

    #[msg("Sync must include every active adapter exactly once")]
    IncompleteAdapterSet,

    #[msg("Adapter account does not match its vault")]
    InvalidAdapterAccount,

    #[msg("Payout exceeds the capital the pool holds in adapters")]
    PayoutExceedsPoolCapital,

    #[msg("Funds gathered from adapters fall short of the payout")]
    InsufficientFundsGathered,

    #[msg("Token account mint or owner mismatch")]
    InvalidTokenAccount,

    #[msg("Math overflow")]
    MathOverflow,
}
