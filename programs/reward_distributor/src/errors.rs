// programs/reward_distributor/src/errors.rs

use anchor_lang::prelude::*;

#[error_code]
pub enum RewardError {
    #[msg("RD: Not orchestrator")]
    Unauthorized,

    #[msg("RD: Not the catastrophe reserve")]
    NotReserve,

    #[msg("Zero address not allowed")]
    InvalidAddress,

    #[msg("Pool already tracks the maximum number of reward tokens")]
    RewardStreamLimit,

    #[msg("Destination token account does not belong to the beneficiary")]
    InvalidTokenAccount,

    #[msg("Reward vault holds less than the claimable amount")]
    InsufficientVaultBalance,

    #[msg("Math overflow")]
    MathOverflow,
}
