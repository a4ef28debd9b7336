// programs/loss_distributor/src/errors.rs

use anchor_lang::prelude::*;

#[error_code]
pub enum LossError {
    #[msg("LD: Not orchestrator")]
    Unauthorized,

    #[msg("Zero address not allowed")]
    InvalidAddress,

    #[msg("Loss checkpoint belongs to a different underwriter or pool")]
    CheckpointMismatch,

    #[msg("Math overflow")]
    MathOverflow,
}
