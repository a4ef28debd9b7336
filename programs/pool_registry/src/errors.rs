// programs/pool_registry/src/errors.rs

use anchor_lang::prelude::*;

#[error_code]
pub enum RegistryError {
    #[msg("Unauthorized: caller is not the registry owner or orchestrator")]
    Unauthorized,

    #[msg("Invalid pool id")]
    InvalidPoolId,

    #[msg("Zero address not allowed")]
    InvalidAddress,

    #[msg("Claim fee exceeds maximum")]
    InvalidFee,

    #[msg("Invalid rate model")]
    InvalidRateModel,

    #[msg("Pool already holds capital in the maximum number of adapters")]
    AdapterLimitReached,

    #[msg("Math overflow")]
    MathOverflow,
}
