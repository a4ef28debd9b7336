// programs/reward_distributor/src/lib.rs
//
// Reward Distributor Program
// ==========================
// Lazy reward accrual for risk pools, symmetric to the loss distributor:
// - One stream per (pool, reward mint) holding reward per unit of pledge
// - One checkpoint set per underwriter x pool
// - Tokens sit in one vault per mint, owned by the reward authority PDA
//
// The orchestrator distributes, settles and claims for underwriters.
// The catastrophe reserve can settle and pay a user through a dedicated path.

use anchor_lang::prelude::*;

pub mod state;
pub mod errors;
pub mod events;
pub mod instructions;

use instructions::*;

declare_id!("G2uAnae1atSLzUEgcU7qg6EunpvzaTKxNJ756jj8dW1b");

#[program]
pub mod reward_distributor {
    use super::*;

    // ==================== INITIALIZATION ====================

    pub fn initialize_reward_distributor(
        ctx: Context<InitializeRewardDistributor>,
        orchestrator: Pubkey,
        reserve: Pubkey,
    ) -> Result<()> {
        instructions::initialize::initialize_reward_distributor(ctx, orchestrator, reserve)
    }

    pub fn set_orchestrator(ctx: Context<UpdateRewardConfig>, orchestrator: Pubkey) -> Result<()> {
        instructions::initialize::set_orchestrator(ctx, orchestrator)
    }

    /// Register the catastrophe reserve beneficiary (owner only)
    pub fn set_reserve(ctx: Context<UpdateRewardConfig>, reserve: Pubkey) -> Result<()> {
        instructions::initialize::set_reserve(ctx, reserve)
    }

    /// Create the vault for a reward mint (owner only)
    pub fn init_reward_vault(ctx: Context<InitRewardVault>) -> Result<()> {
        instructions::initialize::init_reward_vault(ctx)
    }

    // ==================== ACCRUAL (ORCHESTRATOR) ====================

    /// Spread `amount` of `mint` over a pool's total pledge (skipped at zero pledge)
    pub fn distribute(
        ctx: Context<Distribute>,
        pool_id: u64,
        mint: Pubkey,
        amount: u64,
        total_pledge: u64,
    ) -> Result<()> {
        instructions::distribution::distribute(ctx, pool_id, mint, amount, total_pledge)
    }

    /// Settle an underwriter at their current pledge before it changes
    pub fn update_user_state(
        ctx: Context<UpdateUserState>,
        underwriter: Pubkey,
        pool_id: u64,
        pledge: u64,
    ) -> Result<()> {
        instructions::distribution::update_user_state(ctx, underwriter, pool_id, pledge)
    }

    // ==================== CLAIMS ====================

    pub fn claim(
        ctx: Context<Claim>,
        underwriter: Pubkey,
        pool_id: u64,
        pledge: u64,
    ) -> Result<u64> {
        instructions::claims::claim(ctx, underwriter, pool_id, pledge)
    }

    /// Reserve-initiated claim that settles and pays a named user
    pub fn claim_for_reserve(
        ctx: Context<ClaimForReserve>,
        user: Pubkey,
        pool_id: u64,
        pledge: u64,
    ) -> Result<u64> {
        instructions::claims::claim_for_reserve(ctx, user, pool_id, pledge)
    }

    // ==================== VIEWS ====================

    pub fn pending_rewards(
        ctx: Context<PendingRewards>,
        underwriter: Pubkey,
        pool_id: u64,
        mint: Pubkey,
        pledge: u64,
    ) -> Result<u64> {
        instructions::distribution::pending_rewards(ctx, underwriter, pool_id, mint, pledge)
    }
}

/// Public helpers for CPI callers
pub mod reward_helpers {
    use super::*;

    pub fn reward_config_address() -> Pubkey {
        Pubkey::find_program_address(&[state::RewardConfig::SEED_PREFIX], &ID).0
    }

    pub fn reward_authority_address() -> Pubkey {
        Pubkey::find_program_address(&[state::RewardConfig::AUTHORITY_SEED], &ID).0
    }

    pub fn reward_vault_address(mint: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(&[state::RewardConfig::VAULT_SEED, mint.as_ref()], &ID).0
    }

    pub fn pool_rewards_address(pool_id: u64) -> Pubkey {
        Pubkey::find_program_address(
            &[state::PoolRewards::SEED_PREFIX, &pool_id.to_le_bytes()],
            &ID,
        )
        .0
    }

    pub fn underwriter_rewards_address(underwriter: &Pubkey, pool_id: u64) -> Pubkey {
        Pubkey::find_program_address(
            &[
                state::UnderwriterRewards::SEED_PREFIX,
                underwriter.as_ref(),
                &pool_id.to_le_bytes(),
            ],
            &ID,
        )
        .0
    }
}
