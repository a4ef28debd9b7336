// programs/loss_distributor/src/lib.rs
//
// Loss Distributor Program
// ========================
// Lazy loss socialization for risk pools:
// - One fixed-point tracker per pool (cumulative loss per unit of pledge)
// - One checkpoint per underwriter x pool
// - distribute_loss is O(1) regardless of how many underwriters back the pool
// - realize_losses settles one underwriter and returns the amount owed
//
// Only the orchestrator may distribute or realize.

use anchor_lang::prelude::*;

pub mod state;
pub mod errors;
pub mod events;
pub mod instructions;

use instructions::*;

declare_id!("EjURyYvZaTVJ8AGAc2A1LKHfHpMRgsux9wUeuxv6MnmJ");

#[program]
pub mod loss_distributor {
    use super::*;

    // ==================== INITIALIZATION ====================

    pub fn initialize_loss_distributor(
        ctx: Context<InitializeLossDistributor>,
        orchestrator: Pubkey,
    ) -> Result<()> {
        instructions::initialize::initialize_loss_distributor(ctx, orchestrator)
    }

    /// Rotate the orchestrator (owner only)
    pub fn set_orchestrator(ctx: Context<SetLossOrchestrator>, orchestrator: Pubkey) -> Result<()> {
        instructions::initialize::set_orchestrator(ctx, orchestrator)
    }

    // ==================== LOSSES ====================

    /// Spread a claim loss over a pool's total pledge (no-op at zero pledge)
    pub fn distribute_loss(
        ctx: Context<DistributeLoss>,
        pool_id: u64,
        loss_amount: u64,
        total_pledge: u64,
    ) -> Result<()> {
        instructions::distribution::distribute_loss(ctx, pool_id, loss_amount, total_pledge)
    }

    /// Realize an underwriter's pending loss for one pool
    pub fn realize_losses(
        ctx: Context<RealizeLosses>,
        underwriter: Pubkey,
        pool_id: u64,
        pledge: u64,
    ) -> Result<u64> {
        instructions::distribution::realize_losses(ctx, underwriter, pool_id, pledge)
    }

    // ==================== VIEWS ====================

    pub fn get_pending_losses(
        ctx: Context<GetPendingLosses>,
        underwriter: Pubkey,
        pool_id: u64,
        pledge: u64,
    ) -> Result<u64> {
        instructions::distribution::get_pending_losses(ctx, underwriter, pool_id, pledge)
    }
}

/// Public helpers for CPI callers
pub mod loss_helpers {
    use super::*;

    pub fn loss_tracker_address(pool_id: u64) -> Pubkey {
        Pubkey::find_program_address(
            &[state::PoolLossTracker::SEED_PREFIX, &pool_id.to_le_bytes()],
            &ID,
        )
        .0
    }

    pub fn loss_checkpoint_address(underwriter: &Pubkey, pool_id: u64) -> Pubkey {
        Pubkey::find_program_address(
            &[
                state::LossCheckpoint::SEED_PREFIX,
                underwriter.as_ref(),
                &pool_id.to_le_bytes(),
            ],
            &ID,
        )
        .0
    }
}
