// programs/loss_distributor/src/state.rs

use anchor_lang::prelude::*;
use underwriting_core::math;
use underwriting_core::seeds;

/// Loss distributor configuration
/// PDA seeds: ["loss_config"]
#[account]
#[derive(InitSpace)]
pub struct LossConfig {
    /// Owner that can rotate the orchestrator
    pub owner: Pubkey,

    /// Only caller allowed to distribute and realize losses
    pub orchestrator: Pubkey,

    /// Bump seed
    pub bump: u8,
}

impl LossConfig {
    pub const SEED_PREFIX: &'static [u8] = b"loss_config";
}

/// Cumulative loss per unit of pledge for one pool
/// PDA seeds: ["loss_tracker", pool_id]
#[account]
#[derive(InitSpace)]
pub struct PoolLossTracker {
    /// Pool identifier
    pub pool_id: u64,

    /// Loss per unit pledge, scaled by PRECISION. Never decreases.
    pub loss_per_pledge: u128,

    /// Sum of all losses distributed to this pool
    pub total_loss_distributed: u64,

    /// Timestamp of the last distribution
    pub last_distribution_at: i64,

    /// Bump seed
    pub bump: u8,
}

impl PoolLossTracker {
    pub const SEED_PREFIX: &'static [u8] = seeds::LOSS_TRACKER;

    /// Spread `loss` over `total_pledge`.
    /// Returns Ok(false) without touching state when there is nothing to spread over.
    pub fn record_loss(&mut self, loss: u64, total_pledge: u64) -> Option<bool> {
        if loss == 0 || total_pledge == 0 {
            return Some(false);
        }
        let increment = math::tracker_increment(loss, total_pledge)?;
        self.loss_per_pledge = self.loss_per_pledge.checked_add(increment)?;
        self.total_loss_distributed = self.total_loss_distributed.saturating_add(loss);
        Some(true)
    }

    pub fn pending_for(&self, checkpoint: u128, pledge: u64) -> Option<u64> {
        math::accrued_since(self.loss_per_pledge, checkpoint, pledge)
    }
}

/// Last tracker value an underwriter has settled against for one pool
/// PDA seeds: ["loss_checkpoint", underwriter, pool_id]
#[account]
#[derive(InitSpace)]
pub struct LossCheckpoint {
    /// Underwriter wallet
    pub underwriter: Pubkey,

    /// Pool identifier
    pub pool_id: u64,

    /// Tracker value at last realization
    pub checkpoint: u128,

    /// Lifetime losses realized through this checkpoint
    pub total_realized: u64,

    /// Bump seed
    pub bump: u8,
}

impl LossCheckpoint {
    pub const SEED_PREFIX: &'static [u8] = seeds::LOSS_CHECKPOINT;

    pub fn is_initialized(&self) -> bool {
        self.underwriter != Pubkey::default()
    }

    /// Compute pending loss and advance to the tracker, even when nothing is pending
    pub fn realize(&mut self, tracker: &PoolLossTracker, pledge: u64) -> Option<u64> {
        let pending = tracker.pending_for(self.checkpoint, pledge)?;
        self.checkpoint = tracker.loss_per_pledge;
        self.total_realized = self.total_realized.saturating_add(pending);
        Some(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // USDC-style 6 decimals
    const ONE: u64 = 1_000_000;

    fn create_test_tracker() -> PoolLossTracker {
        PoolLossTracker {
            pool_id: 7,
            loss_per_pledge: 0,
            total_loss_distributed: 0,
            last_distribution_at: 0,
            bump: 255,
        }
    }

    fn create_test_checkpoint() -> LossCheckpoint {
        LossCheckpoint {
            underwriter: Pubkey::new_unique(),
            pool_id: 7,
            checkpoint: 0,
            total_realized: 0,
            bump: 255,
        }
    }

    // ==================== DISTRIBUTION TESTS ====================

    #[test]
    fn test_zero_pledge_distribution_is_noop() {
        let mut tracker = create_test_tracker();
        assert_eq!(tracker.record_loss(400 * ONE, 0), Some(false));
        assert_eq!(tracker.loss_per_pledge, 0);
        assert_eq!(tracker.total_loss_distributed, 0);
    }

    #[test]
    fn test_zero_loss_distribution_is_noop() {
        let mut tracker = create_test_tracker();
        assert_eq!(tracker.record_loss(0, 1_000 * ONE), Some(false));
        assert_eq!(tracker.loss_per_pledge, 0);
    }

    #[test]
    fn test_single_pledger_full_loss() {
        // Deposit 1000, pledge 1000, claim 400
        let mut tracker = create_test_tracker();
        tracker.record_loss(400 * ONE, 1_000 * ONE).unwrap();
        assert_eq!(tracker.pending_for(0, 1_000 * ONE), Some(400 * ONE));
    }

    #[test]
    fn test_trackers_independent_per_pool() {
        let mut pool_a = create_test_tracker();
        let pool_b = PoolLossTracker { pool_id: 8, ..create_test_tracker() };
        pool_a.record_loss(100 * ONE, 1_000 * ONE).unwrap();
        assert!(pool_a.loss_per_pledge > 0);
        assert_eq!(pool_b.loss_per_pledge, 0);
    }

    // ==================== REALIZATION TESTS ====================

    #[test]
    fn test_loss_fairness_independent_of_order() {
        // 1000 + 500 pledged, 300 loss
        let mut tracker = create_test_tracker();
        tracker.record_loss(300 * ONE, 1_500 * ONE).unwrap();

        let mut first = create_test_checkpoint();
        let mut second = create_test_checkpoint();
        let b = second.realize(&tracker, 500 * ONE).unwrap();
        let a = first.realize(&tracker, 1_000 * ONE).unwrap();

        assert_eq!(a, 200 * ONE);
        assert_eq!(b, 100 * ONE);
    }

    #[test]
    fn test_realization_is_idempotent() {
        let mut tracker = create_test_tracker();
        tracker.record_loss(400 * ONE, 1_000 * ONE).unwrap();

        let mut checkpoint = create_test_checkpoint();
        assert_eq!(checkpoint.realize(&tracker, 1_000 * ONE), Some(400 * ONE));
        assert_eq!(checkpoint.realize(&tracker, 1_000 * ONE), Some(0));
        assert_eq!(checkpoint.total_realized, 400 * ONE);
    }

    #[test]
    fn test_late_joiner_owes_nothing_until_next_loss() {
        let mut tracker = create_test_tracker();
        tracker.record_loss(400 * ONE, 1_000 * ONE).unwrap();

        // Joining with pledge 500: realize at zero pledge pins the checkpoint
        let mut joiner = create_test_checkpoint();
        assert_eq!(joiner.realize(&tracker, 0), Some(0));
        assert_eq!(tracker.pending_for(joiner.checkpoint, 500 * ONE), Some(0));

        // Next loss of 150 over 1500 total pledge hits the joiner for 50
        tracker.record_loss(150 * ONE, 1_500 * ONE).unwrap();
        assert_eq!(tracker.pending_for(joiner.checkpoint, 500 * ONE), Some(50 * ONE));
    }

    #[test]
    fn test_losses_accumulate_across_events() {
        let mut tracker = create_test_tracker();
        tracker.record_loss(100 * ONE, 1_000 * ONE).unwrap();
        tracker.record_loss(100 * ONE, 1_000 * ONE).unwrap();

        let mut checkpoint = create_test_checkpoint();
        assert_eq!(checkpoint.realize(&tracker, 1_000 * ONE), Some(200 * ONE));
        assert_eq!(tracker.total_loss_distributed, 200 * ONE);
    }

    #[test]
    fn test_zero_pledge_realizes_nothing() {
        let mut tracker = create_test_tracker();
        tracker.record_loss(100 * ONE, 1_000 * ONE).unwrap();
        let mut checkpoint = create_test_checkpoint();
        assert_eq!(checkpoint.realize(&tracker, 0), Some(0));
        assert_eq!(checkpoint.checkpoint, tracker.loss_per_pledge);
    }
}
