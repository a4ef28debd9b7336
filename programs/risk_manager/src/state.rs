// programs/risk_manager/src/state.rs

use anchor_lang::prelude::*;
use underwriting_core::math;
use underwriting_core::protocol_constants::{
    DEFAULT_DEALLOCATION_NOTICE_SECS, DEFAULT_MAX_ALLOCATIONS, MAX_ALLOCATIONS_CAP,
};
use underwriting_core::PledgeStatus;
use crate::errors::RiskError;

/// Risk manager configuration
/// PDA seeds: ["risk_config"]
#[account]
#[derive(InitSpace)]
pub struct RiskManagerConfig {
    /// Owner that rotates the injected addresses
    pub owner: Pubkey,

    /// Governance committee: incident reports and fee recipients
    pub governance: Pubkey,

    /// Policy manager: claims, premiums and coverage sales
    pub policy_manager: Pubkey,

    /// Catastrophe reserve token account; the orchestrator PDA is its delegate
    pub reserve_vault: Pubkey,

    /// Max pools a single underwriter can pledge to
    pub max_allocations_per_underwriter: u8,

    /// Delay between a deallocation request and its completion
    pub deallocation_notice_secs: i64,

    /// Bump of the orchestrator PDA
    pub orchestrator_bump: u8,

    /// Bump seed
    pub bump: u8,
}

impl RiskManagerConfig {
    pub const SEED_PREFIX: &'static [u8] = b"risk_config";
    pub const DEFAULT_MAX_ALLOCATIONS: u8 = DEFAULT_MAX_ALLOCATIONS;
    pub const DEFAULT_DEALLOCATION_NOTICE_SECS: i64 = DEFAULT_DEALLOCATION_NOTICE_SECS;

    pub fn is_valid_max_allocations(max: u8) -> bool {
        max > 0 && (max as usize) <= MAX_ALLOCATIONS_CAP
    }
}

/// One underwriter's pledge to one pool
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, InitSpace, PartialEq, Eq, Debug)]
pub struct PoolPledge {
    pub pool_id: u64,

    /// Capital backing this pool. Equals principal until losses or exits reduce it.
    pub pledge: u64,

    /// Adapter the pledged capital sits in
    pub yield_choice: u8,

    pub status: PledgeStatus,

    /// 0 unless status is DeallocationRequested
    pub deallocation_requested_at: i64,

    /// Amount reserved in the pool's pending-withdrawal total by a withdrawal request
    pub withdrawal_reserved: u64,

    /// Amount reserved by a deallocation request
    pub deallocation_reserved: u64,
}

impl PoolPledge {
    /// Total this pledge holds in the pool's pending-withdrawal total
    pub fn reserved(&self) -> u64 {
        self.withdrawal_reserved
            .saturating_add(self.deallocation_reserved)
    }

    /// Pledge not yet reserved for exit
    pub fn unreserved(&self) -> u64 {
        self.pledge.saturating_sub(self.reserved())
    }

    pub fn is_deallocation_ready(&self, now: i64, notice_secs: i64) -> bool {
        self.status == PledgeStatus::DeallocationRequested
            && now >= self.deallocation_requested_at.saturating_add(notice_secs)
    }
}

/// Per-underwriter pledge set
/// PDA seeds: ["position", underwriter]
///
/// Pledges are kept in insertion order. Multi-pool instructions expect their
/// per-pool account groups in the same order.
#[account]
#[derive(InitSpace)]
pub struct UnderwriterPosition {
    pub underwriter: Pubkey,

    #[max_len(10)]
    pub pledges: Vec<PoolPledge>,

    /// Bump seed
    pub bump: u8,
}

impl UnderwriterPosition {
    pub const SEED_PREFIX: &'static [u8] = b"position";

    pub fn is_initialized(&self) -> bool {
        self.underwriter != Pubkey::default()
    }

    pub fn pledge(&self, pool_id: u64) -> Option<&PoolPledge> {
        self.pledges.iter().find(|p| p.pool_id == pool_id)
    }

    pub fn pledge_mut(&mut self, pool_id: u64) -> Option<&mut PoolPledge> {
        self.pledges.iter_mut().find(|p| p.pool_id == pool_id)
    }

    /// Current pledge to `pool_id`, 0 when not allocated
    pub fn pledge_of(&self, pool_id: u64) -> u64 {
        self.pledge(pool_id).map(|p| p.pledge).unwrap_or(0)
    }

    /// Open pledges for each of `pool_ids` at `principal`.
    /// Checks the whole batch before touching state.
    pub fn add_pledges(
        &mut self,
        pool_ids: &[u64],
        principal: u64,
        yield_choice: u8,
        max_allocations: u8,
    ) -> std::result::Result<(), RiskError> {
        if principal == 0 {
            return Err(RiskError::NoCapitalToAllocate);
        }
        for (i, pool_id) in pool_ids.iter().enumerate() {
            if self.pledge(*pool_id).is_some() || pool_ids[..i].contains(pool_id) {
                return Err(RiskError::AlreadyAllocated);
            }
        }
        let total = self.pledges.len().saturating_add(pool_ids.len());
        if total > max_allocations as usize || total > MAX_ALLOCATIONS_CAP {
            return Err(RiskError::AllocationLimitExceeded);
        }
        if self.pledges.iter().any(|p| p.yield_choice != yield_choice) {
            return Err(RiskError::YieldChoiceMismatch);
        }

        for pool_id in pool_ids {
            self.pledges.push(PoolPledge {
                pool_id: *pool_id,
                pledge: principal,
                yield_choice,
                status: PledgeStatus::Allocated,
                ..Default::default()
            });
        }
        Ok(())
    }

    /// Grow every active pledge by a fresh deposit
    pub fn grow_all(&mut self, amount: u64) -> Option<()> {
        for pledge in self.pledges.iter_mut().filter(|p| p.status.is_active()) {
            pledge.pledge = pledge.pledge.checked_add(amount)?;
        }
        Some(())
    }

    /// Shrink pledges after a withdrawal. Returns the reduction per pledge,
    /// in pledge order.
    pub fn shrink_all(&mut self, principal_removed: u64, is_full: bool) -> Vec<u64> {
        self.pledges
            .iter_mut()
            .map(|p| {
                let reduction = if is_full {
                    p.pledge
                } else {
                    principal_removed.min(p.pledge)
                };
                p.pledge -= reduction;
                reduction
            })
            .collect()
    }

    /// Drop pledges that no longer back anything
    pub fn remove_empty(&mut self) -> Vec<PoolPledge> {
        let (empty, kept): (Vec<PoolPledge>, Vec<PoolPledge>) =
            self.pledges.iter().partition(|p| p.pledge == 0);
        self.pledges = kept;
        empty
    }

    pub fn remove_pledge(&mut self, pool_id: u64) -> Option<PoolPledge> {
        let index = self.pledges.iter().position(|p| p.pool_id == pool_id)?;
        Some(self.pledges.remove(index))
    }

    pub fn clear(&mut self) -> Vec<PoolPledge> {
        std::mem::take(&mut self.pledges)
    }
}

/// Amount reserved from one pool by a withdrawal of `value`
pub fn withdrawal_reservation(pledge: &PoolPledge, value: u64) -> u64 {
    value.min(pledge.unreserved())
}

/// Who pays what on a claim.
/// The pool covers up to its capital, fee first; the reserve covers the rest.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct ClaimSplit {
    pub fee: u64,
    pub pool_to_claimant: u64,
    pub pool_to_fee: u64,
    pub reserve_to_claimant: u64,
    pub reserve_to_fee: u64,
}

impl ClaimSplit {
    pub fn compute(coverage: u64, claim_fee_bps: u16, pool_capital: u64) -> Option<Self> {
        let fee = math::mul_bps(coverage, claim_fee_bps)?;
        let net = coverage.checked_sub(fee)?;
        let from_pool = coverage.min(pool_capital);
        let pool_to_fee = fee.min(from_pool);
        let pool_to_claimant = from_pool - pool_to_fee;

        Some(Self {
            fee,
            pool_to_claimant,
            pool_to_fee,
            reserve_to_claimant: net.checked_sub(pool_to_claimant)?,
            reserve_to_fee: fee - pool_to_fee,
        })
    }

    pub fn from_pool(&self) -> u64 {
        self.pool_to_claimant + self.pool_to_fee
    }

    pub fn from_reserve(&self) -> u64 {
        self.reserve_to_claimant + self.reserve_to_fee
    }
}

/// Pending losses have consumed everything the shares are worth
pub fn is_insolvent(pending_losses: u64, share_value: u64, shares: u64) -> bool {
    shares > 0 && pending_losses >= share_value
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: u64 = 1_000_000;

    fn create_test_position() -> UnderwriterPosition {
        UnderwriterPosition {
            underwriter: Pubkey::new_unique(),
            pledges: vec![],
            bump: 255,
        }
    }

    fn create_test_pool(pledged: u64, coverage_sold: u64) -> pool_registry::state::PoolState {
        pool_registry::state::PoolState {
            pool_id: 1,
            protected_asset_mint: Pubkey::new_unique(),
            total_capital_pledged: pledged,
            total_coverage_sold: coverage_sold,
            capital_pending_withdrawal: 0,
            is_paused: false,
            paused_at: 0,
            fee_recipient: Pubkey::new_unique(),
            claim_fee_bps: 0,
            rate_model: Default::default(),
            adapter_allocations: vec![],
            created_at: 0,
            bump: 255,
        }
    }

    // ==================== ALLOCATION TESTS ====================

    #[test]
    fn test_allocate_sets_pledge_to_principal() {
        let mut position = create_test_position();
        position.add_pledges(&[1, 2], 1_000 * ONE, 0, 5).unwrap();

        assert_eq!(position.pledges.len(), 2);
        assert_eq!(position.pledge_of(1), 1_000 * ONE);
        assert_eq!(position.pledge_of(2), 1_000 * ONE);
        assert_eq!(position.pledge(1).unwrap().status, PledgeStatus::Allocated);
        assert_eq!(position.pledge_of(3), 0);
    }

    #[test]
    fn test_allocation_limit_counts_existing_and_new() {
        let mut position = create_test_position();
        position.add_pledges(&[1, 2, 3], ONE, 0, 5).unwrap();

        assert!(matches!(
            position.add_pledges(&[4, 5, 6], ONE, 0, 5),
            Err(RiskError::AllocationLimitExceeded)
        ));
        // Batch rejected as a whole
        assert_eq!(position.pledges.len(), 3);

        position.add_pledges(&[4, 5], ONE, 0, 5).unwrap();
        assert_eq!(position.pledges.len(), 5);
    }

    #[test]
    fn test_allocation_rejects_duplicates() {
        let mut position = create_test_position();
        position.add_pledges(&[1], ONE, 0, 5).unwrap();

        assert!(matches!(
            position.add_pledges(&[1], ONE, 0, 5),
            Err(RiskError::AlreadyAllocated)
        ));
        assert!(matches!(
            position.add_pledges(&[2, 2], ONE, 0, 5),
            Err(RiskError::AlreadyAllocated)
        ));
    }

    #[test]
    fn test_allocation_requires_principal() {
        let mut position = create_test_position();
        assert!(matches!(
            position.add_pledges(&[1], 0, 0, 5),
            Err(RiskError::NoCapitalToAllocate)
        ));
    }

    #[test]
    fn test_max_allocations_bounds() {
        assert!(!RiskManagerConfig::is_valid_max_allocations(0));
        assert!(RiskManagerConfig::is_valid_max_allocations(1));
        assert!(RiskManagerConfig::is_valid_max_allocations(MAX_ALLOCATIONS_CAP as u8));
        assert!(!RiskManagerConfig::is_valid_max_allocations(MAX_ALLOCATIONS_CAP as u8 + 1));
    }

    // ==================== PLEDGE RESYNC TESTS ====================

    #[test]
    fn test_deposit_grows_every_active_pledge() {
        let mut position = create_test_position();
        position.add_pledges(&[1, 2], 1_000 * ONE, 0, 5).unwrap();
        position.grow_all(500 * ONE).unwrap();

        assert_eq!(position.pledge_of(1), 1_500 * ONE);
        assert_eq!(position.pledge_of(2), 1_500 * ONE);
    }

    #[test]
    fn test_partial_withdrawal_shrinks_pledges() {
        let mut position = create_test_position();
        position.add_pledges(&[1, 2], 1_000 * ONE, 0, 5).unwrap();
        position.pledge_mut(2).unwrap().pledge = 300 * ONE;

        let reductions = position.shrink_all(400 * ONE, false);
        assert_eq!(reductions, vec![400 * ONE, 300 * ONE]);
        assert_eq!(position.pledge_of(1), 600 * ONE);

        let removed = position.remove_empty();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].pool_id, 2);
        assert_eq!(position.pledges.len(), 1);
    }

    #[test]
    fn test_full_withdrawal_clears_pledges() {
        let mut position = create_test_position();
        position.add_pledges(&[1, 2], 1_000 * ONE, 0, 5).unwrap();

        position.shrink_all(0, true);
        position.remove_empty();
        assert!(position.pledges.is_empty());
    }

    #[test]
    fn test_remove_pledge_keeps_order() {
        let mut position = create_test_position();
        position.add_pledges(&[1, 2, 3], ONE, 0, 5).unwrap();

        assert_eq!(position.remove_pledge(2).unwrap().pool_id, 2);
        let ids: Vec<u64> = position.pledges.iter().map(|p| p.pool_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(position.remove_pledge(2).is_none());
    }

    #[test]
    fn test_deallocation_notice() {
        let pledge = PoolPledge {
            pool_id: 1,
            pledge: ONE,
            status: PledgeStatus::DeallocationRequested,
            deallocation_requested_at: 1_000,
            ..Default::default()
        };
        assert!(!pledge.is_deallocation_ready(1_099, 100));
        assert!(pledge.is_deallocation_ready(1_100, 100));

        let allocated = PoolPledge { status: PledgeStatus::Allocated, ..pledge };
        assert!(!allocated.is_deallocation_ready(i64::MAX, 100));
    }

    // ==================== COLLATERAL VETO TESTS ====================

    #[test]
    fn test_withdrawal_vetoed_when_coverage_would_be_uncovered() {
        // Pledged 1000, coverage sold 800: at most 200 may be reserved for exit
        let pool = create_test_pool(1_000 * ONE, 800 * ONE);
        let pledge = PoolPledge { pool_id: 1, pledge: 1_000 * ONE, ..Default::default() };

        let reserve = withdrawal_reservation(&pledge, 500 * ONE);
        assert_eq!(reserve, 500 * ONE);
        assert!(!pool.can_release(reserve));
        assert!(pool.can_release(withdrawal_reservation(&pledge, 200 * ONE)));
    }

    #[test]
    fn test_reservation_excludes_already_reserved_pledge() {
        let pledge = PoolPledge {
            pool_id: 1,
            pledge: 1_000 * ONE,
            deallocation_reserved: 700 * ONE,
            ..Default::default()
        };
        assert_eq!(withdrawal_reservation(&pledge, 500 * ONE), 300 * ONE);
    }

    // ==================== CLAIM SPLIT TESTS ====================

    #[test]
    fn test_claim_paid_from_pool_with_fee() {
        // 1000 coverage, 5% fee, pool holds plenty
        let split = ClaimSplit::compute(1_000 * ONE, 500, 10_000 * ONE).unwrap();
        assert_eq!(split.fee, 50 * ONE);
        assert_eq!(split.pool_to_fee, 50 * ONE);
        assert_eq!(split.pool_to_claimant, 950 * ONE);
        assert_eq!(split.from_reserve(), 0);
    }

    #[test]
    fn test_claim_shortfall_drawn_from_reserve() {
        let split = ClaimSplit::compute(1_000 * ONE, 500, 600 * ONE).unwrap();
        assert_eq!(split.from_pool(), 600 * ONE);
        assert_eq!(split.pool_to_fee, 50 * ONE);
        assert_eq!(split.pool_to_claimant, 550 * ONE);
        assert_eq!(split.reserve_to_claimant, 400 * ONE);
        assert_eq!(split.reserve_to_fee, 0);
        assert_eq!(split.from_pool() + split.from_reserve(), 1_000 * ONE);
    }

    #[test]
    fn test_claim_on_empty_pool_is_all_reserve() {
        let split = ClaimSplit::compute(1_000 * ONE, 500, 0).unwrap();
        assert_eq!(split.from_pool(), 0);
        assert_eq!(split.reserve_to_fee, 50 * ONE);
        assert_eq!(split.reserve_to_claimant, 950 * ONE);
    }

    #[test]
    fn test_pool_smaller_than_fee() {
        let split = ClaimSplit::compute(1_000 * ONE, 1_000, 30 * ONE).unwrap();
        assert_eq!(split.pool_to_fee, 30 * ONE);
        assert_eq!(split.pool_to_claimant, 0);
        assert_eq!(split.reserve_to_fee, 70 * ONE);
        assert_eq!(split.reserve_to_claimant, 900 * ONE);
    }

    // ==================== INSOLVENCY TESTS ====================

    #[test]
    fn test_insolvency_threshold() {
        assert!(is_insolvent(600 * ONE, 600 * ONE, 600 * ONE));
        assert!(is_insolvent(700 * ONE, 600 * ONE, 600 * ONE));
        assert!(!is_insolvent(599 * ONE, 600 * ONE, 600 * ONE));
        // No shares, nothing to liquidate
        assert!(!is_insolvent(100 * ONE, 0, 0));
    }
}
