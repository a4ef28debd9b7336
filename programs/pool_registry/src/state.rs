// programs/pool_registry/src/state.rs

use anchor_lang::prelude::*;
use underwriting_core::math::BPS_DENOMINATOR;
use underwriting_core::protocol_constants::MAX_POOL_ADAPTERS;
use underwriting_core::seeds;

/// Registry configuration
/// PDA seeds: ["registry_config"]
#[account]
#[derive(InitSpace)]
pub struct RegistryConfig {
    /// Owner that can add pools and rotate the orchestrator
    pub owner: Pubkey,

    /// The single authorized caller for pool mutations (risk manager PDA)
    pub orchestrator: Pubkey,

    /// Number of pools created; valid ids are 0..pool_count
    pub pool_count: u64,

    /// Bump seed
    pub bump: u8,
}

impl RegistryConfig {
    pub const SEED_PREFIX: &'static [u8] = b"registry_config";

    pub fn is_valid_pool_id(&self, pool_id: u64) -> bool {
        pool_id < self.pool_count
    }
}

/// Kinked premium rate model, all values in basis points
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, InitSpace, PartialEq, Eq, Debug)]
pub struct RateModel {
    /// Rate at zero utilization
    pub base_rate_bps: u16,

    /// Rate added between 0 and kink utilization
    pub slope1_bps: u16,

    /// Rate added between kink and full utilization
    pub slope2_bps: u16,

    /// Utilization at which slope2 takes over
    pub kink_bps: u16,
}

impl RateModel {
    pub fn is_valid(&self) -> bool {
        self.kink_bps > 0 && (self.kink_bps as u64) < BPS_DENOMINATOR
    }

    /// Annualized premium rate for a given utilization
    pub fn rate_bps(&self, utilization_bps: u64) -> u64 {
        let kink = self.kink_bps as u64;
        let util = utilization_bps.min(BPS_DENOMINATOR);
        let base = self.base_rate_bps as u64;
        let slope1 = self.slope1_bps as u64;
        let slope2 = self.slope2_bps as u64;

        if kink == 0 {
            return base;
        }

        if util <= kink {
            base + slope1 * util / kink
        } else {
            let over = util - kink;
            let span = BPS_DENOMINATOR.saturating_sub(kink).max(1);
            base + slope1 + slope2 * over / span
        }
    }
}

/// Capital a pool holds in one yield adapter
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, InitSpace, PartialEq, Eq, Debug)]
pub struct AdapterAllocation {
    /// Yield choice (capital pool adapter id)
    pub yield_choice: u8,

    /// Pledged capital sitting in that adapter
    pub capital: u64,
}

/// Risk pool
/// PDA seeds: ["pool_state", pool_id]
#[account]
#[derive(InitSpace)]
pub struct PoolState {
    /// Pool identifier
    pub pool_id: u64,

    /// Asset covered by this pool; claimants surrender it and it is
    /// distributed to pledgers as a distressed asset
    pub protected_asset_mint: Pubkey,

    /// Sum of all underwriter pledges
    pub total_capital_pledged: u64,

    /// Outstanding coverage sold against this pool
    pub total_coverage_sold: u64,

    /// Pledge reserved by pending withdrawals / deallocations
    pub capital_pending_withdrawal: u64,

    /// Paused by governance (incident reported)
    pub is_paused: bool,

    /// Timestamp of the last pause (0 if never paused)
    pub paused_at: i64,

    /// Wallet receiving claim fees
    pub fee_recipient: Pubkey,

    /// Claim fee in basis points
    pub claim_fee_bps: u16,

    /// Premium rate model
    pub rate_model: RateModel,

    /// Capital per yield adapter
    #[max_len(8)]
    pub adapter_allocations: Vec<AdapterAllocation>,

    /// Creation timestamp
    pub created_at: i64,

    /// Bump seed
    pub bump: u8,
}

impl PoolState {
    pub const SEED_PREFIX: &'static [u8] = seeds::POOL_STATE;

    pub fn adapter_capital(&self, yield_choice: u8) -> u64 {
        self.adapter_allocations
            .iter()
            .find(|a| a.yield_choice == yield_choice)
            .map(|a| a.capital)
            .unwrap_or(0)
    }

    pub fn total_adapter_capital(&self) -> u64 {
        self.adapter_allocations
            .iter()
            .fold(0u64, |acc, a| acc.saturating_add(a.capital))
    }

    /// Add capital to an adapter entry, creating it if needed.
    /// None if the adapter list is full or the sum overflows.
    pub fn add_adapter_capital(&mut self, yield_choice: u8, amount: u64) -> Option<()> {
        if let Some(entry) = self
            .adapter_allocations
            .iter_mut()
            .find(|a| a.yield_choice == yield_choice)
        {
            entry.capital = entry.capital.checked_add(amount)?;
            return Some(());
        }

        if self.adapter_allocations.len() >= MAX_POOL_ADAPTERS {
            return None;
        }
        self.adapter_allocations.push(AdapterAllocation {
            yield_choice,
            capital: amount,
        });
        Some(())
    }

    /// Remove capital from an adapter entry; entries reaching zero are dropped
    pub fn remove_adapter_capital(&mut self, yield_choice: u8, amount: u64) {
        if let Some(entry) = self
            .adapter_allocations
            .iter_mut()
            .find(|a| a.yield_choice == yield_choice)
        {
            entry.capital = entry.capital.saturating_sub(amount);
        }
        self.adapter_allocations.retain(|a| a.capital > 0);
    }

    /// Pledge not already reserved for exit
    pub fn committed_capital(&self) -> u64 {
        self.total_capital_pledged
            .saturating_sub(self.capital_pending_withdrawal)
    }

    /// Capital still available to back new coverage
    pub fn available_capital(&self) -> u64 {
        self.committed_capital()
            .saturating_sub(self.total_coverage_sold)
    }

    /// Collateral check: can `amount` of pledge be reserved for exit
    /// while coverage sold stays fully backed
    pub fn can_release(&self, amount: u64) -> bool {
        self.committed_capital().saturating_sub(amount) >= self.total_coverage_sold
            && amount <= self.committed_capital()
    }

    pub fn utilization_bps(&self) -> u64 {
        let committed = self.committed_capital();
        if committed == 0 {
            return if self.total_coverage_sold > 0 {
                BPS_DENOMINATOR
            } else {
                0
            };
        }
        ((self.total_coverage_sold as u128 * BPS_DENOMINATOR as u128) / committed as u128)
            .min(BPS_DENOMINATOR as u128) as u64
    }

    pub fn current_rate_bps(&self) -> u64 {
        self.rate_model.rate_bps(self.utilization_bps())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== POOL STATE TESTS ====================

    fn create_test_pool() -> PoolState {
        PoolState {
            pool_id: 0,
            protected_asset_mint: Pubkey::new_unique(),
            total_capital_pledged: 1_500_000_000, // 1,500 USDC
            total_coverage_sold: 1_000_000_000,   // 1,000 USDC
            capital_pending_withdrawal: 0,
            is_paused: false,
            paused_at: 0,
            fee_recipient: Pubkey::new_unique(),
            claim_fee_bps: 500,
            rate_model: RateModel {
                base_rate_bps: 200,
                slope1_bps: 1_000,
                slope2_bps: 4_000,
                kink_bps: 8_000,
            },
            adapter_allocations: vec![],
            created_at: 0,
            bump: 255,
        }
    }

    #[test]
    fn test_adapter_capital_bookkeeping() {
        let mut pool = create_test_pool();
        pool.add_adapter_capital(1, 1_000).unwrap();
        pool.add_adapter_capital(2, 500).unwrap();
        pool.add_adapter_capital(1, 250).unwrap();

        assert_eq!(pool.adapter_capital(1), 1_250);
        assert_eq!(pool.adapter_capital(2), 500);
        assert_eq!(pool.total_adapter_capital(), 1_750);

        pool.remove_adapter_capital(2, 500);
        assert_eq!(pool.adapter_allocations.len(), 1);
        assert_eq!(pool.adapter_capital(2), 0);

        // Over-removal clamps and drops the entry
        pool.remove_adapter_capital(1, 10_000);
        assert!(pool.adapter_allocations.is_empty());
    }

    #[test]
    fn test_adapter_list_is_bounded() {
        let mut pool = create_test_pool();
        for choice in 0..MAX_POOL_ADAPTERS as u8 {
            pool.add_adapter_capital(choice, 1).unwrap();
        }
        assert!(pool.add_adapter_capital(200, 1).is_none());
        // Existing entries still accept capital
        assert!(pool.add_adapter_capital(0, 1).is_some());
    }

    #[test]
    fn test_can_release_respects_coverage_sold() {
        let mut pool = create_test_pool();
        // 1,500 pledged, 1,000 sold: 500 is free
        assert!(pool.can_release(500_000_000));
        assert!(!pool.can_release(500_000_001));

        // Reservations already pending reduce headroom
        pool.capital_pending_withdrawal = 200_000_000;
        assert!(pool.can_release(300_000_000));
        assert!(!pool.can_release(300_000_001));
    }

    #[test]
    fn test_can_release_everything_without_coverage() {
        let mut pool = create_test_pool();
        pool.total_coverage_sold = 0;
        assert!(pool.can_release(pool.total_capital_pledged));
        assert!(!pool.can_release(pool.total_capital_pledged + 1));
    }

    #[test]
    fn test_utilization_and_rate() {
        let mut pool = create_test_pool();
        pool.total_capital_pledged = 1_000;
        pool.total_coverage_sold = 400;
        assert_eq!(pool.utilization_bps(), 4_000);
        // 200 + 1000 * 4000 / 8000
        assert_eq!(pool.current_rate_bps(), 700);

        pool.total_coverage_sold = 900;
        // 200 + 1000 + 4000 * 1000 / 2000
        assert_eq!(pool.current_rate_bps(), 3_200);

        pool.total_capital_pledged = 0;
        assert_eq!(pool.utilization_bps(), BPS_DENOMINATOR);
    }

    #[test]
    fn test_rate_model_validation() {
        assert!(create_test_pool().rate_model.is_valid());
        assert!(!RateModel::default().is_valid());
    }

    #[test]
    fn test_pool_id_validity() {
        let config = RegistryConfig {
            owner: Pubkey::new_unique(),
            orchestrator: Pubkey::new_unique(),
            pool_count: 2,
            bump: 255,
        };
        assert!(config.is_valid_pool_id(0));
        assert!(config.is_valid_pool_id(1));
        assert!(!config.is_valid_pool_id(2));
    }
}
