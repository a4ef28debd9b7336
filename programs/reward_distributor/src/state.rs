// programs/reward_distributor/src/state.rs

use anchor_lang::prelude::*;
use underwriting_core::math;
use underwriting_core::protocol_constants::MAX_REWARD_TOKENS;
use underwriting_core::seeds;
use crate::errors::RewardError;

/// Reward distributor configuration
/// PDA seeds: ["reward_config"]
#[account]
#[derive(InitSpace)]
pub struct RewardConfig {
    /// Owner that can rotate orchestrator and reserve
    pub owner: Pubkey,

    /// Only caller allowed to distribute, checkpoint and claim for underwriters
    pub orchestrator: Pubkey,

    /// Catastrophe reserve allowed to settle and pay claims for users
    pub reserve: Pubkey,

    /// Bump of the vault authority PDA
    pub authority_bump: u8,

    /// Bump seed
    pub bump: u8,
}

impl RewardConfig {
    pub const SEED_PREFIX: &'static [u8] = b"reward_config";
    pub const AUTHORITY_SEED: &'static [u8] = b"reward_authority";
    pub const VAULT_SEED: &'static [u8] = b"reward_vault";
}

/// Accumulator for one reward token inside a pool
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, InitSpace, PartialEq, Eq, Debug)]
pub struct RewardStream {
    /// Reward token mint
    pub mint: Pubkey,

    /// Reward per unit pledge, scaled by PRECISION
    pub reward_per_pledge: u128,

    /// Sum of all amounts distributed in this stream
    pub total_distributed: u64,

    /// Sum of all amounts paid out of this stream
    pub total_claimed: u64,
}

impl RewardStream {
    /// Distributed but not yet paid out
    pub fn unclaimed(&self) -> u64 {
        self.total_distributed.saturating_sub(self.total_claimed)
    }
}

/// Reward streams of one pool, keyed by mint
/// PDA seeds: ["pool_rewards", pool_id]
#[account]
#[derive(InitSpace)]
pub struct PoolRewards {
    /// Pool identifier
    pub pool_id: u64,

    /// One stream per reward mint
    #[max_len(4)]
    pub streams: Vec<RewardStream>,

    /// Bump seed
    pub bump: u8,
}

impl PoolRewards {
    pub const SEED_PREFIX: &'static [u8] = seeds::POOL_REWARDS;

    pub fn stream(&self, mint: &Pubkey) -> Option<&RewardStream> {
        self.streams.iter().find(|s| s.mint == *mint)
    }

    /// Spread `amount` of `mint` over `total_pledge`, opening the stream on first use.
    /// Ok(false) when skipped for a zero amount or zero pledge.
    pub fn record_reward(
        &mut self,
        mint: Pubkey,
        amount: u64,
        total_pledge: u64,
    ) -> std::result::Result<bool, RewardError> {
        if amount == 0 || total_pledge == 0 {
            return Ok(false);
        }
        let increment =
            math::tracker_increment(amount, total_pledge).ok_or(RewardError::MathOverflow)?;

        let index = match self.streams.iter().position(|s| s.mint == mint) {
            Some(index) => index,
            None => {
                if self.streams.len() >= MAX_REWARD_TOKENS {
                    return Err(RewardError::RewardStreamLimit);
                }
                self.streams.push(RewardStream {
                    mint,
                    ..Default::default()
                });
                self.streams.len() - 1
            }
        };

        let stream = &mut self.streams[index];
        stream.reward_per_pledge = stream
            .reward_per_pledge
            .checked_add(increment)
            .ok_or(RewardError::MathOverflow)?;
        stream.total_distributed = stream.total_distributed.saturating_add(amount);
        Ok(true)
    }
}

/// Per-mint position of an underwriter inside a pool's streams
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, InitSpace, PartialEq, Eq, Debug)]
pub struct RewardCheckpoint {
    pub mint: Pubkey,

    /// Stream tracker value at the last settlement
    pub checkpoint: u128,

    /// Settled but unclaimed rewards
    pub accrued: u64,
}

/// An underwriter's reward checkpoints for one pool
/// PDA seeds: ["underwriter_rewards", underwriter, pool_id]
///
/// A stream without an entry is treated as checkpoint 0. That holds because
/// every pledge change settles all existing streams first, so a missing entry
/// can only belong to a stream opened while the current pledge was in force.
#[account]
#[derive(InitSpace, Default)]
pub struct UnderwriterRewards {
    /// Underwriter wallet
    pub underwriter: Pubkey,

    /// Pool identifier
    pub pool_id: u64,

    #[max_len(4)]
    pub entries: Vec<RewardCheckpoint>,

    /// Lifetime claimed across all mints
    pub total_claimed: u64,

    /// Bump seed
    pub bump: u8,
}

impl UnderwriterRewards {
    pub const SEED_PREFIX: &'static [u8] = seeds::UNDERWRITER_REWARDS;

    pub fn is_initialized(&self) -> bool {
        self.underwriter != Pubkey::default()
    }

    fn entry(&self, mint: &Pubkey) -> Option<&RewardCheckpoint> {
        self.entries.iter().find(|e| e.mint == *mint)
    }

    /// Settle every stream at `pledge` and move checkpoints to the trackers
    pub fn accrue_all(
        &mut self,
        pool: &PoolRewards,
        pledge: u64,
    ) -> std::result::Result<(), RewardError> {
        for stream in pool.streams.iter() {
            let index = match self.entries.iter().position(|e| e.mint == stream.mint) {
                Some(index) => index,
                None => {
                    if self.entries.len() >= MAX_REWARD_TOKENS {
                        return Err(RewardError::RewardStreamLimit);
                    }
                    self.entries.push(RewardCheckpoint {
                        mint: stream.mint,
                        ..Default::default()
                    });
                    self.entries.len() - 1
                }
            };

            let entry = &mut self.entries[index];
            let earned = math::accrued_since(stream.reward_per_pledge, entry.checkpoint, pledge)
                .ok_or(RewardError::MathOverflow)?;
            entry.accrued = entry
                .accrued
                .checked_add(earned)
                .ok_or(RewardError::MathOverflow)?;
            entry.checkpoint = stream.reward_per_pledge;
        }
        Ok(())
    }

    /// Settled plus not-yet-settled rewards for one mint
    pub fn pending(&self, pool: &PoolRewards, mint: &Pubkey, pledge: u64) -> Option<u64> {
        let (checkpoint, accrued) = self
            .entry(mint)
            .map(|e| (e.checkpoint, e.accrued))
            .unwrap_or((0, 0));
        let unsettled = match pool.stream(mint) {
            Some(stream) => math::accrued_since(stream.reward_per_pledge, checkpoint, pledge)?,
            None => 0,
        };
        accrued.checked_add(unsettled)
    }

    /// Settle and take the full claimable amount for `mint`.
    /// Never pays more than the stream still holds; accrual beyond that is dropped.
    pub fn take_claimable(
        &mut self,
        pool: &mut PoolRewards,
        mint: &Pubkey,
        pledge: u64,
    ) -> std::result::Result<u64, RewardError> {
        self.accrue_all(pool, pledge)?;
        let accrued = match self.entries.iter_mut().find(|e| e.mint == *mint) {
            Some(entry) => std::mem::take(&mut entry.accrued),
            None => 0,
        };
        let stream = match pool.streams.iter_mut().find(|s| s.mint == *mint) {
            Some(stream) => stream,
            None => return Ok(0),
        };

        let amount = accrued.min(stream.unclaimed());
        stream.total_claimed = stream
            .total_claimed
            .checked_add(amount)
            .ok_or(RewardError::MathOverflow)?;
        self.total_claimed = self.total_claimed.saturating_add(amount);
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: u64 = 1_000_000;

    fn create_test_pool_rewards() -> PoolRewards {
        PoolRewards {
            pool_id: 1,
            streams: vec![],
            bump: 255,
        }
    }

    fn create_test_underwriter() -> UnderwriterRewards {
        UnderwriterRewards {
            underwriter: Pubkey::new_unique(),
            pool_id: 1,
            entries: vec![],
            total_claimed: 0,
            bump: 255,
        }
    }

    // ==================== DISTRIBUTION TESTS ====================

    #[test]
    fn test_pending_accumulates_across_distributions() {
        let usdc = Pubkey::new_unique();
        let mut pool = create_test_pool_rewards();
        let underwriter = create_test_underwriter();

        // 100 to a pool with 1000 pledged, underwriter holds all of it
        pool.record_reward(usdc, 100 * ONE, 1_000 * ONE).unwrap();
        assert_eq!(underwriter.pending(&pool, &usdc, 1_000 * ONE), Some(100 * ONE));

        pool.record_reward(usdc, 100 * ONE, 1_000 * ONE).unwrap();
        assert_eq!(underwriter.pending(&pool, &usdc, 1_000 * ONE), Some(200 * ONE));
    }

    #[test]
    fn test_zero_pledge_or_amount_skips() {
        let usdc = Pubkey::new_unique();
        let mut pool = create_test_pool_rewards();
        assert!(!pool.record_reward(usdc, 100 * ONE, 0).unwrap());
        assert!(!pool.record_reward(usdc, 0, 1_000 * ONE).unwrap());
        assert!(pool.streams.is_empty());
    }

    #[test]
    fn test_streams_independent_per_token() {
        let usdc = Pubkey::new_unique();
        let distressed = Pubkey::new_unique();
        let mut pool = create_test_pool_rewards();
        let underwriter = create_test_underwriter();

        pool.record_reward(usdc, 100 * ONE, 1_000 * ONE).unwrap();
        pool.record_reward(distressed, 40 * ONE, 1_000 * ONE).unwrap();

        assert_eq!(underwriter.pending(&pool, &usdc, 500 * ONE), Some(50 * ONE));
        assert_eq!(underwriter.pending(&pool, &distressed, 500 * ONE), Some(20 * ONE));
    }

    #[test]
    fn test_stream_limit() {
        let mut pool = create_test_pool_rewards();
        for _ in 0..MAX_REWARD_TOKENS {
            pool.record_reward(Pubkey::new_unique(), ONE, ONE).unwrap();
        }
        assert!(matches!(
            pool.record_reward(Pubkey::new_unique(), ONE, ONE),
            Err(RewardError::RewardStreamLimit)
        ));
    }

    // ==================== SETTLEMENT TESTS ====================

    #[test]
    fn test_accrual_preserves_earnings_across_pledge_change() {
        let usdc = Pubkey::new_unique();
        let mut pool = create_test_pool_rewards();
        let mut underwriter = create_test_underwriter();

        pool.record_reward(usdc, 100 * ONE, 1_000 * ONE).unwrap();
        // Settle at the old pledge before doubling it
        underwriter.accrue_all(&pool, 1_000 * ONE).unwrap();

        pool.record_reward(usdc, 100 * ONE, 2_000 * ONE).unwrap();
        assert_eq!(underwriter.pending(&pool, &usdc, 2_000 * ONE), Some(200 * ONE));
    }

    #[test]
    fn test_new_pledger_checkpointed_at_current_tracker() {
        let usdc = Pubkey::new_unique();
        let mut pool = create_test_pool_rewards();
        pool.record_reward(usdc, 100 * ONE, 1_000 * ONE).unwrap();

        let mut joiner = create_test_underwriter();
        joiner.accrue_all(&pool, 0).unwrap();
        assert_eq!(joiner.pending(&pool, &usdc, 500 * ONE), Some(0));
    }

    #[test]
    fn test_take_claimable_resets_and_is_idempotent() {
        let usdc = Pubkey::new_unique();
        let mut pool = create_test_pool_rewards();
        let mut underwriter = create_test_underwriter();

        pool.record_reward(usdc, 100 * ONE, 1_000 * ONE).unwrap();
        assert_eq!(underwriter.take_claimable(&mut pool, &usdc, 1_000 * ONE).unwrap(), 100 * ONE);
        assert_eq!(underwriter.take_claimable(&mut pool, &usdc, 1_000 * ONE).unwrap(), 0);
        assert_eq!(underwriter.total_claimed, 100 * ONE);
        assert_eq!(pool.stream(&usdc).unwrap().unclaimed(), 0);
    }

    #[test]
    fn test_inflated_pledge_capped_at_distributed() {
        let usdc = Pubkey::new_unique();
        let mut pool = create_test_pool_rewards();
        let mut underwriter = create_test_underwriter();

        pool.record_reward(usdc, 100, 1_000).unwrap();
        // A pledge 1000x the pool total would accrue 100_000
        assert_eq!(underwriter.take_claimable(&mut pool, &usdc, 1_000_000).unwrap(), 100);
        assert_eq!(underwriter.take_claimable(&mut pool, &usdc, 1_000_000).unwrap(), 0);
        assert_eq!(pool.stream(&usdc).unwrap().total_claimed, 100);
    }

    #[test]
    fn test_claims_of_two_pledgers_exhaust_stream() {
        let usdc = Pubkey::new_unique();
        let mut pool = create_test_pool_rewards();
        let mut first = create_test_underwriter();
        let mut second = create_test_underwriter();

        pool.record_reward(usdc, 90 * ONE, 900 * ONE).unwrap();
        assert_eq!(first.take_claimable(&mut pool, &usdc, 600 * ONE).unwrap(), 60 * ONE);
        assert_eq!(second.take_claimable(&mut pool, &usdc, 300 * ONE).unwrap(), 30 * ONE);
        assert_eq!(pool.stream(&usdc).unwrap().unclaimed(), 0);
    }

    #[test]
    fn test_untouched_checkpoint_counts_from_zero() {
        let usdc = Pubkey::new_unique();
        let mut pool = create_test_pool_rewards();
        pool.record_reward(usdc, 100 * ONE, 1_000 * ONE).unwrap();
        assert_eq!(UnderwriterRewards::default().pending(&pool, &usdc, 250 * ONE), Some(25 * ONE));
    }

    #[test]
    fn test_claim_of_unknown_mint_is_zero() {
        let mut pool = create_test_pool_rewards();
        let mut underwriter = create_test_underwriter();
        pool.record_reward(Pubkey::new_unique(), ONE, ONE).unwrap();
        assert_eq!(underwriter.take_claimable(&mut pool, &Pubkey::new_unique(), ONE).unwrap(), 0);
    }
}
