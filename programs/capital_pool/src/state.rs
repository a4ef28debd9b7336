// programs/capital_pool/src/state.rs

use anchor_lang::prelude::*;
use underwriting_core::math;
use underwriting_core::protocol_constants;
use underwriting_core::seeds;
use underwriting_core::WithdrawalStatus;
use crate::errors::CapitalError;

// =============================================================================
// CONFIG AND SYSTEM TOTALS
// =============================================================================

/// Capital pool configuration and system-wide share totals
/// PDA seeds: ["capital_pool_config"]
#[account]
#[derive(InitSpace)]
pub struct CapitalPoolConfig {
    /// Owner (adapter registration, notice period)
    pub owner: Pubkey,

    /// Risk manager PDA; set once after deployment
    pub orchestrator: Pubkey,

    /// Underlying asset (e.g. USDC)
    pub asset_mint: Pubkey,

    /// Withdrawal notice period in seconds
    pub notice_period_secs: i64,

    /// Total master shares outstanding
    pub total_master_shares: u64,

    /// Total value backing the shares
    pub total_system_value: u64,

    /// Claim payouts already paid out of adapters but not yet charged
    /// to underwriters through loss realization
    pub unrealized_payouts: u64,

    /// Number of active yield adapters
    pub active_adapter_count: u8,

    /// Last yield sync
    pub last_sync_at: i64,

    /// Bump seed
    pub bump: u8,
}

impl CapitalPoolConfig {
    pub const SEED_PREFIX: &'static [u8] = b"capital_pool_config";
    pub const DEFAULT_NOTICE_PERIOD_SECS: i64 = protocol_constants::DEFAULT_NOTICE_PERIOD_SECS;

    pub fn is_orchestrator_set(&self) -> bool {
        self.orchestrator != Pubkey::default()
    }

    pub fn shares_to_value(&self, shares: u64) -> Option<u64> {
        math::shares_to_value(shares, self.total_master_shares, self.total_system_value)
    }

    pub fn value_to_shares(&self, value: u64) -> Option<u64> {
        math::value_to_shares(value, self.total_master_shares, self.total_system_value)
    }

    /// Shares a deposit of `amount` would mint. None when supply exists but
    /// carries no value.
    pub fn preview_deposit(&self, amount: u64) -> Option<u64> {
        math::shares_for_deposit(amount, self.total_master_shares, self.total_system_value)
    }

    /// Mint shares for `amount` at the current price and grow both totals
    pub fn mint_shares(&mut self, amount: u64) -> Option<u64> {
        let shares = self.preview_deposit(amount)?;
        self.total_master_shares = self.total_master_shares.checked_add(shares)?;
        self.total_system_value = self.total_system_value.checked_add(amount)?;
        Some(shares)
    }

    /// Remove shares and the value they carried from the totals
    pub fn burn_shares(&mut self, shares: u64, value: u64) {
        self.total_master_shares = self.total_master_shares.saturating_sub(shares);
        self.total_system_value = self.total_system_value.saturating_sub(value);
    }

    /// Value the ledger should hold once every adapter and the idle vault are counted
    pub fn synced_value(&self, held: u64) -> Option<u64> {
        held.checked_add(self.unrealized_payouts)
    }
}

/// Authority over the idle vault and every adapter vault
/// PDA seeds: ["vault_authority"]
#[account]
#[derive(InitSpace)]
pub struct VaultAuthority {
    /// Idle (unallocated) balance
    pub idle_vault: Pubkey,

    /// Asset mint
    pub asset_mint: Pubkey,

    /// Bump seed
    pub bump: u8,
}

impl VaultAuthority {
    pub const SEED_PREFIX: &'static [u8] = b"vault_authority";
    pub const IDLE_VAULT_SEED: &'static [u8] = b"idle_vault";
}

// =============================================================================
// YIELD ADAPTERS
// =============================================================================

/// A yield venue bound to one yield choice. Its held value is the vault balance.
/// PDA seeds: ["yield_adapter", yield_choice]
#[account]
#[derive(InitSpace)]
pub struct YieldAdapter {
    pub yield_choice: u8,

    /// Token vault owned by the vault authority
    pub vault: Pubkey,

    pub is_active: bool,

    /// Lifetime deposits forwarded into this adapter
    pub total_deposited: u64,

    /// Lifetime withdrawals paid to underwriters out of this adapter
    pub total_withdrawn: u64,

    /// Bump seed
    pub bump: u8,
}

impl YieldAdapter {
    pub const SEED_PREFIX: &'static [u8] = b"yield_adapter";
    pub const VAULT_SEED: &'static [u8] = b"adapter_vault";
}

/// Capital a pool holds in one adapter, as recorded by the registry
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct AdapterCapital {
    pub yield_choice: u8,
    pub capital: u64,
}

/// Split `total` across adapters pro rata to the capital each holds for the pool.
/// Rounding dust goes to the last adapter so the parts sum to `total`.
pub fn plan_gather(total: u64, capital_per_adapter: &[AdapterCapital]) -> Option<Vec<u64>> {
    let pool_capital = capital_per_adapter
        .iter()
        .try_fold(0u64, |acc, a| acc.checked_add(a.capital))?;
    if total > pool_capital {
        return None;
    }

    let mut parts = Vec::with_capacity(capital_per_adapter.len());
    let mut planned = 0u64;
    for (i, entry) in capital_per_adapter.iter().enumerate() {
        let part = if i + 1 == capital_per_adapter.len() {
            total - planned
        } else {
            math::pro_rata(total, entry.capital, pool_capital)?
        };
        planned = planned.checked_add(part)?;
        parts.push(part);
    }
    Some(parts)
}

// =============================================================================
// UNDERWRITER ACCOUNT
// =============================================================================

/// Result of an executed withdrawal, returned to the orchestrator
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct WithdrawalReceipt {
    pub shares_burned: u64,
    pub value: u64,
    pub principal_removed: u64,
    pub is_full: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct LossApplication {
    pub applied: u64,
    pub shares_burned: u64,
}

/// Underwriter share account
/// PDA seeds: ["underwriter", owner]
///
/// Persists at zero shares so loss and reward checkpoints keyed by the
/// owner stay meaningful across re-deposits.
#[account]
#[derive(InitSpace)]
pub struct UnderwriterAccount {
    pub owner: Pubkey,

    pub master_shares: u64,

    /// Principal deposited, net of withdrawals and realized losses
    pub total_deposited_principal: u64,

    /// Bound yield adapter; None until first deposit and after a full exit
    pub yield_choice: Option<u8>,

    /// Shares reserved by the pending request
    pub withdrawal_request_shares: u64,

    /// 0 = no request
    pub withdrawal_request_timestamp: i64,

    pub created_at: i64,

    /// Bump seed
    pub bump: u8,
}

impl UnderwriterAccount {
    pub const SEED_PREFIX: &'static [u8] = seeds::UNDERWRITER_ACCOUNT;

    pub fn is_initialized(&self) -> bool {
        self.owner != Pubkey::default()
    }

    pub fn withdrawal_status(&self) -> WithdrawalStatus {
        WithdrawalStatus::from_timestamp(self.withdrawal_request_timestamp)
    }

    /// Principal carried by `shares`, pro rata to this account's holding
    pub fn principal_for_shares(&self, shares: u64) -> Option<u64> {
        if shares >= self.master_shares {
            return Some(self.total_deposited_principal);
        }
        math::pro_rata(self.total_deposited_principal, shares, self.master_shares)
    }

    fn clear_request(&mut self) {
        self.withdrawal_request_shares = 0;
        self.withdrawal_request_timestamp = 0;
    }

    /// A pending request survives with zero shares so the orchestrator can
    /// still cancel or execute it and release what it reserved.
    fn release_if_empty(&mut self) {
        if self.master_shares == 0 {
            self.total_deposited_principal = 0;
            self.yield_choice = None;
            self.withdrawal_request_shares = 0;
        }
    }

    /// Mint shares for a deposit. Returns shares minted.
    pub fn record_deposit(
        &mut self,
        config: &mut CapitalPoolConfig,
        amount: u64,
        yield_choice: u8,
    ) -> std::result::Result<u64, CapitalError> {
        if amount == 0 {
            return Err(CapitalError::InvalidAmount);
        }
        if let Some(current) = self.yield_choice {
            if self.master_shares > 0 && current != yield_choice {
                return Err(CapitalError::YieldChoiceLocked);
            }
        }

        match config.preview_deposit(amount) {
            Some(0) | None => return Err(CapitalError::ZeroSharesMinted),
            Some(_) => {}
        }
        let shares = config.mint_shares(amount).ok_or(CapitalError::MathOverflow)?;

        self.master_shares = self
            .master_shares
            .checked_add(shares)
            .ok_or(CapitalError::MathOverflow)?;
        self.total_deposited_principal = self
            .total_deposited_principal
            .checked_add(amount)
            .ok_or(CapitalError::MathOverflow)?;
        self.yield_choice = Some(yield_choice);
        Ok(shares)
    }

    /// Open a withdrawal request. Returns the current value of the shares.
    pub fn request_withdrawal(
        &mut self,
        config: &CapitalPoolConfig,
        shares: u64,
        now: i64,
    ) -> std::result::Result<u64, CapitalError> {
        if shares == 0 {
            return Err(CapitalError::InvalidAmount);
        }
        if self.withdrawal_status().is_pending() {
            return Err(CapitalError::WithdrawalAlreadyRequested);
        }
        if shares > self.master_shares {
            return Err(CapitalError::InsufficientShares);
        }

        let value = config
            .shares_to_value(shares)
            .ok_or(CapitalError::MathOverflow)?;
        self.withdrawal_request_shares = shares;
        self.withdrawal_request_timestamp = now;
        Ok(value)
    }

    /// Drop the pending request. Returns the shares it held.
    pub fn cancel_withdrawal(&mut self) -> std::result::Result<u64, CapitalError> {
        if !self.withdrawal_status().is_pending() {
            return Err(CapitalError::NoActiveRequest);
        }
        let shares = self.withdrawal_request_shares;
        self.clear_request();
        Ok(shares)
    }

    /// Burn the requested shares once the notice period has elapsed.
    /// Losses realized since the request may have burned part of them,
    /// so at most the shares still held are burned.
    pub fn execute_withdrawal(
        &mut self,
        config: &mut CapitalPoolConfig,
        now: i64,
    ) -> std::result::Result<WithdrawalReceipt, CapitalError> {
        let status = self.withdrawal_status();
        if !status.is_pending() {
            return Err(CapitalError::NoActiveRequest);
        }
        if !status.is_executable(now, config.notice_period_secs) {
            return Err(CapitalError::NoticePeriodActive);
        }

        let shares = self.withdrawal_request_shares.min(self.master_shares);
        let value = config
            .shares_to_value(shares)
            .ok_or(CapitalError::MathOverflow)?;
        let principal_removed = self
            .principal_for_shares(shares)
            .ok_or(CapitalError::MathOverflow)?;

        self.master_shares -= shares;
        self.total_deposited_principal = self
            .total_deposited_principal
            .saturating_sub(principal_removed);
        config.burn_shares(shares, value);
        self.clear_request();

        let is_full = self.master_shares == 0;
        self.release_if_empty();

        Ok(WithdrawalReceipt {
            shares_burned: shares,
            value,
            principal_removed,
            is_full,
        })
    }

    /// Charge a realized loss. Principal is reduced by min(loss, principal) and
    /// shares covering that amount, rounded up, are burned; balances never go negative.
    pub fn apply_loss(
        &mut self,
        config: &mut CapitalPoolConfig,
        loss: u64,
        is_withdrawal_realization: bool,
    ) -> std::result::Result<LossApplication, CapitalError> {
        let applied = loss.min(self.total_deposited_principal);
        if applied == 0 {
            if is_withdrawal_realization {
                self.clear_request();
            }
            return Ok(LossApplication::default());
        }

        let mut shares_burned = config
            .value_to_shares(applied)
            .ok_or(CapitalError::MathOverflow)?
            .min(self.master_shares);
        let mut value_removed = applied;
        if shares_burned == self.master_shares {
            let held = config
                .shares_to_value(self.master_shares)
                .ok_or(CapitalError::MathOverflow)?;
            value_removed = value_removed.min(held);
            shares_burned = self.master_shares;
        }

        self.master_shares -= shares_burned;
        self.total_deposited_principal -= applied;
        config.burn_shares(shares_burned, value_removed);
        config.unrealized_payouts = config.unrealized_payouts.saturating_sub(value_removed);

        if is_withdrawal_realization {
            self.clear_request();
        }
        self.release_if_empty();

        Ok(LossApplication {
            applied,
            shares_burned,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: u64 = 1_000_000;
    const NOTICE: i64 = 30 * 86_400;
    const T0: i64 = 1_700_000_000;

    fn create_test_config() -> CapitalPoolConfig {
        CapitalPoolConfig {
            owner: Pubkey::new_unique(),
            orchestrator: Pubkey::new_unique(),
            asset_mint: Pubkey::new_unique(),
            notice_period_secs: NOTICE,
            total_master_shares: 0,
            total_system_value: 0,
            unrealized_payouts: 0,
            active_adapter_count: 1,
            last_sync_at: 0,
            bump: 255,
        }
    }

    fn create_test_account() -> UnderwriterAccount {
        UnderwriterAccount {
            owner: Pubkey::new_unique(),
            master_shares: 0,
            total_deposited_principal: 0,
            yield_choice: None,
            withdrawal_request_shares: 0,
            withdrawal_request_timestamp: 0,
            created_at: T0,
            bump: 255,
        }
    }

    fn total_account_value(config: &CapitalPoolConfig, accounts: &[&UnderwriterAccount]) -> u64 {
        accounts
            .iter()
            .map(|a| config.shares_to_value(a.master_shares).unwrap())
            .sum()
    }

    // ==================== DEPOSIT TESTS ====================

    #[test]
    fn test_first_deposit_mints_one_to_one() {
        let mut config = create_test_config();
        let mut account = create_test_account();

        let shares = account.record_deposit(&mut config, 1_000 * ONE, 1).unwrap();
        assert_eq!(shares, 1_000 * ONE);
        assert_eq!(config.total_master_shares, 1_000 * ONE);
        assert_eq!(config.total_system_value, 1_000 * ONE);
        assert_eq!(account.yield_choice, Some(1));
    }

    #[test]
    fn test_deposit_after_yield_prices_at_current_ratio() {
        let mut config = create_test_config();
        let mut first = create_test_account();
        let mut second = create_test_account();

        first.record_deposit(&mut config, 1_000 * ONE, 1).unwrap();
        // Yield sync doubles the value held
        config.total_system_value = 2_000 * ONE;

        let shares = second.record_deposit(&mut config, 1_000 * ONE, 1).unwrap();
        assert_eq!(shares, 500 * ONE);
        assert_eq!(config.shares_to_value(second.master_shares), Some(1_000 * ONE));
    }

    #[test]
    fn test_zero_deposit_rejected() {
        let mut config = create_test_config();
        let mut account = create_test_account();
        assert!(matches!(
            account.record_deposit(&mut config, 0, 1),
            Err(CapitalError::InvalidAmount)
        ));
    }

    #[test]
    fn test_yield_choice_locked_while_holding_shares() {
        let mut config = create_test_config();
        let mut account = create_test_account();
        account.record_deposit(&mut config, 100 * ONE, 1).unwrap();

        assert!(matches!(
            account.record_deposit(&mut config, 100 * ONE, 2),
            Err(CapitalError::YieldChoiceLocked)
        ));
        assert!(account.record_deposit(&mut config, 100 * ONE, 1).is_ok());
    }

    // ==================== WITHDRAWAL TESTS ====================

    #[test]
    fn test_single_outstanding_request() {
        let mut config = create_test_config();
        let mut account = create_test_account();
        account.record_deposit(&mut config, 100 * ONE, 1).unwrap();

        assert_eq!(account.request_withdrawal(&config, 40 * ONE, T0).unwrap(), 40 * ONE);
        assert!(matches!(
            account.request_withdrawal(&config, 10 * ONE, T0 + 1),
            Err(CapitalError::WithdrawalAlreadyRequested)
        ));
    }

    #[test]
    fn test_request_more_than_held_rejected() {
        let mut config = create_test_config();
        let mut account = create_test_account();
        account.record_deposit(&mut config, 100 * ONE, 1).unwrap();

        assert!(matches!(
            account.request_withdrawal(&config, 101 * ONE, T0),
            Err(CapitalError::InsufficientShares)
        ));
        assert_eq!(account.withdrawal_request_timestamp, 0);
    }

    #[test]
    fn test_execute_gated_by_notice_period() {
        let mut config = create_test_config();
        let mut account = create_test_account();
        account.record_deposit(&mut config, 100 * ONE, 1).unwrap();
        account.request_withdrawal(&config, 100 * ONE, T0).unwrap();

        assert!(matches!(
            account.execute_withdrawal(&mut config, T0 + NOTICE - 1),
            Err(CapitalError::NoticePeriodActive)
        ));
        assert!(account.execute_withdrawal(&mut config, T0 + NOTICE).is_ok());
    }

    #[test]
    fn test_execute_without_request() {
        let mut config = create_test_config();
        let mut account = create_test_account();
        account.record_deposit(&mut config, 100 * ONE, 1).unwrap();
        assert!(matches!(
            account.execute_withdrawal(&mut config, T0),
            Err(CapitalError::NoActiveRequest)
        ));
    }

    #[test]
    fn test_cancel_clears_request() {
        let mut config = create_test_config();
        let mut account = create_test_account();
        account.record_deposit(&mut config, 100 * ONE, 1).unwrap();
        account.request_withdrawal(&config, 60 * ONE, T0).unwrap();

        assert_eq!(account.cancel_withdrawal().unwrap(), 60 * ONE);
        assert!(!account.withdrawal_status().is_pending());
        assert!(matches!(account.cancel_withdrawal(), Err(CapitalError::NoActiveRequest)));
    }

    #[test]
    fn test_round_trip_returns_deposit() {
        let mut config = create_test_config();
        let mut account = create_test_account();
        account.record_deposit(&mut config, 1_000 * ONE, 1).unwrap();
        account.request_withdrawal(&config, 1_000 * ONE, T0).unwrap();

        let receipt = account.execute_withdrawal(&mut config, T0 + NOTICE).unwrap();
        assert_eq!(receipt.value, 1_000 * ONE);
        assert_eq!(receipt.principal_removed, 1_000 * ONE);
        assert!(receipt.is_full);
        assert_eq!(account.yield_choice, None);
        assert_eq!(config.total_master_shares, 0);
        assert_eq!(config.total_system_value, 0);
    }

    #[test]
    fn test_partial_withdrawal_removes_proportional_principal() {
        let mut config = create_test_config();
        let mut account = create_test_account();
        account.record_deposit(&mut config, 1_000 * ONE, 1).unwrap();
        account.request_withdrawal(&config, 250 * ONE, T0).unwrap();

        let receipt = account.execute_withdrawal(&mut config, T0 + NOTICE).unwrap();
        assert_eq!(receipt.principal_removed, 250 * ONE);
        assert!(!receipt.is_full);
        assert_eq!(account.total_deposited_principal, 750 * ONE);
        assert_eq!(account.yield_choice, Some(1));
    }

    #[test]
    fn test_conservation_across_deposits_and_withdrawals() {
        let mut config = create_test_config();
        let mut a = create_test_account();
        let mut b = create_test_account();
        let mut c = create_test_account();

        a.record_deposit(&mut config, 1_000 * ONE, 1).unwrap();
        b.record_deposit(&mut config, 333 * ONE, 1).unwrap();
        config.total_system_value += 77 * ONE;
        c.record_deposit(&mut config, 500 * ONE, 1).unwrap();

        b.request_withdrawal(&config, b.master_shares / 3, T0).unwrap();
        b.execute_withdrawal(&mut config, T0 + NOTICE).unwrap();

        let held = total_account_value(&config, &[&a, &b, &c]);
        // Floor rounding leaves at most one unit per account behind
        assert!(config.total_system_value >= held);
        assert!(config.total_system_value - held <= 3);
        assert_eq!(
            config.total_master_shares,
            a.master_shares + b.master_shares + c.master_shares
        );
    }

    // ==================== PAYOUT TESTS ====================

    #[test]
    fn test_gather_is_pro_rata_and_sums_to_total() {
        let capital = [
            AdapterCapital { yield_choice: 1, capital: 600 * ONE },
            AdapterCapital { yield_choice: 2, capital: 300 * ONE },
            AdapterCapital { yield_choice: 3, capital: 100 * ONE },
        ];
        let parts = plan_gather(500 * ONE, &capital).unwrap();
        assert_eq!(parts, vec![300 * ONE, 150 * ONE, 50 * ONE]);

        let odd = plan_gather(7, &capital).unwrap();
        assert_eq!(odd.iter().sum::<u64>(), 7);
    }

    #[test]
    fn test_gather_rejects_more_than_pool_capital() {
        let capital = [AdapterCapital { yield_choice: 1, capital: 100 * ONE }];
        assert_eq!(plan_gather(101 * ONE, &capital), None);
        assert_eq!(plan_gather(0, &[]), Some(vec![]));
    }

    // ==================== LOSS TESTS ====================

    #[test]
    fn test_scenario_loss_then_withdrawal_pays_remainder() {
        // Deposit 1000, 400 loss realized, full withdrawal pays 600
        let mut config = create_test_config();
        let mut account = create_test_account();
        account.record_deposit(&mut config, 1_000 * ONE, 1).unwrap();
        config.unrealized_payouts = 400 * ONE;

        let applied = account.apply_loss(&mut config, 400 * ONE, false).unwrap();
        assert_eq!(applied.applied, 400 * ONE);
        assert_eq!(config.unrealized_payouts, 0);

        account.request_withdrawal(&config, account.master_shares, T0).unwrap();
        let receipt = account.execute_withdrawal(&mut config, T0 + NOTICE).unwrap();
        assert_eq!(receipt.value, 600 * ONE);
    }

    #[test]
    fn test_loss_clamped_at_principal() {
        let mut config = create_test_config();
        let mut account = create_test_account();
        account.record_deposit(&mut config, 100 * ONE, 1).unwrap();

        let applied = account.apply_loss(&mut config, 250 * ONE, false).unwrap();
        assert_eq!(applied.applied, 100 * ONE);
        assert_eq!(account.master_shares, 0);
        assert_eq!(account.total_deposited_principal, 0);
        assert_eq!(account.yield_choice, None);
        assert_eq!(config.total_master_shares, 0);
    }

    #[test]
    fn test_loss_does_not_move_other_holders_value() {
        let mut config = create_test_config();
        let mut hit = create_test_account();
        let mut bystander = create_test_account();
        hit.record_deposit(&mut config, 1_000 * ONE, 1).unwrap();
        bystander.record_deposit(&mut config, 1_000 * ONE, 1).unwrap();

        hit.apply_loss(&mut config, 300 * ONE, false).unwrap();
        assert_eq!(config.shares_to_value(bystander.master_shares), Some(1_000 * ONE));
        assert_eq!(config.shares_to_value(hit.master_shares), Some(700 * ONE));
    }

    #[test]
    fn test_execute_burns_only_shares_left_after_losses() {
        let mut config = create_test_config();
        let mut account = create_test_account();
        account.record_deposit(&mut config, 1_000 * ONE, 1).unwrap();
        account.request_withdrawal(&config, 1_000 * ONE, T0).unwrap();

        account.apply_loss(&mut config, 400 * ONE, false).unwrap();
        let receipt = account.execute_withdrawal(&mut config, T0 + NOTICE).unwrap();
        assert_eq!(receipt.shares_burned, 600 * ONE);
        assert_eq!(receipt.value, 600 * ONE);
        assert!(receipt.is_full);
    }

    #[test]
    fn test_withdrawal_realization_clears_request() {
        let mut config = create_test_config();
        let mut account = create_test_account();
        account.record_deposit(&mut config, 1_000 * ONE, 1).unwrap();
        account.request_withdrawal(&config, 500 * ONE, T0).unwrap();

        account.apply_loss(&mut config, 100 * ONE, true).unwrap();
        assert!(!account.withdrawal_status().is_pending());
        assert_eq!(account.withdrawal_request_shares, 0);
    }

    #[test]
    fn test_small_losses_above_unit_price_burn_own_shares() {
        let mut config = create_test_config();
        let mut hit = create_test_account();
        let mut bystander = create_test_account();
        hit.record_deposit(&mut config, 1_000, 1).unwrap();
        bystander.record_deposit(&mut config, 1_000, 1).unwrap();
        // Yield lifts the price to 3 per share
        config.total_system_value = 6_000;

        for _ in 0..10 {
            let applied = hit.apply_loss(&mut config, 2, false).unwrap();
            assert_eq!(applied.shares_burned, 1);
        }
        assert_eq!(hit.master_shares, 990);
        assert_eq!(hit.total_deposited_principal, 980);
        assert_eq!(config.total_system_value, 5_980);
        assert!(config.shares_to_value(bystander.master_shares).unwrap() >= 3_000);
    }

    #[test]
    fn test_wipe_keeps_pending_request_settleable() {
        let mut config = create_test_config();
        let mut account = create_test_account();
        account.record_deposit(&mut config, 1_000 * ONE, 1).unwrap();
        account.request_withdrawal(&config, 1_000 * ONE, T0).unwrap();

        account.apply_loss(&mut config, 1_000 * ONE, false).unwrap();
        assert_eq!(account.master_shares, 0);
        assert!(account.withdrawal_status().is_pending());
        assert_eq!(account.withdrawal_request_shares, 0);

        let receipt = account.execute_withdrawal(&mut config, T0 + NOTICE).unwrap();
        assert_eq!(receipt.shares_burned, 0);
        assert_eq!(receipt.value, 0);
        assert!(receipt.is_full);
        assert!(!account.withdrawal_status().is_pending());
    }

    #[test]
    fn test_wipe_with_pending_request_can_be_cancelled() {
        let mut config = create_test_config();
        let mut account = create_test_account();
        account.record_deposit(&mut config, 1_000 * ONE, 1).unwrap();
        account.request_withdrawal(&config, 400 * ONE, T0).unwrap();

        account.apply_loss(&mut config, 1_000 * ONE, false).unwrap();
        assert!(matches!(account.cancel_withdrawal(), Ok(0)));
        assert!(!account.withdrawal_status().is_pending());
    }
}
