// programs/underwriting_core/src/math.rs
//
// Ledger Math
// ===========
//
// Every quantity is an integer. Trackers are scaled by PRECISION and divided
// with truncation so that any two implementations agree to the last unit.
//
// All functions return None on overflow; programs map that to their own
// MathOverflow error.

/// Fixed-point scale for loss and reward trackers
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Basis point denominator
pub const BPS_DENOMINATOR: u64 = 10_000;

/// floor(a * b / denominator), None on overflow or zero denominator
pub fn mul_div_floor(a: u128, b: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    a.checked_mul(b)?.checked_div(denominator)
}

/// ceil(a * b / denominator), None on overflow or zero denominator
pub fn mul_div_ceil(a: u128, b: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let product = a.checked_mul(b)?;
    let quotient = product / denominator;
    if product % denominator == 0 {
        Some(quotient)
    } else {
        quotient.checked_add(1)
    }
}

fn narrow(value: u128) -> Option<u64> {
    u64::try_from(value).ok()
}

// =============================================================================
// TRACKERS
// =============================================================================

/// Tracker increment for distributing `amount` over `total_pledge`.
/// A zero pledge produces a zero increment; callers treat that as a no-op.
pub fn tracker_increment(amount: u64, total_pledge: u64) -> Option<u128> {
    if total_pledge == 0 {
        return Some(0);
    }
    mul_div_floor(amount as u128, PRECISION, total_pledge as u128)
}

/// Amount accrued by `pledge` between `checkpoint` and `tracker`
pub fn accrued_since(tracker: u128, checkpoint: u128, pledge: u64) -> Option<u64> {
    let delta = tracker.saturating_sub(checkpoint);
    if delta == 0 || pledge == 0 {
        return Some(0);
    }
    narrow(mul_div_floor(delta, pledge as u128, PRECISION)?)
}

// =============================================================================
// SHARES
// =============================================================================

/// Shares minted for a deposit of `amount`.
/// Returns None when supply exists but carries no value (nothing to price against).
pub fn shares_for_deposit(amount: u64, total_shares: u64, total_value: u64) -> Option<u64> {
    if total_shares == 0 {
        return Some(amount);
    }
    if total_value == 0 {
        return None;
    }
    narrow(mul_div_floor(
        amount as u128,
        total_shares as u128,
        total_value as u128,
    )?)
}

/// Value of `shares` at the current share price (0 when supply is 0)
pub fn shares_to_value(shares: u64, total_shares: u64, total_value: u64) -> Option<u64> {
    if total_shares == 0 {
        return Some(0);
    }
    narrow(mul_div_floor(
        shares as u128,
        total_value as u128,
        total_shares as u128,
    )?)
}

/// Shares covering at least `value` at the current share price, rounded up
/// so a charge is never carried by other holders (0 when nothing is held)
pub fn value_to_shares(value: u64, total_shares: u64, total_value: u64) -> Option<u64> {
    if total_value == 0 || total_shares == 0 {
        return Some(0);
    }
    narrow(mul_div_ceil(
        value as u128,
        total_shares as u128,
        total_value as u128,
    )?)
}

// =============================================================================
// PRO-RATA / BPS
// =============================================================================

/// floor(amount * part / whole); zero when whole is zero
pub fn pro_rata(amount: u64, part: u64, whole: u64) -> Option<u64> {
    if whole == 0 {
        return Some(0);
    }
    narrow(mul_div_floor(amount as u128, part as u128, whole as u128)?)
}

pub fn mul_bps(value: u64, bps: u16) -> Option<u64> {
    narrow(mul_div_floor(
        value as u128,
        bps as u128,
        BPS_DENOMINATOR as u128,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    // USDC-style 6 decimal amounts
    const ONE: u64 = 1_000_000;

    // ==================== TRACKER TESTS ====================

    #[test]
    fn test_tracker_increment_zero_pledge_is_noop() {
        assert_eq!(tracker_increment(400 * ONE, 0), Some(0));
    }

    #[test]
    fn test_single_pledger_owes_full_loss() {
        // 1000 pledged, 400 loss
        let tracker = tracker_increment(400 * ONE, 1_000 * ONE).unwrap();
        assert_eq!(accrued_since(tracker, 0, 1_000 * ONE), Some(400 * ONE));
    }

    #[test]
    fn test_two_pledgers_split_proportionally() {
        // 1000 + 500 pledged, 300 loss -> 200 / 100
        let tracker = tracker_increment(300 * ONE, 1_500 * ONE).unwrap();
        assert_eq!(accrued_since(tracker, 0, 1_000 * ONE), Some(200 * ONE));
        assert_eq!(accrued_since(tracker, 0, 500 * ONE), Some(100 * ONE));
    }

    #[test]
    fn test_checkpoint_at_current_tracker_owes_nothing() {
        let tracker = tracker_increment(400 * ONE, 1_000 * ONE).unwrap();
        assert_eq!(accrued_since(tracker, tracker, 500 * ONE), Some(0));
    }

    #[test]
    fn test_accrual_truncates() {
        // 1 unit over 3 pledgers: each owes floor(1/3) = 0
        let tracker = tracker_increment(1, 3).unwrap();
        assert_eq!(tracker, PRECISION / 3);
        assert_eq!(accrued_since(tracker, 0, 1), Some(0));
        assert_eq!(accrued_since(tracker, 0, 3), Some(0));
    }

    #[test]
    fn test_stale_checkpoint_above_tracker_yields_zero() {
        assert_eq!(accrued_since(10, 20, 1_000), Some(0));
    }

    // ==================== SHARE TESTS ====================

    #[test]
    fn test_first_deposit_mints_one_to_one() {
        assert_eq!(shares_for_deposit(1_000 * ONE, 0, 0), Some(1_000 * ONE));
    }

    #[test]
    fn test_deposit_after_yield_prices_at_nav() {
        // 1000 shares backed by 1100 value; depositing 1000 mints floor(1000*1000/1100)
        let shares = shares_for_deposit(1_000 * ONE, 1_000 * ONE, 1_100 * ONE).unwrap();
        assert_eq!(shares, 909_090_909);
    }

    #[test]
    fn test_deposit_into_valueless_supply_rejected() {
        assert_eq!(shares_for_deposit(ONE, 1_000, 0), None);
    }

    #[test]
    fn test_shares_to_value_empty_supply() {
        assert_eq!(shares_to_value(100, 0, 0), Some(0));
    }

    #[test]
    fn test_value_share_conversion() {
        assert_eq!(shares_to_value(500, 1_000, 2_000), Some(1_000));
        assert_eq!(value_to_shares(1_000, 1_000, 2_000), Some(500));
    }

    #[test]
    fn test_value_to_shares_rounds_up() {
        // 3 value per share: 2 value needs a whole share
        assert_eq!(value_to_shares(2, 2_000, 6_000), Some(1));
        assert_eq!(value_to_shares(7, 2_000, 6_000), Some(3));
        assert_eq!(mul_div_ceil(6, 1, 3), Some(2));
    }

    // ==================== PRO-RATA TESTS ====================

    #[test]
    fn test_pro_rata_and_bps() {
        assert_eq!(pro_rata(1_000, 1, 4), Some(250));
        assert_eq!(pro_rata(1_000, 1, 0), Some(0));
        // 5% claim fee on 50,000
        assert_eq!(mul_bps(50_000 * ONE, 500), Some(2_500 * ONE));
    }

    #[test]
    fn test_overflow_reported() {
        assert_eq!(mul_div_floor(u128::MAX, 2, 1), None);
        assert_eq!(mul_div_floor(1, 1, 0), None);
        assert_eq!(mul_div_ceil(1, 1, 0), None);
    }
}
