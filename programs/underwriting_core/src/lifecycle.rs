// programs/underwriting_core/src/lifecycle.rs
//
// Withdrawal and Pledge State Machines
// ====================================
//
// Withdrawal (per underwriter account):
//   NoRequest -> Requested(t) -> { Executed | Cancelled } -> NoRequest
//
// Pledge (per underwriter x pool):
//   Unallocated -> Allocated -> { DeallocationRequested -> Deallocated } | Liquidated

use anchor_lang::prelude::*;

// =============================================================================
// WITHDRAWAL
// =============================================================================

/// Withdrawal request status derived from a stored request timestamp
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum WithdrawalStatus {
    NoRequest,
    Requested { requested_at: i64 },
}

impl WithdrawalStatus {
    /// A stored timestamp of 0 means no request
    pub fn from_timestamp(requested_at: i64) -> Self {
        if requested_at == 0 {
            WithdrawalStatus::NoRequest
        } else {
            WithdrawalStatus::Requested { requested_at }
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, WithdrawalStatus::Requested { .. })
    }

    /// First instant at which execution is allowed
    pub fn ready_at(&self, notice_period: i64) -> Option<i64> {
        match self {
            WithdrawalStatus::NoRequest => None,
            WithdrawalStatus::Requested { requested_at } => {
                Some(requested_at.saturating_add(notice_period))
            }
        }
    }

    /// True iff a request exists and `now >= requested_at + notice_period`
    pub fn is_executable(&self, now: i64, notice_period: i64) -> bool {
        self.ready_at(notice_period)
            .map(|ready| now >= ready)
            .unwrap_or(false)
    }
}

impl Default for WithdrawalStatus {
    fn default() -> Self {
        WithdrawalStatus::NoRequest
    }
}

// =============================================================================
// PLEDGE
// =============================================================================

/// Lifecycle of a single underwriter pledge to a pool
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, InitSpace)]
#[repr(u8)]
pub enum PledgeStatus {
    Unallocated = 0,
    Allocated = 1,
    DeallocationRequested = 2,
    Deallocated = 3,
    /// Terminal
    Liquidated = 4,
}

impl Default for PledgeStatus {
    fn default() -> Self {
        PledgeStatus::Unallocated
    }
}

impl PledgeStatus {
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            PledgeStatus::Allocated | PledgeStatus::DeallocationRequested
        )
    }

    pub fn can_transition_to(&self, next: PledgeStatus) -> bool {
        matches!(
            (self, next),
            (PledgeStatus::Unallocated, PledgeStatus::Allocated)
                | (PledgeStatus::Deallocated, PledgeStatus::Allocated)
                | (PledgeStatus::Allocated, PledgeStatus::DeallocationRequested)
                | (PledgeStatus::Allocated, PledgeStatus::Liquidated)
                | (PledgeStatus::DeallocationRequested, PledgeStatus::Deallocated)
                | (PledgeStatus::DeallocationRequested, PledgeStatus::Liquidated)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTICE: i64 = 30 * 86_400;

    #[test]
    fn test_zero_timestamp_is_no_request() {
        assert_eq!(WithdrawalStatus::from_timestamp(0), WithdrawalStatus::NoRequest);
        assert!(!WithdrawalStatus::from_timestamp(0).is_pending());
        assert_eq!(WithdrawalStatus::NoRequest.ready_at(NOTICE), None);
    }

    #[test]
    fn test_execution_gated_until_notice_elapses() {
        let requested_at = 1_700_000_000;
        let status = WithdrawalStatus::from_timestamp(requested_at);

        assert!(!status.is_executable(requested_at, NOTICE));
        assert!(!status.is_executable(requested_at + NOTICE - 1, NOTICE));
        // First instant at the bound
        assert!(status.is_executable(requested_at + NOTICE, NOTICE));
        assert!(status.is_executable(requested_at + NOTICE + 1, NOTICE));
    }

    #[test]
    fn test_no_request_never_executable() {
        assert!(!WithdrawalStatus::NoRequest.is_executable(i64::MAX, 0));
    }

    #[test]
    fn test_pledge_transitions() {
        use PledgeStatus::*;
        assert!(Unallocated.can_transition_to(Allocated));
        assert!(Allocated.can_transition_to(DeallocationRequested));
        assert!(DeallocationRequested.can_transition_to(Deallocated));
        assert!(Allocated.can_transition_to(Liquidated));
        assert!(Deallocated.can_transition_to(Allocated));

        // Deallocation must be requested first
        assert!(!Allocated.can_transition_to(Deallocated));
        // Liquidated is terminal
        assert!(!Liquidated.can_transition_to(Allocated));
        assert!(!Liquidated.can_transition_to(Deallocated));
    }

    #[test]
    fn test_active_statuses() {
        assert!(PledgeStatus::Allocated.is_active());
        assert!(PledgeStatus::DeallocationRequested.is_active());
        assert!(!PledgeStatus::Deallocated.is_active());
        assert!(!PledgeStatus::Liquidated.is_active());
    }
}
