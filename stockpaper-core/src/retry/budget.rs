//! Retry budget implementation
//!
//! The budget is cycle-scoped: every failed cycle spends one retry, and
//! any successful cycle restores the full budget (not partial credit).

/// Outcome of spending a retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BudgetStatus {
    /// A retry was spent; `remaining` are left
    Retry { remaining: u8 },
    /// Nothing left to spend
    Exhausted,
}

/// Retry budget for consecutive cycle failures
///
/// Invariant: `0 <= remaining <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryBudget {
    /// Retries left before halting
    remaining: u8,
    /// Configured budget
    max: u8,
}

impl RetryBudget {
    /// Create a full budget
    pub const fn new(max: u8) -> Self {
        Self {
            remaining: max,
            max,
        }
    }

    /// Record a failed cycle
    ///
    /// Spends one retry if any are left. When the budget is already
    /// empty nothing changes and `Exhausted` is returned.
    pub fn consume(&mut self) -> BudgetStatus {
        if self.remaining > 0 {
            self.remaining -= 1;
            BudgetStatus::Retry {
                remaining: self.remaining,
            }
        } else {
            BudgetStatus::Exhausted
        }
    }

    /// Record a successful cycle
    pub fn restore(&mut self) {
        self.remaining = self.max;
    }

    /// Retries left
    pub fn remaining(&self) -> u8 {
        self.remaining
    }

    /// Configured budget
    pub fn max(&self) -> u8 {
        self.max
    }

    /// Check if the next failure halts the device
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_budget_is_full() {
        let budget = RetryBudget::new(3);
        assert_eq!(budget.remaining(), 3);
        assert_eq!(budget.max(), 3);
        assert!(!budget.is_exhausted());
    }

    #[test]
    fn test_consume_until_exhausted() {
        let mut budget = RetryBudget::new(2);
        assert_eq!(budget.consume(), BudgetStatus::Retry { remaining: 1 });
        assert_eq!(budget.consume(), BudgetStatus::Retry { remaining: 0 });
        assert!(budget.is_exhausted());
        assert_eq!(budget.consume(), BudgetStatus::Exhausted);
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_restore_is_full_reset() {
        let mut budget = RetryBudget::new(3);
        budget.consume();
        budget.consume();
        budget.restore();
        assert_eq!(budget.remaining(), 3);
    }

    #[test]
    fn test_zero_budget_exhausts_immediately() {
        let mut budget = RetryBudget::new(0);
        assert_eq!(budget.consume(), BudgetStatus::Exhausted);
    }

    proptest! {
        #[test]
        fn prop_remaining_stays_in_range(
            max in 0u8..=16,
            ops in proptest::collection::vec(any::<bool>(), 0..64),
        ) {
            let mut budget = RetryBudget::new(max);
            for failed in ops {
                if failed {
                    budget.consume();
                } else {
                    budget.restore();
                }
                prop_assert!(budget.remaining() <= budget.max());
            }
        }

        #[test]
        fn prop_failures_within_budget_never_exhaust(max in 0u8..=16, n in 0u8..=16) {
            prop_assume!(n <= max);
            let mut budget = RetryBudget::new(max);
            for _ in 0..n {
                prop_assert_ne!(budget.consume(), BudgetStatus::Exhausted);
            }
            prop_assert_eq!(budget.remaining(), max - n);

            budget.restore();
            prop_assert_eq!(budget.remaining(), max);
        }
    }
}
