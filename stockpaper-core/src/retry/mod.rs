//! Failure accounting
//!
//! Counts consecutive cycle failures and decides when to give up.

pub mod budget;

pub use budget::{BudgetStatus, RetryBudget};
