//! Events that trigger state transitions

use crate::traits::FetchError;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Lifecycle events
    /// One-time device bring-up finished
    DevicesReady,
    /// "Connecting" frame shown, link attempt starts
    LinkRequested,

    // Link events
    /// Link came up with an address
    LinkUp,
    /// All credential candidates exhausted
    LinkDown,

    // Data events
    /// Quote lookup succeeded
    QuoteReceived,
    /// Quote lookup failed
    QuoteFailed(FetchError),
    /// Data frame pushed to the panel
    FramePresented,

    // Failure accounting events
    /// Budget had room; retry after the short interval
    RetryScheduled,
    /// Budget empty; give up
    BudgetExhausted,

    // Sleep events
    /// Sleep finished and subsystems are active again
    Woke,
}
