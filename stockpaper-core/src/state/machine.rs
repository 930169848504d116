//! State machine definition
//!
//! Every action the controller takes is a function of the current state,
//! and every outcome is an event fed back through `transition`.

use super::events::Event;
use crate::traits::FetchError;

/// Sleep interval selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interval {
    /// Retry cadence after a failed cycle
    Short,
    /// Normal refresh cadence after a successful cycle
    Long,
}

/// Device states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Power-on bring-up: subsystems active, display cleared, indicator on
    Initializing,
    /// Start of a cycle, "connecting" frame about to be shown
    CycleStart,
    /// Link attempt in progress
    Connecting,
    /// Every credential candidate failed
    ConnectFailed,
    /// Link is up, quote and time lookups in progress
    Fetching,
    /// Quote lookup failed
    FetchFailed(FetchError),
    /// Data frame drawn and presented
    Rendered,
    /// Subsystems in low power, waiting for the next cycle
    Sleeping(Interval),
    /// Retry budget exhausted; safe idle, no further network activity
    Halted,
}

impl State {
    /// Check if this state is the terminal safe-idle state
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Halted)
    }

    /// Check if this state is a failure state awaiting budget accounting
    pub fn is_failure(&self) -> bool {
        matches!(self, State::ConnectFailed | State::FetchFailed(_))
    }

    /// Check if this state may touch the network
    pub fn network_allowed(&self) -> bool {
        matches!(self, State::Connecting | State::Fetching)
    }

    /// Process an event and return the next state
    ///
    /// This is the core state transition logic.
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            // Halted absorbs everything
            (Halted, _) => Halted,

            // Bring-up
            (Initializing, DevicesReady) => CycleStart,

            // Cycle start
            (CycleStart, LinkRequested) => Connecting,

            // Link outcome
            (Connecting, LinkUp) => Fetching,
            (Connecting, LinkDown) => ConnectFailed,

            // Lookup outcome
            (Fetching, QuoteReceived) => Rendered,
            (Fetching, QuoteFailed(kind)) => FetchFailed(kind),

            // Failure accounting
            (ConnectFailed, RetryScheduled) => Sleeping(Interval::Short),
            (ConnectFailed, BudgetExhausted) => Halted,
            (FetchFailed(_), RetryScheduled) => Sleeping(Interval::Short),
            (FetchFailed(_), BudgetExhausted) => Halted,

            // Success path
            (Rendered, FramePresented) => Sleeping(Interval::Long),

            // Wake-up
            (Sleeping(_), Woke) => CycleStart,

            // Default: stay in current state
            _ => self,
        }
    }
}
