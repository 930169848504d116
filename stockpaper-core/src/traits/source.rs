//! Remote data source trait and quote types

use heapless::String;

/// Maximum length of the "as of" trading-day text
pub const MAX_DATE_LEN: usize = 32;

/// Maximum length of a timestamp string
pub const MAX_TIME_LEN: usize = 48;

/// Timestamp text shown in the "last lookup" block
pub type TimeText = String<MAX_TIME_LEN>;

/// Shown instead of the timestamp when the time lookup fails
pub const TIME_PLACEHOLDER: &str = "N.A.";

/// Errors from a quote lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchError {
    /// Endpoint unreachable or returned a non-200 status
    Transport,
    /// Response is missing expected fields or they are not numeric
    Parse,
}

/// A single quote snapshot
///
/// Produced fresh on every successful lookup. A quote with all-zero
/// fields is a legitimate value, never a failure marker.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Quote {
    /// Last price
    pub price: f32,
    /// Absolute change since previous close
    pub change: f32,
    /// Relative change in percent
    pub change_percent: f32,
    /// Trading day the quote refers to, if the source reports one
    pub as_of: Option<String<MAX_DATE_LEN>>,
}

impl Quote {
    /// True when the quote should be drawn with the alternate emphasis
    ///
    /// Exactly zero counts as not falling.
    pub fn is_falling(&self) -> bool {
        self.change_percent < 0.0
    }
}

/// Timestamp placeholder used when the time lookup fails
pub fn placeholder_time() -> TimeText {
    let mut text = TimeText::new();
    let _ = text.push_str(TIME_PLACEHOLDER);
    text
}

/// Trait for the remote data source
///
/// Only called while the link is up.
#[allow(async_fn_in_trait)]
pub trait DataSource {
    /// Look up the latest quote for `symbol`
    async fn fetch_quote(&mut self, symbol: &str) -> Result<Quote, FetchError>;

    /// Look up the current time in `timezone`
    ///
    /// Never fails; returns `TIME_PLACEHOLDER` on any problem.
    async fn fetch_time(&mut self, timezone: &str) -> TimeText;
}
