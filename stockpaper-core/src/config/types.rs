//! Configuration type definitions

use core::fmt;
use core::time::Duration;

use heapless::String;

use crate::state::Interval;
use crate::traits::{CredentialError, CredentialList};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration layout version
pub const CONFIG_VERSION: u8 = 1;

/// Maximum ticker symbol length
pub const MAX_SYMBOL_LEN: usize = 12;

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 16;

/// Maximum IANA timezone name length
pub const MAX_TIMEZONE_LEN: usize = 40;

/// Maximum API key length
pub const MAX_API_KEY_LEN: usize = 32;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Layout version is not `CONFIG_VERSION`
    UnsupportedVersion,
    /// Invalid credential list
    Credentials(CredentialError),
    /// Ticker symbol is empty
    EmptySymbol,
    /// Timezone is empty
    EmptyTimezone,
    /// API key required by the provider is empty
    MissingApiKey,
    /// One of the sleep intervals is zero
    ZeroInterval,
    /// Link timeout is zero
    ZeroConnectTimeout,
    /// Battery threshold above 100 %
    BatteryThreshold,
}

impl From<CredentialError> for ConfigError {
    fn from(e: CredentialError) -> Self {
        ConfigError::Credentials(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnsupportedVersion => {
                write!(f, "unsupported config version (expected {})", CONFIG_VERSION)
            }
            ConfigError::Credentials(e) => write!(f, "networks: {}", e),
            ConfigError::EmptySymbol => f.write_str("quote.symbol must not be empty"),
            ConfigError::EmptyTimezone => f.write_str("clock.timezone must not be empty"),
            ConfigError::MissingApiKey => f.write_str("quote provider requires an api_key"),
            ConfigError::ZeroInterval => f.write_str("schedule intervals must be non-zero"),
            ConfigError::ZeroConnectTimeout => {
                f.write_str("schedule.connect_timeout_s must be non-zero")
            }
            ConfigError::BatteryThreshold => {
                f.write_str("schedule.battery_low_percent must be 0-100")
            }
        }
    }
}

/// Where quotes come from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum QuoteProvider {
    /// Plain-text table from terminal-stocks.dev
    #[default]
    TerminalStocks,
    /// Alpha Vantage GLOBAL_QUOTE JSON
    AlphaVantage { api_key: String<MAX_API_KEY_LEN> },
}

/// Quote configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QuoteConfig {
    /// Ticker symbol to look up
    pub symbol: String<MAX_SYMBOL_LEN>,
    /// Exchange label shown in the title
    pub exchange: String<MAX_LABEL_LEN>,
    /// Quote source
    #[cfg_attr(feature = "serde", serde(default))]
    pub provider: QuoteProvider,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        let mut symbol = String::new();
        let _ = symbol.push_str("ARM");
        let mut exchange = String::new();
        let _ = exchange.push_str("NASDAQ");
        Self {
            symbol,
            exchange,
            provider: QuoteProvider::default(),
        }
    }
}

/// Clock configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClockConfig {
    /// IANA timezone for the "last lookup" timestamp
    pub timezone: String<MAX_TIMEZONE_LEN>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        let mut timezone = String::new();
        let _ = timezone.push_str("Etc/UTC");
        Self { timezone }
    }
}

/// Cycle timing and failure policy
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScheduleConfig {
    /// Sleep after a successful cycle (seconds)
    pub refresh_interval_s: u32,
    /// Sleep after a failed cycle (seconds)
    pub retry_interval_s: u32,
    /// Sleep increment once halted (seconds)
    pub halted_interval_s: u32,
    /// Consecutive failures tolerated before halting
    pub max_retries: u8,
    /// Bounded wait per credential while joining (seconds, polled every second)
    pub connect_timeout_s: u8,
    /// Gauge switches to the alternate emphasis below this charge (%)
    pub battery_low_percent: u8,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            refresh_interval_s: 60 * 60,
            retry_interval_s: 60,
            halted_interval_s: 60,
            max_retries: 3,
            connect_timeout_s: 10,
            battery_low_percent: 20,
        }
    }
}

impl ScheduleConfig {
    /// Sleep duration for an interval kind
    pub fn interval(&self, interval: Interval) -> Duration {
        match interval {
            Interval::Short => Duration::from_secs(self.retry_interval_s as u64),
            Interval::Long => Duration::from_secs(self.refresh_interval_s as u64),
        }
    }

    /// Sleep increment while halted
    pub fn halted_interval(&self) -> Duration {
        Duration::from_secs(self.halted_interval_s as u64)
    }
}

/// Complete device configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    /// Layout version
    #[cfg_attr(feature = "serde", serde(default = "default_version"))]
    pub version: u8,
    /// Networks to try, in order
    pub networks: CredentialList,
    /// Quote settings
    #[cfg_attr(feature = "serde", serde(default))]
    pub quote: QuoteConfig,
    /// Clock settings
    #[cfg_attr(feature = "serde", serde(default))]
    pub clock: ClockConfig,
    /// Timing and failure policy
    #[cfg_attr(feature = "serde", serde(default))]
    pub schedule: ScheduleConfig,
}

#[cfg(feature = "serde")]
fn default_version() -> u8 {
    CONFIG_VERSION
}

impl DeviceConfig {
    /// Create a configuration with default settings for the given networks
    pub fn new(networks: CredentialList) -> Self {
        Self {
            version: CONFIG_VERSION,
            networks,
            quote: QuoteConfig::default(),
            clock: ClockConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }

    /// Check the configuration for values the controller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion);
        }

        for network in self.networks.iter() {
            if network.ssid.trim().is_empty() {
                return Err(CredentialError::BlankSsid.into());
            }
        }

        if self.quote.symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }

        if let QuoteProvider::AlphaVantage { api_key } = &self.quote.provider {
            if api_key.trim().is_empty() {
                return Err(ConfigError::MissingApiKey);
            }
        }

        if self.clock.timezone.trim().is_empty() {
            return Err(ConfigError::EmptyTimezone);
        }

        let schedule = &self.schedule;
        if schedule.refresh_interval_s == 0
            || schedule.retry_interval_s == 0
            || schedule.halted_interval_s == 0
        {
            return Err(ConfigError::ZeroInterval);
        }

        if schedule.connect_timeout_s == 0 {
            return Err(ConfigError::ZeroConnectTimeout);
        }

        if schedule.battery_low_percent > 100 {
            return Err(ConfigError::BatteryThreshold);
        }

        Ok(())
    }
}
