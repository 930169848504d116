//! Embedded configuration loader

use defmt::*;

use stockpaper_core::config::{ConfigError, DeviceConfig, CONFIG_VERSION};

/// Postcard-encoded configuration written by build.rs
static EMBEDDED_CONFIG: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/device_config.bin"));

/// Configuration loading errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// Deserialization failed
    Deserialize,
    /// Config version mismatch
    VersionMismatch,
    /// Values the controller cannot run with
    Invalid(ConfigError),
}

/// Decode and check the embedded configuration
pub fn load_config() -> Result<DeviceConfig, LoadError> {
    let config: DeviceConfig =
        postcard::from_bytes(EMBEDDED_CONFIG).map_err(|_| LoadError::Deserialize)?;

    if config.version != CONFIG_VERSION {
        warn!(
            "Config version mismatch: found {}, expected {}",
            config.version, CONFIG_VERSION
        );
        return Err(LoadError::VersionMismatch);
    }

    config.validate().map_err(LoadError::Invalid)?;

    log_config_summary(&config);
    Ok(config)
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &DeviceConfig) {
    info!("Configuration loaded ({} bytes)", EMBEDDED_CONFIG.len());
    debug!("  {} networks", config.networks.len());
    debug!(
        "  quote {}: {}",
        config.quote.exchange.as_str(),
        config.quote.symbol.as_str()
    );
    debug!("  timezone {}", config.clock.timezone.as_str());
    debug!(
        "  refresh {}s, retry {}s, budget {}",
        config.schedule.refresh_interval_s,
        config.schedule.retry_interval_s,
        config.schedule.max_retries
    );
}
