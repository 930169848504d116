//! Battery telemetry

pub mod max17048;

pub use max17048::Max17048;

/// Trait for a battery fuel gauge
#[allow(async_fn_in_trait)]
pub trait BatteryGauge {
    /// State of charge in percent, `None` when the sensor is unavailable
    async fn percent(&mut self) -> Option<f32>;
}

/// Board without a fuel gauge
pub struct NoGauge;

impl BatteryGauge for NoGauge {
    async fn percent(&mut self) -> Option<f32> {
        None
    }
}
