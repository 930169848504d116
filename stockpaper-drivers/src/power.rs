//! Board power manager
//!
//! Tracks the power state so repeated transitions have no side effects,
//! drives the status indicator and owns the sleep timer.

use core::time::Duration;

use embedded_hal_async::delay::DelayNs;
use stockpaper_core::traits::{PowerManager, PowerState};

use crate::battery::BatteryGauge;

/// Trait for the status indicator (on-board LED)
#[allow(async_fn_in_trait)]
pub trait Indicator {
    /// Switch the indicator
    async fn set_on(&mut self, on: bool);
}

/// Power manager for the board
pub struct BoardPower<I, S, G> {
    indicator: I,
    timer: S,
    gauge: G,
    state: PowerState,
}

impl<I: Indicator, S: DelayNs, G: BatteryGauge> BoardPower<I, S, G> {
    /// Create a power manager
    ///
    /// Starts in `LowPower` since the indicator is off at reset; the first
    /// `enter_active` switches it on.
    pub fn new(indicator: I, timer: S, gauge: G) -> Self {
        Self {
            indicator,
            timer,
            gauge,
            state: PowerState::LowPower,
        }
    }
}

impl<I: Indicator, S: DelayNs, G: BatteryGauge> PowerManager for BoardPower<I, S, G> {
    async fn enter_low_power(&mut self) {
        if self.state == PowerState::LowPower {
            return;
        }
        self.indicator.set_on(false).await;
        self.state = PowerState::LowPower;
    }

    async fn enter_active(&mut self) {
        if self.state == PowerState::Active {
            return;
        }
        self.indicator.set_on(true).await;
        self.state = PowerState::Active;
    }

    async fn sleep_for(&mut self, duration: Duration) {
        let mut remaining = duration.as_millis();
        while remaining > 0 {
            let chunk = remaining.min(u32::MAX as u128) as u32;
            self.timer.delay_ms(chunk).await;
            remaining -= chunk as u128;
        }
    }

    async fn battery_percent(&mut self) -> Option<f32> {
        self.gauge.percent().await
    }

    fn power_state(&self) -> PowerState {
        self.state
    }
}
