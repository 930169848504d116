//! Power management trait

use core::time::Duration;

/// Power state of the device subsystems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    #[default]
    Active,
    LowPower,
}

/// Trait for subsystem power control and the sleep timer
///
/// Both transitions are idempotent: calling either twice in a row has
/// the same effect as calling it once.
#[allow(async_fn_in_trait)]
pub trait PowerManager {
    /// Move subsystems to low power (indicator off)
    async fn enter_low_power(&mut self);

    /// Move subsystems back to active (indicator on)
    async fn enter_active(&mut self);

    /// Block for exactly `duration`
    ///
    /// Not interruptible.
    async fn sleep_for(&mut self, duration: Duration);

    /// Battery charge in percent, `None` when no gauge is fitted
    async fn battery_percent(&mut self) -> Option<f32>;

    /// Current power state
    fn power_state(&self) -> PowerState;
}
