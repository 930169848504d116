//! CYW43 radio and LED

use core::net::Ipv4Addr;

use cyw43::JoinOptions;
use defmt::*;
use embassy_net::Stack;

use stockpaper_drivers::link::{Radio, RadioStatus};
use stockpaper_drivers::power::Indicator;

use super::SharedControl;

/// cyw43 GPIO wired to the on-board LED
const LED_GPIO: u8 = 0;

/// Station-mode radio on the CYW43439
///
/// Joining is a cyw43 call; the address comes from the embassy-net DHCP
/// client, so "connected" means joined and configured.
pub struct Cyw43Radio {
    control: &'static SharedControl,
    stack: Stack<'static>,
    active: bool,
    rejected: bool,
}

impl Cyw43Radio {
    pub fn new(control: &'static SharedControl, stack: Stack<'static>) -> Self {
        Self {
            control,
            stack,
            active: false,
            rejected: false,
        }
    }
}

impl Radio for Cyw43Radio {
    async fn activate(&mut self) {
        if !self.active {
            self.control
                .lock()
                .await
                .set_power_management(cyw43::PowerManagementMode::PowerSave)
                .await;
            self.active = true;
        }
        self.rejected = false;
    }

    async fn join(&mut self, ssid: &str, secret: &str) {
        let options = if secret.is_empty() {
            JoinOptions::new_open()
        } else {
            JoinOptions::new(secret.as_bytes())
        };

        let result = self.control.lock().await.join(ssid, options).await;
        if let Err(e) = result {
            warn!("Join rejected with status {}", e.status);
            self.rejected = true;
        }
    }

    fn status(&self) -> RadioStatus {
        if !self.active {
            RadioStatus::Idle
        } else if self.rejected {
            RadioStatus::Failed
        } else if self.stack.is_config_up() {
            RadioStatus::Connected
        } else {
            RadioStatus::Joining
        }
    }

    fn address(&self) -> Option<Ipv4Addr> {
        self.stack.config_v4().map(|config| config.address.address())
    }

    /// Leave the network and drop into the deepest power-save mode
    ///
    /// The cyw43 runner owns the WL_ON pin and the bus for the lifetime of
    /// the firmware, so the chip cannot be powered off from here. With no
    /// association and `SuperSave` power management the radio does not
    /// transmit until the next `activate`.
    async fn deactivate(&mut self) {
        if self.active {
            let mut control = self.control.lock().await;
            control.leave().await;
            control
                .set_power_management(cyw43::PowerManagementMode::SuperSave)
                .await;
            self.active = false;
        }
        self.rejected = false;
    }
}

/// On-board LED behind the radio chip
pub struct CywLed {
    control: &'static SharedControl,
}

impl CywLed {
    pub fn new(control: &'static SharedControl) -> Self {
        Self { control }
    }
}

impl Indicator for CywLed {
    async fn set_on(&mut self, on: bool) {
        self.control.lock().await.gpio_set(LED_GPIO, on).await;
    }
}
