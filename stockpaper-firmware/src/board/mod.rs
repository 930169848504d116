//! Pico W board adapters
//!
//! Glue between the embassy/cyw43 peripherals and the driver traits.
//! The cyw43 `Control` handle serves both the radio and the on-board LED,
//! so it is shared behind a mutex.

pub mod net;
pub mod spi;
pub mod wifi;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::mutex::Mutex;

/// Shared cyw43 control handle
pub type SharedControl = Mutex<NoopRawMutex, cyw43::Control<'static>>;

pub use net::TcpConnector;
pub use spi::EpdSpi;
pub use wifi::{Cyw43Radio, CywLed};
