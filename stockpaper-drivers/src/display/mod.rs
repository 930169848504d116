//! Tri-color e-paper display
//!
//! [`TriColorCanvas`] owns one 1-bpp layer per ink and implements the
//! controller's `Renderer` with `embedded-graphics`. The [`Panel`] trait is
//! the hardware side: it receives finished layers and handles power.

pub mod canvas;
pub mod ssd1680;

pub use canvas::{Layer, TriColorCanvas};
pub use ssd1680::Ssd1680;

use stockpaper_core::traits::RenderError;

/// Panel source lines (short side)
pub const PANEL_WIDTH: u32 = 122;

/// Panel gate lines (long side)
pub const PANEL_HEIGHT: u32 = 250;

/// Bytes per gate line, padded to whole bytes
pub const ROW_BYTES: usize = (PANEL_WIDTH as usize).div_ceil(8);

/// Size of one layer
pub const BUFFER_LEN: usize = ROW_BYTES * PANEL_HEIGHT as usize;

/// Landscape drawing width
pub const WIDTH: u32 = PANEL_HEIGHT;

/// Landscape drawing height
pub const HEIGHT: u32 = PANEL_WIDTH;

/// Trait for the e-paper panel hardware
///
/// Layers are in panel order with 1 = ink.
#[allow(async_fn_in_trait)]
pub trait Panel {
    /// Hardware reset and controller init; also wakes from deep sleep
    async fn reset(&mut self) -> Result<(), RenderError>;

    /// Write both layers and run a full refresh
    async fn update(&mut self, black: &[u8], red: &[u8]) -> Result<(), RenderError>;

    /// Enter deep sleep
    async fn sleep(&mut self) -> Result<(), RenderError>;
}
