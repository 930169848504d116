//! Display renderer trait
//!
//! The renderer is a buffered drawing surface. The controller composes
//! frames from a handful of primitives and then pushes the buffer to the
//! panel with `present`. Layout of individual primitives (fonts, pixel
//! placement of the gauge) belongs to the implementation.

/// Errors from the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderError {
    /// Communication with the panel failed
    Bus,
    /// Panel did not finish a refresh in time
    Timeout,
    /// Drawing outside the frame
    OutOfBounds,
}

/// Visual emphasis of a primitive
///
/// On a tri-color panel `Alternate` is the red layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Emphasis {
    #[default]
    Default,
    Alternate,
}

/// Trait for the display
#[allow(async_fn_in_trait)]
pub trait Renderer {
    /// Blank the frame buffer
    fn clear_frame(&mut self) -> Result<(), RenderError>;

    /// Draw text with its top-left corner at (`x`, `y`)
    fn draw_text(&mut self, text: &str, x: u16, y: u16, emphasis: Emphasis)
        -> Result<(), RenderError>;

    /// Draw a horizontal rule of `length` pixels starting at (`x`, `y`)
    fn draw_rule(&mut self, x: u16, y: u16, length: u16, emphasis: Emphasis)
        -> Result<(), RenderError>;

    /// Draw a one-pixel rectangle outline with its top-left corner at (`x`, `y`)
    ///
    /// Parts falling outside the frame are clipped.
    fn draw_outline(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        emphasis: Emphasis,
    ) -> Result<(), RenderError>;

    /// Draw the battery gauge for a charge level in percent
    fn draw_battery_gauge(&mut self, percent: f32, emphasis: Emphasis)
        -> Result<(), RenderError>;

    /// Push the buffered frame to the panel
    async fn present(&mut self) -> Result<(), RenderError>;

    /// Put the panel into its low-power mode
    async fn sleep(&mut self) -> Result<(), RenderError>;

    /// Bring the panel back from low-power mode
    async fn wake(&mut self) -> Result<(), RenderError>;
}
