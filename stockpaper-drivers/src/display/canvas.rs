//! Frame buffer canvas

use core::convert::Infallible;
use core::fmt::Write as _;

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use heapless::String;
use stockpaper_core::traits::{Emphasis, RenderError, Renderer};

use super::{Panel, BUFFER_LEN, HEIGHT, PANEL_WIDTH, ROW_BYTES, WIDTH};

/// Battery gauge body, top-left corner
const GAUGE_X: i32 = 196;
const GAUGE_Y: i32 = 80;
/// Battery gauge body size
const GAUGE_WIDTH: u32 = 40;
const GAUGE_HEIGHT: u32 = 14;
/// Terminal nub size
const NUB_WIDTH: u32 = 3;
const NUB_HEIGHT: u32 = 6;
/// Gap between outline and fill
const GAUGE_INSET: u32 = 2;

/// One 1-bpp ink layer drawn in landscape coordinates
///
/// Stored in panel order: landscape `x` runs along the gate lines and
/// landscape `y` runs right to left across the source lines.
pub struct Layer {
    bits: [u8; BUFFER_LEN],
}

impl Layer {
    pub const fn new() -> Self {
        Self {
            bits: [0; BUFFER_LEN],
        }
    }

    /// Raw buffer in panel order
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Blank the layer
    pub fn clear(&mut self) {
        self.bits.fill(0);
    }

    /// Check a landscape pixel
    pub fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }
        let (index, mask) = Self::locate(x, y);
        self.bits[index] & mask != 0
    }

    /// Number of inked pixels
    pub fn ink_count(&self) -> u32 {
        self.bits.iter().map(|b| b.count_ones()).sum()
    }

    fn set(&mut self, x: u32, y: u32, on: bool) {
        let (index, mask) = Self::locate(x, y);
        if on {
            self.bits[index] |= mask;
        } else {
            self.bits[index] &= !mask;
        }
    }

    fn locate(x: u32, y: u32) -> (usize, u8) {
        let row = x as usize;
        let col = (PANEL_WIDTH - 1 - y) as usize;
        (row * ROW_BYTES + col / 8, 0x80 >> (col % 8))
    }
}

impl Default for Layer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for Layer {
    fn size(&self) -> Size {
        Size::new(WIDTH, HEIGHT)
    }
}

impl DrawTarget for Layer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x < WIDTH && y < HEIGHT {
                self.set(x, y, color.is_on());
            }
        }
        Ok(())
    }
}

/// Renderer over a black and a red layer
pub struct TriColorCanvas<P> {
    panel: P,
    black: Layer,
    red: Layer,
}

impl<P: Panel> TriColorCanvas<P> {
    pub fn new(panel: P) -> Self {
        Self {
            panel,
            black: Layer::new(),
            red: Layer::new(),
        }
    }

    /// Layer used for an emphasis
    pub fn layer(&self, emphasis: Emphasis) -> &Layer {
        match emphasis {
            Emphasis::Default => &self.black,
            Emphasis::Alternate => &self.red,
        }
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    fn layer_mut(&mut self, emphasis: Emphasis) -> &mut Layer {
        match emphasis {
            Emphasis::Default => &mut self.black,
            Emphasis::Alternate => &mut self.red,
        }
    }
}

fn origin(x: u16, y: u16) -> Result<Point, RenderError> {
    if x as u32 >= WIDTH || y as u32 >= HEIGHT {
        return Err(RenderError::OutOfBounds);
    }
    Ok(Point::new(x as i32, y as i32))
}

fn ink() -> PrimitiveStyle<BinaryColor> {
    PrimitiveStyle::with_stroke(BinaryColor::On, 1)
}

impl<P: Panel> Renderer for TriColorCanvas<P> {
    fn clear_frame(&mut self) -> Result<(), RenderError> {
        self.black.clear();
        self.red.clear();
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: u16,
        y: u16,
        emphasis: Emphasis,
    ) -> Result<(), RenderError> {
        let position = origin(x, y)?;
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let layer = self.layer_mut(emphasis);
        let _ = Text::with_baseline(text, position, style, Baseline::Top).draw(layer);
        Ok(())
    }

    fn draw_rule(
        &mut self,
        x: u16,
        y: u16,
        length: u16,
        emphasis: Emphasis,
    ) -> Result<(), RenderError> {
        let start = origin(x, y)?;
        if length == 0 {
            return Ok(());
        }
        let end = start + Point::new(length as i32 - 1, 0);
        let layer = self.layer_mut(emphasis);
        let _ = Line::new(start, end).into_styled(ink()).draw(layer);
        Ok(())
    }

    fn draw_outline(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        emphasis: Emphasis,
    ) -> Result<(), RenderError> {
        let top_left = origin(x, y)?;
        let layer = self.layer_mut(emphasis);
        let _ = Rectangle::new(top_left, Size::new(width as u32, height as u32))
            .into_styled(ink())
            .draw(layer);
        Ok(())
    }

    fn draw_battery_gauge(&mut self, percent: f32, emphasis: Emphasis) -> Result<(), RenderError> {
        let percent = percent.clamp(0.0, 100.0);
        let layer = self.layer_mut(emphasis);

        let body = Rectangle::new(
            Point::new(GAUGE_X, GAUGE_Y),
            Size::new(GAUGE_WIDTH, GAUGE_HEIGHT),
        );
        let _ = body.into_styled(ink()).draw(layer);

        let nub = Rectangle::new(
            Point::new(
                GAUGE_X + GAUGE_WIDTH as i32,
                GAUGE_Y + ((GAUGE_HEIGHT - NUB_HEIGHT) / 2) as i32,
            ),
            Size::new(NUB_WIDTH, NUB_HEIGHT),
        );
        let _ = nub
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(layer);

        let inner = GAUGE_WIDTH - 2 * GAUGE_INSET;
        let fill_width = (inner as f32 * percent / 100.0 + 0.5) as u32;
        if fill_width > 0 {
            let fill = Rectangle::new(
                Point::new(GAUGE_X + GAUGE_INSET as i32, GAUGE_Y + GAUGE_INSET as i32),
                Size::new(fill_width, GAUGE_HEIGHT - 2 * GAUGE_INSET),
            );
            let _ = fill
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                .draw(layer);
        }

        let mut label: String<8> = String::new();
        let _ = write!(label, "{:.0}%", percent);
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let position = Point::new(GAUGE_X, GAUGE_Y + GAUGE_HEIGHT as i32 + 2);
        let _ = Text::with_baseline(&label, position, style, Baseline::Top).draw(layer);
        Ok(())
    }

    async fn present(&mut self) -> Result<(), RenderError> {
        self.panel
            .update(self.black.as_bytes(), self.red.as_bytes())
            .await
    }

    async fn sleep(&mut self) -> Result<(), RenderError> {
        self.panel.sleep().await
    }

    async fn wake(&mut self) -> Result<(), RenderError> {
        self.panel.reset().await
    }
}
