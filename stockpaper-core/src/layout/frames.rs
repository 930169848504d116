//! Status and data frames

use core::fmt::{self, Write};

use heapless::String;

use crate::traits::{Emphasis, Quote, RenderError, Renderer, TimeText};

/// Character offset where the timestamp is split into date and time lines
pub const TIME_SPLIT: usize = 10;

/// Characters that fit between the block margin and the panel edge
const LINE_LEN: usize = 40;

/// Left margin of the data blocks
const BLOCK_X: u16 = 10;

/// Outline drawn around every status and data frame (x, y, width, height)
pub const FRAME_OUTLINE: (u16, u16, u16, u16) = (5, 10, 240, 115);

/// Single text line that drops whatever does not fit
///
/// Formatting never fails; the text is cut on a char boundary once the
/// line is full and `truncated` is set.
#[derive(Debug, Default)]
pub struct TextLine {
    text: String<LINE_LEN>,
    truncated: bool,
}

impl TextLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format `args` into a fresh line
    pub fn format(args: fmt::Arguments<'_>) -> Self {
        let mut line = Self::new();
        let _ = line.write_fmt(args);
        line
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Some text was dropped
    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

impl Write for TextLine {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.text.push(c).is_err() {
                self.truncated = true;
                break;
            }
        }
        Ok(())
    }
}

/// Single-message frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusFrame {
    /// Shown while the link comes up
    Connecting,
    /// Every credential failed
    ConnectionError,
    /// Quote lookup failed
    ApiError,
    /// Retry budget exhausted
    DeviceOff,
}

impl StatusFrame {
    /// Message text
    pub fn text(&self) -> &'static str {
        match self {
            StatusFrame::Connecting => "Connecting...",
            StatusFrame::ConnectionError => "Connection error",
            StatusFrame::ApiError => "API error",
            StatusFrame::DeviceOff => "Device is off",
        }
    }

    /// Top-left corner of the message
    pub fn position(&self) -> (u16, u16) {
        match self {
            StatusFrame::Connecting => (80, 60),
            StatusFrame::ConnectionError => (62, 60),
            StatusFrame::ApiError => (95, 60),
            StatusFrame::DeviceOff => (130, 110),
        }
    }

    /// Failures are drawn with the alternate emphasis
    pub fn emphasis(&self) -> Emphasis {
        match self {
            StatusFrame::Connecting => Emphasis::Default,
            _ => Emphasis::Alternate,
        }
    }
}

/// Data gathered by one successful cycle
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// Quote lookup result
    pub quote: Quote,
    /// Time lookup result or placeholder
    pub time: TimeText,
}

/// Draw a single-message frame into a cleared buffer
pub fn draw_status<R: Renderer>(renderer: &mut R, frame: StatusFrame) -> Result<(), RenderError> {
    prepare_frame(renderer)?;
    let (x, y) = frame.position();
    renderer.draw_text(frame.text(), x, y, frame.emphasis())
}

/// Draw the full data frame into a cleared buffer
///
/// The quote block uses the alternate emphasis when the change is
/// negative. The gauge is skipped when no battery reading is available.
pub fn draw_data<R: Renderer>(
    renderer: &mut R,
    exchange: &str,
    symbol: &str,
    reading: &Reading,
    battery_percent: Option<f32>,
    battery_low_percent: u8,
) -> Result<(), RenderError> {
    prepare_frame(renderer)?;

    // Title and rule
    draw_line(
        renderer,
        format_args!("{}: {}", exchange, symbol),
        80,
        15,
        Emphasis::Default,
    )?;
    renderer.draw_rule(15, 25, 220, Emphasis::Default)?;

    // Quote block
    let quote = &reading.quote;
    let emphasis = if quote.is_falling() {
        Emphasis::Alternate
    } else {
        Emphasis::Default
    };

    draw_line(
        renderer,
        format_args!("Last closure     {:.2}$", quote.price),
        BLOCK_X,
        30,
        emphasis,
    )?;
    draw_line(
        renderer,
        format_args!("Difference       {:.2}$", quote.change),
        BLOCK_X,
        40,
        emphasis,
    )?;
    draw_line(
        renderer,
        format_args!("Variation        {:.2}%", quote.change_percent),
        BLOCK_X,
        50,
        emphasis,
    )?;
    if let Some(as_of) = &quote.as_of {
        draw_line(
            renderer,
            format_args!("Last trading day {}", as_of),
            BLOCK_X,
            60,
            emphasis,
        )?;
    }

    // Last lookup block
    let (date, time) = split_time(&reading.time);
    renderer.draw_text("Last lookup", BLOCK_X, 80, Emphasis::Default)?;
    renderer.draw_text(date, BLOCK_X, 90, Emphasis::Default)?;
    if !time.is_empty() {
        renderer.draw_text(time, BLOCK_X, 100, Emphasis::Default)?;
    }

    // Battery block
    if let Some(percent) = battery_percent {
        let emphasis = if percent < battery_low_percent as f32 {
            Emphasis::Alternate
        } else {
            Emphasis::Default
        };
        renderer.draw_battery_gauge(percent, emphasis)?;
    }

    Ok(())
}

/// Blank the buffer and draw the frame outline
fn prepare_frame<R: Renderer>(renderer: &mut R) -> Result<(), RenderError> {
    renderer.clear_frame()?;
    let (x, y, width, height) = FRAME_OUTLINE;
    renderer.draw_outline(x, y, width, height, Emphasis::Default)
}

fn draw_line<R: Renderer>(
    renderer: &mut R,
    args: fmt::Arguments<'_>,
    x: u16,
    y: u16,
    emphasis: Emphasis,
) -> Result<(), RenderError> {
    let line = TextLine::format(args);
    if line.truncated() {
        warn!("Line at {},{} cut to {} chars", x, y, LINE_LEN);
    }
    renderer.draw_text(line.as_str(), x, y, emphasis)
}

/// Split a timestamp into its date and time parts at `TIME_SPLIT`
///
/// "2024-01-15T14:30:00" becomes ("2024-01-15", "T14:30:00"). Shorter
/// text (such as the placeholder) is returned whole with an empty tail.
pub fn split_time(text: &str) -> (&str, &str) {
    if text.len() <= TIME_SPLIT {
        return (text, "");
    }

    let mut at = TIME_SPLIT;
    while !text.is_char_boundary(at) {
        at += 1;
    }
    text.split_at(at)
}
