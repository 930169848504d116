//! Frame layout
//!
//! Composes status and data frames from renderer primitives. Coordinates
//! target the 250x122 landscape tri-color panel.

pub mod frames;

pub use frames::{
    draw_data, draw_status, split_time, Reading, StatusFrame, TextLine, FRAME_OUTLINE, TIME_SPLIT,
};
