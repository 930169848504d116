//! Driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in stockpaper-core:
//!
//! - Network link over a join/poll radio interface
//! - Minimal HTTP/1.0 client over any byte-stream connector
//! - Quote and time sources (terminal-stocks, Alpha Vantage, World Time API)
//! - Power manager with status indicator and fuel gauge (MAX17048)
//! - Tri-color e-paper canvas and SSD1680 panel driver

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod battery;
pub mod display;
pub mod http;
pub mod link;
pub mod power;
pub mod source;
