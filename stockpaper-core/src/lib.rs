//! Board-agnostic core logic for the e-paper stock ticker
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Leaf traits (network link, data source, renderer, power manager)
//! - Data model (credentials, quotes, retry budget)
//! - State machine for the wake/connect/fetch/render/sleep cycle
//! - Frame layout for status and data screens
//! - Configuration type definitions
//! - The run controller that drives everything above

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod controller;
pub mod layout;
pub mod retry;
pub mod state;
pub mod traits;

#[cfg(test)]
mod testing;

pub use controller::{Device, RunController};
