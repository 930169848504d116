//! Configuration types
//!
//! Board-agnostic configuration structures. The firmware build validates
//! a TOML description and embeds it as postcard binary data.

pub mod types;

pub use types::*;
