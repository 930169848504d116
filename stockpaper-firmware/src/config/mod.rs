//! Configuration loading
//!
//! The configuration is validated and encoded by the build script from
//! device.toml and embedded in the image.

pub mod loader;

pub use loader::{load_config, LoadError};
