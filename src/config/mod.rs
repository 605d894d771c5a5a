//! Configuration module.
//!
//! This module provides the probe settings, their loading from disk, and
//! the timeout bounds every probe is clamped to.

pub mod limits;
pub mod loader;

pub use loader::{ConfigLoader, Settings};
