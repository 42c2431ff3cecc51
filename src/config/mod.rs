//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (resolver table, bounds, defaults)
//! - CLI option types

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel};
