//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, weights, catalogs, etc.)
//! - Library configuration and CLI option types
//! - Persisted user settings

mod constants;
mod settings;
mod types;

// Re-export all constants
pub use constants::*;
pub use settings::{Settings, Theme};
pub use types::{BackendKind, Config, LogFormat, LogLevel};
