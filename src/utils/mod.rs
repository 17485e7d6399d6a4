//! Shared utilities.
//!
//! This module provides:
//! - The `Clock` abstraction used for TTLs and timestamps
//! - CSS selector parsing with a safe fallback

mod clock;
mod selector;

pub use clock::{Clock, ManualClock, SystemClock};
pub use selector::parse_selector_with_fallback;
