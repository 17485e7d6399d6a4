//! Main application modules.
//!
//! This module provides utilities for URL validation, shutdown handling,
//! and statistics printing used by the CLI.

pub mod shutdown;
pub mod statistics;
pub mod url;

// Re-export public API
pub use shutdown::shutdown_gracefully;
pub use statistics::{print_pipeline_statistics, print_run_summary};
pub use url::validate_and_normalize_url;
