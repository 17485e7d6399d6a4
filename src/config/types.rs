//! Configuration types.
//!
//! This module defines the enums and structs used for library
//! configuration and command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    BACKEND_ANALYSIS_TIMEOUT, DEFAULT_USER_AGENT, EXPLANATION_TIMEOUT, PAGE_FETCH_TIMEOUT,
    SIGNAL_COLLECTION_TIMEOUT, SIMULATED_BACKEND_LATENCY,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Which analysis backend the Coordinator submits bundles to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// In-process heuristic scorer, always connected
    Local,
    /// Remote-like backend with latency, outages and demo backfill
    Simulated,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use page_trust::Config;
/// use std::time::Duration;
///
/// let config = Config {
///     collection_timeout: Duration::from_secs(5),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Durable store location; `None` keeps everything in memory
    pub db_path: Option<PathBuf>,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Bounded wait for the page context to deliver signals
    pub collection_timeout: Duration,

    /// Bounded wait for the backend to return an analysis
    pub backend_timeout: Duration,

    /// Bounded wait for explanation text
    pub explanation_timeout: Duration,

    /// Backend that analyses are submitted to
    pub backend: BackendKind,

    /// Round-trip latency of the simulated backend
    pub simulated_latency: Duration,

    /// Seed for the simulated backend's demo backfill; `None` disables it
    pub seed: Option<u64>,

    /// Timeout for live page loads
    pub fetch_timeout: Duration,

    /// User-Agent for live page loads
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            collection_timeout: SIGNAL_COLLECTION_TIMEOUT,
            backend_timeout: BACKEND_ANALYSIS_TIMEOUT,
            explanation_timeout: EXPLANATION_TIMEOUT,
            backend: BackendKind::Local,
            simulated_latency: SIMULATED_BACKEND_LATENCY,
            seed: None,
            fetch_timeout: PAGE_FETCH_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.db_path.is_none());
        assert_eq!(config.collection_timeout, Duration::from_secs(10));
        assert_eq!(config.backend_timeout, Duration::from_secs(30));
        assert_eq!(config.backend, BackendKind::Local);
        assert!(config.seed.is_none());
    }
}
