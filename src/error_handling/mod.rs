//! Error handling and pipeline statistics.
//!
//! This module provides:
//! - Typed errors for every pipeline stage
//! - Retry strategy configuration for backend reconnects
//! - Pipeline statistics (error and info counters)
//!
//! Only scoring failures and backend unavailability ever reach a requester;
//! collection and storage failures are recovered locally and only counted.

mod stats;
mod types;

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

// Re-export public API
pub use stats::PipelineStats;
pub use types::{
    AnalysisError, BackendError, CollectionError, ErrorType, ExplanationError, FetchError,
    InfoType, InitializationError, StorageError,
};

/// Creates the exponential backoff used when reconnecting to a backend.
///
/// Returns a retry strategy configured with:
/// - Initial delay: `RECONNECT_INITIAL_DELAY_MS` milliseconds
/// - Backoff factor: `RECONNECT_FACTOR`
/// - Maximum delay: `RECONNECT_MAX_DELAY_SECS` seconds
/// - Maximum attempts: `RECONNECT_MAX_ATTEMPTS` retries after the first try
pub fn get_reconnect_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RECONNECT_INITIAL_DELAY_MS)
        .factor(crate::config::RECONNECT_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RECONNECT_MAX_DELAY_SECS))
        .take(crate::config::RECONNECT_MAX_ATTEMPTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_pipeline_stats_initialization() {
        let stats = PipelineStats::new();
        for error_type in ErrorType::iter() {
            assert_eq!(stats.get_error_count(error_type), 0);
        }
        for info_type in InfoType::iter() {
            assert_eq!(stats.get_info_count(info_type), 0);
        }
    }

    #[test]
    fn test_pipeline_stats_totals() {
        let stats = PipelineStats::new();
        stats.increment_error(ErrorType::CollectionTimeout);
        stats.increment_error(ErrorType::CollectionTimeout);
        stats.increment_error(ErrorType::StorageReadError);
        stats.increment_info(InfoType::CacheHit);

        assert_eq!(stats.get_error_count(ErrorType::CollectionTimeout), 2);
        assert_eq!(stats.total_errors(), 3);
        assert_eq!(stats.total_info(), 1);
    }

    #[test]
    fn test_reconnect_strategy_is_bounded() {
        let delays: Vec<Duration> = get_reconnect_strategy().collect();
        assert_eq!(delays.len(), crate::config::RECONNECT_MAX_ATTEMPTS);
        assert!(delays
            .iter()
            .all(|d| *d <= Duration::from_secs(crate::config::RECONNECT_MAX_DELAY_SECS)));
    }

    #[test]
    fn test_retriability() {
        assert!(BackendError::NotConnected.is_retriable());
        assert!(BackendError::Timeout(30).is_retriable());
        assert!(!BackendError::Scoring("bad".into()).is_retriable());

        let queued = AnalysisError::BackendUnavailable {
            queued_id: "q1".into(),
            reason: "down".into(),
        };
        assert!(queued.is_retriable());
        assert!(!AnalysisError::Scoring("bad".into()).is_retriable());
    }
}
