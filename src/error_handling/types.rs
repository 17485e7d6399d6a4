//! Error type definitions.
//!
//! This module defines the typed errors raised by each stage of the pipeline
//! and the counter categories tracked by `PipelineStats`.

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::models::TabId;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error opening the document store.
    #[error("Store initialization error: {0}")]
    StoreError(#[from] StorageError),

    /// Error building the HTTP client used for live page fetches.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

/// Error types for document store operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreation(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    /// A stored document could not be encoded or decoded.
    #[error("Document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures of the page-context collection wait.
///
/// None of these reach the requester: each one degrades to the TLS-only
/// fallback bundle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    #[error("Page context for tab {0} is unreachable")]
    Unreachable(TabId),

    #[error("Signal collection for tab {tab_id} timed out after {timeout_ms}ms")]
    TimedOut { tab_id: TabId, timeout_ms: u128 },

    #[error("Signal collection for tab {0} was superseded by a newer request")]
    Superseded(TabId),

    #[error("Tab {tab_id} returned signals for {found}, expected {expected}")]
    DomainMismatch {
        tab_id: TabId,
        expected: String,
        found: String,
    },
}

/// Failures loading a live page into the page host.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{0} is not a page URL")]
    InvalidUrl(String),
}

/// Errors from an analysis backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Backend not available: not connected")]
    NotConnected,

    #[error("Backend not available: {0}")]
    Unavailable(String),

    #[error("Backend analysis timed out after {0}s")]
    Timeout(u64),

    /// The bundle was received but could not be scored.
    #[error("Scoring failed: {0}")]
    Scoring(String),
}

impl BackendError {
    /// Whether resubmitting the same bundle later may succeed.
    ///
    /// Retriable failures are queued to the offline queue; scoring failures
    /// are fatal for the request.
    pub fn is_retriable(&self) -> bool {
        !matches!(self, BackendError::Scoring(_))
    }
}

/// Errors surfaced to the requester of an analysis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    /// The bundle was queued for resubmission.
    #[error("Backend not available, analysis queued for retry ({queued_id}): {reason}")]
    BackendUnavailable { queued_id: String, reason: String },

    #[error("Analysis failed: {0}")]
    Scoring(String),
}

impl AnalysisError {
    pub fn is_retriable(&self) -> bool {
        matches!(self, AnalysisError::BackendUnavailable { .. })
    }
}

/// Errors from an explanation source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExplanationError {
    #[error("Explanation generation timed out after {0}ms")]
    TimedOut(u128),

    #[error("Explanation source failed: {0}")]
    Source(String),
}

/// Types of errors counted during pipeline processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    CollectionTimeout,
    CollectionUnreachable,
    CollectionMismatch,
    BackendUnavailable,
    ScoringFailed,
    StorageReadError,
    StorageWriteError,
    ExplanationFailed,
}

/// Types of informational events counted during pipeline processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    CacheHit,
    CacheMiss,
    CacheEviction,
    OfflineQueued,
    OfflineResubmitted,
    OfflineDiscarded,
    CollectionSuperseded,
    LateSignalsDropped,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::CollectionTimeout => "Signal collection timeout",
            ErrorType::CollectionUnreachable => "Page context unreachable",
            ErrorType::CollectionMismatch => "Signals from another domain",
            ErrorType::BackendUnavailable => "Backend unavailable",
            ErrorType::ScoringFailed => "Scoring failure",
            ErrorType::StorageReadError => "Storage read error",
            ErrorType::StorageWriteError => "Storage write error",
            ErrorType::ExplanationFailed => "Explanation failure",
        }
    }
}

impl InfoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::CacheHit => "Cache hit",
            InfoType::CacheMiss => "Cache miss",
            InfoType::CacheEviction => "Expired cache entry evicted",
            InfoType::OfflineQueued => "Bundle queued offline",
            InfoType::OfflineResubmitted => "Offline bundle resubmitted",
            InfoType::OfflineDiscarded => "Offline bundle discarded",
            InfoType::CollectionSuperseded => "Collection superseded",
            InfoType::LateSignalsDropped => "Late signals dropped",
        }
    }
}
