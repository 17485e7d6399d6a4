//! Replies to Coordinator requests.

use serde::Serialize;

use crate::config::Settings;
use crate::error_handling::AnalysisError;
use crate::models::{AnalysisResult, ExtensionStatus, OfflineQueueItem};

/// Reply shapes, serialized without a discriminant (`{"result":...,
/// "fromCache":true}`, `{"status":...}`, `{"error":"...","retriable":false}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum Response {
    Analysis {
        result: AnalysisResult,
        from_cache: bool,
    },
    Result {
        result: Option<AnalysisResult>,
    },
    Status {
        status: ExtensionStatus,
    },
    Settings {
        settings: Settings,
    },
    Queue {
        items: Vec<OfflineQueueItem>,
    },
    Retry {
        submitted: usize,
        remaining: usize,
    },
    Success {
        success: bool,
    },
    Error {
        error: String,
        retriable: bool,
    },
}

impl Response {
    pub fn success() -> Self {
        Response::Success { success: true }
    }

    pub fn unsupported(tag: &str) -> Self {
        Response::Error {
            error: format!("Unsupported message type: {}", tag),
            retriable: false,
        }
    }

    pub fn invalid_payload(tag: &str, reason: impl std::fmt::Display) -> Self {
        Response::Error {
            error: format!("Invalid payload for {}: {}", tag, reason),
            retriable: false,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}

impl From<AnalysisError> for Response {
    fn from(e: AnalysisError) -> Self {
        Response::Error {
            retriable: e.is_retriable(),
            error: e.to_string(),
        }
    }
}
