//! Requests exchanged between contexts.

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::models::{SignalBundle, TabId};

/// Requests handled by the Coordinator.
///
/// Serialized with a `type` discriminant in SCREAMING_SNAKE_CASE and
/// camelCase payload fields: `{"type":"ANALYZE_PAGE","tabId":1,"url":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Message {
    /// Signals delivered by a page context in answer to `COLLECT_SIGNALS`
    SignalsCollected { tab_id: TabId, signals: SignalBundle },
    AnalyzePage { tab_id: TabId, url: String },
    /// A tab finished navigating; analyzed when auto-analyze is on
    TabUpdated { tab_id: TabId, url: String },
    GetCachedResult { domain: String },
    GetTabResult { tab_id: TabId },
    GetStatus,
    ClearCache,
    GetSettings,
    UpdateSettings { settings: Settings },
    GetOfflineQueue,
    RetryOfflineQueue,
}

impl Message {
    /// Discriminants the Coordinator accepts.
    pub const TAGS: &'static [&'static str] = &[
        "SIGNALS_COLLECTED",
        "ANALYZE_PAGE",
        "TAB_UPDATED",
        "GET_CACHED_RESULT",
        "GET_TAB_RESULT",
        "GET_STATUS",
        "CLEAR_CACHE",
        "GET_SETTINGS",
        "UPDATE_SETTINGS",
        "GET_OFFLINE_QUEUE",
        "RETRY_OFFLINE_QUEUE",
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Message::SignalsCollected { .. } => "SIGNALS_COLLECTED",
            Message::AnalyzePage { .. } => "ANALYZE_PAGE",
            Message::TabUpdated { .. } => "TAB_UPDATED",
            Message::GetCachedResult { .. } => "GET_CACHED_RESULT",
            Message::GetTabResult { .. } => "GET_TAB_RESULT",
            Message::GetStatus => "GET_STATUS",
            Message::ClearCache => "CLEAR_CACHE",
            Message::GetSettings => "GET_SETTINGS",
            Message::UpdateSettings { .. } => "UPDATE_SETTINGS",
            Message::GetOfflineQueue => "GET_OFFLINE_QUEUE",
            Message::RetryOfflineQueue => "RETRY_OFFLINE_QUEUE",
        }
    }
}

/// Requests sent from the Coordinator into a page context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum CollectorMessage {
    CollectSignals { tab_id: TabId },
}
