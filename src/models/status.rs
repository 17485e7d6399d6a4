//! Process-wide health snapshot.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionStatus {
    Connected,
    #[default]
    Disconnected,
    Connecting,
    Offline,
}

/// Snapshot of the Coordinator's status, as broadcast to UI surfaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionStatus {
    pub is_authenticated: bool,
    pub connection_status: ConnectionStatus,
    pub pending_analyses: u32,
    pub offline_queue_size: u32,
}
