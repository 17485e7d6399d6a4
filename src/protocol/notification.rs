//! Fire-and-forget broadcasts from the Coordinator to UI surfaces.

use serde::{Deserialize, Serialize};

use crate::models::{AnalysisResult, ExtensionStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Notification {
    StatusUpdate {
        status: ExtensionStatus,
    },
    AnalysisResult {
        result: AnalysisResult,
        from_cache: bool,
    },
    /// Sent for `danger` verdicts when notifications are enabled
    SecurityAlert {
        domain: String,
        trust_score: u8,
    },
}
