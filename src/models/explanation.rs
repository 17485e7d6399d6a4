//! Lifecycle of the natural-language explanation attached to a result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExplanationStatus {
    #[default]
    Pending,
    Generating,
    Complete,
    Failed,
}

impl ExplanationStatus {
    fn rank(self) -> u8 {
        match self {
            ExplanationStatus::Pending => 0,
            ExplanationStatus::Generating => 1,
            ExplanationStatus::Complete | ExplanationStatus::Failed => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ExplanationStatus::Complete | ExplanationStatus::Failed)
    }

    /// Whether moving from `self` to `next` advances the lifecycle.
    ///
    /// Status only moves forward: pending → generating → complete | failed.
    /// Skipping `generating` is allowed; standing still or going back is not.
    pub fn can_advance_to(self, next: ExplanationStatus) -> bool {
        next.rank() > self.rank()
    }
}

/// Explanation state carried by every `AnalysisResult`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationState {
    pub status: ExplanationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

impl ExplanationState {
    /// Marks generation as started. Returns `false` if the state is already
    /// past `pending`.
    pub fn start(&mut self) -> bool {
        self.advance(ExplanationStatus::Generating)
    }

    /// Records the finished text. Returns `false` if already terminal.
    pub fn complete(&mut self, text: String, at: DateTime<Utc>) -> bool {
        if !self.advance(ExplanationStatus::Complete) {
            return false;
        }
        self.text = Some(text);
        self.error = None;
        self.generated_at = Some(at);
        true
    }

    /// Records a generation failure. Returns `false` if already terminal.
    pub fn fail(&mut self, error: String) -> bool {
        if !self.advance(ExplanationStatus::Failed) {
            return false;
        }
        self.error = Some(error);
        true
    }

    fn advance(&mut self, next: ExplanationStatus) -> bool {
        if !self.status.can_advance_to(next) {
            log::debug!(
                "Rejected explanation transition {:?} -> {:?}",
                self.status,
                next
            );
            return false;
        }
        self.status = next;
        true
    }
}
