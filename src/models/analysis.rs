//! Analysis results, cached entries and offline queue items.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::explanation::ExplanationState;
use super::signals::SignalBundle;
use crate::config::{SAFE_THRESHOLD, WARNING_THRESHOLD};

/// Per-category scores, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalScores {
    pub cookies: u8,
    pub trackers: u8,
    pub fingerprinting: u8,
    pub headers: u8,
    pub ssl: u8,
}

/// Coarse trust classification derived from the aggregate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Verdict {
    Safe,
    Warning,
    Danger,
}

impl Verdict {
    /// Step function over the trust score: `>= 70` safe, `>= 40` warning,
    /// otherwise danger.
    pub fn from_score(trust_score: u8) -> Self {
        if trust_score >= SAFE_THRESHOLD {
            Verdict::Safe
        } else if trust_score >= WARNING_THRESHOLD {
            Verdict::Warning
        } else {
            Verdict::Danger
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Safe => "safe",
            Verdict::Warning => "warning",
            Verdict::Danger => "danger",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Unique result identifier (UUID v4)
    pub id: String,
    pub url: String,
    pub domain: String,
    pub trust_score: u8,
    pub verdict: Verdict,
    pub scores: SignalScores,
    pub signals: SignalBundle,
    pub analyzed_at: DateTime<Utc>,
    #[serde(default)]
    pub explanation: ExplanationState,
}

impl AnalysisResult {
    /// Wraps a scored bundle into a result with a fresh id and a pending
    /// explanation.
    pub fn new(
        signals: SignalBundle,
        scores: SignalScores,
        trust_score: u8,
        verdict: Verdict,
        analyzed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url: signals.url.clone(),
            domain: signals.domain.clone(),
            trust_score,
            verdict,
            scores,
            signals,
            analyzed_at,
            explanation: ExplanationState::default(),
        }
    }
}

/// An analysis persisted with an expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedAnalysis {
    pub result: AnalysisResult,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CachedAnalysis {
    pub fn new(result: AnalysisResult, cached_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            result,
            cached_at,
            expires_at: cached_at + ttl,
        }
    }

    /// An entry is expired once `now` is strictly past `expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// A signal bundle waiting for a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineQueueItem {
    pub id: String,
    pub signals: SignalBundle,
    pub queued_at: DateTime<Utc>,
    pub retry_count: u32,
}
