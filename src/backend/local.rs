use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::AnalysisBackend;
use crate::domain::classify_domain;
use crate::error_handling::{AnalysisError, BackendError};
use crate::models::{AnalysisResult, SignalBundle};
use crate::scoring;
use crate::utils::Clock;

/// Classifies the bundle's domain, scores it and wraps the outcome in a
/// fresh `AnalysisResult`.
pub fn analyze_bundle(
    bundle: SignalBundle,
    analyzed_at: DateTime<Utc>,
) -> Result<AnalysisResult, AnalysisError> {
    let hint = classify_domain(&bundle.domain);
    let card = scoring::score(&bundle, hint)?;
    Ok(AnalysisResult::new(
        bundle,
        card.scores,
        card.trust_score,
        card.verdict,
        analyzed_at,
    ))
}

/// Zero-latency, always-connected backend running the heuristic scorer.
pub struct LocalBackend {
    clock: Arc<dyn Clock>,
}

impl LocalBackend {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl AnalysisBackend for LocalBackend {
    async fn connect(&self) -> Result<(), BackendError> {
        Ok(())
    }

    async fn disconnect(&self) {}

    fn is_connected(&self) -> bool {
        true
    }

    async fn submit(&self, bundle: SignalBundle) -> Result<AnalysisResult, BackendError> {
        analyze_bundle(bundle, self.clock.now()).map_err(|e| BackendError::Scoring(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
