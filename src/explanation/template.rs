//! Explanation text assembled from the scored signals.

use std::time::Duration;

use async_trait::async_trait;

use super::ExplanationSource;
use crate::error_handling::ExplanationError;
use crate::models::{AnalysisResult, SignalScores, Verdict};

/// Deterministic, offline explanation source.
#[derive(Debug, Clone, Default)]
pub struct TemplateExplainer {
    /// Artificial generation latency
    delay: Duration,
}

impl TemplateExplainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

fn category_scores(scores: &SignalScores) -> [(&'static str, u8); 5] {
    [
        ("TLS", scores.ssl),
        ("security headers", scores.headers),
        ("cookies", scores.cookies),
        ("trackers", scores.trackers),
        ("fingerprinting", scores.fingerprinting),
    ]
}

fn list(items: &[String]) -> String {
    items.join(", ")
}

/// Renders the explanation for `result`.
pub fn render_explanation(result: &AnalysisResult) -> String {
    let mut parts = Vec::new();

    let opening = match result.verdict {
        Verdict::Safe => "looks trustworthy",
        Verdict::Warning => "shows some warning signs",
        Verdict::Danger => "shows serious trust problems",
    };
    parts.push(format!(
        "{} {} with a trust score of {}/100.",
        result.domain, opening, result.trust_score
    ));

    let categories = category_scores(&result.scores);
    // First maximum and first minimum in declaration order
    let strongest = categories
        .iter()
        .fold(categories[0], |best, c| if c.1 > best.1 { *c } else { best });
    let weakest = categories
        .iter()
        .fold(categories[0], |worst, c| if c.1 < worst.1 { *c } else { worst });
    if strongest.1 != weakest.1 {
        parts.push(format!(
            "Strongest area: {} ({}). Weakest area: {} ({}).",
            strongest.0, strongest.1, weakest.0, weakest.1
        ));
    }

    let signals = &result.signals;
    if signals.trackers.detected.is_empty() {
        parts.push("No known trackers were detected.".to_string());
    } else {
        parts.push(format!(
            "Detected {} tracker(s): {}.",
            signals.trackers.count(),
            list(&signals.trackers.detected)
        ));
    }

    if !signals.fingerprinting.techniques.is_empty() {
        let techniques: Vec<String> = signals
            .fingerprinting
            .techniques
            .iter()
            .map(|t| t.as_str().to_string())
            .collect();
        parts.push(format!(
            "Fingerprinting risk is {} ({}).",
            signals.fingerprinting.risk.as_str(),
            list(&techniques)
        ));
    }

    if !signals.headers.missing.is_empty() {
        parts.push(format!(
            "Missing security headers: {}.",
            list(&signals.headers.missing)
        ));
    }

    parts.push(if signals.ssl.valid {
        "The connection is encrypted with HTTPS.".to_string()
    } else {
        "The page is not served over HTTPS.".to_string()
    });

    parts.join(" ")
}

#[async_trait]
impl ExplanationSource for TemplateExplainer {
    async fn explain(&self, result: &AnalysisResult) -> Result<String, ExplanationError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(render_explanation(result))
    }

    fn name(&self) -> &'static str {
        "template"
    }
}
