//! Natural-language enrichment of completed analyses.

mod template;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error_handling::ExplanationError;
use crate::models::AnalysisResult;
use crate::utils::Clock;

pub use template::{render_explanation, TemplateExplainer};

#[async_trait]
pub trait ExplanationSource: Send + Sync {
    async fn explain(&self, result: &AnalysisResult) -> Result<String, ExplanationError>;

    fn name(&self) -> &'static str;
}

/// Drives one result's `ExplanationState` through
/// pending → generating → complete | failed.
pub struct ExplanationGenerator {
    source: Arc<dyn ExplanationSource>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl ExplanationGenerator {
    pub fn new(source: Arc<dyn ExplanationSource>, clock: Arc<dyn Clock>, timeout: Duration) -> Self {
        Self {
            source,
            clock,
            timeout,
        }
    }

    /// Returns `result` with a terminal explanation state (`complete` or
    /// `failed`), or `None` if the result was already past `pending`.
    pub async fn generate(&self, mut result: AnalysisResult) -> Option<AnalysisResult> {
        if !result.explanation.start() {
            return None;
        }

        let outcome = match tokio::time::timeout(self.timeout, self.source.explain(&result)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ExplanationError::TimedOut(self.timeout.as_millis())),
        };

        match outcome {
            Ok(text) => {
                result.explanation.complete(text, self.clock.now());
                log::debug!("Explanation ready for {} via {}", result.domain, self.source.name());
            }
            Err(e) => {
                log::warn!("Explanation for {} failed: {}", result.domain, e);
                result.explanation.fail(e.to_string());
            }
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::analyze_bundle;
    use crate::models::{ExplanationStatus, SignalBundle};
    use crate::utils::ManualClock;
    use chrono::Utc;

    struct FailingSource;

    #[async_trait]
    impl ExplanationSource for FailingSource {
        async fn explain(&self, _result: &AnalysisResult) -> Result<String, ExplanationError> {
            Err(ExplanationError::Source("model offline".into()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn sample_result() -> AnalysisResult {
        let mut bundle = SignalBundle::empty("http://plain.example/", "plain.example", Utc::now());
        bundle.trackers.detected = vec!["Hotjar".into()];
        bundle.headers.missing = vec!["x-frame-options".into()];
        analyze_bundle(bundle, Utc::now()).unwrap()
    }

    fn generator(source: Arc<dyn ExplanationSource>, timeout: Duration) -> ExplanationGenerator {
        ExplanationGenerator::new(source, Arc::new(ManualClock::default()), timeout)
    }

    #[test]
    fn test_template_mentions_the_signals() {
        let text = render_explanation(&sample_result());
        assert!(text.starts_with("plain.example"));
        assert!(text.contains("Hotjar"));
        assert!(text.contains("x-frame-options"));
        assert!(text.contains("not served over HTTPS"));
        assert!(text.contains("Weakest area: TLS (30)"));
    }

    #[tokio::test]
    async fn test_generate_completes() {
        let gen = generator(Arc::new(TemplateExplainer::new()), Duration::from_secs(1));
        let result = gen.generate(sample_result()).await.unwrap();
        assert_eq!(result.explanation.status, ExplanationStatus::Complete);
        assert!(result.explanation.text.is_some());
        assert!(result.explanation.generated_at.is_some());
    }

    #[tokio::test]
    async fn test_generate_source_failure() {
        let gen = generator(Arc::new(FailingSource), Duration::from_secs(1));
        let result = gen.generate(sample_result()).await.unwrap();
        assert_eq!(result.explanation.status, ExplanationStatus::Failed);
        assert!(result.explanation.error.unwrap().contains("model offline"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_times_out() {
        let slow = TemplateExplainer::with_delay(Duration::from_secs(60));
        let gen = generator(Arc::new(slow), Duration::from_secs(5));
        let result = gen.generate(sample_result()).await.unwrap();
        assert_eq!(result.explanation.status, ExplanationStatus::Failed);
        assert!(result.explanation.error.unwrap().contains("5000ms"));
    }

    #[tokio::test]
    async fn test_generate_never_regresses() {
        let gen = generator(Arc::new(TemplateExplainer::new()), Duration::from_secs(1));
        let done = gen.generate(sample_result()).await.unwrap();
        assert!(gen.generate(done).await.is_none());
    }
}
