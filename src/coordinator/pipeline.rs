//! The analysis state machine.
//!
//! `idle → collecting → scoring → notified → explaining → done`, with
//! failures from collecting or scoring returning the tab to `idle`. A
//! cache hit short-circuits straight to `done`.

use crate::collector::fallback_bundle;
use crate::domain::extract_domain;
use crate::error_handling::{AnalysisError, BackendError, CollectionError, ErrorType, InfoType};
use crate::models::{AnalysisResult, ConnectionStatus, ExplanationStatus, SignalBundle, TabId, Verdict};
use crate::protocol::{CollectorMessage, Notification};

use super::{AnalysisPhase, Coordinator};

impl Coordinator {
    /// Analyzes the page open in `tab_id`.
    ///
    /// Returns the result and whether it came from the cache. A live result
    /// is returned as soon as it is cached; its explanation is generated in
    /// the background and republished as `ANALYSIS_RESULT`.
    pub async fn analyze_page(
        &self,
        tab_id: TabId,
        url: &str,
    ) -> Result<(AnalysisResult, bool), AnalysisError> {
        let domain = extract_domain(url)?;
        let inner = &self.inner;

        if let Some(cached) = inner.cache.get(&domain).await {
            log::debug!("Cache hit for {} (tab {})", domain, tab_id);
            inner.session.set(tab_id, cached.result.clone());
            inner.phases.enter(tab_id, AnalysisPhase::Done);
            inner.status.publish(Notification::AnalysisResult {
                result: cached.result.clone(),
                from_cache: true,
            });
            return Ok((cached.result, true));
        }

        let _pending = inner.status.begin_analysis();

        let bundle = self.collect(tab_id, url, &domain).await;

        inner.phases.enter(tab_id, AnalysisPhase::Scoring);
        let result = match self.submit(bundle.clone()).await {
            Ok(result) => result,
            Err(e) => {
                inner.phases.fail(tab_id);
                return Err(self.handle_submit_failure(bundle, e).await);
            }
        };

        if result.domain != domain {
            inner.phases.fail(tab_id);
            log::error!("Backend scored {} for a {} request", result.domain, domain);
            inner.stats.increment_error(ErrorType::ScoringFailed);
            return Err(AnalysisError::Scoring(format!(
                "backend returned a result for {} instead of {}",
                result.domain, domain
            )));
        }

        let settings = self.settings();
        inner
            .cache
            .put(&result.domain, result.clone(), settings.cache_expiration_hours)
            .await;
        inner.session.set(tab_id, result.clone());
        inner.phases.enter(tab_id, AnalysisPhase::Notified);

        inner.status.publish(Notification::AnalysisResult {
            result: result.clone(),
            from_cache: false,
        });
        if result.verdict == Verdict::Danger && settings.notifications {
            inner.status.publish(Notification::SecurityAlert {
                domain: result.domain.clone(),
                trust_score: result.trust_score,
            });
        }

        self.spawn_explanation(Some(tab_id), result.clone());
        Ok((result, false))
    }

    /// Asks the page context for signals and waits a bounded time.
    ///
    /// Never fails: an unreachable page, a timeout, a superseding request or
    /// signals for a different domain all yield the TLS-only fallback bundle.
    async fn collect(&self, tab_id: TabId, url: &str, domain: &str) -> SignalBundle {
        let inner = &self.inner;
        inner.phases.enter(tab_id, AnalysisPhase::Collecting);
        let (token, rx) = inner.pending.register(tab_id);

        let request = CollectorMessage::CollectSignals { tab_id };
        if inner.collector_tx.try_send(request).is_err() {
            inner.pending.cancel(tab_id, token);
            let err = CollectionError::Unreachable(tab_id);
            log::warn!("{}; using fallback signals", err);
            inner.stats.increment_error(ErrorType::CollectionUnreachable);
            return fallback_bundle(url, domain, inner.clock.now());
        }

        match tokio::time::timeout(inner.collection_timeout, rx).await {
            Ok(Ok(mut bundle)) => {
                if bundle.domain.is_empty() {
                    bundle.domain = domain.to_string();
                }
                if bundle.domain == domain {
                    return bundle;
                }
                // The tab navigated away, or the sender is lying about the page
                let err = CollectionError::DomainMismatch {
                    tab_id,
                    expected: domain.to_string(),
                    found: bundle.domain,
                };
                log::warn!("{}; using fallback signals", err);
                inner.stats.increment_error(ErrorType::CollectionMismatch);
                fallback_bundle(url, domain, inner.clock.now())
            }
            Ok(Err(_)) => {
                let err = CollectionError::Superseded(tab_id);
                log::debug!("{}; using fallback signals", err);
                inner.stats.increment_info(InfoType::CollectionSuperseded);
                fallback_bundle(url, domain, inner.clock.now())
            }
            Err(_) => {
                inner.pending.cancel(tab_id, token);
                let err = CollectionError::TimedOut {
                    tab_id,
                    timeout_ms: inner.collection_timeout.as_millis(),
                };
                log::warn!("{}; using fallback signals", err);
                inner.stats.increment_error(ErrorType::CollectionTimeout);
                fallback_bundle(url, domain, inner.clock.now())
            }
        }
    }

    /// Submits to the backend under the backend timeout.
    pub(super) async fn submit(&self, bundle: SignalBundle) -> Result<AnalysisResult, BackendError> {
        let inner = &self.inner;
        match tokio::time::timeout(inner.backend_timeout, inner.backend.submit(bundle)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(BackendError::Timeout(inner.backend_timeout.as_secs())),
        }
    }

    /// Queues retriable failures and maps the error for the requester.
    async fn handle_submit_failure(&self, bundle: SignalBundle, e: BackendError) -> AnalysisError {
        let inner = &self.inner;
        if !e.is_retriable() {
            log::error!("Scoring failed for {}: {}", bundle.domain, e);
            inner.stats.increment_error(ErrorType::ScoringFailed);
            return AnalysisError::Scoring(e.to_string());
        }

        log::warn!("Backend '{}' unavailable: {}", inner.backend.name(), e);
        inner.stats.increment_error(ErrorType::BackendUnavailable);
        if !inner.backend.is_connected() {
            inner.status.set_authenticated(false);
            inner.status.set_connection(ConnectionStatus::Offline);
        }
        let queued_id = inner.queue.enqueue(bundle).await;
        AnalysisError::BackendUnavailable {
            queued_id,
            reason: e.to_string(),
        }
    }

    /// Starts background enrichment of `result`. Results resubmitted from
    /// the offline queue have no tab to track.
    pub(super) fn spawn_explanation(&self, tab_id: Option<TabId>, result: AnalysisResult) {
        if let Some(tab_id) = tab_id {
            self.inner.phases.enter(tab_id, AnalysisPhase::Explaining);
        }
        let this = self.clone();
        self.inner.background.spawn(async move {
            this.explain(tab_id, result).await;
        });
    }

    /// Enriches `result` and republishes it if its cache entry still holds
    /// this result. An expired, cleared or replaced entry makes this a no-op.
    async fn explain(&self, tab_id: Option<TabId>, result: AnalysisResult) {
        let inner = &self.inner;
        let Some(updated) = inner.explainer.generate(result).await else {
            return;
        };
        if updated.explanation.status == ExplanationStatus::Failed {
            inner.stats.increment_error(ErrorType::ExplanationFailed);
        }

        if inner.cache.update_result(&updated).await {
            inner.session.update_result(&updated);
            inner.status.publish(Notification::AnalysisResult {
                result: updated,
                from_cache: false,
            });
        } else {
            log::debug!(
                "Cache entry for {} is gone or replaced; dropping explanation",
                updated.domain
            );
        }
        if let Some(tab_id) = tab_id {
            inner
                .phases
                .advance_from(tab_id, AnalysisPhase::Explaining, AnalysisPhase::Done);
        }
    }
}
