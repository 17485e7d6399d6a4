//! The long-lived Coordinator.
//!
//! The Coordinator owns the process-wide status, the durable stores and
//! the session map. It dispatches collection requests to page contexts,
//! runs analyses through an `AnalysisBackend` and answers UI queries
//! through the message router.
//!
//! Submodules:
//! - `pending`: one-shot waiters for in-flight collections
//! - `phase`: per-tab analysis phase
//! - `pipeline`: the analysis state machine
//! - `offline`: reconnect and offline queue flushing
//! - `router`: message dispatch

mod offline;
mod pending;
mod phase;
mod pipeline;
mod router;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio_util::task::TaskTracker;

use crate::backend::{AnalysisBackend, LocalBackend};
use crate::config::{Config, Settings, COLLECT_CHANNEL_CAPACITY};
use crate::error_handling::PipelineStats;
use crate::explanation::{ExplanationGenerator, ExplanationSource, TemplateExplainer};
use crate::models::{ConnectionStatus, ExtensionStatus, TabId};
use crate::protocol::{CollectorMessage, Notification};
use crate::status::StatusTracker;
use crate::storage::{load_settings, DocumentStore, OfflineQueue, ResultCache, SessionResults};
use crate::utils::{Clock, SystemClock};

pub use pending::PendingCollections;
pub use phase::{AnalysisPhase, PhaseTracker};

struct Inner {
    clock: Arc<dyn Clock>,
    stats: Arc<PipelineStats>,
    status: Arc<StatusTracker>,
    store: DocumentStore,
    cache: ResultCache,
    queue: OfflineQueue,
    session: SessionResults,
    settings: Mutex<Settings>,
    backend: Arc<dyn AnalysisBackend>,
    explainer: ExplanationGenerator,
    pending: PendingCollections,
    phases: PhaseTracker,
    collector_tx: mpsc::Sender<CollectorMessage>,
    background: TaskTracker,
    collection_timeout: Duration,
    backend_timeout: Duration,
}

/// Handle to the Coordinator. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

/// Assembles a `Coordinator` from a document store plus optional
/// collaborators; anything not supplied gets its default.
pub struct CoordinatorBuilder {
    store: DocumentStore,
    config: Config,
    clock: Arc<dyn Clock>,
    stats: Arc<PipelineStats>,
    backend: Option<Arc<dyn AnalysisBackend>>,
    explainer: Option<Arc<dyn ExplanationSource>>,
}

impl CoordinatorBuilder {
    pub fn config(mut self, config: &Config) -> Self {
        self.config = config.clone();
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn stats(mut self, stats: Arc<PipelineStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn backend(mut self, backend: Arc<dyn AnalysisBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn explainer(mut self, explainer: Arc<dyn ExplanationSource>) -> Self {
        self.explainer = Some(explainer);
        self
    }

    /// Builds the Coordinator and returns it with the receiving end of the
    /// `COLLECT_SIGNALS` channel, which a page host must drain.
    ///
    /// Startup loads settings, mirrors the persisted offline queue length
    /// into the status, purges expired cache entries and makes one
    /// connection attempt to the backend.
    pub async fn build(self) -> (Coordinator, mpsc::Receiver<CollectorMessage>) {
        let status = Arc::new(StatusTracker::new());
        let (collector_tx, collector_rx) = mpsc::channel(COLLECT_CHANNEL_CAPACITY);

        let backend = self
            .backend
            .unwrap_or_else(|| Arc::new(LocalBackend::new(self.clock.clone())));
        let explainer = self
            .explainer
            .unwrap_or_else(|| Arc::new(TemplateExplainer::new()));

        let settings = load_settings(&self.store, &self.stats).await;

        let inner = Inner {
            cache: ResultCache::new(self.store.clone(), self.clock.clone(), self.stats.clone()),
            queue: OfflineQueue::new(
                self.store.clone(),
                self.clock.clone(),
                self.stats.clone(),
                status.clone(),
            ),
            session: SessionResults::new(),
            settings: Mutex::new(settings),
            explainer: ExplanationGenerator::new(
                explainer,
                self.clock.clone(),
                self.config.explanation_timeout,
            ),
            pending: PendingCollections::new(),
            phases: PhaseTracker::new(),
            collector_tx,
            background: TaskTracker::new(),
            collection_timeout: self.config.collection_timeout,
            backend_timeout: self.config.backend_timeout,
            clock: self.clock,
            stats: self.stats,
            status,
            store: self.store,
            backend,
        };
        let coordinator = Coordinator {
            inner: Arc::new(inner),
        };

        coordinator.inner.queue.sync_status().await;
        coordinator.inner.cache.purge_expired().await;
        coordinator.connect_once().await;

        log::info!(
            "Coordinator ready (backend: {})",
            coordinator.inner.backend.name()
        );
        (coordinator, collector_rx)
    }
}

impl Coordinator {
    pub fn builder(store: DocumentStore) -> CoordinatorBuilder {
        CoordinatorBuilder {
            store,
            config: Config::default(),
            clock: Arc::new(SystemClock),
            stats: Arc::new(PipelineStats::new()),
            backend: None,
            explainer: None,
        }
    }

    /// Single connection attempt without backoff.
    async fn connect_once(&self) {
        let backend = &self.inner.backend;
        self.inner.status.set_connection(ConnectionStatus::Connecting);
        match backend.connect().await {
            Ok(()) => {
                self.inner.status.set_authenticated(true);
                self.inner.status.set_connection(ConnectionStatus::Connected);
            }
            Err(e) => {
                log::warn!("Backend '{}' unavailable at startup: {}", backend.name(), e);
                self.inner.status.set_authenticated(false);
                self.inner.status.set_connection(ConnectionStatus::Offline);
            }
        }
    }

    /// Subscribes a UI surface to `STATUS_UPDATE`, `ANALYSIS_RESULT` and
    /// `SECURITY_ALERT` broadcasts.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.inner.status.subscribe()
    }

    pub fn status(&self) -> ExtensionStatus {
        self.inner.status.snapshot()
    }

    pub fn phase(&self, tab_id: TabId) -> AnalysisPhase {
        self.inner.phases.get(tab_id)
    }

    pub fn is_collecting(&self, tab_id: TabId) -> bool {
        self.inner.pending.is_pending(tab_id)
    }

    pub fn stats(&self) -> Arc<PipelineStats> {
        self.inner.stats.clone()
    }

    pub fn settings(&self) -> Settings {
        self.inner
            .settings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn backend(&self) -> Arc<dyn AnalysisBackend> {
        self.inner.backend.clone()
    }

    /// Waits until every background explanation task has finished.
    pub async fn wait_for_background(&self) {
        let tasks = &self.inner.background;
        tasks.close();
        tasks.wait().await;
        tasks.reopen();
    }

    /// Waits for background work, disconnects the backend and closes the
    /// store.
    pub async fn shutdown(&self) {
        self.wait_for_background().await;
        self.inner.backend.disconnect().await;
        self.inner.status.set_connection(ConnectionStatus::Disconnected);
        self.inner.store.close().await;
    }
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
