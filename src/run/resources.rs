//! Runtime resources.
//!
//! `Runtime` holds everything a CLI session needs: the Coordinator, the
//! page host answering its collection requests, and the HTTP client used
//! to load live pages.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backend::{AnalysisBackend, DemoBackfill, LocalBackend, SimulatedBackend};
use crate::config::{BackendKind, Config};
use crate::coordinator::Coordinator;
use crate::models::TabId;
use crate::page::PageHost;
use crate::utils::Clock;

/// A running Coordinator wired to an in-process page host.
pub struct Runtime {
    pub(super) coordinator: Coordinator,
    pub(super) host: Arc<PageHost>,
    pub(super) client: Arc<reqwest::Client>,
    pub(super) cancel: CancellationToken,
    pub(super) host_task: Option<JoinHandle<()>>,
    pub(super) next_tab: AtomicU32,
}

impl Runtime {
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn host(&self) -> &Arc<PageHost> {
        &self.host
    }

    pub fn client(&self) -> &Arc<reqwest::Client> {
        &self.client
    }

    /// Hands out a fresh tab id for each page this session analyzes.
    pub(super) fn next_tab_id(&self) -> TabId {
        self.next_tab.fetch_add(1, Ordering::Relaxed)
    }
}

/// Builds the backend selected by `config`.
pub fn build_backend(config: &Config, clock: Arc<dyn Clock>) -> Arc<dyn AnalysisBackend> {
    match config.backend {
        BackendKind::Local => Arc::new(LocalBackend::new(clock)),
        BackendKind::Simulated => {
            let backend = SimulatedBackend::new(clock, config.simulated_latency);
            match config.seed {
                Some(seed) => {
                    log::info!("Demo backfill enabled (seed {})", seed);
                    Arc::new(backend.with_backfill(DemoBackfill::seeded(seed)))
                }
                None => Arc::new(backend),
            }
        }
    }
}
