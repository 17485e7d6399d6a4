//! Running the Coordinator together with an in-process page host.

mod resources;
mod task;

use std::sync::atomic::AtomicU32;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::app::shutdown_gracefully;
use crate::collector::PageSnapshot;
use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::error_handling::{AnalysisError, InitializationError};
use crate::initialization::{init_client, init_store};
use crate::models::AnalysisResult;
use crate::page::PageHost;
use crate::storage::DocumentStore;
use crate::utils::{Clock, SystemClock};

pub use resources::{build_backend, Runtime};
pub use task::PageOutcome;

/// Results of analyzing a batch of URLs.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// One entry per requested URL, in completion order
    pub outcomes: Vec<PageOutcome>,
    pub elapsed_seconds: f64,
}

impl RunReport {
    pub fn analyzed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PageOutcome::Analyzed { .. }))
            .count()
    }

    pub fn from_cache(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PageOutcome::Analyzed { from_cache: true, .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.analyzed()
    }
}

impl Runtime {
    /// Opens the store named by `config` and starts a runtime on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store or the HTTP client cannot be created.
    pub async fn start(config: &Config) -> Result<Runtime, InitializationError> {
        let store = init_store(config.db_path.as_deref()).await?;
        Self::with_store(config, store).await
    }

    /// Starts the Coordinator on `store` and spawns the page host.
    pub async fn with_store(
        config: &Config,
        store: DocumentStore,
    ) -> Result<Runtime, InitializationError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let client = init_client(config.fetch_timeout, &config.user_agent)?;

        let (coordinator, requests) = Coordinator::builder(store)
            .config(config)
            .clock(clock.clone())
            .backend(build_backend(config, clock.clone()))
            .build()
            .await;

        let host = Arc::new(PageHost::new(clock));
        let cancel = CancellationToken::new();
        let host_task = host
            .clone()
            .spawn(coordinator.clone(), requests, cancel.clone());

        Ok(Runtime {
            coordinator,
            host,
            client,
            cancel,
            host_task: Some(host_task),
            next_tab: AtomicU32::new(1),
        })
    }

    /// Analyzes a page that is already loaded, in a tab of its own.
    ///
    /// The tab is closed again once the analysis returns.
    pub async fn analyze_snapshot(
        &self,
        snapshot: PageSnapshot,
    ) -> Result<(AnalysisResult, bool), AnalysisError> {
        let tab_id = self.next_tab_id();
        let url = snapshot.url.clone();
        self.host.open(tab_id, snapshot);
        let outcome = self.coordinator.analyze_page(tab_id, &url).await;
        self.host.close(tab_id);
        outcome
    }

    /// Loads and analyzes every URL concurrently.
    pub async fn analyze_urls(&self, urls: Vec<String>) -> RunReport {
        let start = Instant::now();
        let mut tasks: FuturesUnordered<_> = urls
            .into_iter()
            .map(|url| task::process_url_task(self, url))
            .collect();

        let mut outcomes = Vec::new();
        while let Some(outcome) = tasks.next().await {
            log::debug!("Finished {}", outcome.url());
            outcomes.push(outcome);
        }

        RunReport {
            outcomes,
            elapsed_seconds: start.elapsed().as_secs_f64(),
        }
    }

    /// Stops the page host and shuts the Coordinator down.
    pub async fn shutdown(mut self) {
        let host_task = self.host_task.take();
        shutdown_gracefully(&self.coordinator, self.cancel.clone(), host_task).await;
    }
}
