//! Analysis backends.
//!
//! The Coordinator only sees `AnalysisBackend`. Implementations:
//! - `LocalBackend`: the in-process heuristic scorer, always connected
//! - `SimulatedBackend`: a remote-like backend with latency, switchable
//!   outages and optional demo backfill of missing signals

mod backfill;
mod local;
mod simulated;

use async_trait::async_trait;

use crate::error_handling::BackendError;
use crate::models::{AnalysisResult, SignalBundle};

pub use backfill::DemoBackfill;
pub use local::{analyze_bundle, LocalBackend};
pub use simulated::SimulatedBackend;

#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Establishes the backend channel.
    async fn connect(&self) -> Result<(), BackendError>;

    async fn disconnect(&self);

    fn is_connected(&self) -> bool;

    /// Scores one bundle.
    ///
    /// Retriable errors (see `BackendError::is_retriable`) mean the bundle
    /// should be queued and resubmitted later.
    async fn submit(&self, bundle: SignalBundle) -> Result<AnalysisResult, BackendError>;

    /// Backend identifier for logging
    fn name(&self) -> &'static str;
}
