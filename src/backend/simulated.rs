use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{analyze_bundle, AnalysisBackend, DemoBackfill};
use crate::error_handling::BackendError;
use crate::models::{AnalysisResult, SignalBundle};
use crate::utils::Clock;

/// A stand-in for a network backend.
///
/// Submissions wait `latency` before scoring. `set_reachable(false)`
/// simulates an outage: connecting fails and an in-flight submission drops
/// the connection.
pub struct SimulatedBackend {
    clock: Arc<dyn Clock>,
    latency: Duration,
    connected: AtomicBool,
    reachable: AtomicBool,
    backfill: Option<DemoBackfill>,
}

impl SimulatedBackend {
    pub fn new(clock: Arc<dyn Clock>, latency: Duration) -> Self {
        Self {
            clock,
            latency,
            connected: AtomicBool::new(false),
            reachable: AtomicBool::new(true),
            backfill: None,
        }
    }

    /// Enables demo backfill of empty signal categories.
    pub fn with_backfill(mut self, backfill: DemoBackfill) -> Self {
        self.backfill = Some(backfill);
        self
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
        if !reachable {
            self.connected.store(false, Ordering::SeqCst);
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisBackend for SimulatedBackend {
    async fn connect(&self) -> Result<(), BackendError> {
        if !self.is_reachable() {
            return Err(BackendError::Unavailable("simulated backend unreachable".to_string()));
        }
        self.connected.store(true, Ordering::SeqCst);
        log::debug!("Simulated backend connected");
        Ok(())
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn submit(&self, mut bundle: SignalBundle) -> Result<AnalysisResult, BackendError> {
        if !self.is_connected() {
            return Err(BackendError::NotConnected);
        }

        tokio::time::sleep(self.latency).await;

        if !self.is_reachable() {
            self.connected.store(false, Ordering::SeqCst);
            return Err(BackendError::Unavailable("connection lost".to_string()));
        }

        if let Some(backfill) = &self.backfill {
            backfill.fill(&mut bundle);
        }
        analyze_bundle(bundle, self.clock.now()).map_err(|e| BackendError::Scoring(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ManualClock;
    use chrono::Utc;

    fn bundle() -> SignalBundle {
        SignalBundle::empty("https://sim.example/", "sim.example", Utc::now())
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_requires_connection() {
        let backend = SimulatedBackend::new(Arc::new(ManualClock::default()), Duration::from_millis(50));
        assert!(matches!(
            backend.submit(bundle()).await,
            Err(BackendError::NotConnected)
        ));
        backend.connect().await.unwrap();
        let result = backend.submit(bundle()).await.unwrap();
        assert_eq!(result.domain, "sim.example");
    }

    #[tokio::test(start_paused = true)]
    async fn test_outage_drops_connection() {
        let backend = SimulatedBackend::new(Arc::new(ManualClock::default()), Duration::ZERO);
        backend.connect().await.unwrap();
        backend.set_reachable(false);
        assert!(!backend.is_connected());
        let err = backend.connect().await.unwrap_err();
        assert!(err.is_retriable());

        backend.set_reachable(true);
        backend.connect().await.unwrap();
        assert!(backend.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeded_backfill_is_reproducible() {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::default());
        let a = SimulatedBackend::new(clock.clone(), Duration::ZERO).with_backfill(DemoBackfill::seeded(9));
        let b = SimulatedBackend::new(clock, Duration::ZERO).with_backfill(DemoBackfill::seeded(9));
        a.connect().await.unwrap();
        b.connect().await.unwrap();

        let input = bundle();
        let ra = a.submit(input.clone()).await.unwrap();
        let rb = b.submit(input).await.unwrap();
        assert_eq!(ra.signals, rb.signals);
        assert_eq!(ra.trust_score, rb.trust_score);
    }
}
