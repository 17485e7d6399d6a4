//! Reconnecting to the backend and draining the offline queue.

use tokio_retry::Retry;

use crate::config::MAX_OFFLINE_RETRIES;
use crate::error_handling::{get_reconnect_strategy, InfoType};
use crate::models::ConnectionStatus;
use crate::protocol::Notification;

use super::Coordinator;

impl Coordinator {
    /// Reconnects with exponential backoff, then flushes the offline queue.
    ///
    /// Status moves to `connecting`, then `connected` or `offline` once the
    /// retries are exhausted.
    pub async fn reconnect(&self) -> ConnectionStatus {
        let status = self.try_reconnect().await;
        if status == ConnectionStatus::Connected {
            self.flush_offline_queue().await;
        }
        status
    }

    pub(super) async fn try_reconnect(&self) -> ConnectionStatus {
        let inner = &self.inner;
        let backend = inner.backend.clone();
        inner.status.set_connection(ConnectionStatus::Connecting);

        let attempt = Retry::spawn(get_reconnect_strategy(), || {
            let backend = backend.clone();
            async move {
                let outcome = backend.connect().await;
                if let Err(e) = &outcome {
                    log::debug!("Reconnect attempt to '{}' failed: {}", backend.name(), e);
                }
                outcome
            }
        })
        .await;

        match attempt {
            Ok(()) => {
                log::info!("Reconnected to backend '{}'", backend.name());
                inner.status.set_authenticated(true);
                inner.status.set_connection(ConnectionStatus::Connected);
                ConnectionStatus::Connected
            }
            Err(e) => {
                log::warn!("Backend '{}' still unavailable: {}", backend.name(), e);
                inner.status.set_authenticated(false);
                inner.status.set_connection(ConnectionStatus::Offline);
                ConnectionStatus::Offline
            }
        }
    }

    /// Resubmits queued bundles in FIFO order.
    ///
    /// Each success is cached, published and dequeued. The first failure
    /// bumps that item's retry count and stops the flush. Items that already
    /// used up `MAX_OFFLINE_RETRIES` are discarded. Returns `(submitted,
    /// remaining)`.
    pub async fn flush_offline_queue(&self) -> (usize, usize) {
        let inner = &self.inner;
        if !inner.backend.is_connected() {
            return (0, inner.queue.len().await);
        }

        let ttl_hours = self.settings().cache_expiration_hours;
        let mut submitted = 0;

        for item in inner.queue.list().await {
            if item.retry_count >= MAX_OFFLINE_RETRIES {
                log::warn!(
                    "Discarding queued analysis of {} after {} failed retries",
                    item.signals.domain,
                    item.retry_count
                );
                inner.queue.dequeue(&item.id).await;
                inner.stats.increment_info(InfoType::OfflineDiscarded);
                continue;
            }

            match self.submit(item.signals.clone()).await {
                Ok(result) => {
                    inner.cache.put(&result.domain, result.clone(), ttl_hours).await;
                    inner.queue.dequeue(&item.id).await;
                    inner.stats.increment_info(InfoType::OfflineResubmitted);
                    inner.status.publish(Notification::AnalysisResult {
                        result: result.clone(),
                        from_cache: false,
                    });
                    self.spawn_explanation(None, result);
                    submitted += 1;
                }
                Err(e) => {
                    log::warn!("Resubmission of {} failed: {}", item.signals.domain, e);
                    inner.queue.increment_retry(&item.id).await;
                    if !inner.backend.is_connected() {
                        inner.status.set_authenticated(false);
                        inner.status.set_connection(ConnectionStatus::Offline);
                    }
                    break;
                }
            }
        }

        let remaining = inner.queue.len().await;
        log::info!(
            "Offline queue flush: {} resubmitted, {} remaining",
            submitted,
            remaining
        );
        (submitted, remaining)
    }
}
