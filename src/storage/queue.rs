//! Durable FIFO of signal bundles awaiting a backend.

use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use super::documents::{DocumentStore, OFFLINE_QUEUE_KEY};
use crate::error_handling::{ErrorType, InfoType, PipelineStats};
use crate::models::{OfflineQueueItem, SignalBundle};
use crate::status::StatusTracker;
use crate::utils::Clock;

/// The queue is stored as one ordered list under `offlineQueue`.
///
/// Every mutation updates `offlineQueueSize` before the lock is released, so
/// the status always mirrors the persisted length.
pub struct OfflineQueue {
    store: DocumentStore,
    clock: Arc<dyn Clock>,
    stats: Arc<PipelineStats>,
    status: Arc<StatusTracker>,
    lock: Mutex<()>,
}

impl OfflineQueue {
    pub fn new(
        store: DocumentStore,
        clock: Arc<dyn Clock>,
        stats: Arc<PipelineStats>,
        status: Arc<StatusTracker>,
    ) -> Self {
        Self {
            store,
            clock,
            stats,
            status,
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Vec<OfflineQueueItem> {
        match self.store.get::<Vec<OfflineQueueItem>>(OFFLINE_QUEUE_KEY).await {
            Ok(items) => items.unwrap_or_default(),
            Err(e) => {
                log::warn!("Failed to read offline queue, treating as empty: {}", e);
                self.stats.increment_error(ErrorType::StorageReadError);
                Vec::new()
            }
        }
    }

    /// Persists `items` and publishes the resulting size. On a failed write
    /// the previous length stays authoritative.
    async fn save(&self, items: &[OfflineQueueItem], previous_len: usize) -> bool {
        match self.store.set(OFFLINE_QUEUE_KEY, items).await {
            Ok(()) => {
                self.status.set_offline_queue_size(items.len());
                true
            }
            Err(e) => {
                log::error!("Failed to write offline queue: {}", e);
                self.stats.increment_error(ErrorType::StorageWriteError);
                self.status.set_offline_queue_size(previous_len);
                false
            }
        }
    }

    /// Re-reads the persisted queue and publishes its length.
    pub async fn sync_status(&self) -> usize {
        let _guard = self.lock.lock().await;
        let len = self.load().await.len();
        self.status.set_offline_queue_size(len);
        len
    }

    /// Appends `bundle` and returns the new item's id.
    pub async fn enqueue(&self, bundle: SignalBundle) -> String {
        let _guard = self.lock.lock().await;
        let mut items = self.load().await;
        let previous_len = items.len();

        let item = OfflineQueueItem {
            id: Uuid::new_v4().to_string(),
            signals: bundle,
            queued_at: self.clock.now(),
            retry_count: 0,
        };
        let id = item.id.clone();
        log::info!("Queued {} for offline resubmission ({})", item.signals.domain, id);
        items.push(item);

        if self.save(&items, previous_len).await {
            self.stats.increment_info(InfoType::OfflineQueued);
        }
        id
    }

    /// Removes the item with `id`; returns whether it was present.
    pub async fn dequeue(&self, id: &str) -> bool {
        let _guard = self.lock.lock().await;
        let mut items = self.load().await;
        let previous_len = items.len();
        items.retain(|item| item.id != id);
        if items.len() == previous_len {
            return false;
        }
        self.save(&items, previous_len).await
    }

    /// Items in FIFO order (by `queuedAt`, then insertion).
    pub async fn list(&self) -> Vec<OfflineQueueItem> {
        let _guard = self.lock.lock().await;
        let mut items = self.load().await;
        // Stable sort keeps insertion order for equal timestamps
        items.sort_by_key(|item| item.queued_at);
        items
    }

    /// Bumps the retry counter of `id`; returns the new count.
    pub async fn increment_retry(&self, id: &str) -> Option<u32> {
        let _guard = self.lock.lock().await;
        let mut items = self.load().await;
        let previous_len = items.len();
        let item = items.iter_mut().find(|item| item.id == id)?;
        item.retry_count += 1;
        let count = item.retry_count;
        self.save(&items, previous_len).await;
        Some(count)
    }

    pub async fn len(&self) -> usize {
        let _guard = self.lock.lock().await;
        self.load().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
