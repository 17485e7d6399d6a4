//! Process-wide status owned by the Coordinator.
//!
//! `StatusTracker` is the only place `ExtensionStatus` is mutated. Every
//! change is broadcast as `STATUS_UPDATE`; a broadcast with no listening UI
//! surface is not an error.

use std::sync::Mutex;

use tokio::sync::broadcast;

use crate::config::NOTIFICATION_CHANNEL_CAPACITY;
use crate::models::{ConnectionStatus, ExtensionStatus};
use crate::protocol::Notification;

pub struct StatusTracker {
    status: Mutex<ExtensionStatus>,
    notifier: broadcast::Sender<Notification>,
}

impl StatusTracker {
    pub fn new() -> Self {
        let (notifier, _) = broadcast::channel(NOTIFICATION_CHANNEL_CAPACITY);
        Self {
            status: Mutex::new(ExtensionStatus::default()),
            notifier,
        }
    }

    pub fn snapshot(&self) -> ExtensionStatus {
        self.status.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Subscribes a UI surface to notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    /// Sends `notification` to every current subscriber.
    pub fn publish(&self, notification: Notification) {
        if self.notifier.send(notification).is_err() {
            log::trace!("No UI surface listening; notification dropped");
        }
    }

    /// Applies `change` under the lock and broadcasts the new snapshot if
    /// anything changed. The broadcast happens while the lock is held so
    /// subscribers observe updates in mutation order.
    fn update(&self, change: impl FnOnce(&mut ExtensionStatus)) {
        let mut status = self.status.lock().unwrap_or_else(|e| e.into_inner());
        let before = status.clone();
        change(&mut status);
        if *status != before {
            self.publish(Notification::StatusUpdate {
                status: status.clone(),
            });
        }
    }

    pub fn set_connection(&self, connection: ConnectionStatus) {
        self.update(|s| s.connection_status = connection);
    }

    pub fn set_authenticated(&self, authenticated: bool) {
        self.update(|s| s.is_authenticated = authenticated);
    }

    pub fn set_offline_queue_size(&self, size: usize) {
        let size = u32::try_from(size).unwrap_or(u32::MAX);
        self.update(|s| s.offline_queue_size = size);
    }

    /// Counts one in-flight analysis until the returned guard is dropped.
    pub fn begin_analysis(&self) -> PendingAnalysis<'_> {
        self.update(|s| s.pending_analyses = s.pending_analyses.saturating_add(1));
        PendingAnalysis { tracker: self }
    }
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements `pendingAnalyses` on drop, on every exit path.
#[must_use = "the analysis is only counted while the guard is alive"]
pub struct PendingAnalysis<'a> {
    tracker: &'a StatusTracker,
}

impl Drop for PendingAnalysis<'_> {
    fn drop(&mut self) {
        self.tracker
            .update(|s| s.pending_analyses = s.pending_analyses.saturating_sub(1));
    }
}
