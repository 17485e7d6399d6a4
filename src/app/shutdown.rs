//! Graceful shutdown handling.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::coordinator::Coordinator;

/// Stops the page host, then lets the Coordinator finish background
/// explanations, disconnect its backend and close the store.
pub async fn shutdown_gracefully(
    coordinator: &Coordinator,
    cancel: CancellationToken,
    host_task: Option<JoinHandle<()>>,
) {
    cancel.cancel();
    if let Some(host_task) = host_task {
        if let Err(e) = host_task.await {
            log::warn!("Page host task ended abnormally: {}", e);
        }
    }
    coordinator.shutdown().await;
}
