//! The collector-side runtime.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::collector::{collect_signals, PageSnapshot};
use crate::coordinator::Coordinator;
use crate::models::{SignalBundle, TabId};
use crate::protocol::{CollectorMessage, Message};
use crate::utils::Clock;

/// Holds the page open in each tab and answers `COLLECT_SIGNALS`.
///
/// A tab with no page is unreachable: the request gets no reply and the
/// Coordinator's bounded wait falls back on its own.
pub struct PageHost {
    clock: Arc<dyn Clock>,
    pages: Mutex<HashMap<TabId, PageSnapshot>>,
    last_timestamp: Mutex<Option<DateTime<Utc>>>,
}

impl PageHost {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            pages: Mutex::new(HashMap::new()),
            last_timestamp: Mutex::new(None),
        }
    }

    /// Loads `page` into `tab_id`, returning the page it replaced.
    pub fn open(&self, tab_id: TabId, page: PageSnapshot) -> Option<PageSnapshot> {
        log::debug!("Tab {} opened {}", tab_id, page.url);
        self.pages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(tab_id, page)
    }

    pub fn close(&self, tab_id: TabId) -> bool {
        self.pages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&tab_id)
            .is_some()
    }

    pub fn is_open(&self, tab_id: TabId) -> bool {
        self.pages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&tab_id)
    }

    /// Runs the collectors over the page in `tab_id`.
    pub fn collect(&self, tab_id: TabId) -> Option<SignalBundle> {
        let page = self
            .pages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&tab_id)
            .cloned()?;
        Some(collect_signals(&page, self.next_timestamp()))
    }

    /// Strictly increasing per host, even if the clock stalls or steps back.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let mut last = self.last_timestamp.lock().unwrap_or_else(|e| e.into_inner());
        let now = self.clock.now();
        let next = match *last {
            Some(previous) if now <= previous => previous + Duration::milliseconds(1),
            _ => now,
        };
        *last = Some(next);
        next
    }

    /// Serves collection requests until `cancel` fires or the Coordinator
    /// drops its sender.
    pub fn spawn(
        self: Arc<Self>,
        coordinator: Coordinator,
        mut requests: mpsc::Receiver<CollectorMessage>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        log::debug!("Page host stopping");
                        break;
                    }
                    request = requests.recv() => {
                        let Some(CollectorMessage::CollectSignals { tab_id }) = request else {
                            break;
                        };
                        match self.collect(tab_id) {
                            Some(signals) => {
                                coordinator
                                    .handle(Message::SignalsCollected { tab_id, signals })
                                    .await;
                            }
                            None => log::debug!("No page open in tab {}; not answering", tab_id),
                        }
                    }
                }
            }
        })
    }
}
