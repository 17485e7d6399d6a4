//! One-shot waiters for in-flight signal collections.
//!
//! At most one waiter exists per tab. Each registration gets a token so a
//! timed-out request only removes its own waiter, never a newer one
//! registered for the same tab.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::oneshot;

use crate::models::{SignalBundle, TabId};

struct Waiter {
    token: u64,
    tx: oneshot::Sender<SignalBundle>,
}

#[derive(Default)]
pub struct PendingCollections {
    waiters: Mutex<HashMap<TabId, Waiter>>,
    next_token: AtomicU64,
}

impl PendingCollections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a waiter for `tab_id`, superseding any existing one. The
    /// superseded receiver observes a closed channel.
    pub fn register(&self, tab_id: TabId) -> (u64, oneshot::Receiver<SignalBundle>) {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        let previous = self
            .waiters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(tab_id, Waiter { token, tx });
        if previous.is_some() {
            log::debug!("Collection for tab {} superseded by a newer request", tab_id);
        }
        (token, rx)
    }

    /// Delivers `bundle` to the tab's waiter, removing it. Returns `false`
    /// when no waiter exists (late or duplicate delivery).
    pub fn resolve(&self, tab_id: TabId, bundle: SignalBundle) -> bool {
        let waiter = self
            .waiters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&tab_id);
        match waiter {
            // The receiver may have been dropped after its timeout fired but
            // before it removed the waiter; the bundle is then discarded.
            Some(waiter) => waiter.tx.send(bundle).is_ok(),
            None => false,
        }
    }

    /// Removes the tab's waiter if it is still the one identified by `token`.
    pub fn cancel(&self, tab_id: TabId, token: u64) -> bool {
        let mut waiters = self.waiters.lock().unwrap_or_else(|e| e.into_inner());
        match waiters.get(&tab_id) {
            Some(waiter) if waiter.token == token => {
                waiters.remove(&tab_id);
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self, tab_id: TabId) -> bool {
        self.waiters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&tab_id)
    }

    pub fn len(&self) -> usize {
        self.waiters.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
