//! Session-scoped results, discarded on restart.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{AnalysisResult, TabId};

/// Latest result per tab.
#[derive(Default)]
pub struct SessionResults {
    results: Mutex<HashMap<TabId, AnalysisResult>>,
}

impl SessionResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tab_id: TabId) -> Option<AnalysisResult> {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&tab_id)
            .cloned()
    }

    pub fn set(&self, tab_id: TabId, result: AnalysisResult) {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(tab_id, result);
    }

    /// Replaces every tab's copy of `result` (matched by id).
    pub fn update_result(&self, result: &AnalysisResult) -> usize {
        let mut results = self.results.lock().unwrap_or_else(|e| e.into_inner());
        let mut updated = 0;
        for stored in results.values_mut().filter(|r| r.id == result.id) {
            *stored = result.clone();
            updated += 1;
        }
        updated
    }

    pub fn remove(&self, tab_id: TabId) -> Option<AnalysisResult> {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&tab_id)
    }
}
