//! Per-tab analysis phase.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;

use crate::models::TabId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalysisPhase {
    #[default]
    Idle,
    Collecting,
    Scoring,
    Notified,
    Explaining,
    Done,
    Failed,
}

impl AnalysisPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisPhase::Idle => "idle",
            AnalysisPhase::Collecting => "collecting",
            AnalysisPhase::Scoring => "scoring",
            AnalysisPhase::Notified => "notified",
            AnalysisPhase::Explaining => "explaining",
            AnalysisPhase::Done => "done",
            AnalysisPhase::Failed => "failed",
        }
    }
}

#[derive(Default)]
pub struct PhaseTracker {
    phases: Mutex<HashMap<TabId, AnalysisPhase>>,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tab_id: TabId) -> AnalysisPhase {
        self.phases
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&tab_id)
            .copied()
            .unwrap_or_default()
    }

    pub fn enter(&self, tab_id: TabId, phase: AnalysisPhase) {
        let previous = self
            .phases
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(tab_id, phase)
            .unwrap_or_default();
        log::trace!("Tab {}: {} -> {}", tab_id, previous.as_str(), phase.as_str());
    }

    /// Moves to `to` only if the tab is still in `from`.
    pub fn advance_from(&self, tab_id: TabId, from: AnalysisPhase, to: AnalysisPhase) -> bool {
        let mut phases = self.phases.lock().unwrap_or_else(|e| e.into_inner());
        let current = phases.get(&tab_id).copied().unwrap_or_default();
        if current != from {
            return false;
        }
        phases.insert(tab_id, to);
        log::trace!("Tab {}: {} -> {}", tab_id, from.as_str(), to.as_str());
        true
    }

    /// Records a failed request; the tab then returns to `idle`.
    pub fn fail(&self, tab_id: TabId) {
        self.enter(tab_id, AnalysisPhase::Failed);
        self.enter(tab_id, AnalysisPhase::Idle);
    }
}
