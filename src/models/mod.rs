//! Data model shared by every context.
//!
//! All types serialize with camelCase field names, which is the shape
//! exchanged over the message protocol and stored in the document store.

mod analysis;
mod explanation;
mod signals;
mod status;

pub use analysis::{AnalysisResult, CachedAnalysis, OfflineQueueItem, SignalScores, Verdict};
pub use explanation::{ExplanationState, ExplanationStatus};
pub use signals::{
    CookieSignals, FingerprintRisk, FingerprintSignals, FingerprintTechnique, HeaderSignals,
    SignalBundle, SslSignals, TrackerSignals,
};
pub use status::{ConnectionStatus, ExtensionStatus};

/// Browser tab identifier.
pub type TabId = u32;
