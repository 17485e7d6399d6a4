//! page_trust library: trust scoring for web pages from client-observable signals
//!
//! A page context collects cookies, tracker scripts, fingerprinting techniques,
//! meta-tag header surrogates and the URL's TLS status into a signal
//! bundle. The long-lived [`Coordinator`] scores bundles through an
//! [`AnalysisBackend`], caches results per domain with a TTL, queues
//! bundles while the backend is unreachable, and answers UI queries over a
//! JSON message protocol.
//!
//! # Example
//!
//! ```no_run
//! use page_trust::{Config, PageSnapshot, Runtime};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = Runtime::start(&Config::default()).await?;
//! let page = PageSnapshot::new(
//!     "https://example.com/",
//!     "<html><head><script src=\"https://www.google-analytics.com/analytics.js\"></script></head></html>",
//!     "theme=dark",
//! );
//! let (result, from_cache) = runtime.analyze_snapshot(page).await?;
//! println!("{}: {} ({}) cached={}", result.domain, result.trust_score, result.verdict, from_cache);
//! runtime.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

mod app;
pub mod backend;
pub mod collector;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod error_handling;
pub mod explanation;
pub mod initialization;
pub mod models;
pub mod page;
pub mod protocol;
mod run;
pub mod scoring;
pub mod status;
pub mod storage;
pub mod utils;

// Re-export public API
pub use app::{print_pipeline_statistics, print_run_summary, validate_and_normalize_url};
pub use backend::AnalysisBackend;
pub use collector::{collect_signals, PageSnapshot};
pub use config::{BackendKind, Config, LogFormat, LogLevel, Settings};
pub use coordinator::Coordinator;
pub use error_handling::{AnalysisError, PipelineStats};
pub use models::{AnalysisResult, SignalBundle, Verdict};
pub use protocol::{Message, Notification, Response};
pub use run::{build_backend, PageOutcome, RunReport, Runtime};
