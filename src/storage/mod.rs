//! Persistence for the Coordinator.
//!
//! Durable state lives in a SQLite document store (`cachedResults`,
//! `offlineQueue`, `settings`); session state is an in-process map.
//! Read failures are logged and counted, then replaced by a safe default.
//! They never propagate to callers.

mod cache;
mod documents;
mod pool;
mod queue;
mod session;
mod settings;

pub use cache::ResultCache;
pub use documents::{DocumentStore, CACHED_RESULTS_KEY, OFFLINE_QUEUE_KEY, SETTINGS_KEY};
pub use pool::init_store_pool;
pub use queue::OfflineQueue;
pub use session::SessionResults;
pub use settings::{load_settings, save_settings};
