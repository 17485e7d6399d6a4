//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources:
//! - Logger
//! - HTTP client for live page loads
//! - Document store
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;

use std::path::Path;

use crate::error_handling::InitializationError;
use crate::storage::{init_store_pool, DocumentStore};

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;

/// Opens the document store at `db_path`, or an in-memory one for `None`.
///
/// # Errors
///
/// Returns `InitializationError::StoreError` if the database cannot be
/// created or its schema cannot be applied.
pub async fn init_store(db_path: Option<&Path>) -> Result<DocumentStore, InitializationError> {
    let pool = init_store_pool(db_path).await?;
    if let Some(path) = db_path {
        log::info!("Document store: {}", path.display());
    } else {
        log::debug!("Document store: in memory");
    }
    Ok(DocumentStore::new(pool))
}
