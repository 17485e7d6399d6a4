//! Database connection pool management.
//!
//! This module initializes the SQLite pool behind the document store:
//! - On-disk databases are created if missing and run in WAL mode
//! - In-memory databases pin a single connection so data survives
//! - The `documents` table is created on first open

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;

use log::{error, info};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::error_handling::StorageError;

const CREATE_DOCUMENTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS documents (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
)";

/// Opens the durable store at `db_path`, or an in-memory store for `None`.
pub async fn init_store_pool(db_path: Option<&Path>) -> Result<SqlitePool, StorageError> {
    let pool = match db_path {
        Some(path) => open_file_pool(path).await?,
        None => open_memory_pool().await?,
    };
    ensure_schema(&pool).await?;
    Ok(pool)
}

async fn open_file_pool(db_path: &Path) -> Result<SqlitePool, StorageError> {
    let db_path_str = db_path.to_string_lossy().to_string();
    match OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(&db_path_str)
    {
        Ok(_) => info!("Database file created at {}", db_path_str),
        Err(ref e) if e.kind() == ErrorKind::AlreadyExists => {
            info!("Using existing database at {}", db_path_str)
        }
        Err(e) => {
            error!("Failed to create database file: {e}");
            return Err(StorageError::FileCreation(e.to_string()));
        }
    }

    let pool = SqlitePool::connect(&format!("sqlite:{}", db_path_str))
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {e}");
            StorageError::Sql(e)
        })?;

    // Enable WAL mode
    sqlx::query("PRAGMA journal_mode=WAL")
        .execute(&pool)
        .await
        .map_err(|e| {
            error!("Failed to set WAL mode: {e}");
            StorageError::Sql(e)
        })?;

    Ok(pool)
}

/// Every new connection to `sqlite::memory:` is a fresh database, so the
/// pool keeps exactly one connection alive for its whole lifetime.
async fn open_memory_pool() -> Result<SqlitePool, StorageError> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .map_err(|e| {
            error!("Failed to open in-memory database: {e}");
            StorageError::Sql(e)
        })
}

async fn ensure_schema(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::query(CREATE_DOCUMENTS_TABLE)
        .execute(pool)
        .await
        .map_err(|e| {
            error!("Failed to create documents table: {e}");
            StorageError::Sql(e)
        })?;
    Ok(())
}
