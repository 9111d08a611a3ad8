//! Storage module for persisting frontier state
//!
//! This module handles all database operations for the frontier, including:
//! - SQLite database initialization and schema management
//! - Host queue and URI record persistence
//! - Crash recovery of in-flight records
//! - Retired-URI history for duplicate suppression across restarts

mod schema;
mod sqlite;
mod traits;

pub use schema::initialize_schema;
pub use sqlite::SqliteStore;
pub use traits::{FrontierStore, StorageError, StorageResult};

use crate::uri::CrawlUri;
use std::path::Path;

/// Initializes or opens a frontier database
pub fn open_store(path: &Path) -> StorageResult<SqliteStore> {
    SqliteStore::new(path)
}

/// A persisted URI record together with its lifecycle flags
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub record: CrawlUri,

    /// The record had been issued and not yet finished when it was last
    /// written; on reload it must be requeued
    pub in_flight: bool,

    /// The record reached a remembered terminal state; on reload only its
    /// URI re-enters the duplicate-suppression set
    pub retired: bool,
}
