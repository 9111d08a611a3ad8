//! Storage traits and error types
//!
//! This module defines the trait interface for frontier storage backends
//! and associated error types.

use crate::storage::StoredEntry;
use crate::uri::CrawlUri;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for frontier storage backend implementations
///
/// The frontier writes through this trait at every scheduling transition so
/// that a restart can reconstruct its queues. Records are keyed by URI.
pub trait FrontierStore {
    // ===== Host Management =====

    /// Inserts a host queue row, or leaves an existing one untouched
    fn put_host(&mut self, host_key: &str, valence: u32) -> StorageResult<()>;

    /// Lists all host queues as (host key, valence)
    fn hosts(&self) -> StorageResult<Vec<(String, u32)>>;

    /// Deletes a host queue row and all its entries
    fn delete_host(&mut self, host_key: &str) -> StorageResult<()>;

    // ===== Entry Management =====

    /// Inserts or replaces the persisted state of a URI record
    fn put_entry(&mut self, record: &CrawlUri) -> StorageResult<()>;

    /// Flags whether a record is currently issued for processing
    fn set_in_flight(&mut self, uri: &str, in_flight: bool) -> StorageResult<()>;

    /// Marks a record as retired: terminal, with its URI remembered for
    /// duplicate suppression
    fn retire_entry(&mut self, record: &CrawlUri) -> StorageResult<()>;

    /// Deletes a record entirely (the forgotten terminal state)
    fn delete_entry(&mut self, uri: &str) -> StorageResult<()>;

    /// Loads every persisted record in insertion order
    fn entries(&self) -> StorageResult<Vec<StoredEntry>>;
}
