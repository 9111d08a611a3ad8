//! Seine: a polite per-host crawl frontier
//!
//! This crate implements the scheduling core of a web crawl: it keeps one
//! queue per host, enforces per-host politeness, snoozes hosts in
//! proportion to how slowly they respond, retries transient failures, and
//! persists its state so an interrupted crawl resumes where it stopped.

pub mod config;
pub mod frontier;
pub mod politeness;
pub mod queue;
pub mod seeds;
pub mod storage;
pub mod uri;

use thiserror::Error;

/// Main error type for frontier operations
#[derive(Debug, Error)]
pub enum FrontierError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No class key can be derived for URI: {uri}")]
    Unschedulable { uri: String },

    #[error("Frontier has been terminated")]
    Terminated,

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Seed yields no class key: {0}")]
    InvalidSeed(String),
}

/// Result type alias for frontier operations
pub type Result<T> = std::result::Result<T, FrontierError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use frontier::{Disposition, FetchOutcome, FetchStatus, Frontier};
pub use uri::{class_key_for, CrawlUri, SchedulingDirective, ViaContext};
