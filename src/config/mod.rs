//! Configuration module for seine
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files.
//!
//! # Example
//!
//! ```no_run
//! use seine::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Delay factor: {}", config.politeness.delay_factor);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FrontierConfig, PolitenessConfig, StorageConfig};

// Re-export parser functions
pub use parser::load_config;
