use crate::config::types::{Config, PolitenessConfig, StorageConfig};
use crate::uri::class_key_for;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_politeness_config(&config.politeness)?;
    validate_storage_config(&config.storage)?;
    validate_seeds(&config.seeds)?;
    Ok(())
}

/// Validates politeness configuration
fn validate_politeness_config(config: &PolitenessConfig) -> Result<(), ConfigError> {
    if !config.delay_factor.is_finite() || config.delay_factor < 0.0 {
        return Err(ConfigError::Validation(format!(
            "delay_factor must be a finite non-negative number, got {}",
            config.delay_factor
        )));
    }

    if config.min_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "min_delay_ms ({}) must not exceed max_delay_ms ({})",
            config.min_delay_ms, config.max_delay_ms
        )));
    }

    if config.host_valence < 1 || config.host_valence > 100 {
        return Err(ConfigError::Validation(format!(
            "host_valence must be between 1 and 100, got {}",
            config.host_valence
        )));
    }

    if config.retry_delay_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "retry_delay_seconds must be >= 1, got {}",
            config.retry_delay_seconds
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates seed URIs: each must yield a class key so it can be assigned
/// to a host queue
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    for seed in seeds {
        if class_key_for(seed).is_none() {
            return Err(ConfigError::InvalidSeed(seed.clone()));
        }
    }
    Ok(())
}
