use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
seeds = [
    "http://example.com/",
    "https://example.org/",
]

[politeness]
delay-factor = 3.0
min-delay-ms = 1000
max-delay-ms = 15000
max-retries = 5
retry-delay-seconds = 300
host-valence = 2
preference-embed-hops = 1

[frontier]
one-shot = true

[storage]
database-path = "./frontier.db"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.politeness.delay_factor, 3.0);
        assert_eq!(config.politeness.max_retries, 5);
        assert_eq!(config.politeness.host_valence, 2);
        assert!(config.frontier.one_shot);
        assert_eq!(config.storage.database_path, "./frontier.db");
        assert_eq!(config.seeds.len(), 2);
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config_content = r#"
[storage]
database-path = "./frontier.db"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.politeness.delay_factor, 5.0);
        assert_eq!(config.politeness.min_delay_ms, 2_000);
        assert_eq!(config.politeness.max_delay_ms, 30_000);
        assert_eq!(config.politeness.max_retries, 30);
        assert_eq!(config.politeness.retry_delay_seconds, 900);
        assert_eq!(config.politeness.host_valence, 1);
        assert_eq!(config.politeness.preference_embed_hops, 1);
        assert!(!config.frontier.one_shot);
        assert!(config.seeds.is_empty());
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[politeness]
host-valence = 0

[storage]
database-path = "./frontier.db"
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
