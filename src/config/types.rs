use serde::Deserialize;

/// Main configuration structure for seine
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub politeness: PolitenessConfig,
    #[serde(default)]
    pub frontier: FrontierConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub seeds: Vec<String>,
}

/// Politeness and retry behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PolitenessConfig {
    /// Snooze a host for this multiple of the observed fetch duration
    #[serde(rename = "delay-factor", default = "default_delay_factor")]
    pub delay_factor: f64,

    /// Floor for the per-host snooze after a fetch (milliseconds)
    #[serde(rename = "min-delay-ms", default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Ceiling for the per-host snooze after a fetch (milliseconds)
    #[serde(rename = "max-delay-ms", default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Maximum fetch attempts per URI before a retryable error becomes a
    /// terminal failure
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Wait between retries of transient network failures (seconds)
    #[serde(rename = "retry-delay-seconds", default = "default_retry_delay_seconds")]
    pub retry_delay_seconds: u64,

    /// Number of simultaneous fetches tolerated per host
    #[serde(rename = "host-valence", default = "default_host_valence")]
    pub host_valence: u32,

    /// Embedded resources within this many hops of a navigational link are
    /// scheduled ahead of ordinary links
    #[serde(rename = "preference-embed-hops", default = "default_preference_embed_hops")]
    pub preference_embed_hops: u32,
}

/// Frontier behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FrontierConfig {
    /// When true, successfully fetched URIs are finished for good instead
    /// of being requeued for revisit
    #[serde(rename = "one-shot", default)]
    pub one_shot: bool,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_delay_factor() -> f64 {
    5.0
}

fn default_min_delay_ms() -> u64 {
    2_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    30
}

fn default_retry_delay_seconds() -> u64 {
    900
}

fn default_host_valence() -> u32 {
    1
}

fn default_preference_embed_hops() -> u32 {
    1
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            delay_factor: default_delay_factor(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_retries: default_max_retries(),
            retry_delay_seconds: default_retry_delay_seconds(),
            host_valence: default_host_valence(),
            preference_embed_hops: default_preference_embed_hops(),
        }
    }
}

impl Default for FrontierConfig {
    fn default() -> Self {
        Self { one_shot: false }
    }
}

impl PolitenessConfig {
    /// The retry delay in milliseconds
    pub fn retry_delay_ms(&self) -> i64 {
        self.retry_delay_seconds as i64 * 1_000
    }
}
