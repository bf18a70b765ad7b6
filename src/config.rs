use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::{
    matcher::MatchStrategy,
    throttle::{DEFAULT_EXPERIENCED_COOLDOWN_DAYS, DEFAULT_STUDENT_COOLDOWN_DAYS},
    vocabulary::{default_domains, DomainEntry, Vocabulary},
};
use crate::reconciler::DEFAULT_WRITE_CONCURRENCY;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub appwrite: AppwriteSettings,
    pub collection: CollectionSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub vocabulary: VocabularySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
    pub timeout_secs: Option<u64>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    pub user_preferences: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default)]
    pub strategy: MatchStrategy,
    #[serde(default = "default_student_cooldown_days")]
    pub student_cooldown_days: i64,
    #[serde(default = "default_experienced_cooldown_days")]
    pub experienced_cooldown_days: i64,
    #[serde(default = "default_write_concurrency")]
    pub write_concurrency: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            strategy: MatchStrategy::default(),
            student_cooldown_days: default_student_cooldown_days(),
            experienced_cooldown_days: default_experienced_cooldown_days(),
            write_concurrency: default_write_concurrency(),
        }
    }
}

fn default_student_cooldown_days() -> i64 { DEFAULT_STUDENT_COOLDOWN_DAYS }
fn default_experienced_cooldown_days() -> i64 { DEFAULT_EXPERIENCED_COOLDOWN_DAYS }
fn default_write_concurrency() -> usize { DEFAULT_WRITE_CONCURRENCY }

#[derive(Debug, Clone, Deserialize)]
pub struct VocabularySettings {
    #[serde(default = "default_domains")]
    pub domains: Vec<DomainEntry>,
    #[serde(default)]
    pub leadership_levels: Vec<String>,
}

impl Default for VocabularySettings {
    fn default() -> Self {
        Self {
            domains: default_domains(),
            leadership_levels: Vec::new(),
        }
    }
}

impl VocabularySettings {
    pub fn build(&self) -> Vocabulary {
        Vocabulary::new(self.domains.iter().cloned(), self.leadership_levels.iter().cloned())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with JOBMATCH_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., JOBMATCH__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("JOBMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = apply_database_url(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("JOBMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// `DATABASE_URL` wins over the file value so the usual sqlx convention works
fn apply_database_url(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => Config::builder()
            .add_source(settings)
            .set_override("database.url", url)?
            .build(),
        Err(_) => Ok(settings),
    }
}
