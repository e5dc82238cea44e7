use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::version::registries::npm::{DEFAULT_REGISTRY_URL, DEFAULT_WEBSITE_URL};

// =============================================================================
// Time-related constants
// =============================================================================

/// Default interval between scheduled ingestion runs in milliseconds (1 minute)
pub const DEFAULT_SCHEDULE_INTERVAL_MS: u64 = 60 * 1000;

/// Upper bound for a single ingestion run in milliseconds (5 minutes)
pub const DEFAULT_RUN_TIMEOUT_MS: u64 = 5 * 60 * 1000;

/// Timeout for fetch operations in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: i64 = 30_000;

// =============================================================================
// Queue constants
// =============================================================================

/// Capacity of the in-process package queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Maximum number of messages handed to the consumer at once
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Default address of the HTTP query endpoint
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8787";

/// Environment variable holding the notification webhook URL
pub const SLACK_WEBHOOK_URL_ENV: &str = "SLACK_WEBHOOK_URL";

/// Environment variable overriding the database path
pub const DB_PATH_ENV: &str = "NPM_WATCH_DB_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// How the scheduled run resolves each feed item's version
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BulkStrategy {
    /// Highest version among the package's dist-tags
    #[default]
    DistTags,
    /// Version published closest to now, scraped from the versions page
    VersionsPage,
}

/// Application configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub registry: RegistryConfig,
    pub schedule: ScheduleConfig,
    pub queue: QueueConfig,
    pub notification: NotificationConfig,
    pub bulk_strategy: BulkStrategy,
    /// Database file; defaults to [`db_path`]
    pub db_path: Option<PathBuf>,
}

/// Upstream endpoints
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryConfig {
    pub registry_url: String,
    pub website_url: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            website_url: DEFAULT_WEBSITE_URL.to_string(),
        }
    }
}

/// Scheduled run configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleConfig {
    /// Interval between runs in milliseconds
    pub interval: u64,
    /// Timeout of a single run in milliseconds
    pub run_timeout: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SCHEDULE_INTERVAL_MS,
            run_timeout: DEFAULT_RUN_TIMEOUT_MS,
        }
    }
}

/// Package queue configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct QueueConfig {
    pub capacity: usize,
    pub batch_size: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_QUEUE_CAPACITY,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Notification configuration; no webhook disables notifications
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationConfig {
    pub webhook_url: Option<String>,
}

impl Config {
    /// Load configuration from an optional JSON file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        Ok(config.with_env(
            std::env::var(SLACK_WEBHOOK_URL_ENV).ok(),
            std::env::var(DB_PATH_ENV).ok(),
        ))
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn with_env(mut self, webhook_url: Option<String>, db_path: Option<String>) -> Self {
        if let Some(url) = webhook_url.filter(|url| !url.trim().is_empty()) {
            self.notification.webhook_url = Some(url);
        }
        if let Some(path) = db_path.filter(|path| !path.trim().is_empty()) {
            self.db_path = Some(PathBuf::from(path));
        }
        self
    }

    /// Database path, falling back to the data directory
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(db_path)
    }
}

/// Returns the path to the data directory for npm-watch.
/// Uses $XDG_DATA_HOME/npm-watch if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/npm-watch,
/// or ./npm-watch if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the database file.
pub fn db_path() -> PathBuf {
    data_dir().join("packages.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("npm-watch.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("npm-watch")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<Config>(json!({
            "schedule": {
                "interval": 1000
            }
        }))
        .unwrap();

        assert_eq!(result.schedule.interval, 1000);
        assert_eq!(result.schedule.run_timeout, DEFAULT_RUN_TIMEOUT_MS);
        assert_eq!(result.registry, RegistryConfig::default());
        assert_eq!(result.bulk_strategy, BulkStrategy::DistTags);
    }

    #[test]
    fn config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<Config>(json!({
            "registry": {
                "registryUrl": "http://localhost:1",
                "websiteUrl": "http://localhost:2"
            },
            "schedule": { "interval": 5000, "runTimeout": 4000 },
            "queue": { "capacity": 8, "batchSize": 2 },
            "notification": { "webhookUrl": "http://hooks.local/x" },
            "bulkStrategy": "versionsPage",
            "dbPath": "/tmp/packages.db"
        }))
        .unwrap();

        assert_eq!(
            result,
            Config {
                registry: RegistryConfig {
                    registry_url: "http://localhost:1".to_string(),
                    website_url: "http://localhost:2".to_string(),
                },
                schedule: ScheduleConfig {
                    interval: 5000,
                    run_timeout: 4000,
                },
                queue: QueueConfig {
                    capacity: 8,
                    batch_size: 2,
                },
                notification: NotificationConfig {
                    webhook_url: Some("http://hooks.local/x".to_string()),
                },
                bulk_strategy: BulkStrategy::VersionsPage,
                db_path: Some(PathBuf::from("/tmp/packages.db")),
            }
        );
    }

    #[test]
    fn with_env_overrides_webhook_and_db_path() {
        let config = Config::default().with_env(
            Some("http://hooks.local/env".to_string()),
            Some("/data/env.db".to_string()),
        );

        assert_eq!(
            config.notification.webhook_url,
            Some("http://hooks.local/env".to_string())
        );
        assert_eq!(config.resolved_db_path(), PathBuf::from("/data/env.db"));
    }

    #[test]
    fn with_env_ignores_blank_values() {
        let config = Config::default().with_env(Some("  ".to_string()), Some(String::new()));

        assert_eq!(config.notification.webhook_url, None);
        assert_eq!(config.db_path, None);
    }

    #[test]
    #[serial]
    fn load_reads_file_and_applies_environment() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"queue": {{"batchSize": 3}}}}"#).unwrap();

        // SAFETY: serialized test; no other thread reads the environment concurrently
        unsafe {
            std::env::set_var(SLACK_WEBHOOK_URL_ENV, "http://hooks.local/loaded");
            std::env::remove_var(DB_PATH_ENV);
        }
        let config = Config::load(Some(file.path())).unwrap();
        unsafe {
            std::env::remove_var(SLACK_WEBHOOK_URL_ENV);
        }

        assert_eq!(config.queue.batch_size, 3);
        assert_eq!(
            config.notification.webhook_url,
            Some("http://hooks.local/loaded".to_string())
        );
    }

    #[test]
    #[serial]
    fn load_without_file_uses_defaults() {
        unsafe {
            std::env::remove_var(SLACK_WEBHOOK_URL_ENV);
            std::env::remove_var(DB_PATH_ENV);
        }

        assert_eq!(Config::load(None).unwrap(), Config::default());
    }

    #[test]
    #[serial]
    fn load_reports_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(matches!(
            Config::load(Some(file.path())),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn data_dir_with_env_uses_xdg_data_home_when_set() {
        let path = data_dir_with_env(
            Some("/tmp/test-data".to_string()),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-data/npm-watch"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_home_local_share() {
        let path = data_dir_with_env(None, Some(PathBuf::from("/home/user")));

        assert_eq!(path, PathBuf::from("/home/user/.local/share/npm-watch"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = data_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./npm-watch"));
    }
}
