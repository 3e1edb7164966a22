use rampart_cache::CacheClusterConfig;
use rampart_db::RouterConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Error types for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config build error: {0}")]
    Build(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl ConfigError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Read/write routing topology
    #[serde(default)]
    pub router: RouterConfig,
    /// Cache cluster nodes
    #[serde(default)]
    pub cache: CacheClusterConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.name.is_empty() {
            return Err(ConfigError::validation("service.name must not be empty"));
        }
        if self.service.monitor_interval_secs == 0 {
            return Err(ConfigError::validation(
                "service.monitor_interval_secs must be > 0",
            ));
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(ConfigError::validation(format!(
                "logging.level must be one of {valid_levels:?}"
            )));
        }
        self.router
            .validate()
            .map_err(|e| ConfigError::validation(format!("router config error: {e}")))?;
        self.cache
            .validate()
            .map_err(|e| ConfigError::validation(format!("cache config error: {e}")))?;
        Ok(())
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.service.monitor_interval_secs)
    }

    /// Renders the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Name reported in logs, e.g. "auth", "friends", "lobby"
    #[serde(default = "default_service_name")]
    pub name: String,
    /// Seconds between topology monitor passes
    #[serde(default = "default_monitor_interval_secs")]
    pub monitor_interval_secs: u64,
}

fn default_service_name() -> String {
    "rampart".into()
}

fn default_monitor_interval_secs() -> u64 {
    30
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            monitor_interval_secs: default_monitor_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::{AppConfig, ConfigError};
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Default configuration file name.
    pub const DEFAULT_CONFIG_FILE: &str = "rampart.toml";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, ConfigError> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                }
            }
            None => {
                // Try default root-level file
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., RAMPART__ROUTER__PROBE_TIMEOUT_MS=500
        builder = builder.add_source(
            Environment::with_prefix("RAMPART")
                .try_parsing(true)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("router.replicas"),
        );
        let merged: AppConfig = builder.build()?.try_deserialize()?;
        merged.validate()?;
        Ok(merged)
    }
}
