use crate::moderation::controller::ControllerSettings;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub moderation: ModerationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Http,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_groups_collection")]
    pub groups_collection: String,
    #[serde(default = "default_users_collection")]
    pub users_collection: String,
    /// Seconds allowed to establish a connection; requests themselves never time out
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    /// JSON fixture for the memory backend
    pub seed_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ModerationConfig {
    #[serde(default)]
    pub conditional_ban_writes: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_console")]
    pub console: bool,
}

// Default value functions
fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_groups_collection() -> String {
    "groups".to_string()
}

fn default_users_collection() -> String {
    "users".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_console() -> bool {
    false
}

impl BackendConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("Server port must be greater than 0");
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        // Validate backend config
        if self.backend.kind == BackendKind::Http {
            if self.backend.endpoint.is_empty() {
                bail!("backend.endpoint must not be empty for the http backend");
            }

            if self.backend.api_key.is_empty() {
                bail!("backend.api_key must not be empty for the http backend");
            }
        }

        if self.backend.groups_collection.is_empty() || self.backend.users_collection.is_empty() {
            bail!("Collection names must not be empty");
        }

        if self.backend.groups_collection == self.backend.users_collection {
            bail!(
                "groups_collection and users_collection must differ (both are '{}')",
                self.backend.groups_collection
            );
        }

        if self.backend.connect_timeout == 0 {
            bail!("connect_timeout must be greater than 0");
        }

        if self.admin.api_key.is_empty() {
            bail!("admin.api_key must not be empty");
        }

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            groups_collection: self.backend.groups_collection.clone(),
            users_collection: self.backend.users_collection.clone(),
            conditional_ban_writes: self.moderation.conditional_ban_writes,
        }
    }
}
