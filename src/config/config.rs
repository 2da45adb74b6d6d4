//! TOML configuration parsing and management.

use crate::cli::declarative::definition::Company;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the platform config dir holding `config.toml`
pub const CONFIG_DIR_NAME: &str = "nexcess-cli";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Configuration {
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub translations: TranslationsConfig,
}

/// Console identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    pub name: String,
    pub version: String,
    /// Brand whose commands get registered
    #[serde(default)]
    pub company: Company,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            name: "nexcess-cli".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            company: Company::default(),
        }
    }
}

/// Completion polling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Milliseconds between polls; raised to the poller minimum when lower
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// `0` waits until the operation finishes
    #[serde(default)]
    pub timeout_secs: u64,
}

fn default_interval_ms() -> u64 {
    2000
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            timeout_secs: 0,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Markdown audit log of command invocations
    pub command_log: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            command_log: None,
        }
    }
}

/// Phrase catalog location
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TranslationsConfig {
    pub path: Option<String>,
}

/// Loads and manages TOML configuration.
#[derive(Debug)]
pub struct ConfigurationLoader {
    pub config_path: PathBuf,
    pub config: Configuration,
}

impl ConfigurationLoader {
    /// Initialize configuration loader.
    ///
    /// # Arguments
    /// * `config_path` - Path to TOML config file. If None, uses
    ///   `<config dir>/nexcess-cli/config.toml`, or defaults when that is missing.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config_path = match config_path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path(),
        };

        let config = if config_path.exists() {
            Self::load_config(&config_path)?
        } else {
            Configuration::default()
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Create a configuration loader from a pre-parsed Configuration.
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config_path: Self::default_config_path(),
            config,
        }
    }

    /// `<config dir>/nexcess-cli/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME)
            .join("config.toml")
    }

    /// Load configuration from TOML file.
    fn load_config(path: &Path) -> Result<Configuration> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }

    /// Command log path with `~` expanded
    pub fn command_log_path(&self) -> Option<PathBuf> {
        self.config
            .logging
            .command_log
            .as_deref()
            .map(expand_path)
    }

    /// Translation catalog path with `~` expanded
    pub fn translations_path(&self) -> Option<PathBuf> {
        self.config.translations.path.as_deref().map(expand_path)
    }

    /// Get configuration value by dot-notation key.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match key {
            "console.name" => Some(self.config.console.name.clone()),
            "console.version" => Some(self.config.console.version.clone()),
            "console.company" => Some(self.config.console.company.to_string()),
            "logging.level" => Some(self.config.logging.level.clone()),
            "logging.command_log" => self.config.logging.command_log.clone(),
            "translations.path" => self.config.translations.path.clone(),
            _ => None,
        }
    }

    /// Get numeric configuration value.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match key {
            "polling.interval_ms" => Some(self.config.polling.interval_ms),
            "polling.timeout_secs" => Some(self.config.polling.timeout_secs),
            _ => None,
        }
    }
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}
