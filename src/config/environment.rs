//! Environment variable loading and management.

use std::env;
use std::path::Path;

/// Overrides the configured company
pub const COMPANY_VAR: &str = "NEXCESS_COMPANY";

/// Overrides the configured log level
pub const LOG_VAR: &str = "NEXCESS_LOG";

/// Loads environment variables from .env file and system environment.
#[derive(Debug, Clone)]
pub struct EnvironmentLoader {
    env_file: Option<String>,
}

impl EnvironmentLoader {
    /// Initialize the environment loader.
    ///
    /// # Arguments
    /// * `env_file` - Path to .env file. Nothing is loaded unless a path is given.
    pub fn new(env_file: Option<&Path>) -> Self {
        if let Some(path) = env_file {
            if path.exists() {
                if let Err(e) = dotenv::from_path(path) {
                    tracing::warn!(path = %path.display(), error = %e, "failed to load .env file");
                }
            }
        }

        Self {
            env_file: env_file.map(|p| p.to_string_lossy().to_string()),
        }
    }

    /// The .env file this loader was created with
    pub fn env_file(&self) -> Option<&str> {
        self.env_file.as_deref()
    }

    /// Company override (`nexcess`, `thermo`)
    pub fn company(&self) -> Option<String> {
        non_empty(COMPANY_VAR)
    }

    /// Log level override
    pub fn log_level(&self) -> Option<String> {
        non_empty(LOG_VAR)
    }
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

impl Default for EnvironmentLoader {
    fn default() -> Self {
        Self::new(None)
    }
}
