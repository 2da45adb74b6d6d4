//! Configuration management for the console.
//!
//! This module provides configuration loading through TOML files and
//! environment variable overrides via `.env` files.
//!
//! # Example
//!
//! ```no_run
//! use nexcess_cli::config::{ConfigurationLoader, EnvironmentLoader};
//! use std::path::Path;
//!
//! let env = EnvironmentLoader::new(Some(Path::new(".env")));
//! let loader = ConfigurationLoader::new(None).unwrap();
//!
//! println!("Poll interval: {}ms", loader.config.polling.interval_ms);
//! println!("Company override: {:?}", env.company());
//! ```

pub mod config;
pub mod environment;

// Re-export main types for convenience
pub use self::config::{
    Configuration, ConfigurationLoader, ConsoleConfig, LoggingConfig, PollingConfig,
    TranslationsConfig,
};
pub use self::environment::EnvironmentLoader;
