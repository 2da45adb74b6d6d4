//! nexcess-cli - command layer for the Nexcess cloud hosting console
//!
//! The crate is organized in three modules:
//!
//! - **`cli`** - Declarative commands, input validation, choice resolution,
//!   completion polling and summary rendering
//! - **`config`** - Configuration and environment loading
//! - **`observability`** - tracing setup and the markdown command log
//!
//! The remote API client is not part of this crate; hosts plug one in by
//! implementing `cli::ApiClient`.
//!
//! # Example
//!
//! ```ignore
//! use nexcess_cli::cli::Console;
//! use nexcess_cli::config::{ConfigurationLoader, EnvironmentLoader};
//!
//! let env = EnvironmentLoader::new(None);
//! let loader = ConfigurationLoader::new(None)?;
//! let mut console = Console::from_loader(&loader, &env, my_api_client)?;
//! console.register_defaults()?;
//! std::process::exit(console.run() as i32);
//! ```

#![warn(missing_docs)]

/// Console commands and their building blocks
pub mod cli;

/// Configuration management
pub mod config;

/// Logging and the command log
pub mod observability;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cli::{
        ApiClient, CliError, CliResult, Console, Endpoint, EndpointName, Resource, Translator,
    };
    pub use crate::config::{Configuration, ConfigurationLoader, EnvironmentLoader};
    pub use crate::observability::{init_tracing, CommandLog};
}
