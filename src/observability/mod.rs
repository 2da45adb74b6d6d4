//! Observability utilities for the console.
//!
//! Diagnostics go through `tracing` to stderr; `CommandLog` keeps an
//! optional markdown record of what was run.
//!
//! # Example
//!
//! ```no_run
//! use nexcess_cli::observability::{init_tracing, CommandLog};
//! use std::path::Path;
//!
//! init_tracing("info").unwrap();
//!
//! let log = CommandLog::new(Path::new("/tmp/nexcess-cli.md")).unwrap();
//! log.log_invocation("cloud-account:list", &[]).unwrap();
//! log.log_outcome("cloud-account:list", Ok(0)).unwrap();
//! ```

pub mod logger;
pub mod subscriber;

// Re-export main types for convenience
pub use logger::CommandLog;
pub use subscriber::init_tracing;
