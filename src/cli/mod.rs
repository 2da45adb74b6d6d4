//! Console command layer
//!
//! Commands are declared as static `CommandDefinition`s, turned into clap
//! commands by the declarative builder and run by the `CommandExecutor`.
//!
//! # Architecture
//!
//! Commands interact with the host application through adapter traits:
//! - `ApiClient` - Endpoints of the remote hosting API
//! - `Translator` - Phrases for help text, notices and summaries
//! - `ConsoleOutput` - Where text and JSON results go
//! - `Prompter` - Interactive menus and questions
//! - `Clock` - Time source for completion polling
//!
//! # Example
//!
//! ```rust,ignore
//! use nexcess_cli::cli::Console;
//! use nexcess_cli::config::Configuration;
//!
//! let mut console = Console::new(Configuration::default(), MyApiClient::connect()?);
//! console.register_defaults()?;
//! std::process::exit(console.run() as i32);
//! ```

pub mod adapters;
pub mod choice;
pub mod commands;
pub mod console;
pub mod declarative;
pub mod error;
pub mod executor;
pub mod input;
pub mod poller;
pub mod summary;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

// Re-exports for convenience
pub use adapters::{
    ApiClient, AsyncResource, Backup, CatalogTranslator, Clock, CloudAccountEndpoint,
    ConsoleOutput, Endpoint, EndpointName, Prompter, RemoteState, Resource, Translator,
};
pub use choice::{ChoiceDomain, ChoiceResolver, ChoiceSet};
pub use console::Console;
pub use error::{ChoiceError, CliError, CliResult};
pub use executor::{CommandExecutor, WaitPolicy, EXIT_SUCCESS};
pub use poller::{when_complete, PendingOperation, PollSettings, Timeout};
pub use summary::SummaryFormatter;
pub use utils::display_error_with_suggestions;
