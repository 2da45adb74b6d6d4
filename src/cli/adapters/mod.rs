//! Adapter traits for CLI commands
//!
//! These traits define the narrow interfaces between the command layer and
//! its collaborators: the remote API, translations, terminal output,
//! interactive prompts and time. Implementing them lets a host application
//! run the commands without tight coupling.

pub mod api;
pub mod clock;
pub mod output;
pub mod prompt;
pub mod translation;

pub use api::{
    ApiClient, AsyncResource, Backup, CloudAccountEndpoint, Endpoint, EndpointName, ListFilter,
    RemoteState, Resource, ResourceCollection,
};
pub use clock::{Clock, SystemClock};
pub use output::{ConsoleOutput, TerminalOutput};
pub use prompt::{DialoguerPrompter, Prompter};
pub use translation::{CatalogTranslator, Translator};
