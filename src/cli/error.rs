//! Error types for CLI operations

use crate::cli::choice::ChoiceDomain;
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors raised while registering or executing a console command
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command declaration (duplicate names, several variadic arguments).
    /// Raised at registration time and never recoverable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A supplied value failed the filter declared for its input
    #[error("Invalid value {} for '{input}': {reason}", display_value(.value))]
    InvalidInput {
        input: String,
        value: Option<String>,
        reason: String,
    },

    /// A `--filter` token was not a single `key:value` pair
    #[error("Invalid list filter '{0}': expected exactly one ':' (key:value)")]
    InvalidFilter(String),

    /// Choice resolution failed for an input
    #[error(transparent)]
    Choice(#[from] ChoiceError),

    /// A bounded completion wait elapsed before the operation finished
    #[error("Timed out after {waited_secs}s waiting for {operation}; the operation may still be in progress")]
    OperationTimeout { operation: String, waited_secs: u64 },

    /// The remote endpoint reported a failure
    #[error("Remote operation failed: {0}")]
    RemoteOperation(String),

    /// The endpoint does not provide the requested action
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Command line could not be parsed; the message is clap's rendering
    #[error("{0}")]
    Usage(String),

    /// No registered command matched the invocation
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// Interactive prompt failed (closed terminal, interrupted)
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerdeError(String),
}

/// Reasons a choice input could not be resolved
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChoiceError {
    /// The candidate set for the input is empty
    #[error("No {domain} available to choose from for '{input}'")]
    NoChoices { input: String, domain: ChoiceDomain },

    /// A supplied value matched none of the candidates
    #[error("'{value}' is not a valid choice for '{input}'")]
    NoMatch { input: String, value: String },

    /// Several candidates and no way to ask
    #[error("'{input}' is required: {count} choices are available and interaction is disabled")]
    Ambiguous { input: String, count: usize },
}

impl ChoiceError {
    /// Name of the input whose resolution failed
    pub fn input(&self) -> &str {
        match self {
            ChoiceError::NoChoices { input, .. }
            | ChoiceError::NoMatch { input, .. }
            | ChoiceError::Ambiguous { input, .. } => input,
        }
    }
}

impl CliError {
    /// Build an invalid input error for a named input
    pub fn invalid_input(
        input: impl Into<String>,
        value: Option<&str>,
        reason: impl Into<String>,
    ) -> Self {
        CliError::InvalidInput {
            input: input.into(),
            value: value.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Build a configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        CliError::Configuration(msg.into())
    }
}

fn display_value(value: &Option<String>) -> String {
    match value {
        Some(v) => format!("'{}'", v),
        None => "(none)".to_string(),
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::SerdeError(err.to_string())
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::Configuration(format!("{:#}", err))
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        CliError::Prompt(err.to_string())
    }
}
