//! Console commands
//!
//! Each command is a `CommandDefinition` constant. The generic strategies
//! (`show`, `list`, `create`) work against any endpoint; backups have their
//! own flows.

pub mod backup;
pub mod choices;
pub mod cloud_account;
mod create;
mod list;
mod show;

use crate::cli::declarative::definition::{CommandDefinition, CommandKind};
use crate::cli::error::CliResult;
use crate::cli::executor::{CommandExecutor, Inputs, UniversalFlags};

/// Commands registered by `Console::register_defaults`, in help order
pub const DEFAULT_COMMANDS: &[CommandDefinition] = &[
    cloud_account::SHOW,
    cloud_account::LIST,
    cloud_account::CREATE,
    backup::CREATE,
    backup::LIST,
    backup::DOWNLOAD,
];

/// Default definition with the given name
pub fn find(name: &str) -> Option<&'static CommandDefinition> {
    DEFAULT_COMMANDS.iter().find(|d| d.name == name)
}

/// Run the strategy of the executor's command with resolved inputs
pub fn run(exec: &CommandExecutor<'_>, inputs: &Inputs, flags: UniversalFlags) -> CliResult<()> {
    match exec.command().definition.kind {
        CommandKind::Show { endpoint } => show::run(exec, endpoint, inputs, flags.json),
        CommandKind::List { endpoint } => list::run(exec, endpoint, inputs, flags.json),
        CommandKind::Create { endpoint } => create::run(exec, endpoint, inputs, flags.json),
        CommandKind::BackupCreate => backup::create(exec, inputs, flags),
        CommandKind::BackupList => backup::list(exec, inputs, flags.json),
        CommandKind::BackupDownload => backup::download(exec, inputs, flags.json),
    }
}
