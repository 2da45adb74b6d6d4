//! Declarative command definitions
//!
//! A command is described once as data: its arguments, options, typed
//! inputs, choice inputs and execution strategy. `spec` resolves the
//! argument and option declarations, `definition` holds the command
//! description, and `builder` validates a definition and turns it into a
//! clap command.

pub mod builder;
pub mod definition;
pub mod spec;

// Re-export main types
pub use builder::{CommandBuilder, RegisteredCommand};
pub use definition::{translation_base, CommandDefinition, CommandKind, Company};
pub use spec::{
    resolve_arguments, resolve_options, ArgDecl, ArgMode, ArgumentSpec, FilterKind,
    InputFilterSpec, OptDecl, OptionSpec, ValueMode,
};
