//! Command builder - resolves a `CommandDefinition` and converts it to a clap Command

use super::definition::{translation_base, CommandDefinition};
use super::spec::{
    resolve_arguments, resolve_options, ArgMode, ArgumentSpec, InputFilterSpec, OptionSpec,
    ValueMode,
};
use crate::cli::adapters::Translator;
use crate::cli::error::{CliError, CliResult};
use clap::{Arg, ArgAction, Command};
use serde_json::Value;

/// A command definition with its resolved specs, ready to be parsed and executed
#[derive(Debug, Clone)]
pub struct RegisteredCommand {
    pub definition: CommandDefinition,
    pub arguments: Vec<ArgumentSpec>,
    pub options: Vec<OptionSpec>,
    pub filters: InputFilterSpec,
    tr_base: String,
}

impl RegisteredCommand {
    pub fn name(&self) -> &'static str {
        self.definition.name
    }

    /// Command-namespaced translation key for `key`
    pub fn tr_key(&self, key: &str) -> String {
        if key.starts_with("console.") {
            key.to_string()
        } else {
            format!("{}.{}", self.tr_base, key)
        }
    }

    /// Translated phrase for this command, or `key` itself when untranslated
    pub fn phrase(&self, tr: &dyn Translator, key: &str, context: &Value) -> String {
        let tr_key = self.tr_key(key);
        let translated = tr.translate(&tr_key, context);
        if translated == tr_key {
            key.to_string()
        } else {
            translated
        }
    }

    /// Whether a phrase exists for `key`
    pub fn has_phrase(&self, tr: &dyn Translator, key: &str) -> bool {
        let tr_key = self.tr_key(key);
        tr.translate(&tr_key, &Value::Null) != tr_key
    }

    pub fn option(&self, long: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.long == long)
    }

    pub fn argument(&self, name: &str) -> Option<&ArgumentSpec> {
        self.arguments.iter().find(|a| a.name == name)
    }
}

/// Builds registered commands and their clap representation
pub struct CommandBuilder<'a> {
    translator: &'a dyn Translator,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(translator: &'a dyn Translator) -> Self {
        Self { translator }
    }

    /// Resolve a definition's arguments and options.
    ///
    /// Fails with `CliError::Configuration` on any invalid declaration.
    pub fn register(&self, definition: &CommandDefinition) -> CliResult<RegisteredCommand> {
        if definition.name.is_empty() {
            return Err(CliError::configuration("command name cannot be empty"));
        }

        let arguments = resolve_arguments(definition.args)?;
        let options = resolve_options(definition.opts)?;

        if let Some(arg) = arguments
            .iter()
            .find(|a| options.iter().any(|o| o.long == a.name))
        {
            return Err(CliError::configuration(format!(
                "'{}' is declared both as an argument and an option of {}",
                arg.name, definition.name
            )));
        }

        for (input, _) in definition.choices {
            if !definition.inputs.iter().any(|(name, _)| name == input) {
                return Err(CliError::configuration(format!(
                    "choice input '{}' of {} has no input filter declared",
                    input, definition.name
                )));
            }
        }

        tracing::debug!(
            command = definition.name,
            arguments = arguments.len(),
            options = options.len(),
            "registered command"
        );

        Ok(RegisteredCommand {
            definition: *definition,
            arguments,
            options,
            filters: InputFilterSpec::new(definition.inputs),
            tr_base: translation_base(definition.name),
        })
    }

    /// Build the clap Command for a registered command
    pub fn build(&self, registered: &RegisteredCommand) -> Command {
        let tr = self.translator;
        let cmd_name: &'static str = registered.definition.name;
        let mut cmd = Command::new(cmd_name);

        if registered.has_phrase(tr, "desc") {
            cmd = cmd.about(registered.phrase(tr, "desc", &Value::Null));
        }
        if registered.has_phrase(tr, "help") {
            cmd = cmd.long_about(registered.phrase(tr, "help", &Value::Null));
        }
        if registered.has_phrase(tr, "usage") {
            cmd = cmd.after_help(format!(
                "Usage example:\n  {}",
                registered.phrase(tr, "usage", &Value::Null)
            ));
        }

        // Positional indexes follow insertion order, which is already sorted
        for spec in &registered.arguments {
            let desc = registered.phrase(tr, &format!("arg_{}", spec.name), &Value::Null);
            cmd = cmd.arg(Self::build_argument(spec, desc));
        }

        for spec in &registered.options {
            let desc = registered.phrase(tr, &format!("opt_{}", spec.long), &Value::Null);
            cmd = cmd.arg(Self::build_option(spec, desc));
        }

        cmd
    }

    fn build_argument(spec: &ArgumentSpec, desc: String) -> Arg {
        let arg_name: &'static str = Box::leak(spec.name.clone().into_boxed_str());
        let mut arg = Arg::new(arg_name).help(desc);

        arg = match spec.mode {
            ArgMode::Required => arg.required(true).action(ArgAction::Set),
            ArgMode::Optional => arg.action(ArgAction::Set),
            ArgMode::Variadic => arg.action(ArgAction::Append).num_args(1..),
        };

        if let Some(default) = &spec.default {
            let default_str: &'static str = Box::leak(default.clone().into_boxed_str());
            arg = arg.default_value(default_str);
        }

        arg
    }

    fn build_option(spec: &OptionSpec, desc: String) -> Arg {
        let long_str: &'static str = Box::leak(spec.long.clone().into_boxed_str());
        let mut arg = Arg::new(long_str).long(long_str).help(desc);

        if let Some(short) = spec.short {
            arg = arg.short(short);
        }

        arg = match spec.value_mode {
            ValueMode::None => arg.action(ArgAction::SetTrue),
            ValueMode::Required => arg.action(ArgAction::Set).num_args(1),
            ValueMode::Optional => arg.action(ArgAction::Set).num_args(0..=1),
            ValueMode::Array => arg.action(ArgAction::Append).num_args(1),
        };

        if spec.value_mode != ValueMode::None {
            if let Some(default) = &spec.default {
                let default_str: &'static str = Box::leak(default.clone().into_boxed_str());
                arg = arg.default_value(default_str);
            }
        }

        arg
    }
}
