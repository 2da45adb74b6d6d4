//! Console application
//!
//! Owns the collaborators every command needs, registers command
//! definitions for the configured company, builds the clap tree and
//! dispatches a parsed invocation to the `CommandExecutor`.

use crate::cli::adapters::{
    ApiClient, CatalogTranslator, Clock, ConsoleOutput, DialoguerPrompter, Prompter,
    SystemClock, TerminalOutput, Translator,
};
use crate::cli::commands::DEFAULT_COMMANDS;
use crate::cli::declarative::builder::{CommandBuilder, RegisteredCommand};
use crate::cli::declarative::definition::{CommandDefinition, Company};
use crate::cli::error::{CliError, CliResult};
use crate::cli::executor::{CommandExecutor, ExecutionContext};
use crate::cli::poller::{PollSettings, Timeout};
use crate::cli::utils::display_error_with_suggestions;
use crate::config::{ConfigurationLoader, Configuration, EnvironmentLoader};
use crate::observability::{init_tracing, CommandLog};
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, Command};
use std::ffi::OsString;
use std::io::IsTerminal;

/// The console: configuration, collaborators and registered commands
pub struct Console {
    config: Configuration,
    api: Box<dyn ApiClient>,
    translator: Box<dyn Translator>,
    output: Box<dyn ConsoleOutput>,
    prompter: Box<dyn Prompter>,
    clock: Box<dyn Clock>,
    styled: bool,
    log: Option<CommandLog>,
    commands: Vec<RegisteredCommand>,
}

impl Console {
    /// Console with terminal collaborators and the built-in English phrases
    pub fn new(config: Configuration, api: impl ApiClient + 'static) -> Self {
        Self {
            config,
            api: Box::new(api),
            translator: Box::new(CatalogTranslator::builtin()),
            output: Box::new(TerminalOutput::new()),
            prompter: Box::new(DialoguerPrompter::new()),
            clock: Box::new(SystemClock),
            styled: std::io::stdout().is_terminal(),
            log: None,
            commands: Vec::new(),
        }
    }

    /// Console from loaded configuration with environment overrides applied.
    ///
    /// Installs the tracing subscriber, loads the configured phrase catalog
    /// and opens the command log when one is configured.
    pub fn from_loader(
        loader: &ConfigurationLoader,
        env: &EnvironmentLoader,
        api: impl ApiClient + 'static,
    ) -> CliResult<Self> {
        let mut config = loader.config.clone();

        if let Some(company) = env.company() {
            config.console.company = company
                .parse::<Company>()
                .map_err(CliError::configuration)?;
        }
        if let Some(level) = env.log_level() {
            config.logging.level = level;
        }

        init_tracing(&config.logging.level)?;
        tracing::debug!(
            config = %loader.config_path.display(),
            company = %config.console.company,
            "console configured"
        );

        let mut console = Self::new(config, api);

        if let Some(path) = loader.translations_path() {
            console.translator = Box::new(CatalogTranslator::from_file(&path)?);
        }
        if let Some(path) = loader.command_log_path() {
            console.log = Some(CommandLog::new(&path)?);
        }

        Ok(console)
    }

    pub fn with_translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Box::new(translator);
        self
    }

    pub fn with_output(mut self, output: impl ConsoleOutput + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    pub fn with_prompter(mut self, prompter: impl Prompter + 'static) -> Self {
        self.prompter = Box::new(prompter);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Colored summary keys on or off
    pub fn with_styling(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    pub fn with_command_log(mut self, log: CommandLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Register a command definition.
    ///
    /// Returns `false` when the command is not enabled for the configured
    /// company. Registering the same name twice is an error.
    pub fn register(&mut self, definition: &CommandDefinition) -> CliResult<bool> {
        let company = self.config.console.company;
        if !definition.is_enabled_for(company) {
            tracing::debug!(command = definition.name, %company, "skipped for company");
            return Ok(false);
        }
        if self.find(definition.name).is_some() {
            return Err(CliError::configuration(format!(
                "command '{}' is already registered",
                definition.name
            )));
        }

        let registered = CommandBuilder::new(self.translator.as_ref()).register(definition)?;
        tracing::debug!(command = definition.name, "registered command");
        self.commands.push(registered);
        Ok(true)
    }

    /// Register every built-in command; returns how many were enabled
    pub fn register_defaults(&mut self) -> CliResult<usize> {
        let mut registered = 0;
        for definition in DEFAULT_COMMANDS {
            if self.register(definition)? {
                registered += 1;
            }
        }
        Ok(registered)
    }

    /// Registered commands, in registration order
    pub fn commands(&self) -> &[RegisteredCommand] {
        &self.commands
    }

    fn find(&self, name: &str) -> Option<&RegisteredCommand> {
        self.commands.iter().find(|c| c.name() == name)
    }

    /// Root clap command with the universal flags and every registered command
    pub fn build_app(&self) -> Command {
        let name: &'static str = Box::leak(self.config.console.name.clone().into_boxed_str());
        let version: &'static str =
            Box::leak(self.config.console.version.clone().into_boxed_str());

        let mut app = Command::new(name)
            .version(version)
            .subcommand_required(true)
            .arg_required_else_help(true)
            .arg(
                Arg::new("json")
                    .long("json")
                    .global(true)
                    .action(ArgAction::SetTrue)
                    .help("Output results as JSON"),
            )
            .arg(
                Arg::new("wait")
                    .long("wait")
                    .global(true)
                    .action(ArgAction::SetTrue)
                    .help("Wait for long-running operations to complete"),
            )
            .arg(
                Arg::new("no-interaction")
                    .long("no-interaction")
                    .short('n')
                    .global(true)
                    .action(ArgAction::SetTrue)
                    .help("Never prompt; fail when a value cannot be resolved"),
            );

        let builder = CommandBuilder::new(self.translator.as_ref());
        for command in &self.commands {
            app = app.subcommand(builder.build(command));
        }
        app
    }

    /// Parse `args` (including the program name) and run the command.
    ///
    /// Help and version requests are printed and count as success.
    pub fn run_from<I, T>(&self, args: I) -> CliResult<u8>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let matches = match self.build_app().try_get_matches_from(args.iter().cloned()) {
            Ok(matches) => matches,
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::DisplayHelp
                        | ErrorKind::DisplayVersion
                        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) =>
            {
                self.output.say(e.render().to_string().trim_end());
                return Ok(0);
            }
            Err(e) => return Err(CliError::Usage(e.render().to_string())),
        };

        let Some((name, sub_matches)) = matches.subcommand() else {
            return Err(CliError::CommandNotFound(String::new()));
        };
        let command = self
            .find(name)
            .ok_or_else(|| CliError::CommandNotFound(name.to_string()))?;

        let raw_args: Vec<String> = args
            .iter()
            .skip(1)
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        self.log_event(|log| log.log_invocation(name, &raw_args));
        tracing::info!(command = name, "running command");

        let ctx = ExecutionContext {
            api: self.api.as_ref(),
            translator: self.translator.as_ref(),
            output: self.output.as_ref(),
            prompter: self.prompter.as_ref(),
            clock: self.clock.as_ref(),
            poll: PollSettings::from_millis(self.config.polling.interval_ms),
            timeout: Timeout::from_secs(self.config.polling.timeout_secs),
            styled: self.styled,
            log: self.log.as_ref(),
        };
        let result = CommandExecutor::new(command, ctx).execute(sub_matches);

        match &result {
            Ok(code) => self.log_event(|log| log.log_outcome(name, Ok(*code))),
            Err(e) => {
                let message = e.to_string();
                self.log_event(|log| log.log_outcome(name, Err(&message)));
            }
        }
        result
    }

    /// Run with the process arguments; errors are printed and mapped to 1
    pub fn run(&self) -> u8 {
        match self.run_from(std::env::args_os()) {
            Ok(code) => code,
            Err(e) => {
                display_error_with_suggestions(&e, &self.config.console.name);
                1
            }
        }
    }

    fn log_event<F>(&self, write: F)
    where
        F: FnOnce(&CommandLog) -> anyhow::Result<()>,
    {
        if let Some(log) = &self.log {
            if let Err(e) = write(log) {
                tracing::warn!(error = %e, "failed to write command log");
            }
        }
    }
}
