//! Command executor
//!
//! Runs one parsed invocation of a registered command:
//! collect and validate inputs, resolve choices and required values, then
//! hand over to the command's strategy, which calls the endpoint, applies
//! the wait policy and renders the summary.

use crate::cli::adapters::{ApiClient, AsyncResource, Clock, ConsoleOutput, Prompter, Translator};
use crate::cli::choice::{ChoiceDomain, ChoiceRequest, ChoiceResolver};
use crate::cli::commands::{self, choices};
use crate::cli::declarative::builder::RegisteredCommand;
use crate::cli::declarative::spec::{ArgMode, ArgumentSpec, OptionSpec, ValueMode};
use crate::cli::error::{CliError, CliResult};
use crate::cli::input::{InputValidator, InputValue, RawInput};
use crate::cli::poller::{when_complete, PendingOperation, PollSettings, Timeout};
use crate::cli::summary::SummaryFormatter;
use crate::observability::CommandLog;
use clap::ArgMatches;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Exit code of a successful command
pub const EXIT_SUCCESS: u8 = 0;

static ABSENT: InputValue = InputValue::Absent;

/// Flags every command accepts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniversalFlags {
    pub json: bool,
    pub wait: bool,
    pub no_interaction: bool,
}

impl UniversalFlags {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            json: flag(matches, "json"),
            wait: flag(matches, "wait"),
            no_interaction: flag(matches, "no-interaction"),
        }
    }
}

fn flag(matches: &ArgMatches, id: &str) -> bool {
    matches
        .try_get_one::<bool>(id)
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false)
}

/// What to do with an asynchronous resource after it is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitPolicy {
    NoWait,
    Wait,
    /// Wait, then download into the directory
    WaitThenDownload(PathBuf),
}

impl WaitPolicy {
    /// A download path implies waiting; `~` is expanded
    pub fn from_request(wait: bool, download: Option<&str>) -> Self {
        match download {
            Some(path) => WaitPolicy::WaitThenDownload(expand_path(path)),
            None if wait => WaitPolicy::Wait,
            None => WaitPolicy::NoWait,
        }
    }
}

/// Expand `~` in a user-supplied path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Collaborators shared by every invocation
#[derive(Clone, Copy)]
pub struct ExecutionContext<'a> {
    pub api: &'a dyn ApiClient,
    pub translator: &'a dyn Translator,
    pub output: &'a dyn ConsoleOutput,
    pub prompter: &'a dyn Prompter,
    pub clock: &'a dyn Clock,
    pub poll: PollSettings,
    pub timeout: Timeout,
    /// Colored keys in text summaries
    pub styled: bool,
    pub log: Option<&'a CommandLog>,
}

/// Validated input values plus the raw argument and option values
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    values: BTreeMap<String, InputValue>,
    arguments: BTreeMap<String, RawInput>,
    options: BTreeMap<String, RawInput>,
}

impl Inputs {
    /// Validated value of a declared input
    pub fn get(&self, name: &str) -> &InputValue {
        self.values.get(name).unwrap_or(&ABSENT)
    }

    pub fn set(&mut self, name: &str, value: InputValue) {
        self.values.insert(name.to_string(), value);
    }

    /// Integer input that must be present by now
    pub fn int(&self, name: &str) -> CliResult<i64> {
        match self.get(name) {
            InputValue::Int(i) => Ok(*i),
            InputValue::Absent => Err(CliError::invalid_input(name, None, "a value is required")),
            other => Err(CliError::invalid_input(
                name,
                other.to_display().as_deref(),
                "expected an integer",
            )),
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).as_text()
    }

    pub fn argument_text(&self, name: &str) -> Option<&str> {
        match self.arguments.get(name) {
            Some(RawInput::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn option_text(&self, long: &str) -> Option<&str> {
        match self.options.get(long) {
            Some(RawInput::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn option_list(&self, long: &str) -> Vec<String> {
        match self.options.get(long) {
            Some(RawInput::List(items)) => items.clone(),
            Some(RawInput::Text(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Every present input as JSON, keyed by input name
    pub fn to_fields(&self) -> Map<String, Value> {
        self.values
            .iter()
            .filter(|(_, v)| !v.is_absent())
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }

    /// Raw value feeding input `name`: an option named like it (`_` or `-`),
    /// else an argument of the same name
    fn raw_for(&self, name: &str) -> RawInput {
        self.options
            .get(name)
            .or_else(|| self.options.get(&name.replace('_', "-")))
            .or_else(|| self.arguments.get(name))
            .cloned()
            .unwrap_or(RawInput::Absent)
    }
}

/// Executes one registered command
pub struct CommandExecutor<'a> {
    command: &'a RegisteredCommand,
    ctx: ExecutionContext<'a>,
    formatter: SummaryFormatter,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(command: &'a RegisteredCommand, ctx: ExecutionContext<'a>) -> Self {
        Self {
            command,
            formatter: SummaryFormatter::new(ctx.styled),
            ctx,
        }
    }

    pub fn command(&self) -> &RegisteredCommand {
        self.command
    }

    pub fn api(&self) -> &dyn ApiClient {
        self.ctx.api
    }

    /// Run the command against its parsed matches
    pub fn execute(&self, matches: &ArgMatches) -> CliResult<u8> {
        let flags = UniversalFlags::from_matches(matches);
        let interactive = !flags.no_interaction && self.ctx.prompter.is_interactive();
        tracing::debug!(command = self.command.name(), ?flags, interactive, "executing");

        let mut inputs = self.collect(matches)?;
        self.resolve(&mut inputs, interactive)?;

        if let Some(log) = self.ctx.log {
            if let Err(e) = log.log_inputs(&Value::Object(inputs.to_fields())) {
                tracing::warn!(error = %e, "failed to write command log");
            }
        }

        commands::run(self, &inputs, flags)?;
        Ok(EXIT_SUCCESS)
    }

    /// Read every declared argument and option, then validate declared inputs
    fn collect(&self, matches: &ArgMatches) -> CliResult<Inputs> {
        let mut inputs = Inputs::default();

        for spec in &self.command.arguments {
            inputs
                .arguments
                .insert(spec.name.clone(), raw_argument(matches, spec)?);
        }
        for spec in &self.command.options {
            inputs
                .options
                .insert(spec.long.clone(), raw_option(matches, spec)?);
        }

        let validator = InputValidator::new(&self.command.filters);
        for name in self.command.filters.names() {
            let raw = inputs.raw_for(name);
            // choice inputs accept any text until resolved to a key
            let value = if self.command.definition.choice_domain(name).is_some() {
                match raw {
                    RawInput::Text(text) => InputValue::Text(text),
                    _ => InputValue::Absent,
                }
            } else {
                validator.validate(name, raw)?
            };
            inputs.set(name, value);
        }

        Ok(inputs)
    }

    /// Argument lookups, choice inputs, then required plain inputs
    fn resolve(&self, inputs: &mut Inputs, interactive: bool) -> CliResult<()> {
        let definition = &self.command.definition;
        let validator = InputValidator::new(&self.command.filters);
        let mut resolver = ChoiceResolver::new(self.ctx.prompter, interactive);

        for &(argument, input) in definition.lookups {
            let Some(text) = inputs.argument_text(argument).map(str::to_string) else {
                continue;
            };
            if !inputs.get(input).is_absent() {
                tracing::debug!(argument, input, "explicit input takes precedence over lookup");
                continue;
            }
            let domain = definition.choice_domain(input).ok_or_else(|| {
                CliError::configuration(format!(
                    "lookup target '{}' of {} is not a choice input",
                    input,
                    self.command.name()
                ))
            })?;

            let prompt = self.choice_prompt(input, domain);
            let key = resolver.resolve(
                ChoiceRequest {
                    input,
                    domain,
                    prompt: &prompt,
                },
                Some(&text),
                || choices::fetch(domain, self, inputs),
            )?;
            inputs.set(input, validator.validate_text(input, &key)?);
        }

        for &(input, domain) in definition.choices {
            let provided = inputs.get(input).to_display();
            let prompt = self.choice_prompt(input, domain);
            let key = resolver.resolve(
                ChoiceRequest {
                    input,
                    domain,
                    prompt: &prompt,
                },
                provided.as_deref(),
                || choices::fetch(domain, self, inputs),
            )?;
            inputs.set(input, validator.validate_text(input, &key)?);
        }

        for &name in definition.required {
            if definition.choice_domain(name).is_some() || !inputs.get(name).is_absent() {
                continue;
            }
            if !interactive {
                return Err(CliError::invalid_input(name, None, "a value is required"));
            }
            let answer = self.ctx.prompter.ask(&self.input_prompt(name))?;
            inputs.set(name, validator.validate_text(name, &answer)?);
        }

        Ok(())
    }

    fn choice_prompt(&self, input: &str, domain: ChoiceDomain) -> String {
        self.describe(&choices::prompt_key(input), &Value::Null, || {
            format!("Choose one of the available {}", domain)
        })
    }

    fn input_prompt(&self, input: &str) -> String {
        self.describe(&format!("ask_{}", input), &Value::Null, || {
            input.replace('_', " ")
        })
    }

    /// Translated phrase for this command; the bare key when untranslated
    pub fn phrase(&self, key: &str, context: &Value) -> String {
        self.command.phrase(self.ctx.translator, key, context)
    }

    /// Translated phrase, or `fallback` when none exists
    pub fn describe<F>(&self, key: &str, context: &Value, fallback: F) -> String
    where
        F: FnOnce() -> String,
    {
        if self.command.has_phrase(self.ctx.translator, key) {
            self.phrase(key, context)
        } else {
            fallback()
        }
    }

    /// Progress notice; goes to stderr in JSON mode so stdout stays parseable
    pub fn notice(&self, json: bool, key: &str, context: &Value) {
        let text = self.phrase(key, context);
        if json {
            self.ctx.output.say_err(&text);
        } else {
            self.ctx.output.say(&text);
        }
    }

    /// Render a single result as JSON, the `summary` phrase, or key/value text
    pub fn say_summary(&self, details: &Value, json: bool) -> CliResult<()> {
        if json {
            return self.ctx.output.say_json(details);
        }

        let summary_phrase = self.phrase("summary", details);
        if summary_phrase == "summary" {
            let label = |key: &str| self.summary_key(key);
            let text = self.formatter.format_summary(details, 0, &label);
            self.ctx.output.say(&format!("{}\n", text));
        } else {
            self.ctx.output.say(&summary_phrase);
        }
        Ok(())
    }

    /// Render a list result as JSON or a titled table
    pub fn say_list(&self, rows: Vec<Value>, json: bool) -> CliResult<()> {
        if json {
            return self.ctx.output.say_json(&Value::Array(rows));
        }

        if self.command.has_phrase(self.ctx.translator, "summary_title") {
            self.ctx
                .output
                .say(&self.phrase("summary_title", &Value::Null));
        }

        let summary_keys: Vec<String> = self
            .command
            .definition
            .summary_keys
            .iter()
            .map(|k| k.to_string())
            .collect();
        let header = |key: &str| self.phrase(key, &Value::Null);
        let no_data = {
            let translated = self.ctx.translator.translate("console.no_data", &Value::Null);
            if translated == "console.no_data" {
                "No data".to_string()
            } else {
                translated
            }
        };

        let table = self
            .formatter
            .render_table(&rows, &summary_keys, &header, &no_data);
        self.ctx.output.say(&table);
        Ok(())
    }

    fn summary_key(&self, key: &str) -> String {
        let tr_key = format!("summary_key.{}", key);
        let translated = self.phrase(&tr_key, &Value::Null);
        if translated.contains(&tr_key) {
            key.to_string()
        } else {
            translated
        }
    }

    /// Wait on `resource` with the configured timeout and poll interval
    pub fn wait_for<R: AsyncResource + 'a>(
        &self,
        resource: R,
        operation: &str,
    ) -> PendingOperation<'a, R> {
        if let Some(log) = self.ctx.log {
            let timeout_secs = match self.ctx.timeout {
                Timeout::Unbounded => 0,
                Timeout::Bounded(d) => d.as_secs(),
            };
            if let Err(e) = log.log_wait(operation, timeout_secs) {
                tracing::warn!(error = %e, "failed to write command log");
            }
        }
        tracing::info!(operation, timeout = ?self.ctx.timeout, "waiting for completion");

        when_complete(resource, self.ctx.timeout, &self.ctx.poll, self.ctx.clock).named(operation)
    }
}

fn matches_error(id: &str, err: clap::parser::MatchesError) -> CliError {
    CliError::configuration(format!("cannot read '{}': {}", id, err))
}

fn raw_argument(matches: &ArgMatches, spec: &ArgumentSpec) -> CliResult<RawInput> {
    let id = spec.name.as_str();
    if spec.mode == ArgMode::Variadic {
        let values = matches
            .try_get_many::<String>(id)
            .map_err(|e| matches_error(id, e))?;
        return Ok(match values {
            Some(values) => RawInput::List(values.cloned().collect()),
            None => RawInput::Absent,
        });
    }

    let value = matches
        .try_get_one::<String>(id)
        .map_err(|e| matches_error(id, e))?;
    Ok(value.map_or(RawInput::Absent, |v| RawInput::Text(v.clone())))
}

fn raw_option(matches: &ArgMatches, spec: &OptionSpec) -> CliResult<RawInput> {
    let id = spec.long.as_str();
    match spec.value_mode {
        ValueMode::None => {
            let set = matches
                .try_get_one::<bool>(id)
                .map_err(|e| matches_error(id, e))?;
            Ok(RawInput::Flag(set.copied().unwrap_or(false)))
        }
        ValueMode::Array => {
            let values = matches
                .try_get_many::<String>(id)
                .map_err(|e| matches_error(id, e))?;
            Ok(match values {
                Some(values) => RawInput::List(values.cloned().collect()),
                None => RawInput::Absent,
            })
        }
        ValueMode::Required | ValueMode::Optional => {
            let value = matches
                .try_get_one::<String>(id)
                .map_err(|e| matches_error(id, e))?;
            Ok(value.map_or(RawInput::Absent, |v| RawInput::Text(v.clone())))
        }
    }
}
