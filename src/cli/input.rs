//! Typed input validation
//!
//! Raw values collected from clap are run through the filter declared for
//! their input name before any choice resolution or endpoint call happens.

use crate::cli::adapters::ListFilter;
use crate::cli::declarative::spec::{FilterKind, InputFilterSpec};
use crate::cli::error::{CliError, CliResult};
use serde_json::Value;

/// A value as it came off the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    Absent,
    Flag(bool),
    Text(String),
    List(Vec<String>),
}

/// A value after its filter has been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputValue {
    Absent,
    Int(i64),
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

impl InputValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, InputValue::Absent)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            InputValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            InputValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            InputValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text form used when matching against choices and in messages
    pub fn to_display(&self) -> Option<String> {
        match self {
            InputValue::Absent => None,
            InputValue::Int(i) => Some(i.to_string()),
            InputValue::Bool(b) => Some(b.to_string()),
            InputValue::Text(s) => Some(s.clone()),
            InputValue::List(items) => Some(items.join(",")),
        }
    }

    /// JSON form passed to endpoints
    pub fn to_json(&self) -> Value {
        match self {
            InputValue::Absent => Value::Null,
            InputValue::Int(i) => Value::from(*i),
            InputValue::Bool(b) => Value::Bool(*b),
            InputValue::Text(s) => Value::String(s.clone()),
            InputValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

/// Applies declared filters to raw input values
#[derive(Debug, Clone, Copy)]
pub struct InputValidator<'a> {
    filters: &'a InputFilterSpec,
}

impl<'a> InputValidator<'a> {
    pub fn new(filters: &'a InputFilterSpec) -> Self {
        Self { filters }
    }

    /// Validate `raw` against the filter declared for `name`.
    ///
    /// Absent values stay absent regardless of filter; resolving them is the
    /// choice resolver's job.
    pub fn validate(&self, name: &str, raw: RawInput) -> CliResult<InputValue> {
        match (self.filters.filter_for(name), raw) {
            (_, RawInput::Absent) => Ok(InputValue::Absent),
            (FilterKind::Raw, raw) => Ok(match raw {
                RawInput::Absent => InputValue::Absent,
                RawInput::Flag(b) => InputValue::Bool(b),
                RawInput::Text(s) => InputValue::Text(s),
                RawInput::List(items) => InputValue::List(items),
            }),
            (FilterKind::Int, RawInput::Text(s)) => parse_int(name, &s).map(InputValue::Int),
            (FilterKind::Int, RawInput::Flag(b)) => Err(CliError::invalid_input(
                name,
                Some(&b.to_string()),
                "expected an integer",
            )),
            (FilterKind::Int, RawInput::List(items)) => {
                single(name, items).and_then(|s| parse_int(name, &s).map(InputValue::Int))
            }
            (FilterKind::Bool, RawInput::Flag(b)) => Ok(InputValue::Bool(b)),
            (FilterKind::Bool, RawInput::Text(s)) => parse_bool(name, &s).map(InputValue::Bool),
            (FilterKind::Bool, RawInput::List(items)) => {
                single(name, items).and_then(|s| parse_bool(name, &s).map(InputValue::Bool))
            }
        }
    }

    /// Validate a textual value, as read from a prompt
    pub fn validate_text(&self, name: &str, text: &str) -> CliResult<InputValue> {
        self.validate(name, RawInput::Text(text.to_string()))
    }
}

fn single(name: &str, mut items: Vec<String>) -> CliResult<String> {
    if items.len() == 1 {
        Ok(items.remove(0))
    } else {
        Err(CliError::invalid_input(
            name,
            Some(&items.join(",")),
            "expected a single value",
        ))
    }
}

fn parse_int(name: &str, raw: &str) -> CliResult<i64> {
    raw.trim().parse::<i64>().map_err(|e| {
        CliError::invalid_input(name, Some(raw), format!("expected an integer ({})", e))
    })
}

fn parse_bool(name: &str, raw: &str) -> CliResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(CliError::invalid_input(
            name,
            Some(raw),
            "expected one of true/false, 1/0, yes/no, on/off",
        )),
    }
}

/// Parse repeated `--filter key:value` tokens
pub fn parse_list_filters(tokens: &[String]) -> CliResult<ListFilter> {
    let mut filter = ListFilter::new();
    for token in tokens {
        match token.split_once(':') {
            Some((key, value)) if !value.contains(':') => {
                filter.insert(key.to_string(), value.to_string());
            }
            _ => return Err(CliError::InvalidFilter(token.clone())),
        }
    }
    Ok(filter)
}
