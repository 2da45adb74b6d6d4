//! Argument, option and input-filter declarations
//!
//! Commands declare their positional arguments and options as static slices.
//! At registration time the declarations are resolved into validated,
//! ordered specs that the builder turns into clap arguments.

use crate::cli::error::{CliError, CliResult};
use std::collections::{BTreeMap, HashSet};

/// Long option names every command gets from the console
pub const RESERVED_LONG_OPTIONS: &[&str] = &["help", "json", "wait", "no-interaction"];

/// Short option names every command gets from the console
pub const RESERVED_SHORT_OPTIONS: &[char] = &['h', 'n'];

/// How a positional argument consumes input
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArgMode {
    Required,
    Optional,
    /// Takes all remaining values; must come last
    Variadic,
}

/// Static declaration of a positional argument
#[derive(Debug, Clone, Copy)]
pub struct ArgDecl {
    pub name: &'static str,
    /// `None` means optional
    pub mode: Option<ArgMode>,
    pub default: Option<&'static str>,
}

impl ArgDecl {
    pub const fn new(name: &'static str, mode: ArgMode) -> Self {
        Self {
            name,
            mode: Some(mode),
            default: None,
        }
    }
}

/// Resolved positional argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub name: String,
    pub mode: ArgMode,
    pub default: Option<String>,
}

/// How an option consumes its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueMode {
    /// Flag, no value
    None,
    Required,
    Optional,
    /// Repeatable, collects every value
    Array,
}

/// Static declaration of an option; `key` is `"long"` or `"long|s"`
#[derive(Debug, Clone, Copy)]
pub struct OptDecl {
    pub key: &'static str,
    /// `None` means `ValueMode::Optional`
    pub mode: Option<ValueMode>,
    pub default: Option<&'static str>,
}

impl OptDecl {
    pub const fn new(key: &'static str, mode: ValueMode) -> Self {
        Self {
            key,
            mode: Some(mode),
            default: None,
        }
    }
}

/// Resolved option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub long: String,
    pub short: Option<char>,
    pub value_mode: ValueMode,
    pub default: Option<String>,
}

/// Typed filter applied to an input value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterKind {
    Int,
    Bool,
    #[default]
    Raw,
}

/// Input name -> filter kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFilterSpec {
    filters: BTreeMap<String, FilterKind>,
}

impl InputFilterSpec {
    pub fn new(decls: &[(&str, FilterKind)]) -> Self {
        Self {
            filters: decls
                .iter()
                .map(|(name, kind)| (name.to_string(), *kind))
                .collect(),
        }
    }

    /// Filter for `name`; undeclared inputs are `Raw`
    pub fn filter_for(&self, name: &str) -> FilterKind {
        self.filters.get(name).copied().unwrap_or_default()
    }

    /// Declared input names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }
}

/// Order argument declarations: required, then optional, then the variadic one.
///
/// Arguments with the same mode keep their declaration order.
pub fn resolve_arguments(decls: &[ArgDecl]) -> CliResult<Vec<ArgumentSpec>> {
    let mut seen = HashSet::new();
    let mut variadic: Option<&str> = None;

    for decl in decls {
        if decl.name.is_empty() {
            return Err(CliError::configuration("argument name cannot be empty"));
        }
        if !seen.insert(decl.name) {
            return Err(CliError::configuration(format!(
                "argument '{}' is declared more than once",
                decl.name
            )));
        }
        if decl.mode == Some(ArgMode::Variadic) {
            if let Some(first) = variadic {
                return Err(CliError::configuration(format!(
                    "only one variadic argument is allowed ('{}' and '{}')",
                    first, decl.name
                )));
            }
            variadic = Some(decl.name);
        }
    }

    let mut specs: Vec<ArgumentSpec> = decls
        .iter()
        .map(|decl| ArgumentSpec {
            name: decl.name.to_string(),
            mode: decl.mode.unwrap_or(ArgMode::Optional),
            default: decl.default.map(str::to_string),
        })
        .collect();
    // sort_by_key is stable
    specs.sort_by_key(|spec| spec.mode);
    Ok(specs)
}

/// Parse option declarations and reject name collisions
pub fn resolve_options(decls: &[OptDecl]) -> CliResult<Vec<OptionSpec>> {
    let mut longs: HashSet<String> = RESERVED_LONG_OPTIONS
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut shorts: HashSet<char> = RESERVED_SHORT_OPTIONS.iter().copied().collect();
    let mut specs = Vec::with_capacity(decls.len());

    for decl in decls {
        let (long, short) = parse_option_key(decl.key)?;

        if !longs.insert(long.clone()) {
            return Err(CliError::configuration(format!(
                "option '--{}' collides with an existing option",
                long
            )));
        }
        if let Some(c) = short {
            if !shorts.insert(c) {
                return Err(CliError::configuration(format!(
                    "short option '-{}' (for '--{}') collides with an existing option",
                    c, long
                )));
            }
        }

        specs.push(OptionSpec {
            long,
            short,
            value_mode: decl.mode.unwrap_or(ValueMode::Optional),
            default: decl.default.map(str::to_string),
        });
    }

    Ok(specs)
}

fn parse_option_key(key: &str) -> CliResult<(String, Option<char>)> {
    let mut parts = key.split('|');
    let long = parts.next().unwrap_or_default().trim();
    if long.is_empty() {
        return Err(CliError::configuration(format!(
            "option '{}' has an empty long name",
            key
        )));
    }

    let short = match parts.next().map(str::trim) {
        None | Some("") => None,
        Some(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphanumeric() => Some(c),
                _ => {
                    return Err(CliError::configuration(format!(
                        "short name '{}' for option '--{}' must be a single character",
                        s, long
                    )))
                }
            }
        }
    };

    if parts.next().is_some() {
        return Err(CliError::configuration(format!(
            "option '{}' has more than one short name",
            key
        )));
    }

    Ok((long.to_string(), short))
}
