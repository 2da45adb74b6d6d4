//! Static command definitions
//!
//! Every console command is described by one `CommandDefinition` constant:
//! its name, declared arguments and options, input filters, which inputs are
//! resolved through choices, and the strategy used to execute it.

use super::spec::{ArgDecl, FilterKind, OptDecl};
use crate::cli::adapters::EndpointName;
use crate::cli::choice::ChoiceDomain;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hosting brand the console is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Company {
    #[default]
    Nexcess,
    Thermo,
}

impl fmt::Display for Company {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Company::Nexcess => f.write_str("nexcess"),
            Company::Thermo => f.write_str("thermo"),
        }
    }
}

impl std::str::FromStr for Company {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nexcess" => Ok(Company::Nexcess),
            "thermo" | "thermo.io" => Ok(Company::Thermo),
            other => Err(format!("unknown company '{}'", other)),
        }
    }
}

/// Execution strategy of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Retrieve one resource by `id` and summarize it
    Show { endpoint: EndpointName },
    /// List resources matching `--filter` pairs as a table
    List { endpoint: EndpointName },
    /// Create a resource from every resolved input
    Create { endpoint: EndpointName },
    /// Start a cloud account backup, optionally waiting or downloading
    BackupCreate,
    /// List the backups of a cloud account
    BackupList,
    /// Download an existing backup
    BackupDownload,
}

/// Declarative description of one console command
#[derive(Debug, Clone, Copy)]
pub struct CommandDefinition {
    /// Colon-segmented command name (`cloud-account:backup:create`)
    pub name: &'static str,
    pub args: &'static [ArgDecl],
    pub opts: &'static [OptDecl],
    /// Input name -> filter
    pub inputs: &'static [(&'static str, FilterKind)],
    /// Inputs resolved through a candidate set
    pub choices: &'static [(&'static str, ChoiceDomain)],
    /// Text arguments looked up against a choice input (`app` -> `app_id`)
    pub lookups: &'static [(&'static str, &'static str)],
    /// Non-choice inputs that must end up with a value
    pub required: &'static [&'static str],
    /// Keys shown when a list result has no rows to derive them from
    pub summary_keys: &'static [&'static str],
    /// Companies this command is enabled for; empty means all
    pub restrict_to: &'static [Company],
    pub kind: CommandKind,
}

impl CommandDefinition {
    /// Whether the command is available for `company`
    pub fn is_enabled_for(&self, company: Company) -> bool {
        self.restrict_to.is_empty() || self.restrict_to.contains(&company)
    }

    /// Choice domain of an input, if it is resolved through choices
    pub fn choice_domain(&self, input: &str) -> Option<ChoiceDomain> {
        self.choices
            .iter()
            .find(|(name, _)| *name == input)
            .map(|(_, domain)| *domain)
    }
}

/// Translation namespace for a command name.
///
/// `cloud-account:backup:create` becomes `console.cloud_account.backup.create`.
pub fn translation_base(command_name: &str) -> String {
    let ns: String = command_name
        .chars()
        .map(|c| match c {
            ':' => '.',
            '-' => '_',
            other => other,
        })
        .collect();
    format!("console.{}", ns)
}
