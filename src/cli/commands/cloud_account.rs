//! Cloud account commands

use crate::cli::adapters::{EndpointName, Resource};
use crate::cli::choice::ChoiceDomain;
use crate::cli::declarative::definition::{CommandDefinition, CommandKind, Company};
use crate::cli::declarative::spec::{ArgDecl, ArgMode, FilterKind, OptDecl, ValueMode};
use serde_json::{json, Value};

pub const SHOW: CommandDefinition = CommandDefinition {
    name: "cloud-account:show",
    args: &[],
    opts: &[OptDecl::new("id", ValueMode::Required)],
    inputs: &[("id", FilterKind::Int)],
    choices: &[],
    lookups: &[],
    required: &["id"],
    summary_keys: &[],
    restrict_to: &[Company::Nexcess],
    kind: CommandKind::Show {
        endpoint: EndpointName::CloudAccount,
    },
};

pub const LIST: CommandDefinition = CommandDefinition {
    name: "cloud-account:list",
    args: &[],
    opts: &[OptDecl::new("filter", ValueMode::Array)],
    inputs: &[],
    choices: &[],
    lookups: &[],
    required: &[],
    summary_keys: &["id", "domain", "state"],
    restrict_to: &[Company::Nexcess],
    kind: CommandKind::List {
        endpoint: EndpointName::CloudAccount,
    },
};

pub const CREATE: CommandDefinition = CommandDefinition {
    name: "cloud-account:create",
    args: &[ArgDecl::new("app", ArgMode::Optional)],
    opts: &[
        OptDecl::new("app-id", ValueMode::Required),
        OptDecl::new("cloud-id", ValueMode::Required),
        OptDecl::new("domain", ValueMode::Required),
        OptDecl::new("install-app", ValueMode::None),
        OptDecl::new("package-id", ValueMode::Required),
    ],
    inputs: &[
        ("app_id", FilterKind::Int),
        ("cloud_id", FilterKind::Int),
        ("domain", FilterKind::Raw),
        ("install_app", FilterKind::Bool),
        ("package_id", FilterKind::Int),
    ],
    choices: &[
        ("app_id", ChoiceDomain::App),
        ("cloud_id", ChoiceDomain::Cloud),
        ("package_id", ChoiceDomain::Package),
    ],
    lookups: &[("app", "app_id")],
    required: &["domain"],
    summary_keys: &[],
    restrict_to: &[Company::Nexcess],
    kind: CommandKind::Create {
        endpoint: EndpointName::CloudAccount,
    },
};

/// Summary of a newly created cloud account; related resources are
/// reduced to their display identity
pub fn creation_summary(account: &dyn Resource) -> Value {
    let field = |name: &str| account.get(name).unwrap_or(Value::Null);
    let nested = |name: &str, key: &str| {
        account
            .get(name)
            .and_then(|related| related.get(key).cloned())
            .unwrap_or(Value::Null)
    };

    json!({
        "state": field("state"),
        "domain": field("domain"),
        "temp_domain": field("temp_domain"),
        "app": nested("app", "identity"),
        "cloud": nested("location", "identity"),
        "service_level": nested("service", "description"),
        "service_status": nested("service", "status"),
    })
}
