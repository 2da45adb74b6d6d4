//! Create a resource from resolved inputs

use super::cloud_account;
use crate::cli::adapters::EndpointName;
use crate::cli::error::CliResult;
use crate::cli::executor::{CommandExecutor, Inputs};
use serde_json::Value;

pub(super) fn run(
    exec: &CommandExecutor<'_>,
    endpoint: EndpointName,
    inputs: &Inputs,
    json: bool,
) -> CliResult<()> {
    let fields = inputs.to_fields();
    exec.notice(json, "creating", &Value::Object(fields.clone()));

    let created = exec.api().endpoint(endpoint)?.create(&fields)?;
    tracing::info!(%endpoint, id = ?created.id(), "resource created");

    let summary = match endpoint {
        EndpointName::CloudAccount => cloud_account::creation_summary(created.as_ref()),
        _ => created.to_value(false),
    };
    exec.say_summary(&summary, json)
}
