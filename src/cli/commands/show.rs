//! Show one resource by id

use crate::cli::adapters::EndpointName;
use crate::cli::error::CliResult;
use crate::cli::executor::{CommandExecutor, Inputs};

pub(super) fn run(
    exec: &CommandExecutor<'_>,
    endpoint: EndpointName,
    inputs: &Inputs,
    json: bool,
) -> CliResult<()> {
    let id = inputs.int("id")?;
    let resource = exec.api().endpoint(endpoint)?.retrieve(id)?;
    tracing::debug!(%endpoint, id, "retrieved resource");
    exec.say_summary(&resource.to_value(false), json)
}
