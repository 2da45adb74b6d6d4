//! List resources as a table

use crate::cli::adapters::EndpointName;
use crate::cli::error::CliResult;
use crate::cli::executor::{CommandExecutor, Inputs};
use crate::cli::input::parse_list_filters;
use serde_json::Value;

pub(super) fn run(
    exec: &CommandExecutor<'_>,
    endpoint: EndpointName,
    inputs: &Inputs,
    json: bool,
) -> CliResult<()> {
    let filter = parse_list_filters(&inputs.option_list("filter"))?;
    let collection = exec.api().endpoint(endpoint)?.list(&filter)?;
    tracing::debug!(%endpoint, rows = collection.len(), "listed resources");

    let rows = match collection.to_value(true) {
        Value::Array(rows) => rows,
        other => vec![other],
    };
    exec.say_list(rows, json)
}
