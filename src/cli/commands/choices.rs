//! Candidate sets for each choice domain
//!
//! Labels come from phrases under `console.cloud_account.choices` so every
//! command offering the same domain shows the same menu.

use crate::cli::adapters::{EndpointName, ListFilter, Resource};
use crate::cli::choice::{ChoiceDomain, ChoiceSet};
use crate::cli::error::CliResult;
use crate::cli::executor::{CommandExecutor, Inputs};
use crate::cli::utils::{format_bytes, format_filedate, max_display_width, pad_display};
use serde_json::{json, Value};

const PHRASE_BASE: &str = "console.cloud_account.choices";

/// Menu heading phrase for a choice input
pub fn prompt_key(input: &str) -> String {
    format!("{}.choose_{}", PHRASE_BASE, input)
}

fn label_key(name: &str) -> String {
    format!("{}.{}", PHRASE_BASE, name)
}

/// Fetch the candidates for `domain`.
///
/// Backups depend on `cloud_account_id` already being resolved.
pub fn fetch(
    domain: ChoiceDomain,
    exec: &CommandExecutor<'_>,
    inputs: &Inputs,
) -> CliResult<ChoiceSet> {
    match domain {
        ChoiceDomain::CloudAccount => cloud_account_choices(exec),
        ChoiceDomain::Backup => backup_choices(exec, inputs.int("cloud_account_id")?),
        ChoiceDomain::Package => package_choices(exec),
        ChoiceDomain::App => app_choices(exec),
        ChoiceDomain::Cloud => cloud_choices(exec),
    }
}

fn text(resource: &dyn Resource, field: &str) -> String {
    match resource.get(field) {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Resources that have an id, paired with the id as the choice key
fn keyed<'r>(items: impl Iterator<Item = &'r dyn Resource>) -> Vec<(String, &'r dyn Resource)> {
    items
        .filter_map(|r| r.id().map(|id| (id.to_string(), r)))
        .collect()
}

fn cloud_account_choices(exec: &CommandExecutor<'_>) -> CliResult<ChoiceSet> {
    let accounts = exec.api().cloud_accounts()?.list(&ListFilter::new())?;
    let entries: Vec<(String, String)> = keyed(accounts.iter())
        .into_iter()
        .map(|(key, account)| (key, text(account, "domain")))
        .collect();
    let width = max_display_width(entries.iter().map(|(_, domain)| domain.as_str()));

    let mut set = ChoiceSet::new();
    for (key, domain) in entries {
        let padded = pad_display(&domain, width);
        let label = exec.describe(
            &label_key("cloud_account_desc"),
            &json!({"domain": padded, "id": key}),
            || format!("{} ({})", padded, key),
        );
        set.push(key, domain, label);
    }
    Ok(set)
}

fn backup_choices(exec: &CommandExecutor<'_>, cloud_account_id: i64) -> CliResult<ChoiceSet> {
    let backups = exec.api().cloud_accounts()?.backups(cloud_account_id)?;

    let mut set = ChoiceSet::new();
    for backup in &backups {
        let filename = backup.filename();
        let filesize = match backup.get("filesize") {
            Some(Value::Number(n)) => n
                .as_u64()
                .map(|b| format_bytes(b, true))
                .unwrap_or_else(|| n.to_string()),
            Some(Value::String(s)) => s,
            _ => String::new(),
        };
        let filedate = backup
            .get("filedate")
            .as_ref()
            .and_then(format_filedate)
            .unwrap_or_default();

        let label = exec.describe(
            &label_key("backup_desc"),
            &json!({"filename": filename, "filesize": filesize, "filedate": filedate}),
            || format!("{} ({}, {})", filename, filesize, filedate),
        );
        set.push(filename.clone(), filename, label);
    }
    Ok(set)
}

fn package_choices(exec: &CommandExecutor<'_>) -> CliResult<ChoiceSet> {
    let mut filter = ListFilter::new();
    filter.insert("type".to_string(), "virt-guest-cloud".to_string());
    let packages = exec.api().endpoint(EndpointName::Package)?.list(&filter)?;

    let mut set = ChoiceSet::new();
    for (key, package) in keyed(packages.iter()) {
        let name = text(package, "name");
        let label = exec.describe(&label_key("package_desc"), &package.to_value(false), || {
            name.clone()
        });
        set.push(key, name, label);
    }
    Ok(set)
}

fn app_choices(exec: &CommandExecutor<'_>) -> CliResult<ChoiceSet> {
    let apps = exec.api().endpoint(EndpointName::App)?.list(&ListFilter::new())?;
    let mut entries: Vec<(String, String)> = keyed(apps.iter())
        .into_iter()
        .map(|(key, app)| (key, text(app, "name")))
        .collect();
    // Flexible apps first, the rest alphabetical
    entries.sort_by(|(_, a), (_, b)| {
        (!a.contains("Flexible"), a.as_str()).cmp(&(!b.contains("Flexible"), b.as_str()))
    });

    let width = max_display_width(entries.iter().map(|(_, name)| name.as_str()));
    let mut set = ChoiceSet::new();
    for (key, name) in entries {
        let padded = format!(" {} ", pad_display(&name, width));
        let label = exec.describe(&label_key("app_desc"), &json!({"app": padded}), || {
            name.clone()
        });
        set.push(key, name, label);
    }
    Ok(set)
}

fn cloud_choices(exec: &CommandExecutor<'_>) -> CliResult<ChoiceSet> {
    let mut filter = ListFilter::new();
    filter.insert("status".to_string(), "active".to_string());
    let clouds = exec.api().endpoint(EndpointName::Cloud)?.list(&filter)?;
    let entries = keyed(clouds.iter());

    let locations: Vec<String> = entries.iter().map(|(_, c)| text(*c, "location")).collect();
    let width = max_display_width(locations.iter().map(String::as_str));

    let mut set = ChoiceSet::new();
    for ((key, cloud), location) in entries.into_iter().zip(locations) {
        let location_code = text(cloud, "location_code");
        let padded = format!(" {} ", pad_display(&location, width));
        let mut context = cloud.to_value(false);
        if let Some(map) = context.as_object_mut() {
            map.insert("location".to_string(), Value::String(padded.clone()));
        }
        let label = exec.describe(&label_key("cloud_desc"), &context, || {
            format!("{}({})", padded, location_code)
        });
        set.push(key, location_code, label);
    }
    Ok(set)
}
