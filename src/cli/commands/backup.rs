//! Cloud account backups: create, list and download

use crate::cli::adapters::{Backup, Endpoint, Resource};
use crate::cli::choice::ChoiceDomain;
use crate::cli::declarative::definition::{CommandDefinition, CommandKind, Company};
use crate::cli::declarative::spec::{FilterKind, OptDecl, ValueMode};
use crate::cli::error::{CliError, CliResult};
use crate::cli::executor::{expand_path, CommandExecutor, Inputs, UniversalFlags, WaitPolicy};
use crate::cli::utils::format_filedate;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

pub const CREATE: CommandDefinition = CommandDefinition {
    name: "cloud-account:backup:create",
    args: &[],
    opts: &[
        OptDecl::new("cloud-account-id|c", ValueMode::Required),
        OptDecl::new("download|d", ValueMode::Required),
    ],
    inputs: &[("cloud_account_id", FilterKind::Int)],
    choices: &[("cloud_account_id", ChoiceDomain::CloudAccount)],
    lookups: &[],
    required: &[],
    summary_keys: &["filename", "complete"],
    restrict_to: &[Company::Nexcess],
    kind: CommandKind::BackupCreate,
};

pub const LIST: CommandDefinition = CommandDefinition {
    name: "cloud-account:backup:list",
    args: &[],
    opts: &[OptDecl::new("cloud-account-id|c", ValueMode::Required)],
    inputs: &[("cloud_account_id", FilterKind::Int)],
    choices: &[("cloud_account_id", ChoiceDomain::CloudAccount)],
    lookups: &[],
    required: &[],
    summary_keys: &["filename", "filesize", "filedate"],
    restrict_to: &[Company::Nexcess],
    kind: CommandKind::BackupList,
};

pub const DOWNLOAD: CommandDefinition = CommandDefinition {
    name: "cloud-account:backup:download",
    args: &[],
    opts: &[
        OptDecl::new("cloud-account-id|c", ValueMode::Required),
        OptDecl::new("filename|f", ValueMode::Required),
        OptDecl {
            key: "path|p",
            mode: Some(ValueMode::Required),
            default: Some("."),
        },
    ],
    inputs: &[
        ("cloud_account_id", FilterKind::Int),
        ("filename", FilterKind::Raw),
    ],
    // cloud account first: the backup candidates depend on it
    choices: &[
        ("cloud_account_id", ChoiceDomain::CloudAccount),
        ("filename", ChoiceDomain::Backup),
    ],
    lookups: &[],
    required: &[],
    summary_keys: &["filename", "filesize", "filedate"],
    restrict_to: &[Company::Nexcess],
    kind: CommandKind::BackupDownload,
};

fn operation_name(backup: &dyn Backup) -> String {
    format!("backup {}", backup.filename())
}

/// Start a backup, then wait for it or download it as requested
pub(super) fn create(
    exec: &CommandExecutor<'_>,
    inputs: &Inputs,
    flags: UniversalFlags,
) -> CliResult<()> {
    let json = flags.json;
    exec.notice(json, "starting_backup", &Value::Null);

    let cloud_account_id = inputs.int("cloud_account_id")?;
    let accounts = exec.api().cloud_accounts()?;
    accounts.retrieve(cloud_account_id)?;

    let backup = accounts.create_backup(cloud_account_id)?;
    tracing::info!(cloud_account_id, filename = %backup.filename(), "backup started");
    exec.say_summary(&backup.to_value(false), json)?;

    let filename = backup.filename();
    let operation = operation_name(backup.as_ref());

    match WaitPolicy::from_request(flags.wait, inputs.option_text("download")) {
        WaitPolicy::WaitThenDownload(dir) => {
            exec.notice(json, "downloading", &Value::Null);
            let written = download_when_complete(exec, backup, &operation, dir)?;
            exec.notice(
                json,
                "download_complete",
                &json!({"filename": written.display().to_string()}),
            );
            exec.notice(json, "done", &Value::Null);
        }
        WaitPolicy::Wait => {
            exec.notice(json, "waiting", &Value::Null);
            let backup = exec.wait_for(backup, &operation).wait()?;
            exec.notice(
                json,
                "backup_complete",
                &json!({
                    "filename": backup.filename(),
                    "cloud_account_id": backup.cloud_account_id(),
                }),
            );
        }
        WaitPolicy::NoWait => {
            exec.notice(
                json,
                "backup_started",
                &json!({"filename": filename, "cloud_account_id": cloud_account_id}),
            );
        }
    }

    Ok(())
}

/// Wait for `backup`, download it into `dir` and return the written path
fn download_when_complete(
    exec: &CommandExecutor<'_>,
    backup: Box<dyn Backup>,
    operation: &str,
    dir: PathBuf,
) -> CliResult<PathBuf> {
    let written: Rc<RefCell<Option<PathBuf>>> = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&written);

    let backup = exec
        .wait_for(backup, operation)
        .then(move |backup| {
            let path = backup.download(&dir)?;
            tracing::info!(path = %path.display(), "backup downloaded");
            *slot.borrow_mut() = Some(path);
            Ok(backup)
        })
        .wait()?;

    let path = written.borrow_mut().take();
    Ok(path.unwrap_or_else(|| PathBuf::from(backup.filename())))
}

/// List the backups of a cloud account
pub(super) fn list(exec: &CommandExecutor<'_>, inputs: &Inputs, json: bool) -> CliResult<()> {
    let cloud_account_id = inputs.int("cloud_account_id")?;
    let accounts = exec.api().cloud_accounts()?;
    accounts.retrieve(cloud_account_id)?;

    let rows: Vec<Value> = accounts
        .backups(cloud_account_id)?
        .iter()
        .map(|backup| with_readable_date(backup.to_value(true)))
        .collect();
    exec.say_list(rows, json)
}

/// Replace a unix `filedate` with `%Y-%m-%d %H:%M:%S` (UTC)
fn with_readable_date(mut row: Value) -> Value {
    let formatted = row.get("filedate").and_then(format_filedate);

    if let (Some(formatted), Some(map)) = (formatted, row.as_object_mut()) {
        map.insert("filedate".to_string(), Value::String(formatted));
    }
    row
}

/// Download an existing backup, waiting first if it is still running
pub(super) fn download(exec: &CommandExecutor<'_>, inputs: &Inputs, json: bool) -> CliResult<()> {
    let cloud_account_id = inputs.int("cloud_account_id")?;
    let filename = inputs.text("filename").unwrap_or_default().to_string();
    let dir = expand_path(inputs.option_text("path").unwrap_or("."));

    let backup = exec
        .api()
        .cloud_accounts()?
        .backups(cloud_account_id)?
        .into_iter()
        .find(|b| b.filename() == filename)
        .ok_or_else(|| {
            CliError::invalid_input(
                "filename",
                Some(&filename),
                format!("no such backup for cloud account {}", cloud_account_id),
            )
        })?;

    exec.notice(json, "downloading", &Value::Null);
    let operation = operation_name(backup.as_ref());
    let written = download_when_complete(exec, backup, &operation, dir)?;

    let summary = json!({
        "filename": filename,
        "cloud_account_id": cloud_account_id,
        "path": written.display().to_string(),
    });
    if json {
        return exec.say_summary(&summary, true);
    }
    exec.notice(
        json,
        "download_complete",
        &json!({"filename": written.display().to_string()}),
    );
    exec.notice(json, "done", &Value::Null);
    Ok(())
}
