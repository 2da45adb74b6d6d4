//! Markdown audit log of console command invocations.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only markdown log of commands, waits and outcomes.
///
/// Every write goes straight to the file; nothing is buffered between
/// invocations.
#[derive(Debug)]
pub struct CommandLog {
    log_file: PathBuf,
}

impl CommandLog {
    /// Open (or create) the log at `log_file`, creating parent directories.
    pub fn new(log_file: &Path) -> Result<Self> {
        if let Some(parent) = log_file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }

        let log = Self {
            log_file: log_file.to_path_buf(),
        };

        if !log.log_file.exists() {
            log.initialize_log_file()?;
        }

        Ok(log)
    }

    fn initialize_log_file(&self) -> Result<()> {
        let mut file = File::create(&self.log_file)
            .with_context(|| format!("Failed to create log file: {}", self.log_file.display()))?;

        let now: DateTime<Utc> = Utc::now();

        writeln!(file, "# Console Command Log\n")?;
        writeln!(file, "Log started: {}\n", now.to_rfc3339())?;
        writeln!(file, "---\n")?;

        Ok(())
    }

    fn append_to_log(&self, content: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .with_context(|| format!("Failed to open log file: {}", self.log_file.display()))?;

        write!(file, "{}", content).with_context(|| "Failed to write to log file")?;

        Ok(())
    }

    /// Log a command about to run with its raw arguments.
    pub fn log_invocation(&self, command: &str, args: &[String]) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let content = format!(
            "## {} - {}\n\n**Arguments:** `{}`\n\n",
            command,
            now.to_rfc3339(),
            args.join(" ")
        );
        self.append_to_log(&content)
    }

    /// Log the resolved inputs of a command.
    pub fn log_inputs(&self, inputs: &Value) -> Result<()> {
        let content = format!(
            "**Inputs:**\n```json\n{}\n```\n\n",
            serde_json::to_string_pretty(inputs).unwrap_or_default()
        );
        self.append_to_log(&content)
    }

    /// Log the start of a completion wait.
    pub fn log_wait(&self, operation: &str, timeout_secs: u64) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let bound = if timeout_secs == 0 {
            "unbounded".to_string()
        } else {
            format!("{}s", timeout_secs)
        };
        let content = format!(
            "### Waiting - {}\n\n**Operation:** {}\n**Timeout:** {}\n\n",
            now.to_rfc3339(),
            operation,
            bound
        );
        self.append_to_log(&content)
    }

    /// Log how a command ended.
    pub fn log_outcome(&self, command: &str, outcome: std::result::Result<u8, &str>) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let content = match outcome {
            Ok(code) => format!(
                "### Completed - {}\n\n**Command:** {}\n**Exit Code:** {}\n\n---\n\n",
                now.to_rfc3339(),
                command,
                code
            ),
            Err(error) => format!(
                "### Failed - {}\n\n**Command:** {}\n**Error:** {}\n\n---\n\n",
                now.to_rfc3339(),
                command,
                error
            ),
        };
        self.append_to_log(&content)
    }

    /// Get the log file path.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }
}
