//! Console output adapter

use crate::cli::error::CliResult;
use crate::cli::summary::SummaryFormatter;
use serde_json::Value;
use std::io::Write;

/// Destination for command output
pub trait ConsoleOutput {
    /// Emit a line of text on the primary channel
    fn say(&self, text: &str);

    /// Emit a line of text on the diagnostic channel
    fn say_err(&self, text: &str);

    /// Emit structured output
    fn say_json(&self, value: &Value) -> CliResult<()>;
}

/// Writes to the process stdout/stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }
}

impl ConsoleOutput for TerminalOutput {
    fn say(&self, text: &str) {
        println!("{}", text);
    }

    fn say_err(&self, text: &str) {
        eprintln!("{}", text);
    }

    fn say_json(&self, value: &Value) -> CliResult<()> {
        let rendered = SummaryFormatter::default().format_json(value)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", rendered)?;
        Ok(())
    }
}
