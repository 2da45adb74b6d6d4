//! Shared utility functions for CLI commands

use crate::cli::error::{ChoiceError, CliError};
use chrono::{DateTime, Utc};
use colored::*;
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

/// Display a user-friendly error message with suggestions
pub fn display_error_with_suggestions(error: &CliError, app_name: &str) {
    // clap already rendered it, usage line included
    if let CliError::Usage(rendered) = error {
        eprint!("{}", rendered);
        return;
    }

    eprintln!("{} {}", "Error:".red().bold(), error.to_string().red());

    match error {
        CliError::OperationTimeout { .. } => {
            eprintln!("{}", "Suggestions:".blue());
            eprintln!("   • The operation continues on the server; check on it later");
            eprintln!("   • Raise [polling] timeout_secs, or set it to 0 to wait indefinitely");
        }
        CliError::Choice(ChoiceError::Ambiguous { input, .. }) => {
            eprintln!("{}", "Suggestions:".blue());
            eprintln!(
                "   • Pass --{} explicitly, or run without --no-interaction",
                input.replace('_', "-")
            );
        }
        CliError::Choice(ChoiceError::NoMatch { input, .. }) => {
            eprintln!("{}", "Suggestions:".blue());
            eprintln!(
                "   • Run '{} <command> --help' to see how '{}' is matched",
                app_name, input
            );
        }
        CliError::InvalidFilter(_) => {
            eprintln!("{}", "Suggestions:".blue());
            eprintln!("   • Use one --filter per pair, e.g. --filter status:active");
        }
        _ => {}
    }
}

/// Right-pad `text` with spaces to `width` terminal columns
pub fn pad_display(text: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(text);
    format!("{}{}", text, " ".repeat(width.saturating_sub(current)))
}

/// Widest display width among `items`
pub fn max_display_width<'a>(items: impl IntoIterator<Item = &'a str>) -> usize {
    items
        .into_iter()
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0)
}

/// Format bytes with optional human-readable output
pub fn format_bytes(bytes: u64, human_readable: bool) -> String {
    if !human_readable {
        return bytes.to_string();
    }

    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Render a unix timestamp as `YYYY-MM-DD HH:MM:SS` (UTC)
pub fn format_timestamp(timestamp: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Render a `filedate` field, which the API sends as a number or a numeric string
pub fn format_filedate(value: &Value) -> Option<String> {
    let timestamp = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    format_timestamp(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_display_counts_columns() {
        assert_eq!(pad_display("ab", 4), "ab  ");
        // two wide characters occupy four columns
        assert_eq!(pad_display("東京", 5), "東京 ");
        assert_eq!(pad_display("toolong", 3), "toolong");
    }

    #[test]
    fn test_max_display_width() {
        assert_eq!(max_display_width(["a", "東京", "abc"]), 4);
        assert_eq!(max_display_width(Vec::<&str>::new()), 0);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512, true), "512 B");
        assert_eq!(format_bytes(2048, true), "2.00 KB");
        assert_eq!(format_bytes(2048, false), "2048");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp(1_700_000_000).as_deref(),
            Some("2023-11-14 22:13:20")
        );
    }

    #[test]
    fn test_format_filedate_accepts_strings() {
        use serde_json::json;

        assert_eq!(
            format_filedate(&json!(1_699_963_200)).as_deref(),
            Some("2023-11-14 12:00:00")
        );
        assert_eq!(
            format_filedate(&json!(" 1699963200 ")).as_deref(),
            Some("2023-11-14 12:00:00")
        );
        assert_eq!(format_filedate(&json!("yesterday")), None);
        assert_eq!(format_filedate(&json!(null)), None);
    }
}
