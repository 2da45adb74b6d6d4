//! Summary rendering for command results

use colored::*;
use comfy_table::{presets::UTF8_FULL, Table};
use serde_json::Value;

/// Renders result structures as indented key/value text or tables
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryFormatter {
    styled: bool,
}

impl SummaryFormatter {
    /// `styled` turns on terminal colors for keys
    pub fn new(styled: bool) -> Self {
        Self { styled }
    }

    /// Key/value report.
    ///
    /// Every entry starts on a new line, indented two spaces per level
    /// starting at `depth + 1`. `key_label` maps a raw key to its display
    /// label.
    pub fn format_summary(
        &self,
        summary: &Value,
        depth: usize,
        key_label: &dyn Fn(&str) -> String,
    ) -> String {
        let depth = depth + 1;
        let indent = " ".repeat(depth * 2);
        let mut formatted = String::new();

        for (key, value) in entries(summary) {
            let label = key_label(&key);
            let label = if self.styled {
                label.green().to_string()
            } else {
                label
            };
            formatted.push_str(&format!("\n{}{}: ", indent, label));

            match value {
                Value::Object(_) | Value::Array(_) => {
                    formatted.push_str(&self.format_summary(value, depth, key_label));
                }
                Value::String(s) => formatted.push_str(s),
                Value::Number(n) => formatted.push_str(&n.to_string()),
                other => formatted.push_str(&pretty(other)),
            }
        }

        formatted
    }

    /// Table of rows.
    ///
    /// The header comes from the first row's keys, or from `summary_keys`
    /// when there are no rows. An empty list renders a single `no_data` row.
    pub fn render_table(
        &self,
        rows: &[Value],
        summary_keys: &[String],
        header_label: &dyn Fn(&str) -> String,
        no_data: &str,
    ) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);

        if rows.is_empty() {
            table.set_header(vec![no_data.to_string()]);
            table.add_row(vec![String::new()]);
            return table.to_string();
        }

        let keys: Vec<String> = match rows.first() {
            Some(Value::Object(first)) if !first.is_empty() => first.keys().cloned().collect(),
            _ => summary_keys.to_vec(),
        };

        table.set_header(keys.iter().map(|k| header_label(k)).collect::<Vec<_>>());
        for row in rows {
            let cells: Vec<String> = keys
                .iter()
                .map(|k| row.get(k).map(cell).unwrap_or_default())
                .collect();
            table.add_row(cells);
        }

        table.to_string()
    }

    /// Machine-readable output; no styling
    pub fn format_json(&self, details: &Value) -> serde_json::Result<String> {
        serde_json::to_string_pretty(details)
    }
}

fn entries(value: &Value) -> Vec<(String, &Value)> {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(key: &str) -> String {
        key.to_string()
    }

    #[test]
    fn test_nested_entries_indent_per_depth() {
        let formatter = SummaryFormatter::new(false);
        let out = formatter.format_summary(&json!({"a": 1, "b": {"c": 2}}), 0, &raw);
        assert_eq!(out, "\n  a: 1\n  b: \n    c: 2");
    }

    #[test]
    fn test_non_scalar_leaves_pretty_printed() {
        let formatter = SummaryFormatter::new(false);
        let out = formatter.format_summary(
            &json!({"complete": false, "note": null, "name": "x"}),
            0,
            &raw,
        );
        assert!(out.contains("\n  complete: false"));
        assert!(out.contains("\n  note: null"));
        assert!(out.contains("\n  name: x"));
    }

    #[test]
    fn test_key_labels_applied() {
        let formatter = SummaryFormatter::new(false);
        let label = |k: &str| if k == "filename" { "File".to_string() } else { k.to_string() };
        let out = formatter.format_summary(&json!({"filename": "a.tgz"}), 0, &label);
        assert_eq!(out, "\n  File: a.tgz");
    }

    #[test]
    fn test_array_entries_use_indexes() {
        let formatter = SummaryFormatter::new(false);
        let out = formatter.format_summary(&json!({"ips": ["10.0.0.1", "10.0.0.2"]}), 0, &raw);
        assert_eq!(out, "\n  ips: \n    0: 10.0.0.1\n    1: 10.0.0.2");
    }

    #[test]
    fn test_json_is_lossless() {
        let formatter = SummaryFormatter::new(false);
        let details = json!({"a": 1, "b": {"c": [1, 2, {"d": null}]}, "e": true});
        let decoded: Value =
            serde_json::from_str(&formatter.format_json(&details).unwrap()).unwrap();
        assert_eq!(decoded, details);
    }

    #[test]
    fn test_table_uses_first_row_keys() {
        let formatter = SummaryFormatter::new(false);
        let rows = vec![
            json!({"filename": "a.tgz", "filesize": "1 GB"}),
            json!({"filename": "b.tgz", "filesize": "2 GB"}),
        ];
        let out = formatter.render_table(&rows, &[], &raw, "No data");
        assert!(out.contains("filename"));
        assert!(out.contains("b.tgz"));
        let a = out.find("a.tgz").unwrap();
        let b = out.find("b.tgz").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_empty_table_has_placeholder_row() {
        let formatter = SummaryFormatter::new(false);
        let out = formatter.render_table(&[], &["filename".to_string()], &raw, "No data");
        assert!(out.contains("No data"));
        assert!(!out.contains("filename"));
    }
}
