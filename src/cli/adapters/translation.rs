//! Translator adapter trait and a file-backed catalog
//!
//! Phrases are looked up by dotted key (`console.cloud_account.create.desc`).
//! A missing phrase is returned as the key itself; callers compare the
//! result with the key to detect "no translation".

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

const BUILTIN_PHRASES: &str = include_str!("../../../lang/en_US.toml");

/// Phrase lookup with `{name}` placeholder substitution
pub trait Translator {
    /// Translate `key`, substituting values from `context` (an object or null).
    /// Returns `key` unchanged when no phrase exists.
    fn translate(&self, key: &str, context: &Value) -> String;
}

/// In-memory phrase catalog, usually loaded from a TOML or JSON file
#[derive(Debug, Clone, Default)]
pub struct CatalogTranslator {
    phrases: HashMap<String, String>,
}

impl CatalogTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a single phrase
    pub fn with_phrase(mut self, key: impl Into<String>, phrase: impl Into<String>) -> Self {
        self.phrases.insert(key.into(), phrase.into());
        self
    }

    /// Build a catalog from nested tables; nested keys are joined with `.`
    pub fn from_value(value: &Value) -> Self {
        let mut phrases = HashMap::new();
        flatten("", value, &mut phrases);
        Self { phrases }
    }

    /// English phrases shipped with the crate
    pub fn builtin() -> Self {
        toml::from_str::<toml::Value>(BUILTIN_PHRASES)
            .ok()
            .and_then(|table| serde_json::to_value(table).ok())
            .map(|value| Self::from_value(&value))
            .unwrap_or_default()
    }

    /// Load a catalog file (`.toml` or `.json`)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read translation file: {}", path.display()))?;
        let value: Value = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON: {}", path.display()))?,
            _ => {
                let table: toml::Value = toml::from_str(&content)
                    .with_context(|| format!("Failed to parse TOML: {}", path.display()))?;
                serde_json::to_value(table)?
            }
        };
        Ok(Self::from_value(&value))
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{}.{}", prefix, k)
                };
                flatten(&key, v, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        Value::Null => {}
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

impl Translator for CatalogTranslator {
    fn translate(&self, key: &str, context: &Value) -> String {
        match self.phrases.get(key) {
            Some(phrase) => interpolate(phrase, context),
            None => key.to_string(),
        }
    }
}

/// Replace `{name}` placeholders with values from `context`
pub fn interpolate(phrase: &str, context: &Value) -> String {
    let Some(map) = context.as_object() else {
        return phrase.to_string();
    };
    let mut out = phrase.to_string();
    for (name, value) in map {
        let placeholder = format!("{{{}}}", name);
        if !out.contains(&placeholder) {
            continue;
        }
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        out = out.replace(&placeholder, &text);
    }
    out
}
