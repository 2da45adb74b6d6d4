//! Choice resolution
//!
//! Some inputs are identifiers of remote resources (a cloud account id, a
//! package id). Their candidate sets are fetched from an endpoint on first
//! use, matched against what the user typed, and offered as a menu when the
//! value is missing or does not match and a terminal is attached.

use crate::cli::adapters::Prompter;
use crate::cli::error::{ChoiceError, CliError, CliResult};
use std::collections::HashMap;
use std::fmt;

/// Category of selectable values tied to one input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChoiceDomain {
    CloudAccount,
    Backup,
    Package,
    App,
    Cloud,
}

impl fmt::Display for ChoiceDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = match self {
            ChoiceDomain::CloudAccount => "cloud accounts",
            ChoiceDomain::Backup => "backups",
            ChoiceDomain::Package => "packages",
            ChoiceDomain::App => "apps",
            ChoiceDomain::Cloud => "clouds",
        };
        f.write_str(plural)
    }
}

/// One candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Value the input resolves to
    pub key: String,
    /// Unformatted value users usually type (domain name, location code)
    pub value: String,
    /// Formatted text shown in menus
    pub label: String,
}

/// Ordered candidates; earlier entries have priority
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoiceSet {
    choices: Vec<Choice>,
}

impl ChoiceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        label: impl Into<String>,
    ) {
        self.choices.push(Choice {
            key: key.into(),
            value: value.into(),
            label: label.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Choice> {
        self.choices.iter()
    }

    pub fn labels(&self) -> Vec<String> {
        self.choices.iter().map(|c| c.label.clone()).collect()
    }

    /// Find the candidate a user-supplied value refers to.
    ///
    /// A number typed against numeric keys only ever matches a key exactly.
    /// Anything else is tried as an exact key, then a case-insensitive
    /// equality with the raw value, then a case-insensitive substring of the
    /// raw value that hits exactly one candidate. Menu labels are never
    /// matched; they carry padding and decorations such as the key itself.
    pub fn find(&self, provided: &str) -> Option<&Choice> {
        let provided = provided.trim();
        if provided.is_empty() {
            return None;
        }

        if let Some(choice) = self.choices.iter().find(|c| c.key == provided) {
            return Some(choice);
        }
        if is_numeric(provided) && self.has_numeric_keys() {
            return None;
        }

        let needle = provided.to_lowercase();
        if let Some(choice) = self
            .choices
            .iter()
            .find(|c| c.value.to_lowercase() == needle)
        {
            return Some(choice);
        }

        let mut hits = self
            .choices
            .iter()
            .filter(|c| c.value.to_lowercase().contains(&needle));
        match (hits.next(), hits.next()) {
            (Some(choice), None) => Some(choice),
            _ => None,
        }
    }

    fn has_numeric_keys(&self) -> bool {
        !self.choices.is_empty() && self.choices.iter().all(|c| is_numeric(&c.key))
    }
}

fn is_numeric(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

impl FromIterator<Choice> for ChoiceSet {
    fn from_iter<I: IntoIterator<Item = Choice>>(iter: I) -> Self {
        Self {
            choices: iter.into_iter().collect(),
        }
    }
}

/// What is being resolved
#[derive(Debug, Clone, Copy)]
pub struct ChoiceRequest<'a> {
    pub input: &'a str,
    pub domain: ChoiceDomain,
    /// Menu heading when prompting
    pub prompt: &'a str,
}

/// Resolves choice inputs for a single command invocation.
///
/// Candidate sets are cached by input name and dropped with the resolver.
pub struct ChoiceResolver<'a> {
    prompter: &'a dyn Prompter,
    interactive: bool,
    cache: HashMap<String, ChoiceSet>,
}

impl<'a> ChoiceResolver<'a> {
    pub fn new(prompter: &'a dyn Prompter, interactive: bool) -> Self {
        Self {
            prompter,
            interactive,
            cache: HashMap::new(),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Candidate set for `input`, fetched on first use
    pub fn choices<F>(&mut self, input: &str, fetch: F) -> CliResult<&ChoiceSet>
    where
        F: FnOnce() -> CliResult<ChoiceSet>,
    {
        if !self.cache.contains_key(input) {
            let set = fetch()?;
            tracing::debug!(input, candidates = set.len(), "fetched choices");
            self.cache.insert(input.to_string(), set);
        }
        self.cache
            .get(input)
            .ok_or_else(|| CliError::Prompt(format!("choices for '{}' are unavailable", input)))
    }

    /// Resolve `provided` (or its absence) to a candidate key
    pub fn resolve<F>(
        &mut self,
        request: ChoiceRequest<'_>,
        provided: Option<&str>,
        fetch: F,
    ) -> CliResult<String>
    where
        F: FnOnce() -> CliResult<ChoiceSet>,
    {
        let interactive = self.interactive;
        let prompter = self.prompter;
        let set = self.choices(request.input, fetch)?;

        if let Some(value) = provided {
            if let Some(choice) = set.find(value) {
                tracing::debug!(input = request.input, key = %choice.key, "matched choice");
                return Ok(choice.key.clone());
            }
            if !interactive {
                return Err(ChoiceError::NoMatch {
                    input: request.input.to_string(),
                    value: value.to_string(),
                }
                .into());
            }
            tracing::debug!(input = request.input, value, "no matching choice, prompting");
        }

        if set.is_empty() {
            return Err(ChoiceError::NoChoices {
                input: request.input.to_string(),
                domain: request.domain,
            }
            .into());
        }

        if !interactive {
            return match set.iter().next() {
                Some(only) if set.len() == 1 => {
                    tracing::debug!(
                        input = request.input,
                        key = %only.key,
                        "auto-selected only choice"
                    );
                    Ok(only.key.clone())
                }
                _ => Err(ChoiceError::Ambiguous {
                    input: request.input.to_string(),
                    count: set.len(),
                }
                .into()),
            };
        }

        let index = prompter.select(request.prompt, &set.labels())?;
        set.iter()
            .nth(index)
            .map(|choice| choice.key.clone())
            .ok_or_else(|| CliError::Prompt(format!("selection {} is out of range", index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_utils::mocks::ScriptedPrompter;
    use std::cell::Cell;

    fn accounts() -> ChoiceSet {
        let mut set = ChoiceSet::new();
        set.push("1", "alpha.example.com", "alpha.example.com (1)");
        set.push("2", "beta.example.com", "beta.example.com  (2)");
        set.push("3", "gamma.test", "gamma.test        (3)");
        set
    }

    fn request(input: &str) -> ChoiceRequest<'_> {
        ChoiceRequest {
            input,
            domain: ChoiceDomain::CloudAccount,
            prompt: "Choose a cloud account",
        }
    }

    #[test]
    fn test_find_order() {
        let set = accounts();
        assert_eq!(set.find("2").unwrap().key, "2");
        assert_eq!(set.find("GAMMA.TEST").unwrap().key, "3");
        assert_eq!(set.find("beta").unwrap().key, "2");
        // "example" hits two candidates
        assert!(set.find("example").is_none());
        assert!(set.find("").is_none());
    }

    #[test]
    fn test_unknown_numeric_key_never_matches_labels() {
        let mut set = ChoiceSet::new();
        set.push("42", "example.com", "example.com      (42)");
        set.push("43", "shop.example.org", "shop.example.org (43)");

        assert!(set.find("3").is_none());
        assert!(set.find("4").is_none());
        assert_eq!(set.find(" 43 ").unwrap().key, "43");
        // the padded label is not matched either
        assert!(set.find("(42)").is_none());
    }

    #[test]
    fn test_digits_match_raw_values_of_text_keys() {
        let mut set = ChoiceSet::new();
        set.push("backup-2023.tgz", "backup-2023.tgz", "backup-2023.tgz (1 MB)");
        set.push("backup-2024.tgz", "backup-2024.tgz", "backup-2024.tgz (2 MB)");

        assert_eq!(set.find("2024").unwrap().key, "backup-2024.tgz");
    }

    #[test]
    fn test_zero_candidates_is_no_choices() {
        let prompter = ScriptedPrompter::non_interactive();
        let mut resolver = ChoiceResolver::new(&prompter, false);
        let err = resolver
            .resolve(request("cloud_account_id"), None, || Ok(ChoiceSet::new()))
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Choice(ChoiceError::NoChoices {
                domain: ChoiceDomain::CloudAccount,
                ..
            })
        ));
    }

    #[test]
    fn test_single_candidate_auto_selected_without_prompt() {
        let prompter = ScriptedPrompter::non_interactive();
        let mut resolver = ChoiceResolver::new(&prompter, false);
        let mut set = ChoiceSet::new();
        set.push("9", "only.example.com", "only.example.com (9)");

        let key = resolver
            .resolve(request("cloud_account_id"), None, || Ok(set))
            .unwrap();
        assert_eq!(key, "9");
        assert_eq!(prompter.prompts(), 0);
    }

    #[test]
    fn test_mismatch_is_rejected_even_with_one_candidate() {
        let prompter = ScriptedPrompter::non_interactive();
        let mut resolver = ChoiceResolver::new(&prompter, false);
        let mut set = ChoiceSet::new();
        set.push("9", "only.example.com", "only.example.com (9)");

        let err = resolver
            .resolve(request("cloud_account_id"), Some("nope"), || Ok(set))
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Choice(ChoiceError::NoMatch { ref value, .. }) if value == "nope"
        ));
    }

    #[test]
    fn test_several_candidates_non_interactive_is_ambiguous() {
        let prompter = ScriptedPrompter::non_interactive();
        let mut resolver = ChoiceResolver::new(&prompter, false);
        let err = resolver
            .resolve(request("cloud_account_id"), None, || Ok(accounts()))
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Choice(ChoiceError::Ambiguous { count: 3, .. })
        ));
    }

    #[test]
    fn test_interactive_prompts_after_mismatch() {
        let prompter = ScriptedPrompter::with_selections(vec![2]);
        let mut resolver = ChoiceResolver::new(&prompter, true);
        let key = resolver
            .resolve(request("cloud_account_id"), Some("nope"), || Ok(accounts()))
            .unwrap();
        assert_eq!(key, "3");
        assert_eq!(prompter.prompts(), 1);
    }

    #[test]
    fn test_candidates_fetched_once_per_input() {
        let prompter = ScriptedPrompter::non_interactive();
        let mut resolver = ChoiceResolver::new(&prompter, false);
        let calls = Cell::new(0);
        let fetch = || {
            calls.set(calls.get() + 1);
            Ok(accounts())
        };

        resolver
            .resolve(request("cloud_account_id"), Some("alpha"), fetch)
            .unwrap();
        resolver
            .resolve(request("cloud_account_id"), Some("beta"), || {
                calls.set(calls.get() + 1);
                Ok(accounts())
            })
            .unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_fetch_error_propagates() {
        let prompter = ScriptedPrompter::non_interactive();
        let mut resolver = ChoiceResolver::new(&prompter, false);
        let err = resolver
            .resolve(request("cloud_account_id"), None, || {
                Err(CliError::RemoteOperation("503".into()))
            })
            .unwrap_err();
        assert!(matches!(err, CliError::RemoteOperation(_)));
    }
}
