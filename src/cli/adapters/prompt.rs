//! Interactive prompt adapter

use crate::cli::error::CliResult;
use dialoguer::{Input, Select};
use std::io::IsTerminal;

/// Blocking user prompts
pub trait Prompter {
    /// Whether prompting is possible at all (attached terminal)
    fn is_interactive(&self) -> bool;

    /// Present `items` as a menu and return the chosen index
    fn select(&self, prompt: &str, items: &[String]) -> CliResult<usize>;

    /// Ask for a free-form value
    fn ask(&self, prompt: &str) -> CliResult<String>;
}

/// Terminal prompts backed by dialoguer
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for DialoguerPrompter {
    fn is_interactive(&self) -> bool {
        std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
    }

    fn select(&self, prompt: &str, items: &[String]) -> CliResult<usize> {
        let selection = Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()?;
        Ok(selection)
    }

    fn ask(&self, prompt: &str) -> CliResult<String> {
        let value: String = Input::new().with_prompt(prompt).interact_text()?;
        Ok(value)
    }
}
