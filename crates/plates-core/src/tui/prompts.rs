//! Charm-style prompts and reporting using cliclack

use crate::prompt::{PromptError, Prompter};
use crate::report::Reporter;

/// Prompter backed by `cliclack::input`
#[derive(Debug, Default)]
pub struct CliclackPrompter;

impl CliclackPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for CliclackPrompter {
    fn ask(&mut self, label: &str) -> Result<String, PromptError> {
        loop {
            let answer: String = cliclack::input(label)
                .interact()
                .map_err(|source| PromptError::Io {
                    label: label.to_string(),
                    source,
                })?;

            let answer = answer.trim();
            if !answer.is_empty() {
                return Ok(answer.to_string());
            }
        }
    }
}

/// Let the operator pick one of `names`
pub fn select_template(names: &[String]) -> Result<String, PromptError> {
    let mut select = cliclack::select("Select a template");
    for name in names {
        select = select.item(name.clone(), name, "");
    }

    select.interact().map_err(|source| PromptError::Io {
        label: "template".to_string(),
        source,
    })
}

/// Reporter routing messages through `cliclack::log`
#[derive(Debug, Clone, Copy)]
pub struct CliclackReporter {
    verbose: bool,
}

impl CliclackReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Reporter for CliclackReporter {
    fn info(&self, message: &str) {
        if self.verbose {
            let _ = cliclack::log::info(message);
        }
    }

    fn detail(&self, message: &str) {
        if self.verbose {
            let _ = cliclack::log::remark(message);
        }
    }

    fn warn(&self, message: &str) {
        let _ = cliclack::log::warning(message);
    }

    fn fatal(&self, message: &str) -> ! {
        let _ = cliclack::log::error(message);
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(1);
    }
}
