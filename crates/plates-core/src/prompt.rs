//! Line-based operator prompts
//!
//! [`Prompter`] is the seam between rendering and the operator. The plain
//! [`LinePrompter`] reads lines from any `BufRead`, which is what runs when the
//! input is piped (and what tests script). The cliclack variant lives in
//! [`crate::tui`].

use std::io::{self, BufRead, Stdin, StdinLock, Stdout, Write};
use thiserror::Error;

/// Failure to obtain an answer from the operator
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("input closed while waiting for '{label}'")]
    Closed { label: String },

    #[error("failed to read '{label}': {source}")]
    Io {
        label: String,
        #[source]
        source: io::Error,
    },
}

/// Asks the operator for a named value
///
/// Implementations never return an empty string: blank answers are asked
/// again. They do not cache; memoization is the function environment's job.
pub trait Prompter {
    fn ask(&mut self, label: &str) -> Result<String, PromptError>;
}

/// Prompter over a line reader and a writer
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Read one line, mapping end of input to [`PromptError::Closed`]
    fn read_answer(&mut self, label: &str) -> Result<String, PromptError> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|source| PromptError::Io {
                label: label.to_string(),
                source,
            })?;

        if read == 0 {
            return Err(PromptError::Closed {
                label: label.to_string(),
            });
        }

        Ok(line.trim().to_string())
    }

    fn write_prompt(&mut self, label: &str, text: &str) -> Result<(), PromptError> {
        write!(self.output, "{}", text)
            .and_then(|_| self.output.flush())
            .map_err(|source| PromptError::Io {
                label: label.to_string(),
                source,
            })
    }

    /// Numeric template menu
    ///
    /// Lists `names` as `  1 - name` and asks until the answer is a number in
    /// range. Returns the chosen name.
    pub fn choose(&mut self, names: &[String]) -> Result<String, PromptError> {
        const LABEL: &str = "template";

        let mut menu = String::from("Available templates:\n\n");
        for (i, name) in names.iter().enumerate() {
            menu.push_str(&format!("  {} - {}\n", i + 1, name));
        }
        menu.push('\n');
        self.write_prompt(LABEL, &menu)?;

        loop {
            self.write_prompt(
                LABEL,
                &format!("Choose your template [1-{}]: ", names.len()),
            )?;
            let answer = self.read_answer(LABEL)?;

            if let Ok(choice) = answer.parse::<usize>() {
                if (1..=names.len()).contains(&choice) {
                    return Ok(names[choice - 1].clone());
                }
            }
        }
    }

    /// Give back the underlying reader and writer
    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl LinePrompter<StdinLock<'static>, Stdout> {
    /// Prompter over the process's stdin and stdout
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(stdin.lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, label: &str) -> Result<String, PromptError> {
        loop {
            self.write_prompt(label, &format!("> {}: ", label))?;
            let answer = self.read_answer(label)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
        }
    }
}
