//! Running rendered command sets
//!
//! A command set is split on newlines; each non-blank line is split on single
//! spaces into a program and its arguments. There is no shell and no quoting:
//! `echo "a b"` passes `"a` and `b"` as two arguments.

use crate::error::EngineError;
use crate::report::Reporter;
use std::fmt;
use tokio::process::Command;

/// One line of a command set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Split a line into program and arguments; `None` for blank lines
    pub fn parse(line: &str) -> Option<Self> {
        if line.trim().is_empty() {
            return None;
        }

        let mut parts = line.split(' ').map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Parsed lines of a rendered command set, blank lines dropped
pub fn command_lines(script: &str) -> Vec<CommandLine> {
    script.split('\n').filter_map(CommandLine::parse).collect()
}

/// Run `command` to completion, capturing its output
///
/// A start failure or a non-zero exit is an error. Captured stdout goes to
/// the reporter only when `stream_output` is set.
pub async fn run(
    command: &CommandLine,
    reporter: &dyn Reporter,
    stream_output: bool,
) -> Result<(), EngineError> {
    let output = Command::new(&command.program)
        .args(&command.args)
        .output()
        .await
        .map_err(|source| EngineError::Spawn {
            command: command.to_string(),
            source,
        })?;

    if stream_output {
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            reporter.detail(line);
        }
    }

    if !output.status.success() {
        return Err(EngineError::CommandFailed {
            command: command.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(())
}
