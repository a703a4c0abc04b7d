//! Error types for template execution
//!
//! Every failure an execution can hit is an [`EngineError`]. Callers that only
//! care about the broad class (usage mistake, missing template, bad syntax, I/O,
//! closed prompt) can match on [`EngineError::kind`].

use crate::prompt::PromptError;
use crate::template::{ParseError, RenderError};
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Broad failure classes surfaced to the top level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad invocation or an `args` index the caller did not supply
    Usage,
    /// No definition file for the requested template
    Lookup,
    /// Malformed template source or unknown function
    Parse,
    /// Filesystem or subprocess failure
    Io,
    /// The operator's input stream closed or failed mid-prompt
    InteractiveRead,
}

/// Error returned by [`crate::Engine::execute`] and its helpers
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("template '{name}' not found (expected {})", .path.display())]
    TemplateNotFound { name: String, path: PathBuf },

    #[error("failed to read template {}: {source}", .path.display())]
    ReadTemplate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write file {}: {source}", .path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command `{command}` failed ({status}){}", stderr_suffix(.stderr))]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
}

impl EngineError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::TemplateNotFound { .. } => ErrorKind::Lookup,
            EngineError::Parse(_) => ErrorKind::Parse,
            EngineError::Render(RenderError::MissingArgument { .. }) => ErrorKind::Usage,
            EngineError::Render(RenderError::Prompt(_)) => ErrorKind::InteractiveRead,
            EngineError::Render(_) => ErrorKind::Parse,
            EngineError::ReadTemplate { .. }
            | EngineError::CreateDir { .. }
            | EngineError::WriteFile { .. }
            | EngineError::Spawn { .. }
            | EngineError::CommandFailed { .. } => ErrorKind::Io,
        }
    }
}

impl From<PromptError> for EngineError {
    fn from(err: PromptError) -> Self {
        EngineError::Render(RenderError::Prompt(err))
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(":\n{}", stderr)
    }
}
