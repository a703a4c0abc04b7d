//! Functions callable from template actions

use super::render::RenderError;
use crate::prompt::Prompter;
use std::collections::HashMap;
use std::fmt;

/// Literal argument in a function call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Str(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{:?}", s),
        }
    }
}

/// Expected type of a function parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Non-negative integer literal
    Index,
    /// String literal
    Text,
}

impl ArgKind {
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ArgKind::Index, Value::Int(n)) => *n >= 0,
            (ArgKind::Text, Value::Str(_)) => true,
            _ => false,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ArgKind::Index => "a non-negative integer",
            ArgKind::Text => "a string",
        }
    }
}

/// Function table bound into the parser and the renderer
///
/// The parser only needs [`Functions::signature`] to reject unknown names and
/// bad arguments up front; [`Functions::call`] runs at render time.
pub trait Functions {
    fn signature(&self, name: &str) -> Option<&'static [ArgKind]>;

    fn call(&mut self, name: &str, args: &[Value]) -> Result<String, RenderError>;
}

const ARGS_SIGNATURE: &[ArgKind] = &[ArgKind::Index];
const ASK_SIGNATURE: &[ArgKind] = &[ArgKind::Text];

/// Per-execution environment: positional arguments plus the prompt memo
///
/// Exposes `args N` and `ask "label"` to templates. Each distinct label is
/// asked at most once for the lifetime of the environment.
pub struct FuncEnv<'p> {
    args: Vec<String>,
    answers: HashMap<String, String>,
    prompter: &'p mut dyn Prompter,
}

impl<'p> FuncEnv<'p> {
    pub fn new(args: Vec<String>, prompter: &'p mut dyn Prompter) -> Self {
        Self {
            args,
            answers: HashMap::new(),
            prompter,
        }
    }

    /// Positional argument `index`, or a usage error listing what is available
    pub fn arg(&self, index: usize) -> Result<&str, RenderError> {
        self.args
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| RenderError::MissingArgument {
                index,
                available: self.args.clone(),
            })
    }

    /// Memoized prompt
    pub fn ask_once(&mut self, label: &str) -> Result<String, RenderError> {
        if let Some(answer) = self.answers.get(label) {
            return Ok(answer.clone());
        }

        let answer = self.prompter.ask(label)?;
        self.answers.insert(label.to_string(), answer.clone());
        Ok(answer)
    }
}

impl Functions for FuncEnv<'_> {
    fn signature(&self, name: &str) -> Option<&'static [ArgKind]> {
        match name {
            "args" => Some(ARGS_SIGNATURE),
            "ask" => Some(ASK_SIGNATURE),
            _ => None,
        }
    }

    fn call(&mut self, name: &str, args: &[Value]) -> Result<String, RenderError> {
        match (name, args) {
            ("args", [Value::Int(index)]) if *index >= 0 => {
                let index = usize::try_from(*index).unwrap_or(usize::MAX);
                self.arg(index).map(str::to_string)
            }
            ("ask", [Value::Str(label)]) => self.ask_once(label),
            _ => Err(RenderError::BadCall {
                name: name.to_string(),
                args: args.iter().map(Value::to_string).collect(),
            }),
        }
    }
}
