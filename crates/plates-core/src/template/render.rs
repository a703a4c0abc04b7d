//! Block rendering

use super::funcs::Functions;
use super::{Block, Node, TemplateDefinition};
use crate::prompt::PromptError;
use thiserror::Error;

/// Nesting limit for `{{template}}` includes
pub const MAX_INCLUDE_DEPTH: usize = 64;

/// Failure while rendering a block
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(
        "The current template requires Args[{index}].\nCurrent Args are:\n{}",
        list_args(.available)
    )]
    MissingArgument {
        index: usize,
        available: Vec<String>,
    },

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("template \"{0}\" is not defined")]
    UnknownBlock(String),

    #[error("exceeded maximum template depth ({depth}) while rendering \"{name}\"")]
    TooDeep { name: String, depth: usize },

    #[error("invalid call to {name}({})", .args.join(", "))]
    BadCall { name: String, args: Vec<String> },
}

fn list_args(args: &[String]) -> String {
    args.iter()
        .enumerate()
        .map(|(i, arg)| format!("  {}: {}", i, arg))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render `block` to a string, calling into `funcs` for every function node
///
/// The result is not trimmed; callers decide what to do with surrounding
/// whitespace.
pub fn render_block(
    definition: &TemplateDefinition,
    block: &Block,
    funcs: &mut dyn Functions,
) -> Result<String, RenderError> {
    let mut out = String::new();
    render_nodes(definition, block, funcs, &mut out, 0)?;
    Ok(out)
}

fn render_nodes(
    definition: &TemplateDefinition,
    block: &Block,
    funcs: &mut dyn Functions,
    out: &mut String,
    depth: usize,
) -> Result<(), RenderError> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(RenderError::TooDeep {
            name: block.name().to_string(),
            depth: MAX_INCLUDE_DEPTH,
        });
    }

    for node in block.nodes() {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Call { name, args } => out.push_str(&funcs.call(name, args)?),
            Node::Include(name) => {
                let included = definition
                    .block(name)
                    .ok_or_else(|| RenderError::UnknownBlock(name.clone()))?;
                render_nodes(definition, included, funcs, out, depth + 1)?;
            }
        }
    }

    Ok(())
}
