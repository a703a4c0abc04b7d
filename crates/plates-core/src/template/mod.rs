//! Template definitions: parsing, function environment and rendering
//!
//! A plate file is a set of `{{define "name"}}...{{end}}` blocks. Text outside
//! any define belongs to the unnamed root block, which is never materialized.
//! A block whose name starts with `# ` is a command set; every other named
//! block is a file path relative to the destination.

pub mod funcs;
pub mod parser;
pub mod render;

pub use funcs::{ArgKind, FuncEnv, Functions, Value};
pub use parser::{parse_template, ParseError};
pub use render::{render_block, RenderError};

/// Name prefix marking a command set
pub const COMMAND_PREFIX: &str = "# ";

/// What a named block turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Rendered, trimmed and written under the destination
    File,
    /// Rendered and run line by line
    Command,
}

impl BlockKind {
    /// Classify a block by name; `None` for the unnamed root
    pub fn of(name: &str) -> Option<BlockKind> {
        if name.is_empty() {
            None
        } else if name.starts_with(COMMAND_PREFIX) {
            Some(BlockKind::Command)
        } else {
            Some(BlockKind::File)
        }
    }
}

/// Piece of a parsed block body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal text, copied as is
    Text(String),
    /// Function call resolved against the bound [`Functions`]
    Call { name: String, args: Vec<Value> },
    /// `{{template "name"}}`: render another block in place
    Include(String),
}

/// Named fragment of a template definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    name: String,
    raw_body: String,
    nodes: Vec<Node>,
}

impl Block {
    pub(crate) fn new(name: String, raw_body: String, nodes: Vec<Node>) -> Self {
        Self {
            name,
            raw_body,
            nodes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Body exactly as written in the source, between the define tags
    ///
    /// Empty for the root block.
    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Body holds nothing but whitespace text
    pub fn is_blank(&self) -> bool {
        self.nodes
            .iter()
            .all(|node| matches!(node, Node::Text(text) if text.trim().is_empty()))
    }

    pub fn kind(&self) -> Option<BlockKind> {
        BlockKind::of(&self.name)
    }

    /// Command set name without the `# ` marker
    pub fn command_set_name(&self) -> &str {
        self.name
            .strip_prefix(COMMAND_PREFIX)
            .unwrap_or(&self.name)
    }
}

/// Parsed template: the root block followed by named blocks in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDefinition {
    name: String,
    blocks: Vec<Block>,
}

impl TemplateDefinition {
    pub(crate) fn new(name: String, blocks: Vec<Block>) -> Self {
        Self { name, blocks }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All blocks, root first
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, name: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.name == name)
    }

    /// Split named blocks into files and command sets, each in declaration order
    pub fn partition(&self) -> (Vec<&Block>, Vec<&Block>) {
        let mut files = Vec::new();
        let mut commands = Vec::new();

        for block in &self.blocks {
            match block.kind() {
                Some(BlockKind::File) => files.push(block),
                Some(BlockKind::Command) => commands.push(block),
                None => {}
            }
        }

        (files, commands)
    }
}
