//! Plate file parser
//!
//! Supports the subset of Go's `text/template` syntax that plate files use:
//! `{{define "name"}}...{{end}}`, `{{template "name"}}`, `{{/* comments */}}`,
//! `{{-`/`-}}` whitespace trimming, string literals and calls to the functions
//! exposed by the bound [`Functions`] table. Unknown functions and malformed
//! actions are rejected here rather than at render time.

use super::funcs::{Functions, Value};
use super::{Block, Node, TemplateDefinition};
use thiserror::Error;

/// Syntax error with its position in the template source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("template: {template}:{line}:{column}: {message}")]
pub struct ParseError {
    pub template: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Parse `source` into a [`TemplateDefinition`] named `name`
pub fn parse_template(
    name: &str,
    source: &str,
    funcs: &dyn Functions,
) -> Result<TemplateDefinition, ParseError> {
    Parser {
        template: name,
        source,
        funcs,
    }
    .parse()
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Int(i64),
    Str(String),
    Dot,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("identifier '{}'", s),
            Token::Int(n) => format!("number {}", n),
            Token::Str(s) => format!("string {:?}", s),
            Token::Dot => "'.'".to_string(),
        }
    }
}

/// One `{{ ... }}` action located in the source
struct Action<'a> {
    body: &'a str,
    start: usize,
    end: usize,
    trim_left: bool,
    trim_right: bool,
}

/// A `define` whose `end` has not been seen yet
struct OpenDefine {
    name: String,
    opened_at: usize,
    body_start: usize,
    nodes: Vec<Node>,
}

struct Parser<'a> {
    template: &'a str,
    source: &'a str,
    funcs: &'a dyn Functions,
}

impl<'a> Parser<'a> {
    fn error(&self, offset: usize, message: impl Into<String>) -> ParseError {
        let before = &self.source[..offset.min(self.source.len())];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;

        ParseError {
            template: self.template.to_string(),
            line,
            column,
            message: message.into(),
        }
    }

    fn parse(&self) -> Result<TemplateDefinition, ParseError> {
        let mut blocks = vec![Block::new(String::new(), String::new(), Vec::new())];
        let mut root_nodes = Vec::new();
        let mut open: Option<OpenDefine> = None;
        let mut cursor = 0;
        let mut trim_next = false;

        loop {
            let next = self.source[cursor..].find("{{").map(|i| cursor + i);
            let mut text = &self.source[cursor..next.unwrap_or(self.source.len())];
            if trim_next {
                text = text.trim_start();
            }

            let Some(start) = next else {
                push_text(target(&mut open, &mut root_nodes), text);
                break;
            };

            let action = self.scan_action(start)?;
            if action.trim_left {
                text = text.trim_end();
            }
            push_text(target(&mut open, &mut root_nodes), text);
            trim_next = action.trim_right;
            cursor = action.end;

            self.apply(&action, &mut open, &mut root_nodes, &mut blocks)?;
        }

        if let Some(frame) = open {
            return Err(self.error(
                frame.opened_at,
                format!("unexpected EOF: define \"{}\" is never closed", frame.name),
            ));
        }

        blocks[0] = Block::new(String::new(), String::new(), root_nodes);
        Ok(TemplateDefinition::new(self.template.to_string(), blocks))
    }

    /// Locate the action starting at `start` (which points at `{{`)
    fn scan_action(&self, start: usize) -> Result<Action<'a>, ParseError> {
        let source = self.source;
        let bytes = source.as_bytes();

        let mut body_start = start + 2;
        let trim_left = is_trim_marker(&source[body_start..]);
        if trim_left {
            body_start += 2;
        }

        let mut i = body_start;
        let mut quote: Option<u8> = None;
        let close = loop {
            if i >= bytes.len() {
                return Err(self.error(start, "unclosed action"));
            }
            let b = bytes[i];
            match quote {
                Some(b'"') => match b {
                    b'\\' => i += 1,
                    b'"' => quote = None,
                    b'\n' => return Err(self.error(i, "unterminated quoted string")),
                    _ => {}
                },
                Some(_) => {
                    if b == b'`' {
                        quote = None;
                    }
                }
                None => {
                    if bytes[i..].starts_with(b"/*") {
                        match source[i + 2..].find("*/") {
                            Some(rel) => {
                                i += 2 + rel + 2;
                                continue;
                            }
                            None => return Err(self.error(i, "unclosed comment")),
                        }
                    }
                    if bytes[i..].starts_with(b"}}") {
                        break i;
                    }
                    if b == b'"' || b == b'`' {
                        quote = Some(b);
                    }
                }
            }
            i += 1;
        };

        let mut body = &source[body_start..close];
        let trim_right = body
            .strip_suffix('-')
            .is_some_and(|rest| rest.ends_with(|c: char| c.is_ascii_whitespace()));
        if trim_right {
            body = &body[..body.len() - 1];
        }

        Ok(Action {
            body,
            start,
            end: close + 2,
            trim_left,
            trim_right,
        })
    }

    fn apply(
        &self,
        action: &Action<'_>,
        open: &mut Option<OpenDefine>,
        root_nodes: &mut Vec<Node>,
        blocks: &mut Vec<Block>,
    ) -> Result<(), ParseError> {
        let body = action.body.trim();

        if body.starts_with("/*") {
            if !body.ends_with("*/") {
                return Err(self.error(action.start, "comment ends before closing delimiter"));
            }
            return Ok(());
        }

        let tokens = self.tokenize(body, action.start)?;

        match tokens.as_slice() {
            [] => Err(self.error(action.start, "missing value for command")),

            [Token::Ident(kw), rest @ ..] if kw == "define" => {
                let name = match rest {
                    [Token::Str(name)] => name.clone(),
                    _ => return Err(self.error(action.start, "define expects a quoted name")),
                };
                if name.is_empty() {
                    return Err(self.error(action.start, "define name must not be empty"));
                }
                if let Some(outer) = open.as_ref() {
                    return Err(self.error(
                        action.start,
                        format!(
                            "define \"{}\" inside define \"{}\": defines must be at the top level",
                            name, outer.name
                        ),
                    ));
                }
                *open = Some(OpenDefine {
                    name,
                    opened_at: action.start,
                    body_start: action.end,
                    nodes: Vec::new(),
                });
                Ok(())
            }

            [Token::Ident(kw), rest @ ..] if kw == "end" => {
                if !rest.is_empty() {
                    return Err(self.error(action.start, "unexpected arguments to end"));
                }
                let Some(frame) = open.take() else {
                    return Err(self.error(action.start, "unexpected {{end}}"));
                };
                let raw_body = self.source[frame.body_start..action.start].to_string();
                let block = Block::new(frame.name, raw_body, frame.nodes);

                // Later definitions replace earlier ones in place; a blank one
                // never overwrites an existing body
                let existing = blocks.iter().position(|b| b.name() == block.name());
                match existing {
                    Some(_) if block.is_blank() => {}
                    Some(i) => blocks[i] = block,
                    None => blocks.push(block),
                }
                Ok(())
            }

            [Token::Ident(kw), rest @ ..] if kw == "template" => {
                let name = match rest {
                    [Token::Str(name)] | [Token::Str(name), Token::Dot] => name.clone(),
                    _ => return Err(self.error(action.start, "template expects a quoted name")),
                };
                target(open, root_nodes).push(Node::Include(name));
                Ok(())
            }

            [Token::Ident(kw), ..] if is_unsupported_keyword(kw) => Err(self.error(
                action.start,
                format!("'{}' actions are not supported in plate templates", kw),
            )),

            [Token::Ident(name), rest @ ..] => {
                let node = self.call(name, rest, action.start)?;
                target(open, root_nodes).push(node);
                Ok(())
            }

            [Token::Str(text)] => {
                target(open, root_nodes).push(Node::Text(text.clone()));
                Ok(())
            }

            [Token::Int(n)] => {
                target(open, root_nodes).push(Node::Text(n.to_string()));
                Ok(())
            }

            [first, ..] => Err(self.error(
                action.start,
                format!("unexpected {} in action", first.describe()),
            )),
        }
    }

    /// Validate a function call against the bound function table
    fn call(&self, name: &str, rest: &[Token], offset: usize) -> Result<Node, ParseError> {
        let Some(signature) = self.funcs.signature(name) else {
            return Err(self.error(offset, format!("function \"{}\" not defined", name)));
        };

        if signature.len() != rest.len() {
            return Err(self.error(
                offset,
                format!(
                    "wrong number of args for {}: want {} got {}",
                    name,
                    signature.len(),
                    rest.len()
                ),
            ));
        }

        let mut args = Vec::with_capacity(rest.len());
        for (i, (kind, token)) in signature.iter().zip(rest).enumerate() {
            let value = match token {
                Token::Int(n) => Value::Int(*n),
                Token::Str(s) => Value::Str(s.clone()),
                other => {
                    return Err(self.error(
                        offset,
                        format!("unexpected {} in call to {}", other.describe(), name),
                    ))
                }
            };
            if !kind.accepts(&value) {
                return Err(self.error(
                    offset,
                    format!("argument {} to {} must be {}", i + 1, name, kind.describe()),
                ));
            }
            args.push(value);
        }

        Ok(Node::Call {
            name: name.to_string(),
            args,
        })
    }

    fn tokenize(&self, body: &str, offset: usize) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        let mut chars = body.char_indices().peekable();

        while let Some(&(i, c)) = chars.peek() {
            if c.is_whitespace() {
                chars.next();
            } else if c == '"' {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some((_, '"')) => break,
                        Some((_, '\\')) => match chars.next() {
                            Some((_, 'n')) => value.push('\n'),
                            Some((_, 't')) => value.push('\t'),
                            Some((_, 'r')) => value.push('\r'),
                            Some((_, '"')) => value.push('"'),
                            Some((_, '\\')) => value.push('\\'),
                            Some((_, other)) => {
                                return Err(
                                    self.error(offset, format!("unknown escape sequence \\{}", other))
                                )
                            }
                            None => return Err(self.error(offset, "unterminated quoted string")),
                        },
                        Some((_, ch)) => value.push(ch),
                        None => return Err(self.error(offset, "unterminated quoted string")),
                    }
                }
                tokens.push(Token::Str(value));
            } else if c == '`' {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some((_, '`')) => break,
                        Some((_, ch)) => value.push(ch),
                        None => return Err(self.error(offset, "unterminated raw string")),
                    }
                }
                tokens.push(Token::Str(value));
            } else if c.is_ascii_digit() || (c == '-' && starts_with_digit(&body[i + 1..])) {
                let end = body[i + 1..]
                    .find(|ch: char| !ch.is_ascii_digit())
                    .map(|e| i + 1 + e)
                    .unwrap_or(body.len());
                let literal = &body[i..end];
                let n = literal
                    .parse::<i64>()
                    .map_err(|_| self.error(offset, format!("bad number syntax: {}", literal)))?;
                tokens.push(Token::Int(n));
                while chars.peek().is_some_and(|&(j, _)| j < end) {
                    chars.next();
                }
            } else if c.is_alphabetic() || c == '_' {
                let end = body[i..]
                    .find(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
                    .map(|e| i + e)
                    .unwrap_or(body.len());
                tokens.push(Token::Ident(body[i..end].to_string()));
                while chars.peek().is_some_and(|&(j, _)| j < end) {
                    chars.next();
                }
            } else if c == '.' {
                chars.next();
                tokens.push(Token::Dot);
            } else if c == '|' || c == '(' || c == '$' {
                return Err(self.error(
                    offset,
                    format!("'{}' is not supported in plate templates", c),
                ));
            } else {
                return Err(self.error(offset, format!("unexpected {:?} in action", c)));
            }
        }

        Ok(tokens)
    }
}

/// Where nodes go: the open define, or the root
fn target<'v>(open: &'v mut Option<OpenDefine>, root: &'v mut Vec<Node>) -> &'v mut Vec<Node> {
    match open {
        Some(frame) => &mut frame.nodes,
        None => root,
    }
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if !text.is_empty() {
        nodes.push(Node::Text(text.to_string()));
    }
}

/// `-` followed by ASCII whitespace right after `{{`
fn is_trim_marker(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('-') && chars.next().is_some_and(|c| c.is_ascii_whitespace())
}

fn starts_with_digit(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
}

fn is_unsupported_keyword(word: &str) -> bool {
    matches!(
        word,
        "if" | "else" | "range" | "with" | "block" | "break" | "continue" | "nil"
    )
}
