//! Minimal mustache-style template engine.
//!
//! Supports `{{variable}}` substitution and `{{#section}}...{{/section}}`
//! blocks rendered against a context stack. Missing variables render empty,
//! which existing templates rely on; malformed section markers are fatal.
//! Section and close tags that sit alone on a line are stripped together
//! with the line, so block markup does not leak blank lines into output.

use indexmap::IndexMap;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TemplateError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unclosed tag at offset {offset}")]
    UnclosedTag { offset: usize },

    #[error("empty tag at offset {offset}")]
    EmptyTag { offset: usize },

    #[error("section '{name}' is never closed")]
    UnclosedSection { name: String },

    #[error("section close '{name}' without a matching open")]
    UnexpectedClose { name: String },

    #[error("section close '{found}' does not match open section '{expected}'")]
    MismatchedClose { expected: String, found: String },
}

/// A context value the renderer can substitute or iterate.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    pub fn map(entries: impl IntoIterator<Item = (&'static str, Value)>) -> Value {
        Value::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        )
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Value {
        Value::List(items.into_iter().collect())
    }

    /// Text substituted for a `{{variable}}` occurrence.
    fn to_text(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            Value::Int(v) => v.to_string(),
            Value::Bool(v) => v.to_string(),
            // Compound values have no scalar rendering.
            Value::List(_) | Value::Map(_) => String::new(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Var(String),
    Section { name: String, children: Vec<Node> },
}

/// A parsed template, ready to render any number of contexts.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parse template source into an AST.
    pub fn parse(source: &str) -> Result<Template> {
        let mut pieces = tokenize(source)?;
        strip_standalone_lines(&mut pieces);
        Ok(Template {
            nodes: build_tree(pieces)?,
        })
    }

    /// Render against a context, usually a [`Value::Map`].
    pub fn render(&self, context: &Value) -> String {
        let mut out = String::new();
        let mut stack = vec![context];
        render_nodes(&self.nodes, &mut stack, &mut out);
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Text(String),
    Var(String),
    Open(String),
    Close(String),
}

fn tokenize(source: &str) -> Result<Vec<Piece>> {
    let mut pieces = Vec::new();
    let mut pos = 0;

    while let Some(found) = source[pos..].find("{{") {
        let tag_start = pos + found;
        if tag_start > pos {
            pieces.push(Piece::Text(source[pos..tag_start].to_string()));
        }
        let Some(close) = source[tag_start + 2..].find("}}") else {
            return Err(TemplateError::UnclosedTag { offset: tag_start });
        };
        let inner = source[tag_start + 2..tag_start + 2 + close].trim();
        let piece = if let Some(name) = inner.strip_prefix('#') {
            Piece::Open(name.trim().to_string())
        } else if let Some(name) = inner.strip_prefix('/') {
            Piece::Close(name.trim().to_string())
        } else {
            Piece::Var(inner.to_string())
        };
        let name = match &piece {
            Piece::Var(name) | Piece::Open(name) | Piece::Close(name) => name,
            Piece::Text(_) => unreachable!(),
        };
        if name.is_empty() {
            return Err(TemplateError::EmptyTag { offset: tag_start });
        }
        pieces.push(piece);
        pos = tag_start + 2 + close + 2;
    }

    if pos < source.len() {
        pieces.push(Piece::Text(source[pos..].to_string()));
    }
    Ok(pieces)
}

fn is_line_ws(text: &str) -> bool {
    text.chars().all(|c| c == ' ' || c == '\t')
}

/// Remove section markers that occupy a whole line, along with the line.
fn strip_standalone_lines(pieces: &mut [Piece]) {
    for i in 0..pieces.len() {
        if !matches!(pieces[i], Piece::Open(_) | Piece::Close(_)) {
            continue;
        }

        let at_line_start = match i.checked_sub(1) {
            None => true,
            Some(j) => match &pieces[j] {
                Piece::Text(text) => match text.rfind('\n') {
                    Some(nl) => is_line_ws(&text[nl + 1..]),
                    None => j == 0 && is_line_ws(text),
                },
                _ => false,
            },
        };
        if !at_line_start {
            continue;
        }

        let at_line_end = match pieces.get(i + 1) {
            None => true,
            Some(Piece::Text(text)) => match text.find('\n') {
                Some(nl) => is_line_ws(&text[..nl]),
                None => i + 2 == pieces.len() && is_line_ws(text),
            },
            Some(_) => false,
        };
        if !at_line_end {
            continue;
        }

        // Drop the indentation before the tag ...
        if let Some(j) = i.checked_sub(1)
            && let Piece::Text(text) = &mut pieces[j]
        {
            match text.rfind('\n') {
                Some(nl) => text.truncate(nl + 1),
                None => text.clear(),
            }
        }
        // ... and the rest of the line after it, newline included.
        if let Some(Piece::Text(text)) = pieces.get_mut(i + 1) {
            match text.find('\n') {
                Some(nl) => text.drain(..=nl),
                None => text.drain(..),
            };
        }
    }
}

fn build_tree(pieces: Vec<Piece>) -> Result<Vec<Node>> {
    let mut stack: Vec<(String, Vec<Node>)> = Vec::new();
    let mut current: Vec<Node> = Vec::new();

    for piece in pieces {
        match piece {
            Piece::Text(text) => {
                if !text.is_empty() {
                    current.push(Node::Text(text));
                }
            }
            Piece::Var(name) => current.push(Node::Var(name)),
            Piece::Open(name) => {
                stack.push((name, std::mem::take(&mut current)));
            }
            Piece::Close(name) => {
                let Some((open_name, parent)) = stack.pop() else {
                    return Err(TemplateError::UnexpectedClose { name });
                };
                if open_name != name {
                    return Err(TemplateError::MismatchedClose {
                        expected: open_name,
                        found: name,
                    });
                }
                let children = std::mem::replace(&mut current, parent);
                current.push(Node::Section { name, children });
            }
        }
    }

    if let Some((name, _)) = stack.pop() {
        return Err(TemplateError::UnclosedSection { name });
    }
    Ok(current)
}

fn lookup<'v>(stack: &[&'v Value], name: &str) -> Option<&'v Value> {
    for value in stack.iter().rev() {
        if let Value::Map(map) = value
            && let Some(found) = map.get(name)
        {
            return Some(found);
        }
    }
    None
}

fn render_nodes<'v>(nodes: &'v [Node], stack: &mut Vec<&'v Value>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(name) => {
                // Missing variables render empty by design.
                if let Some(value) = lookup(stack, name) {
                    out.push_str(&value.to_text());
                }
            }
            Node::Section { name, children } => match lookup(stack, name) {
                None | Some(Value::Bool(false)) => {}
                Some(Value::List(items)) => {
                    for item in items {
                        stack.push(item);
                        render_nodes(children, stack, out);
                        stack.pop();
                    }
                }
                Some(map @ Value::Map(_)) => {
                    stack.push(map);
                    render_nodes(children, stack, out);
                    stack.pop();
                }
                Some(Value::Str(s)) if s.is_empty() => {}
                Some(_) => render_nodes(children, stack, out),
            },
        }
    }
}
