//! Text to [`Document`].
//!
//! The parser walks the input line by line and keeps a stack of the nodes
//! that are still open. A node is open while it may receive children: its
//! value is empty, or it opened a `"""` block. A node is attached to its
//! parent when it closes, so the tree keeps file order.

use tracing::trace;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::node::{ChildKind, Line, Node, NodeKind, MULTI_LINE_TERMINATOR};

enum LineKind {
    NoData,
    Key,
    List,
}

fn classify(line: &str) -> Option<LineKind> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        Some(LineKind::NoData)
    } else if trimmed.starts_with('-') {
        Some(LineKind::List)
    } else if trimmed.contains(':') {
        Some(LineKind::Key)
    } else {
        None
    }
}

/// Splits on `\r\n`, `\r` and `\n`, keeping empty lines.
pub(crate) fn split_lines(input: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = input;
    while let Some(i) = rest.find(['\r', '\n']) {
        lines.push(&rest[..i]);
        let skip = if rest[i..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[i + skip..];
    }
    lines.push(rest);
    lines
}

/// Parses SUCC text into a [`Document`].
///
/// Empty or whitespace-only input yields an empty document.
pub fn parse(input: &str) -> Result<Document> {
    if input.trim().is_empty() {
        return Ok(Document::new());
    }
    let mut parser = Parser::new();
    for (i, line) in split_lines(input).into_iter().enumerate() {
        parser.feed(i + 1, line)?;
    }
    parser.finish()
}

struct Parser {
    document: Document,
    stack: Vec<Node>,
    /// Line number of the `"""` that opened the current block.
    open_block: Option<usize>,
}

impl Parser {
    fn new() -> Self {
        Parser {
            document: Document::new(),
            stack: Vec::new(),
            open_block: None,
        }
    }

    fn feed(&mut self, number: usize, line: &str) -> Result<()> {
        if line.contains('\t') {
            return Err(Error::format(
                number,
                "tabs are not allowed; indent with spaces",
                line,
            ));
        }
        if self.open_block.is_some() {
            return self.feed_block_line(number, line);
        }

        let kind = match classify(line) {
            Some(LineKind::NoData) => {
                self.attach(Line::Text(line.to_string()));
                return Ok(());
            }
            Some(LineKind::Key) => NodeKind::Key,
            Some(LineKind::List) => NodeKind::List,
            None => {
                return Err(Error::format(
                    number,
                    "line is not a comment, a `key: value` pair or a `- item`",
                    line,
                ))
            }
        };

        let mut node = Node::parsed(line, kind);
        if kind == NodeKind::Key {
            match node.key() {
                None => return Err(Error::format(number, "key is missing its ':'", line)),
                Some(key) if key.is_empty() => {
                    return Err(Error::format(number, "key is empty", line))
                }
                Some(_) => {}
            }
        }

        let indentation = node.indentation();
        while self
            .stack
            .last()
            .map_or(false, |open| indentation <= open.indentation())
        {
            self.close_top();
        }

        match self.stack.last_mut() {
            None if kind != NodeKind::Key => {
                return Err(Error::format(
                    number,
                    "list items cannot appear at the top level",
                    line,
                ))
            }
            None => {}
            Some(parent) => Self::check_sibling(parent, &node, number, line)?,
        }

        let value = node.value();
        if value == MULTI_LINE_TERMINATOR {
            trace!(line = number, "opening multi-line string");
            node.set_child_kind(ChildKind::MultiLineString);
            self.open_block = Some(number);
            self.stack.push(node);
        } else if value.is_empty() {
            self.stack.push(node);
        } else {
            self.attach(Line::Node(node));
        }
        Ok(())
    }

    fn feed_block_line(&mut self, number: usize, line: &str) -> Result<()> {
        let node = Node::parsed(line, NodeKind::MultiLineString);
        let closes = node.value() == MULTI_LINE_TERMINATOR;
        match self.stack.last_mut() {
            Some(owner) => owner.push_child(Line::Node(node)),
            None => {
                return Err(Error::format(
                    number,
                    "multi-line string has no owning key",
                    line,
                ))
            }
        }
        if closes {
            trace!(line = number, "closing multi-line string");
            self.open_block = None;
            self.close_top();
        }
        Ok(())
    }

    /// Siblings must share indentation and kind. The first child decides.
    fn check_sibling(parent: &mut Node, node: &Node, number: usize, line: &str) -> Result<()> {
        let kind = ChildKind::from(node.kind());
        let first_indentation = parent.child_nodes().next().map(Node::indentation);
        let Some(expected) = first_indentation else {
            parent.set_child_kind(kind);
            return Ok(());
        };
        if expected != node.indentation() {
            return Err(Error::format(
                number,
                &format!(
                    "indentation does not match its siblings (expected {expected} spaces, found {})",
                    node.indentation()
                ),
                line,
            ));
        }
        if parent.child_kind() != kind {
            return Err(Error::format(
                number,
                "list items and keys cannot be siblings",
                line,
            ));
        }
        Ok(())
    }

    fn attach(&mut self, line: Line) {
        match self.stack.last_mut() {
            Some(parent) => parent.push_child(line),
            None => self.document.push_line(line),
        }
    }

    fn close_top(&mut self) {
        if let Some(node) = self.stack.pop() {
            self.attach(Line::Node(node));
        }
    }

    fn finish(mut self) -> Result<Document> {
        if let Some(opened) = self.open_block {
            return Err(Error::format(
                opened,
                "multi-line string is never closed with \"\"\"",
                MULTI_LINE_TERMINATOR,
            ));
        }
        while !self.stack.is_empty() {
            self.close_top();
        }
        Ok(self.document)
    }
}
