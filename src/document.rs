//! The parsed form of a whole file.
//!
//! A [`Document`] is an ordered list of top-level [`Line`]s plus an index
//! from top-level key to line. Serializing an unmodified document reproduces
//! its text exactly, except for trailing whitespace at the end of the file.
//!
//! ```rust
//! use succ::Document;
//!
//! let text = "# settings\nname: demo\nwindow:\n    width: 800";
//! let doc = Document::parse(text).unwrap();
//!
//! assert_eq!(doc.top_level_keys(), vec!["name", "window"]);
//! assert!(doc.key_exists_at_path(&["window", "width"]));
//! assert_eq!(doc.to_text(&Default::default()), text);
//! ```

use std::collections::HashMap;

use crate::codec::Codec;
use crate::descriptor::Descriptor;
use crate::error::{Error, Result};
use crate::node::{Line, Node};
use crate::parser;
use crate::ser;
use crate::style::Style;
use crate::value::Value;

/// Top-level lines of a file and an index of its top-level keys.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    lines: Vec<Line>,
    index: HashMap<String, usize>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses SUCC text. See [`parser::parse`].
    pub fn parse(text: &str) -> Result<Self> {
        parser::parse(text)
    }

    /// Serializes the document with the style's line ending.
    #[must_use]
    pub fn to_text(&self, style: &Style) -> String {
        ser::serialize(&self.lines, style)
    }

    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Appends a top-level line. A key node becomes the target of its key.
    pub(crate) fn push_line(&mut self, line: Line) {
        if let Some(key) = line.as_node().and_then(Node::key) {
            self.index.insert(key, self.lines.len());
        }
        self.lines.push(line);
    }

    #[must_use]
    pub fn key_exists(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    #[must_use]
    pub fn key_exists_at_path(&self, path: &[&str]) -> bool {
        self.node_at_path(path).is_some()
    }

    /// Top-level keys in file order.
    #[must_use]
    pub fn top_level_keys(&self) -> Vec<String> {
        let mut keys: Vec<(&String, &usize)> = self.index.iter().collect();
        keys.sort_by_key(|(_, position)| **position);
        keys.into_iter().map(|(key, _)| key.clone()).collect()
    }

    #[must_use]
    pub fn node(&self, key: &str) -> Option<&Node> {
        self.index
            .get(key)
            .and_then(|&i| self.lines.get(i))
            .and_then(Line::as_node)
    }

    pub fn node_mut(&mut self, key: &str) -> Option<&mut Node> {
        let i = *self.index.get(key)?;
        self.lines.get_mut(i).and_then(Line::as_node_mut)
    }

    /// Follows `path` through nested keys without creating anything.
    #[must_use]
    pub fn node_at_path(&self, path: &[&str]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.node(first)?, |node, key| node.child(key))
    }

    /// Removes a top-level key and its line. Returns whether it existed.
    pub fn remove(&mut self, key: &str) -> bool {
        let Some(position) = self.index.remove(key) else {
            return false;
        };
        self.lines.remove(position);
        self.reindex();
        true
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, line) in self.lines.iter().enumerate() {
            if let Some(key) = line.as_node().and_then(Node::key) {
                self.index.insert(key, i);
            }
        }
    }

    /// Replaces the top-level node with the same key, or appends it.
    fn commit(&mut self, node: Node) {
        let position = node.key().and_then(|key| self.index.get(&key).copied());
        match position {
            Some(i) => self.lines[i] = Line::Node(node),
            None => self.push_line(Line::Node(node)),
        }
    }

    /// Runs `edit` on the node at `path`, creating missing keys along the way.
    ///
    /// The edit works on a copy of the top-level node, which replaces the
    /// original only if every step succeeds.
    pub fn edit_at<F>(&mut self, style: &Style, path: &[&str], edit: F) -> Result<()>
    where
        F: FnOnce(&mut Node) -> Result<()>,
    {
        let (first, rest) = path
            .split_first()
            .ok_or_else(|| Error::invalid_key("", "path must contain at least one key"))?;
        let mut top = match self.node(first) {
            Some(node) => node.clone(),
            None => Node::new_key(0, first)?,
        };
        let mut target = &mut top;
        for key in rest {
            target = target.key_child_or_insert(key, style)?;
        }
        edit(target)?;
        self.commit(top);
        Ok(())
    }

    /// Encodes `value` at `path`. On failure the document is unchanged.
    pub fn encode_at(
        &mut self,
        codec: &Codec<'_>,
        path: &[&str],
        value: &Value,
        descriptor: &Descriptor,
    ) -> Result<()> {
        self.edit_at(codec.style(), path, |node| {
            codec.encode(node, value, descriptor)
        })
    }

    /// Like [`encode_at`](Self::encode_at), but rewrites the node from scratch.
    pub fn encode_fresh_at(
        &mut self,
        codec: &Codec<'_>,
        path: &[&str],
        value: &Value,
        descriptor: &Descriptor,
    ) -> Result<()> {
        self.edit_at(codec.style(), path, |node| {
            codec.encode_fresh(node, value, descriptor)
        })
    }

    /// Decodes the value at `path`, or `None` if the path does not exist.
    pub fn decode_at(
        &self,
        codec: &Codec<'_>,
        path: &[&str],
        descriptor: &Descriptor,
    ) -> Result<Option<Value>> {
        self.node_at_path(path)
            .map(|node| codec.decode(node, descriptor))
            .transpose()
    }
}
