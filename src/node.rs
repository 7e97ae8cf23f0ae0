//! Lines and nodes: the building blocks of a parsed SUCC document.
//!
//! Every physical line of a file is kept as a [`Line`]. Blank lines and
//! comments are [`Line::Text`]; everything else is a [`Node`] that owns the
//! lines nested beneath it. A node always keeps its exact raw text, so writing
//! a value only replaces the characters of that value and leaves comments,
//! spacing and the rest of the file alone.
//!
//! ```rust
//! use succ::{Document, Style};
//!
//! let mut doc = Document::parse("volume: 7 # between 0 and 10").unwrap();
//! let node = doc.node_mut("volume").unwrap();
//! assert_eq!(node.value(), "7");
//!
//! node.set_value("3", &Style::default());
//! assert_eq!(node.raw_text(), "volume: 3 # between 0 and 10");
//! ```

use crate::error::{Error, Result};
use crate::style::Style;

/// Value of a node that opens or closes a multi-line string block.
pub const MULTI_LINE_TERMINATOR: &str = "\"\"\"";

/// Value text written for an absent value.
pub const NULL_VALUE: &str = "null";

/// One physical line of a document.
#[derive(Clone, Debug, PartialEq)]
pub enum Line {
    /// A line carrying no data: blank or a comment.
    Text(String),
    /// A line with data, together with everything nested under it.
    Node(Node),
}

impl Line {
    #[must_use]
    pub fn raw_text(&self) -> &str {
        match self {
            Line::Text(text) => text,
            Line::Node(node) => node.raw_text(),
        }
    }

    #[inline]
    #[must_use]
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Line::Node(node) => Some(node),
            Line::Text(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_node_mut(&mut self) -> Option<&mut Node> {
        match self {
            Line::Node(node) => Some(node),
            Line::Text(_) => None,
        }
    }
}

/// What a node's own line looks like.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// `key: value`
    Key,
    /// `- value`
    List,
    /// One line of content inside a `"""` block.
    MultiLineString,
}

/// The kind shared by all child nodes of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ChildKind {
    #[default]
    None,
    Key,
    List,
    MultiLineString,
}

impl From<NodeKind> for ChildKind {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Key => ChildKind::Key,
            NodeKind::List => ChildKind::List,
            NodeKind::MultiLineString => ChildKind::MultiLineString,
        }
    }
}

/// Checks that `key` can be written as the key of a line.
///
/// A key must be non-empty, must not start with `-`, must not contain `:`,
/// `#` or line breaks, and must not begin or end with whitespace.
///
/// ```rust
/// use succ::node::validate_key;
///
/// assert!(validate_key("window size").is_ok());
/// assert!(validate_key("-flag").is_err());
/// assert!(validate_key("a:b").is_err());
/// assert!(validate_key(" padded").is_err());
/// ```
pub fn validate_key(key: &str) -> Result<()> {
    let reason = if key.is_empty() {
        "key is empty"
    } else if key.starts_with('-') {
        "key cannot start with '-'"
    } else if key.contains(':') {
        "key cannot contain ':'"
    } else if key.contains('#') {
        "key cannot contain '#'"
    } else if key.contains(['\n', '\r', '\t']) {
        "key cannot contain tabs or line breaks"
    } else if key.starts_with(char::is_whitespace) || key.ends_with(char::is_whitespace) {
        "key cannot begin or end with whitespace"
    } else {
        return Ok(());
    };
    Err(Error::invalid_key(key, reason))
}

#[inline]
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    validate_key(key).is_ok()
}

fn leading_spaces(text: &str) -> usize {
    text.len() - text.trim_start_matches(' ').len()
}

/// A line with data and the lines nested beneath it.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    raw_text: String,
    kind: NodeKind,
    child_kind: ChildKind,
    children: Vec<Line>,
    /// Created by the library and not yet given a value: the next value
    /// written uses the style's spacing.
    style_pending: bool,
}

impl Node {
    pub(crate) fn parsed(raw_text: &str, kind: NodeKind) -> Self {
        Node {
            raw_text: raw_text.to_string(),
            kind,
            child_kind: ChildKind::None,
            children: Vec::new(),
            style_pending: false,
        }
    }

    /// Creates a `key:` line at the given indentation.
    pub fn new_key(indentation: usize, key: &str) -> Result<Self> {
        validate_key(key)?;
        Ok(Node {
            raw_text: format!("{}{}:", " ".repeat(indentation), key),
            kind: NodeKind::Key,
            child_kind: ChildKind::None,
            children: Vec::new(),
            style_pending: true,
        })
    }

    /// Creates a `-` line at the given indentation.
    #[must_use]
    pub fn new_list_item(indentation: usize) -> Self {
        Node {
            raw_text: format!("{}-", " ".repeat(indentation)),
            kind: NodeKind::List,
            child_kind: ChildKind::None,
            children: Vec::new(),
            style_pending: true,
        }
    }

    /// Creates an empty content line of a multi-line string block.
    #[must_use]
    pub fn new_string_line(indentation: usize) -> Self {
        Node {
            raw_text: " ".repeat(indentation),
            kind: NodeKind::MultiLineString,
            child_kind: ChildKind::None,
            children: Vec::new(),
            style_pending: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn child_kind(&self) -> ChildKind {
        self.child_kind
    }

    pub(crate) fn set_child_kind(&mut self, kind: ChildKind) {
        self.child_kind = kind;
    }

    /// Number of leading spaces.
    #[must_use]
    pub fn indentation(&self) -> usize {
        leading_spaces(&self.raw_text)
    }

    /// End of the data text: the first `#` not preceded by `\`, with
    /// trailing whitespace trimmed.
    fn data_end(&self) -> usize {
        let raw = &self.raw_text;
        if raw.trim().is_empty() {
            return raw.len();
        }
        let bytes = raw.as_bytes();
        let comment = (1..bytes.len()).find(|&i| bytes[i] == b'#' && bytes[i - 1] != b'\\');
        let end = comment.unwrap_or(raw.len());
        raw[..end].trim_end().len().max(self.indentation())
    }

    /// The text between the indentation and any comment, with `\#` unescaped.
    #[must_use]
    pub fn data_text(&self) -> String {
        let start = self.indentation();
        self.raw_text[start..self.data_end()].replace("\\#", "#")
    }

    fn set_data_text(&mut self, text: &str) {
        let start = self.indentation();
        let end = self.data_end();
        let mut raw = String::with_capacity(self.raw_text.len() + text.len());
        raw.push_str(&self.raw_text[..start]);
        raw.push_str(&text.replace('#', "\\#"));
        raw.push_str(&self.raw_text[end..]);
        self.raw_text = raw;
    }

    fn marker(&self) -> Option<char> {
        match self.kind {
            NodeKind::Key => Some(':'),
            NodeKind::List => Some('-'),
            NodeKind::MultiLineString => None,
        }
    }

    /// The key of a key node, `None` for other kinds.
    #[must_use]
    pub fn key(&self) -> Option<String> {
        if self.kind != NodeKind::Key {
            return None;
        }
        let data = self.data_text();
        let colon = data.find(':')?;
        Some(data[..colon].trim_end().to_string())
    }

    fn has_key(&self, key: &str) -> bool {
        self.key().as_deref() == Some(key)
    }

    /// The value text: what follows `:` or `-`, or the whole data text of a
    /// multi-line string line.
    #[must_use]
    pub fn value(&self) -> String {
        let data = self.data_text();
        match self.marker() {
            None => data,
            Some(marker) => data
                .find(marker)
                .map(|i| data[i + 1..].trim_start().to_string())
                .unwrap_or_default(),
        }
    }

    /// Replaces the value text, leaving the rest of the raw line untouched.
    ///
    /// Parsed nodes keep the spacing they had after `:` or `-`; nodes created
    /// by the library, or that had no value, use the style's spacing.
    pub fn set_value(&mut self, value: &str, style: &Style) {
        let Some(marker) = self.marker() else {
            self.set_data_text(value);
            return;
        };
        let data = self.data_text();
        let (head, gap, had_value) = match data.find(marker) {
            Some(i) => {
                let after = &data[i + 1..];
                let gap = after.len() - after.trim_start().len();
                (data[..=i].to_string(), gap, !after.trim().is_empty())
            }
            None => (format!("{data}{marker}"), 0, false),
        };
        if value.is_empty() {
            self.set_data_text(&head);
            return;
        }
        let spaces = if self.style_pending || !had_value {
            match marker {
                ':' => style.spaces_after_colon,
                _ => style.spaces_after_dash,
            }
        } else {
            gap
        };
        self.set_data_text(&format!("{head}{}{value}", " ".repeat(spaces)));
        self.style_pending = false;
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.value() == NULL_VALUE
    }

    /// True for a node whose value is `"""` and that holds the block's lines.
    #[must_use]
    pub fn holds_multi_line_string(&self) -> bool {
        self.child_kind == ChildKind::MultiLineString
            && self.has_child_nodes()
            && self.value() == MULTI_LINE_TERMINATOR
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Line] {
        &self.children
    }

    pub fn child_nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(Line::as_node)
    }

    #[must_use]
    pub fn child_node_count(&self) -> usize {
        self.child_nodes().count()
    }

    #[must_use]
    pub fn has_child_nodes(&self) -> bool {
        self.child_nodes().next().is_some()
    }

    pub(crate) fn push_child(&mut self, line: Line) {
        self.children.push(line);
    }

    /// The key child named `key`, without creating it.
    #[must_use]
    pub fn child(&self, key: &str) -> Option<&Node> {
        if self.child_kind != ChildKind::Key {
            return None;
        }
        self.child_nodes().find(|node| node.has_key(key))
    }

    /// The list child at `index`, without creating it.
    #[must_use]
    pub fn list_item(&self, index: usize) -> Option<&Node> {
        if self.child_kind != ChildKind::List {
            return None;
        }
        self.child_nodes().nth(index)
    }

    #[must_use]
    pub fn contains_child(&self, key: &str) -> bool {
        self.child(key).is_some()
    }

    /// Keys of the key children, in file order.
    #[must_use]
    pub fn child_keys(&self) -> Vec<String> {
        if self.child_kind != ChildKind::Key {
            return Vec::new();
        }
        self.child_nodes().filter_map(Node::key).collect()
    }

    fn proper_child_indentation(&self, style: &Style) -> usize {
        self.child_nodes()
            .next()
            .map_or(self.indentation() + style.indentation_interval, Node::indentation)
    }

    fn ensure_child_kind(&mut self, kind: ChildKind) -> Result<()> {
        if kind != ChildKind::MultiLineString {
            let value = self.value();
            if !value.is_empty() {
                return Err(Error::structure(format!(
                    "cannot add children to a node that holds the value {value:?}"
                )));
            }
        }
        if self.child_kind != kind {
            if self.has_child_nodes() {
                return Err(Error::structure(format!(
                    "cannot add {kind:?} children to a node whose children are {:?}",
                    self.child_kind
                )));
            }
            self.child_kind = kind;
        }
        Ok(())
    }

    fn node_at(&mut self, position: usize) -> Result<&mut Node> {
        match self.children.get_mut(position) {
            Some(Line::Node(node)) => Ok(node),
            _ => Err(Error::structure("child line is not a node")),
        }
    }

    fn nth_node_position(&self, index: usize) -> Option<usize> {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, line)| matches!(line, Line::Node(_)))
            .nth(index)
            .map(|(position, _)| position)
    }

    /// The key child named `key`, created at the end if missing.
    pub fn key_child_or_insert(&mut self, key: &str, style: &Style) -> Result<&mut Node> {
        self.ensure_child_kind(ChildKind::Key)?;
        let existing = self
            .children
            .iter()
            .position(|line| line.as_node().map_or(false, |node| node.has_key(key)));
        let position = match existing {
            Some(position) => position,
            None => {
                let child = Node::new_key(self.proper_child_indentation(style), key)?;
                self.children.push(Line::Node(child));
                self.children.len() - 1
            }
        };
        self.node_at(position)
    }

    /// The list child at `index`, appending empty items up to it if needed.
    pub fn list_child_or_insert(&mut self, index: usize, style: &Style) -> Result<&mut Node> {
        self.indexed_child_or_insert(index, ChildKind::List, style, Node::new_list_item)
    }

    /// Content line `index` of a multi-line string block, appending lines up to it.
    pub fn string_line_or_insert(&mut self, index: usize, style: &Style) -> Result<&mut Node> {
        self.indexed_child_or_insert(
            index,
            ChildKind::MultiLineString,
            style,
            Node::new_string_line,
        )
    }

    fn indexed_child_or_insert(
        &mut self,
        index: usize,
        kind: ChildKind,
        style: &Style,
        make: fn(usize) -> Node,
    ) -> Result<&mut Node> {
        self.ensure_child_kind(kind)?;
        let indentation = self.proper_child_indentation(style);
        let mut count = self.child_node_count();
        while count <= index {
            self.children.push(Line::Node(make(indentation)));
            count += 1;
        }
        let position = self
            .nth_node_position(index)
            .ok_or_else(|| Error::structure(format!("no child node at index {index}")))?;
        self.node_at(position)
    }

    /// Removes the key child named `key`. Returns whether it existed.
    pub fn remove_child(&mut self, key: &str) -> bool {
        let before = self.children.len();
        self.children
            .retain(|line| line.as_node().map_or(true, |node| !node.has_key(key)));
        before != self.children.len()
    }

    /// Drops child nodes past the first `count`. Non-data lines stay.
    pub fn cap_child_nodes(&mut self, count: usize) {
        let mut seen = 0;
        self.children.retain(|line| match line {
            Line::Node(_) => {
                seen += 1;
                seen <= count
            }
            Line::Text(_) => true,
        });
    }

    /// Removes every child line and sets the kind future children will have.
    pub fn clear_children(&mut self, kind: ChildKind) {
        self.children.clear();
        self.child_kind = kind;
    }
}
