//! Reading and writing typed values on nodes.
//!
//! A [`Codec`] pairs a [`Style`] with a [`BaseTypeRegistry`] and dispatches on
//! the [`Descriptor`]:
//!
//! - `null` for any type is written as the text `null`.
//! - Strings containing line breaks, or written over an existing block, use a
//!   `"""` multi-line block. Carriage returns are rejected.
//! - Other base types and enums become the node's value text.
//! - Arrays, lists and sets become list items.
//! - Maps become keys when their keys are base types that make valid keys,
//!   and a list of `key`/`value` entries otherwise.
//! - Structured values become one key per saved field, or are read from a
//!   shortcut when the node has a value instead of children.
//!
//! Writing over existing nodes reuses them, so unchanged parts of the text stay
//! byte-for-byte identical.
//!
//! ```rust
//! use succ::base_types::BaseTypeRegistry;
//! use succ::{Codec, Descriptor, Node, Storable, Style, Value};
//!
//! let style = Style::default();
//! let registry = BaseTypeRegistry::new();
//! let codec = Codec::new(&style, &registry);
//!
//! let mut node = Node::new_key(0, "primes").unwrap();
//! let primes = vec![2u8, 3, 5];
//! codec.encode(&mut node, &primes.to_value(), &Vec::<u8>::descriptor()).unwrap();
//!
//! let back = codec.decode(&node, &Vec::<u8>::descriptor()).unwrap();
//! assert_eq!(Vec::<u8>::from_value(back).unwrap(), primes);
//! ```

use crate::base_types::{self, decode_string, encode_string, BaseTypeRegistry};
use crate::collections;
use crate::complex;
use crate::descriptor::Descriptor;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::node::{validate_key, ChildKind, Node, MULTI_LINE_TERMINATOR, NULL_VALUE};
use crate::parser::split_lines;
use crate::style::Style;
use crate::value::Value;

/// Encodes values onto nodes and decodes them back.
#[derive(Clone, Copy)]
pub struct Codec<'a> {
    style: &'a Style,
    registry: &'a BaseTypeRegistry,
}

impl<'a> Codec<'a> {
    #[must_use]
    pub fn new(style: &'a Style, registry: &'a BaseTypeRegistry) -> Self {
        Codec { style, registry }
    }

    #[inline]
    #[must_use]
    pub fn style(&self) -> &'a Style {
        self.style
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &'a BaseTypeRegistry {
        self.registry
    }

    /// Writes `value` onto `node`, reusing whatever the node already holds.
    pub fn encode(&self, node: &mut Node, value: &Value, descriptor: &Descriptor) -> Result<()> {
        if value.is_null() {
            drop_child_nodes(node);
            node.set_value(NULL_VALUE, self.style);
            return Ok(());
        }
        if node.is_null() {
            node.set_value("", self.style);
        }
        match descriptor {
            Descriptor::Base(name) if name == base_types::STRING => {
                self.encode_string_node(node, value)
            }
            Descriptor::Base(_) | Descriptor::Enum(_) => self.encode_base(node, value, descriptor),
            Descriptor::Array(element) | Descriptor::List(element) | Descriptor::Set(element) => {
                collections::encode_sequence(self, node, value, descriptor, element)
            }
            Descriptor::Map { key, value: entry } => {
                collections::encode_map(self, node, value, descriptor, key, entry)
            }
            Descriptor::Complex(complex) => complex::encode(self, node, value, complex),
        }
    }

    /// Writes `value` onto `node` from scratch, dropping any formatting the
    /// node's old content had, such as a multi-line block.
    pub fn encode_fresh(
        &self,
        node: &mut Node,
        value: &Value,
        descriptor: &Descriptor,
    ) -> Result<()> {
        node.clear_children(ChildKind::None);
        node.set_value("", self.style);
        self.encode(node, value, descriptor)
    }

    /// Reads a value of the described type from `node`.
    pub fn decode(&self, node: &Node, descriptor: &Descriptor) -> Result<Value> {
        if node.is_null() {
            return Ok(Value::Null);
        }
        match descriptor {
            Descriptor::Base(name)
                if name == base_types::STRING && node.holds_multi_line_string() =>
            {
                decode_string_block(node)
            }
            Descriptor::Base(_) | Descriptor::Enum(_) => {
                self.registry.decode(descriptor, &node.value())
            }
            Descriptor::Array(element) | Descriptor::List(element) => {
                collections::decode_sequence(self, node, descriptor, element, false)
            }
            Descriptor::Set(element) => {
                collections::decode_sequence(self, node, descriptor, element, true)
            }
            Descriptor::Map { key, value } => {
                collections::decode_map(self, node, descriptor, key, value)
            }
            Descriptor::Complex(complex) => complex::decode(self, node, complex),
        }
    }

    fn encode_base(&self, node: &mut Node, value: &Value, descriptor: &Descriptor) -> Result<()> {
        let text = self.registry.encode(descriptor, value, self.style)?;
        drop_child_nodes(node);
        node.set_value(&text, self.style);
        Ok(())
    }

    fn encode_string_node(&self, node: &mut Node, value: &Value) -> Result<()> {
        let Value::String(text) = value else {
            return Err(Error::type_mismatch(base_types::STRING, value.kind_name()));
        };
        // `\r` reads back as a line break, so no text stores it faithfully.
        if text.contains('\r') {
            return Err(Error::type_error(format!(
                "strings containing a carriage return cannot be stored: {text:?}"
            )));
        }
        if text.contains('\n') || node.holds_multi_line_string() {
            self.encode_string_block(node, text)
        } else {
            self.encode_base(node, value, &Descriptor::base(base_types::STRING))
        }
    }

    fn encode_string_block(&self, node: &mut Node, text: &str) -> Result<()> {
        let lines = split_lines(text);
        if node.child_kind() != ChildKind::MultiLineString && node.has_child_nodes() {
            node.clear_children(ChildKind::MultiLineString);
        }
        node.set_value(MULTI_LINE_TERMINATOR, self.style);
        node.cap_child_nodes(lines.len() + 1);
        for (i, line) in lines.iter().enumerate() {
            node.string_line_or_insert(i, self.style)?
                .set_value(&encode_string(line, self.style), self.style);
        }
        node.string_line_or_insert(lines.len(), self.style)?
            .set_value(MULTI_LINE_TERMINATOR, self.style);
        Ok(())
    }

    /// Writes a structured value or a base-keyed map as the top-level keys of
    /// a document.
    ///
    /// Fields become keys and other keys are left alone; map keys replace the
    /// document's keys entirely.
    pub fn encode_document(
        &self,
        document: &mut Document,
        value: &Value,
        descriptor: &Descriptor,
    ) -> Result<()> {
        match descriptor {
            Descriptor::Complex(complex) => {
                let fields = value
                    .as_object()
                    .ok_or_else(|| Error::type_mismatch(&complex.name, value.kind_name()))?;
                for field in complex.saved_fields() {
                    let field_value = fields.get(&field.name).ok_or_else(|| {
                        Error::type_error(format!(
                            "{} is missing field `{}`",
                            complex.name, field.name
                        ))
                    })?;
                    document.encode_at(self, &[field.name.as_str()], field_value, &field.descriptor())?;
                }
                Ok(())
            }
            Descriptor::Map { key, value: entry } if self.registry.is_base(key) => {
                let entries = value
                    .as_map()
                    .ok_or_else(|| Error::type_mismatch(&descriptor.name(), value.kind_name()))?;
                let mut keys = Vec::with_capacity(entries.len());
                for (k, _) in entries {
                    let text = self.registry.encode(key, k, self.style)?;
                    validate_key(&text)?;
                    keys.push(text);
                }
                for ((_, v), text) in entries.iter().zip(&keys) {
                    document.encode_at(self, &[text.as_str()], v, entry)?;
                }
                for stale in document.top_level_keys() {
                    if !keys.contains(&stale) {
                        document.remove(&stale);
                    }
                }
                Ok(())
            }
            other => Err(Error::type_error(format!(
                "a document holds named keys; {} cannot be stored at the top level",
                other.name()
            ))),
        }
    }

    /// Reads a whole document as one structured value or base-keyed map.
    pub fn decode_document(&self, document: &Document, descriptor: &Descriptor) -> Result<Value> {
        match descriptor {
            Descriptor::Complex(complex) => {
                complex::decode_fields(self, complex, |name| document.node(name))
            }
            Descriptor::Map { key, value } if self.registry.is_base(key) => {
                let mut entries = Vec::new();
                for name in document.top_level_keys() {
                    if let Some(node) = document.node(&name) {
                        entries.push((self.registry.decode(key, &name)?, self.decode(node, value)?));
                    }
                }
                Ok(Value::Map(entries))
            }
            other => Err(Error::type_error(format!(
                "a document holds named keys; {} cannot be read from the top level",
                other.name()
            ))),
        }
    }
}

/// Removes child nodes but keeps comment lines nested under the node.
fn drop_child_nodes(node: &mut Node) {
    node.cap_child_nodes(0);
    node.set_child_kind(ChildKind::None);
}

/// Makes `node` ready to take children of `kind`: any scalar value is cleared
/// and children of another kind are removed.
pub(crate) fn prepare_for_children(node: &mut Node, kind: ChildKind, style: &Style) {
    if !node.value().is_empty() {
        node.set_value("", style);
    }
    if node.child_kind() != kind && node.has_child_nodes() {
        node.clear_children(kind);
    }
}

fn decode_string_block(node: &Node) -> Result<Value> {
    let lines: Vec<&Node> = node.child_nodes().collect();
    match lines.split_last() {
        Some((last, content)) if last.value() == MULTI_LINE_TERMINATOR => {
            let text: Vec<String> = content
                .iter()
                .map(|line| decode_string(&line.value()))
                .collect();
            Ok(Value::String(text.join("\n")))
        }
        _ => Err(Error::structure(
            "multi-line string is missing its closing \"\"\"",
        )),
    }
}
