//! Sequences and maps.
//!
//! Sequences are written as list items in order. Maps are written as keys when
//! their key type is a base type and every key encodes to a valid key:
//!
//! ```text
//! scores:
//!     alice: 10
//!     bob: 7
//! ```
//!
//! and otherwise as a list of entries, each holding a `key` and a `value`:
//!
//! ```text
//! scores:
//!     -
//!         key: a:b
//!         value: 10
//! ```

use crate::codec::{prepare_for_children, Codec};
use crate::descriptor::Descriptor;
use crate::error::{Error, Result};
use crate::node::{is_valid_key, ChildKind, Node};
use crate::value::Value;

/// Key of the child holding an entry's key in the array-of-entries form.
pub const ENTRY_KEY: &str = "key";
/// Key of the child holding an entry's value in the array-of-entries form.
pub const ENTRY_VALUE: &str = "value";

pub(crate) fn encode_sequence(
    codec: &Codec<'_>,
    node: &mut Node,
    value: &Value,
    descriptor: &Descriptor,
    element: &Descriptor,
) -> Result<()> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::type_mismatch(&descriptor.name(), value.kind_name()))?;
    let style = codec.style();
    prepare_for_children(node, ChildKind::List, style);
    node.cap_child_nodes(items.len());
    for (i, item) in items.iter().enumerate() {
        let child = node.list_child_or_insert(i, style)?;
        codec.encode(child, item, element)?;
    }
    Ok(())
}

pub(crate) fn decode_sequence(
    codec: &Codec<'_>,
    node: &Node,
    descriptor: &Descriptor,
    element: &Descriptor,
    unique: bool,
) -> Result<Value> {
    check_no_scalar(node, descriptor)?;
    if node.child_kind() == ChildKind::Key {
        return Err(Error::type_mismatch(&descriptor.name(), "keys"));
    }
    let mut items = Vec::with_capacity(node.child_node_count());
    for child in node.child_nodes() {
        let item = codec.decode(child, element)?;
        if !unique || !items.contains(&item) {
            items.push(item);
        }
    }
    Ok(Value::Array(items))
}

pub(crate) fn encode_map(
    codec: &Codec<'_>,
    node: &mut Node,
    value: &Value,
    descriptor: &Descriptor,
    key: &Descriptor,
    entry: &Descriptor,
) -> Result<()> {
    let entries = value
        .as_map()
        .ok_or_else(|| Error::type_mismatch(&descriptor.name(), value.kind_name()))?;
    let style = codec.style();

    if codec.registry().is_base(key) && !style.always_array_maps {
        if let Some(keys) = key_texts(codec, entries, key)? {
            prepare_for_children(node, ChildKind::Key, style);
            for ((_, v), text) in entries.iter().zip(&keys) {
                let child = node.key_child_or_insert(text, style)?;
                codec.encode(child, v, entry)?;
            }
            for stale in node.child_keys() {
                if !keys.contains(&stale) {
                    node.remove_child(&stale);
                }
            }
            return Ok(());
        }
    }

    prepare_for_children(node, ChildKind::List, style);
    node.cap_child_nodes(entries.len());
    for (i, (k, v)) in entries.iter().enumerate() {
        let item = node.list_child_or_insert(i, style)?;
        prepare_for_children(item, ChildKind::Key, style);
        codec.encode(item.key_child_or_insert(ENTRY_KEY, style)?, k, key)?;
        codec.encode(item.key_child_or_insert(ENTRY_VALUE, style)?, v, entry)?;
    }
    Ok(())
}

/// Encoded keys, or `None` if any of them cannot be written as a key.
fn key_texts(
    codec: &Codec<'_>,
    entries: &[(Value, Value)],
    key: &Descriptor,
) -> Result<Option<Vec<String>>> {
    let mut texts = Vec::with_capacity(entries.len());
    for (k, _) in entries {
        let text = codec.registry().encode(key, k, codec.style())?;
        if !is_valid_key(&text) {
            return Ok(None);
        }
        texts.push(text);
    }
    Ok(Some(texts))
}

pub(crate) fn decode_map(
    codec: &Codec<'_>,
    node: &Node,
    descriptor: &Descriptor,
    key: &Descriptor,
    entry: &Descriptor,
) -> Result<Value> {
    check_no_scalar(node, descriptor)?;
    let mut entries = Vec::with_capacity(node.child_node_count());
    if node.child_kind() == ChildKind::Key {
        if !codec.registry().is_base(key) {
            return Err(Error::type_error(format!(
                "{} has keys that are not base types and must be a list of entries",
                descriptor.name()
            )));
        }
        for child in node.child_nodes() {
            let text = child.key().unwrap_or_default();
            entries.push((codec.registry().decode(key, &text)?, codec.decode(child, entry)?));
        }
    } else {
        for item in node.child_nodes() {
            let k = entry_part(item, ENTRY_KEY)?;
            let v = entry_part(item, ENTRY_VALUE)?;
            entries.push((codec.decode(k, key)?, codec.decode(v, entry)?));
        }
    }
    Ok(Value::Map(entries))
}

fn entry_part<'n>(item: &'n Node, part: &str) -> Result<&'n Node> {
    item.child(part)
        .ok_or_else(|| Error::type_error(format!("map entry is missing its `{part}`")))
}

fn check_no_scalar(node: &Node, descriptor: &Descriptor) -> Result<()> {
    let value = node.value();
    if value.is_empty() {
        Ok(())
    } else {
        Err(Error::type_mismatch(
            &descriptor.name(),
            &format!("the value {value:?}"),
        ))
    }
}
