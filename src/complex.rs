//! Structured values.
//!
//! A structured value is written as one key per saved field. Reading starts
//! from the type's default value and overwrites only the fields present in
//! the file, so keys added to a type later read as their defaults and keys
//! the type no longer has are left in the file untouched.
//!
//! A structured node may instead carry a single value, a shortcut, which is
//! handed to [`shortcuts`](crate::shortcuts) to build the value.

use crate::codec::{prepare_for_children, Codec};
use crate::descriptor::ComplexDescriptor;
use crate::error::{Error, Result};
use crate::node::{ChildKind, Node};
use crate::shortcuts;
use crate::value::Value;

pub(crate) fn encode(
    codec: &Codec<'_>,
    node: &mut Node,
    value: &Value,
    descriptor: &ComplexDescriptor,
) -> Result<()> {
    let fields = value
        .as_object()
        .ok_or_else(|| Error::type_mismatch(&descriptor.name, value.kind_name()))?;
    let style = codec.style();
    // Writing fields replaces a shortcut.
    prepare_for_children(node, ChildKind::Key, style);
    for field in descriptor.saved_fields() {
        let field_value = fields.get(&field.name).ok_or_else(|| {
            Error::type_error(format!(
                "{} is missing field `{}`",
                descriptor.name, field.name
            ))
        })?;
        let child = node.key_child_or_insert(&field.name, style)?;
        codec.encode(child, field_value, &field.descriptor())?;
    }
    Ok(())
}

pub(crate) fn decode(
    codec: &Codec<'_>,
    node: &Node,
    descriptor: &ComplexDescriptor,
) -> Result<Value> {
    let value = node.value();
    if !value.is_empty() {
        return shortcuts::parse(codec, &value, descriptor);
    }
    if node.child_kind() == ChildKind::List {
        return Err(Error::type_mismatch(&descriptor.name, "list items"));
    }
    decode_fields(codec, descriptor, |name| node.child(name))
}

/// Builds the default value and fills in every saved field `lookup` finds.
pub(crate) fn decode_fields<'n, F>(
    codec: &Codec<'_>,
    descriptor: &ComplexDescriptor,
    lookup: F,
) -> Result<Value>
where
    F: Fn(&str) -> Option<&'n Node>,
{
    let mut fields = descriptor.construct().into_object()?;
    for field in descriptor.saved_fields() {
        if let Some(child) = lookup(&field.name) {
            fields.insert(field.name.clone(), codec.decode(child, &field.descriptor())?);
        }
    }
    Ok(Value::Object(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base_types::BaseTypeRegistry;
    use crate::descriptor::{Descriptor, FieldDescriptor};
    use crate::document::Document;
    use crate::fields::Fields;
    use crate::style::Style;

    fn window() -> Descriptor {
        ComplexDescriptor::builder("Window", || {
            Value::Object(
                Fields::new()
                    .with("width", Value::from(640))
                    .with("height", Value::from(480))
                    .with("cache", Value::Null),
            )
        })
        .field(FieldDescriptor::of::<i32>("width"))
        .field(FieldDescriptor::of::<i32>("height"))
        .field(FieldDescriptor::of::<Option<String>>("cache").dont_save())
        .build()
    }

    #[test]
    fn test_missing_fields_keep_defaults() {
        let style = Style::default();
        let registry = BaseTypeRegistry::new();
        let codec = Codec::new(&style, &registry);
        let doc = Document::parse("w:\n    width: 1024\n    legacy: yes").unwrap();
        let value = doc.decode_at(&codec, &["w"], &window()).unwrap().unwrap();
        assert_eq!(value.get("width"), Some(&Value::Int(1024)));
        assert_eq!(value.get("height"), Some(&Value::Int(480)));
    }

    #[test]
    fn test_unsaved_fields_are_not_written() {
        let style = Style::default();
        let registry = BaseTypeRegistry::new();
        let codec = Codec::new(&style, &registry);
        let mut doc = Document::parse("w:\n    legacy: yes").unwrap();
        let value = Value::Object(
            Fields::new()
                .with("width", Value::from(1))
                .with("height", Value::from(2))
                .with("cache", Value::from("x")),
        );
        doc.encode_at(&codec, &["w"], &value, &window()).unwrap();
        assert_eq!(
            doc.to_text(&style),
            "w:\n    legacy: yes\n    width: 1\n    height: 2"
        );
    }

    #[test]
    fn test_list_children_are_a_mismatch() {
        let style = Style::default();
        let registry = BaseTypeRegistry::new();
        let codec = Codec::new(&style, &registry);
        let doc = Document::parse("w:\n    - 1").unwrap();
        assert!(doc.decode_at(&codec, &["w"], &window()).unwrap_err().is_type());
    }
}
