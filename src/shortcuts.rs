//! Shortcuts: building a structured value from a single line of text.
//!
//! Three forms are tried in order:
//!
//! 1. `(arg, arg, ...)`: matched against the type's initializers. An
//!    initializer matches when it takes as many parameters as there are
//!    arguments and every argument parses as its parameter's base type.
//! 2. `name(arg, ...)`: the factory called `name` with a matching signature.
//! 3. Anything else: the type's custom shortcut hook, if it has one.
//!
//! An initializer or factory that matches but returns an error does not end
//! the search. The remaining candidates and the custom hook still get a turn;
//! the error is reported only when nothing else succeeds.
//!
//! ```text
//! origin: (0, 0)
//! spawn: random(10)
//! ```

use crate::codec::Codec;
use crate::descriptor::{ComplexDescriptor, Descriptor};
use crate::error::{Error, Result};
use crate::value::Value;

pub(crate) fn parse(codec: &Codec<'_>, text: &str, descriptor: &ComplexDescriptor) -> Result<Value> {
    let text = text.trim();
    // A matching initializer or factory that fails lets later forms try.
    let mut failure = None;
    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        let args = split_arguments(inner);
        for initializer in &descriptor.initializers {
            if let Some(values) = bind(codec, &initializer.params, &args) {
                match initializer.call(values) {
                    Ok(value) => return Ok(value),
                    Err(e) => failure = Some(e),
                }
            }
        }
    } else if let (Some(open), true) = (text.find('('), text.ends_with(')')) {
        let name = text[..open].trim();
        let args = split_arguments(&text[open + 1..text.len() - 1]);
        for factory in descriptor.factories.iter().filter(|f| f.name == name) {
            if let Some(values) = bind(codec, &factory.params, &args) {
                match factory.call(values) {
                    Ok(value) => return Ok(value),
                    Err(e) => failure = Some(e),
                }
            }
        }
    }
    if let Some(result) = descriptor.custom_shortcut(text) {
        return result;
    }
    Err(failure.unwrap_or_else(|| {
        Error::type_error(format!("no shortcut of {} matches {text:?}", descriptor.name))
    }))
}

/// Splits on commas that are not inside double quotes. `()` has no arguments.
fn split_arguments(text: &str) -> Vec<&str> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let mut args = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    for (i, c) in text.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => {
                args.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    args.push(text[start..].trim());
    args
}

/// Parses every argument as its parameter's type, or `None` on any mismatch.
fn bind(codec: &Codec<'_>, params: &[Descriptor], args: &[&str]) -> Option<Vec<Value>> {
    if params.len() != args.len() {
        return None;
    }
    params
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            if codec.registry().is_base(param) {
                codec.registry().decode(param, arg).ok()
            } else {
                None
            }
        })
        .collect()
}
