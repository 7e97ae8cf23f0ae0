//! # succ
//!
//! Human-editable hierarchical configuration files with typed access and
//! minimal-diff editing.
//!
//! ## What is SUCC?
//!
//! SUCC is an indentation-based, line-oriented text format for configuration
//! and save data. Files look like this:
//!
//! ```text
//! # Window settings
//! title: Main window
//! size:
//!     width: 800    # pixels
//!     height: 600
//! recent files:
//!     - notes.txt
//!     - todo.txt
//! motd: """
//!     Welcome back.
//!     Have a nice day.
//!     """
//! ```
//!
//! See [`grammar`] for the full syntax.
//!
//! ## Key Features
//!
//! - **Minimal diffs**: changing one value rewrites only that value's text.
//!   Comments, blank lines, spacing and key order elsewhere stay
//!   byte-for-byte identical.
//! - **Typed access**: any [`Storable`] type can be read and written, from
//!   numbers and strings to collections, maps and structured types.
//! - **Defaults**: a missing key reads from a default file or the type's
//!   zero value, and is added to the file.
//! - **Autosave and reload**: writes save straight away, and an optional file
//!   watcher (feature `watch`) reloads files edited by hand.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! succ = "0.1"
//! ```
//!
//! ### Reading and writing a data file
//!
//! ```rust
//! use succ::{DataFile, MemoryStorage};
//!
//! let storage = MemoryStorage::new("# audio\nvolume: 7 # out of 10\nmuted: false");
//! let file = DataFile::new(storage.clone()).unwrap();
//!
//! assert_eq!(file.get::<u8>("volume").unwrap(), 7);
//! file.set("muted", &true).unwrap();
//!
//! assert_eq!(storage.contents(), "# audio\nvolume: 7 # out of 10\nmuted: true");
//! ```
//!
//! ### Nested paths
//!
//! ```rust
//! use succ::{DataFile, MemoryStorage};
//!
//! let file = DataFile::new(MemoryStorage::empty()).unwrap();
//! file.set_at_path(&["graphics", "window", "width"], &1280u32).unwrap();
//! assert_eq!(file.get_at_path::<u32>(&["graphics", "window", "width"]).unwrap(), 1280);
//! assert_eq!(file.raw_text(), "graphics:\n    window:\n        width: 1280");
//! ```
//!
//! ### Whole documents
//!
//! ```rust
//! use std::collections::BTreeMap;
//!
//! let mut scores = BTreeMap::new();
//! scores.insert("alice".to_string(), 10u32);
//! scores.insert("bob".to_string(), 7u32);
//!
//! let text = succ::to_string(&scores).unwrap();
//! assert_eq!(text, "alice: 10\nbob: 7");
//!
//! let back: BTreeMap<String, u32> = succ::from_str(&text).unwrap();
//! assert_eq!(back, scores);
//! ```
//!
//! ## Modules
//!
//! - [`node`], [`document`], [`parser`], [`ser`]: the text model
//! - [`codec`], [`base_types`], [`descriptor`], [`storable`]: typed values
//! - [`data_file`], [`storage`]: files with defaults and autosave
//! - [`style`]: formatting of new text

#[macro_use]
pub mod macros;

pub mod base_types;
pub mod codec;
mod collections;
mod complex;
pub mod data_file;
pub mod descriptor;
pub mod document;
pub mod error;
pub mod fields;
pub mod grammar;
pub mod node;
pub mod parser;
pub mod ser;
mod shortcuts;
pub mod storable;
pub mod storage;
pub mod style;
pub mod value;
#[cfg(feature = "watch")]
#[cfg_attr(docsrs, doc(cfg(feature = "watch")))]
pub mod watch;

pub use base_types::{add_base_type, BaseTypeRegistry};
pub use codec::Codec;
pub use collections::{ENTRY_KEY, ENTRY_VALUE};
pub use data_file::{DataFile, DataFileOptions, ReadOnlyDataFile, Reloadable};
pub use descriptor::{
    Arguments, ComplexDescriptor, ComplexDescriptorBuilder, Descriptor, EnumDescriptor,
    FieldDescriptor, SaveMarker, Visibility,
};
pub use document::Document;
pub use error::{Error, Result};
pub use fields::Fields;
pub use node::{ChildKind, Line, Node, NodeKind};
pub use ser::Serializer;
pub use storable::Storable;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use style::{BoolStyle, EnumStyle, LineEnding, Style};
pub use value::Value;

use std::io;

/// Writes a structured value or a map as a whole document, one top-level
/// key per field or entry.
///
/// # Errors
///
/// Returns a type error for values that are not structured types or maps
/// with base-type keys, and a key error for map keys that are not valid keys.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T: Storable>(value: &T) -> Result<String> {
    to_string_with_style(value, &Style::default())
}

/// Like [`to_string`], formatting new text with `style`.
///
/// ```rust
/// use std::collections::BTreeMap;
/// use succ::{BoolStyle, Style};
///
/// let mut flags = BTreeMap::new();
/// flags.insert("vsync".to_string(), true);
/// let style = Style::new().with_bool_style(BoolStyle::OnOff);
/// assert_eq!(succ::to_string_with_style(&flags, &style).unwrap(), "vsync: on");
/// ```
///
/// # Errors
///
/// See [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_style<T: Storable>(value: &T, style: &Style) -> Result<String> {
    style.validate()?;
    let registry = BaseTypeRegistry::global();
    let registry = registry.read();
    let mut document = Document::new();
    Codec::new(style, &registry).encode_document(&mut document, &value.to_value(), &T::descriptor())?;
    Ok(document.to_text(style))
}

/// Writes a whole document to `writer`. See [`to_string`].
///
/// # Errors
///
/// See [`to_string`]; I/O failures are storage errors.
pub fn to_writer<W, T>(mut writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: Storable,
{
    let text = to_string(value)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

/// Reads a whole document as a structured value or a map.
///
/// Fields missing from the text keep the value the type's constructor
/// gives them.
///
/// # Errors
///
/// Returns a format error for malformed text and a type error when a value
/// does not match its type.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T: Storable>(text: &str) -> Result<T> {
    let document = Document::parse(text)?;
    let style = Style::default();
    let registry = BaseTypeRegistry::global();
    let registry = registry.read();
    let value = Codec::new(&style, &registry).decode_document(&document, &T::descriptor())?;
    T::from_value(value)
}

/// Reads a whole document from `reader`. See [`from_str`].
///
/// # Errors
///
/// See [`from_str`]; I/O failures are storage errors.
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: Storable,
{
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    from_str(&text)
}
