//! Type descriptors.
//!
//! A [`Descriptor`] tells the codec how a [`Value`] is laid out in a
//! document: as one line of base-type text, as list items, as keys, or as the
//! fields of a structured value. Rust types describe themselves through
//! [`Storable::descriptor`](crate::Storable::descriptor); descriptors can also
//! be built by hand for dynamic data.
//!
//! ```rust
//! use succ::{base_types, Descriptor, Storable};
//!
//! let list_of_ints = Descriptor::list(Descriptor::base(base_types::I32));
//! assert_eq!(list_of_ints.name(), Vec::<i32>::descriptor().name());
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use num_bigint::BigInt;

use crate::error::{Error, Result};
use crate::storable::Storable;
use crate::value::Value;

/// How a value is represented in a document.
#[derive(Clone, Debug)]
pub enum Descriptor {
    /// A type encoded as a single line of text by the base-type registry.
    Base(Cow<'static, str>),
    Enum(Arc<EnumDescriptor>),
    /// Fixed-length sequence, written as list items.
    Array(Box<Descriptor>),
    /// Growable sequence, written as list items.
    List(Box<Descriptor>),
    /// Unordered sequence without duplicates, written as list items.
    Set(Box<Descriptor>),
    Map {
        key: Box<Descriptor>,
        value: Box<Descriptor>,
    },
    /// A structured value with named fields.
    Complex(Arc<ComplexDescriptor>),
}

impl Descriptor {
    #[must_use]
    pub fn base(name: impl Into<Cow<'static, str>>) -> Self {
        Descriptor::Base(name.into())
    }

    /// Describes an enumeration with the given variant names, in ordinal order.
    #[must_use]
    pub fn enumeration(name: &str, variants: &[&str]) -> Self {
        Descriptor::Enum(Arc::new(EnumDescriptor::new(name, variants)))
    }

    #[must_use]
    pub fn array(element: Descriptor) -> Self {
        Descriptor::Array(Box::new(element))
    }

    #[must_use]
    pub fn list(element: Descriptor) -> Self {
        Descriptor::List(Box::new(element))
    }

    #[must_use]
    pub fn set(element: Descriptor) -> Self {
        Descriptor::Set(Box::new(element))
    }

    #[must_use]
    pub fn map(key: Descriptor, value: Descriptor) -> Self {
        Descriptor::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// The descriptor of a [`Storable`] type.
    #[must_use]
    pub fn of<T: Storable>() -> Self {
        T::descriptor()
    }

    /// Human-readable type name for error messages.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Descriptor::Base(name) => name.to_string(),
            Descriptor::Enum(e) => e.name.clone(),
            Descriptor::Array(element) => format!("[{}]", element.name()),
            Descriptor::List(element) => format!("List<{}>", element.name()),
            Descriptor::Set(element) => format!("Set<{}>", element.name()),
            Descriptor::Map { key, value } => format!("Map<{}, {}>", key.name(), value.name()),
            Descriptor::Complex(c) => c.name.clone(),
        }
    }

    /// The value a missing key reads as when no default is available.
    ///
    /// Numbers are zero, booleans false, strings empty, enums their first
    /// variant, sequences and maps empty, and structured values whatever their
    /// constructor builds. Types without a natural zero read as null.
    ///
    /// ```rust
    /// use succ::{Descriptor, Storable, Value};
    ///
    /// assert_eq!(i32::descriptor().zero_value(), Value::Int(0));
    /// assert_eq!(String::descriptor().zero_value(), Value::from(""));
    /// assert_eq!(char::descriptor().zero_value(), Value::Null);
    /// assert_eq!(num_bigint::BigInt::descriptor().zero_value(), Value::BigInt(0.into()));
    /// ```
    #[must_use]
    pub fn zero_value(&self) -> Value {
        use crate::base_types as names;

        match self {
            Descriptor::Base(name) => match name.as_ref() {
                names::BOOL => Value::Bool(false),
                names::I8 | names::I16 | names::I32 | names::I64 => Value::Int(0),
                names::U8 | names::U16 | names::U32 | names::U64 => Value::UInt(0),
                names::F32 | names::F64 => Value::Float(0.0),
                names::STRING => Value::String(String::new()),
                names::BIG_INT => Value::BigInt(BigInt::default()),
                _ => Value::Null,
            },
            Descriptor::Enum(e) => e
                .variants
                .first()
                .map_or(Value::Null, |v| Value::Enum(v.clone())),
            Descriptor::Array(_) | Descriptor::List(_) | Descriptor::Set(_) => {
                Value::Array(Vec::new())
            }
            Descriptor::Map { .. } => Value::Map(Vec::new()),
            Descriptor::Complex(c) => c.construct(),
        }
    }
}

/// Variant names of an enumeration, in ordinal order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumDescriptor {
    pub name: String,
    pub variants: Vec<String>,
}

impl EnumDescriptor {
    #[must_use]
    pub fn new(name: &str, variants: &[&str]) -> Self {
        EnumDescriptor {
            name: name.to_string(),
            variants: variants.iter().map(|v| (*v).to_string()).collect(),
        }
    }

    #[must_use]
    pub fn ordinal(&self, variant: &str) -> Option<usize> {
        self.variants.iter().position(|v| v == variant)
    }
}

/// Whether a field is part of a type's public surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Explicit opt-in or opt-out from saving a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SaveMarker {
    #[default]
    Unmarked,
    /// Save even though the field is private.
    DoSave,
    /// Never save.
    DontSave,
}

type DescriptorFn = Arc<dyn Fn() -> Descriptor + Send + Sync>;

/// One field of a structured type.
///
/// The field's descriptor is resolved lazily so a type may contain itself.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub visibility: Visibility,
    pub marker: SaveMarker,
    descriptor: DescriptorFn,
}

impl FieldDescriptor {
    /// A public field of [`Storable`] type `T`.
    #[must_use]
    pub fn of<T: Storable + 'static>(name: &str) -> Self {
        FieldDescriptor {
            name: name.to_string(),
            visibility: Visibility::Public,
            marker: SaveMarker::Unmarked,
            descriptor: Arc::new(T::descriptor),
        }
    }

    /// A public field with an explicit descriptor.
    #[must_use]
    pub fn new(name: &str, descriptor: Descriptor) -> Self {
        FieldDescriptor {
            name: name.to_string(),
            visibility: Visibility::Public,
            marker: SaveMarker::Unmarked,
            descriptor: Arc::new(move || descriptor.clone()),
        }
    }

    #[must_use]
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    #[must_use]
    pub fn do_save(mut self) -> Self {
        self.marker = SaveMarker::DoSave;
        self
    }

    #[must_use]
    pub fn dont_save(mut self) -> Self {
        self.marker = SaveMarker::DontSave;
        self
    }

    #[must_use]
    pub fn descriptor(&self) -> Descriptor {
        (self.descriptor)()
    }

    /// Public unmarked fields and `DoSave` fields are saved; `DontSave` never is.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        match self.marker {
            SaveMarker::DontSave => false,
            SaveMarker::DoSave => true,
            SaveMarker::Unmarked => self.visibility == Visibility::Public,
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("marker", &self.marker)
            .finish_non_exhaustive()
    }
}

/// Positional arguments parsed from a shortcut, consumed in order.
#[derive(Debug, Clone)]
pub struct Arguments(std::vec::IntoIter<Value>);

impl Arguments {
    pub(crate) fn new(values: Vec<Value>) -> Self {
        Arguments(values.into_iter())
    }

    /// Converts the next argument to `T`.
    pub fn next<T: Storable>(&mut self) -> Result<T> {
        let value = self
            .0
            .next()
            .ok_or_else(|| Error::type_error("not enough shortcut arguments"))?;
        T::from_value(value)
    }
}

type BuildFn = Arc<dyn Fn(Arguments) -> Result<Value> + Send + Sync>;
type ConstructFn = Arc<dyn Fn() -> Value + Send + Sync>;
type ShortcutFn = Arc<dyn Fn(&str) -> Result<Value> + Send + Sync>;

/// Builds a value from base-type arguments: `(1, "two", true)`.
#[derive(Clone)]
pub struct Initializer {
    pub params: Vec<Descriptor>,
    build: BuildFn,
}

impl Initializer {
    pub(crate) fn call(&self, args: Vec<Value>) -> Result<Value> {
        (self.build)(Arguments::new(args))
    }
}

/// A named constructor: `name(arg, ...)`.
#[derive(Clone)]
pub struct Factory {
    pub name: String,
    pub params: Vec<Descriptor>,
    build: BuildFn,
}

impl Factory {
    pub(crate) fn call(&self, args: Vec<Value>) -> Result<Value> {
        (self.build)(Arguments::new(args))
    }
}

/// Describes a structured type: its fields and the ways to build it.
pub struct ComplexDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    pub initializers: Vec<Initializer>,
    pub factories: Vec<Factory>,
    construct: ConstructFn,
    shortcut: Option<ShortcutFn>,
}

impl ComplexDescriptor {
    /// Starts describing a type. `construct` builds its default value, which
    /// is what a structured node with no children decodes to.
    pub fn builder<F>(name: &str, construct: F) -> ComplexDescriptorBuilder
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        ComplexDescriptorBuilder {
            inner: ComplexDescriptor {
                name: name.to_string(),
                fields: Vec::new(),
                initializers: Vec::new(),
                factories: Vec::new(),
                construct: Arc::new(construct),
                shortcut: None,
            },
        }
    }

    /// The default value from the zero-argument constructor.
    #[must_use]
    pub fn construct(&self) -> Value {
        (self.construct)()
    }

    pub fn saved_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|field| field.is_saved())
    }

    pub(crate) fn custom_shortcut(&self, text: &str) -> Option<Result<Value>> {
        self.shortcut.as_ref().map(|hook| hook(text))
    }
}

impl fmt::Debug for ComplexDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComplexDescriptor")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("initializers", &self.initializers.len())
            .field("factories", &self.factories.len())
            .field("shortcut", &self.shortcut.is_some())
            .finish()
    }
}

/// Builder returned by [`ComplexDescriptor::builder`].
///
/// ```rust
/// use succ::{ComplexDescriptor, Descriptor, FieldDescriptor, Fields, Value};
///
/// let point = ComplexDescriptor::builder("Point", || {
///     Value::Object(Fields::new().with("x", Value::from(0)).with("y", Value::from(0)))
/// })
/// .field(FieldDescriptor::of::<i32>("x"))
/// .field(FieldDescriptor::of::<i32>("y"))
/// .initializer(vec![Descriptor::of::<i32>(), Descriptor::of::<i32>()], |mut args| {
///     let x: i32 = args.next()?;
///     let y: i32 = args.next()?;
///     Ok(Value::Object(Fields::new().with("x", Value::from(x)).with("y", Value::from(y))))
/// })
/// .build();
///
/// assert_eq!(point.name(), "Point");
/// ```
pub struct ComplexDescriptorBuilder {
    inner: ComplexDescriptor,
}

impl ComplexDescriptorBuilder {
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.inner.fields.push(field);
        self
    }

    /// Adds a constructor usable from `(arg, ...)` shortcuts. Parameters
    /// must be base types or enums.
    #[must_use]
    pub fn initializer<F>(mut self, params: Vec<Descriptor>, build: F) -> Self
    where
        F: Fn(Arguments) -> Result<Value> + Send + Sync + 'static,
    {
        self.inner.initializers.push(Initializer {
            params,
            build: Arc::new(build),
        });
        self
    }

    /// Adds a named constructor usable from `name(arg, ...)` shortcuts.
    #[must_use]
    pub fn factory<F>(mut self, name: &str, params: Vec<Descriptor>, build: F) -> Self
    where
        F: Fn(Arguments) -> Result<Value> + Send + Sync + 'static,
    {
        self.inner.factories.push(Factory {
            name: name.to_string(),
            params,
            build: Arc::new(build),
        });
        self
    }

    /// Adds a hook that parses any other shortcut text.
    #[must_use]
    pub fn shortcut<F>(mut self, parse: F) -> Self
    where
        F: Fn(&str) -> Result<Value> + Send + Sync + 'static,
    {
        self.inner.shortcut = Some(Arc::new(parse));
        self
    }

    #[must_use]
    pub fn build(self) -> Descriptor {
        Descriptor::Complex(Arc::new(self.inner))
    }
}
