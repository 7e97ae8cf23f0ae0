//! Conversion between Rust types and [`Value`].
//!
//! A [`Storable`] type knows its [`Descriptor`] and how to turn itself into a
//! [`Value`] and back. The crate implements it for the built-in base types,
//! `Option`, the standard sequences and maps, `chrono::NaiveDateTime` and
//! `num_bigint::BigInt`. Enumerations can use
//! [`storable_enum!`](crate::storable_enum); structured types implement the
//! trait by hand:
//!
//! ```rust
//! use succ::{ComplexDescriptor, Descriptor, FieldDescriptor, Fields, Result, Storable, Value};
//!
//! #[derive(Debug, PartialEq)]
//! struct Window {
//!     width: u32,
//!     title: String,
//! }
//!
//! impl Storable for Window {
//!     fn descriptor() -> Descriptor {
//!         ComplexDescriptor::builder("Window", || {
//!             Window { width: 640, title: String::new() }.to_value()
//!         })
//!         .field(FieldDescriptor::of::<u32>("width"))
//!         .field(FieldDescriptor::of::<String>("title"))
//!         .build()
//!     }
//!
//!     fn to_value(&self) -> Value {
//!         Value::Object(
//!             Fields::new()
//!                 .with("width", self.width.to_value())
//!                 .with("title", self.title.to_value()),
//!         )
//!     }
//!
//!     fn from_value(value: Value) -> Result<Self> {
//!         let mut fields = value.into_object()?;
//!         Ok(Window {
//!             width: fields.take("width")?,
//!             title: fields.take("title")?,
//!         })
//!     }
//! }
//!
//! let window = Window { width: 800, title: "main".into() };
//! assert_eq!(Window::from_value(window.to_value()).unwrap(), window);
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use num_bigint::BigInt;

use crate::base_types;
use crate::descriptor::Descriptor;
use crate::error::{Error, Result};
use crate::value::Value;

/// A type that can be read from and written to a SUCC document.
pub trait Storable: Sized {
    /// How values of this type are laid out in a document.
    fn descriptor() -> Descriptor;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch<T>(expected: &str, value: &Value) -> Result<T> {
    Err(Error::type_mismatch(expected, value.kind_name()))
}

impl Storable for bool {
    fn descriptor() -> Descriptor {
        Descriptor::base(base_types::BOOL)
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        value.as_bool().map_or_else(|| mismatch(base_types::BOOL, &value), Ok)
    }
}

macro_rules! storable_signed {
    ($($ty:ty => $name:ident),*) => {$(
        impl Storable for $ty {
            fn descriptor() -> Descriptor {
                Descriptor::base(base_types::$name)
            }

            fn to_value(&self) -> Value {
                Value::from(*self)
            }

            fn from_value(value: Value) -> Result<Self> {
                let n = match value.as_i64() {
                    Some(n) => n,
                    None => return mismatch(base_types::$name, &value),
                };
                <$ty>::try_from(n).map_err(|_| {
                    Error::type_error(format!("{n} is out of range for {}", base_types::$name))
                })
            }
        }
    )*};
}

macro_rules! storable_unsigned {
    ($($ty:ty => $name:ident),*) => {$(
        impl Storable for $ty {
            fn descriptor() -> Descriptor {
                Descriptor::base(base_types::$name)
            }

            fn to_value(&self) -> Value {
                Value::from(*self)
            }

            fn from_value(value: Value) -> Result<Self> {
                let n = match value.as_u64() {
                    Some(n) => n,
                    None => return mismatch(base_types::$name, &value),
                };
                <$ty>::try_from(n).map_err(|_| {
                    Error::type_error(format!("{n} is out of range for {}", base_types::$name))
                })
            }
        }
    )*};
}

storable_signed!(i8 => I8, i16 => I16, i32 => I32, i64 => I64);
storable_unsigned!(u8 => U8, u16 => U16, u32 => U32, u64 => U64);

impl Storable for f32 {
    fn descriptor() -> Descriptor {
        Descriptor::base(base_types::F32)
    }

    fn to_value(&self) -> Value {
        Value::from(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        value
            .as_f64()
            .map_or_else(|| mismatch(base_types::F32, &value), |x| Ok(x as f32))
    }
}

impl Storable for f64 {
    fn descriptor() -> Descriptor {
        Descriptor::base(base_types::F64)
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        value.as_f64().map_or_else(|| mismatch(base_types::F64, &value), Ok)
    }
}

impl Storable for char {
    fn descriptor() -> Descriptor {
        Descriptor::base(base_types::CHAR)
    }

    fn to_value(&self) -> Value {
        Value::Char(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        value.as_char().map_or_else(|| mismatch(base_types::CHAR, &value), Ok)
    }
}

impl Storable for String {
    fn descriptor() -> Descriptor {
        Descriptor::base(base_types::STRING)
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => mismatch(base_types::STRING, &other),
        }
    }
}

impl Storable for NaiveDateTime {
    fn descriptor() -> Descriptor {
        Descriptor::base(base_types::DATE_TIME)
    }

    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            other => mismatch(base_types::DATE_TIME, &other),
        }
    }
}

impl Storable for BigInt {
    fn descriptor() -> Descriptor {
        Descriptor::base(base_types::BIG_INT)
    }

    fn to_value(&self) -> Value {
        Value::BigInt(self.clone())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::BigInt(bi) => Ok(bi),
            Value::Int(i) => Ok(BigInt::from(i)),
            Value::UInt(u) => Ok(BigInt::from(u)),
            other => mismatch(base_types::BIG_INT, &other),
        }
    }
}

/// `None` is written as `null`.
impl<T: Storable> Storable for Option<T> {
    fn descriptor() -> Descriptor {
        T::descriptor()
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, T::to_value)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

fn items_of<T: Storable>(value: Value) -> Result<impl Iterator<Item = Result<T>>> {
    Ok(value.into_array()?.into_iter().map(T::from_value))
}

impl<T: Storable> Storable for Vec<T> {
    fn descriptor() -> Descriptor {
        Descriptor::list(T::descriptor())
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(T::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        items_of(value)?.collect()
    }
}

impl<T: Storable, const N: usize> Storable for [T; N] {
    fn descriptor() -> Descriptor {
        Descriptor::array(T::descriptor())
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(T::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        let items: Vec<T> = items_of(value)?.collect::<Result<_>>()?;
        let found = items.len();
        items.try_into().map_err(|_| {
            Error::type_error(format!("expected an array of {N} items, found {found}"))
        })
    }
}

impl<T: Storable + Eq + Hash> Storable for HashSet<T> {
    fn descriptor() -> Descriptor {
        Descriptor::set(T::descriptor())
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(T::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        items_of(value)?.collect()
    }
}

impl<T: Storable + Ord> Storable for BTreeSet<T> {
    fn descriptor() -> Descriptor {
        Descriptor::set(T::descriptor())
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(T::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        items_of(value)?.collect()
    }
}

fn entries_of<K: Storable, V: Storable>(
    value: Value,
) -> Result<impl Iterator<Item = Result<(K, V)>>> {
    Ok(value
        .into_map()?
        .into_iter()
        .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?))))
}

macro_rules! storable_map {
    ($map:ident, $($bound:path),+) => {
        impl<K, V> Storable for $map<K, V>
        where
            K: Storable $(+ $bound)+,
            V: Storable,
        {
            fn descriptor() -> Descriptor {
                Descriptor::map(K::descriptor(), V::descriptor())
            }

            fn to_value(&self) -> Value {
                Value::Map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
            }

            fn from_value(value: Value) -> Result<Self> {
                entries_of(value)?.collect()
            }
        }
    };
}

storable_map!(HashMap, Eq, Hash);
storable_map!(IndexMap, Eq, Hash);
storable_map!(BTreeMap, Ord);
