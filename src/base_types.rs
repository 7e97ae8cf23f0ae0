//! Base types: values written as a single line of text.
//!
//! The [`BaseTypeRegistry`] maps a base type name to a pair of functions that
//! convert a [`Value`] to text and back. It ships with the built-in types
//! named by the constants in this module. Applications can add their own
//! with [`BaseTypeRegistry::register`] or, process-wide, [`add_base_type`].
//!
//! ```rust
//! use succ::base_types::{self, BaseTypeRegistry};
//! use succ::{Descriptor, Style, Value};
//!
//! let registry = BaseTypeRegistry::new();
//! let style = Style::default();
//! let f64_type = Descriptor::base(base_types::F64);
//!
//! assert_eq!(registry.encode(&f64_type, &Value::from(f64::INFINITY), &style).unwrap(), "infinity");
//! assert_eq!(registry.decode(&f64_type, "1/4").unwrap(), Value::Float(0.25));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use num_bigint::BigInt;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::descriptor::{Descriptor, EnumDescriptor};
use crate::error::{Error, Result};
use crate::node::{MULTI_LINE_TERMINATOR, NULL_VALUE};
use crate::style::{EnumStyle, Style};
use crate::value::Value;

pub const BOOL: &str = "bool";
pub const I8: &str = "i8";
pub const I16: &str = "i16";
pub const I32: &str = "i32";
pub const I64: &str = "i64";
pub const U8: &str = "u8";
pub const U16: &str = "u16";
pub const U32: &str = "u32";
pub const U64: &str = "u64";
pub const F32: &str = "f32";
pub const F64: &str = "f64";
pub const CHAR: &str = "char";
pub const STRING: &str = "string";
pub const DATE_TIME: &str = "datetime";
pub const BIG_INT: &str = "bigint";

/// Layout of date/time values: `2024-03-01 13:45:00`.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub type EncodeFn = Arc<dyn Fn(&Value, &Style) -> Result<String> + Send + Sync>;
pub type DecodeFn = Arc<dyn Fn(&str) -> Result<Value> + Send + Sync>;

#[derive(Clone)]
struct BaseCodec {
    encode: EncodeFn,
    decode: DecodeFn,
}

impl BaseCodec {
    fn new<E, D>(encode: E, decode: D) -> Self
    where
        E: Fn(&Value, &Style) -> Result<String> + Send + Sync + 'static,
        D: Fn(&str) -> Result<Value> + Send + Sync + 'static,
    {
        BaseCodec {
            encode: Arc::new(encode),
            decode: Arc::new(decode),
        }
    }
}

/// Encoders and decoders for every base type, by name.
#[derive(Clone)]
pub struct BaseTypeRegistry {
    codecs: HashMap<String, BaseCodec>,
}

static GLOBAL: Lazy<Arc<RwLock<BaseTypeRegistry>>> =
    Lazy::new(|| Arc::new(RwLock::new(BaseTypeRegistry::new())));

impl Default for BaseTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BaseTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.codecs.keys().collect();
        names.sort();
        f.debug_struct("BaseTypeRegistry")
            .field("types", &names)
            .finish()
    }
}

impl BaseTypeRegistry {
    /// Creates a registry holding the built-in base types.
    #[must_use]
    pub fn new() -> Self {
        let mut codecs = HashMap::new();
        codecs.insert(
            BOOL.to_string(),
            BaseCodec::new(encode_bool, decode_bool),
        );
        for (name, min, max) in [
            (I8, i128::from(i8::MIN), i128::from(i8::MAX)),
            (I16, i128::from(i16::MIN), i128::from(i16::MAX)),
            (I32, i128::from(i32::MIN), i128::from(i32::MAX)),
            (I64, i128::from(i64::MIN), i128::from(i64::MAX)),
            (U8, 0, i128::from(u8::MAX)),
            (U16, 0, i128::from(u16::MAX)),
            (U32, 0, i128::from(u32::MAX)),
            (U64, 0, i128::from(u64::MAX)),
        ] {
            codecs.insert(name.to_string(), integer_codec(name, min, max));
        }
        codecs.insert(
            F32.to_string(),
            BaseCodec::new(|v, _| encode_float(v, true), |t| decode_float(t, true)),
        );
        codecs.insert(
            F64.to_string(),
            BaseCodec::new(|v, _| encode_float(v, false), |t| decode_float(t, false)),
        );
        codecs.insert(CHAR.to_string(), BaseCodec::new(encode_char, decode_char));
        codecs.insert(
            STRING.to_string(),
            BaseCodec::new(
                |v, style| match v {
                    Value::String(s) => Ok(encode_string(s, style)),
                    other => Err(Error::type_mismatch(STRING, other.kind_name())),
                },
                |t| Ok(Value::String(decode_string(t))),
            ),
        );
        codecs.insert(
            DATE_TIME.to_string(),
            BaseCodec::new(encode_date_time, decode_date_time),
        );
        codecs.insert(
            BIG_INT.to_string(),
            BaseCodec::new(encode_big_int, decode_big_int),
        );
        BaseTypeRegistry { codecs }
    }

    /// The process-wide registry used by data files unless another is injected.
    #[must_use]
    pub fn global() -> Arc<RwLock<BaseTypeRegistry>> {
        Arc::clone(&GLOBAL)
    }

    /// Registers a new base type.
    ///
    /// Registering a name twice is a type error.
    ///
    /// ```rust
    /// use succ::base_types::BaseTypeRegistry;
    /// use succ::{Descriptor, Error, Style, Value};
    ///
    /// let mut registry = BaseTypeRegistry::new();
    /// registry
    ///     .register(
    ///         "percent",
    ///         |value, _style| {
    ///             let n = value.as_i64().ok_or_else(|| Error::type_mismatch("percent", value.kind_name()))?;
    ///             Ok(format!("{n}%"))
    ///         },
    ///         |text| {
    ///             let n = text.trim_end_matches('%').parse::<i64>().map_err(Error::custom)?;
    ///             Ok(Value::Int(n))
    ///         },
    ///     )
    ///     .unwrap();
    ///
    /// let percent = Descriptor::base("percent");
    /// assert_eq!(registry.encode(&percent, &Value::Int(40), &Style::default()).unwrap(), "40%");
    /// assert!(registry.register("percent", |_, _| Ok(String::new()), |_| Ok(Value::Null)).is_err());
    /// ```
    pub fn register<E, D>(&mut self, name: &str, encode: E, decode: D) -> Result<()>
    where
        E: Fn(&Value, &Style) -> Result<String> + Send + Sync + 'static,
        D: Fn(&str) -> Result<Value> + Send + Sync + 'static,
    {
        if self.codecs.contains_key(name) {
            return Err(Error::type_error(format!(
                "base type {name:?} is already registered"
            )));
        }
        self.codecs
            .insert(name.to_string(), BaseCodec::new(encode, decode));
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.codecs.contains_key(name)
    }

    /// Whether values of this descriptor are written as one line of text.
    #[must_use]
    pub fn is_base(&self, descriptor: &Descriptor) -> bool {
        match descriptor {
            Descriptor::Base(name) => self.contains(name),
            Descriptor::Enum(_) => true,
            _ => false,
        }
    }

    fn codec(&self, name: &str) -> Result<&BaseCodec> {
        self.codecs
            .get(name)
            .ok_or_else(|| Error::type_error(format!("{name:?} is not a registered base type")))
    }

    /// Converts a base-type or enum value to its single-line text.
    pub fn encode(&self, descriptor: &Descriptor, value: &Value, style: &Style) -> Result<String> {
        let text = match descriptor {
            Descriptor::Base(name) => (self.codec(name)?.encode)(value, style)?,
            Descriptor::Enum(e) => encode_enum(e, value, style)?,
            other => {
                return Err(Error::type_error(format!(
                    "{} is not a base type",
                    other.name()
                )))
            }
        };
        if text.contains(['\n', '\r', '\t']) || text == MULTI_LINE_TERMINATOR {
            return Err(Error::type_error(format!(
                "{} encoded to text that cannot fit on one line: {text:?}",
                descriptor.name()
            )));
        }
        Ok(text)
    }

    /// Parses a base-type or enum value from text.
    pub fn decode(&self, descriptor: &Descriptor, text: &str) -> Result<Value> {
        match descriptor {
            Descriptor::Base(name) => (self.codec(name)?.decode)(text),
            Descriptor::Enum(e) => decode_enum(e, text),
            other => Err(Error::type_error(format!(
                "{} is not a base type",
                other.name()
            ))),
        }
    }
}

/// Registers a base type in the process-wide registry.
pub fn add_base_type<E, D>(name: &str, encode: E, decode: D) -> Result<()>
where
    E: Fn(&Value, &Style) -> Result<String> + Send + Sync + 'static,
    D: Fn(&str) -> Result<Value> + Send + Sync + 'static,
{
    GLOBAL.write().register(name, encode, decode)
}

fn needs_quotes(s: &str) -> bool {
    s.starts_with(char::is_whitespace)
        || s.ends_with(char::is_whitespace)
        || (s.len() > 1 && s.starts_with('"') && s.ends_with('"'))
        || s == NULL_VALUE
}

/// Text for a single-line string. Tabs become four spaces; the result is
/// quoted when it would otherwise read back differently.
#[must_use]
pub fn encode_string(value: &str, style: &Style) -> String {
    if value.is_empty() {
        return String::new();
    }
    let value = value.replace('\t', "    ");
    // `"` quoted would read as the block terminator.
    let quote = (style.always_quote_strings && value != "\"") || needs_quotes(&value);
    if quote {
        format!("\"{value}\"")
    } else {
        value
    }
}

/// Inverse of [`encode_string`]: strips one pair of surrounding quotes.
#[must_use]
pub fn decode_string(text: &str) -> String {
    if text.len() > 1 && text.starts_with('"') && text.ends_with('"') {
        text[1..text.len() - 1].to_string()
    } else {
        text.to_string()
    }
}

fn encode_bool(value: &Value, style: &Style) -> Result<String> {
    let b = value
        .as_bool()
        .ok_or_else(|| Error::type_mismatch(BOOL, value.kind_name()))?;
    Ok(style.bool_style.text_for(b).to_string())
}

fn decode_bool(text: &str) -> Result<Value> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "y" => Ok(Value::Bool(true)),
        "false" | "off" | "no" | "n" => Ok(Value::Bool(false)),
        _ => Err(Error::type_mismatch(BOOL, text)),
    }
}

fn integer_of(value: &Value) -> Option<i128> {
    match value {
        Value::Int(i) => Some(i128::from(*i)),
        Value::UInt(u) => Some(i128::from(*u)),
        _ => None,
    }
}

fn integer_codec(name: &'static str, min: i128, max: i128) -> BaseCodec {
    let out_of_range = move |n: i128| {
        Error::type_error(format!("{n} is out of range for {name} ({min}..={max})"))
    };
    BaseCodec::new(
        move |value, _| {
            let n = integer_of(value).ok_or_else(|| Error::type_mismatch(name, value.kind_name()))?;
            if n < min || n > max {
                return Err(out_of_range(n));
            }
            Ok(n.to_string())
        },
        move |text| {
            let n: i128 = text
                .trim()
                .parse()
                .map_err(|_| Error::type_mismatch(name, text))?;
            if n < min || n > max {
                return Err(out_of_range(n));
            }
            // In range for the target width, so the casts are exact.
            Ok(if min < 0 {
                Value::Int(n as i64)
            } else {
                Value::UInt(n as u64)
            })
        },
    )
}

fn encode_float(value: &Value, single: bool) -> Result<String> {
    let name = if single { F32 } else { F64 };
    let x = value
        .as_f64()
        .ok_or_else(|| Error::type_mismatch(name, value.kind_name()))?;
    Ok(if x.is_nan() {
        "nan".to_string()
    } else if x == f64::INFINITY {
        "infinity".to_string()
    } else if x == f64::NEG_INFINITY {
        "-infinity".to_string()
    } else if single {
        format!("{}", x as f32)
    } else {
        format!("{x}")
    })
}

fn parse_float(text: &str, single: bool) -> Option<f64> {
    let text = text.trim();
    match text.to_ascii_lowercase().as_str() {
        "infinity" | "+infinity" | "inf" => return Some(f64::INFINITY),
        "-infinity" | "-inf" => return Some(f64::NEG_INFINITY),
        "nan" => return Some(f64::NAN),
        _ => {}
    }
    if single {
        text.parse::<f32>().ok().map(f64::from)
    } else {
        text.parse::<f64>().ok()
    }
}

/// Accepts decimal text, `infinity`, `-infinity`, `nan`, and rationals such as
/// `1/3` (evaluated left to right).
fn decode_float(text: &str, single: bool) -> Result<Value> {
    let name = if single { F32 } else { F64 };
    let mismatch = || Error::type_mismatch(name, text);
    if !text.contains('/') {
        return parse_float(text, single).map(Value::Float).ok_or_else(mismatch);
    }
    let mut parts = text.split('/');
    let first = parts.next().ok_or_else(mismatch)?;
    let mut result = parse_float(first, false).ok_or_else(mismatch)?;
    for part in parts {
        result /= parse_float(part, false).ok_or_else(mismatch)?;
    }
    if single {
        result = f64::from(result as f32);
    }
    Ok(Value::Float(result))
}

fn encode_char(value: &Value, style: &Style) -> Result<String> {
    let c = value
        .as_char()
        .ok_or_else(|| Error::type_mismatch(CHAR, value.kind_name()))?;
    Ok(encode_string(&c.to_string(), style))
}

fn decode_char(text: &str) -> Result<Value> {
    decode_string(text)
        .chars()
        .next()
        .map(Value::Char)
        .ok_or_else(|| Error::type_mismatch(CHAR, "empty text"))
}

fn encode_date_time(value: &Value, _: &Style) -> Result<String> {
    let dt = value
        .as_datetime()
        .ok_or_else(|| Error::type_mismatch(DATE_TIME, value.kind_name()))?;
    Ok(dt.format(DATE_TIME_FORMAT).to_string())
}

fn decode_date_time(text: &str) -> Result<Value> {
    NaiveDateTime::parse_from_str(text.trim(), DATE_TIME_FORMAT)
        .map(Value::DateTime)
        .map_err(|e| Error::type_error(format!("invalid date/time {text:?}: {e}")))
}

fn encode_big_int(value: &Value, _: &Style) -> Result<String> {
    match value {
        Value::BigInt(bi) => Ok(bi.to_string()),
        Value::Int(i) => Ok(i.to_string()),
        Value::UInt(u) => Ok(u.to_string()),
        other => Err(Error::type_mismatch(BIG_INT, other.kind_name())),
    }
}

fn decode_big_int(text: &str) -> Result<Value> {
    text.trim()
        .parse::<BigInt>()
        .map(Value::BigInt)
        .map_err(|_| Error::type_mismatch(BIG_INT, text))
}

fn encode_enum(e: &EnumDescriptor, value: &Value, style: &Style) -> Result<String> {
    let variant = value
        .as_str()
        .ok_or_else(|| Error::type_mismatch(&e.name, value.kind_name()))?;
    let ordinal = e
        .ordinal(variant)
        .ok_or_else(|| Error::type_error(format!("{variant:?} is not a variant of {}", e.name)))?;
    Ok(match style.enum_style {
        EnumStyle::Name => variant.to_string(),
        EnumStyle::Number => ordinal.to_string(),
    })
}

/// Accepts either a variant name or its ordinal, whatever the style.
fn decode_enum(e: &EnumDescriptor, text: &str) -> Result<Value> {
    let text = text.trim();
    let variant = match text.parse::<usize>() {
        Ok(ordinal) => e.variants.get(ordinal),
        Err(_) => e.variants.iter().find(|v| *v == text),
    };
    variant
        .map(|v| Value::Enum(v.clone()))
        .ok_or_else(|| Error::type_mismatch(&e.name, text))
}
