/// Builds a [`Value`](crate::Value) from a literal.
///
/// Objects become [`Value::Object`](crate::Value::Object) with fields in the
/// order written. Any other expression goes through `Value::from`.
///
/// ```rust
/// use succ::{value, Value};
///
/// let window = value!({
///     "title": "main",
///     "size": [800, 600],
///     "icon": null
/// });
/// assert_eq!(window.get("icon"), Some(&Value::Null));
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::value!($elem)),*])
    };

    ({}) => {
        $crate::Value::Object($crate::Fields::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut fields = $crate::Fields::new();
        $(
            fields.insert($key, $crate::value!($value));
        )*
        $crate::Value::Object(fields)
    }};

    ($other:expr) => {
        $crate::Value::from($other)
    };
}

/// Implements [`Storable`](crate::Storable) for an enum whose variants carry
/// no data. Variants are stored by name or by position, as the style says.
///
/// ```rust
/// use succ::{storable_enum, Storable, Value};
///
/// #[derive(Debug, PartialEq)]
/// enum Quality {
///     Low,
///     High,
/// }
///
/// storable_enum!(Quality { Low, High });
///
/// assert_eq!(Quality::High.to_value(), Value::Enum("High".into()));
/// assert_eq!(Quality::from_value(Value::Enum("Low".into())).unwrap(), Quality::Low);
/// ```
#[macro_export]
macro_rules! storable_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::Storable for $ty {
            fn descriptor() -> $crate::Descriptor {
                $crate::Descriptor::enumeration(stringify!($ty), &[$(stringify!($variant)),+])
            }

            fn to_value(&self) -> $crate::Value {
                let name = match self {
                    $($ty::$variant => stringify!($variant),)+
                };
                $crate::Value::Enum(name.to_string())
            }

            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                match value.as_str() {
                    $(Some(stringify!($variant)) => Ok($ty::$variant),)+
                    _ => Err($crate::Error::type_mismatch(stringify!($ty), value.kind_name())),
                }
            }
        }
    };
}
