//! Ordered field map for structured values.
//!
//! [`Fields`] wraps an [`IndexMap`] so the members of a structured value
//! keep the order they were declared in, which is also the order new keys are
//! written to a file.
//!
//! ```rust
//! use succ::{Fields, Value};
//!
//! let mut fields = Fields::new();
//! fields.insert("width", Value::from(800));
//! fields.insert("height", Value::from(600));
//!
//! let keys: Vec<_> = fields.keys().cloned().collect();
//! assert_eq!(keys, vec!["width", "height"]);
//!
//! let width: i32 = fields.take("width").unwrap();
//! assert_eq!(width, 800);
//! ```

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::storable::Storable;
use crate::value::Value;

/// Named members of a structured value, in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fields(IndexMap<String, Value>);

impl Fields {
    #[must_use]
    pub fn new() -> Self {
        Fields(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Fields(IndexMap::with_capacity(capacity))
    }

    /// Inserts a field, returning the previous value if the name was present.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(name.into(), value)
    }

    /// Builder-style insert.
    ///
    /// ```rust
    /// use succ::{Fields, Value};
    ///
    /// let fields = Fields::new().with("a", Value::from(1)).with("b", Value::Null);
    /// assert_eq!(fields.len(), 2);
    /// ```
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.0.get_mut(name)
    }

    /// Removes a field, keeping the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.shift_remove(name)
    }

    /// Removes a field and converts it to `T`.
    ///
    /// A missing field is a type error.
    pub fn take<T: Storable>(&mut self, name: &str) -> Result<T> {
        let value = self
            .remove(name)
            .ok_or_else(|| Error::type_error(format!("missing field `{name}`")))?;
        T::from_value(value)
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Fields(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
