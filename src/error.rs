//! Error types for SUCC parsing, encoding and storage.
//!
//! Every fallible operation in this crate returns [`Result`], whose error side
//! is the single [`Error`] enum below.
//!
//! ## Error Categories
//!
//! - **Format**: the text is not valid SUCC (tabs, bad indentation, an
//!   unterminated multi-line string, ...). Carries a 1-based line number.
//! - **Structure**: an edit would produce an invalid tree, such as list items
//!   and keys under the same node.
//! - **Invalid key**: a key that can never be written as a line.
//! - **Type**: a value cannot be converted to or from the requested type.
//! - **Storage**: reading or writing the backing store failed.
//!
//! ## Examples
//!
//! ```rust
//! use succ::Document;
//!
//! let err = Document::parse("name:\n\tvalue: 1").unwrap_err();
//! assert!(err.is_format());
//! assert!(err.to_string().contains("line 2"));
//! ```

use thiserror::Error;

/// Represents all possible errors raised while reading, editing or saving SUCC data.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The text could not be parsed.
    #[error("Format error at line {line}: {msg}\n{context}")]
    Format {
        line: usize,
        msg: String,
        context: String,
    },

    /// An edit would break the shape of the tree.
    #[error("Structure error: {0}")]
    Structure(String),

    /// A key that cannot be written as a SUCC line.
    #[error("Invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// A value could not be encoded or decoded.
    #[error("Type error: {0}")]
    Type(String),

    /// The data held by a node does not match the requested type.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Reading or writing the backing store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A [`Style`](crate::Style) violates its own constraints.
    #[error("Invalid style: {0}")]
    InvalidStyle(String),

    /// Raised by user-supplied codecs, initializers and shortcut hooks.
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a format error for the given 1-based line.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use succ::Error;
    ///
    /// let err = Error::format(3, "tabs are not allowed", "\tkey: value");
    /// assert!(err.to_string().contains("line 3"));
    /// ```
    pub fn format(line: usize, msg: &str, context: &str) -> Self {
        Error::Format {
            line,
            msg: msg.to_string(),
            context: context.to_string(),
        }
    }

    pub fn structure(msg: impl Into<String>) -> Self {
        Error::Structure(msg.into())
    }

    /// Creates an invalid key error.
    pub fn invalid_key(key: &str, reason: &str) -> Self {
        Error::InvalidKey {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn type_error(msg: impl Into<String>) -> Self {
        Error::Type(msg.into())
    }

    /// Creates a type mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use succ::Error;
    ///
    /// let err = Error::type_mismatch("i32", "string");
    /// assert_eq!(err.to_string(), "Type mismatch: expected i32, found string");
    /// ```
    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn storage(msg: impl std::fmt::Display) -> Self {
        Error::Storage(msg.to_string())
    }

    pub fn invalid_style(msg: impl Into<String>) -> Self {
        Error::InvalidStyle(msg.into())
    }

    /// Creates a custom error from anything displayable.
    pub fn custom<T: std::fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    #[must_use]
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format { .. })
    }

    #[must_use]
    pub fn is_structure(&self) -> bool {
        matches!(self, Error::Structure(_))
    }

    #[must_use]
    pub fn is_key(&self) -> bool {
        matches!(self, Error::InvalidKey { .. })
    }

    /// Returns `true` for both [`Error::Type`] and [`Error::TypeMismatch`].
    #[must_use]
    pub fn is_type(&self) -> bool {
        matches!(self, Error::Type(_) | Error::TypeMismatch { .. })
    }

    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage(_))
    }

    /// The line a format error was reported at.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Format { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

/// A specialized `Result` type for SUCC operations.
pub type Result<T> = std::result::Result<T, Error>;
