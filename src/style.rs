//! Formatting preferences applied when SUCC text is written.
//!
//! A [`Style`] only affects lines the library creates. Lines that came from
//! parsed text keep their original spacing when their value is replaced.
//!
//! ## Examples
//!
//! ```rust
//! use succ::{BoolStyle, Style};
//!
//! let style = Style::new()
//!     .with_indentation_interval(2)
//!     .with_bool_style(BoolStyle::YesNo)
//!     .with_always_quote_strings(true);
//!
//! assert_eq!(style.indentation_interval, 2);
//! assert_eq!(style.bool_style.text_for(true), "yes");
//! assert!(style.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Words used to write booleans.
///
/// All four pairs are accepted when reading, regardless of the style in use.
///
/// ```rust
/// use succ::BoolStyle;
///
/// assert_eq!(BoolStyle::OnOff.text_for(false), "off");
/// assert_eq!(BoolStyle::YN.text_for(true), "y");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolStyle {
    #[default]
    TrueFalse,
    OnOff,
    YesNo,
    #[serde(rename = "y_n")]
    YN,
}

impl BoolStyle {
    /// Returns the word this style writes for `value`.
    #[must_use]
    pub const fn text_for(self, value: bool) -> &'static str {
        match (self, value) {
            (BoolStyle::TrueFalse, true) => "true",
            (BoolStyle::TrueFalse, false) => "false",
            (BoolStyle::OnOff, true) => "on",
            (BoolStyle::OnOff, false) => "off",
            (BoolStyle::YesNo, true) => "yes",
            (BoolStyle::YesNo, false) => "no",
            (BoolStyle::YN, true) => "y",
            (BoolStyle::YN, false) => "n",
        }
    }
}

/// How enumeration values are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumStyle {
    /// The variant name.
    #[default]
    Name,
    /// The zero-based variant ordinal.
    Number,
}

/// Line terminator used when a document is serialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineEnding {
    #[default]
    Unix,
    Windows,
}

impl LineEnding {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Unix => "\n",
            LineEnding::Windows => "\r\n",
        }
    }
}

/// Formatting preferences for newly written lines.
///
/// The style also decides whether strings are always quoted and whether maps
/// always use the array-of-entries form.
///
/// `Style` is plain configuration: it can be loaded with serde from any
/// format, with missing fields taking their defaults.
///
/// ```rust
/// use succ::{EnumStyle, Style};
///
/// let style: Style = serde_json::from_str(r#"{"enum_style": "number"}"#).unwrap();
/// assert_eq!(style.enum_style, EnumStyle::Number);
/// assert_eq!(style.indentation_interval, 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Spaces added per nesting level. Must be at least 1.
    pub indentation_interval: usize,
    pub spaces_after_colon: usize,
    pub spaces_after_dash: usize,
    pub always_quote_strings: bool,
    /// Write every map in the array-of-entries form.
    pub always_array_maps: bool,
    pub bool_style: BoolStyle,
    pub enum_style: EnumStyle,
    pub line_ending: LineEnding,
}

impl Default for Style {
    fn default() -> Self {
        Style {
            indentation_interval: 4,
            spaces_after_colon: 1,
            spaces_after_dash: 1,
            always_quote_strings: false,
            always_array_maps: false,
            bool_style: BoolStyle::default(),
            enum_style: EnumStyle::default(),
            line_ending: LineEnding::default(),
        }
    }
}

impl Style {
    /// Creates the default style: 4-space indentation, one space after `:`
    /// and `-`, `true`/`false`, enums by name, Unix line endings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_indentation_interval(mut self, interval: usize) -> Self {
        self.indentation_interval = interval;
        self
    }

    #[must_use]
    pub fn with_spaces_after_colon(mut self, spaces: usize) -> Self {
        self.spaces_after_colon = spaces;
        self
    }

    #[must_use]
    pub fn with_spaces_after_dash(mut self, spaces: usize) -> Self {
        self.spaces_after_dash = spaces;
        self
    }

    #[must_use]
    pub fn with_always_quote_strings(mut self, quote: bool) -> Self {
        self.always_quote_strings = quote;
        self
    }

    #[must_use]
    pub fn with_always_array_maps(mut self, array: bool) -> Self {
        self.always_array_maps = array;
        self
    }

    #[must_use]
    pub fn with_bool_style(mut self, bool_style: BoolStyle) -> Self {
        self.bool_style = bool_style;
        self
    }

    #[must_use]
    pub fn with_enum_style(mut self, enum_style: EnumStyle) -> Self {
        self.enum_style = enum_style;
        self
    }

    #[must_use]
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Checks the constraints a style must satisfy.
    ///
    /// ```rust
    /// use succ::Style;
    ///
    /// assert!(Style::new().with_indentation_interval(0).validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.indentation_interval == 0 {
            return Err(Error::invalid_style(
                "indentation interval must be at least 1",
            ));
        }
        Ok(())
    }
}
