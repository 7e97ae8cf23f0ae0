//! [`Document`](crate::Document) to text.
//!
//! Serialization is a flat walk over the tree: each line's raw text followed
//! by the style's line ending, children right after their parent. Trailing
//! whitespace of the whole output is trimmed, so an empty document becomes
//! empty text.
//!
//! ```rust
//! use succ::{Document, LineEnding, Style};
//!
//! let doc = Document::parse("a: 1\n\n# note\nb:\n    - x\n\n").unwrap();
//! assert_eq!(doc.to_text(&Style::default()), "a: 1\n\n# note\nb:\n    - x");
//!
//! let windows = Style::new().with_line_ending(LineEnding::Windows);
//! assert_eq!(doc.to_text(&windows), "a: 1\r\n\r\n# note\r\nb:\r\n    - x");
//! ```

use crate::node::Line;
use crate::style::Style;

/// Writes lines back out as text.
pub struct Serializer {
    output: String,
    newline: &'static str,
}

impl Serializer {
    pub fn new(style: &Style) -> Self {
        Serializer {
            output: String::with_capacity(256),
            newline: style.line_ending.as_str(),
        }
    }

    /// Appends `lines` and everything nested beneath them.
    pub fn write_lines(&mut self, lines: &[Line]) {
        for line in lines {
            self.output.push_str(line.raw_text());
            self.output.push_str(self.newline);
            if let Line::Node(node) = line {
                self.write_lines(node.children());
            }
        }
    }

    /// Returns the text written so far with trailing whitespace removed.
    #[must_use]
    pub fn into_inner(mut self) -> String {
        let trimmed = self.output.trim_end().len();
        self.output.truncate(trimmed);
        self.output
    }
}

/// Serializes `lines` with the given style.
#[must_use]
pub fn serialize(lines: &[Line], style: &Style) -> String {
    let mut serializer = Serializer::new(style);
    serializer.write_lines(lines);
    serializer.into_inner()
}
