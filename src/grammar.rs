//! The SUCC text format.
//!
//! This module documents the syntax as read and written by this crate. It has
//! no items.
//!
//! # Lines
//!
//! A file is a sequence of lines separated by `\n`, `\r\n` or `\r`. Tabs are
//! not allowed anywhere; indentation is made of spaces. Every line is one of:
//!
//! | Line | Form |
//! |---|---|
//! | blank or comment | empty after trimming, or starts with `#` after trimming |
//! | key | `<indent><key>:<spaces><value>[ # comment]` |
//! | list item | `<indent>-<spaces><value>[ # comment]` |
//!
//! Everything from the first `#` that is not preceded by `\` is a comment.
//! A `#` inside a value is written as `\#`.
//!
//! ## Keys
//!
//! A key is not empty, does not start with `-`, contains neither `:` nor `#`
//! and has no leading or trailing spaces. Spaces inside a key are fine:
//!
//! ```text
//! recent files: 3
//! ```
//!
//! # Nesting
//!
//! A line with an empty value opens a node. The lines below it that are
//! indented further are its children. All children of one node share the
//! same indentation and are either all keys or all list items:
//!
//! ```text
//! window:
//!     width: 800
//!     height: 600
//! recent:
//!     - notes.txt
//!     - todo.txt
//! ```
//!
//! List items cannot appear at the top level. Comments and blank lines may
//! appear anywhere and belong to the node that is open when they occur.
//!
//! # Values
//!
//! ## Null
//!
//! The value `null` means the absence of a value, for any type.
//!
//! ## Booleans
//!
//! `true`/`false`, `on`/`off`, `yes`/`no` and `y`/`n` are all accepted when
//! reading, in any case. [`BoolStyle`](crate::BoolStyle) picks the pair used
//! when writing.
//!
//! ## Numbers
//!
//! Integers are decimal. Floats are decimal, or one of `infinity`,
//! `-infinity` and `nan`, or a chain of divisions such as `1/3`:
//!
//! ```text
//! ratio: 16/9
//! limit: infinity
//! ```
//!
//! ## Strings
//!
//! A string is written as is. It is quoted when it would otherwise read back
//! differently: leading or trailing spaces, surrounding quotes, or the text
//! `null`. One pair of surrounding quotes is removed when reading.
//!
//! Text with line breaks is written as a block between `"""` markers, one
//! line of text per line:
//!
//! ```text
//! motd: """
//!     Welcome back.
//!     Have a nice day.
//!     """
//! ```
//!
//! ## Enumerations
//!
//! A variant is written by its case-sensitive name or by its position, as
//! [`EnumStyle`](crate::EnumStyle) says. Both are accepted when reading.
//!
//! ## Dates
//!
//! Date/time values use `yyyy-MM-dd HH:mm:ss`:
//!
//! ```text
//! last run: 2024-03-01 13:45:00
//! ```
//!
//! # Collections
//!
//! Arrays, lists and sets are list items. Maps are keys when every key
//! makes a valid key:
//!
//! ```text
//! scores:
//!     alice: 10
//!     bob: 7
//! ```
//!
//! and otherwise a list of entries with `key` and `value` children:
//!
//! ```text
//! ranges:
//!     -
//!         key: 1:10
//!         value: small
//! ```
//!
//! # Structured values
//!
//! A structured value has one key per field. It can also be written on one
//! line as a shortcut, which calls a constructor of the type:
//!
//! ```text
//! origin:
//!     x: 0
//!     y: 0
//! spawn: (10, 20)
//! exit: polar(5, 1.57)
//! ```
