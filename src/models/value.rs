//! Raw field values handed to the template engine.

use serde::{Deserialize, Serialize};

/// String literals that count as false inside `{{#if}}` blocks.
const FALSY_LITERALS: &[&str] = &["", "false", "null", "undefined", "0"];

/// A single field value read from a record.
///
/// Every accessor returns one of these. `Missing` is the explicit
/// "not yet known" state: a field the record kind defines but whose value
/// the source could not supply (for example a poster URL in a CSV export).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Plain text.
    Text(String),
    /// A number, rendered with its shortest decimal form.
    Number(f64),
    /// A boolean flag.
    Bool(bool),
    /// An ordered list of strings.
    List(Vec<String>),
    /// The value is not known yet.
    Missing,
}

impl RawValue {
    /// Creates a text value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Wraps an optional value, mapping `None` to [`RawValue::Missing`].
    #[must_use]
    pub fn optional<T: Into<Self>>(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }

    /// Truthiness as used by conditional blocks.
    ///
    /// Lists are truthy when non-empty, numbers when nonzero, and strings
    /// unless they are one of `""`, `"false"`, `"null"`, `"undefined"` or
    /// `"0"` (compared case-insensitively).
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Text(s) => !FALSY_LITERALS.iter().any(|falsy| s.eq_ignore_ascii_case(falsy)),
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Bool(b) => *b,
            Self::List(items) => !items.is_empty(),
            Self::Missing => false,
        }
    }

    /// Emptiness as used by the `skipEmpty` modifier.
    ///
    /// Booleans and numbers are never empty, so `false` and `0` still render.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Number(_) | Self::Bool(_) => false,
            Self::Missing => true,
        }
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<&String> for RawValue {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for RawValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for RawValue {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u64> for RawValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: u64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<String>> for RawValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<&[String]> for RawValue {
    fn from(items: &[String]) -> Self {
        Self::List(items.to_vec())
    }
}
