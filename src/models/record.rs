//! The record abstraction the template engine renders.

use super::RawValue;
use crate::rendering::ModifierParams;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of record that become notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// One viewing logged in the film diary.
    Diary,
    /// Catalog metadata for one movie.
    Movie,
}

impl RecordKind {
    /// Returns the kind as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Diary => "diary",
            Self::Movie => "movie",
        }
    }

    /// Parses a kind from a string (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "diary" | "entry" | "entries" => Some(Self::Diary),
            "movie" | "movies" | "film" | "metadata" => Some(Self::Movie),
            _ => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flat, immutable record that templates are rendered against.
///
/// Implementations expose their fields by template variable name. A name
/// the record kind does not define returns `None` from [`Record::field`],
/// and the engine then leaves the placeholder text untouched.
pub trait Record {
    /// The kind of note this record produces.
    fn kind(&self) -> RecordKind;

    /// Looks up a field by its template variable name.
    fn field(&self, name: &str) -> Option<RawValue>;

    /// Renders a composite value that the plain formatter cannot express.
    ///
    /// Returns `None` when `name` is not a special field of this record kind.
    /// The engine still applies `prefix`, `suffix` and `skipEmpty` to the
    /// returned text.
    fn special(&self, name: &str, params: &ModifierParams) -> Option<String> {
        let _ = (name, params);
        None
    }

    /// The unique key stored in the note's identifier field.
    fn unique_key(&self) -> Option<String>;

    /// Human-readable title, used for matching and error reports.
    fn title(&self) -> &str;

    /// The date associated with the record, if any (`YYYY-MM-DD`).
    fn date(&self) -> Option<String>;
}

impl<R: Record + ?Sized> Record for &R {
    fn kind(&self) -> RecordKind {
        (**self).kind()
    }

    fn field(&self, name: &str) -> Option<RawValue> {
        (**self).field(name)
    }

    fn special(&self, name: &str, params: &ModifierParams) -> Option<String> {
        (**self).special(name, params)
    }

    fn unique_key(&self) -> Option<String> {
        (**self).unique_key()
    }

    fn title(&self) -> &str {
        (**self).title()
    }

    fn date(&self) -> Option<String> {
        (**self).date()
    }
}
