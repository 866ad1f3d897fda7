//! Field mutability rules for merging records into existing notes.
//!
//! | Existing value | `Immutable` | `Mutable` |
//! |----------------|-------------|-----------|
//! | absent (`""`, `~`, `null`) | filled | filled |
//! | present | kept | replaced when the incoming value is non-empty and differs |
//!
//! "Differs" ignores quotes, brackets and whitespace, and for date fields
//! only the calendar date counts.

use super::frontmatter::is_absent;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// How a templated field behaves on later merges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldClass {
    /// Written while absent, never overwritten once it holds a value.
    Immutable,
    /// Overwritten whenever the record brings a different non-empty value.
    #[default]
    Mutable,
}

/// Per-field merge policy, keyed by template variable name or frontmatter key.
///
/// # Example
///
/// ```rust
/// use reelsync::services::reconcile::{FieldClass, MutabilityRules};
///
/// let rules = MutabilityRules::new()
///     .with_class("guid", FieldClass::Immutable)
///     .with_date_field("watchedDate");
///
/// assert!(!rules.should_replace("letterboxd_guid", "guid", "123", "456"));
/// assert!(!rules.should_replace("watched", "watchedDate", "2024-03-01", "2024-03-01T22:10:00Z"));
/// assert!(rules.should_replace("rating", "rating", "4", "4.5"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutabilityRules {
    classes: HashMap<String, FieldClass>,
    date_fields: HashSet<String>,
}

impl MutabilityRules {
    /// Creates rules where every field is mutable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a class to a field.
    #[must_use]
    pub fn with_class(mut self, field: impl Into<String>, class: FieldClass) -> Self {
        self.classes.insert(field.into(), class);
        self
    }

    /// Marks a field as date-typed.
    #[must_use]
    pub fn with_date_field(mut self, field: impl Into<String>) -> Self {
        self.date_fields.insert(field.into());
        self
    }

    /// Class of the field for frontmatter `key` rendered from `variable`.
    ///
    /// A rule on the variable name wins over a rule on the key.
    #[must_use]
    pub fn class_of(&self, key: &str, variable: &str) -> FieldClass {
        self.classes
            .get(variable)
            .or_else(|| self.classes.get(key))
            .copied()
            .unwrap_or_default()
    }

    /// Whether the field is compared by calendar date.
    #[must_use]
    pub fn is_date(&self, key: &str, variable: &str) -> bool {
        self.date_fields.contains(variable) || self.date_fields.contains(key)
    }

    /// Decides whether the existing value should give way to the incoming one.
    ///
    /// Both values are the raw frontmatter text after `key:`.
    #[must_use]
    pub fn should_replace(&self, key: &str, variable: &str, existing: &str, incoming: &str) -> bool {
        if existing.trim() == incoming.trim() {
            return false;
        }
        if is_absent(existing) {
            return true;
        }
        match self.class_of(key, variable) {
            FieldClass::Immutable => false,
            FieldClass::Mutable => {
                let incoming_norm = normalize(incoming);
                if incoming_norm.is_empty() || is_absent(&incoming_norm) {
                    return false;
                }
                if normalize(existing) == incoming_norm {
                    return false;
                }
                if self.is_date(key, variable)
                    && let (Some(old), Some(new)) = (parse_date(existing), parse_date(incoming))
                {
                    return old != new;
                }
                true
            },
        }
    }
}

/// Drops quotes and brackets and collapses whitespace.
fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | '[' | ']'))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reads the calendar date of a value in RFC 3339, RFC 2822 or `YYYY-MM-DD`
/// form (trailing time ignored).
fn parse_date(value: &str) -> Option<NaiveDate> {
    let text = value.trim().trim_matches(|c| c == '"' || c == '\'');
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.date_naive());
    }
    text.get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}
