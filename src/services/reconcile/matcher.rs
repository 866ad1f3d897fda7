//! Finds the existing note an incoming record belongs to.
//!
//! Two rules run in order and their matches accumulate:
//! 1. **Identifier**: the note's identifier field equals the record's unique key
//! 2. **Filename**: the note's file name equals the rendered filename template
//!    or fits its wildcard form, *and* the note's title equals the record's
//!    title after [`normalize_title`]. Notes whose identifier holds another
//!    key belong to another record and are not considered.
//!
//! A note found by both rules counts once. More than one distinct note is an
//! ambiguity.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::frontmatter::{Frontmatter, scalar_text};
use super::templates::NoteTemplates;
use crate::models::{ExistingNote, Record};
use crate::rendering::TemplateRenderer;
use crate::{Conflict, Error, Result};

/// Regex pattern for a trailing `(1995)` year.
static TRAILING_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(\d{4}\)$").unwrap_or_else(|_| unreachable!()));

/// What the matcher needs from each existing note, extracted once.
#[derive(Debug, Clone)]
struct NoteKeys {
    identifier: Option<String>,
    title: Option<String>,
}

/// Matches records against a fixed set of existing notes.
///
/// # Example
///
/// ```rust
/// use reelsync::models::{DiaryEntry, ExistingNote};
/// use reelsync::services::reconcile::{EntryMatcher, NoteTemplates};
///
/// let templates = NoteTemplates::new("{{title}}", "---\nid: {{guid}}\n---\n")
///     .with_identifier_key("id");
/// let notes = vec![ExistingNote::new("Old name.md", "---\nid: g1\ntitle: Heat\n---\n")];
/// let matcher = EntryMatcher::new(&notes, &templates);
///
/// let found = matcher.find_match(&DiaryEntry::new("Heat", "g1"))?;
/// assert_eq!(found.map(|n| n.filename.as_str()), Some("Old name.md"));
/// # Ok::<(), reelsync::Error>(())
/// ```
pub struct EntryMatcher<'n> {
    notes: &'n [ExistingNote],
    keys: Vec<NoteKeys>,
    filename_template: String,
    wildcard: Option<Regex>,
    renderer: TemplateRenderer,
}

impl<'n> EntryMatcher<'n> {
    /// Indexes the notes' identifiers and titles.
    #[must_use]
    pub fn new(notes: &'n [ExistingNote], templates: &NoteTemplates) -> Self {
        let renderer = TemplateRenderer::new();
        let keys = notes
            .iter()
            .map(|note| {
                let frontmatter = Frontmatter::parse(&note.content);
                let read = |key: &str| {
                    frontmatter
                        .as_ref()
                        .and_then(|fm| fm.get(key))
                        .and_then(scalar_text)
                };
                NoteKeys {
                    identifier: read(&templates.identifier_key),
                    title: read(&templates.title_key),
                }
            })
            .collect();
        let wildcard = renderer.filename_wildcard(&templates.filename);

        Self {
            notes,
            keys,
            filename_template: templates.filename.clone(),
            wildcard,
            renderer,
        }
    }

    /// Finds the note a record belongs to.
    ///
    /// Returns `Ok(None)` when no note matches and the record needs a new one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousMatch`] when more than one note matches.
    pub fn find_match<R: Record + ?Sized>(&self, record: &R) -> Result<Option<&'n ExistingNote>> {
        let matches = self.matching_indices(record);
        match matches.as_slice() {
            [] => Ok(None),
            [index] => Ok(self.notes.get(*index)),
            _ => {
                let conflict = Conflict {
                    title: record.title().to_string(),
                    date: record.date(),
                    filenames: matches
                        .iter()
                        .filter_map(|&i| self.notes.get(i))
                        .map(|note| note.filename.clone())
                        .collect(),
                };
                debug!(conflict = %conflict, "Ambiguous match");
                Err(Error::AmbiguousMatch(conflict))
            },
        }
    }

    /// Indices of every matching note, identifier matches first.
    fn matching_indices<R: Record + ?Sized>(&self, record: &R) -> Vec<usize> {
        let mut matches = Vec::new();
        let key = record.unique_key();

        if let Some(key) = &key {
            matches.extend(
                self.keys
                    .iter()
                    .enumerate()
                    .filter(|(_, keys)| keys.identifier.as_deref() == Some(key.as_str()))
                    .map(|(i, _)| i),
            );
        }

        let expected = self
            .renderer
            .render_filename(&self.filename_template, record)
            .to_lowercase();
        let title = normalize_title(record.title());
        for (i, note) in self.notes.iter().enumerate() {
            if matches.contains(&i) {
                continue;
            }
            // Claimed by another record
            if let (Some(own), Some(theirs)) = (key.as_deref(), self.keys[i].identifier.as_deref())
                && own != theirs
            {
                continue;
            }
            let stem = note.stem();
            let name_fits = stem.to_lowercase() == expected
                || self.wildcard.as_ref().is_some_and(|re| re.is_match(stem));
            let title_fits = self.keys[i]
                .title
                .as_deref()
                .is_some_and(|t| normalize_title(t) == title);
            if name_fits && title_fits {
                matches.push(i);
            }
        }

        matches
    }
}

/// Normalizes a title for comparison: lowercased, trimmed, and without a
/// trailing parenthesized year.
///
/// # Example
///
/// ```rust
/// use reelsync::services::reconcile::normalize_title;
///
/// assert_eq!(normalize_title("  Heat (1995) "), "heat");
/// assert_eq!(normalize_title("2046"), "2046");
/// ```
#[must_use]
pub fn normalize_title(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    TRAILING_YEAR.replace(&lowered, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiaryEntry;

    fn templates() -> NoteTemplates {
        NoteTemplates::new(
            "{{title}} ({{year}})",
            "---\nletterboxd_guid: {{guid}}\ntitle: {{title yaml=true}}\n---\n",
        )
        .with_identifier_key("letterboxd_guid")
    }

    fn note(filename: &str, guid: &str, title: &str) -> ExistingNote {
        ExistingNote::new(
            filename,
            format!("---\nletterboxd_guid: {guid}\ntitle: \"{title}\"\n---\nbody\n"),
        )
    }

    #[test]
    fn test_no_match() {
        let notes = vec![note("Alien (1979).md", "g9", "Alien")];
        let matcher = EntryMatcher::new(&notes, &templates());
        let entry = DiaryEntry::new("Heat", "g1").with_year(1995);
        assert!(matcher.find_match(&entry).unwrap().is_none());
    }

    #[test]
    fn test_identifier_match_ignores_filename() {
        let notes = vec![note("renamed by user.md", "g1", "Something else")];
        let matcher = EntryMatcher::new(&notes, &templates());
        let entry = DiaryEntry::new("Heat", "g1").with_year(1995);
        let found = matcher.find_match(&entry).unwrap().unwrap();
        assert_eq!(found.filename, "renamed by user.md");
    }

    #[test]
    fn test_filename_match_requires_title() {
        let notes = vec![note("Heat (1995).md", "", "Heat")];
        let matcher = EntryMatcher::new(&notes, &templates());

        let entry = DiaryEntry::new("Heat", "g1").with_year(1995);
        assert!(matcher.find_match(&entry).unwrap().is_some());

        let other = vec![note("Heat (1995).md", "", "Heathers")];
        let matcher = EntryMatcher::new(&other, &templates());
        assert!(matcher.find_match(&entry).unwrap().is_none());
    }

    #[test]
    fn test_wildcard_filename_match() {
        let notes = vec![note("Heat (1986).md", "", "Heat (1986)")];
        let matcher = EntryMatcher::new(&notes, &templates());
        let entry = DiaryEntry::new("Heat", "g1").with_year(1995);
        assert!(matcher.find_match(&entry).unwrap().is_some());
    }

    #[test]
    fn test_same_note_by_both_rules_counts_once() {
        let notes = vec![note("Heat (1995).md", "g1", "Heat")];
        let matcher = EntryMatcher::new(&notes, &templates());
        let entry = DiaryEntry::new("Heat", "g1").with_year(1995);
        assert!(matcher.find_match(&entry).unwrap().is_some());
    }

    #[test]
    fn test_ambiguity_lists_exactly_the_matches() {
        let notes = vec![
            note("Heat viewing.md", "g1", "Heat"),
            note("Alien (1979).md", "g2", "Alien"),
            note("Heat (1995).md", "", "Heat"),
        ];
        let matcher = EntryMatcher::new(&notes, &templates());
        let entry = DiaryEntry::new("Heat", "g1").with_year(1995);

        match matcher.find_match(&entry) {
            Err(Error::AmbiguousMatch(conflict)) => {
                assert_eq!(conflict.title, "Heat");
                assert_eq!(conflict.filenames, vec!["Heat viewing.md", "Heat (1995).md"]);
            },
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn test_note_without_frontmatter_only_matches_nothing() {
        let notes = vec![ExistingNote::new("Heat (1995).md", "just text")];
        let matcher = EntryMatcher::new(&notes, &templates());
        let entry = DiaryEntry::new("Heat", "g1").with_year(1995);
        assert!(matcher.find_match(&entry).unwrap().is_none());
    }

    #[test]
    fn test_note_keyed_to_another_record_is_not_a_filename_match() {
        let notes = vec![note("Heat (1995).md", "g2", "Heat")];
        let matcher = EntryMatcher::new(&notes, &templates());
        let entry = DiaryEntry::new("Heat", "g1").with_year(1995);
        assert!(matcher.find_match(&entry).unwrap().is_none());
    }

    #[test]
    fn test_rewatches_match_their_own_notes() {
        let templates = NoteTemplates::new(
            "{{watchedDate}} {{title}}",
            "---\nletterboxd_guid: {{guid}}\ntitle: {{title yaml=true}}\n---\n",
        )
        .with_identifier_key("letterboxd_guid");
        let notes = vec![
            note("2024-03-01 Heat.md", "g1", "Heat"),
            note("2024-03-20 Heat.md", "g2", "Heat"),
        ];
        let matcher = EntryMatcher::new(&notes, &templates);

        let second = DiaryEntry::new("Heat", "g2");
        let found = matcher.find_match(&second).unwrap().unwrap();
        assert_eq!(found.filename, "2024-03-20 Heat.md");
    }

    #[test]
    fn test_exact_filename_match_ignores_case() {
        let templates = NoteTemplates::new("{{title}}", "---\ntitle: {{title yaml=true}}\n---\n");
        let notes = vec![note("HEAT.md", "", "Heat")];
        let matcher = EntryMatcher::new(&notes, &templates);
        let entry = DiaryEntry::new("Heat", "g1");
        assert!(matcher.find_match(&entry).unwrap().is_some());
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("HEAT"), "heat");
        assert_eq!(normalize_title("Heat (1995)"), "heat");
        assert_eq!(normalize_title("Heat (Director's Cut)"), "heat (director's cut)");
    }
}
