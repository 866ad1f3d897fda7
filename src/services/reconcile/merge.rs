//! Record merge engine.
//!
//! Patches an existing note with a fresh rendering of a record, one
//! frontmatter entry at a time. Lines the body template does not own, the
//! order of entries, comments, and the whole body are never rewritten.

use std::borrow::Cow;
use tracing::debug;

use super::frontmatter::{Frontmatter, value_of};
use super::policy::MutabilityRules;
use super::templates::NoteTemplates;
use crate::models::Record;
use crate::rendering::TemplateRenderer;

/// A note rendered from scratch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNote {
    /// Sanitized file name without extension.
    pub stem: String,
    /// Full note content.
    pub content: String,
}

/// Merges records into existing note content.
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    renderer: TemplateRenderer,
}

impl MergeEngine {
    /// Creates a merge engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `record` into `existing`.
    ///
    /// Returns [`Cow::Borrowed`] with the input when no entry changes, so
    /// callers can tell a no-op from an update without comparing strings.
    /// Content without a well-formed frontmatter block is returned as is.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::borrow::Cow;
    /// use reelsync::models::{DiaryEntry, Rating};
    /// use reelsync::services::reconcile::{FieldClass, MergeEngine, MutabilityRules, NoteTemplates};
    ///
    /// let templates = NoteTemplates::new(
    ///     "{{title}}",
    ///     "---\nletterboxd_guid: {{guid}}\nrating: {{rating}}\n---\n",
    /// );
    /// let rules = MutabilityRules::new().with_class("guid", FieldClass::Immutable);
    /// let note = "---\nletterboxd_guid: 123\nrating: 3\n---\nMy notes.\n";
    /// let entry = DiaryEntry::new("Heat", "456").with_rating(Rating::new(4.5)?);
    ///
    /// let merged = MergeEngine::new().merge(note, &entry, &templates, &rules);
    /// assert_eq!(merged, "---\nletterboxd_guid: 123\nrating: 4.5\n---\nMy notes.\n");
    ///
    /// let again = MergeEngine::new().merge(&merged, &entry, &templates, &rules);
    /// assert!(matches!(again, Cow::Borrowed(_)));
    /// # Ok::<(), reelsync::Error>(())
    /// ```
    #[must_use]
    pub fn merge<'a, R: Record + ?Sized>(
        &self,
        existing: &'a str,
        record: &R,
        templates: &NoteTemplates,
        rules: &MutabilityRules,
    ) -> Cow<'a, str> {
        let Some(mut frontmatter) = Frontmatter::parse(existing) else {
            debug!(title = record.title(), "No frontmatter block, leaving note untouched");
            return Cow::Borrowed(existing);
        };

        for field in templates.frontmatter_fields() {
            let Some(current) = frontmatter.get(&field.key) else {
                continue;
            };
            let rendered = self.renderer.render(&field.line, record);
            if rules.should_replace(&field.key, &field.variable, current, value_of(&rendered)) {
                debug!(key = %field.key, "Replacing frontmatter entry");
                frontmatter.replace(&field.key, rendered);
            }
        }

        if !frontmatter.is_modified() {
            return Cow::Borrowed(existing);
        }
        let merged = frontmatter.to_string();
        if merged == existing {
            Cow::Borrowed(existing)
        } else {
            Cow::Owned(merged)
        }
    }

    /// Renders a brand-new note for `record`.
    #[must_use]
    pub fn render_note<R: Record + ?Sized>(&self, record: &R, templates: &NoteTemplates) -> RenderedNote {
        RenderedNote {
            stem: self.renderer.render_filename(&templates.filename, record),
            content: self.renderer.render(&templates.body, record),
        }
    }
}
