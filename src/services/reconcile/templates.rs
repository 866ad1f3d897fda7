//! Templates and keys that describe one kind of note.

use super::frontmatter::{Frontmatter, key_of};
use crate::rendering::referenced_variables;

/// Everything the sync pipeline needs to know about one note kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteTemplates {
    /// Template for the file name (without extension).
    pub filename: String,
    /// Template for the note content, starting with a frontmatter block.
    pub body: String,
    /// Frontmatter key holding the record's unique key.
    pub identifier_key: String,
    /// Frontmatter key holding the record's title.
    pub title_key: String,
}

impl NoteTemplates {
    /// Creates templates with the default `id` and `title` keys.
    #[must_use]
    pub fn new(filename: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            body: body.into(),
            identifier_key: "id".to_string(),
            title_key: "title".to_string(),
        }
    }

    /// Sets the identifier key.
    #[must_use]
    pub fn with_identifier_key(mut self, key: impl Into<String>) -> Self {
        self.identifier_key = key.into();
        self
    }

    /// Sets the title key.
    #[must_use]
    pub fn with_title_key(mut self, key: impl Into<String>) -> Self {
        self.title_key = key.into();
        self
    }

    /// Lists the templated frontmatter fields of the body template.
    ///
    /// A field is a top-level `key: ...` line that contains exactly one
    /// variable reference and no conditional markers.
    #[must_use]
    pub fn frontmatter_fields(&self) -> Vec<TemplateField> {
        let Some(frontmatter) = Frontmatter::parse(&self.body) else {
            return Vec::new();
        };
        frontmatter
            .keys()
            .filter_map(|key| {
                let line = frontmatter.line(key)?;
                if line.contains('\n') || line.matches("{{").count() != 1 {
                    return None;
                }
                let variables = referenced_variables(line);
                let [variable] = variables.as_slice() else {
                    return None;
                };
                (key_of(line) == Some(key)).then(|| TemplateField {
                    key: key.to_string(),
                    variable: (*variable).to_string(),
                    line: line.to_string(),
                })
            })
            .collect()
    }
}

/// A frontmatter line of the body template that renders one variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateField {
    /// Frontmatter key.
    pub key: String,
    /// Variable name inside the placeholder.
    pub variable: String,
    /// The template line, e.g. `title: {{title yaml=true}}`.
    pub line: String,
}
