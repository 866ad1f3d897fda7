//! Notes that already exist in the vault.

use serde::{Deserialize, Serialize};

/// Extension given to every note file.
pub const NOTE_EXTENSION: &str = "md";

/// A note as read from the note store.
///
/// The content is opaque here. Only the frontmatter is ever parsed, and
/// everything after it is carried through merges untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingNote {
    /// File name including the extension, relative to the note folder.
    pub filename: String,
    /// Full file content.
    pub content: String,
}

impl ExistingNote {
    /// Creates a note.
    #[must_use]
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// The file name without its `.md` extension.
    #[must_use]
    pub fn stem(&self) -> &str {
        self.filename
            .strip_suffix(NOTE_EXTENSION)
            .and_then(|rest| rest.strip_suffix('.'))
            .unwrap_or(&self.filename)
    }
}

/// Appends the note extension to a rendered base name.
#[must_use]
pub fn note_filename(stem: &str) -> String {
    format!("{stem}.{NOTE_EXTENSION}")
}
