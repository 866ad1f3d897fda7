//! # Reelsync
//!
//! Mirrors film diary entries into markdown notes.
//!
//! Records come from a diary feed, a diary CSV export, or a movie metadata
//! dump. Each record is rendered through user templates into a note, and
//! notes that already exist are patched in place without touching anything
//! the user wrote below the frontmatter.
//!
//! ## Features
//!
//! - Small template language: `{{variable key=value}}` and `{{#if variable}}...{{/if}}`
//! - Value modifiers for YAML quoting, wiki links, bullets, and styling
//! - Field-level merge rules (immutable or mutable, absent values always filled)
//! - Identifier-first matching with filename fallback and ambiguity detection
//!
//! ## Example
//!
//! ```rust
//! use reelsync::models::{DiaryEntry, Rating};
//! use reelsync::rendering::TemplateRenderer;
//!
//! let entry = DiaryEntry::new("Heat", "letterboxd-review-42")
//!     .with_year(1995)
//!     .with_rating(Rating::new(4.5)?);
//!
//! let renderer = TemplateRenderer::new();
//! let text = renderer.render("{{title}} ({{year}}) {{stars}}", &entry);
//! assert_eq!(text, "Heat (1995) ★★★★½");
//! # Ok::<(), reelsync::Error>(())
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

pub mod config;
pub mod io;
pub mod models;
pub mod observability;
pub mod rendering;
pub mod services;

pub use config::ReelsyncConfig;
pub use models::{DiaryEntry, ExistingNote, MovieMetadata, RawValue, Rating, Record, RecordKind};
pub use rendering::{ModifierParams, TemplateRenderer};
pub use services::reconcile::{
    EntryMatcher, MergeEngine, MutabilityRules, NoteTemplates, SyncService, SyncSummary,
};

/// A record that matched more than one existing note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Human-readable title of the incoming record.
    pub title: String,
    /// Date of the incoming record, when it has one.
    pub date: Option<String>,
    /// File names of every note that matched.
    pub filenames: Vec<String>,
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.date {
            Some(date) => write!(f, "'{}' ({date})", self.title)?,
            None => write!(f, "'{}'", self.title)?,
        }
        write!(f, " matches {}", self.filenames.join(", "))
    }
}

/// Error type for reelsync operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Malformed CSV rows, unreadable record JSON, bad config values |
/// | `OperationFailed` | Filesystem I/O errors, config file cannot be parsed |
/// | `AmbiguousMatch` | One record matches several existing notes |
/// | `AmbiguousBatch` | Batch validation found one or more ambiguous records |
/// | `InvalidRating` | A rating outside 0.5..=5.0 or not on a half step |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Filesystem I/O errors occur in a note store
    /// - The configuration file cannot be read or parsed
    /// - Logging cannot be initialized
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A single record matched more than one existing note.
    #[error("ambiguous match: {0}")]
    AmbiguousMatch(Conflict),

    /// Batch validation found ambiguous records; nothing was written.
    #[error("{} ambiguous record(s); no notes were written", .0.len())]
    AmbiguousBatch(Vec<Conflict>),

    /// A rating outside the half-star domain.
    #[error("rating {0} is not a half step between 0.5 and 5")]
    InvalidRating(f64),
}

/// Result type alias for reelsync operations.
pub type Result<T> = std::result::Result<T, Error>;
