//! Core traits for reading records and persisting notes.
//!
//! Defines the [`RecordSource`] trait that format adapters implement and the
//! [`NoteStore`] trait that note folders implement.

use crate::Result;
use crate::models::{ExistingNote, Record};

/// Source of records to sync.
///
/// Implementations read records from a specific format (CSV export, JSON
/// dump, feed) and yield them one at a time.
///
/// # Example Implementation
///
/// ```rust,ignore
/// impl RecordSource for FeedSource {
///     type Item = DiaryEntry;
///
///     fn next_record(&mut self) -> Result<Option<DiaryEntry>> {
///         // Pull the next item, map it to a DiaryEntry
///     }
/// }
/// ```
pub trait RecordSource {
    /// The record type this source yields.
    type Item: Record;

    /// Reads the next record from the source.
    ///
    /// Returns `Ok(None)` when the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O errors occur. The sync
    /// service stops reading at the first error.
    fn next_record(&mut self) -> Result<Option<Self::Item>>;

    /// Returns an estimate of the total number of records.
    ///
    /// Used for progress reporting. Returns `None` if unknown.
    fn size_hint(&self) -> Option<usize> {
        None
    }
}

impl<R: Record> RecordSource for std::vec::IntoIter<R> {
    type Item = R;

    fn next_record(&mut self) -> Result<Option<R>> {
        Ok(self.next())
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    type Item = S::Item;

    fn next_record(&mut self) -> Result<Option<S::Item>> {
        (**self).next_record()
    }

    fn size_hint(&self) -> Option<usize> {
        (**self).size_hint()
    }
}

/// A folder of notes.
///
/// File names are relative to the folder and include the `.md` extension.
/// Implementations use interior mutability so one store can be shared.
pub trait NoteStore {
    /// Lists every note in the folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be read.
    fn list(&self) -> Result<Vec<ExistingNote>>;

    /// Writes a new note.
    ///
    /// # Errors
    ///
    /// Returns an error if a note with that name already exists or the
    /// write fails.
    fn create(&self, filename: &str, content: &str) -> Result<()>;

    /// Overwrites an existing note.
    ///
    /// # Errors
    ///
    /// Returns an error if the note does not exist or the write fails.
    fn update(&self, filename: &str, content: &str) -> Result<()>;
}
