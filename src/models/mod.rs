//! Data models for reelsync.
//!
//! Records are the typed inputs the template engine renders; existing notes
//! are what the note store hands back.

mod diary;
mod movie;
mod note;
mod rating;
mod record;
mod value;

pub use diary::{DiaryEntry, DiaryField};
pub use movie::{CAST_WITH_ROLES, CastMember, MovieField, MovieMetadata};
pub use note::{ExistingNote, NOTE_EXTENSION, note_filename};
pub use rating::Rating;
pub use record::{Record, RecordKind};
pub use value::RawValue;
