//! I/O collaborators of the sync service.
//!
//! # Architecture
//!
//! - **Format adapters** implement [`RecordSource`] and yield typed records
//! - **Note stores** implement [`NoteStore`] and persist rendered notes
//!
//! # Supported Inputs
//!
//! | Format | Records | Notes |
//! |--------|---------|-------|
//! | CSV | diary entries | Letterboxd `diary.csv` export, synthetic ids |
//! | JSON | any record kind | Newline-delimited (NDJSON) or array |
//!
//! # Example
//!
//! ```rust
//! use reelsync::io::{DiaryCsvSource, RecordSource};
//!
//! let csv = "Name,Year,Watched Date\nHeat,1995,2024-03-01\n";
//! let mut source = DiaryCsvSource::new(csv.as_bytes())?;
//! let entry = source.next_record()?.expect("one row");
//! assert_eq!(entry.title, "Heat");
//! # Ok::<(), reelsync::Error>(())
//! ```

pub mod formats;
pub mod store;
pub mod traits;

// Re-exports for convenience
pub use formats::{DiaryCsvSource, Format, JsonRecordSource, MovieJsonSource, read_record};
pub use store::{FsNoteStore, MemoryNoteStore};
pub use traits::{NoteStore, RecordSource};
