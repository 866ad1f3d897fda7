//! Note store implementations.
//!
//! - [`FsNoteStore`]: one folder of `.md` files on disk
//! - [`MemoryNoteStore`]: an in-memory map, for tests and dry runs
//!
//! # Security
//!
//! File names are validated before any path is built: they must be a single
//! path component ending in `.md`, so a rendered title cannot escape the
//! note folder.

use crate::io::traits::NoteStore;
use crate::models::{ExistingNote, NOTE_EXTENSION};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Maximum size of a note file that will be read (4MB).
const MAX_FILE_SIZE: u64 = 4 * 1024 * 1024;

/// Filesystem note store rooted at one folder.
#[derive(Debug, Clone)]
pub struct FsNoteStore {
    base_path: PathBuf,
}

impl FsNoteStore {
    /// Creates a store without touching the filesystem.
    ///
    /// The folder is created on the first write.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Creates a store, creating the folder if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn with_create(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).map_err(|e| Error::OperationFailed {
            operation: "create_note_dir".to_string(),
            cause: e.to_string(),
        })?;
        Ok(Self { base_path })
    }

    /// Returns the base path.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the path for a note file.
    fn note_path(&self, filename: &str) -> Result<PathBuf> {
        if !is_safe_filename(filename) {
            return Err(Error::InvalidInput(format!(
                "note file name is not a plain .{NOTE_EXTENSION} name: {filename}"
            )));
        }
        Ok(self.base_path.join(filename))
    }

    fn read_note(path: &Path) -> Result<Option<String>> {
        let metadata = fs::metadata(path).map_err(|e| Error::OperationFailed {
            operation: "read_note_metadata".to_string(),
            cause: e.to_string(),
        })?;
        if !metadata.is_file() {
            return Ok(None);
        }
        if metadata.len() > MAX_FILE_SIZE {
            return Err(Error::InvalidInput(format!(
                "note exceeds maximum size of {MAX_FILE_SIZE} bytes: {}",
                path.display()
            )));
        }
        fs::read_to_string(path)
            .map(Some)
            .map_err(|e| Error::OperationFailed {
                operation: "read_note".to_string(),
                cause: format!("{}: {e}", path.display()),
            })
    }
}

impl NoteStore for FsNoteStore {
    fn list(&self) -> Result<Vec<ExistingNote>> {
        let mut notes = Vec::new();

        // A folder that does not exist yet holds no notes
        if !self.base_path.exists() {
            return Ok(notes);
        }

        let entries = fs::read_dir(&self.base_path).map_err(|e| Error::OperationFailed {
            operation: "read_note_dir".to_string(),
            cause: e.to_string(),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| Error::OperationFailed {
                operation: "read_dir_entry".to_string(),
                cause: e.to_string(),
            })?;
            let Some(filename) = entry.file_name().to_str().map(String::from) else {
                continue;
            };
            if !is_safe_filename(&filename) {
                continue;
            }
            // An unreadable note is left alone rather than failing the listing
            match Self::read_note(&entry.path()) {
                Ok(Some(content)) => notes.push(ExistingNote::new(filename, content)),
                Ok(None) => {},
                Err(e) => warn!(file = %filename, error = %e, "Skipping unreadable note"),
            }
        }

        notes.sort_by(|a, b| a.filename.cmp(&b.filename));
        debug!(count = notes.len(), path = %self.base_path.display(), "Listed notes");
        Ok(notes)
    }

    fn create(&self, filename: &str, content: &str) -> Result<()> {
        let path = self.note_path(filename)?;
        fs::create_dir_all(&self.base_path).map_err(|e| Error::OperationFailed {
            operation: "create_note_dir".to_string(),
            cause: e.to_string(),
        })?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| Error::OperationFailed {
                operation: "create_note".to_string(),
                cause: format!("{filename}: {e}"),
            })?;
        file.write_all(content.as_bytes())
            .map_err(|e| Error::OperationFailed {
                operation: "write_note".to_string(),
                cause: format!("{filename}: {e}"),
            })
    }

    fn update(&self, filename: &str, content: &str) -> Result<()> {
        let path = self.note_path(filename)?;
        if !path.is_file() {
            return Err(Error::InvalidInput(format!("note does not exist: {filename}")));
        }
        fs::write(&path, content).map_err(|e| Error::OperationFailed {
            operation: "write_note".to_string(),
            cause: format!("{filename}: {e}"),
        })
    }
}

/// In-memory note store.
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    notes: Mutex<BTreeMap<String, String>>,
}

impl MemoryNoteStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `notes`.
    #[must_use]
    pub fn with_notes(notes: impl IntoIterator<Item = ExistingNote>) -> Self {
        Self {
            notes: Mutex::new(
                notes
                    .into_iter()
                    .map(|note| (note.filename, note.content))
                    .collect(),
            ),
        }
    }

    /// Returns the content of one note.
    #[must_use]
    pub fn get(&self, filename: &str) -> Option<String> {
        self.notes
            .lock()
            .ok()
            .and_then(|notes| notes.get(filename).cloned())
    }

    /// Number of notes held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.lock().map_or(0, |notes| notes.len())
    }

    /// Whether the store holds no notes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.notes.lock().map_err(|e| Error::OperationFailed {
            operation: "lock_note_store".to_string(),
            cause: e.to_string(),
        })
    }
}

impl NoteStore for MemoryNoteStore {
    fn list(&self) -> Result<Vec<ExistingNote>> {
        Ok(self
            .lock()?
            .iter()
            .map(|(filename, content)| ExistingNote::new(filename.clone(), content.clone()))
            .collect())
    }

    fn create(&self, filename: &str, content: &str) -> Result<()> {
        let mut notes = self.lock()?;
        if notes.contains_key(filename) {
            return Err(Error::InvalidInput(format!("note already exists: {filename}")));
        }
        notes.insert(filename.to_string(), content.to_string());
        Ok(())
    }

    fn update(&self, filename: &str, content: &str) -> Result<()> {
        let mut notes = self.lock()?;
        match notes.get_mut(filename) {
            Some(existing) => {
                content.clone_into(existing);
                Ok(())
            },
            None => Err(Error::InvalidInput(format!("note does not exist: {filename}"))),
        }
    }
}

/// Checks that a file name is a single `.md` path component.
fn is_safe_filename(name: &str) -> bool {
    let Some(stem) = name
        .strip_suffix(NOTE_EXTENSION)
        .and_then(|rest| rest.strip_suffix('.'))
    else {
        return false;
    };
    !stem.is_empty()
        && name.len() <= 255
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_list_update() {
        let dir = TempDir::new().unwrap();
        let store = FsNoteStore::new(dir.path().join("Films"));
        assert!(store.list().unwrap().is_empty());

        store.create("Heat.md", "---\ntitle: Heat\n---\n").unwrap();
        store.update("Heat.md", "---\ntitle: Heat\nrating: 4\n---\n").unwrap();

        let notes = store.list().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].filename, "Heat.md");
        assert_eq!(notes[0].content, "---\ntitle: Heat\nrating: 4\n---\n");
    }

    #[test]
    fn test_create_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = FsNoteStore::with_create(dir.path()).unwrap();
        store.create("Heat.md", "one").unwrap();
        assert!(store.create("Heat.md", "two").is_err());
        assert_eq!(fs::read_to_string(dir.path().join("Heat.md")).unwrap(), "one");
    }

    #[test]
    fn test_update_requires_existing_note() {
        let dir = TempDir::new().unwrap();
        let store = FsNoteStore::with_create(dir.path()).unwrap();
        assert!(store.update("Nope.md", "x").is_err());
    }

    #[test]
    fn test_list_skips_other_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("image.png"), "x").unwrap();
        fs::write(dir.path().join(".hidden.md"), "x").unwrap();
        fs::create_dir(dir.path().join("sub.md")).unwrap();
        fs::write(dir.path().join("Alien.md"), "a").unwrap();

        let store = FsNoteStore::new(dir.path());
        let names: Vec<String> = store.list().unwrap().into_iter().map(|n| n.filename).collect();
        assert_eq!(names, vec!["Alien.md"]);
    }

    #[test]
    fn test_list_skips_unreadable_notes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Scan.md"), [0xff, 0xfe, 0x00]).unwrap();
        fs::write(dir.path().join("Alien.md"), "---\ntitle: Alien\n---\n").unwrap();

        let store = FsNoteStore::new(dir.path());
        let notes = store.list().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].filename, "Alien.md");
    }

    #[test]
    fn test_path_traversal_protection() {
        let dir = TempDir::new().unwrap();
        let store = FsNoteStore::new(dir.path());
        assert!(store.note_path("../escape.md").is_err());
        assert!(store.note_path("dir\\file.md").is_err());
        assert!(store.note_path("notes.txt").is_err());
        assert!(store.note_path(".md").is_err());
        assert!(store.note_path("Heat (1995).md").is_ok());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryNoteStore::with_notes([ExistingNote::new("A.md", "a")]);
        assert!(store.create("A.md", "again").is_err());
        store.create("B.md", "b").unwrap();
        store.update("A.md", "a2").unwrap();
        assert!(store.update("C.md", "c").is_err());
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("A.md").as_deref(), Some("a2"));
    }
}
