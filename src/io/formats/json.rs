//! JSON format adapter for record sources.
//!
//! Supports both newline-delimited JSON (NDJSON/JSONL) and JSON arrays.

use crate::io::traits::RecordSource;
use crate::models::{MovieMetadata, Record};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::io::{BufRead, Read};

/// Records read from JSON.
///
/// Automatically detects and handles both formats:
/// - **NDJSON/JSONL**: One JSON object per line
/// - **Array**: A JSON array of objects `[{...}, {...}]`
pub struct JsonRecordSource<R: BufRead, T> {
    reader: R,
    /// Records parsed ahead of time (array mode, or the first NDJSON line).
    buffer: VecDeque<T>,
    /// Whether we've detected and started parsing.
    started: bool,
    /// Whether we're in array mode.
    array_mode: bool,
    /// Line number for error reporting.
    line_number: usize,
}

/// Movie metadata read from JSON.
pub type MovieJsonSource<R> = JsonRecordSource<R, MovieMetadata>;

impl<R: BufRead, T: DeserializeOwned> JsonRecordSource<R, T> {
    /// Creates a new JSON record source.
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: VecDeque::new(),
            started: false,
            array_mode: false,
            line_number: 0,
        }
    }

    /// Reads the first non-blank line to detect the format.
    ///
    /// Returns `false` for empty input.
    fn detect_format(&mut self) -> Result<bool> {
        self.started = true;
        let Some(first_line) = self.next_line()? else {
            return Ok(false);
        };

        if first_line.trim_start().starts_with('[') {
            self.array_mode = true;
            let mut remaining = String::new();
            self.reader
                .read_to_string(&mut remaining)
                .map_err(|e| Error::OperationFailed {
                    operation: "read_json".to_string(),
                    cause: e.to_string(),
                })?;
            let records: Vec<T> = serde_json::from_str(&format!("{first_line}{remaining}"))
                .map_err(|e| Error::InvalidInput(format!("Failed to parse JSON array: {e}")))?;
            self.buffer = records.into();
        } else {
            let record = self.parse_line(&first_line)?;
            self.buffer.push_back(record);
        }
        Ok(true)
    }

    /// Returns the next non-blank line, or `None` at end of input.
    fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        loop {
            line.clear();
            let bytes_read =
                self.reader
                    .read_line(&mut line)
                    .map_err(|e| Error::OperationFailed {
                        operation: "read_json".to_string(),
                        cause: e.to_string(),
                    })?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            if !line.trim().is_empty() {
                return Ok(Some(line));
            }
        }
    }

    fn parse_line(&self, line: &str) -> Result<T> {
        serde_json::from_str(line.trim()).map_err(|e| {
            Error::InvalidInput(format!(
                "Line {}: Failed to parse JSON: {e}",
                self.line_number
            ))
        })
    }
}

impl<R: BufRead, T: DeserializeOwned + Record> RecordSource for JsonRecordSource<R, T> {
    type Item = T;

    fn next_record(&mut self) -> Result<Option<T>> {
        // First call: detect format
        if !self.started && !self.detect_format()? {
            return Ok(None);
        }

        if let Some(record) = self.buffer.pop_front() {
            return Ok(Some(record));
        }
        if self.array_mode {
            return Ok(None);
        }

        match self.next_line()? {
            Some(line) => self.parse_line(&line).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        self.array_mode.then_some(self.buffer.len())
    }
}

/// Reads a single JSON record.
///
/// # Errors
///
/// Returns an error if the input is not a JSON object of the record type.
pub fn read_record<T: DeserializeOwned>(reader: impl Read) -> Result<T> {
    serde_json::from_reader(reader)
        .map_err(|e| Error::InvalidInput(format!("Failed to parse JSON record: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiaryEntry;

    #[test]
    fn test_array_of_movies() {
        let json = r#"[
  {"tmdbId": 949, "title": "Heat", "releaseDate": "1995-12-15", "genres": ["Crime", "Drama"]},
  {"tmdbId": 348, "title": "Alien"}
]"#;
        let mut source = MovieJsonSource::new(json.as_bytes());
        let heat = source.next_record().unwrap().unwrap();
        assert_eq!(heat.tmdb_id, 949);
        assert_eq!(heat.year(), Some(1995));
        assert_eq!(heat.genres, vec!["Crime", "Drama"]);
        assert_eq!(RecordSource::size_hint(&source), Some(1));
        assert_eq!(source.next_record().unwrap().unwrap().title, "Alien");
        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_ndjson_diary_entries() {
        let json = "{\"title\": \"Heat\", \"guid\": \"g1\", \"rating\": 4.5}\n\n{\"title\": \"Alien\", \"guid\": \"g2\"}\n";
        let mut source: JsonRecordSource<_, DiaryEntry> = JsonRecordSource::new(json.as_bytes());
        assert_eq!(source.next_record().unwrap().unwrap().guid, "g1");
        assert_eq!(source.next_record().unwrap().unwrap().guid, "g2");
        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_invalid_rating_is_rejected() {
        let json = "{\"title\": \"Heat\", \"guid\": \"g1\", \"rating\": 4.2}\n";
        let mut source: JsonRecordSource<_, DiaryEntry> = JsonRecordSource::new(json.as_bytes());
        assert!(source.next_record().is_err());
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let json = "{\"tmdbId\": 1, \"title\": \"A\"}\nnot json\n";
        let mut source = MovieJsonSource::new(json.as_bytes());
        assert!(source.next_record().unwrap().is_some());
        let err = source.next_record().unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn test_empty_input() {
        let mut source = MovieJsonSource::new("".as_bytes());
        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_read_record() {
        let movie: MovieMetadata = read_record("{\"tmdbId\": 1, \"title\": \"A\"}".as_bytes()).unwrap();
        assert_eq!(movie.title, "A");
    }
}
