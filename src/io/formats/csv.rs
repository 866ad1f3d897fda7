//! Diary CSV export adapter.
//!
//! Reads the `diary.csv` file of a Letterboxd data export:
//!
//! ```text
//! Date,Name,Year,Letterboxd URI,Rating,Rewatch,Tags,Watched Date
//! 2024-03-02,Heat,1995,https://boxd.it/abc,4.5,Yes,"cinema, 35mm",2024-03-01
//! ```
//!
//! The export has no per-viewing id, so each row gets a synthetic one from
//! [`IdentifierHasher::diary_id`].

use crate::io::traits::RecordSource;
use crate::models::{DiaryEntry, Rating};
use crate::services::reconcile::IdentifierHasher;
use crate::{Error, Result};
use chrono::{NaiveDate, NaiveTime};
use std::io::Read;

/// Maps CSV column indices to diary fields.
#[derive(Debug, Default)]
struct ColumnMap {
    logged: Option<usize>,
    name: Option<usize>,
    year: Option<usize>,
    uri: Option<usize>,
    rating: Option<usize>,
    rewatch: Option<usize>,
    tags: Option<usize>,
    watched: Option<usize>,
}

impl ColumnMap {
    /// Creates a column map from CSV headers.
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let mut map = Self::default();

        for (i, header) in headers.iter().enumerate() {
            match header.trim().to_lowercase().as_str() {
                "date" | "logged date" => map.logged = Some(i),
                "name" | "title" | "film" => map.name = Some(i),
                "year" => map.year = Some(i),
                "letterboxd uri" | "uri" | "url" | "link" => map.uri = Some(i),
                "rating" => map.rating = Some(i),
                "rewatch" => map.rewatch = Some(i),
                "tags" => map.tags = Some(i),
                "watched date" | "watched" => map.watched = Some(i),
                _ => {}, // Ignore unknown columns
            }
        }

        if map.name.is_none() {
            return Err(Error::InvalidInput(
                "diary CSV must have a 'Name' column".to_string(),
            ));
        }

        Ok(map)
    }
}

/// Diary entries read from a CSV export.
pub struct DiaryCsvSource<R: Read> {
    reader: csv::Reader<R>,
    column_map: ColumnMap,
    /// 1-based data row number, for error messages.
    row: usize,
}

impl<R: Read> DiaryCsvSource<R> {
    /// Creates a source over CSV text with a header row.
    ///
    /// # Errors
    ///
    /// Returns an error if headers cannot be read or the `Name` column is
    /// missing.
    pub fn new(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| Error::OperationFailed {
                operation: "read_csv_headers".to_string(),
                cause: e.to_string(),
            })?
            .clone();
        let column_map = ColumnMap::from_headers(&headers)?;

        Ok(Self {
            reader: csv_reader,
            column_map,
            row: 0,
        })
    }

    /// Parses one row into a diary entry.
    fn parse_record(&self, record: &csv::StringRecord) -> Result<DiaryEntry> {
        let get_field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };
        let row = self.row;
        let invalid = |what: &str, value: &str| {
            Error::InvalidInput(format!("row {row}: invalid {what} '{value}'"))
        };

        let title = get_field(self.column_map.name)
            .ok_or_else(|| Error::InvalidInput(format!("row {row}: missing Name")))?;

        let year = get_field(self.column_map.year)
            .map(|y| y.parse::<i32>().map_err(|_| invalid("Year", y)))
            .transpose()?;

        let rating = get_field(self.column_map.rating)
            .map(|r| Rating::parse(r).map_err(|_| invalid("Rating", r)))
            .transpose()?;

        let watched_date = get_field(self.column_map.watched)
            .or_else(|| get_field(self.column_map.logged))
            .map(|d| parse_day(d).ok_or_else(|| invalid("Watched Date", d)))
            .transpose()?;

        let logged = get_field(self.column_map.logged)
            .map(|d| parse_day(d).ok_or_else(|| invalid("Date", d)))
            .transpose()?;

        let rewatch = get_field(self.column_map.rewatch).is_some_and(|r| {
            matches!(r.to_lowercase().as_str(), "yes" | "true" | "1" | "y")
        });

        let tags: Vec<String> = get_field(self.column_map.tags)
            .map(|t| {
                t.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let watched_text = watched_date.map(|d| d.format("%Y-%m-%d").to_string());
        let guid = IdentifierHasher::diary_id(title, year, watched_text.as_deref(), rewatch);

        let mut entry = DiaryEntry::new(title, guid)
            .with_rewatch(rewatch)
            .with_tags(tags);
        entry.year = year;
        entry.rating = rating;
        entry.watched_date = watched_date;
        entry.published_date = logged.map(|d| d.and_time(NaiveTime::MIN).and_utc());
        entry.link = get_field(self.column_map.uri).map(String::from);
        Ok(entry)
    }
}

impl<R: Read> RecordSource for DiaryCsvSource<R> {
    type Item = DiaryEntry;

    fn next_record(&mut self) -> Result<Option<DiaryEntry>> {
        let mut record = csv::StringRecord::new();

        let has_record = self
            .reader
            .read_record(&mut record)
            .map_err(|e| Error::OperationFailed {
                operation: "read_csv".to_string(),
                cause: e.to_string(),
            })?;
        if !has_record {
            return Ok(None);
        }
        self.row += 1;

        self.parse_record(&record).map(Some)
    }
}

/// Parses a `YYYY-MM-DD` day, ignoring any trailing time.
fn parse_day(text: &str) -> Option<NaiveDate> {
    text.get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use crate::services::reconcile::SYNTHETIC_PREFIX;

    const EXPORT: &str = "Date,Name,Year,Letterboxd URI,Rating,Rewatch,Tags,Watched Date\n\
2024-03-02,Heat,1995,https://boxd.it/abc,4.5,Yes,\"cinema, 35mm\",2024-03-01\n\
2024-03-05,Alien,1979,https://boxd.it/def,,,,\n";

    #[test]
    fn test_reads_rows() {
        let mut source = DiaryCsvSource::new(EXPORT.as_bytes()).unwrap();

        let heat = source.next_record().unwrap().unwrap();
        assert_eq!(heat.title, "Heat");
        assert_eq!(heat.year, Some(1995));
        assert_eq!(heat.rating.map(Rating::value), Some(4.5));
        assert!(heat.rewatch);
        assert_eq!(heat.tags, Some(vec!["cinema".to_string(), "35mm".to_string()]));
        assert_eq!(heat.date().as_deref(), Some("2024-03-01"));
        assert_eq!(heat.link.as_deref(), Some("https://boxd.it/abc"));
        assert!(heat.guid.starts_with(SYNTHETIC_PREFIX));

        let alien = source.next_record().unwrap().unwrap();
        assert_eq!(alien.rating, None);
        assert!(!alien.rewatch);
        assert_eq!(alien.tags, Some(Vec::new()));
        // Falls back to the logged date
        assert_eq!(alien.date().as_deref(), Some("2024-03-05"));

        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_ids_are_stable_across_reads() {
        let first = DiaryCsvSource::new(EXPORT.as_bytes())
            .unwrap()
            .next_record()
            .unwrap()
            .unwrap();
        let second = DiaryCsvSource::new(EXPORT.as_bytes())
            .unwrap()
            .next_record()
            .unwrap()
            .unwrap();
        assert_eq!(first.guid, second.guid);
    }

    #[test]
    fn test_missing_name_column() {
        assert!(DiaryCsvSource::new("Date,Year\n2024-01-01,1995\n".as_bytes()).is_err());
    }

    #[test]
    fn test_bad_rating_reports_row() {
        let csv = "Name,Rating\nHeat,4.5\nAlien,7\n";
        let mut source = DiaryCsvSource::new(csv.as_bytes()).unwrap();
        assert!(source.next_record().unwrap().is_some());
        let err = source.next_record().unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }
}
