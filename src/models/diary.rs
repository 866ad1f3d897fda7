//! Film diary entries.

use super::{RawValue, Rating, Record, RecordKind};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One logged viewing of a film.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    /// Film title.
    pub title: String,
    /// Unique viewing identifier (feed guid or synthetic CSV id).
    pub guid: String,
    /// Release year of the film.
    #[serde(default)]
    pub year: Option<i32>,
    /// The viewer's rating.
    #[serde(default)]
    pub rating: Option<Rating>,
    /// Whether this viewing was a rewatch.
    #[serde(default)]
    pub rewatch: bool,
    /// Day the film was watched.
    #[serde(default)]
    pub watched_date: Option<NaiveDate>,
    /// When the entry was published to the feed.
    #[serde(default)]
    pub published_date: Option<DateTime<Utc>>,
    /// Link to the diary entry page.
    #[serde(default)]
    pub link: Option<String>,
    /// Movie database id of the film.
    #[serde(default)]
    pub tmdb_id: Option<u64>,
    /// Poster image URL.
    #[serde(default)]
    pub poster_url: Option<String>,
    /// Review text.
    #[serde(default)]
    pub review: Option<String>,
    /// Whether the review is flagged as containing spoilers.
    #[serde(default)]
    pub contains_spoilers: bool,
    /// User tags. `None` when the source cannot say.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl DiaryEntry {
    /// Creates an entry with just a title and identifier.
    #[must_use]
    pub fn new(title: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            guid: guid.into(),
            year: None,
            rating: None,
            rewatch: false,
            watched_date: None,
            published_date: None,
            link: None,
            tmdb_id: None,
            poster_url: None,
            review: None,
            contains_spoilers: false,
            tags: None,
        }
    }

    /// Sets the release year.
    #[must_use]
    pub const fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Sets the rating.
    #[must_use]
    pub const fn with_rating(mut self, rating: Rating) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Marks the entry as a rewatch.
    #[must_use]
    pub const fn with_rewatch(mut self, rewatch: bool) -> Self {
        self.rewatch = rewatch;
        self
    }

    /// Sets the watched date.
    #[must_use]
    pub const fn with_watched_date(mut self, date: NaiveDate) -> Self {
        self.watched_date = Some(date);
        self
    }

    /// Sets the entry link.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Sets the poster URL.
    #[must_use]
    pub fn with_poster_url(mut self, url: impl Into<String>) -> Self {
        self.poster_url = Some(url.into());
        self
    }

    /// Sets the review text.
    #[must_use]
    pub fn with_review(mut self, review: impl Into<String>) -> Self {
        self.review = Some(review.into());
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Reads one field.
    #[must_use]
    pub fn get(&self, field: DiaryField) -> RawValue {
        match field {
            DiaryField::Title => RawValue::text(&self.title),
            DiaryField::Year => RawValue::optional(self.year),
            DiaryField::Rating => RawValue::optional(self.rating.map(Rating::value)),
            DiaryField::Stars => RawValue::optional(self.rating.map(Rating::stars)),
            DiaryField::Rewatch => RawValue::Bool(self.rewatch),
            DiaryField::WatchedDate => {
                RawValue::optional(self.watched_date.map(|d| d.format("%Y-%m-%d").to_string()))
            },
            DiaryField::PublishedDate => {
                RawValue::optional(self.published_date.map(|d| d.to_rfc3339()))
            },
            DiaryField::Link => RawValue::optional(self.link.as_ref()),
            DiaryField::Guid => RawValue::text(&self.guid),
            DiaryField::TmdbId => RawValue::optional(self.tmdb_id),
            DiaryField::PosterUrl => RawValue::optional(self.poster_url.as_ref()),
            DiaryField::Review => RawValue::optional(self.review.as_ref()),
            DiaryField::ContainsSpoilers => RawValue::Bool(self.contains_spoilers),
            DiaryField::Tags => RawValue::optional(self.tags.clone()),
        }
    }
}

impl Record for DiaryEntry {
    fn kind(&self) -> RecordKind {
        RecordKind::Diary
    }

    fn field(&self, name: &str) -> Option<RawValue> {
        DiaryField::parse(name).map(|field| self.get(field))
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.guid.clone())
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn date(&self) -> Option<String> {
        self.watched_date.map(|d| d.format("%Y-%m-%d").to_string())
    }
}

/// Template variables defined for diary entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiaryField {
    /// `title`
    Title,
    /// `year`
    Year,
    /// `rating`
    Rating,
    /// `stars`
    Stars,
    /// `rewatch`
    Rewatch,
    /// `watchedDate`
    WatchedDate,
    /// `publishedDate`
    PublishedDate,
    /// `link`
    Link,
    /// `guid`
    Guid,
    /// `tmdbId`
    TmdbId,
    /// `posterUrl`
    PosterUrl,
    /// `review`
    Review,
    /// `containsSpoilers`
    ContainsSpoilers,
    /// `tags`
    Tags,
}

impl DiaryField {
    /// Returns all diary fields.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Title,
            Self::Year,
            Self::Rating,
            Self::Stars,
            Self::Rewatch,
            Self::WatchedDate,
            Self::PublishedDate,
            Self::Link,
            Self::Guid,
            Self::TmdbId,
            Self::PosterUrl,
            Self::Review,
            Self::ContainsSpoilers,
            Self::Tags,
        ]
    }

    /// Returns the template variable name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Year => "year",
            Self::Rating => "rating",
            Self::Stars => "stars",
            Self::Rewatch => "rewatch",
            Self::WatchedDate => "watchedDate",
            Self::PublishedDate => "publishedDate",
            Self::Link => "link",
            Self::Guid => "guid",
            Self::TmdbId => "tmdbId",
            Self::PosterUrl => "posterUrl",
            Self::Review => "review",
            Self::ContainsSpoilers => "containsSpoilers",
            Self::Tags => "tags",
        }
    }

    /// Parses a template variable name. Names are case-sensitive.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|field| field.as_str() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heat() -> DiaryEntry {
        DiaryEntry::new("Heat", "letterboxd-review-42")
            .with_year(1995)
            .with_rating(Rating::new(4.5).unwrap())
            .with_watched_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
    }

    #[test]
    fn test_field_lookup_by_name() {
        let entry = heat();
        assert_eq!(entry.field("title"), Some(RawValue::text("Heat")));
        assert_eq!(entry.field("rating"), Some(RawValue::Number(4.5)));
        assert_eq!(entry.field("stars"), Some(RawValue::text("★★★★½")));
        assert_eq!(entry.field("watchedDate"), Some(RawValue::text("2024-03-01")));
        assert_eq!(entry.field("rewatch"), Some(RawValue::Bool(false)));
    }

    #[test]
    fn test_unknown_field_is_none() {
        assert_eq!(heat().field("director"), None);
        assert_eq!(heat().field("Title"), None);
    }

    #[test]
    fn test_unknown_values_are_missing() {
        let entry = heat();
        assert_eq!(entry.field("posterUrl"), Some(RawValue::Missing));
        assert_eq!(entry.field("tags"), Some(RawValue::Missing));
    }

    #[test]
    fn test_field_names_roundtrip() {
        for field in DiaryField::all() {
            assert_eq!(DiaryField::parse(field.as_str()), Some(*field));
        }
    }

    #[test]
    fn test_record_identity() {
        let entry = heat();
        assert_eq!(entry.unique_key().as_deref(), Some("letterboxd-review-42"));
        assert_eq!(entry.date().as_deref(), Some("2024-03-01"));
        assert_eq!(entry.kind(), RecordKind::Diary);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{"title":"Heat","guid":"g1","year":1995,"rating":4.5,"watchedDate":"2024-03-01","tags":["cinema"]}"#;
        let entry: DiaryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.year, Some(1995));
        assert_eq!(entry.watched_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(entry.tags, Some(vec!["cinema".to_string()]));
    }
}
