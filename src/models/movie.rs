//! Movie metadata from the movie database.

use super::{RawValue, Record, RecordKind};
use crate::rendering::{ModifierParams, wiki_link, yaml_quote};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Name of the paired actor/role special field.
pub const CAST_WITH_ROLES: &str = "castWithRoles";

/// One billed cast member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    /// Actor name.
    pub name: String,
    /// Character played, when credited.
    #[serde(default)]
    pub character: Option<String>,
}

impl CastMember {
    /// Creates a cast member.
    #[must_use]
    pub fn new(name: impl Into<String>, character: Option<&str>) -> Self {
        Self {
            name: name.into(),
            character: character.map(str::to_string),
        }
    }
}

/// Catalog metadata for one movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieMetadata {
    /// Movie database id; the unique key of movie notes.
    pub tmdb_id: u64,
    /// Title in the user's language.
    pub title: String,
    /// IMDb identifier.
    #[serde(default)]
    pub imdb_id: Option<String>,
    /// Title in the original language.
    #[serde(default)]
    pub original_title: Option<String>,
    /// Theatrical release date.
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    /// Runtime in minutes.
    #[serde(default)]
    pub runtime: Option<u32>,
    /// Plot overview.
    #[serde(default)]
    pub overview: Option<String>,
    /// Marketing tagline.
    #[serde(default)]
    pub tagline: Option<String>,
    /// Genre names.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Director names.
    #[serde(default)]
    pub directors: Vec<String>,
    /// Screenwriter names.
    #[serde(default)]
    pub writers: Vec<String>,
    /// Billed cast, in billing order.
    #[serde(default)]
    pub cast: Vec<CastMember>,
    /// Production countries.
    #[serde(default)]
    pub countries: Vec<String>,
    /// Spoken languages.
    #[serde(default)]
    pub languages: Vec<String>,
    /// Average community vote.
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Poster image URL.
    #[serde(default)]
    pub poster_url: Option<String>,
    /// Backdrop image URL.
    #[serde(default)]
    pub backdrop_url: Option<String>,
}

impl MovieMetadata {
    /// Creates metadata with just an id and title.
    #[must_use]
    pub fn new(tmdb_id: u64, title: impl Into<String>) -> Self {
        Self {
            tmdb_id,
            title: title.into(),
            imdb_id: None,
            original_title: None,
            release_date: None,
            runtime: None,
            overview: None,
            tagline: None,
            genres: Vec::new(),
            directors: Vec::new(),
            writers: Vec::new(),
            cast: Vec::new(),
            countries: Vec::new(),
            languages: Vec::new(),
            vote_average: None,
            poster_url: None,
            backdrop_url: None,
        }
    }

    /// Release year, derived from the release date.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.release_date.map(|d| d.year())
    }

    /// Reads one field.
    #[must_use]
    pub fn get(&self, field: MovieField) -> RawValue {
        match field {
            MovieField::TmdbId => RawValue::from(self.tmdb_id),
            MovieField::ImdbId => RawValue::optional(self.imdb_id.as_ref()),
            MovieField::Title => RawValue::text(&self.title),
            MovieField::OriginalTitle => RawValue::optional(self.original_title.as_ref()),
            MovieField::Year => RawValue::optional(self.year()),
            MovieField::ReleaseDate => {
                RawValue::optional(self.release_date.map(|d| d.format("%Y-%m-%d").to_string()))
            },
            MovieField::Runtime => RawValue::optional(self.runtime),
            MovieField::Overview => RawValue::optional(self.overview.as_ref()),
            MovieField::Tagline => RawValue::optional(self.tagline.as_ref()),
            MovieField::Genres => RawValue::from(self.genres.as_slice()),
            MovieField::Directors => RawValue::from(self.directors.as_slice()),
            MovieField::Writers => RawValue::from(self.writers.as_slice()),
            MovieField::Cast => {
                RawValue::List(self.cast.iter().map(|member| member.name.clone()).collect())
            },
            MovieField::Characters => RawValue::List(
                self.cast
                    .iter()
                    .filter_map(|member| member.character.clone())
                    .filter(|character| !character.is_empty())
                    .collect(),
            ),
            MovieField::Countries => RawValue::from(self.countries.as_slice()),
            MovieField::Languages => RawValue::from(self.languages.as_slice()),
            MovieField::VoteAverage => RawValue::optional(self.vote_average),
            MovieField::PosterUrl => RawValue::optional(self.poster_url.as_ref()),
            MovieField::BackdropUrl => RawValue::optional(self.backdrop_url.as_ref()),
        }
    }

    /// Renders the cast as `Actor as Character` items.
    ///
    /// Honours `top`, `linkActors`, `linkCharacters`, `bullet` and `yaml`.
    #[must_use]
    pub fn cast_with_roles(&self, params: &ModifierParams) -> String {
        let limit = params.top.unwrap_or(usize::MAX);
        let items: Vec<String> = self
            .cast
            .iter()
            .take(limit)
            .map(|member| {
                let actor = if params.link_actors {
                    wiki_link(&member.name)
                } else {
                    member.name.clone()
                };
                match member.character.as_deref().filter(|c| !c.is_empty()) {
                    Some(character) if params.link_characters => {
                        format!("{actor} as {}", wiki_link(character))
                    },
                    Some(character) => format!("{actor} as {character}"),
                    None => actor,
                }
            })
            .collect();

        if params.yaml {
            let quoted: Vec<String> = items.iter().map(|item| yaml_quote(item)).collect();
            if params.bullet && !quoted.is_empty() {
                return quoted.iter().map(|item| format!("\n  - {item}")).collect();
            }
            return format!("[{}]", quoted.join(", "));
        }
        if params.bullet {
            return items
                .iter()
                .map(|item| format!("- {item}"))
                .collect::<Vec<_>>()
                .join("\n");
        }
        items.join(", ")
    }
}

impl Record for MovieMetadata {
    fn kind(&self) -> RecordKind {
        RecordKind::Movie
    }

    fn field(&self, name: &str) -> Option<RawValue> {
        MovieField::parse(name).map(|field| self.get(field))
    }

    fn special(&self, name: &str, params: &ModifierParams) -> Option<String> {
        (name == CAST_WITH_ROLES).then(|| self.cast_with_roles(params))
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.tmdb_id.to_string())
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn date(&self) -> Option<String> {
        self.release_date.map(|d| d.format("%Y-%m-%d").to_string())
    }
}

/// Template variables defined for movie metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum MovieField {
    TmdbId,
    ImdbId,
    Title,
    OriginalTitle,
    Year,
    ReleaseDate,
    Runtime,
    Overview,
    Tagline,
    Genres,
    Directors,
    Writers,
    Cast,
    Characters,
    Countries,
    Languages,
    VoteAverage,
    PosterUrl,
    BackdropUrl,
}

impl MovieField {
    /// Returns all movie fields.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::TmdbId,
            Self::ImdbId,
            Self::Title,
            Self::OriginalTitle,
            Self::Year,
            Self::ReleaseDate,
            Self::Runtime,
            Self::Overview,
            Self::Tagline,
            Self::Genres,
            Self::Directors,
            Self::Writers,
            Self::Cast,
            Self::Characters,
            Self::Countries,
            Self::Languages,
            Self::VoteAverage,
            Self::PosterUrl,
            Self::BackdropUrl,
        ]
    }

    /// Returns the template variable name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TmdbId => "tmdbId",
            Self::ImdbId => "imdbId",
            Self::Title => "title",
            Self::OriginalTitle => "originalTitle",
            Self::Year => "year",
            Self::ReleaseDate => "releaseDate",
            Self::Runtime => "runtime",
            Self::Overview => "overview",
            Self::Tagline => "tagline",
            Self::Genres => "genres",
            Self::Directors => "directors",
            Self::Writers => "writers",
            Self::Cast => "cast",
            Self::Characters => "characters",
            Self::Countries => "countries",
            Self::Languages => "languages",
            Self::VoteAverage => "voteAverage",
            Self::PosterUrl => "posterUrl",
            Self::BackdropUrl => "backdropUrl",
        }
    }

    /// Parses a template variable name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|field| field.as_str() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heat() -> MovieMetadata {
        let mut movie = MovieMetadata::new(949, "Heat");
        movie.release_date = NaiveDate::from_ymd_opt(1995, 12, 15);
        movie.genres = vec!["Crime".into(), "Drama".into()];
        movie.cast = vec![
            CastMember::new("Al Pacino", Some("Vincent Hanna")),
            CastMember::new("Robert De Niro", Some("Neil McCauley")),
            CastMember::new("Val Kilmer", None),
        ];
        movie
    }

    #[test]
    fn test_fields() {
        let movie = heat();
        assert_eq!(movie.field("tmdbId"), Some(RawValue::Number(949.0)));
        assert_eq!(movie.field("year"), Some(RawValue::Number(1995.0)));
        assert_eq!(movie.field("releaseDate"), Some(RawValue::text("1995-12-15")));
        assert_eq!(
            movie.field("characters"),
            Some(RawValue::List(vec!["Vincent Hanna".into(), "Neil McCauley".into()]))
        );
        assert_eq!(movie.field("runtime"), Some(RawValue::Missing));
        assert_eq!(movie.field("stars"), None);
    }

    #[test]
    fn test_cast_with_roles_default() {
        let text = heat().cast_with_roles(&ModifierParams::default());
        assert_eq!(
            text,
            "Al Pacino as Vincent Hanna, Robert De Niro as Neil McCauley, Val Kilmer"
        );
    }

    #[test]
    fn test_cast_with_roles_links_and_top() {
        let params = ModifierParams::parse(" top=2 bullet=true linkActors=true linkCharacters=true");
        let text = heat().cast_with_roles(&params);
        assert_eq!(
            text,
            "- [[Al Pacino]] as [[Vincent Hanna]]\n- [[Robert De Niro]] as [[Neil McCauley]]"
        );
    }

    #[test]
    fn test_cast_with_roles_yaml() {
        let params = ModifierParams::parse(" top=1 yaml=true");
        assert_eq!(heat().cast_with_roles(&params), r#"["Al Pacino as Vincent Hanna"]"#);
    }

    #[test]
    fn test_special_only_answers_its_name() {
        let movie = heat();
        let params = ModifierParams::default();
        assert!(movie.special(CAST_WITH_ROLES, &params).is_some());
        assert!(movie.special("cast", &params).is_none());
    }

    #[test]
    fn test_unique_key_is_tmdb_id() {
        assert_eq!(heat().unique_key().as_deref(), Some("949"));
    }
}
