//! Built-in note templates.

/// Default diary note file name.
pub const DIARY_FILENAME_TEMPLATE: &str = "{{watchedDate}} {{title}}";

/// Default diary note body.
pub const DIARY_BODY_TEMPLATE: &str = r#"---
letterboxd_guid: {{guid}}
title: {{title yaml=true}}
year: {{year}}
rating: {{rating}}
stars: {{stars yaml=true}}
watched: {{watchedDate}}
rewatch: {{rewatch}}
link: {{link}}
poster: {{posterUrl}}
tags: {{tags yaml=true}}
---
# {{title}}{{#if year}} ({{year}}){{/if}}

{{#if posterUrl}}![poster]({{posterUrl}})

{{/if}}{{#if review}}{{review quote=true}}
{{/if}}"#;

/// Diary fields kept once written.
pub const DIARY_IMMUTABLE: &[&str] = &["guid", "watchedDate", "posterUrl"];

/// Diary fields compared by calendar date.
pub const DIARY_DATES: &[&str] = &["watchedDate", "publishedDate"];

/// Default movie note file name.
pub const MOVIE_FILENAME_TEMPLATE: &str = "{{title}} ({{year}})";

/// Default movie note body.
pub const MOVIE_BODY_TEMPLATE: &str = r#"---
tmdb_id: {{tmdbId}}
imdb_id: {{imdbId}}
title: {{title yaml=true}}
original_title: {{originalTitle yaml=true}}
year: {{year}}
release_date: {{releaseDate}}
runtime: {{runtime}}
genres: {{genres yaml=true}}
directors: {{directors yaml=true link=true}}
cast: {{cast top=10 yaml=true bullet=true}}
rating: {{voteAverage}}
poster: {{posterUrl}}
---
# {{title}}

{{#if tagline}}{{tagline italic=true}}

{{/if}}{{overview}}

## Cast

{{castWithRoles top=10 bullet=true linkActors=true}}
"#;

/// Movie fields kept once written.
pub const MOVIE_IMMUTABLE: &[&str] = &["tmdbId", "imdbId"];

/// Movie fields compared by calendar date.
pub const MOVIE_DATES: &[&str] = &["releaseDate"];
