//! Configuration management.
//!
//! ```toml
//! [vault]
//! path = "~/Notes"
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//!
//! [diary]
//! folder = "Films/Diary"
//! filename_template = "{{watchedDate}} {{title}}"
//! body_template_file = "diary.md"
//! identifier_key = "letterboxd_guid"
//!
//! [diary.fields]
//! immutable = ["guid", "watchedDate", "posterUrl"]
//! dates = ["watchedDate"]
//! ```

pub mod defaults;

use crate::models::RecordKind;
use crate::services::reconcile::{FieldClass, MutabilityRules, NoteTemplates, SyncService};
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration for reelsync.
#[derive(Debug, Clone)]
pub struct ReelsyncConfig {
    /// Root directory of the note vault.
    pub vault: Option<PathBuf>,
    /// Logging settings from the config file.
    pub logging: LoggingSettings,
    /// Diary note settings.
    pub diary: NoteKindConfig,
    /// Movie note settings.
    pub movie: NoteKindConfig,
}

/// Settings for one kind of note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteKindConfig {
    /// Folder inside the vault.
    pub folder: PathBuf,
    /// File name template.
    pub filename_template: String,
    /// Body template.
    pub body_template: String,
    /// Frontmatter key of the record identifier.
    pub identifier_key: String,
    /// Frontmatter key of the record title.
    pub title_key: String,
    /// Fields that are never rewritten once they hold a value.
    pub immutable: Vec<String>,
    /// Fields compared by calendar date.
    pub dates: Vec<String>,
}

impl NoteKindConfig {
    /// Built-in settings for diary notes.
    #[must_use]
    pub fn diary() -> Self {
        Self {
            folder: PathBuf::from("Films/Diary"),
            filename_template: defaults::DIARY_FILENAME_TEMPLATE.to_string(),
            body_template: defaults::DIARY_BODY_TEMPLATE.to_string(),
            identifier_key: "letterboxd_guid".to_string(),
            title_key: "title".to_string(),
            immutable: to_strings(defaults::DIARY_IMMUTABLE),
            dates: to_strings(defaults::DIARY_DATES),
        }
    }

    /// Built-in settings for movie notes.
    #[must_use]
    pub fn movie() -> Self {
        Self {
            folder: PathBuf::from("Films/Movies"),
            filename_template: defaults::MOVIE_FILENAME_TEMPLATE.to_string(),
            body_template: defaults::MOVIE_BODY_TEMPLATE.to_string(),
            identifier_key: "tmdb_id".to_string(),
            title_key: "title".to_string(),
            immutable: to_strings(defaults::MOVIE_IMMUTABLE),
            dates: to_strings(defaults::MOVIE_DATES),
        }
    }

    /// The note templates.
    #[must_use]
    pub fn templates(&self) -> NoteTemplates {
        NoteTemplates::new(&self.filename_template, &self.body_template)
            .with_identifier_key(&self.identifier_key)
            .with_title_key(&self.title_key)
    }

    /// The mutability rules.
    #[must_use]
    pub fn rules(&self) -> MutabilityRules {
        let rules = self
            .immutable
            .iter()
            .fold(MutabilityRules::new(), |rules, field| {
                rules.with_class(field, FieldClass::Immutable)
            });
        self.dates
            .iter()
            .fold(rules, |rules, field| rules.with_date_field(field))
    }

    /// Applies a config-file section on top of these settings.
    ///
    /// `base_dir` resolves a relative `body_template_file`.
    fn merge_file(&mut self, file: ConfigFileNoteKind, base_dir: &Path) -> Result<()> {
        if let Some(folder) = file.folder {
            self.folder = PathBuf::from(folder);
        }
        if let Some(template) = file.filename_template {
            self.filename_template = template;
        }
        match (file.body_template, file.body_template_file) {
            (Some(_), Some(_)) => {
                return Err(Error::InvalidInput(
                    "set either body_template or body_template_file, not both".to_string(),
                ));
            },
            (Some(body), None) => self.body_template = body,
            (None, Some(path)) => {
                let path = base_dir.join(expand_home(&path));
                self.body_template =
                    std::fs::read_to_string(&path).map_err(|e| Error::OperationFailed {
                        operation: "read_body_template".to_string(),
                        cause: format!("{}: {e}", path.display()),
                    })?;
            },
            (None, None) => {},
        }
        if let Some(key) = file.identifier_key {
            self.identifier_key = key;
        }
        if let Some(key) = file.title_key {
            self.title_key = key;
        }
        if let Some(fields) = file.fields {
            if let Some(immutable) = fields.immutable {
                self.immutable = immutable;
            }
            if let Some(dates) = fields.dates {
                self.dates = dates;
            }
        }
        Ok(())
    }
}

/// Logging section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `reelsync=debug`.
    pub level: Option<String>,
    /// Output format: `pretty` or `json`.
    pub format: Option<String>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Vault section.
    pub vault: Option<ConfigFileVault>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
    /// Diary section.
    pub diary: Option<ConfigFileNoteKind>,
    /// Movie section.
    pub movie: Option<ConfigFileNoteKind>,
}

/// Vault section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileVault {
    /// Vault root directory.
    pub path: Option<String>,
}

/// Note kind section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileNoteKind {
    /// Folder inside the vault.
    pub folder: Option<String>,
    /// File name template.
    pub filename_template: Option<String>,
    /// Inline body template.
    pub body_template: Option<String>,
    /// Body template file, relative to the config file.
    pub body_template_file: Option<String>,
    /// Frontmatter key of the record identifier.
    pub identifier_key: Option<String>,
    /// Frontmatter key of the record title.
    pub title_key: Option<String>,
    /// Field rules.
    pub fields: Option<ConfigFileFields>,
}

/// Field rules in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileFields {
    /// Fields never rewritten once set.
    pub immutable: Option<Vec<String>>,
    /// Fields compared by calendar date.
    pub dates: Option<Vec<String>>,
}

impl Default for ReelsyncConfig {
    fn default() -> Self {
        Self {
            vault: None,
            logging: LoggingSettings::default(),
            diary: NoteKindConfig::diary(),
            movie: NoteKindConfig::movie(),
        }
    }
}

impl ReelsyncConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a template
    /// file it names cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml(&contents, base_dir)
    }

    /// Parses configuration text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration.
    pub fn from_toml(contents: &str, base_dir: &Path) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;
        Self::from_config_file(file, base_dir)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/reelsync/` on macOS)
    /// 2. XDG config dir (`~/.config/reelsync/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be loaded.
    pub fn load_default() -> Result<Self> {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Ok(Self::default());
        };

        let candidates = [
            base_dirs.config_dir().join("reelsync").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("reelsync")
                .join("config.toml"),
        ];
        candidates
            .iter()
            .find(|path| path.exists())
            .map_or_else(|| Ok(Self::default()), |path| Self::load_from_file(path))
    }

    /// Converts a `ConfigFile` to `ReelsyncConfig`.
    fn from_config_file(file: ConfigFile, base_dir: &Path) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = file.vault.and_then(|v| v.path) {
            config.vault = Some(expand_home(&path));
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }
        if let Some(diary) = file.diary {
            config.diary.merge_file(diary, base_dir)?;
        }
        if let Some(movie) = file.movie {
            config.movie.merge_file(movie, base_dir)?;
        }

        Ok(config)
    }

    /// Sets the vault directory.
    #[must_use]
    pub fn with_vault(mut self, path: impl Into<PathBuf>) -> Self {
        self.vault = Some(path.into());
        self
    }

    /// Settings for one record kind.
    #[must_use]
    pub const fn kind(&self, kind: RecordKind) -> &NoteKindConfig {
        match kind {
            RecordKind::Diary => &self.diary,
            RecordKind::Movie => &self.movie,
        }
    }

    /// The folder notes of `kind` live in.
    ///
    /// # Errors
    ///
    /// Returns an error if no vault directory is configured.
    pub fn note_dir(&self, kind: RecordKind) -> Result<PathBuf> {
        let vault = self.vault.as_ref().ok_or_else(|| {
            Error::InvalidInput(
                "no vault directory configured (use --vault or [vault] path)".to_string(),
            )
        })?;
        Ok(vault.join(&self.kind(kind).folder))
    }

    /// Builds the sync service for one record kind.
    #[must_use]
    pub fn sync_service(&self, kind: RecordKind) -> SyncService {
        let settings = self.kind(kind);
        SyncService::new(kind, settings.templates(), settings.rules())
    }
}

/// Expands a leading `~` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(base_dirs) = directories::BaseDirs::new()
    {
        return base_dirs.home_dir().join(rest);
    }
    PathBuf::from(path)
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
