//! Reelsync CLI.
//!
//! Command-line interface for mirroring film diary entries and movie
//! metadata into a folder of markdown notes.

// Allow print_stdout/stderr in CLI binary (used for user output)
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use reelsync::config::ReelsyncConfig;
use reelsync::io::{
    DiaryCsvSource, Format, FsNoteStore, JsonRecordSource, MovieJsonSource, NoteStore,
    RecordSource, read_record,
};
use reelsync::models::{DiaryEntry, MovieMetadata, RecordKind, note_filename};
use reelsync::services::reconcile::{MergeEngine, PlannedAction, SyncPlan, SyncService};
use reelsync::{Error, observability};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "REELSYNC_CONFIG_PATH";

/// Reelsync - film diary to markdown notes.
#[derive(Parser)]
#[command(name = "reelsync")]
#[command(about = "Mirror film diary entries and movie metadata into markdown notes")]
#[command(version)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path.
    #[arg(long, global = true)]
    config: Option<String>,

    /// Vault directory notes are written under.
    #[arg(long, global = true, env = "REELSYNC_VAULT")]
    vault: Option<PathBuf>,

    /// Show what would change without writing any note.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Input format, overriding detection from the file extension.
    #[arg(long, global = true)]
    format: Option<Format>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Sync diary entries from a CSV export or JSON dump.
    Import {
        /// Diary file (`.csv`, `.json`, or `.jsonl`).
        file: PathBuf,
    },

    /// Sync movie metadata notes from a JSON dump.
    Movies {
        /// Metadata file (`.json` or `.jsonl`).
        file: PathBuf,
    },

    /// Validate a batch and print the planned actions.
    Plan {
        /// Record file.
        file: PathBuf,

        /// Record kind in the file.
        #[arg(short, long, default_value = "diary", value_parser = parse_kind)]
        kind: RecordKind,

        /// Print the plan as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Render the note for a single record.
    Render {
        /// Record kind (diary or movie).
        #[arg(value_parser = parse_kind)]
        kind: RecordKind,

        /// JSON file holding one record.
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        },
    };
    let config = match cli.vault.clone() {
        Some(vault) => config.with_vault(vault),
        None => config,
    };

    if let Err(e) = observability::init_from_config(Some(&config.logging), cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli, &config) {
        Ok(code) => code,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(cli: Cli, config: &ReelsyncConfig) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Import { file } => {
            cmd_sync(config, RecordKind::Diary, &Input::new(file, cli.format), cli.dry_run)
        },
        Commands::Movies { file } => {
            cmd_sync(config, RecordKind::Movie, &Input::new(file, cli.format), cli.dry_run)
        },
        Commands::Plan { file, kind, json } => {
            cmd_plan(config, kind, &Input::new(file, cli.format), json)
        },
        Commands::Render { kind, file } => cmd_render(config, kind, &file),
    }
}

/// Loads configuration from the `--config` path, `REELSYNC_CONFIG_PATH`, or
/// the default location.
fn load_config(config_path: Option<&str>) -> reelsync::Result<ReelsyncConfig> {
    if let Some(path) = config_path {
        return ReelsyncConfig::load_from_file(Path::new(path));
    }
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return ReelsyncConfig::load_from_file(&path);
        }
    }
    ReelsyncConfig::load_default()
}

/// Syncs a record file into the note folder for `kind`.
fn cmd_sync(
    config: &ReelsyncConfig,
    kind: RecordKind,
    input: &Input,
    dry_run: bool,
) -> anyhow::Result<ExitCode> {
    let service = config.sync_service(kind);
    let store = FsNoteStore::new(config.note_dir(kind)?);

    if dry_run {
        let plan = match kind {
            RecordKind::Diary => plan_records(&service, diary_source(input)?, &store)?,
            RecordKind::Movie => plan_records(&service, movie_source(input)?, &store)?,
        };
        print_plan(&plan);
        println!(
            "\nDry run: would create {}, update {}, skip {}, fail {}",
            plan.creates(),
            plan.updates(),
            plan.skips(),
            plan.failures.len()
        );
        return Ok(exit_code(plan.failures.is_empty()));
    }

    let summary = match kind {
        RecordKind::Diary => service.sync(diary_source(input)?, &store)?,
        RecordKind::Movie => service.sync(movie_source(input)?, &store)?,
    };

    for failure in &summary.errors {
        eprintln!("  failed  {failure}");
    }
    println!("{}: {summary}", store.base_path().display());
    Ok(exit_code(summary.is_clean()))
}

/// Prints the planned actions without writing.
fn cmd_plan(
    config: &ReelsyncConfig,
    kind: RecordKind,
    input: &Input,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let service = config.sync_service(kind);
    let store = FsNoteStore::new(config.note_dir(kind)?);

    let plan = match kind {
        RecordKind::Diary => plan_records(&service, diary_source(input)?, &store)?,
        RecordKind::Movie => plan_records(&service, movie_source(input)?, &store)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan);
        println!(
            "\n{} to create, {} to update, {} unchanged, {} failed",
            plan.creates(),
            plan.updates(),
            plan.skips(),
            plan.failures.len()
        );
    }
    Ok(exit_code(plan.failures.is_empty()))
}

/// Renders one record to stdout.
fn cmd_render(config: &ReelsyncConfig, kind: RecordKind, file: &Path) -> anyhow::Result<ExitCode> {
    let reader = open(file)?;
    let templates = config.kind(kind).templates();
    let engine = MergeEngine::new();

    let note = match kind {
        RecordKind::Diary => engine.render_note(&read_record::<DiaryEntry>(reader)?, &templates),
        RecordKind::Movie => engine.render_note(&read_record::<MovieMetadata>(reader)?, &templates),
    };

    println!("{}", note_filename(&note.stem));
    println!();
    print!("{}", note.content);
    Ok(ExitCode::SUCCESS)
}

/// Reads every record and plans the batch against the store.
fn plan_records<I, S>(service: &SyncService, mut source: I, store: &S) -> anyhow::Result<SyncPlan>
where
    I: RecordSource,
    S: NoteStore,
{
    let mut records: Vec<I::Item> = Vec::new();
    while let Some(record) = source.next_record()? {
        records.push(record);
    }
    let notes = store.list()?;
    Ok(service.plan(&records, &notes)?)
}

fn print_plan(plan: &SyncPlan) {
    for planned in &plan.records {
        match &planned.action {
            PlannedAction::Create { filename, .. } => println!("  create  {filename}"),
            PlannedAction::Update { filename, .. } => println!("  update  {filename}"),
            PlannedAction::Skip { reason, filename } => println!(
                "  skip    {} ({})",
                filename.as_deref().unwrap_or(&planned.title),
                reason.as_str()
            ),
        }
    }
    for failure in &plan.failures {
        println!("  failed  {failure}");
    }
}

/// A record file and its format.
struct Input {
    path: PathBuf,
    format: Option<Format>,
}

impl Input {
    const fn new(path: PathBuf, format: Option<Format>) -> Self {
        Self { path, format }
    }

    /// The `--format` override, or the format implied by the extension.
    fn format(&self) -> reelsync::Result<Format> {
        self.format.map_or_else(|| Format::from_path(&self.path), Ok)
    }
}

/// Opens a diary file, CSV export or JSON.
fn diary_source(input: &Input) -> anyhow::Result<Box<dyn RecordSource<Item = DiaryEntry>>> {
    let format = input.format()?;
    let reader = open(&input.path)?;
    let source: Box<dyn RecordSource<Item = DiaryEntry>> = match format {
        Format::Csv => Box::new(DiaryCsvSource::new(reader)?),
        Format::Json => Box::new(JsonRecordSource::<_, DiaryEntry>::new(reader)),
    };
    Ok(source)
}

/// Opens a movie metadata JSON file.
fn movie_source(input: &Input) -> anyhow::Result<MovieJsonSource<BufReader<File>>> {
    match input.format()? {
        Format::Json => Ok(MovieJsonSource::new(open(&input.path)?)),
        Format::Csv => anyhow::bail!("movie metadata must be JSON: {}", input.path.display()),
    }
}

fn open(path: &Path) -> anyhow::Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn parse_kind(s: &str) -> Result<RecordKind, String> {
    RecordKind::parse(s).ok_or_else(|| format!("unknown record kind '{s}' (diary or movie)"))
}

const fn exit_code(clean: bool) -> ExitCode {
    if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Prints an error, listing every conflict of an ambiguous batch.
fn report_error(e: &anyhow::Error) {
    eprintln!("Error: {e:#}");
    if let Some(Error::AmbiguousBatch(conflicts)) = e.downcast_ref::<Error>() {
        for conflict in conflicts {
            eprintln!("  {conflict}");
        }
    }
}
