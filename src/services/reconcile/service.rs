//! Batch sync service.
//!
//! A sync pass runs in two phases:
//! 1. **Plan**: match every record against the existing notes, collect all
//!    ambiguities, and compute each create/update. Nothing is written; any
//!    ambiguity aborts the batch here.
//! 2. **Apply**: perform the planned writes in record order. A failed write
//!    is recorded against the record's title and the pass continues.

use serde::Serialize;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, info, instrument, warn};

use super::matcher::EntryMatcher;
use super::merge::MergeEngine;
use super::policy::MutabilityRules;
use super::templates::NoteTemplates;
use crate::io::{NoteStore, RecordSource};
use crate::models::{ExistingNote, Record, RecordKind, note_filename};
use crate::rendering::sanitize_filename;
use crate::{Error, Result};

/// Why a record produces no write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The matched note already reflects the record.
    Unchanged,
    /// An earlier record in the batch has the same unique key.
    DuplicateKey,
}

impl SkipReason {
    /// Returns the reason as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::DuplicateKey => "duplicate key",
        }
    }
}

/// The write a record will cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlannedAction {
    /// Write a new note.
    Create {
        /// File name including extension.
        filename: String,
        /// Full note content.
        content: String,
    },
    /// Overwrite a matched note.
    Update {
        /// File name including extension.
        filename: String,
        /// Full merged content.
        content: String,
    },
    /// Write nothing.
    Skip {
        /// Why nothing is written.
        reason: SkipReason,
        /// The matched note, if any.
        filename: Option<String>,
    },
}

/// One record's entry in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedRecord {
    /// Title of the record.
    pub title: String,
    /// What will happen.
    #[serde(flatten)]
    pub action: PlannedAction,
}

/// The outcome of the validation phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    /// Planned actions in record order.
    pub records: Vec<PlannedRecord>,
    /// Records that could not be planned.
    pub failures: Vec<RecordFailure>,
}

impl SyncPlan {
    /// Number of notes the plan creates.
    #[must_use]
    pub fn creates(&self) -> usize {
        self.count(|action| matches!(action, PlannedAction::Create { .. }))
    }

    /// Number of notes the plan updates.
    #[must_use]
    pub fn updates(&self) -> usize {
        self.count(|action| matches!(action, PlannedAction::Update { .. }))
    }

    /// Number of records the plan skips.
    #[must_use]
    pub fn skips(&self) -> usize {
        self.count(|action| matches!(action, PlannedAction::Skip { .. }))
    }

    fn count(&self, predicate: impl Fn(&PlannedAction) -> bool) -> usize {
        self.records.iter().filter(|r| predicate(&r.action)).count()
    }
}

/// A record that failed, keyed by its title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    /// Title of the record.
    pub title: String,
    /// What went wrong.
    pub message: String,
}

impl fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// Result of a sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    /// Notes created.
    pub created: usize,
    /// Notes updated.
    pub updated: usize,
    /// Records that caused no write.
    pub skipped: usize,
    /// Per-record failures.
    pub errors: Vec<RecordFailure>,
    /// Terminal failure of the record source, if reading stopped early.
    pub failure: Option<String>,
}

impl SyncSummary {
    /// Whether every record was processed without error.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.failure.is_none()
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created {}, updated {}, skipped {}, failed {}",
            self.created,
            self.updated,
            self.skipped,
            self.errors.len()
        )?;
        if let Some(failure) = &self.failure {
            write!(f, " (stopped early: {failure})")?;
        }
        Ok(())
    }
}

/// Syncs records of one kind into a note folder.
///
/// # Example
///
/// ```rust
/// use reelsync::io::MemoryNoteStore;
/// use reelsync::models::{DiaryEntry, RecordKind};
/// use reelsync::services::reconcile::{MutabilityRules, NoteTemplates, SyncService};
///
/// let templates = NoteTemplates::new("{{title}}", "---\nid: {{guid}}\ntitle: {{title}}\n---\n");
/// let service = SyncService::new(RecordKind::Diary, templates, MutabilityRules::new());
/// let store = MemoryNoteStore::new();
///
/// let entries = vec![DiaryEntry::new("Heat", "g1")];
/// let summary = service.sync(entries.clone().into_iter(), &store)?;
/// assert_eq!(summary.created, 1);
///
/// let again = service.sync(entries.into_iter(), &store)?;
/// assert_eq!((again.created, again.updated, again.skipped), (0, 0, 1));
/// # Ok::<(), reelsync::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SyncService {
    kind: RecordKind,
    templates: NoteTemplates,
    rules: MutabilityRules,
    merger: MergeEngine,
}

impl SyncService {
    /// Creates a sync service for one record kind.
    #[must_use]
    pub fn new(kind: RecordKind, templates: NoteTemplates, rules: MutabilityRules) -> Self {
        Self {
            kind,
            templates,
            rules,
            merger: MergeEngine::new(),
        }
    }

    /// The record kind this service syncs.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        self.kind
    }

    /// The templates notes are rendered from.
    #[must_use]
    pub const fn templates(&self) -> &NoteTemplates {
        &self.templates
    }

    /// Validates a batch and computes every write.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousBatch`] listing every record that matches
    /// more than one note. No partial plan is returned in that case.
    #[instrument(
        skip(self, records, notes),
        fields(kind = %self.kind, records = records.len(), notes = notes.len())
    )]
    pub fn plan<R: Record>(&self, records: &[R], notes: &[ExistingNote]) -> Result<SyncPlan> {
        let matcher = EntryMatcher::new(notes, &self.templates);

        // 1. Match everything before deciding anything
        let mut matches = Vec::with_capacity(records.len());
        let mut conflicts = Vec::new();
        for record in records {
            match matcher.find_match(record) {
                Ok(found) => matches.push(found),
                Err(Error::AmbiguousMatch(conflict)) => conflicts.push(conflict),
                Err(e) => return Err(e),
            }
        }
        if !conflicts.is_empty() {
            warn!(conflicts = conflicts.len(), "Batch has ambiguous records");
            return Err(Error::AmbiguousBatch(conflicts));
        }

        // 2. Compute writes in record order
        let mut plan = SyncPlan::default();
        let mut claimed_keys = HashSet::new();
        let mut taken_names: HashSet<String> =
            notes.iter().map(|note| note.filename.to_lowercase()).collect();
        let mut pending: HashMap<&str, String> = HashMap::new();

        for (record, found) in records.iter().zip(matches) {
            let title = record.title().to_string();
            if record.kind() != self.kind {
                plan.failures.push(RecordFailure {
                    title,
                    message: format!("expected a {} record, got {}", self.kind, record.kind()),
                });
                continue;
            }
            if let Some(key) = record.unique_key()
                && !claimed_keys.insert(key)
            {
                debug!(title = %title, "Duplicate key in batch");
                plan.records.push(PlannedRecord {
                    title,
                    action: PlannedAction::Skip {
                        reason: SkipReason::DuplicateKey,
                        filename: found.map(|note| note.filename.clone()),
                    },
                });
                continue;
            }

            let action = match found {
                Some(note) => {
                    let base = pending
                        .get(note.filename.as_str())
                        .map_or(note.content.as_str(), String::as_str);
                    let merged = match self.merger.merge(base, record, &self.templates, &self.rules)
                    {
                        Cow::Borrowed(_) => None,
                        Cow::Owned(content) => Some(content),
                    };
                    match merged {
                        Some(content) => {
                            pending.insert(note.filename.as_str(), content.clone());
                            PlannedAction::Update {
                                filename: note.filename.clone(),
                                content,
                            }
                        },
                        None => PlannedAction::Skip {
                            reason: SkipReason::Unchanged,
                            filename: Some(note.filename.clone()),
                        },
                    }
                },
                None => {
                    let rendered = self.merger.render_note(record, &self.templates);
                    let stem = if rendered.stem.is_empty() {
                        record
                            .unique_key()
                            .map(|key| sanitize_filename(&key))
                            .unwrap_or_default()
                    } else {
                        rendered.stem
                    };
                    if stem.is_empty() {
                        plan.failures.push(RecordFailure {
                            title,
                            message: "rendered file name is empty".to_string(),
                        });
                        continue;
                    }
                    PlannedAction::Create {
                        filename: claim_filename(&stem, &mut taken_names),
                        content: rendered.content,
                    }
                },
            };
            plan.records.push(PlannedRecord { title, action });
        }

        debug!(
            creates = plan.creates(),
            updates = plan.updates(),
            skips = plan.skips(),
            failures = plan.failures.len(),
            "Planned batch"
        );
        Ok(plan)
    }

    /// Performs the writes of a plan.
    ///
    /// Write failures are collected per record; they never stop the pass
    /// and never undo earlier writes.
    #[instrument(skip(self, plan, store), fields(kind = %self.kind, records = plan.records.len()))]
    pub fn apply<S: NoteStore + ?Sized>(&self, plan: SyncPlan, store: &S) -> SyncSummary {
        let mut summary = SyncSummary {
            errors: plan.failures,
            ..SyncSummary::default()
        };

        for PlannedRecord { title, action } in plan.records {
            let written = match &action {
                PlannedAction::Create { filename, content } => store.create(filename, content),
                PlannedAction::Update { filename, content } => store.update(filename, content),
                PlannedAction::Skip { .. } => {
                    summary.skipped += 1;
                    continue;
                },
            };
            match (written, action) {
                (Ok(()), PlannedAction::Create { filename, .. }) => {
                    info!(title = %title, filename = %filename, "Created note");
                    summary.created += 1;
                },
                (Ok(()), _) => {
                    debug!(title = %title, "Updated note");
                    summary.updated += 1;
                },
                (Err(e), _) => {
                    warn!(title = %title, error = %e, "Failed to write note");
                    summary.errors.push(RecordFailure {
                        title,
                        message: e.to_string(),
                    });
                },
            }
        }

        self.record_metrics(&summary);
        summary
    }

    /// Reads every record from `source`, then plans and applies the batch.
    ///
    /// If the source fails part way, the records read so far are still
    /// synced and the failure is reported in [`SyncSummary::failure`].
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be listed or the batch is
    /// ambiguous. Nothing is written in either case.
    #[instrument(skip(self, source, store), fields(kind = %self.kind))]
    pub fn sync<I, S>(&self, mut source: I, store: &S) -> Result<SyncSummary>
    where
        I: RecordSource,
        S: NoteStore + ?Sized,
    {
        let notes = store.list()?;

        let mut records = Vec::with_capacity(source.size_hint().unwrap_or_default());
        let mut failure = None;
        loop {
            match source.next_record() {
                Ok(Some(record)) => records.push(record),
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, read = records.len(), "Record source failed");
                    failure = Some(e.to_string());
                    break;
                },
            }
        }

        let plan = self.plan(&records, &notes)?;
        let mut summary = self.apply(plan, store);
        summary.failure = failure;

        info!(summary = %summary, "Sync finished");
        Ok(summary)
    }

    fn record_metrics(&self, summary: &SyncSummary) {
        for (outcome, count) in [
            ("created", summary.created),
            ("updated", summary.updated),
            ("skipped", summary.skipped),
            ("failed", summary.errors.len()),
        ] {
            metrics::counter!(
                "reelsync_notes_total",
                "kind" => self.kind.as_str(),
                "outcome" => outcome
            )
            .increment(count as u64);
        }
    }
}

/// Reserves a file name for a new note, appending ` (2)`, ` (3)`, ... when
/// the name is already taken. Comparison is case-insensitive.
fn claim_filename(stem: &str, taken: &mut HashSet<String>) -> String {
    let mut candidate = note_filename(stem);
    let mut n = 2;
    while taken.contains(&candidate.to_lowercase()) {
        candidate = note_filename(&format!("{stem} ({n})"));
        n += 1;
    }
    taken.insert(candidate.to_lowercase());
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryNoteStore;
    use crate::models::{DiaryEntry, MovieMetadata};

    fn service() -> SyncService {
        let templates = NoteTemplates::new(
            "{{title}}",
            "---\nletterboxd_guid: {{guid}}\ntitle: {{title yaml=true}}\nrewatch: {{rewatch}}\n---\n# {{title}}\n",
        )
        .with_identifier_key("letterboxd_guid");
        SyncService::new(RecordKind::Diary, templates, MutabilityRules::new())
    }

    #[test]
    fn test_plan_create_then_skip() {
        let records = vec![DiaryEntry::new("Heat", "g1")];
        let plan = service().plan(&records, &[]).unwrap();
        assert_eq!(plan.creates(), 1);
        let PlannedAction::Create { filename, content } = &plan.records[0].action else {
            panic!("expected create");
        };
        assert_eq!(filename, "Heat.md");

        let notes = vec![ExistingNote::new(filename.clone(), content.clone())];
        let plan = service().plan(&records, &notes).unwrap();
        assert_eq!(plan.skips(), 1);
        assert_eq!(plan.creates() + plan.updates(), 0);
    }

    #[test]
    fn test_duplicate_key_skipped() {
        let records = vec![DiaryEntry::new("Heat", "g1"), DiaryEntry::new("Heat", "g1")];
        let plan = service().plan(&records, &[]).unwrap();
        assert_eq!(plan.creates(), 1);
        assert!(matches!(
            plan.records[1].action,
            PlannedAction::Skip { reason: SkipReason::DuplicateKey, .. }
        ));
    }

    #[test]
    fn test_filename_collisions_get_suffix() {
        let records = vec![
            DiaryEntry::new("Heat", "g1"),
            DiaryEntry::new("Heat", "g2"),
            DiaryEntry::new("heat", "g3"),
        ];
        let notes = vec![ExistingNote::new("Heat.md", "no frontmatter")];
        let plan = service().plan(&records, &notes).unwrap();
        let names: Vec<&str> = plan
            .records
            .iter()
            .filter_map(|r| match &r.action {
                PlannedAction::Create { filename, .. } => Some(filename.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["Heat (2).md", "Heat (3).md", "heat (4).md"]);
    }

    #[test]
    fn test_second_update_builds_on_first() {
        let notes = vec![ExistingNote::new(
            "Heat.md",
            "---\nletterboxd_guid:\ntitle: \"Heat\"\nrewatch: false\n---\nbody\n",
        )];
        // The note has no identifier yet, so both keys match it by file name and title
        let records = vec![
            DiaryEntry::new("Heat", "g1").with_rewatch(true),
            DiaryEntry::new("Heat", "g9").with_rewatch(true),
        ];
        let templates = NoteTemplates::new("{{title}}", "---\nrewatch: {{rewatch}}\ntitle: {{title}}\n---\n")
            .with_identifier_key("letterboxd_guid");
        let service = SyncService::new(RecordKind::Diary, templates, MutabilityRules::new());
        let plan = service.plan(&records, &notes).unwrap();
        assert_eq!(plan.updates(), 1);
        assert_eq!(plan.skips(), 1);
    }

    #[test]
    fn test_ambiguous_batch_writes_nothing() {
        let notes = vec![
            ExistingNote::new("Heat.md", "---\nletterboxd_guid: g1\ntitle: Heat\n---\n"),
            ExistingNote::new("Heat copy.md", "---\nletterboxd_guid: g1\ntitle: Heat\n---\n"),
        ];
        let store = MemoryNoteStore::with_notes(notes);
        let records = vec![DiaryEntry::new("Alien", "g2"), DiaryEntry::new("Heat", "g1")];

        match service().sync(records.into_iter(), &store) {
            Err(Error::AmbiguousBatch(conflicts)) => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].filenames, vec!["Heat copy.md", "Heat.md"]);
            },
            other => panic!("expected ambiguity, got {other:?}"),
        }
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_wrong_kind_is_a_record_failure() {
        let plan = service().plan(&[MovieMetadata::new(1, "Heat")], &[]).unwrap();
        assert!(plan.records.is_empty());
        assert_eq!(plan.failures.len(), 1);
        assert_eq!(plan.failures[0].title, "Heat");
    }

    #[test]
    fn test_apply_collects_write_failures() {
        let store = MemoryNoteStore::with_notes([ExistingNote::new("Taken.md", "x")]);
        let plan = SyncPlan {
            records: vec![
                PlannedRecord {
                    title: "A".to_string(),
                    action: PlannedAction::Create {
                        filename: "Taken.md".to_string(),
                        content: "a".to_string(),
                    },
                },
                PlannedRecord {
                    title: "B".to_string(),
                    action: PlannedAction::Create {
                        filename: "B.md".to_string(),
                        content: "b".to_string(),
                    },
                },
            ],
            failures: Vec::new(),
        };
        let summary = service().apply(plan, &store);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].title, "A");
        assert_eq!(store.get("B.md").as_deref(), Some("b"));
    }

    #[test]
    fn test_summary_display() {
        let summary = SyncSummary {
            created: 2,
            updated: 1,
            skipped: 3,
            errors: Vec::new(),
            failure: Some("bad row".to_string()),
        };
        assert_eq!(
            summary.to_string(),
            "created 2, updated 1, skipped 3, failed 0 (stopped early: bad row)"
        );
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_claim_filename() {
        let mut taken = HashSet::new();
        assert_eq!(claim_filename("Heat", &mut taken), "Heat.md");
        assert_eq!(claim_filename("HEAT", &mut taken), "HEAT (2).md");
    }
}
