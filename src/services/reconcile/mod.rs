//! Reconciliation of incoming records with existing notes.
//!
//! This module decides, for every record of a batch, whether it creates a
//! note, updates one, or changes nothing:
//! 1. **Matching**: identifier first, then file name plus title
//! 2. **Merging**: per-entry frontmatter patches under mutability rules
//! 3. **Batching**: validate the whole batch, then write
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                         SyncService                            │
//! │  ┌──────────────┐  ┌──────────────┐  ┌───────────────────────┐ │
//! │  │ EntryMatcher │  │ MergeEngine  │  │ MutabilityRules       │ │
//! │  │              │  │              │  │                       │ │
//! │  │ identifier + │  │ Frontmatter  │  │ immutable / mutable   │ │
//! │  │ filename     │  │ line patches │  │ absent always filled  │ │
//! │  └──────────────┘  └──────────────┘  └───────────────────────┘ │
//! └────────────────────────────────────────────────────────────────┘
//! ```

mod frontmatter;
mod hasher;
mod matcher;
mod merge;
mod policy;
mod service;
mod templates;

pub use frontmatter::{DELIMITER, Frontmatter, is_absent, scalar_text};
pub use hasher::{IdentifierHasher, SYNTHETIC_PREFIX};
pub use matcher::{EntryMatcher, normalize_title};
pub use merge::{MergeEngine, RenderedNote};
pub use policy::{FieldClass, MutabilityRules};
pub use service::{
    PlannedAction, PlannedRecord, RecordFailure, SkipReason, SyncPlan, SyncService, SyncSummary,
};
pub use templates::{NoteTemplates, TemplateField};
