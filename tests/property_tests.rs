//! Property-based tests for rendering and merging.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Merging is idempotent
//! - The note body is never touched
//! - Immutable fields keep their value once written
//! - Absent values are always filled
//! - Rendered file names are always safe
//! - Plain variables render their values verbatim

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use reelsync::models::{DiaryEntry, Rating};
use reelsync::rendering::TemplateRenderer;
use reelsync::services::reconcile::{FieldClass, MergeEngine, MutabilityRules, NoteTemplates};

const BODY_TEMPLATE: &str =
    "---\nid: {{guid}}\ntitle: {{title yaml=true}}\nrating: {{rating}}\ntags: {{tags yaml=true}}\n---\n# {{title}}\n";

const FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

fn templates() -> NoteTemplates {
    NoteTemplates::new("{{title}}", BODY_TEMPLATE)
}

fn rules() -> MutabilityRules {
    MutabilityRules::new().with_class("guid", FieldClass::Immutable)
}

fn rating() -> impl Strategy<Value = Option<Rating>> {
    proptest::option::of((1u8..=10).prop_map(|n| Rating::new(f64::from(n) / 2.0).unwrap()))
}

fn entry() -> impl Strategy<Value = DiaryEntry> {
    (
        "[A-Za-z][A-Za-z0-9 ]{0,20}",
        "[a-z0-9]{1,12}",
        rating(),
        proptest::option::of(prop::collection::vec("[a-z]{1,8}", 0..4)),
    )
        .prop_map(|(title, guid, rating, tags)| {
            let mut entry = DiaryEntry::new(title, guid);
            entry.rating = rating;
            entry.tags = tags;
            entry
        })
}

fn existing_value() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("null".to_string()),
        Just("~".to_string()),
        Just("[]".to_string()),
        "[A-Za-z0-9 ]{1,12}",
    ]
}

fn note(guid: &str, title: &str, rating: &str, tags: &str, body: &str) -> String {
    let line = |key: &str, value: &str| {
        if value.is_empty() {
            format!("{key}:\n")
        } else {
            format!("{key}: {value}\n")
        }
    };
    format!(
        "---\n{}{}{}{}---\n{body}",
        line("id", guid),
        line("title", title),
        line("rating", rating),
        line("tags", tags),
    )
}

proptest! {
    /// Property: merging the same record twice changes nothing the second time.
    #[test]
    fn prop_merge_is_idempotent(
        record in entry(),
        guid in existing_value(),
        title in existing_value(),
        rating in existing_value(),
        tags in existing_value(),
        body in "[a-zA-Z0-9 #\n]{0,200}",
    ) {
        let engine = MergeEngine::new();
        let existing = note(&guid, &title, &rating, &tags, &body);

        let once = engine.merge(&existing, &record, &templates(), &rules()).into_owned();
        let twice = engine.merge(&once, &record, &templates(), &rules());
        prop_assert_eq!(twice.as_ref(), once.as_str());
    }

    /// Property: everything after the frontmatter block survives verbatim.
    #[test]
    fn prop_merge_preserves_body(
        record in entry(),
        rating in existing_value(),
        tags in existing_value(),
        body in "[a-zA-Z0-9 #\n]{0,200}",
    ) {
        let existing = note("old", "\"Old\"", &rating, &tags, &body);
        let merged = MergeEngine::new().merge(&existing, &record, &templates(), &rules());

        let expected_tail = format!("\n---\n{body}");
        prop_assert!(merged.ends_with(&expected_tail));
    }

    /// Property: a present immutable value is never rewritten.
    #[test]
    fn prop_immutable_field_kept(record in entry(), guid in "g[a-z0-9]{0,11}") {
        let existing = note(&guid, "\"Old\"", "3", "[]", "body\n");
        let merged = MergeEngine::new().merge(&existing, &record, &templates(), &rules());

        let expected_line = format!("\nid: {guid}\n");
        prop_assert!(merged.contains(&expected_line));
    }

    /// Property: an absent value is always replaced by the rendered one.
    #[test]
    fn prop_absent_value_filled(
        record in entry(),
        absent in prop::sample::select(vec!["", "~", "null"]),
    ) {
        let existing = note("id1", "\"Old\"", "3", absent, "body\n");
        let merged = MergeEngine::new().merge(&existing, &record, &templates(), &rules());

        let rendered = TemplateRenderer::new().render("tags: {{tags yaml=true}}", &record);
        let expected_line = format!("\n{rendered}\n");
        prop_assert!(merged.contains(&expected_line));
    }

    /// Property: file names never carry forbidden characters or loose ends.
    #[test]
    fn prop_filename_is_sanitized(title in "\\PC{0,40}", guid in "\\PC{0,10}") {
        let record = DiaryEntry::new(title, guid);
        let name = TemplateRenderer::new().render_filename("{{title}} {{guid}}", &record);

        prop_assert!(!name.contains(FORBIDDEN));
        prop_assert!(!name.starts_with('.') && !name.ends_with('.'));
        prop_assert!(!name.starts_with(char::is_whitespace));
        prop_assert!(!name.ends_with(char::is_whitespace));
    }

    /// Property: plain variables reproduce text values verbatim.
    #[test]
    fn prop_plain_variables_round_trip(title in "[^{}]{0,30}", guid in "[^{}]{0,30}") {
        let record = DiaryEntry::new(title.clone(), guid.clone());
        let text = TemplateRenderer::new().render("[{{title}}] <{{guid}}>", &record);

        prop_assert_eq!(text, format!("[{title}] <{guid}>"));
    }
}
