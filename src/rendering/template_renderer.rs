//! Template renderer implementation.
//!
//! Provides the rendering engine for note templates with:
//! - Conditional blocks (`{{#if variable}}...{{/if}}`), resolved first
//! - Variable substitution with modifiers (`{{variable key=value}}`)
//! - Filename sanitization
//!
//! A variable the record does not know is left in the output verbatim, so a
//! typo in a template shows up in the rendered note instead of vanishing.

use regex::Regex;
use std::sync::LazyLock;

use super::{ModifierParams, apply_affixes, format_value};
use crate::models::Record;

/// Regex pattern for conditional blocks: `{{#if name}}...{{/if}}`, non-greedy
/// and not nested.
static CONDITIONAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{#if\s+(\w+)\s*\}\}([\s\S]*?)\{\{/if\}\}").unwrap_or_else(|_| unreachable!())
});

/// Regex pattern for variable references: `{{name}}` or `{{name params}}`.
///
/// Quoted parameter values may contain `}`.
static VARIABLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\{(\w+)((?:\s+(?:[^"}]|"[^"]*")*)?)\}\}"#).unwrap_or_else(|_| unreachable!())
});

/// Regex pattern for any `{{...}}` token, used to build filename wildcards.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]*)\}\}").unwrap_or_else(|_| unreachable!()));

/// Characters that may not appear in a rendered file name.
const FORBIDDEN_FILENAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Template rendering engine.
#[derive(Debug, Clone, Default)]
pub struct TemplateRenderer {
    _private: (), // Prevent external construction, allow future fields
}

impl TemplateRenderer {
    /// Creates a new template renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders a template against a record.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reelsync::models::DiaryEntry;
    /// use reelsync::rendering::TemplateRenderer;
    ///
    /// let entry = DiaryEntry::new("Heat", "g1").with_rewatch(true);
    /// let renderer = TemplateRenderer::new();
    /// assert_eq!(
    ///     renderer.render("{{title}}{{#if rewatch}} (rewatch){{/if}} {{nope}}", &entry),
    ///     "Heat (rewatch) {{nope}}"
    /// );
    /// ```
    #[must_use]
    pub fn render<R: Record + ?Sized>(&self, template: &str, record: &R) -> String {
        // 1. Resolve conditionals; kept bodies are scanned by step 2
        let resolved = self.process_conditionals(template, record);

        // 2. Substitute variables, leaving unknown names untouched
        VARIABLE_PATTERN
            .replace_all(&resolved, |caps: &regex::Captures| {
                let name = caps.get(1).map_or("", |m| m.as_str());
                let params = ModifierParams::parse(caps.get(2).map_or("", |m| m.as_str()));
                self.render_variable(name, &params, record)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// Renders a file name: the rendered template with forbidden characters
    /// removed and surrounding whitespace and dots trimmed.
    #[must_use]
    pub fn render_filename<R: Record + ?Sized>(&self, template: &str, record: &R) -> String {
        sanitize_filename(&self.render(template, record))
    }

    /// Builds a regex that matches any file name the template could produce.
    ///
    /// Every variable becomes a non-greedy `(.+?)` group, conditional blocks
    /// become optional groups, and literal text is escaped. Matching ignores
    /// case, as file names do on common filesystems. Returns `None` when the
    /// template's conditionals are unbalanced.
    #[must_use]
    pub fn filename_wildcard(&self, template: &str) -> Option<Regex> {
        let mut pattern = String::from("(?i)^");
        let mut last = 0;
        for token in TOKEN_PATTERN.captures_iter(template) {
            let Some(whole) = token.get(0) else { continue };
            pattern.push_str(&regex::escape(&template[last..whole.start()]));
            let inner = token.get(1).map_or("", |m| m.as_str()).trim();
            if inner.starts_with("#if") {
                pattern.push_str("(?:");
            } else if inner == "/if" {
                pattern.push_str(")?");
            } else {
                pattern.push_str("(.+?)");
            }
            last = whole.end();
        }
        pattern.push_str(&regex::escape(&template[last..]));
        pattern.push('$');
        Regex::new(&pattern).ok()
    }

    fn process_conditionals<R: Record + ?Sized>(&self, template: &str, record: &R) -> String {
        CONDITIONAL_PATTERN
            .replace_all(template, |caps: &regex::Captures| {
                let name = caps.get(1).map_or("", |m| m.as_str());
                let body = caps.get(2).map_or("", |m| m.as_str());
                let keep = record.field(name).is_some_and(|value| value.is_truthy());
                if keep { body.to_string() } else { String::new() }
            })
            .into_owned()
    }

    #[allow(clippy::unused_self)]
    fn render_variable<R: Record + ?Sized>(
        &self,
        name: &str,
        params: &ModifierParams,
        record: &R,
    ) -> Option<String> {
        if let Some(text) = record.special(name, params) {
            let is_empty = text.is_empty();
            return Some(apply_affixes(text, is_empty, params));
        }
        record.field(name).map(|value| format_value(&value, params))
    }
}

/// Removes characters file systems reject, and control characters, then
/// trims whitespace and dots from both ends.
///
/// # Example
///
/// ```rust
/// use reelsync::rendering::sanitize_filename;
///
/// assert_eq!(sanitize_filename(" .Alien: Resurrection? ."), "Alien Resurrection");
/// ```
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !FORBIDDEN_FILENAME_CHARS.contains(c) && !c.is_control())
        .collect::<String>()
        .trim_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string()
}

/// Lists the variable names referenced by `{{name ...}}` placeholders, in
/// order of appearance. Conditional markers are not included.
#[must_use]
pub fn referenced_variables(text: &str) -> Vec<&str> {
    VARIABLE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CastMember, DiaryEntry, MovieMetadata, Rating};

    fn heat() -> DiaryEntry {
        DiaryEntry::new("Heat", "letterboxd-review-42")
            .with_year(1995)
            .with_rating(Rating::new(4.5).unwrap())
    }

    #[test]
    fn test_simple_variable_substitution() {
        let renderer = TemplateRenderer::new();
        assert_eq!(renderer.render("Hello {{title}}!", &heat()), "Hello Heat!");
    }

    #[test]
    fn test_number_with_modifiers() {
        let renderer = TemplateRenderer::new();
        assert_eq!(renderer.render("{{rating}}", &heat()), "4.5");
        assert_eq!(
            renderer.render(r#"{{rating prefix="Rating: " suffix="/5"}}"#, &heat()),
            "Rating: 4.5/5"
        );
    }

    #[test]
    fn test_quoted_param_may_contain_braces() {
        let renderer = TemplateRenderer::new();
        assert_eq!(
            renderer.render(r#"{{year prefix="{" suffix="}"}}"#, &heat()),
            "{1995}"
        );
    }

    #[test]
    fn test_unknown_variable_passes_through() {
        let renderer = TemplateRenderer::new();
        assert_eq!(
            renderer.render("{{director yaml=true}} / {{title}}", &heat()),
            "{{director yaml=true}} / Heat"
        );
    }

    #[test]
    fn test_conditional_on_bool() {
        let renderer = TemplateRenderer::new();
        let template = "{{#if rewatch}} (rewatch){{/if}}";
        assert_eq!(renderer.render(template, &heat()), "");
        assert_eq!(renderer.render(template, &heat().with_rewatch(true)), " (rewatch)");
    }

    #[test]
    fn test_conditional_on_unknown_name_is_dropped() {
        let renderer = TemplateRenderer::new();
        assert_eq!(renderer.render("a{{#if director}}b{{/if}}c", &heat()), "ac");
    }

    #[test]
    fn test_conditional_body_is_rendered_after_resolution() {
        let renderer = TemplateRenderer::new();
        let entry = heat().with_review("Tense.\nLong.");
        assert_eq!(
            renderer.render("{{#if review}}{{review quote=true}}{{/if}}", &entry),
            "> Tense.\n> Long."
        );
        assert_eq!(renderer.render("{{#if review}}{{review}}{{/if}}", &heat()), "");
    }

    #[test]
    fn test_conditionals_are_not_greedy() {
        let renderer = TemplateRenderer::new();
        let entry = heat().with_rewatch(true);
        assert_eq!(
            renderer.render("{{#if rewatch}}A{{/if}}-{{#if review}}B{{/if}}-{{#if year}}C{{/if}}", &entry),
            "A--C"
        );
    }

    #[test]
    fn test_special_handler_gets_affixes() {
        let renderer = TemplateRenderer::new();
        let mut movie = MovieMetadata::new(949, "Heat");
        movie.cast = vec![CastMember::new("Al Pacino", Some("Vincent Hanna"))];
        assert_eq!(
            renderer.render(r#"{{castWithRoles prefix="Cast: "}}"#, &movie),
            "Cast: Al Pacino as Vincent Hanna"
        );

        let empty = MovieMetadata::new(1, "Empty");
        assert_eq!(
            renderer.render(r#"{{castWithRoles skipEmpty=true prefix="Cast: "}}"#, &empty),
            ""
        );
    }

    #[test]
    fn test_render_filename_sanitizes() {
        let renderer = TemplateRenderer::new();
        let entry = DiaryEntry::new(r#" ..What? A "Film": <1/2> | \ * "#, "g");
        let name = renderer.render_filename("{{title}}", &entry);
        assert_eq!(name, "What A Film 12");
    }

    #[test]
    fn test_filename_wildcard() {
        let renderer = TemplateRenderer::new();
        let wildcard = renderer
            .filename_wildcard("{{title}} ({{year}}){{#if rewatch}} rewatch{{/if}}")
            .unwrap();
        assert!(wildcard.is_match("Heat (1995)"));
        assert!(wildcard.is_match("Heat (1995) rewatch"));
        assert!(!wildcard.is_match("Heat 1995"));
    }

    #[test]
    fn test_filename_wildcard_escapes_literals() {
        let renderer = TemplateRenderer::new();
        let wildcard = renderer.filename_wildcard("[{{year}}] {{title}}.").unwrap();
        assert!(wildcard.is_match("[1995] Heat."));
        assert!(!wildcard.is_match("x1995] Heat!"));
    }

    #[test]
    fn test_filename_wildcard_ignores_case() {
        let renderer = TemplateRenderer::new();
        let wildcard = renderer.filename_wildcard("Film - {{title}}").unwrap();
        assert!(wildcard.is_match("FILM - Heat"));
    }

    #[test]
    fn test_filename_wildcard_unbalanced_is_none() {
        let renderer = TemplateRenderer::new();
        assert!(renderer.filename_wildcard("{{#if rewatch}}{{title}}").is_none());
    }

    #[test]
    fn test_referenced_variables() {
        assert_eq!(
            referenced_variables("{{#if rewatch}}{{title bold=true}}{{/if}} {{year}}"),
            vec!["title", "year"]
        );
    }
}
