//! Line-preserving frontmatter model.
//!
//! Frontmatter is the block between a leading `---` line and the next `---`
//! line:
//!
//! ```text
//! ---
//! letterboxd_guid: letterboxd-review-42
//! title: "Heat"
//! tags:
//!   - "cinema"
//! ---
//! Everything from here on belongs to the user.
//! ```
//!
//! The block is parsed once into ordered entries, each a borrowed slice of
//! the original text. Entries can be replaced by key; serializing writes
//! untouched entries and the body back byte for byte.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// The frontmatter delimiter line.
pub const DELIMITER: &str = "---";

/// Regex pattern for a top-level `key:` line.
static KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_][A-Za-z0-9_ .-]*?)\s*:(?:\s|$)").unwrap_or_else(|_| unreachable!())
});

/// One entry of the frontmatter block.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry<'a> {
    /// Key, for `key: value` entries. Comments and blank lines have none.
    key: Option<&'a str>,
    /// Original text of the key line and its continuation lines.
    raw: &'a str,
    /// Replacement text, without a trailing line ending.
    replacement: Option<String>,
}

impl Entry<'_> {
    fn line_ending(&self) -> &'static str {
        if self.raw.ends_with("\r\n") {
            "\r\n"
        } else if self.raw.ends_with('\n') {
            "\n"
        } else {
            ""
        }
    }
}

/// A parsed note split into delimiters, frontmatter entries and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter<'a> {
    /// The opening delimiter line.
    opening: &'a str,
    entries: Vec<Entry<'a>>,
    /// The closing delimiter line and the body after it.
    rest: &'a str,
}

impl<'a> Frontmatter<'a> {
    /// Parses the frontmatter block at the start of `content`.
    ///
    /// Returns `None` when the content does not open with a delimiter line or
    /// the block is never closed.
    #[must_use]
    pub fn parse(content: &'a str) -> Option<Self> {
        let mut lines = content.split_inclusive('\n');
        let first = lines.next()?;
        if strip_line_ending(first) != DELIMITER {
            return None;
        }

        let block_start = first.len();
        let mut offset = block_start;
        let mut close = None;
        for line in lines {
            if strip_line_ending(line) == DELIMITER {
                close = Some(offset);
                break;
            }
            offset += line.len();
        }
        let close = close?;

        Some(Self {
            opening: &content[..block_start],
            entries: parse_entries(&content[block_start..close]),
            rest: &content[close..],
        })
    }

    /// Returns the value text of the first entry with `key`, trimmed.
    ///
    /// Multi-line values include their continuation lines.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.entry(key).map(|entry| value_of(entry.raw))
    }

    /// Returns the original text of the entry for `key`, without its final
    /// line ending.
    #[must_use]
    pub fn line(&self, key: &str) -> Option<&'a str> {
        self.entry(key).map(|entry| strip_line_ending(entry.raw))
    }

    /// Replaces the entry for `key` with `text`.
    ///
    /// `text` is the full entry (`key: value`, possibly spanning several
    /// lines) without a trailing line ending; the original ending is kept.
    /// Returns `false` if there is no such key.
    pub fn replace(&mut self, key: &str, text: impl Into<String>) -> bool {
        match self.entries.iter_mut().find(|entry| entry.key == Some(key)) {
            Some(entry) => {
                entry.replacement = Some(text.into());
                true
            },
            None => false,
        }
    }

    /// Returns the keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.iter().filter_map(|entry| entry.key)
    }

    /// Whether any entry has been replaced.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.entries.iter().any(|entry| entry.replacement.is_some())
    }

    /// Returns everything after the closing delimiter line.
    #[must_use]
    pub fn body(&self) -> &'a str {
        self.rest
            .split_once('\n')
            .map_or("", |(_, body)| body)
    }

    fn entry(&self, key: &str) -> Option<&Entry<'a>> {
        self.entries.iter().find(|entry| entry.key == Some(key))
    }
}

impl fmt::Display for Frontmatter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opening)?;
        for entry in &self.entries {
            match &entry.replacement {
                Some(text) => {
                    f.write_str(text)?;
                    f.write_str(entry.line_ending())?;
                },
                None => f.write_str(entry.raw)?,
            }
        }
        f.write_str(self.rest)
    }
}

/// Whether a frontmatter value means "not known yet": empty, `~` or `null`.
#[must_use]
pub fn is_absent(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed == "~" || trimmed.eq_ignore_ascii_case("null")
}

/// Reads a frontmatter value as plain text, unquoting YAML scalars.
///
/// Returns `None` for absent values. Values that are not YAML scalars come
/// back trimmed but otherwise as written.
#[must_use]
pub fn scalar_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if is_absent(trimmed) {
        return None;
    }
    let text = match serde_yaml_ng::from_str::<serde_yaml_ng::Value>(trimmed) {
        Ok(serde_yaml_ng::Value::String(s)) => s,
        Ok(serde_yaml_ng::Value::Number(n)) => n.to_string(),
        Ok(serde_yaml_ng::Value::Bool(b)) => b.to_string(),
        _ => trimmed.to_string(),
    };
    Some(text)
}

/// Splits an entry's text (`key: value` plus continuation lines) and
/// returns the value part.
pub(crate) fn value_of(raw: &str) -> &str {
    raw.split_once(':').map_or("", |(_, value)| value.trim())
}

/// Returns the key of a `key: value` line.
pub(crate) fn key_of(line: &str) -> Option<&str> {
    KEY_PATTERN
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

fn is_continuation(line: &str) -> bool {
    (line.starts_with([' ', '\t']) && !line.trim().is_empty())
        || strip_line_ending(line) == "-"
        || line.starts_with("- ")
}

fn parse_entries(block: &str) -> Vec<Entry<'_>> {
    let mut entries: Vec<Entry<'_>> = Vec::new();
    let mut offset = 0;
    for line in block.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        if let Some(key) = key_of(line) {
            entries.push(Entry {
                key: Some(key),
                raw: &block[start..offset],
                replacement: None,
            });
            continue;
        }

        match entries.last_mut() {
            Some(last) if last.key.is_some() && is_continuation(line) => {
                last.raw = &block[start - last.raw.len()..offset];
            },
            _ => entries.push(Entry {
                key: None,
                raw: &block[start..offset],
                replacement: None,
            }),
        }
    }
    entries
}
