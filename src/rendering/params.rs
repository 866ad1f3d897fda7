//! Modifier parameters attached to a variable reference.
//!
//! ```text
//! {{cast top=5 yaml=true link=true}}
//! {{rating prefix="Rating: " suffix="/5"}}
//! ```
//!
//! Tokens are space separated `key=value` or `key="quoted value"` pairs.
//! Unknown keys are accepted and ignored. Boolean keys are true only for the
//! literal text `true`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Regex pattern for one `key=value` or `key="quoted value"` token.
static PARAM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\w+)=(?:"([^"]*)"|(\S+))"#).unwrap_or_else(|_| unreachable!())
});

/// Parsed modifiers for one variable reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierParams {
    /// Keep only the first N list items.
    pub top: Option<usize>,
    /// Emit YAML-safe output.
    pub yaml: bool,
    /// Put each list item on its own `- ` line.
    pub bullet: bool,
    /// Prefix every line with `> `.
    pub quote: bool,
    /// Wrap in `**`.
    pub bold: bool,
    /// Wrap in `*`.
    pub italic: bool,
    /// Render nothing, not even prefix or suffix, when the value is empty.
    pub skip_empty: bool,
    /// Wrap values in `[[wiki links]]`.
    pub link: bool,
    /// Text placed before the value.
    pub prefix: Option<String>,
    /// Text placed after the value.
    pub suffix: Option<String>,
    /// Link actor names in paired cast lists.
    pub link_actors: bool,
    /// Link character names in paired cast lists.
    pub link_characters: bool,
}

impl ModifierParams {
    /// Parses the parameter text that follows a variable name.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let mut params = Self::default();
        for caps in PARAM_PATTERN.captures_iter(input) {
            let key = caps.get(1).map_or("", |m| m.as_str());
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map_or("", |m| m.as_str());
            params.set(key, value);
        }
        params
    }

    fn set(&mut self, key: &str, value: &str) {
        let flag = value == "true";
        match key {
            "top" => self.top = value.parse().ok(),
            "yaml" => self.yaml = flag,
            "bullet" => self.bullet = flag,
            "quote" => self.quote = flag,
            "bold" => self.bold = flag,
            "italic" => self.italic = flag,
            "skipEmpty" => self.skip_empty = flag,
            "link" => self.link = flag,
            "prefix" => self.prefix = Some(value.to_string()),
            "suffix" => self.suffix = Some(value.to_string()),
            "linkActors" => self.link_actors = flag,
            "linkCharacters" => self.link_characters = flag,
            _ => {}, // Unknown keys are ignored
        }
    }
}
