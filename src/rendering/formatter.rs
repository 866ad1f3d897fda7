//! Value formatting for variable references.
//!
//! Formatting runs per value type and then applies `skipEmpty`, `prefix`
//! and `suffix`:
//!
//! | Type | Steps |
//! |------|-------|
//! | Text | `yaml` quoting and return, otherwise bold, italic, quote, link |
//! | List | `top`, link per item, then YAML (inline or bullet) or styled join |
//! | Number | shortest decimal form |
//! | Bool | `true` / `false` |
//! | Missing | `null` under `yaml`, otherwise empty |

use super::ModifierParams;
use crate::models::RawValue;

/// Formats a raw value with its modifiers.
///
/// # Example
///
/// ```rust
/// use reelsync::models::RawValue;
/// use reelsync::rendering::{ModifierParams, format_value};
///
/// let params = ModifierParams::parse(r#" prefix="Rating: " suffix="/5""#);
/// assert_eq!(format_value(&RawValue::Number(4.5), &params), "Rating: 4.5/5");
/// ```
#[must_use]
pub fn format_value(value: &RawValue, params: &ModifierParams) -> String {
    let formatted = match value {
        RawValue::Text(text) => format_text(text, params),
        RawValue::List(items) => format_list(items, params),
        RawValue::Number(n) => n.to_string(),
        RawValue::Bool(b) => b.to_string(),
        RawValue::Missing if params.yaml => "null".to_string(),
        RawValue::Missing => String::new(),
    };
    apply_affixes(formatted, value.is_empty(), params)
}

/// Applies `skipEmpty`, `prefix` and `suffix` to already formatted text.
///
/// `value_is_empty` reports emptiness of the underlying value; the text
/// itself being empty also counts.
#[must_use]
pub fn apply_affixes(formatted: String, value_is_empty: bool, params: &ModifierParams) -> String {
    if params.skip_empty && (value_is_empty || formatted.is_empty()) {
        return String::new();
    }
    match (&params.prefix, &params.suffix) {
        (None, None) => formatted,
        (prefix, suffix) => format!(
            "{}{formatted}{}",
            prefix.as_deref().unwrap_or_default(),
            suffix.as_deref().unwrap_or_default()
        ),
    }
}

/// Wraps text in double quotes, escaping embedded double quotes.
#[must_use]
pub fn yaml_quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\\\""))
}

/// Wraps text in `[[wiki link]]` brackets.
#[must_use]
pub fn wiki_link(text: &str) -> String {
    format!("[[{text}]]")
}

fn format_text(text: &str, params: &ModifierParams) -> String {
    if params.yaml {
        return yaml_quote(text);
    }
    let mut out = style(text.to_string(), params);
    if params.quote {
        out = out
            .split('\n')
            .map(|line| format!("> {line}"))
            .collect::<Vec<_>>()
            .join("\n");
    }
    if params.link {
        out = wiki_link(&out);
    }
    out
}

fn format_list(items: &[String], params: &ModifierParams) -> String {
    let limit = params.top.unwrap_or(items.len());
    let items: Vec<String> = items
        .iter()
        .take(limit)
        .map(|item| {
            if params.link {
                wiki_link(item)
            } else {
                item.clone()
            }
        })
        .collect();

    if params.yaml {
        if params.bullet && !items.is_empty() {
            return items
                .iter()
                .map(|item| format!("\n  - {}", yaml_quote(item)))
                .collect();
        }
        let quoted: Vec<String> = items.iter().map(|item| yaml_quote(item)).collect();
        return format!("[{}]", quoted.join(", "));
    }

    let styled = items.into_iter().map(|item| style(item, params));
    if params.bullet {
        styled
            .map(|item| format!("- {item}"))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        styled.collect::<Vec<_>>().join(", ")
    }
}

/// Bold first, then italic around the bold text.
fn style(mut text: String, params: &ModifierParams) -> String {
    if params.bold {
        text = format!("**{text}**");
    }
    if params.italic {
        text = format!("*{text}*");
    }
    text
}
