//! Template rendering engine.
//!
//! Turns a [`Record`](crate::models::Record) and a template string into note
//! text or a file name. The grammar has exactly three token shapes:
//!
//! ```text
//! {{identifier}}
//! {{identifier key="val" key2=true}}
//! {{#if identifier}}...{{/if}}
//! ```

mod formatter;
mod params;
mod template_renderer;

pub use formatter::{apply_affixes, format_value, wiki_link, yaml_quote};
pub use params::ModifierParams;
pub use template_renderer::{TemplateRenderer, referenced_variables, sanitize_filename};
