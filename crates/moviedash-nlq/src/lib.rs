//! moviedash natural-language query translation
//!
//! Maps a free-text sentence ("top 5 sci-fi movies") onto SQL over the
//! `movies` table using a fixed, ordered catalog of lexical patterns. There is
//! no language model and no scoring: the first pattern that matches wins.
//!
//! Captured words are interpolated into the SQL text as-is. Callers that run
//! the output against a real store own any sanitization.

mod catalog;
mod translate;

pub use catalog::{CatalogError, Intent, PatternCatalog, Producer, Rule};
pub use translate::{translate, Translation, Translator, DEFAULT_QUERY};
