//! Sentence to SQL translation driver

use serde::Serialize;

use crate::catalog::{Intent, PatternCatalog};

/// Query returned when no pattern matches
pub const DEFAULT_QUERY: &str = "SELECT * FROM movies";

/// Result of translating one sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    /// Rule that produced the query, `Intent::Default` on fallback
    pub intent: Intent,
    pub sql: String,
}

impl Translation {
    pub fn is_default(&self) -> bool {
        self.intent == Intent::Default
    }
}

/// Evaluates a catalog against free text.
///
/// Holds only a shared reference to an immutable catalog, so one translator
/// can serve any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'c> {
    catalog: &'c PatternCatalog,
}

impl Default for Translator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator<'static> {
    /// Translator over the built-in movie catalog
    pub fn new() -> Self {
        Self {
            catalog: PatternCatalog::builtin(),
        }
    }
}

impl<'c> Translator<'c> {
    pub fn with_catalog(catalog: &'c PatternCatalog) -> Self {
        Self { catalog }
    }

    /// Translate `text` into SQL.
    ///
    /// Matching is case-insensitive because the text is lowercased first;
    /// captured words therefore reach the query in lowercase.
    pub fn translate(&self, text: &str) -> Translation {
        let lowered = text.to_lowercase();

        let translation = match self.catalog.first_match(&lowered) {
            Some((intent, sql)) => Translation { intent, sql },
            None => Translation {
                intent: Intent::Default,
                sql: DEFAULT_QUERY.to_string(),
            },
        };

        tracing::debug!(
            intent = %translation.intent,
            sql = %translation.sql,
            "Translated natural language query"
        );

        translation
    }
}

/// Translate with the built-in catalog
pub fn translate(text: &str) -> Translation {
    Translator::new().translate(text)
}
