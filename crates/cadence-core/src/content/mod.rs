//! Content Repository
//!
//! Read-only study material:
//! - Vocabulary items (word, translation, example, tags)
//! - Grammar rules with example pairs and embedded templates
//! - Exercise templates, static or placeholder-driven
//! - Reading texts with comprehension questions
//!
//! Tags and unit ids are normalized to trimmed lowercase on load.

mod catalog;
mod model;

use std::path::PathBuf;

pub use catalog::{
    Catalog, MaterialStats, SprintMaterials, UnitSummary, DEFAULT_NEW_MATERIALS, GRAMMAR_FILE,
    TEMPLATES_FILE, TEXTS_FILE, VOCABULARY_FILE,
};
pub use model::{
    normalize_key, ExamplePair, GrammarRule, Placeholder, SemanticCategory, Template,
    TemplateShape, TextEntry, TextQuestion, ValueSource, VocabularyItem,
};

/// Content loading error
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Catalog file could not be read
    #[error("Failed to read {}: {source}", resource.display())]
    Read {
        resource: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Catalog file is not valid catalog JSON
    #[error("Failed to parse {}: {source}", resource.display())]
    Parse {
        resource: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
