//! Content catalog
//!
//! The four catalogs loaded together and queried by unit.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::model::{normalize_key, GrammarRule, Template, TextEntry, VocabularyItem};
use super::ContentError;
use crate::srs::ProgressLookup;

pub const VOCABULARY_FILE: &str = "vocabulary.json";
pub const GRAMMAR_FILE: &str = "grammar.json";
pub const TEMPLATES_FILE: &str = "templates.json";
pub const TEXTS_FILE: &str = "texts.json";

/// Default number of new words offered by [`Catalog::sprint_materials`]
pub const DEFAULT_NEW_MATERIALS: usize = 5;

static UNIT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^unit\d+$").expect("unit tag pattern is valid"));
static UNIT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)unit(\d+)").expect("unit number pattern is valid"));

// ============================================================================
// FILE SHAPES
// ============================================================================

#[derive(Deserialize)]
struct VocabularyFile {
    #[serde(default)]
    vocabulary: Vec<VocabularyItem>,
}

#[derive(Deserialize)]
struct GrammarFile {
    #[serde(default)]
    grammar: Vec<GrammarRule>,
}

#[derive(Deserialize)]
struct TemplatesFile {
    #[serde(default)]
    templates: Vec<Template>,
}

#[derive(Deserialize)]
struct TextsFile {
    #[serde(default)]
    texts: Vec<TextEntry>,
}

// ============================================================================
// QUERY RESULTS
// ============================================================================

/// Per-unit content counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSummary {
    pub id: String,
    pub grammar_count: usize,
    pub vocab_count: usize,
    pub text_count: usize,
}

/// Counts reported alongside [`SprintMaterials`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialStats {
    pub due_for_review: usize,
    pub new_items: usize,
    pub total_in_unit: usize,
}

/// Content selected for one sprint of a unit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintMaterials {
    pub vocabulary: Vec<VocabularyItem>,
    pub grammar: Vec<GrammarRule>,
    pub templates: Vec<Template>,
    pub texts: Vec<TextEntry>,
    pub stats: MaterialStats,
}

// ============================================================================
// CATALOG
// ============================================================================

/// Read-only content repository
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub vocabulary: Vec<VocabularyItem>,
    pub grammar: Vec<GrammarRule>,
    pub templates: Vec<Template>,
    pub texts: Vec<TextEntry>,
}

impl Catalog {
    /// Load `vocabulary.json`, `grammar.json`, `templates.json` and
    /// `texts.json` from `dir`, reading all four concurrently
    pub async fn load(dir: impl AsRef<Path>) -> Result<Self, ContentError> {
        let dir = dir.as_ref();

        let (vocabulary, grammar, templates, texts) = tokio::try_join!(
            read_catalog::<VocabularyFile>(dir.join(VOCABULARY_FILE)),
            read_catalog::<GrammarFile>(dir.join(GRAMMAR_FILE)),
            read_catalog::<TemplatesFile>(dir.join(TEMPLATES_FILE)),
            read_catalog::<TextsFile>(dir.join(TEXTS_FILE)),
        )?;

        let catalog = Self::from_parts(
            vocabulary.vocabulary,
            grammar.grammar,
            templates.templates,
            texts.texts,
        );

        tracing::info!(
            "Loaded content from {}: {} words, {} rules, {} templates, {} texts",
            dir.display(),
            catalog.vocabulary.len(),
            catalog.grammar.len(),
            catalog.templates.len(),
            catalog.texts.len()
        );

        Ok(catalog)
    }

    /// Build a catalog from already-parsed entries, normalizing tags and units
    pub fn from_parts(
        vocabulary: Vec<VocabularyItem>,
        grammar: Vec<GrammarRule>,
        templates: Vec<Template>,
        texts: Vec<TextEntry>,
    ) -> Self {
        let vocabulary = vocabulary
            .into_iter()
            .map(|mut item| {
                item.tags = normalize_tags(&item.tags);
                item
            })
            .collect();
        let grammar = grammar
            .into_iter()
            .map(|mut rule| {
                rule.unit = normalize_key(&rule.unit);
                rule
            })
            .collect();
        let texts = texts
            .into_iter()
            .map(|mut text| {
                text.unit = normalize_key(&text.unit);
                text
            })
            .collect();

        Self {
            vocabulary,
            grammar,
            templates,
            texts,
        }
    }

    // ------------------------------------------------------------------------
    // Unit queries
    // ------------------------------------------------------------------------

    /// Vocabulary tagged with `unit`
    pub fn vocabulary_by_unit(&self, unit: &str) -> Vec<VocabularyItem> {
        let unit = normalize_key(unit);
        self.vocabulary
            .iter()
            .filter(|v| v.has_tag(&unit))
            .cloned()
            .collect()
    }

    pub fn grammar_by_unit(&self, unit: &str) -> Vec<GrammarRule> {
        let unit = normalize_key(unit);
        self.grammar.iter().filter(|g| g.unit == unit).cloned().collect()
    }

    pub fn texts_by_unit(&self, unit: &str) -> Vec<TextEntry> {
        let unit = normalize_key(unit);
        self.texts.iter().filter(|t| t.unit == unit).cloned().collect()
    }

    /// Templates carrying any of `tags`
    pub fn templates_by_tags(&self, tags: &[&str]) -> Vec<Template> {
        let wanted: Vec<String> = tags.iter().map(|t| normalize_key(t)).collect();
        self.templates
            .iter()
            .filter(|t| t.tags.iter().any(|tag| wanted.contains(tag)))
            .cloned()
            .collect()
    }

    pub fn vocabulary_by_id(&self, id: &str) -> Option<&VocabularyItem> {
        self.vocabulary.iter().find(|v| v.id == id)
    }

    pub fn grammar_by_id(&self, id: &str) -> Option<&GrammarRule> {
        self.grammar.iter().find(|g| g.id == id)
    }

    pub fn text_by_id(&self, id: &str) -> Option<&TextEntry> {
        self.texts.iter().find(|t| t.id == id)
    }

    /// Every unit referenced by the content, ordered by unit number then id.
    ///
    /// Grammar units and `unitN` vocabulary tags define units; texts are only
    /// counted toward units that already exist.
    pub fn units(&self) -> Vec<UnitSummary> {
        let mut units: BTreeMap<String, UnitSummary> = BTreeMap::new();

        for rule in &self.grammar {
            unit_entry(&mut units, &rule.unit).grammar_count += 1;
        }
        for item in &self.vocabulary {
            for tag in item.tags.iter().filter(|t| UNIT_TAG.is_match(t)) {
                unit_entry(&mut units, tag).vocab_count += 1;
            }
        }
        for text in &self.texts {
            if let Some(unit) = units.get_mut(&text.unit) {
                unit.text_count += 1;
            }
        }

        let mut ordered: Vec<UnitSummary> = units.into_values().collect();
        ordered.sort_by(|a, b| {
            unit_number(&a.id)
                .cmp(&unit_number(&b.id))
                .then_with(|| a.id.cmp(&b.id))
        });
        ordered
    }

    /// Due and new vocabulary for a unit plus its grammar, templates and texts.
    ///
    /// Falls back to the whole unit vocabulary when nothing is due or new, and
    /// to the full template set when no template is tagged with the unit.
    pub fn sprint_materials<L: ProgressLookup>(
        &self,
        unit: &str,
        progress: &L,
        new_count: usize,
        now: DateTime<Utc>,
    ) -> SprintMaterials {
        let unit_vocab = self.vocabulary_by_unit(unit);

        let review: Vec<VocabularyItem> = unit_vocab
            .iter()
            .filter(|v| progress.progress(&v.id).is_some_and(|p| p.is_due(now)))
            .cloned()
            .collect();
        let review_ids: HashSet<&str> = review.iter().map(|v| v.id.as_str()).collect();

        let fresh: Vec<VocabularyItem> = unit_vocab
            .iter()
            .filter(|v| !review_ids.contains(v.id.as_str()))
            .filter(|v| progress.progress(&v.id).is_none_or(|p| p.level == 0))
            .take(new_count)
            .cloned()
            .collect();

        let stats = MaterialStats {
            due_for_review: review.len(),
            new_items: fresh.len(),
            total_in_unit: unit_vocab.len(),
        };

        let mut vocabulary = review;
        vocabulary.extend(fresh);
        if vocabulary.is_empty() {
            vocabulary = unit_vocab;
        }

        let mut templates = self.templates_by_tags(&[unit]);
        if templates.is_empty() {
            templates = self.templates.clone();
        }

        SprintMaterials {
            vocabulary,
            grammar: self.grammar_by_unit(unit),
            templates,
            texts: self.texts_by_unit(unit),
            stats,
        }
    }
}

async fn read_catalog<T: DeserializeOwned>(path: PathBuf) -> Result<T, ContentError> {
    let bytes = tokio::fs::read(&path).await.map_err(|source| ContentError::Read {
        resource: path.clone(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ContentError::Parse {
        resource: path,
        source,
    })
}

fn unit_entry<'m>(units: &'m mut BTreeMap<String, UnitSummary>, id: &str) -> &'m mut UnitSummary {
    units.entry(id.to_string()).or_insert_with(|| UnitSummary {
        id: id.to_string(),
        grammar_count: 0,
        vocab_count: 0,
        text_count: 0,
    })
}

fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|t| normalize_key(t))
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}

fn unit_number(id: &str) -> u64 {
    UNIT_NUMBER
        .captures(id)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(u64::MAX)
}
