//! Content types
//!
//! Vocabulary, grammar rules, exercise templates and reading texts as they
//! appear in the JSON catalogs. Older field spellings (`translation_ru`,
//! `example_pt`, `explanation_ru`, `pt`/`ru`, `q`/`a`) are accepted as aliases.

use serde::{Deserialize, Deserializer, Serialize};

use crate::exercise::ExerciseKind;

// ============================================================================
// VOCABULARY
// ============================================================================

/// One word with its translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyItem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Source-language word
    #[serde(default)]
    pub word: String,
    /// Target-language translation
    #[serde(default, alias = "translation_ru")]
    pub translation: String,
    /// Example sentence
    #[serde(default, alias = "example_pt")]
    pub example: Option<String>,
    /// Topic and unit tags, normalized on load
    #[serde(default)]
    pub tags: Vec<String>,
}

impl VocabularyItem {
    /// Both sides of the pair are present
    pub fn is_complete(&self) -> bool {
        !self.word.trim().is_empty() && !self.translation.trim().is_empty()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

// ============================================================================
// GRAMMAR
// ============================================================================

/// Source/target sentence pair illustrating a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamplePair {
    #[serde(default, alias = "pt")]
    pub source: String,
    #[serde(default, alias = "ru")]
    pub target: String,
}

/// A grammar rule with examples and optional embedded templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarRule {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "explanation_ru")]
    pub explanation: String,
    #[serde(default)]
    pub examples: Vec<ExamplePair>,
    #[serde(default)]
    pub templates: Vec<Template>,
}

// ============================================================================
// TEMPLATES
// ============================================================================

/// Built-in value categories for placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticCategory {
    /// manhã / tarde / noite
    TimeOfDay,
    /// 1..=12
    Numbers,
}

impl SemanticCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticCategory::TimeOfDay => "time",
            SemanticCategory::Numbers => "numbers",
        }
    }

    pub fn parse_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "time" | "time_of_day" => Some(SemanticCategory::TimeOfDay),
            "numbers" | "number" => Some(SemanticCategory::Numbers),
            _ => None,
        }
    }
}

/// Where a placeholder draws its value from
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSource {
    /// Pick one of these values
    Literal(Vec<String>),
    Category(SemanticCategory),
    /// A random vocabulary word, optionally restricted to these tags
    Vocabulary { tags: Vec<String> },
    /// Unrecognized source; the template cannot be filled
    Unknown(String),
}

/// Named slot in a dynamic template pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPlaceholder", into = "RawPlaceholder")]
pub struct Placeholder {
    /// Literal text replaced in the pattern, e.g. `{time}`
    pub placeholder: String,
    pub source: ValueSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawPlaceholder {
    #[serde(default)]
    placeholder: String,
    #[serde(default)]
    from: serde_json::Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
}

impl From<RawPlaceholder> for Placeholder {
    fn from(raw: RawPlaceholder) -> Self {
        let source = match raw.from {
            serde_json::Value::Array(values) => {
                ValueSource::Literal(values.iter().filter_map(scalar_to_string).collect())
            }
            serde_json::Value::String(name) if name.eq_ignore_ascii_case("vocabulary") => {
                ValueSource::Vocabulary {
                    tags: raw.tags.iter().map(|t| normalize_key(t)).collect(),
                }
            }
            serde_json::Value::String(name) => match SemanticCategory::parse_name(&name) {
                Some(category) => ValueSource::Category(category),
                None => ValueSource::Unknown(name),
            },
            other => ValueSource::Unknown(other.to_string()),
        };

        Placeholder {
            placeholder: raw.placeholder,
            source,
        }
    }
}

impl From<Placeholder> for RawPlaceholder {
    fn from(p: Placeholder) -> Self {
        let (from, tags) = match p.source {
            ValueSource::Literal(values) => (serde_json::json!(values), Vec::new()),
            ValueSource::Category(category) => (serde_json::json!(category.as_str()), Vec::new()),
            ValueSource::Vocabulary { tags } => (serde_json::json!("vocabulary"), tags),
            ValueSource::Unknown(name) => (serde_json::json!(name), Vec::new()),
        };
        RawPlaceholder {
            placeholder: p.placeholder,
            from,
            tags,
        }
    }
}

/// Question text of a template
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateShape {
    /// Fixed question text
    Static { question: String },
    /// Pattern whose placeholders are filled per exercise
    Dynamic {
        pattern: String,
        placeholders: Vec<Placeholder>,
    },
}

/// Exercise template
///
/// Templates are loaded leniently: a template with an unknown type or no
/// question text still loads and is rejected at synthesis time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTemplate", into = "RawTemplate")]
pub struct Template {
    /// Declared type string as written in the catalog
    pub declared_type: String,
    /// Parsed type; `match` is accepted for matching
    pub kind: Option<ExerciseKind>,
    pub shape: Option<TemplateShape>,
    pub correct: Option<String>,
    pub correct_logic: Option<String>,
    pub hint: Option<String>,
    /// Explicit answer options
    pub options: Option<Vec<String>>,
    pub distractors: Vec<String>,
    pub transform_type: Option<String>,
    pub tags: Vec<String>,
}

impl Template {
    /// Placeholders of a dynamic template, empty otherwise
    pub fn placeholders(&self) -> &[Placeholder] {
        match &self.shape {
            Some(TemplateShape::Dynamic { placeholders, .. }) => placeholders,
            _ => &[],
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.shape, Some(TemplateShape::Dynamic { .. }))
    }

    /// Pattern or static question text
    pub fn text(&self) -> Option<&str> {
        match &self.shape {
            Some(TemplateShape::Static { question }) => Some(question),
            Some(TemplateShape::Dynamic { pattern, .. }) => Some(pattern),
            None => None,
        }
    }

    /// Whether the pattern, logic or declared type mentions `title`
    pub fn mentions(&self, title: &str) -> bool {
        let needle = title.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        let pattern_hit = match &self.shape {
            Some(TemplateShape::Dynamic { pattern, .. }) => pattern.to_lowercase().contains(&needle),
            _ => false,
        };
        pattern_hit
            || self
                .correct_logic
                .as_ref()
                .is_some_and(|l| l.to_lowercase().contains(&needle))
            || self.declared_type.to_lowercase().contains(&needle)
    }

    /// Whether a vocabulary placeholder is restricted to any of `tags`
    pub fn references_tags(&self, mut has_tag: impl FnMut(&str) -> bool) -> bool {
        self.placeholders().iter().any(|p| match &p.source {
            ValueSource::Vocabulary { tags } => tags.iter().any(|t| has_tag(t)),
            _ => false,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawTemplate {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    params: Vec<Placeholder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    distractors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    correct: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    correct_logic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transform_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
}

impl From<RawTemplate> for Template {
    fn from(raw: RawTemplate) -> Self {
        let shape = match (non_empty(raw.base), non_empty(raw.template)) {
            (Some(pattern), _) => Some(TemplateShape::Dynamic {
                pattern,
                placeholders: raw.params,
            }),
            (None, Some(question)) => Some(TemplateShape::Static { question }),
            (None, None) => None,
        };

        Template {
            kind: ExerciseKind::parse_name(&raw.kind),
            declared_type: raw.kind,
            shape,
            correct: non_empty(raw.correct),
            correct_logic: non_empty(raw.correct_logic),
            hint: non_empty(raw.hint),
            options: raw.options,
            distractors: raw.distractors,
            transform_type: non_empty(raw.transform_type),
            tags: raw.tags.iter().map(|t| normalize_key(t)).collect(),
        }
    }
}

impl From<Template> for RawTemplate {
    fn from(t: Template) -> Self {
        let mut raw = RawTemplate {
            kind: t.declared_type,
            options: t.options,
            distractors: t.distractors,
            correct: t.correct,
            correct_logic: t.correct_logic,
            hint: t.hint,
            transform_type: t.transform_type,
            tags: t.tags,
            ..Default::default()
        };
        match t.shape {
            Some(TemplateShape::Static { question }) => raw.template = Some(question),
            Some(TemplateShape::Dynamic {
                pattern,
                placeholders,
            }) => {
                raw.base = Some(pattern);
                raw.params = placeholders;
            }
            None => {}
        }
        raw
    }
}

// ============================================================================
// TEXTS
// ============================================================================

/// Comprehension question embedded in a text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextQuestion {
    /// `multiple_choice`, anything else is treated as short answer
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default, alias = "q")]
    pub question: String,
    #[serde(default, alias = "a")]
    pub answer: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

/// Reading text with comprehension questions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextEntry {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "content")]
    pub text: String,
    #[serde(default)]
    pub questions: Vec<TextQuestion>,
}

// ============================================================================
// HELPERS
// ============================================================================

/// Trimmed lowercase form used for tags and unit ids
pub fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Ids appear as strings or bare numbers in the catalogs
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}
