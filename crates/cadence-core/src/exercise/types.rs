//! Exercise types

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::content::{ExamplePair, GrammarRule, TextEntry};

// ============================================================================
// KIND
// ============================================================================

/// Exercise type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Translation,
    MultipleChoice,
    FillBlank,
    #[serde(alias = "match")]
    Matching,
    Transform,
    /// Free-text answer, only produced from text comprehension questions
    ShortAnswer,
}

impl ExerciseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseKind::Translation => "translation",
            ExerciseKind::MultipleChoice => "multiple_choice",
            ExerciseKind::FillBlank => "fill_blank",
            ExerciseKind::Matching => "matching",
            ExerciseKind::Transform => "transform",
            ExerciseKind::ShortAnswer => "short_answer",
        }
    }

    pub fn parse_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            "translation" => Some(ExerciseKind::Translation),
            "multiple_choice" => Some(ExerciseKind::MultipleChoice),
            "fill_blank" => Some(ExerciseKind::FillBlank),
            "matching" | "match" => Some(ExerciseKind::Matching),
            "transform" => Some(ExerciseKind::Transform),
            "short_answer" => Some(ExerciseKind::ShortAnswer),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which side of a vocabulary pair is asked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationDirection {
    /// Word shown, translation expected
    SourceToTarget,
    /// Translation shown, word expected
    TargetToSource,
}

// ============================================================================
// PAYLOAD
// ============================================================================

/// One row of a matching exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// Type-specific question data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExercisePayload {
    Translation {
        question: String,
        direction: TranslationDirection,
    },
    MultipleChoice {
        question: String,
        options: Vec<String>,
    },
    FillBlank {
        question: String,
        #[serde(default)]
        distractors: Vec<String>,
    },
    Matching {
        pairs: Vec<MatchPair>,
    },
    Transform {
        question: String,
        #[serde(default)]
        transform_type: Option<String>,
        #[serde(default)]
        distractors: Vec<String>,
    },
    ShortAnswer {
        question: String,
    },
}

impl ExercisePayload {
    pub fn kind(&self) -> ExerciseKind {
        match self {
            ExercisePayload::Translation { .. } => ExerciseKind::Translation,
            ExercisePayload::MultipleChoice { .. } => ExerciseKind::MultipleChoice,
            ExercisePayload::FillBlank { .. } => ExerciseKind::FillBlank,
            ExercisePayload::Matching { .. } => ExerciseKind::Matching,
            ExercisePayload::Transform { .. } => ExerciseKind::Transform,
            ExercisePayload::ShortAnswer { .. } => ExerciseKind::ShortAnswer,
        }
    }
}

// ============================================================================
// LINKS
// ============================================================================

/// Grammar rule shown alongside an exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarLink {
    pub id: String,
    pub title: String,
    pub explanation: String,
    pub examples: Vec<ExamplePair>,
}

impl From<&GrammarRule> for GrammarLink {
    fn from(rule: &GrammarRule) -> Self {
        Self {
            id: rule.id.clone(),
            title: rule.title.clone(),
            explanation: rule.explanation.clone(),
            examples: rule.examples.clone(),
        }
    }
}

/// Source text of a comprehension question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLink {
    pub id: String,
    pub title: String,
    pub unit: String,
}

impl From<&TextEntry> for TextLink {
    fn from(text: &TextEntry) -> Self {
        Self {
            id: text.id.clone(),
            title: text.title.clone(),
            unit: text.unit.clone(),
        }
    }
}

// ============================================================================
// EXERCISE
// ============================================================================

/// Identity of an exercise for deduplication: type, question, answer, sorted options
pub type DedupKey = (ExerciseKind, String, String, Vec<String>);

/// A concrete, validated practice item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    #[serde(flatten)]
    pub payload: ExercisePayload,
    /// Expected answer; for matching, the pairs as `source - target` joined by `, `
    pub correct: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Vocabulary item fed back to the SRS engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    /// Vocabulary items shown in a matching exercise
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grammar: Option<GrammarLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextLink>,
}

impl Exercise {
    /// New exercise with a fresh id drawn from `rng`
    pub fn new<R: Rng + ?Sized>(payload: ExercisePayload, correct: impl Into<String>, rng: &mut R) -> Self {
        Self {
            id: new_exercise_id(rng),
            payload,
            correct: correct.into(),
            hint: None,
            item_id: None,
            item_ids: Vec::new(),
            grammar: None,
            text: None,
        }
    }

    pub fn kind(&self) -> ExerciseKind {
        self.payload.kind()
    }

    /// Question text; `None` for matching
    pub fn question(&self) -> Option<&str> {
        match &self.payload {
            ExercisePayload::Translation { question, .. }
            | ExercisePayload::MultipleChoice { question, .. }
            | ExercisePayload::FillBlank { question, .. }
            | ExercisePayload::Transform { question, .. }
            | ExercisePayload::ShortAnswer { question } => Some(question),
            ExercisePayload::Matching { .. } => None,
        }
    }

    pub fn options(&self) -> &[String] {
        match &self.payload {
            ExercisePayload::MultipleChoice { options, .. } => options,
            _ => &[],
        }
    }

    pub fn pairs(&self) -> &[MatchPair] {
        match &self.payload {
            ExercisePayload::Matching { pairs } => pairs,
            _ => &[],
        }
    }

    /// Structural validity for its type
    pub fn is_valid(&self) -> bool {
        match &self.payload {
            ExercisePayload::Matching { pairs } => pairs.len() >= 2,
            ExercisePayload::MultipleChoice { question, options } => {
                let mut distinct: Vec<&str> = options.iter().map(String::as_str).collect();
                distinct.sort_unstable();
                distinct.dedup();
                !question.trim().is_empty()
                    && !self.correct.trim().is_empty()
                    && distinct.len() >= 2
                    && options.iter().any(|o| o == &self.correct)
            }
            _ => {
                self.question().is_some_and(|q| !q.trim().is_empty()) && !self.correct.trim().is_empty()
            }
        }
    }

    pub fn dedup_key(&self) -> DedupKey {
        let mut options = self.options().to_vec();
        options.sort();
        let question = match &self.payload {
            ExercisePayload::Matching { pairs } => pairs
                .iter()
                .map(|p| p.id.as_str())
                .collect::<Vec<_>>()
                .join(","),
            _ => self.question().unwrap_or_default().to_string(),
        };
        (self.kind(), question, self.correct.clone(), options)
    }

    /// Whether this exercise practices vocabulary item `id`
    pub fn practices(&self, id: &str) -> bool {
        self.item_id.as_deref() == Some(id) || self.item_ids.iter().any(|i| i == id)
    }

    pub fn with_grammar(mut self, rule: &GrammarRule) -> Self {
        self.grammar = Some(GrammarLink::from(rule));
        self
    }

    /// Copy with a fresh id
    pub fn clone_with_new_id<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut copy = self.clone();
        copy.id = new_exercise_id(rng);
        copy
    }
}

/// `ex_` followed by a random 128-bit id from `rng`
pub(crate) fn new_exercise_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes[..]);
    format!("ex_{}", uuid::Builder::from_random_bytes(bytes).into_uuid().simple())
}

// ============================================================================
// OUTCOME
// ============================================================================

/// Answer reported by the session runner for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseOutcome {
    pub exercise_id: String,
    /// Linked vocabulary item, if the exercise feeds the SRS engine
    #[serde(default)]
    pub item_id: Option<String>,
    pub is_correct: bool,
    #[serde(rename = "type")]
    pub kind: ExerciseKind,
    pub timestamp: DateTime<Utc>,
    /// Full exercise as it was shown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Exercise>,
}

impl ExerciseOutcome {
    pub fn from_exercise(exercise: &Exercise, is_correct: bool, timestamp: DateTime<Utc>) -> Self {
        Self {
            exercise_id: exercise.id.clone(),
            item_id: exercise.item_id.clone(),
            is_correct,
            kind: exercise.kind(),
            timestamp,
            snapshot: Some(exercise.clone()),
        }
    }

    /// Grammar id of the snapshot, if any
    pub fn grammar_id(&self) -> Option<&str> {
        self.snapshot
            .as_ref()
            .and_then(|s| s.grammar.as_ref())
            .map(|g| g.id.as_str())
    }
}
