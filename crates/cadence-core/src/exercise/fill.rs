//! Placeholder substitution for dynamic templates.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::content::{Placeholder, SemanticCategory, Template, TemplateShape, ValueSource, VocabularyItem};

/// Values of the time-of-day category
pub(crate) const TIMES_OF_DAY: [&str; 3] = ["manhã", "tarde", "noite"];

/// Inclusive range of the numbers category
pub(crate) const NUMBER_RANGE: std::ops::RangeInclusive<u32> = 1..=12;

/// Number words for the numbers category, indexed by value - 1
pub(crate) const NUMBER_WORDS: [&str; 12] = [
    "um", "dois", "três", "quatro", "cinco", "seis", "sete", "oito", "nove", "dez", "onze", "doze",
];

/// A template's question text with its placeholders filled in
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Filled {
    pub question: String,
    /// Chosen value per placeholder, in declaration order
    pub values: Vec<(Placeholder, String)>,
}

impl Filled {
    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(|(_, v)| v.as_str())
    }

    /// Value chosen for the first numbers placeholder
    pub fn number(&self) -> Option<u32> {
        self.values.iter().find_map(|(p, v)| match p.source {
            ValueSource::Category(SemanticCategory::Numbers) => v.parse().ok(),
            _ => None,
        })
    }
}

/// Fill every placeholder of `template`
///
/// Returns `None` when the template has no text, a placeholder is blank, a
/// source is unknown, or a source has no candidate values. Each placeholder
/// replaces its first occurrence in the pattern.
pub(crate) fn fill_template<R: Rng + ?Sized>(
    template: &Template,
    vocabulary: &[VocabularyItem],
    rng: &mut R,
) -> Option<Filled> {
    let (pattern, placeholders) = match template.shape.as_ref()? {
        TemplateShape::Static { question } => {
            return Some(Filled {
                question: question.clone(),
                values: Vec::new(),
            });
        }
        TemplateShape::Dynamic {
            pattern,
            placeholders,
        } => (pattern, placeholders),
    };

    let mut question = pattern.clone();
    let mut values = Vec::with_capacity(placeholders.len());

    for placeholder in placeholders {
        if placeholder.placeholder.is_empty() {
            tracing::debug!(template = %template.declared_type, "Blank placeholder");
            return None;
        }
        let value = pick_value(&placeholder.source, vocabulary, rng)?;
        question = question.replacen(&placeholder.placeholder, &value, 1);
        values.push((placeholder.clone(), value));
    }

    Some(Filled { question, values })
}

fn pick_value<R: Rng + ?Sized>(
    source: &ValueSource,
    vocabulary: &[VocabularyItem],
    rng: &mut R,
) -> Option<String> {
    match source {
        ValueSource::Literal(values) => values.choose(rng).cloned(),
        ValueSource::Category(SemanticCategory::TimeOfDay) => {
            TIMES_OF_DAY.choose(rng).map(|s| s.to_string())
        }
        ValueSource::Category(SemanticCategory::Numbers) => {
            Some(rng.gen_range(NUMBER_RANGE).to_string())
        }
        ValueSource::Vocabulary { tags } => {
            let candidates: Vec<&VocabularyItem> = vocabulary
                .iter()
                .filter(|v| !v.word.trim().is_empty())
                .filter(|v| tags.is_empty() || tags.iter().any(|t| v.has_tag(t)))
                .collect();
            candidates.choose(rng).map(|v| v.word.clone())
        }
        ValueSource::Unknown(name) => {
            tracing::debug!(source = %name, "Unknown placeholder source");
            None
        }
    }
}

/// Spelled-out form of a value from the numbers category
pub(crate) fn number_word(value: u32) -> Option<&'static str> {
    NUMBER_RANGE
        .contains(&value)
        .then(|| NUMBER_WORDS[(value - 1) as usize])
}
