//! Per-type exercise builders
//!
//! Each builder returns `None` instead of a partial exercise.

use std::collections::HashSet;
use std::sync::LazyLock;

use rand::Rng;
use rand::seq::SliceRandom;
use regex::Regex;

use super::answer::{mapping_pairs, AnswerContext, AnswerResolver};
use super::fill::{fill_template, number_word, Filled};
use super::types::{Exercise, ExercisePayload, MatchPair, TranslationDirection};
use crate::content::{Template, VocabularyItem};

/// Pairs shown in one matching exercise
pub const MAX_MATCH_PAIRS: usize = 5;

/// Options kept from a generated conjugation set
const CONJUGATION_OPTIONS: usize = 4;

/// Verb distractors added next to the correct answer
const VERB_DISTRACTORS: usize = 3;

/// Present-tense endings of regular `-ar` verbs, first singular first
const CONJUGATION_ENDINGS: [&str; 5] = ["o", "as", "a", "amos", "am"];

static VERB_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)verb").expect("verb tag pattern is valid"));

// ============================================================================
// TRANSLATION
// ============================================================================

/// Translation in a random direction; `None` for incomplete items
pub fn translation_exercise<R: Rng + ?Sized>(item: &VocabularyItem, rng: &mut R) -> Option<Exercise> {
    if !item.is_complete() {
        return None;
    }

    let (direction, question, correct) = if rng.gen_bool(0.5) {
        (TranslationDirection::SourceToTarget, &item.word, &item.translation)
    } else {
        (TranslationDirection::TargetToSource, &item.translation, &item.word)
    };

    let mut exercise = Exercise::new(
        ExercisePayload::Translation {
            question: question.clone(),
            direction,
        },
        correct.clone(),
        rng,
    );
    exercise.hint = item.example.clone().filter(|e| !e.trim().is_empty());
    exercise.item_id = Some(item.id.clone());
    Some(exercise)
}

// ============================================================================
// TEMPLATE-BASED
// ============================================================================

fn resolve_correct(template: &Template, filled: &Filled, resolver: &AnswerResolver) -> Option<String> {
    if let Some(correct) = &template.correct {
        return Some(correct.clone());
    }
    let logic = template.correct_logic.as_deref()?;
    resolver.resolve(&AnswerContext {
        logic,
        substituted: filled.first_value(),
        dynamic: template.is_dynamic(),
    })
}

fn template_hint(template: &Template) -> Option<String> {
    template.hint.clone().or_else(|| template.correct_logic.clone())
}

/// Fill-in-the-blank from a static or dynamic template
pub fn fill_blank_exercise<R: Rng + ?Sized>(
    template: &Template,
    vocabulary: &[VocabularyItem],
    resolver: &AnswerResolver,
    rng: &mut R,
) -> Option<Exercise> {
    let filled = fill_template(template, vocabulary, rng)?;
    let correct = resolve_correct(template, &filled, resolver)?;

    let mut exercise = Exercise::new(
        ExercisePayload::FillBlank {
            question: filled.question,
            distractors: template.distractors.clone(),
        },
        correct,
        rng,
    );
    exercise.hint = template_hint(template);
    Some(exercise)
}

/// Transformation; a numbers placeholder yields its number word as the answer
pub fn transform_exercise<R: Rng + ?Sized>(
    template: &Template,
    vocabulary: &[VocabularyItem],
    resolver: &AnswerResolver,
    rng: &mut R,
) -> Option<Exercise> {
    let filled = fill_template(template, vocabulary, rng)?;
    let correct = match &template.correct {
        Some(correct) => correct.clone(),
        None => match filled.number().and_then(number_word) {
            Some(word) => word.to_string(),
            None => resolve_correct(template, &filled, resolver)?,
        },
    };

    let mut exercise = Exercise::new(
        ExercisePayload::Transform {
            question: filled.question,
            transform_type: template.transform_type.clone(),
            distractors: template.distractors.clone(),
        },
        correct,
        rng,
    );
    exercise.hint = template_hint(template);
    Some(exercise)
}

/// Multiple choice with at least two distinct options including the answer
///
/// Options come from the first source that applies: explicit options (which
/// must contain the answer), the answer plus distractors, the values of the
/// template's mapping logic, conjugations of an `-o` answer, or verb-tagged
/// vocabulary.
pub fn multiple_choice_exercise<R: Rng + ?Sized>(
    template: &Template,
    vocabulary: &[VocabularyItem],
    resolver: &AnswerResolver,
    rng: &mut R,
) -> Option<Exercise> {
    let filled = fill_template(template, vocabulary, rng)?;
    let correct = resolve_correct(template, &filled, resolver)?;
    let mut options = choice_options(template, &correct, vocabulary, rng)?;

    let mut seen = HashSet::new();
    options.retain(|o| !o.trim().is_empty() && seen.insert(o.clone()));
    if options.len() < 2 || !options.contains(&correct) {
        tracing::debug!(template = %template.declared_type, "Not enough options");
        return None;
    }
    options.shuffle(rng);

    let mut exercise = Exercise::new(
        ExercisePayload::MultipleChoice {
            question: filled.question,
            options,
        },
        correct,
        rng,
    );
    exercise.hint = template_hint(template);
    Some(exercise)
}

fn choice_options<R: Rng + ?Sized>(
    template: &Template,
    correct: &str,
    vocabulary: &[VocabularyItem],
    rng: &mut R,
) -> Option<Vec<String>> {
    if let Some(options) = &template.options {
        return options.iter().any(|o| o == correct).then(|| options.clone());
    }

    if !template.distractors.is_empty() {
        let mut options = vec![correct.to_string()];
        options.extend(template.distractors.iter().cloned());
        return Some(options);
    }

    let logic = template.correct_logic.as_deref()?;

    let mapped: Vec<String> = mapping_pairs(logic).into_iter().map(|(_, v)| v).collect();
    if !mapped.is_empty() {
        return Some(mapped);
    }

    if let Some(forms) = conjugations(correct, rng) {
        return Some(forms);
    }

    let mut verbs: Vec<&VocabularyItem> = vocabulary
        .iter()
        .filter(|v| v.word != correct && !v.word.trim().is_empty())
        .filter(|v| v.tags.iter().any(|t| VERB_TAG.is_match(t)))
        .collect();
    if verbs.is_empty() {
        return None;
    }
    verbs.shuffle(rng);

    let mut options = vec![correct.to_string()];
    options.extend(verbs.into_iter().take(VERB_DISTRACTORS).map(|v| v.word.clone()));
    Some(options)
}

/// Present-tense forms of an answer ending in `-o`, always including it
fn conjugations<R: Rng + ?Sized>(correct: &str, rng: &mut R) -> Option<Vec<String>> {
    let root = correct.strip_suffix('o').filter(|r| !r.is_empty())?;

    let mut forms: Vec<String> = CONJUGATION_ENDINGS
        .iter()
        .map(|ending| format!("{root}{ending}"))
        .collect();
    forms.shuffle(rng);
    forms.truncate(CONJUGATION_OPTIONS);
    if !forms.iter().any(|f| f == correct) {
        forms[0] = correct.to_string();
    }
    Some(forms)
}

// ============================================================================
// MATCHING
// ============================================================================

/// Up to [`MAX_MATCH_PAIRS`] random complete items; needs at least two
pub fn matching_exercise<R: Rng + ?Sized>(vocabulary: &[VocabularyItem], rng: &mut R) -> Option<Exercise> {
    let mut pool: Vec<&VocabularyItem> = vocabulary.iter().filter(|v| v.is_complete()).collect();
    pool.shuffle(rng);
    pool.truncate(MAX_MATCH_PAIRS);
    if pool.len() < 2 {
        return None;
    }

    let pairs: Vec<MatchPair> = pool
        .iter()
        .map(|v| MatchPair {
            id: v.id.clone(),
            source: v.word.clone(),
            target: v.translation.clone(),
        })
        .collect();
    let correct = pairs
        .iter()
        .map(|p| format!("{} - {}", p.source, p.target))
        .collect::<Vec<_>>()
        .join(", ");
    let item_ids = pairs.iter().map(|p| p.id.clone()).collect();

    let mut exercise = Exercise::new(ExercisePayload::Matching { pairs }, correct, rng);
    exercise.item_ids = item_ids;
    Some(exercise)
}
