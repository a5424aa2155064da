//! Exercise Synthesis
//!
//! Turns vocabulary, templates, grammar rules and texts into typed,
//! validated, deduplicated exercises.
//!
//! Template instantiation never emits a half-built exercise: a template that
//! cannot produce a question, a correct answer, or (for multiple choice) two
//! distinct options including the answer is discarded and the next candidate
//! is tried.

mod answer;
mod comprehension;
mod fill;
mod generators;
mod grammar;
mod synthesizer;
mod types;

pub use answer::{
    AnswerContext, AnswerResolver, AnswerStrategy, ExplicitAssignment, MappingPairs,
    TokenAfterColon,
};
pub use comprehension::comprehension_exercises;
pub use generators::{
    fill_blank_exercise, matching_exercise, multiple_choice_exercise, transform_exercise,
    translation_exercise, MAX_MATCH_PAIRS,
};
pub use grammar::{annotate_with_grammar, find_relevant_grammar, related_vocabulary};
pub use synthesizer::{SynthesisInput, Synthesizer, TypeQuota, GREETING_POOL, TYPE_QUOTAS};
pub use types::{
    DedupKey, Exercise, ExerciseKind, ExerciseOutcome, ExercisePayload, GrammarLink, MatchPair,
    TextLink, TranslationDirection,
};
