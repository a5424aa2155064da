//! # Cadence Core
//!
//! Adaptive study-sprint engine for vocabulary and grammar practice.
//!
//! - **Interval Table**: fixed geometric sequence of review intervals (×2.5 per level)
//! - **SRS Engine**: all-or-nothing leveling (correct → level + 1, wrong → level 0)
//! - **Readiness Analysis**: buckets every unit item into not-started / in-progress /
//!   practiced / mastered and counts what is due
//! - **Phase-Based Distribution**: initial → consolidation → maintenance → review,
//!   each with its own new:review ratio
//! - **Error-Prone Detection**: mines sprint history for items failed ≥ 30% of the time
//! - **Sprint Planning**: one ordered item list out of the three analyses above
//! - **Exercise Synthesis**: template instantiation with layered answer-derivation
//!   fallbacks, validation, and deduplication
//! - **Sprint Scoring**: accuracy, letter grade, pace, and feedback
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cadence_core::prelude::*;
//! use chrono::Utc;
//!
//! let catalog = Catalog::load("data/").await?;
//! let storage = Storage::new(None)?;
//! let mut learner = LearnerState::load(&storage)?;
//!
//! let unit = learner.current_unit().to_string();
//! let vocab = catalog.vocabulary_by_unit(&unit);
//! let mut rng = rand::thread_rng();
//!
//! let plan = SprintPlanner::default().plan(&vocab, &learner, 10, &[], Utc::now(), &mut rng);
//! let exercises = Synthesizer::default().synthesize(
//!     &SynthesisInput::unfocused(&vocab, &catalog.templates),
//!     10,
//!     &mut rng,
//! );
//!
//! learner.record_answer(&storage, "v1", true, Utc::now())?;
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod config;
pub mod content;
pub mod exercise;
pub mod planning;
pub mod scoring;
pub mod srs;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Configuration
pub use config::CadenceConfig;

// Content catalogs
pub use content::{
    Catalog, ContentError, ExamplePair, GrammarRule, Placeholder, SemanticCategory, Template,
    TemplateShape, TextEntry, TextQuestion, UnitSummary, ValueSource, VocabularyItem,
};

// Spaced repetition
pub use srs::{
    apply_answer, days_until_next_review, generate_intervals, is_due, learning_stats,
    level_histogram, mix_items_for_sprint, IntervalTable, LearningStats, ProgressLookup,
    ProgressRecord, ReviewOutcome, SrsEngine, DEFAULT_LEVELS, FALLBACK_INTERVAL_DAYS,
};

// Planning
pub use planning::{
    analyze_unit_readiness, determine_optimal_distribution, error_prone_details,
    identify_error_prone_items, recommend, Distribution, ErrorProneItem, ItemStatus,
    LearningPhase, PlanMetadata, PlanStatistics, ReadinessDetail, SelectionStrategy,
    SprintPlan, SprintPlanner, StudyRecommendation, UnitReadiness,
};

// Exercise synthesis
pub use exercise::{
    annotate_with_grammar, comprehension_exercises, find_relevant_grammar, AnswerResolver,
    AnswerStrategy, Exercise, ExerciseKind, ExerciseOutcome, ExercisePayload, GrammarLink,
    MatchPair, SynthesisInput, Synthesizer, TextLink, TranslationDirection,
};

// Scoring
pub use scoring::{
    analyze_exercise_types, feedback, format_sprint_result, score, Grade, SprintFeedback,
    SprintResult, SprintStats, TypeStats,
};

// Storage layer
pub use storage::{
    sprint_statistics, LearnerState, ProgressStore, Result, SprintStatistics, Storage,
    StorageError, UnitStats,
};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        CadenceConfig, Catalog, Exercise, ExerciseKind, ExerciseOutcome, LearnerState,
        ProgressRecord, ProgressStore, SelectionStrategy, SprintPlan, SprintPlanner,
        SprintResult, SprintStats, SrsEngine, Storage, StorageError, SynthesisInput,
        Synthesizer, VocabularyItem,
    };
}
