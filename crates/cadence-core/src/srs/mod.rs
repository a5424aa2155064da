//! Spaced Repetition
//!
//! Level-based scheduling: a fixed geometric interval table and an
//! all-or-nothing leveling rule.
//!
//! - A correct answer moves an item one level up (capped at the last level)
//! - An incorrect answer sends it back to level 0
//! - The next review is `now + interval(level)` days
//!
//! Records only come into existence on a first *correct* answer; a wrong
//! first answer leaves the item untracked.

mod engine;
mod intervals;
mod mixer;

pub use engine::{
    apply_answer, days_until_next_review, is_due, items_ready_for_review, learning_stats,
    level_histogram, LearningStats, ProgressLookup, ProgressRecord, ReviewOutcome, SrsEngine,
    LEARNED_LEVEL,
};
pub(crate) use engine::percentage;
pub use intervals::{
    generate_intervals, IntervalTable, DEFAULT_LEVELS, FALLBACK_INTERVAL_DAYS,
    INTERVAL_MULTIPLIER,
};
pub use mixer::{mix_items_for_sprint, DEFAULT_REVIEW_SHARE};
