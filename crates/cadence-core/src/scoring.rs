//! Sprint Scoring
//!
//! Aggregates the answers of a finished sprint into statistics, a letter
//! grade and feedback, and packages them as a [`SprintResult`] for history.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::exercise::{ExerciseKind, ExerciseOutcome};
use crate::srs::percentage;

/// Accuracy below which a sprint should be repeated
pub const REPEAT_BELOW: u32 = 70;

// ============================================================================
// GRADE
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    #[default]
    F,
}

impl Grade {
    /// ≥90 A, ≥80 B, ≥70 C, ≥60 D, else F
    pub fn from_accuracy(accuracy: u32) -> Self {
        match accuracy {
            90.. => Grade::A,
            80..=89 => Grade::B,
            70..=79 => Grade::C,
            60..=69 => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// STATS
// ============================================================================

/// Aggregate statistics of one sprint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintStats {
    pub total: u32,
    pub correct: u32,
    pub incorrect: u32,
    /// Percent correct, rounded
    pub accuracy: u32,
    pub grade: Grade,
    pub elapsed_seconds: u64,
    /// Whole minutes, rounded up
    pub minutes_taken: u64,
    /// One decimal; 0 when no time elapsed
    pub exercises_per_minute: f64,
    pub timestamp: DateTime<Utc>,
}

/// Score a sprint from its answers
pub fn score(answered: &[ExerciseOutcome], elapsed_seconds: u64, now: DateTime<Utc>) -> SprintStats {
    let total = answered.len() as u32;
    let correct = answered.iter().filter(|o| o.is_correct).count() as u32;
    let accuracy = percentage(correct, total);

    let minutes_taken = elapsed_seconds.div_ceil(60);
    let exercises_per_minute = if minutes_taken > 0 {
        (total as f64 / minutes_taken as f64 * 10.0).round() / 10.0
    } else {
        0.0
    };

    SprintStats {
        total,
        correct,
        incorrect: total - correct,
        accuracy,
        grade: Grade::from_accuracy(accuracy),
        elapsed_seconds,
        minutes_taken,
        exercises_per_minute,
        timestamp: now,
    }
}

// ============================================================================
// RESULT
// ============================================================================

/// A finished sprint as stored in history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintResult {
    pub id: String,
    pub unit_id: String,
    pub date: DateTime<Utc>,
    pub stats: SprintStats,
    pub exercise_results: Vec<ExerciseOutcome>,
}

impl SprintResult {
    /// Whether this sprint practiced a single grammar rule
    pub fn is_grammar_sprint(&self) -> bool {
        self.id.starts_with("grammar_")
    }
}

/// Package stats and outcomes for history
///
/// A sprint focused on one grammar rule is keyed `grammar_<unit>_<rule>` so
/// that repeating the rule replaces the earlier record. Every other sprint is
/// keyed by the stats timestamp in epoch milliseconds, even when its
/// exercises carry grammar annotations.
pub fn format_sprint_result(
    stats: SprintStats,
    unit_id: &str,
    focus: Option<&str>,
    outcomes: Vec<ExerciseOutcome>,
) -> SprintResult {
    let id = match focus.map(str::trim).filter(|g| !g.is_empty()) {
        Some(grammar_id) => format!("grammar_{unit_id}_{grammar_id}"),
        None => format!("sprint_{}", stats.timestamp.timestamp_millis()),
    };

    SprintResult {
        id,
        unit_id: unit_id.to_string(),
        date: stats.timestamp,
        stats,
        exercise_results: outcomes,
    }
}

// ============================================================================
// FEEDBACK
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintFeedback {
    pub message: String,
    pub recommendation: String,
    pub grade: Grade,
    pub should_repeat: bool,
}

pub fn feedback(stats: &SprintStats) -> SprintFeedback {
    let (message, recommendation) = match stats.accuracy {
        100 => (
            "Perfect! 100% correct",
            "Excellent result. You can move on to the next level.",
        ),
        80.. => (
            "Well done!",
            "Very good result. Go over the tricky spots once more.",
        ),
        60.. => (
            "Good start",
            "Not bad! A few areas need a little more work.",
        ),
        _ => (
            "Keep at it",
            "Don't be discouraged. Repetition is the mother of learning, try again.",
        ),
    };

    SprintFeedback {
        message: message.to_string(),
        recommendation: recommendation.to_string(),
        grade: stats.grade,
        should_repeat: stats.accuracy < REPEAT_BELOW,
    }
}

// ============================================================================
// PER-TYPE BREAKDOWN
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeStats {
    pub total: u32,
    pub correct: u32,
    pub accuracy: u32,
}

/// Totals and accuracy per exercise type
pub fn analyze_exercise_types(outcomes: &[ExerciseOutcome]) -> BTreeMap<ExerciseKind, TypeStats> {
    let mut by_kind: BTreeMap<ExerciseKind, TypeStats> = BTreeMap::new();
    for outcome in outcomes {
        let entry = by_kind.entry(outcome.kind).or_default();
        entry.total += 1;
        if outcome.is_correct {
            entry.correct += 1;
        }
    }
    for stats in by_kind.values_mut() {
        stats.accuracy = percentage(stats.correct, stats.total);
    }
    by_kind
}
