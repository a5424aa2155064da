//! SRS Engine
//!
//! Per-item leveling state machine over an [`IntervalTable`].

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::intervals::IntervalTable;

/// Level at or above which an item counts as learned
pub const LEARNED_LEVEL: u8 = 3;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

// ============================================================================
// TYPES
// ============================================================================

/// Persisted scheduling state for one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub item_id: String,
    /// Current level, always within the interval table
    pub level: u8,
    /// When the item is next due
    pub next_review: DateTime<Utc>,
    pub last_review: DateTime<Utc>,
    /// Cumulative correct answers
    pub correct: u32,
    /// Cumulative incorrect answers
    pub incorrect: u32,
}

impl ProgressRecord {
    /// Record created by a first correct answer
    pub fn first_correct(item_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            item_id: item_id.into(),
            level: 0,
            next_review: now,
            last_review: now,
            correct: 1,
            incorrect: 0,
        }
    }

    /// Total answers recorded
    pub fn attempts(&self) -> u32 {
        self.correct + self.incorrect
    }

    /// Rounded accuracy percentage, 0 without attempts
    pub fn accuracy(&self) -> u32 {
        percentage(self.correct, self.attempts())
    }

    /// Whether the item is due at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        is_due(self.next_review, now)
    }
}

/// Result of advancing one item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub new_level: u8,
    pub days_to_next: f64,
    pub next_review: DateTime<Utc>,
}

/// Aggregates over a progress collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStats {
    /// Number of tracked items
    pub total_items: usize,
    /// Items at or above [`LEARNED_LEVEL`]
    pub total_learned: usize,
    pub total_attempts: u32,
    pub total_correct: u32,
    pub total_incorrect: u32,
    /// Mean level, one decimal
    pub average_level: f64,
    /// Rounded percentage
    pub accuracy: u32,
}

/// Read access to progress keyed by item id
pub trait ProgressLookup {
    fn progress(&self, item_id: &str) -> Option<&ProgressRecord>;
}

impl ProgressLookup for HashMap<String, ProgressRecord> {
    fn progress(&self, item_id: &str) -> Option<&ProgressRecord> {
        self.get(item_id)
    }
}

impl ProgressLookup for BTreeMap<String, ProgressRecord> {
    fn progress(&self, item_id: &str) -> Option<&ProgressRecord> {
        self.get(item_id)
    }
}

impl<T: ProgressLookup + ?Sized> ProgressLookup for &T {
    fn progress(&self, item_id: &str) -> Option<&ProgressRecord> {
        (**self).progress(item_id)
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// All-or-nothing leveling: correct → level + 1, incorrect → level 0
#[derive(Debug, Clone, Default)]
pub struct SrsEngine {
    table: IntervalTable,
}

impl SrsEngine {
    pub fn new(table: IntervalTable) -> Self {
        Self { table }
    }

    /// Engine over a table of `levels` entries
    pub fn with_levels(levels: usize) -> Self {
        Self::new(IntervalTable::new(levels))
    }

    pub fn table(&self) -> &IntervalTable {
        &self.table
    }

    pub fn max_level(&self) -> u8 {
        self.table.max_level()
    }

    /// Compute the next level and due instant
    pub fn advance(&self, current_level: u8, is_correct: bool, now: DateTime<Utc>) -> ReviewOutcome {
        let new_level = if is_correct {
            current_level.saturating_add(1).min(self.max_level())
        } else {
            0
        };

        let days_to_next = self.table.days_for(new_level as usize);

        ReviewOutcome {
            new_level,
            days_to_next,
            next_review: now + days_to_duration(days_to_next),
        }
    }

    /// Apply one answer to an item's progress.
    ///
    /// Returns the record to persist, or `None` when an untracked item is
    /// answered incorrectly (no record is created in that case).
    pub fn apply_answer(
        &self,
        existing: Option<&ProgressRecord>,
        item_id: &str,
        is_correct: bool,
        now: DateTime<Utc>,
    ) -> Option<ProgressRecord> {
        let Some(existing) = existing else {
            if !is_correct {
                tracing::debug!("First answer to {} was wrong, leaving it untracked", item_id);
                return None;
            }
            return Some(ProgressRecord::first_correct(item_id, now));
        };

        let outcome = self.advance(existing.level, is_correct, now);
        let mut updated = existing.clone();

        if is_correct {
            updated.correct += 1;
        } else {
            updated.incorrect += 1;
        }
        updated.level = outcome.new_level;
        updated.next_review = outcome.next_review;
        updated.last_review = now;

        Some(updated)
    }

    /// Interval for `level`, clamped to the last level
    pub fn days_until_next_review(&self, level: u8) -> f64 {
        self.table
            .days_for((level as usize).min(self.max_level() as usize))
    }

    /// Count of records per level, one slot per table level
    pub fn level_histogram<'a>(
        &self,
        records: impl IntoIterator<Item = &'a ProgressRecord>,
    ) -> Vec<usize> {
        let mut histogram = vec![0; self.table.len()];
        for record in records {
            if let Some(slot) = histogram.get_mut(record.level as usize) {
                *slot += 1;
            }
        }
        histogram
    }
}

// ============================================================================
// FREE FUNCTIONS (standard table)
// ============================================================================

/// Whether an item scheduled at `instant` is due at `now`
pub fn is_due(instant: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    instant <= now
}

/// [`SrsEngine::apply_answer`] over the standard table
pub fn apply_answer(
    existing: Option<&ProgressRecord>,
    item_id: &str,
    is_correct: bool,
    now: DateTime<Utc>,
) -> Option<ProgressRecord> {
    SrsEngine::default().apply_answer(existing, item_id, is_correct, now)
}

/// [`SrsEngine::days_until_next_review`] over the standard table
pub fn days_until_next_review(level: u8) -> f64 {
    SrsEngine::default().days_until_next_review(level)
}

/// [`SrsEngine::level_histogram`] over the standard table
pub fn level_histogram<'a>(records: impl IntoIterator<Item = &'a ProgressRecord>) -> Vec<usize> {
    SrsEngine::default().level_histogram(records)
}

/// Aggregate statistics over a progress collection
pub fn learning_stats<'a>(records: impl IntoIterator<Item = &'a ProgressRecord>) -> LearningStats {
    let mut stats = LearningStats::default();
    let mut level_sum: u64 = 0;

    for record in records {
        stats.total_items += 1;
        stats.total_correct += record.correct;
        stats.total_incorrect += record.incorrect;
        level_sum += record.level as u64;
        if record.level >= LEARNED_LEVEL {
            stats.total_learned += 1;
        }
    }

    if stats.total_items == 0 {
        return stats;
    }

    stats.total_attempts = stats.total_correct + stats.total_incorrect;
    stats.average_level = (level_sum as f64 / stats.total_items as f64 * 10.0).round() / 10.0;
    stats.accuracy = percentage(stats.total_correct, stats.total_attempts);
    stats
}

/// Ids from `item_ids` that have a record due at `now`
pub fn items_ready_for_review<'a, L: ProgressLookup>(
    item_ids: impl IntoIterator<Item = &'a str>,
    lookup: &L,
    now: DateTime<Utc>,
) -> Vec<&'a str> {
    item_ids
        .into_iter()
        .filter(|id| lookup.progress(id).is_some_and(|p| p.is_due(now)))
        .collect()
}

/// `round(100 · part / whole)`, 0 when `whole` is 0
pub(crate) fn percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round() as u32
}

fn days_to_duration(days: f64) -> Duration {
    Duration::milliseconds((days * MILLIS_PER_DAY).round() as i64)
}
