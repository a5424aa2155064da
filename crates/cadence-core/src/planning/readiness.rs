//! Readiness Analysis
//!
//! Classifies every unit item against a progress snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::VocabularyItem;
use crate::srs::{percentage, ProgressLookup};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Learning status bucket of one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// No record, or level 0
    NotStarted,
    /// Levels 1-2
    InProgress,
    /// Levels 3-5
    Practiced,
    /// Level 6 and above
    Mastered,
}

impl ItemStatus {
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => ItemStatus::NotStarted,
            1..=2 => ItemStatus::InProgress,
            3..=5 => ItemStatus::Practiced,
            _ => ItemStatus::Mastered,
        }
    }

    pub fn is_started(&self) -> bool {
        !matches!(self, ItemStatus::NotStarted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::NotStarted => "not_started",
            ItemStatus::InProgress => "in_progress",
            ItemStatus::Practiced => "practiced",
            ItemStatus::Mastered => "mastered",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-item readiness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessDetail {
    pub id: String,
    pub word: String,
    pub status: ItemStatus,
    pub level: u8,
    /// Rounded accuracy percentage
    pub accuracy: u32,
    pub correct: u32,
    pub incorrect: u32,
    /// Whole days until due, rounded up; `None` without a record
    pub days_until_review: Option<i64>,
    pub is_due: bool,
}

impl ReadinessDetail {
    fn untracked(item: &VocabularyItem) -> Self {
        Self {
            id: item.id.clone(),
            word: item.word.clone(),
            status: ItemStatus::NotStarted,
            level: 0,
            accuracy: 0,
            correct: 0,
            incorrect: 0,
            days_until_review: None,
            is_due: false,
        }
    }
}

/// Readiness snapshot of a unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitReadiness {
    pub total: usize,
    pub not_started: usize,
    pub in_progress: usize,
    pub practiced: usize,
    pub mastered: usize,
    /// Records due now, in any bucket
    pub due_for_review: usize,
    /// Share of practiced + mastered items, 0 for an empty unit
    pub completion_percentage: u32,
    pub details: Vec<ReadinessDetail>,
}

/// Bucket every item of a unit and count what is due
pub fn analyze_unit_readiness<L: ProgressLookup + ?Sized>(
    vocabulary: &[VocabularyItem],
    progress: &L,
    now: DateTime<Utc>,
) -> UnitReadiness {
    let mut readiness = UnitReadiness {
        total: vocabulary.len(),
        ..Default::default()
    };

    for item in vocabulary {
        let Some(record) = progress.progress(&item.id) else {
            readiness.not_started += 1;
            readiness.details.push(ReadinessDetail::untracked(item));
            continue;
        };

        let status = ItemStatus::from_level(record.level);
        match status {
            ItemStatus::NotStarted => readiness.not_started += 1,
            ItemStatus::InProgress => readiness.in_progress += 1,
            ItemStatus::Practiced => readiness.practiced += 1,
            ItemStatus::Mastered => readiness.mastered += 1,
        }

        let is_due = record.is_due(now);
        if is_due {
            readiness.due_for_review += 1;
        }

        let remaining_ms = (record.next_review - now).num_milliseconds() as f64;

        readiness.details.push(ReadinessDetail {
            id: item.id.clone(),
            word: item.word.clone(),
            status,
            level: record.level,
            accuracy: record.accuracy(),
            correct: record.correct,
            incorrect: record.incorrect,
            days_until_review: Some((remaining_ms / MILLIS_PER_DAY).ceil() as i64),
            is_due,
        });
    }

    readiness.completion_percentage = percentage(
        (readiness.mastered + readiness.practiced) as u32,
        readiness.total as u32,
    );

    readiness
}
