//! Learner State
//!
//! In-memory view of everything persisted for one learner: per-item progress,
//! the current unit, sprint count and daily streak. Every mutation is written
//! through to the [`ProgressStore`] it was loaded from.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::sqlite::{ProgressStore, Result};
use crate::content::{normalize_key, VocabularyItem};
use crate::exercise::ExerciseOutcome;
use crate::scoring::SprintResult;
use crate::srs::{
    learning_stats, mix_items_for_sprint, percentage, LearningStats, ProgressLookup, ProgressRecord,
    SrsEngine, DEFAULT_REVIEW_SHARE, LEARNED_LEVEL,
};

/// Unit selected before the learner picks one
pub const DEFAULT_UNIT: &str = "unit1";

/// Stat keys
pub mod keys {
    pub const CURRENT_UNIT: &str = "currentUnit";
    pub const TOTAL_SPRINTS: &str = "totalSprints";
    pub const STREAK_DAYS: &str = "streakDays";
    pub const LAST_SPRINT_DATE: &str = "lastSprintDate";
}

/// Learned share of one unit's vocabulary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    pub total: usize,
    /// Items at level 3 or above
    pub learned: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone)]
pub struct LearnerState {
    progress: HashMap<String, ProgressRecord>,
    current_unit: String,
    total_sprints: u32,
    streak_days: u32,
    last_sprint_date: Option<NaiveDate>,
    engine: SrsEngine,
}

impl Default for LearnerState {
    fn default() -> Self {
        Self {
            progress: HashMap::new(),
            current_unit: DEFAULT_UNIT.to_string(),
            total_sprints: 0,
            streak_days: 0,
            last_sprint_date: None,
            engine: SrsEngine::default(),
        }
    }
}

impl LearnerState {
    /// Hydrate progress and stats from `store`
    ///
    /// A numeric current unit `N` is read as `unitN`. Malformed stats fall
    /// back to their defaults.
    pub fn load(store: &impl ProgressStore) -> Result<Self> {
        let progress: HashMap<String, ProgressRecord> = store
            .all_progress()?
            .into_iter()
            .map(|r| (r.item_id.clone(), r))
            .collect();

        let current_unit = match store.get_stat_value(keys::CURRENT_UNIT)? {
            Some(serde_json::Value::String(unit)) if !unit.trim().is_empty() => normalize_key(&unit),
            Some(serde_json::Value::Number(n)) => format!("unit{}", n),
            _ => DEFAULT_UNIT.to_string(),
        };

        let state = Self {
            progress,
            current_unit,
            total_sprints: stat_or_default(store, keys::TOTAL_SPRINTS)?,
            streak_days: stat_or_default(store, keys::STREAK_DAYS)?,
            last_sprint_date: stat_or_default(store, keys::LAST_SPRINT_DATE)?,
            engine: SrsEngine::default(),
        };

        tracing::info!(
            items = state.progress.len(),
            unit = %state.current_unit,
            sprints = state.total_sprints,
            "Loaded learner state"
        );
        Ok(state)
    }

    /// Use `engine` for subsequent answers
    pub fn with_engine(mut self, engine: SrsEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn current_unit(&self) -> &str {
        &self.current_unit
    }

    pub fn total_sprints(&self) -> u32 {
        self.total_sprints
    }

    pub fn streak_days(&self) -> u32 {
        self.streak_days
    }

    pub fn last_sprint_date(&self) -> Option<NaiveDate> {
        self.last_sprint_date
    }

    pub fn progress_map(&self) -> &HashMap<String, ProgressRecord> {
        &self.progress
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Apply one answer and persist the resulting record
    ///
    /// Returns `None` when a wrong first answer leaves the item untracked.
    pub fn record_answer(
        &mut self,
        store: &impl ProgressStore,
        item_id: &str,
        is_correct: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<ProgressRecord>> {
        let Some(updated) = self
            .engine
            .apply_answer(self.progress.get(item_id), item_id, is_correct, now)
        else {
            return Ok(None);
        };

        store.put_progress(&updated)?;
        tracing::debug!(
            item = %item_id,
            correct = is_correct,
            level = updated.level,
            "Recorded answer"
        );
        self.progress.insert(item_id.to_string(), updated.clone());
        Ok(Some(updated))
    }

    /// Feed every outcome linked to an item into the SRS engine
    pub fn record_outcomes(&mut self, store: &impl ProgressStore, outcomes: &[ExerciseOutcome]) -> Result<usize> {
        let mut updated = 0;
        for outcome in outcomes {
            if let Some(item_id) = outcome.item_id.as_deref() {
                if self.record_answer(store, item_id, outcome.is_correct, outcome.timestamp)?.is_some() {
                    updated += 1;
                }
            }
        }
        Ok(updated)
    }

    /// Store a finished sprint and advance the sprint count and streak
    ///
    /// The streak is unchanged for a second sprint on the same day, grows
    /// after a sprint yesterday, and restarts at 1 otherwise.
    pub fn complete_sprint(&mut self, store: &impl ProgressStore, result: &SprintResult, today: NaiveDate) -> Result<()> {
        store.append_sprint(result)?;

        self.total_sprints += 1;
        store.put_stat(keys::TOTAL_SPRINTS, &self.total_sprints)?;

        if self.last_sprint_date != Some(today) {
            let yesterday = today.pred_opt();
            self.streak_days = if self.last_sprint_date.is_some() && self.last_sprint_date == yesterday {
                self.streak_days + 1
            } else {
                1
            };
            self.last_sprint_date = Some(today);
            store.put_stat(keys::STREAK_DAYS, &self.streak_days)?;
            store.put_stat(keys::LAST_SPRINT_DATE, &today)?;
        }

        tracing::info!(
            sprint = %result.id,
            total = self.total_sprints,
            streak = self.streak_days,
            "Sprint completed"
        );
        Ok(())
    }

    pub fn set_current_unit(&mut self, store: &impl ProgressStore, unit_id: &str) -> Result<()> {
        self.current_unit = normalize_key(unit_id);
        store.put_stat(keys::CURRENT_UNIT, &self.current_unit)
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Tracked ids due at `now`
    pub fn due_ids(&self, now: DateTime<Utc>) -> Vec<String> {
        let mut ids: Vec<String> = self
            .progress
            .values()
            .filter(|p| p.is_due(now))
            .map(|p| p.item_id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Ids from `candidates` that are untracked or still at level 0
    pub fn new_ids<'a>(&self, candidates: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        candidates
            .into_iter()
            .filter(|id| self.progress.get(*id).is_none_or(|p| p.level == 0))
            .collect()
    }

    /// Item progress once the item has left level 0
    pub fn item_progress(&self, item_id: &str) -> Option<&ProgressRecord> {
        self.progress.get(item_id).filter(|p| p.level > 0)
    }

    /// Learned count over vocabulary tagged with `unit_id`
    pub fn unit_stats(&self, unit_id: &str, vocabulary: &[VocabularyItem]) -> UnitStats {
        let unit_id = normalize_key(unit_id);
        let unit_items: Vec<&VocabularyItem> = vocabulary.iter().filter(|v| v.has_tag(&unit_id)).collect();
        let learned = unit_items
            .iter()
            .filter(|v| self.progress.get(&v.id).is_some_and(|p| p.level >= LEARNED_LEVEL))
            .count();

        UnitStats {
            total: unit_items.len(),
            learned,
            percentage: percentage(learned as u32, unit_items.len() as u32),
        }
    }

    /// Blend new and due ids 70/30 into `count` ids
    ///
    /// A due level-0 item is counted as review only.
    pub fn sprint_items<R: Rng + ?Sized>(
        &self,
        item_ids: &[String],
        count: usize,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<String> {
        let review: Vec<String> = item_ids
            .iter()
            .filter(|id| self.progress.get(id.as_str()).is_some_and(|p| p.is_due(now)))
            .cloned()
            .collect();
        let due: HashSet<&str> = review.iter().map(String::as_str).collect();
        let fresh: Vec<String> = self
            .new_ids(item_ids.iter().map(String::as_str))
            .into_iter()
            .filter(|id| !due.contains(id))
            .map(str::to_string)
            .collect();

        mix_items_for_sprint(&fresh, &review, count, DEFAULT_REVIEW_SHARE, rng)
    }

    pub fn learning_stats(&self) -> LearningStats {
        learning_stats(self.progress.values())
    }
}

impl ProgressLookup for LearnerState {
    fn progress(&self, item_id: &str) -> Option<&ProgressRecord> {
        self.progress.get(item_id)
    }
}

fn stat_or_default<T>(store: &impl ProgressStore, key: &str) -> Result<T>
where
    T: Default + serde::de::DeserializeOwned,
{
    let Some(value) = store.get_stat_value(key)? else {
        return Ok(T::default());
    };
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            tracing::warn!(key, error = %e, "Ignoring malformed stat");
            Ok(T::default())
        }
    }
}
