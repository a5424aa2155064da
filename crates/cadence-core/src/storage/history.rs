//! Sprint history summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sqlite::{ProgressStore, Result};

/// Sprints considered when no unit is given
pub const RECENT_WINDOW: usize = 100;

/// Aggregate over stored sprints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintStatistics {
    pub total_sprints: usize,
    /// Rounded mean of sprint accuracies
    pub average_accuracy: u32,
    pub best_accuracy: u32,
    /// Date of the newest sprint
    pub last_sprint_date: Option<DateTime<Utc>>,
}

/// Statistics for one unit, or for the [`RECENT_WINDOW`] newest sprints
pub fn sprint_statistics(store: &impl ProgressStore, unit_id: Option<&str>) -> Result<SprintStatistics> {
    let sprints = match unit_id {
        Some(unit) => store.sprints_by_unit(unit)?,
        None => store.recent_sprints(RECENT_WINDOW)?,
    };
    if sprints.is_empty() {
        return Ok(SprintStatistics::default());
    }

    let sum: u64 = sprints.iter().map(|s| s.stats.accuracy as u64).sum();
    let average = (sum as f64 / sprints.len() as f64).round() as u32;

    Ok(SprintStatistics {
        total_sprints: sprints.len(),
        average_accuracy: average,
        best_accuracy: sprints.iter().map(|s| s.stats.accuracy).max().unwrap_or(0),
        last_sprint_date: sprints.first().map(|s| s.date),
    })
}
