//! Error-Prone Detection
//!
//! Mines sprint history for unit items that are failed often.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_ERROR_THRESHOLD;
use crate::content::VocabularyItem;
use crate::scoring::SprintResult;

/// An item flagged as error-prone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorProneItem {
    pub id: String,
    pub word: String,
    /// Rounded percentage
    pub error_rate: u32,
    pub total_attempts: u32,
    pub errors: u32,
}

#[derive(Default)]
struct Tally {
    attempts: u32,
    failures: u32,
}

impl Tally {
    fn rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.failures as f64 / self.attempts as f64
        }
    }
}

/// Flagged unit items with their counts, worst first
pub fn error_prone_details<'a>(
    history: impl IntoIterator<Item = &'a SprintResult>,
    vocabulary: &[VocabularyItem],
    threshold: f64,
) -> Vec<ErrorProneItem> {
    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();

    for sprint in history {
        for outcome in &sprint.exercise_results {
            let Some(item_id) = outcome.item_id.as_deref() else {
                continue;
            };
            let tally = tallies.entry(item_id).or_default();
            tally.attempts += 1;
            if !outcome.is_correct {
                tally.failures += 1;
            }
        }
    }

    let words: HashMap<&str, &str> = vocabulary
        .iter()
        .map(|v| (v.id.as_str(), v.word.as_str()))
        .collect();

    let mut flagged: Vec<(f64, ErrorProneItem)> = tallies
        .into_iter()
        .filter(|(_, tally)| tally.attempts > 0 && tally.rate() >= threshold)
        .filter_map(|(id, tally)| {
            let word = words.get(id)?;
            Some((
                tally.rate(),
                ErrorProneItem {
                    id: id.to_string(),
                    word: word.to_string(),
                    error_rate: (tally.rate() * 100.0).round() as u32,
                    total_attempts: tally.attempts,
                    errors: tally.failures,
                },
            ))
        })
        .collect();

    flagged.sort_by(|(a, _), (b, _)| b.total_cmp(a));

    tracing::debug!("{} error-prone items at threshold {}", flagged.len(), threshold);

    flagged.into_iter().map(|(_, item)| item).collect()
}

/// Ids of flagged unit items, highest error rate first
pub fn identify_error_prone_items<'a>(
    history: impl IntoIterator<Item = &'a SprintResult>,
    vocabulary: &[VocabularyItem],
    threshold: f64,
) -> Vec<String> {
    error_prone_details(history, vocabulary, threshold)
        .into_iter()
        .map(|item| item.id)
        .collect()
}

/// [`identify_error_prone_items`] at the default 30% threshold
pub fn identify_error_prone_default<'a>(
    history: impl IntoIterator<Item = &'a SprintResult>,
    vocabulary: &[VocabularyItem],
) -> Vec<String> {
    identify_error_prone_items(history, vocabulary, DEFAULT_ERROR_THRESHOLD)
}
