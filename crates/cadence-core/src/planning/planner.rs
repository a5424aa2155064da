//! Sprint Planner
//!
//! Combines readiness, distribution and error-prone detection into one
//! ordered item list. The plan chooses *which* items a sprint covers; the
//! exercise types are left to the synthesizer.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::distribution::{determine_optimal_distribution, Distribution, LearningPhase};
use super::readiness::{analyze_unit_readiness, ReadinessDetail, UnitReadiness};
use crate::config::CadenceConfig;
use crate::content::VocabularyItem;
use crate::srs::{mix_items_for_sprint, ProgressLookup, DEFAULT_REVIEW_SHARE};

/// Share of the review budget reserved for error-prone items
pub const DEFAULT_ERROR_PRONE_SHARE: f64 = 0.3;

// ============================================================================
// TYPES
// ============================================================================

/// How new and review items are blended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Split driven by the unit's learning phase, error-prone items first
    #[default]
    PhaseBased,
    /// Fixed review share regardless of phase
    FixedRatio,
}

impl SelectionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionStrategy::PhaseBased => "phase_based",
            SelectionStrategy::FixedRatio => "fixed_ratio",
        }
    }

    pub fn parse_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            "phase_based" | "phase" => Some(SelectionStrategy::PhaseBased),
            "fixed_ratio" | "fixed" => Some(SelectionStrategy::FixedRatio),
            _ => None,
        }
    }
}

impl std::fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Plan header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMetadata {
    pub created_at: DateTime<Utc>,
    pub target_size: usize,
    pub actual_size: usize,
    pub phase: LearningPhase,
    pub strategy: SelectionStrategy,
}

/// Observed composition of the selected items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStatistics {
    pub new_items_percentage: u32,
    pub review_items_percentage: u32,
    pub avg_accuracy_of_review_items: u32,
    /// "error-prone words" or "new material"
    pub priority_focus: String,
}

/// Transient sprint plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintPlan {
    pub metadata: PlanMetadata,
    pub readiness: UnitReadiness,
    pub distribution: Distribution,
    pub items: Vec<ReadinessDetail>,
    pub statistics: PlanStatistics,
}

impl SprintPlan {
    /// Ids of the selected items, in plan order
    pub fn item_ids(&self) -> Vec<&str> {
        self.items.iter().map(|d| d.id.as_str()).collect()
    }
}

// ============================================================================
// PLANNER
// ============================================================================

/// Builds [`SprintPlan`]s
#[derive(Debug, Clone)]
pub struct SprintPlanner {
    strategy: SelectionStrategy,
    error_prone_share: f64,
    fixed_review_share: f64,
}

impl Default for SprintPlanner {
    fn default() -> Self {
        Self {
            strategy: SelectionStrategy::PhaseBased,
            error_prone_share: DEFAULT_ERROR_PRONE_SHARE,
            fixed_review_share: DEFAULT_REVIEW_SHARE,
        }
    }
}

impl SprintPlanner {
    pub fn new(strategy: SelectionStrategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    pub fn from_config(config: &CadenceConfig, strategy: SelectionStrategy) -> Self {
        Self {
            strategy,
            error_prone_share: config.error_prone_share,
            fixed_review_share: config.fixed_review_share,
        }
    }

    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    /// Plan a sprint of at most `target_size` unit items
    pub fn plan<L, R>(
        &self,
        vocabulary: &[VocabularyItem],
        progress: &L,
        target_size: usize,
        error_prone: &[String],
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> SprintPlan
    where
        L: ProgressLookup + ?Sized,
        R: Rng + ?Sized,
    {
        let readiness = analyze_unit_readiness(vocabulary, progress, now);
        let distribution = determine_optimal_distribution(&readiness, target_size);

        tracing::debug!(
            total = readiness.total,
            not_started = readiness.not_started,
            due = readiness.due_for_review,
            completion = readiness.completion_percentage,
            "Unit readiness"
        );

        let flagged: HashSet<&str> = error_prone.iter().map(String::as_str).collect();

        let mut new_pool: Vec<&ReadinessDetail> = readiness
            .details
            .iter()
            .filter(|d| !d.status.is_started())
            .collect();
        new_pool.shuffle(rng);

        let mut review_pool: Vec<&ReadinessDetail> = readiness
            .details
            .iter()
            .filter(|d| d.status.is_started() && d.is_due)
            .collect();
        review_pool.sort_by_key(|d| d.days_until_review.unwrap_or(0));

        let mut error_pool: Vec<&ReadinessDetail> = readiness
            .details
            .iter()
            .filter(|d| d.status.is_started() && flagged.contains(d.id.as_str()))
            .collect();
        error_pool.sort_by_key(|d| d.accuracy);

        let mut items: Vec<ReadinessDetail> = match self.strategy {
            SelectionStrategy::PhaseBased => {
                self.select_phase_based(&distribution, target_size, &new_pool, &review_pool, &error_pool)
            }
            SelectionStrategy::FixedRatio => mix_items_for_sprint(
                &new_pool,
                &review_pool,
                target_size,
                self.fixed_review_share,
                rng,
            )
            .into_iter()
            .cloned()
            .collect(),
        };
        items.truncate(target_size);

        let statistics = plan_statistics(&items, !error_pool.is_empty());

        tracing::info!(
            "Planned {} of {} items ({} phase, {}): {}% new, {}% review",
            items.len(),
            target_size,
            distribution.phase,
            self.strategy,
            statistics.new_items_percentage,
            statistics.review_items_percentage
        );

        SprintPlan {
            metadata: PlanMetadata {
                created_at: now,
                target_size,
                actual_size: items.len(),
                phase: distribution.phase,
                strategy: self.strategy,
            },
            readiness,
            distribution,
            items,
            statistics,
        }
    }

    fn select_phase_based(
        &self,
        distribution: &Distribution,
        target_size: usize,
        new_pool: &[&ReadinessDetail],
        review_pool: &[&ReadinessDetail],
        error_pool: &[&ReadinessDetail],
    ) -> Vec<ReadinessDetail> {
        let mut chosen: Vec<ReadinessDetail> = Vec::with_capacity(target_size);
        let mut seen: HashSet<&str> = HashSet::new();

        let new_to_add = distribution.new_count.min(new_pool.len());
        for detail in &new_pool[..new_to_add] {
            seen.insert(&detail.id);
            chosen.push((*detail).clone());
        }

        let review_to_add = distribution
            .review_count
            .min(review_pool.len() + error_pool.len());
        let priority_budget = (review_to_add as f64 * self.error_prone_share).ceil() as usize;

        let mut added = 0;
        for detail in error_pool.iter().take(priority_budget) {
            if seen.insert(&detail.id) {
                chosen.push((*detail).clone());
                added += 1;
            }
        }
        for detail in review_pool {
            if added >= review_to_add {
                break;
            }
            if seen.insert(&detail.id) {
                chosen.push((*detail).clone());
                added += 1;
            }
        }

        if chosen.len() < target_size {
            let deficit = target_size - chosen.len();
            chosen.extend(new_pool[new_to_add..].iter().take(deficit).map(|d| (*d).clone()));
        }

        chosen
    }
}

fn plan_statistics(items: &[ReadinessDetail], has_error_prone: bool) -> PlanStatistics {
    let review: Vec<&ReadinessDetail> = items.iter().filter(|d| d.status.is_started()).collect();
    let new_count = items.len() - review.len();

    let share = |count: usize| -> u32 {
        if items.is_empty() {
            0
        } else {
            (100.0 * count as f64 / items.len() as f64).round() as u32
        }
    };

    let avg_accuracy = if review.is_empty() {
        0
    } else {
        let sum: u32 = review.iter().map(|d| d.accuracy).sum();
        (sum as f64 / review.len() as f64).round() as u32
    };

    PlanStatistics {
        new_items_percentage: share(new_count),
        review_items_percentage: share(review.len()),
        avg_accuracy_of_review_items: avg_accuracy,
        priority_focus: if has_error_prone {
            "error-prone words".to_string()
        } else {
            "new material".to_string()
        },
    }
}
