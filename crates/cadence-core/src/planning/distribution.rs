//! Phase-Based Distribution
//!
//! Picks the new/review split for a sprint from unit completion.
//!
//! | completion ≤ | phase         | new                | review             |
//! |--------------|---------------|--------------------|--------------------|
//! | 25           | initial       | min(8, ⌈0.8n⌉)     | max(2, ⌊0.2n⌋)     |
//! | 50           | consolidation | min(6, ⌈0.6n⌉)     | max(4, ⌊0.4n⌋)     |
//! | 75           | maintenance   | min(4, ⌈0.4n⌉)     | max(6, ⌊0.6n⌋)     |
//! | 100          | review        | max(1, ⌊0.2n⌋)     | min(9, ⌈0.8n⌉)     |

use serde::{Deserialize, Serialize};

use super::readiness::UnitReadiness;

/// Coarse learning stage of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningPhase {
    Initial,
    Consolidation,
    Maintenance,
    Review,
}

impl LearningPhase {
    /// Phase for a completion percentage (thresholds are inclusive)
    pub fn from_completion(completion: u32) -> Self {
        match completion {
            0..=25 => LearningPhase::Initial,
            26..=50 => LearningPhase::Consolidation,
            51..=75 => LearningPhase::Maintenance,
            _ => LearningPhase::Review,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LearningPhase::Initial => "initial",
            LearningPhase::Consolidation => "consolidation",
            LearningPhase::Maintenance => "maintenance",
            LearningPhase::Review => "review",
        }
    }

    /// Planned (new, review) counts for a sprint of `n` items
    pub fn split(&self, n: usize) -> (usize, usize) {
        let scaled = |share: f64| n as f64 * share;
        match self {
            LearningPhase::Initial => (
                8_usize.min(scaled(0.8).ceil() as usize),
                2_usize.max(scaled(0.2).floor() as usize),
            ),
            LearningPhase::Consolidation => (
                6_usize.min(scaled(0.6).ceil() as usize),
                4_usize.max(scaled(0.4).floor() as usize),
            ),
            LearningPhase::Maintenance => (
                4_usize.min(scaled(0.4).ceil() as usize),
                6_usize.max(scaled(0.6).floor() as usize),
            ),
            LearningPhase::Review => (
                1_usize.max(scaled(0.2).floor() as usize),
                9_usize.min(scaled(0.8).ceil() as usize),
            ),
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            LearningPhase::Initial => "Early learning phase: focus on new material",
            LearningPhase::Consolidation => "Balancing new material with review",
            LearningPhase::Maintenance => "Focus on review and reinforcement",
            LearningPhase::Review => "Consolidating toward full mastery",
        }
    }

    fn recommendation(&self) -> &'static str {
        match self {
            LearningPhase::Initial => "Actively learn new words and structures",
            LearningPhase::Consolidation => "Balance learning new items with reviewing old ones",
            LearningPhase::Maintenance => "Spend more time on review for long-term retention",
            LearningPhase::Review => "Revisit the hard parts and polish your skills",
        }
    }
}

impl std::fmt::Display for LearningPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// New/review split decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub new_count: usize,
    pub review_count: usize,
    pub phase: LearningPhase,
    pub reason: String,
    /// Learner-facing advice
    pub recommendation: String,
}

/// Choose the new/review split for a sprint of `target_size` items
pub fn determine_optimal_distribution(readiness: &UnitReadiness, target_size: usize) -> Distribution {
    let phase = LearningPhase::from_completion(readiness.completion_percentage);
    let (new_count, review_count) = phase.split(target_size);

    let mut distribution = Distribution {
        new_count,
        review_count,
        phase,
        reason: phase.reason().to_string(),
        recommendation: phase.recommendation().to_string(),
    };

    if readiness.not_started == 0 {
        distribution.new_count = 0;
        distribution.review_count = target_size;
        distribution.reason.push_str(" (no new items left)");
    }

    // Applied after the rule above, so it wins when both hold
    if readiness.due_for_review == 0 && readiness.in_progress == 0 {
        distribution.new_count = target_size;
        distribution.review_count = 0;
        distribution.reason.push_str(" (nothing to review)");
    }

    distribution
}
