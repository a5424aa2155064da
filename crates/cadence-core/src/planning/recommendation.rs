//! Study recommendations derived from a sprint plan.

use serde::{Deserialize, Serialize};

use super::distribution::LearningPhase;
use super::planner::SprintPlan;
use super::readiness::UnitReadiness;

/// Review accuracy below which the pace is escalated
const WEAK_ACCURACY: u32 = 60;

/// Rough days of practice per remaining item
const DAYS_PER_ITEM: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Moderate,
    High,
}

/// Remaining time for a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEstimate {
    pub days: usize,
    pub weeks: usize,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyRecommendation {
    pub phase: LearningPhase,
    pub intensity: Intensity,
    /// Sprints per day
    pub daily_goal: u32,
    pub focus_areas: Vec<String>,
    pub next_step: String,
    pub estimated_time_to_completion: CompletionEstimate,
    pub advice: String,
}

/// Pace, focus and next step for the unit a plan was built from
pub fn recommend(plan: &SprintPlan) -> StudyRecommendation {
    let phase = plan.metadata.phase;

    let (mut intensity, mut daily_goal, focus): (Intensity, u32, &[&str]) = match phase {
        LearningPhase::Initial => (
            Intensity::High,
            5,
            &["vocabulary", "pronunciation", "basic structures"],
        ),
        LearningPhase::Consolidation => (
            Intensity::High,
            4,
            &["grammar", "sentence building", "listening"],
        ),
        LearningPhase::Maintenance => (
            Intensity::Moderate,
            3,
            &["speaking", "writing", "reading comprehension"],
        ),
        LearningPhase::Review => (
            Intensity::Moderate,
            2,
            &["advanced topics", "cultural context", "native patterns"],
        ),
    };
    let mut focus_areas: Vec<String> = focus.iter().map(|s| s.to_string()).collect();

    if plan.statistics.avg_accuracy_of_review_items < WEAK_ACCURACY {
        intensity = Intensity::High;
        daily_goal = (daily_goal as f64 * 1.5).ceil() as u32;
        focus_areas.insert(0, "review weak areas".to_string());
    }

    StudyRecommendation {
        phase,
        intensity,
        daily_goal,
        focus_areas,
        next_step: next_step(&plan.readiness),
        estimated_time_to_completion: estimate_time_to_completion(&plan.readiness),
        advice: plan.distribution.recommendation.clone(),
    }
}

fn next_step(readiness: &UnitReadiness) -> String {
    if readiness.completion_percentage == 0 {
        "Start learning the first vocabulary set".to_string()
    } else if readiness.not_started == 0 {
        "All vocabulary started! Focus on consolidation".to_string()
    } else if readiness.due_for_review > readiness.not_started {
        "More items are ready for review than new ones".to_string()
    } else {
        format!("Continue learning {} remaining items", readiness.not_started)
    }
}

/// Days and weeks left at [`DAYS_PER_ITEM`] per unfinished item
pub fn estimate_time_to_completion(readiness: &UnitReadiness) -> CompletionEstimate {
    let days = (readiness.not_started + readiness.in_progress) * DAYS_PER_ITEM;
    let weeks = days.div_ceil(7);

    CompletionEstimate {
        days,
        weeks,
        description: if days <= 7 {
            format!("~{} days", days)
        } else {
            format!("~{} weeks", weeks)
        },
    }
}
