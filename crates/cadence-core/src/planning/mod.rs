//! Sprint Planning
//!
//! Decides which unit items a sprint covers:
//! - Readiness: buckets items by level and counts what is due
//! - Distribution: new/review split from the unit's learning phase
//! - Error-prone detection: items failed at least 30% of the time
//! - Planner: one ordered, size-capped item list
//! - Recommendation: pace and focus advice for the learner

mod distribution;
mod error_prone;
mod planner;
mod readiness;
mod recommendation;

pub use distribution::{determine_optimal_distribution, Distribution, LearningPhase};
pub use error_prone::{
    error_prone_details, identify_error_prone_default, identify_error_prone_items, ErrorProneItem,
};
pub use planner::{
    PlanMetadata, PlanStatistics, SelectionStrategy, SprintPlan, SprintPlanner,
    DEFAULT_ERROR_PRONE_SHARE,
};
pub use readiness::{analyze_unit_readiness, ItemStatus, ReadinessDetail, UnitReadiness};
pub use recommendation::{
    estimate_time_to_completion, recommend, CompletionEstimate, Intensity, StudyRecommendation,
};
