//! Configuration
//!
//! Engine tunables with defaults and environment overrides.

use serde::{Deserialize, Serialize};

use crate::srs::DEFAULT_LEVELS;

/// Default number of items per sprint
pub const DEFAULT_SPRINT_SIZE: usize = 10;

/// Default error-rate threshold for flagging an item as error-prone
pub const DEFAULT_ERROR_THRESHOLD: f64 = 0.30;

/// Tunables for planning, scheduling and synthesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CadenceConfig {
    /// Number of interval levels (max level is `interval_levels - 1`)
    pub interval_levels: usize,
    /// Target items per sprint
    pub sprint_size: usize,
    /// Error rate at or above which an item is flagged
    pub error_threshold: f64,
    /// Share of the review budget spent on error-prone items
    pub error_prone_share: f64,
    /// Review share used by the fixed-ratio strategy
    pub fixed_review_share: f64,
    /// Smallest exercise count the synthesizer will aim for
    pub min_exercises: usize,
    /// Largest exercise count the synthesizer will aim for
    pub max_exercises: usize,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            interval_levels: DEFAULT_LEVELS,
            sprint_size: DEFAULT_SPRINT_SIZE,
            error_threshold: DEFAULT_ERROR_THRESHOLD,
            error_prone_share: 0.3,
            fixed_review_share: 0.7,
            min_exercises: 5,
            max_exercises: 15,
        }
    }
}

impl CadenceConfig {
    /// Defaults overridden by `CADENCE_SPRINT_SIZE`, `CADENCE_INTERVAL_LEVELS`
    /// and `CADENCE_ERROR_THRESHOLD`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(size) = parse_var::<usize>(&lookup, "CADENCE_SPRINT_SIZE") {
            if size > 0 {
                config.sprint_size = size;
            }
        }
        if let Some(levels) = parse_var::<usize>(&lookup, "CADENCE_INTERVAL_LEVELS") {
            if levels > 0 {
                config.interval_levels = levels;
            }
        }
        if let Some(threshold) = parse_var::<f64>(&lookup, "CADENCE_ERROR_THRESHOLD") {
            if (0.0..=1.0).contains(&threshold) {
                config.error_threshold = threshold;
            }
        }

        config
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparseable {}={:?}", key, raw);
            None
        }
    }
}
