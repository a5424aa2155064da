//! Interval Table
//!
//! `interval(0) = 1`, `interval(i) = interval(i-1) × 2.5`. The running value
//! is carried unrounded; each stored entry is rounded to one decimal.

use std::sync::LazyLock;

/// Default number of levels (0..=9)
pub const DEFAULT_LEVELS: usize = 10;

/// Growth factor between consecutive levels
pub const INTERVAL_MULTIPLIER: f64 = 2.5;

/// Interval used when a level falls outside the table
pub const FALLBACK_INTERVAL_DAYS: f64 = 960.0;

static STANDARD: LazyLock<IntervalTable> = LazyLock::new(|| IntervalTable::new(DEFAULT_LEVELS));

/// Generate `levels` intervals in days
pub fn generate_intervals(levels: usize) -> Vec<f64> {
    let mut intervals = Vec::with_capacity(levels);
    let mut current = 1.0_f64;

    for _ in 0..levels {
        intervals.push(round_tenth(current));
        current *= INTERVAL_MULTIPLIER;
    }

    intervals
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Immutable interval table shared read-only for the process lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalTable {
    intervals: Vec<f64>,
}

impl IntervalTable {
    /// Build a table with `levels` entries (at least one)
    pub fn new(levels: usize) -> Self {
        Self {
            intervals: generate_intervals(levels.max(1)),
        }
    }

    /// The default ten-level table
    pub fn standard() -> &'static IntervalTable {
        &STANDARD
    }

    /// Interval at `level`, if the table has one
    pub fn get(&self, level: usize) -> Option<f64> {
        self.intervals.get(level).copied()
    }

    /// Interval at `level`, or [`FALLBACK_INTERVAL_DAYS`] past the end
    pub fn days_for(&self, level: usize) -> f64 {
        self.get(level).unwrap_or(FALLBACK_INTERVAL_DAYS)
    }

    /// Highest reachable level
    pub fn max_level(&self) -> u8 {
        (self.intervals.len() - 1).min(u8::MAX as usize) as u8
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.intervals
    }
}

impl Default for IntervalTable {
    fn default() -> Self {
        STANDARD.clone()
    }
}
