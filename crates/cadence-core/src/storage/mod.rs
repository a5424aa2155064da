//! Storage Module
//!
//! Persistence for learner data:
//! - SQLite store with versioned migrations
//! - Learner state loaded from and written through to the store
//! - Sprint history summaries

mod history;
mod learner;
mod migrations;
mod sqlite;

pub use history::{sprint_statistics, SprintStatistics, RECENT_WINDOW};
pub use learner::{keys, LearnerState, UnitStats, DEFAULT_UNIT};
pub use migrations::{Migration, MIGRATIONS};
pub use sqlite::{ProgressStore, Result, Storage, StorageError};
