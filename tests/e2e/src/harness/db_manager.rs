//! Test Database Manager
//!
//! Provides isolated database instances for testing:
//! - Temporary databases that are automatically cleaned up
//! - Progress records seeded at chosen levels and due dates
//! - Stored sprints for history-driven planning

use std::path::PathBuf;

use cadence_core::{
    format_sprint_result, score, LearnerState, ProgressRecord, ProgressStore, SprintResult, Storage,
};
use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;

use crate::mocks::TestDataFactory;

/// Manager for test databases
///
/// Creates isolated database instances for each test to prevent interference.
/// Automatically cleans up temporary databases when dropped.
///
/// # Example
///
/// ```rust,ignore
/// let db = TestDatabaseManager::new_temp();
/// db.seed_progress(&["w01", "w02"], 3, Utc::now());
///
/// let learner = db.learner();
/// // Database is automatically deleted when `db` goes out of scope
/// ```
pub struct TestDatabaseManager {
    /// The storage instance
    pub storage: Storage,
    /// Temporary directory (kept alive to prevent premature deletion)
    _temp_dir: Option<TempDir>,
    /// Path to the database file
    db_path: PathBuf,
}

impl TestDatabaseManager {
    /// Create a new test database in a temporary directory
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test_cadence.db");

        let storage = Storage::new(Some(db_path.clone())).expect("Failed to create test storage");
        storage.ensure_open().expect("Failed to open test storage");

        Self {
            storage,
            _temp_dir: Some(temp_dir),
            db_path,
        }
    }

    /// Create a test database at a specific path
    ///
    /// The database is NOT automatically deleted.
    pub fn new_at_path(path: PathBuf) -> Self {
        let storage = Storage::new(Some(path.clone())).expect("Failed to create test storage");
        storage.ensure_open().expect("Failed to open test storage");

        Self {
            storage,
            _temp_dir: None,
            db_path: path,
        }
    }

    /// Get the database path
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Fresh learner state read back from the database
    pub fn learner(&self) -> LearnerState {
        LearnerState::load(&self.storage).expect("Failed to load learner state")
    }

    pub fn progress_count(&self) -> usize {
        self.storage.all_progress().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.progress_count() == 0
    }

    // ========================================================================
    // SEEDING METHODS
    // ========================================================================

    /// Store a record for each id at `level`, due at `next_review`
    pub fn seed_progress(&self, ids: &[&str], level: u8, next_review: DateTime<Utc>) {
        for id in ids {
            let record = ProgressRecord {
                item_id: id.to_string(),
                level,
                next_review,
                last_review: next_review - Duration::days(1),
                correct: level as u32,
                incorrect: 0,
            };
            self.storage
                .put_progress(&record)
                .expect("Failed to seed progress");
        }
    }

    /// Store a sprint in which the first `correct` of `items` were answered correctly
    pub fn seed_sprint(&self, unit: &str, items: &[&str], correct: usize, at: DateTime<Utc>) -> SprintResult {
        let outcomes = TestDataFactory::outcomes(items, correct, at);
        let result = format_sprint_result(score(&outcomes, 60, at), unit, None, outcomes);
        self.storage
            .append_sprint(&result)
            .expect("Failed to seed sprint");
        result
    }

    // ========================================================================
    // CLEANUP
    // ========================================================================

    /// Remove all progress, stats and history
    pub fn clear(&self) {
        self.storage.reset().expect("Failed to reset storage");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_database_creation() {
        let db = TestDatabaseManager::new_temp();
        assert!(db.is_empty());
        assert!(db.path().exists());
    }

    #[test]
    fn test_seed_progress() {
        let db = TestDatabaseManager::new_temp();
        db.seed_progress(&["a", "b", "c"], 2, Utc::now());

        assert_eq!(db.progress_count(), 3);
        let learner = db.learner();
        assert_eq!(learner.item_progress("b").map(|p| p.level), Some(2));
    }

    #[test]
    fn test_seed_sprint() {
        let db = TestDatabaseManager::new_temp();
        let result = db.seed_sprint("unit1", &["a", "b"], 1, Utc::now());

        assert_eq!(result.stats.accuracy, 50);
        assert_eq!(db.storage.sprints_by_unit("unit1").unwrap().len(), 1);
    }

    #[test]
    fn test_clear_database() {
        let db = TestDatabaseManager::new_temp();
        db.seed_progress(&["a", "b"], 1, Utc::now());
        assert_eq!(db.progress_count(), 2);

        db.clear();
        assert!(db.is_empty());
    }
}
