//! Database Migrations
//!
//! Schema migration definitions for the progress store.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: per-item progress and named stats",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Sprint history with unit and date indexes",
        up: MIGRATION_V2_UP,
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

/// V1: Initial schema
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS progress (
    item_id TEXT PRIMARY KEY,
    level INTEGER NOT NULL DEFAULT 0 CHECK (level >= 0),
    next_review TEXT NOT NULL,
    last_review TEXT NOT NULL,
    correct INTEGER NOT NULL DEFAULT 0,
    incorrect INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_progress_next_review ON progress(next_review);

-- Named scalars: currentUnit, totalSprints, streakDays, lastSprintDate
CREATE TABLE IF NOT EXISTS stats (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL  -- JSON
);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: Sprint history
///
/// `sprint_id` is content-derived; grammar-focused reruns reuse it and replace the row.
const MIGRATION_V2_UP: &str = r#"
CREATE TABLE IF NOT EXISTS sprint_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sprint_id TEXT NOT NULL UNIQUE,
    unit_id TEXT NOT NULL,
    date TEXT NOT NULL,
    stats TEXT NOT NULL,             -- JSON: SprintStats
    exercise_results TEXT NOT NULL   -- JSON: Vec<ExerciseOutcome>
);

CREATE INDEX IF NOT EXISTS idx_sprint_history_unit ON sprint_history(unit_id);
CREATE INDEX IF NOT EXISTS idx_sprint_history_date ON sprint_history(date);

UPDATE schema_version SET version = 2, applied_at = datetime('now');
"#;

/// Get current schema version from database
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Apply pending migrations, returning how many ran
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );
            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
