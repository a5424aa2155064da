//! SQLite Storage Implementation
//!
//! Progress records, named stats and sprint history in a single database file.
//! The connection is opened lazily by [`Storage::ensure_open`]; every query
//! goes through it, so opening twice is harmless.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::scoring::SprintResult;
use crate::srs::ProgressRecord;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Stored JSON could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Invalid timestamp
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// STORE INTERFACE
// ============================================================================

/// Persistent learner data
///
/// Keyed progress records, named JSON stats, and append-only sprint history
/// (a sprint with an existing id replaces the earlier row).
pub trait ProgressStore {
    fn all_progress(&self) -> Result<Vec<ProgressRecord>>;

    fn get_progress(&self, item_id: &str) -> Result<Option<ProgressRecord>>;

    fn put_progress(&self, record: &ProgressRecord) -> Result<()>;

    fn get_stat_value(&self, key: &str) -> Result<Option<serde_json::Value>>;

    fn put_stat_value(&self, key: &str, value: &serde_json::Value) -> Result<()>;

    fn append_sprint(&self, result: &SprintResult) -> Result<()>;

    /// Sprints of one unit, newest first
    fn sprints_by_unit(&self, unit_id: &str) -> Result<Vec<SprintResult>>;

    /// Most recent sprints across units, newest first
    fn recent_sprints(&self, limit: usize) -> Result<Vec<SprintResult>>;

    /// Typed read of a named stat
    fn get_stat<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>>
    where
        Self: Sized,
    {
        match self.get_stat_value(key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Typed write of a named stat
    fn put_stat<T: Serialize>(&self, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        self.put_stat_value(key, &serde_json::to_value(value)?)
    }
}

// ============================================================================
// STORAGE
// ============================================================================

/// SQLite-backed [`ProgressStore`]
pub struct Storage {
    path: PathBuf,
    conn: Mutex<Option<Connection>>,
}

impl Storage {
    /// Resolve the database path without opening it
    ///
    /// Without an explicit path the platform data directory is used, created
    /// with owner-only permissions on Unix.
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => {
                let proj_dirs = ProjectDirs::from("com", "cadence", "core").ok_or_else(|| {
                    StorageError::Init("Could not determine project directories".to_string())
                })?;

                let data_dir = proj_dirs.data_dir();
                std::fs::create_dir_all(data_dir)?;
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    let perms = std::fs::Permissions::from_mode(0o700);
                    let _ = std::fs::set_permissions(data_dir, perms);
                }
                data_dir.join("cadence.db")
            }
        };

        Ok(Self {
            path,
            conn: Mutex::new(None),
        })
    }

    /// Resolve and open in one step
    pub fn open(db_path: Option<PathBuf>) -> Result<Self> {
        let storage = Self::new(db_path)?;
        storage.ensure_open()?;
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the database, apply PRAGMAs and pending migrations. Idempotent.
    pub fn ensure_open(&self) -> Result<()> {
        self.with_conn(|_| Ok(()))
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| StorageError::Init("Connection lock poisoned".into()))?;

        if guard.is_none() {
            *guard = Some(Self::open_connection(&self.path)?);
        }
        match guard.as_ref() {
            Some(conn) => f(conn),
            None => Err(StorageError::Init("Connection unavailable".into())),
        }
    }

    fn open_connection(path: &Path) -> Result<Connection> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        #[cfg(unix)]
        if path.exists() {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(path, perms);
        }

        Self::configure_connection(&conn)?;
        let applied = super::migrations::apply_migrations(&conn)?;
        tracing::info!(
            path = %path.display(),
            migrations = applied,
            "Opened progress database"
        );
        Ok(conn)
    }

    /// Apply PRAGMAs and optional encryption to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        #[cfg(feature = "encryption")]
        {
            if let Ok(key) = std::env::var("CADENCE_ENCRYPTION_KEY") {
                if !key.is_empty() {
                    conn.pragma_update(None, "key", &key)?;
                }
            }
        }

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        Ok(())
    }

    /// Remove all progress, stats and history
    pub fn reset(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "DELETE FROM progress;
                 DELETE FROM stats;
                 DELETE FROM sprint_history;",
            )?;
            Ok(())
        })
    }

    // ========================================================================
    // ROW MAPPING
    // ========================================================================

    fn format_timestamp(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    /// Parse RFC3339 timestamp
    fn parse_timestamp(value: &str, field_name: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("Invalid {} timestamp '{}': {}", field_name, value, e),
                    )),
                )
            })
    }

    fn row_to_progress(row: &rusqlite::Row) -> rusqlite::Result<ProgressRecord> {
        let next_review: String = row.get("next_review")?;
        let last_review: String = row.get("last_review")?;

        Ok(ProgressRecord {
            item_id: row.get("item_id")?,
            level: row.get("level")?,
            next_review: Self::parse_timestamp(&next_review, "next_review")?,
            last_review: Self::parse_timestamp(&last_review, "last_review")?,
            correct: row.get("correct")?,
            incorrect: row.get("incorrect")?,
        })
    }

    /// Run a sprint query and decode the JSON columns
    fn query_sprints(conn: &Connection, sql: &str, args: impl rusqlite::Params) -> Result<Vec<SprintResult>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(args, |row| {
            Ok((
                row.get::<_, String>("sprint_id")?,
                row.get::<_, String>("unit_id")?,
                row.get::<_, String>("date")?,
                row.get::<_, String>("stats")?,
                row.get::<_, String>("exercise_results")?,
            ))
        })?;

        let mut result = Vec::new();
        for row in rows {
            let (id, unit_id, date, stats, exercise_results) = row?;
            let date = DateTime::parse_from_rfc3339(&date)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| StorageError::InvalidTimestamp(format!("sprint {}: {}", id, e)))?;

            result.push(SprintResult {
                id,
                unit_id,
                date,
                stats: serde_json::from_str(&stats)?,
                exercise_results: serde_json::from_str(&exercise_results)?,
            });
        }
        Ok(result)
    }
}

impl ProgressStore for Storage {
    fn all_progress(&self) -> Result<Vec<ProgressRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM progress ORDER BY item_id")?;
            let rows = stmt.query_map([], Self::row_to_progress)?;

            let mut result = Vec::new();
            for row in rows {
                result.push(row?);
            }
            Ok(result)
        })
    }

    fn get_progress(&self, item_id: &str) -> Result<Option<ProgressRecord>> {
        self.with_conn(|conn| {
            let record = conn
                .query_row(
                    "SELECT * FROM progress WHERE item_id = ?1",
                    params![item_id],
                    Self::row_to_progress,
                )
                .optional()?;
            Ok(record)
        })
    }

    fn put_progress(&self, record: &ProgressRecord) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO progress (item_id, level, next_review, last_review, correct, incorrect)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(item_id) DO UPDATE SET
                    level = excluded.level,
                    next_review = excluded.next_review,
                    last_review = excluded.last_review,
                    correct = excluded.correct,
                    incorrect = excluded.incorrect",
                params![
                    record.item_id,
                    record.level,
                    Self::format_timestamp(&record.next_review),
                    Self::format_timestamp(&record.last_review),
                    record.correct,
                    record.incorrect,
                ],
            )?;
            Ok(())
        })
    }

    fn get_stat_value(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let raw: Option<String> = self.with_conn(|conn| {
            Ok(conn
                .query_row("SELECT value FROM stats WHERE key = ?1", params![key], |row| row.get(0))
                .optional()?)
        })?;

        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn put_stat_value(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO stats (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, text],
            )?;
            Ok(())
        })
    }

    fn append_sprint(&self, result: &SprintResult) -> Result<()> {
        let stats = serde_json::to_string(&result.stats)?;
        let exercise_results = serde_json::to_string(&result.exercise_results)?;

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sprint_history (sprint_id, unit_id, date, stats, exercise_results)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(sprint_id) DO UPDATE SET
                    unit_id = excluded.unit_id,
                    date = excluded.date,
                    stats = excluded.stats,
                    exercise_results = excluded.exercise_results",
                params![
                    result.id,
                    result.unit_id,
                    Self::format_timestamp(&result.date),
                    stats,
                    exercise_results,
                ],
            )?;
            Ok(())
        })?;

        tracing::debug!(sprint = %result.id, unit = %result.unit_id, "Saved sprint");
        Ok(())
    }

    fn sprints_by_unit(&self, unit_id: &str) -> Result<Vec<SprintResult>> {
        self.with_conn(|conn| {
            Self::query_sprints(
                conn,
                "SELECT * FROM sprint_history WHERE unit_id = ?1 ORDER BY date DESC, id DESC",
                params![unit_id],
            )
        })
    }

    fn recent_sprints(&self, limit: usize) -> Result<Vec<SprintResult>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_conn(|conn| {
            Self::query_sprints(
                conn,
                "SELECT * FROM sprint_history ORDER BY date DESC, id DESC LIMIT ?1",
                params![limit],
            )
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
