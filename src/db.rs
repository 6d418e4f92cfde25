//! SQLite database connection and schema management for progress tracking
//!
//! Manages the `~/.learntrack/progress.db` database with automatic schema
//! migration. The connection lives behind a mutex; every multi-step mutation
//! runs inside a single `BEGIN IMMEDIATE` transaction on that connection, so
//! concurrent actions against the same user serialize instead of losing
//! updates.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::achievements::definitions::CATALOG;

/// Database wrapper shared by all engine components
#[derive(Clone)]
pub struct ProgressDb {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl ProgressDb {
    /// Open or create the database at the default location
    /// (`~/.learntrack/progress.db`)
    pub fn open_default() -> Result<Self> {
        let db_path = crate::config::data_dir().join("progress.db");
        Self::open(&db_path)
    }

    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open progress db: {}", path.display()))?;

        // WAL for concurrent readers while a writer transaction is open
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Self::from_connection(conn)
    }

    /// Open an in-memory database (tests)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        db.sync_achievement_catalog()?;
        Ok(db)
    }

    /// Get the connection guard. Hold it for the duration of a transaction.
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("Progress DB lock poisoned")
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA_SQL)?;
        drop(conn);
        self.run_migrations()?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn();

        let version: i32 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))
            .unwrap_or(0);

        // Migration 2: lifetime challenge-completion counter on the
        // per-user challenge row (needed by the daily-challenge achievements)
        if version < 2 {
            let has_column: bool = conn
                .prepare("SELECT COUNT(*) FROM pragma_table_info('user_daily_challenges') WHERE name = 'completed_total'")
                .and_then(|mut s| s.query_row([], |r| r.get::<_, i32>(0)))
                .map(|c| c > 0)
                .unwrap_or(false);

            if !has_column {
                conn.execute_batch(
                    "ALTER TABLE user_daily_challenges ADD COLUMN completed_total INTEGER NOT NULL DEFAULT 0;",
                )?;
            }
            conn.execute("INSERT OR REPLACE INTO schema_version VALUES (2)", [])?;
        }

        Ok(())
    }

    /// Upsert the code-defined achievement catalog into the achievements
    /// table so awards can join against titles and rewards.
    fn sync_achievement_catalog(&self) -> Result<()> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            r#"INSERT INTO achievements (slug, title, description, points_reward)
               VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT(slug) DO UPDATE SET
                   title = ?2, description = ?3, points_reward = ?4"#,
        )?;
        for def in CATALOG {
            stmt.execute((def.slug.as_str(), def.title, def.description, def.points_reward))?;
        }
        Ok(())
    }
}

/// SQL schema for the progress database
const SCHEMA_SQL: &str = r#"
-- Users (identity only; authentication lives outside this crate)
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    is_active INTEGER NOT NULL DEFAULT 1
);

-- Points profile, one per user
CREATE TABLE IF NOT EXISTS profiles (
    user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
    total_points INTEGER NOT NULL DEFAULT 0 CHECK (total_points >= 0)
);

-- Course catalog
CREATE TABLE IF NOT EXISTS sections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    slug TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    position INTEGER NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS lessons (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    section_id INTEGER NOT NULL REFERENCES sections(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    points_value INTEGER NOT NULL DEFAULT 10,
    lesson_type TEXT NOT NULL DEFAULT 'Lesson',
    url TEXT,
    position INTEGER NOT NULL,
    UNIQUE (section_id, position)
);
CREATE INDEX IF NOT EXISTS idx_lessons_section ON lessons(section_id);

-- Completions: at most one per (user, lesson)
CREATE TABLE IF NOT EXISTS completions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    lesson_id INTEGER NOT NULL REFERENCES lessons(id) ON DELETE CASCADE,
    completed_at INTEGER NOT NULL,
    completed_on TEXT NOT NULL,
    UNIQUE (user_id, lesson_id)
);
CREATE INDEX IF NOT EXISTS idx_completions_user ON completions(user_id);
CREATE INDEX IF NOT EXISTS idx_completions_user_day ON completions(user_id, completed_on);

-- Streaks, one row per user
CREATE TABLE IF NOT EXISTS streaks (
    user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
    current_streak INTEGER NOT NULL DEFAULT 0,
    longest_streak INTEGER NOT NULL DEFAULT 0,
    last_activity_date TEXT
);

-- Achievement catalog (synced from code definitions at open)
CREATE TABLE IF NOT EXISTS achievements (
    slug TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    points_reward INTEGER NOT NULL DEFAULT 0
);

-- Earned achievements: at most one per (user, achievement)
CREATE TABLE IF NOT EXISTS user_achievements (
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    slug TEXT NOT NULL,
    awarded_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, slug)
);

-- Daily challenge catalog
CREATE TABLE IF NOT EXISTS daily_challenges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    challenge_type TEXT NOT NULL,
    target_value INTEGER NOT NULL DEFAULT 1,
    points_reward INTEGER NOT NULL DEFAULT 20,
    is_active INTEGER NOT NULL DEFAULT 1
);

-- One challenge record per user, replaced in place each new day
CREATE TABLE IF NOT EXISTS user_daily_challenges (
    user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
    challenge_id INTEGER REFERENCES daily_challenges(id) ON DELETE SET NULL,
    assigned_date TEXT NOT NULL,
    completed_date TEXT,
    current_progress INTEGER NOT NULL DEFAULT 0,
    initial_points INTEGER,
    completed_total INTEGER NOT NULL DEFAULT 0
);

-- Schema version
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (2);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_init() {
        let db = ProgressDb::open_in_memory().unwrap();

        let conn = db.conn();
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap();
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        for expected in [
            "users",
            "profiles",
            "sections",
            "lessons",
            "completions",
            "streaks",
            "achievements",
            "user_achievements",
            "daily_challenges",
            "user_daily_challenges",
        ] {
            assert!(tables.contains(&expected.to_string()), "missing table {expected}");
        }
    }

    #[test]
    fn test_catalog_synced() {
        let db = ProgressDb::open_in_memory().unwrap();
        let conn = db.conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM achievements", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count as usize, CATALOG.len());
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test_progress.db");
        let db = ProgressDb::open(&db_path).unwrap();

        // Re-open is idempotent
        drop(db);
        ProgressDb::open(&db_path).unwrap();
    }
}
