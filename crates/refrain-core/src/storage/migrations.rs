//! Database Migrations
//!
//! Schema migration definitions for the storage layer.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: songs, scheduling state, play history",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Review log and due-date indexes for analytics",
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
CREATE TABLE IF NOT EXISTS songs (
    song_id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    artist TEXT NOT NULL,
    release_year INTEGER,
    language TEXT,
    genre TEXT,
    local_filename TEXT NOT NULL UNIQUE,
    spotify_id TEXT UNIQUE,
    created_at TEXT NOT NULL
);

-- Scheduling state, 1:1 with songs, removed together with its song
CREATE TABLE IF NOT EXISTS spaced_repetition (
    song_id INTEGER PRIMARY KEY REFERENCES songs(song_id) ON DELETE CASCADE,
    current_interval_days INTEGER NOT NULL DEFAULT 1,
    ease_factor REAL NOT NULL DEFAULT 2.5,
    next_review_date TEXT NOT NULL
);

-- Append-only review log. No foreign key: history outlives deleted songs.
CREATE TABLE IF NOT EXISTS play_history (
    history_id INTEGER PRIMARY KEY AUTOINCREMENT,
    song_id INTEGER NOT NULL,
    play_timestamp TEXT NOT NULL,
    was_correct BOOLEAN NOT NULL,
    reaction_time_seconds REAL
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: Indexes for the due query and the chronological log scans
const MIGRATION_V2_UP: &str = r#"
CREATE INDEX IF NOT EXISTS idx_srs_next_review ON spaced_repetition(next_review_date);
CREATE INDEX IF NOT EXISTS idx_history_timestamp ON play_history(play_timestamp);
CREATE INDEX IF NOT EXISTS idx_history_song_timestamp ON play_history(song_id, play_timestamp);

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

/// Apply pending migrations
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
