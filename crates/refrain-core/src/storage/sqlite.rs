//! SQLite Storage Implementation
//!
//! Song library, per-song scheduling state and the append-only play history.

use chrono::{NaiveDate, NaiveDateTime};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::clock::{Clock, SystemClock};
use crate::library::{ItemId, LearningItem, LibraryStats, NewItem, ReviewEvent};
use crate::scheduling::{Outcome, SchedulingState, TIMEOUT_LATENCY};

use super::store::{ItemStore, ReviewLog};

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
    /// Item not found
    #[error("Item not found: {0}")]
    NotFound(String),
    /// Unique constraint on filename or external track id
    #[error("Duplicate item: {0}")]
    Duplicate(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// STORAGE
// ============================================================================

/// SQLite-backed item store and review log
///
/// Uses separate reader/writer connections for interior mutability.
/// All methods take `&self`, so `Arc<Storage>` can be shared between a quiz
/// session and analytics running alongside it.
pub struct Storage {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
    clock: Arc<dyn Clock>,
}

impl Storage {
    /// Apply PRAGMAs to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        Ok(())
    }

    /// Open storage at `db_path` (or the platform default) using local time
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        Self::with_clock(db_path, Arc::new(SystemClock))
    }

    /// Open storage with an explicit clock for creation timestamps
    pub fn with_clock(db_path: Option<PathBuf>, clock: Arc<dyn Clock>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        // Open writer connection
        let writer_conn = Connection::open(&path)?;
        Self::configure_connection(&writer_conn)?;

        // Apply migrations on writer only
        super::migrations::apply_migrations(&writer_conn)?;

        // Open reader connection to same path
        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
            clock,
        })
    }

    /// Platform data directory location of the library database
    pub fn default_db_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "refrain", "refrain").ok_or_else(|| {
            StorageError::Init("Could not determine project directories".to_string())
        })?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        Ok(data_dir.join("refrain.db"))
    }

    fn writer(&self) -> Result<MutexGuard<'_, Connection>> {
        self.writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))
    }

    fn reader(&self) -> Result<MutexGuard<'_, Connection>> {
        self.reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))
    }

    // ========================================================================
    // LIBRARY
    // ========================================================================

    /// Add a song together with its default scheduling state (due today)
    pub fn add_item(&self, input: NewItem) -> Result<LearningItem> {
        let now = self.clock.now();
        let state = SchedulingState::new_item(now.date());

        let id = {
            let mut writer = self.writer()?;
            let tx = writer.transaction()?;

            tx.execute(
                "INSERT INTO songs (
                    title, artist, release_year, language, genre,
                    local_filename, spotify_id, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    input.title,
                    input.artist,
                    input.release_year,
                    input.language,
                    input.genre,
                    input.local_filename,
                    input.spotify_id,
                    now,
                ],
            )
            .map_err(|e| duplicate_or_database(e, &input))?;

            let id = tx.last_insert_rowid();

            tx.execute(
                "INSERT INTO spaced_repetition (
                    song_id, current_interval_days, ease_factor, next_review_date
                ) VALUES (?1, ?2, ?3, ?4)",
                params![
                    id,
                    state.current_interval_days,
                    state.ease_factor,
                    state.next_due_date,
                ],
            )?;

            tx.commit()?;
            id
        };

        tracing::debug!("Added song {} ({})", id, input.local_filename);

        self.get_item(id)?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    /// Get a song by id
    pub fn get_item(&self, id: ItemId) -> Result<Option<LearningItem>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT * FROM songs WHERE song_id = ?1")?;

        let item = stmt
            .query_row(params![id], |row| Self::row_to_item(row))
            .optional()?;
        Ok(item)
    }

    /// All songs, ordered by id
    pub fn list_items(&self) -> Result<Vec<LearningItem>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT * FROM songs ORDER BY song_id ASC")?;

        let items = stmt.query_map([], |row| Self::row_to_item(row))?;

        let mut result = Vec::new();
        for item in items {
            result.push(item?);
        }
        Ok(result)
    }

    /// Delete a song. Its scheduling state goes with it; play history stays.
    pub fn delete_item(&self, id: ItemId) -> Result<bool> {
        let writer = self.writer()?;
        let rows = writer.execute("DELETE FROM songs WHERE song_id = ?1", params![id])?;
        Ok(rows > 0)
    }

    /// Convert a row to LearningItem
    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<LearningItem> {
        Ok(LearningItem {
            id: row.get("song_id")?,
            title: row.get("title")?,
            artist: row.get("artist")?,
            release_year: row.get("release_year")?,
            language: row.get("language")?,
            genre: row.get("genre")?,
            local_filename: row.get("local_filename")?,
            spotify_id: row.get("spotify_id")?,
            created_at: row.get("created_at")?,
        })
    }

    // ========================================================================
    // SCHEDULING STATE
    // ========================================================================

    pub fn get_due_item_ids(&self, as_of: NaiveDate) -> Result<Vec<ItemId>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT song_id FROM spaced_repetition
             WHERE next_review_date <= ?1
             ORDER BY song_id ASC",
        )?;

        let ids = stmt.query_map(params![as_of], |row| row.get(0))?;

        let mut result = Vec::new();
        for id in ids {
            result.push(id?);
        }
        Ok(result)
    }

    pub fn get_all_item_ids(&self) -> Result<Vec<ItemId>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT song_id FROM songs ORDER BY song_id ASC")?;

        let ids = stmt.query_map([], |row| row.get(0))?;

        let mut result = Vec::new();
        for id in ids {
            result.push(id?);
        }
        Ok(result)
    }

    pub fn get_scheduling_state(&self, id: ItemId) -> Result<Option<SchedulingState>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT current_interval_days, ease_factor, next_review_date
             FROM spaced_repetition WHERE song_id = ?1",
        )?;

        let state = stmt
            .query_row(params![id], |row| Self::row_to_state(row))
            .optional()?;
        Ok(state)
    }

    pub fn get_all_scheduling_states(&self) -> Result<Vec<(ItemId, SchedulingState)>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT song_id, current_interval_days, ease_factor, next_review_date
             FROM spaced_repetition ORDER BY song_id ASC",
        )?;

        let rows = stmt.query_map([], |row| Ok((row.get("song_id")?, Self::row_to_state(row)?)))?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    pub fn set_scheduling_state(&self, id: ItemId, state: &SchedulingState) -> Result<bool> {
        let writer = self.writer()?;
        let rows = writer.execute(
            "UPDATE spaced_repetition SET
                current_interval_days = ?1,
                ease_factor = ?2,
                next_review_date = ?3
            WHERE song_id = ?4",
            params![
                state.current_interval_days,
                state.ease_factor,
                state.next_due_date,
                id,
            ],
        )?;
        Ok(rows > 0)
    }

    fn row_to_state(row: &rusqlite::Row) -> rusqlite::Result<SchedulingState> {
        Ok(SchedulingState {
            current_interval_days: row.get("current_interval_days")?,
            ease_factor: row.get("ease_factor")?,
            next_due_date: row.get("next_review_date")?,
        })
    }

    // ========================================================================
    // PLAY HISTORY
    // ========================================================================

    pub fn append_event(&self, event: &ReviewEvent) -> Result<i64> {
        let writer = self.writer()?;
        writer.execute(
            "INSERT INTO play_history (song_id, play_timestamp, was_correct, reaction_time_seconds)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                event.item_id,
                event.timestamp,
                event.outcome.is_correct(),
                event.latency_seconds,
            ],
        )?;
        Ok(writer.last_insert_rowid())
    }

    /// Every recorded event, oldest first; same-timestamp events keep insertion order
    pub fn snapshot_all_events(&self) -> Result<Vec<ReviewEvent>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT song_id, play_timestamp, was_correct, reaction_time_seconds
             FROM play_history
             ORDER BY play_timestamp ASC, history_id ASC",
        )?;

        let events = stmt.query_map([], |row| Self::row_to_event(row))?;

        let mut result = Vec::new();
        for event in events {
            result.push(event?);
        }
        Ok(result)
    }

    /// Events for one song, oldest first
    pub fn get_item_events(&self, id: ItemId) -> Result<Vec<ReviewEvent>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT song_id, play_timestamp, was_correct, reaction_time_seconds
             FROM play_history
             WHERE song_id = ?1
             ORDER BY play_timestamp ASC, history_id ASC",
        )?;

        let events = stmt.query_map(params![id], |row| Self::row_to_event(row))?;

        let mut result = Vec::new();
        for event in events {
            result.push(event?);
        }
        Ok(result)
    }

    /// Convert a row to ReviewEvent. A missing reaction time reads back as a timeout.
    fn row_to_event(row: &rusqlite::Row) -> rusqlite::Result<ReviewEvent> {
        let was_correct: bool = row.get("was_correct")?;
        let latency: Option<f64> = row.get("reaction_time_seconds")?;

        Ok(ReviewEvent {
            item_id: row.get("song_id")?,
            timestamp: row.get("play_timestamp")?,
            outcome: Outcome::from(was_correct),
            latency_seconds: latency.unwrap_or(TIMEOUT_LATENCY),
        })
    }

    // ========================================================================
    // STATS & MAINTENANCE
    // ========================================================================

    /// Library counters; "due" is evaluated against `as_of`
    pub fn get_stats(&self, as_of: NaiveDate) -> Result<LibraryStats> {
        let reader = self.reader()?;

        let total_items: i64 =
            reader.query_row("SELECT COUNT(*) FROM songs", [], |row| row.get(0))?;

        let due_items: i64 = reader.query_row(
            "SELECT COUNT(*) FROM spaced_repetition WHERE next_review_date <= ?1",
            params![as_of],
            |row| row.get(0),
        )?;

        let (total_reviews, correct_reviews): (i64, i64) = reader.query_row(
            "SELECT COUNT(*), COALESCE(SUM(was_correct), 0) FROM play_history",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let (oldest_item, newest_item): (Option<NaiveDateTime>, Option<NaiveDateTime>) = reader
            .query_row("SELECT MIN(created_at), MAX(created_at) FROM songs", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;

        let last_review: Option<NaiveDateTime> =
            reader.query_row("SELECT MAX(play_timestamp) FROM play_history", [], |row| {
                row.get(0)
            })?;

        Ok(LibraryStats {
            total_items,
            due_items,
            total_reviews,
            correct_reviews,
            oldest_item,
            newest_item,
            last_review,
        })
    }

    /// Create a consistent backup using VACUUM INTO
    pub fn backup_to(&self, path: &Path) -> Result<()> {
        let path_str = path
            .to_str()
            .ok_or_else(|| StorageError::Init("Invalid backup path encoding".to_string()))?;
        if path_str.bytes().any(|b| b < 0x20 && b != b'\t') {
            return Err(StorageError::Init(
                "Backup path contains invalid characters".to_string(),
            ));
        }
        let reader = self.reader()?;
        // VACUUM INTO doesn't support parameterized queries; escape single quotes
        reader.execute_batch(&format!("VACUUM INTO '{}'", path_str.replace('\'', "''")))?;
        Ok(())
    }
}

/// Map a unique-constraint failure on insert to [`StorageError::Duplicate`]
fn duplicate_or_database(err: rusqlite::Error, input: &NewItem) -> StorageError {
    match err {
        rusqlite::Error::SqliteFailure(ref e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StorageError::Duplicate(format!(
                "a song with filename '{}' or the same Spotify id already exists",
                input.local_filename
            ))
        }
        other => StorageError::Database(other),
    }
}

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

impl ItemStore for Storage {
    fn get_due_item_ids(&self, as_of: NaiveDate) -> Result<Vec<ItemId>> {
        Storage::get_due_item_ids(self, as_of)
    }

    fn get_all_item_ids(&self) -> Result<Vec<ItemId>> {
        Storage::get_all_item_ids(self)
    }

    fn get_scheduling_state(&self, id: ItemId) -> Result<Option<SchedulingState>> {
        Storage::get_scheduling_state(self, id)
    }

    fn get_all_scheduling_states(&self) -> Result<Vec<(ItemId, SchedulingState)>> {
        Storage::get_all_scheduling_states(self)
    }

    fn set_scheduling_state(&self, id: ItemId, state: &SchedulingState) -> Result<bool> {
        Storage::set_scheduling_state(self, id, state)
    }

    fn get_item(&self, id: ItemId) -> Result<Option<LearningItem>> {
        Storage::get_item(self, id)
    }
}

impl ReviewLog for Storage {
    fn append_event(&self, event: &ReviewEvent) -> Result<i64> {
        Storage::append_event(self, event)
    }

    fn snapshot_all_events(&self) -> Result<Vec<ReviewEvent>> {
        Storage::snapshot_all_events(self)
    }
}

// ============================================================================
// TESTS
// ============================================================================
