//! Test Database Manager
//!
//! Provides isolated library databases for testing:
//! - Temporary databases that are automatically cleaned up
//! - Pre-seeded song libraries
//! - Session factories pinned to a chosen day

use chrono::NaiveDate;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use refrain_core::{
    FixedClock, ItemId, NewItem, QuizMode, QuizSession, SessionConfig, SessionError,
    SessionFactory, Storage,
};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Manager for test databases
///
/// Each manager owns its own SQLite file in a temporary directory, removed
/// when the manager is dropped.
///
/// # Example
///
/// ```rust,ignore
/// let db = TestDatabaseManager::new_temp_on(day);
/// let ids = db.seed_songs(5);
/// let mut session = db.start_session(QuizMode::Standard, day)?;
/// ```
pub struct TestDatabaseManager {
    /// The storage instance
    pub storage: Arc<Storage>,
    /// Temporary directory (kept alive to prevent premature deletion)
    _temp_dir: Option<TempDir>,
    /// Path to the database file
    db_path: PathBuf,
    /// Day songs are created on
    created_on: NaiveDate,
}

impl TestDatabaseManager {
    /// Create a new test database whose songs are created on 2024-01-01
    pub fn new_temp() -> Self {
        Self::new_temp_on(NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"))
    }

    /// Create a new test database whose songs are created on `created_on`
    pub fn new_temp_on(created_on: NaiveDate) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test_refrain.db");

        let storage = Storage::with_clock(Some(db_path.clone()), Arc::new(FixedClock::on(created_on)))
            .expect("Failed to create test storage");

        Self {
            storage: Arc::new(storage),
            _temp_dir: Some(temp_dir),
            db_path,
            created_on,
        }
    }

    /// Get the database path
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    pub fn created_on(&self) -> NaiveDate {
        self.created_on
    }

    /// Get the number of songs in the library
    pub fn song_count(&self) -> i64 {
        self.storage
            .get_stats(self.created_on)
            .map(|s| s.total_items)
            .unwrap_or(0)
    }

    /// Open a second handle on the same file, as a separate process would
    pub fn reopen(&self) -> Storage {
        Storage::new(Some(self.db_path.clone())).expect("Failed to reopen test storage")
    }

    // ========================================================================
    // SEEDING METHODS
    // ========================================================================

    /// Seed the library with `count` songs
    pub fn seed_songs(&self, count: usize) -> Vec<ItemId> {
        (0..count)
            .filter_map(|i| {
                self.storage
                    .add_item(NewItem {
                        title: format!("Song {}", i),
                        artist: format!("Artist {}", i % 3),
                        release_year: Some(1970 + (i as i32 % 50)),
                        genre: Some(["rock", "pop", "jazz"][i % 3].to_string()),
                        local_filename: format!("song_{:03}.mp3", i),
                        ..Default::default()
                    })
                    .ok()
                    .map(|item| item.id)
            })
            .collect()
    }

    // ========================================================================
    // SESSIONS
    // ========================================================================

    /// Session factory whose "today" is `day`
    pub fn factory_on(&self, day: NaiveDate) -> SessionFactory {
        SessionFactory::new(self.storage.clone(), self.storage.clone())
            .with_clock(Arc::new(FixedClock::on(day)))
    }

    /// Start a session on `day` with a fixed shuffle seed
    pub fn start_session(&self, mode: QuizMode, day: NaiveDate) -> Result<QuizSession, SessionError> {
        self.factory_on(day)
            .with_config(SessionConfig::default())
            .start_session(mode, &mut ChaCha8Rng::seed_from_u64(0xFEED))
    }
}
