//! Library journeys: managing songs and surviving restarts

use chrono::NaiveDate;
use refrain_core::{discover_new_files, NewItem, Outcome, QuizMode, StorageError};
use refrain_e2e_tests::{TestDataFactory, TestDatabaseManager};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 4).unwrap()
}

#[test]
fn test_add_list_remove() {
    let db = TestDatabaseManager::new_temp_on(day());
    assert_eq!(db.song_count(), 0);

    let song = TestDataFactory::create_song(&db.storage, "Bohemian Rhapsody", "Queen");
    assert_eq!(song.display_name(), "Bohemian Rhapsody - Queen");
    assert_eq!(song.created_at.date(), day());

    let again = db
        .storage
        .add_item(TestDataFactory::new_song("Bohemian Rhapsody", "Someone Else"));
    assert!(matches!(again, Err(StorageError::Duplicate(_))));

    db.seed_songs(3);
    assert_eq!(db.storage.list_items().unwrap().len(), 4);

    assert!(db.storage.delete_item(song.id).unwrap());
    assert_eq!(db.song_count(), 3);
    assert!(!db.storage.get_all_item_ids().unwrap().contains(&song.id));
}

#[test]
fn test_sessions_survive_reopen() {
    let db = TestDatabaseManager::new_temp_on(day());
    db.seed_songs(2);

    let mut session = db.start_session(QuizMode::Standard, day()).unwrap();
    let first = session.current_item_id().unwrap();
    let handle = session.begin_round().unwrap();
    handle.reveal_with_latency(1.25);
    session.submit_outcome(Outcome::Correct).unwrap();

    let reopened = db.reopen();
    let state = reopened.get_scheduling_state(first).unwrap().unwrap();
    assert_eq!(state.current_interval_days, 4);

    let events = reopened.snapshot_all_events().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].item_id, first);
    assert_eq!(events[0].latency_seconds, 1.25);
    assert_eq!(events[0].timestamp, day().and_hms_opt(12, 0, 0).unwrap());
}

#[test]
fn test_stats_and_backup() {
    let db = TestDatabaseManager::new_temp_on(day());
    db.seed_songs(4);
    db.storage
        .add_item(NewItem {
            title: "Take Five".to_string(),
            artist: "Dave Brubeck".to_string(),
            release_year: Some(1959),
            genre: Some("jazz".to_string()),
            local_filename: "take_five.flac".to_string(),
            spotify_id: Some("1YQWosTIljIvxAgHWTp7KP".to_string()),
            ..Default::default()
        })
        .unwrap();

    let mut session = db.start_session(QuizMode::Standard, day()).unwrap();
    for outcome in [Outcome::Correct, Outcome::Incorrect] {
        let handle = session.begin_round().unwrap();
        handle.presentation_finished();
        session.submit_outcome(outcome).unwrap();
    }

    let stats = db.storage.get_stats(day()).unwrap();
    assert_eq!(stats.total_items, 5);
    assert_eq!(stats.due_items, 3);
    assert_eq!(stats.total_reviews, 2);
    assert_eq!(stats.correct_reviews, 1);

    let backup = db.path().with_file_name("backup.db");
    db.storage.backup_to(&backup).unwrap();

    let restored = refrain_core::Storage::new(Some(backup)).unwrap();
    let restored_stats = restored.get_stats(day()).unwrap();
    assert_eq!(restored_stats.total_items, 5);
    assert_eq!(restored_stats.total_reviews, 2);

    let jazz = restored
        .list_items()
        .unwrap()
        .into_iter()
        .find(|i| i.local_filename == "take_five.flac")
        .unwrap();
    assert_eq!(jazz.release_year, Some(1959));
}

#[test]
fn test_scan_then_add_new_files() {
    let db = TestDatabaseManager::new_temp_on(day());
    TestDataFactory::create_song(&db.storage, "Blue In Green", "Miles Davis");

    let music = tempfile::TempDir::new().unwrap();
    let album = music.path().join("Kind of Blue");
    std::fs::create_dir(&album).unwrap();
    for name in ["Blue_In_Green.MP3", "so_what.flac", "liner_notes.pdf"] {
        std::fs::write(album.join(name), b"").unwrap();
    }

    let known = |db: &TestDatabaseManager| -> Vec<String> {
        db.storage
            .list_items()
            .unwrap()
            .into_iter()
            .map(|i| i.local_filename)
            .collect()
    };

    let found = discover_new_files(music.path(), known(&db)).unwrap();
    assert_eq!(found, vec![album.join("so_what.flac")]);

    let name = found[0].file_name().unwrap().to_string_lossy().into_owned();
    db.storage
        .add_item(NewItem {
            title: "So What".to_string(),
            artist: "Miles Davis".to_string(),
            local_filename: name,
            ..Default::default()
        })
        .unwrap();

    assert!(discover_new_files(music.path(), known(&db)).unwrap().is_empty());
}
