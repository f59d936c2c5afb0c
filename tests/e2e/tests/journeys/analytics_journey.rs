//! Analytics journeys: reports computed from an on-disk review log

use chrono::{Days, NaiveDate};
use refrain_core::analytics::{
    mastery_distribution, practice_history, rank_problem_items, reconstruct_mastery,
};
use refrain_core::{Outcome, ReviewEvent, SchedulingState};
use refrain_e2e_tests::{TestDataFactory, TestDatabaseManager};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 15).unwrap()
}

fn days_ago(n: u64) -> NaiveDate {
    today().checked_sub_days(Days::new(n)).unwrap()
}

#[test]
fn test_problem_songs_ranking() {
    let db = TestDatabaseManager::new_temp_on(days_ago(30));
    let scenario = TestDataFactory::create_problem_songs_scenario(&db.storage, today());

    let ranked = rank_problem_items(db.storage.as_ref(), 2, 4).unwrap();
    let order: Vec<_> = ranked.iter().map(|p| p.item_id).collect();
    assert_eq!(
        order,
        vec![
            scenario.id("A"),
            scenario.id("C"),
            scenario.id("D"),
            scenario.id("B")
        ]
    );

    assert_eq!(ranked[0].loss_streak, 3);
    assert_eq!(ranked[0].success_rate, 0.25);
    assert_eq!(ranked[1].loss_streak, 2);
    assert_eq!(ranked[1].success_rate, 0.0);
    assert_eq!(ranked[2].attempts, 3);
    assert_eq!(ranked[3].loss_streak, 0);

    let json = serde_json::to_value(&ranked[0]).unwrap();
    assert_eq!(json["lossStreak"], 3);
    assert_eq!(json["attempts"], 4);

    // Raising the bar drops the two-attempt song
    let strict = rank_problem_items(db.storage.as_ref(), 3, 10).unwrap();
    assert!(strict.iter().all(|p| p.item_id != scenario.id("C")));
    assert_eq!(strict.len(), 3);
}

#[test]
fn test_mastery_over_time() {
    let db = TestDatabaseManager::new_temp_on(days_ago(30));
    TestDataFactory::create_mastery_scenario(&db.storage, today());

    let series = reconstruct_mastery(db.storage.as_ref(), db.storage.as_ref(), 3, today()).unwrap();
    let counts: Vec<u32> = series.iter().map(|p| p.mastered).collect();
    assert_eq!(counts, vec![0, 1, 1]);
    assert_eq!(series[0].date, days_ago(2));

    let month = reconstruct_mastery(db.storage.as_ref(), db.storage.as_ref(), 30, today()).unwrap();
    assert_eq!(month.len(), 30);
    assert_eq!(month.last().unwrap().date, today());
    assert_eq!(month.first().unwrap().date, days_ago(29));

    // Same log, same answer
    let again = reconstruct_mastery(db.storage.as_ref(), db.storage.as_ref(), 30, today()).unwrap();
    assert_eq!(month, again);
}

#[test]
fn test_replay_ignores_live_state() {
    let db = TestDatabaseManager::new_temp_on(days_ago(30));
    let scenario = TestDataFactory::create_mastery_scenario(&db.storage, today());

    // Live state was never written by a session; replay must not depend on it
    db.storage
        .set_scheduling_state(
            scenario.id("mastered"),
            &SchedulingState {
                current_interval_days: 200,
                ease_factor: 3.0,
                next_due_date: today(),
            },
        )
        .unwrap();

    let series = reconstruct_mastery(db.storage.as_ref(), db.storage.as_ref(), 3, today()).unwrap();
    assert_eq!(series.iter().map(|p| p.mastered).collect::<Vec<_>>(), vec![0, 1, 1]);

    let live = mastery_distribution(db.storage.as_ref()).unwrap();
    assert_eq!(live.mastered, 1);
}

#[test]
fn test_history_of_removed_song_is_skipped_in_replay() {
    let db = TestDatabaseManager::new_temp_on(days_ago(30));
    let scenario = TestDataFactory::create_mastery_scenario(&db.storage, today());
    db.storage.delete_item(scenario.id("mastered")).unwrap();

    let series = reconstruct_mastery(db.storage.as_ref(), db.storage.as_ref(), 3, today()).unwrap();
    assert!(series.iter().all(|p| p.mastered == 0));

    // Practice history still counts it
    let history = practice_history(db.storage.as_ref(), 14, today()).unwrap();
    assert_eq!(history.iter().map(|d| d.attempts).sum::<u32>(), 4);
}

#[test]
fn test_practice_history() {
    let db = TestDatabaseManager::new_temp_on(days_ago(30));
    let song = TestDataFactory::create_song(&db.storage, "Daily Tune", "Band");

    for (ago, outcome) in [
        (3, Outcome::Correct),
        (3, Outcome::Incorrect),
        (1, Outcome::Correct),
        (20, Outcome::Correct),
    ] {
        db.storage
            .append_event(&ReviewEvent::new(
                song.id,
                TestDataFactory::at(today(), ago, 19),
                outcome,
                2.0,
            ))
            .unwrap();
    }

    let history = practice_history(db.storage.as_ref(), 7, today()).unwrap();
    assert_eq!(history.len(), 7);
    assert_eq!(history[0].date, days_ago(6));
    assert_eq!(history[6].date, today());

    let three_ago = history.iter().find(|d| d.date == days_ago(3)).unwrap();
    assert_eq!((three_ago.attempts, three_ago.correct), (2, 1));

    let yesterday = history.iter().find(|d| d.date == days_ago(1)).unwrap();
    assert_eq!((yesterday.attempts, yesterday.correct), (1, 1));

    assert_eq!(history.iter().map(|d| d.attempts).sum::<u32>(), 3);
    assert_eq!(history[6].attempts, 0);
}

#[test]
fn test_mastery_distribution_buckets() {
    let db = TestDatabaseManager::new_temp_on(days_ago(30));
    let ids = db.seed_songs(5);

    for (id, interval) in ids.iter().zip([1, 4, 7, 29, 45]) {
        db.storage
            .set_scheduling_state(
                *id,
                &SchedulingState {
                    current_interval_days: interval,
                    ease_factor: 2.5,
                    next_due_date: today(),
                },
            )
            .unwrap();
    }

    let distribution = mastery_distribution(db.storage.as_ref()).unwrap();
    assert_eq!(distribution.not_yet_learned, 2);
    assert_eq!(distribution.learning, 2);
    assert_eq!(distribution.mastered, 1);
}
