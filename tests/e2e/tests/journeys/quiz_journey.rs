//! Quiz journeys: sessions driving the scheduler against a real database

use chrono::{Days, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use refrain_core::analytics::{mastery_distribution, reconstruct_mastery, ProblemItemsPolicy};
use refrain_core::{
    FixedItems, Outcome, QuizMode, QuizSession, RoundState, SessionConfig, SessionError,
    TIMEOUT_LATENCY,
};
use refrain_e2e_tests::{TestDataFactory, TestDatabaseManager};
use std::sync::Arc;

fn day0() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
}

fn plus(days: u64) -> NaiveDate {
    day0().checked_add_days(Days::new(days)).unwrap()
}

fn play_round(session: &mut QuizSession, outcome: Outcome, latency: Option<f64>) {
    let handle = session.begin_round().unwrap();
    match latency {
        Some(secs) => assert!(handle.reveal_with_latency(secs)),
        None => assert!(handle.presentation_finished()),
    }
    assert_eq!(session.round_state(), RoundState::Answering);
    session.submit_outcome(outcome).unwrap();
}

#[test]
fn test_standard_session_reschedules_every_song() {
    let db = TestDatabaseManager::new_temp_on(day0());
    let ids = db.seed_songs(3);

    let mut session = db.start_session(QuizMode::Standard, day0()).unwrap();
    assert_eq!(session.progress(), (0, 3));

    let order = session.items().to_vec();
    play_round(&mut session, Outcome::Correct, Some(1.0));
    play_round(&mut session, Outcome::Incorrect, Some(2.0));
    play_round(&mut session, Outcome::Correct, None);

    assert!(session.is_finished());
    assert_eq!(session.score(), 2);

    let first = db.storage.get_scheduling_state(order[0]).unwrap().unwrap();
    assert_eq!(first.current_interval_days, 4);
    assert_eq!(first.next_due_date, plus(4));

    let missed = db.storage.get_scheduling_state(order[1]).unwrap().unwrap();
    assert_eq!(missed.current_interval_days, 1);
    assert!((missed.ease_factor - 2.3).abs() < 1e-9);
    assert_eq!(missed.next_due_date, plus(1));

    let events = db.storage.snapshot_all_events().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[2].latency_seconds, TIMEOUT_LATENCY);
    assert!(events.iter().all(|e| ids.contains(&e.item_id)));

    // Next day only the missed song is due
    let tomorrow = db.start_session(QuizMode::Standard, plus(1)).unwrap();
    assert_eq!(tomorrow.items(), &[order[1]]);
}

#[test]
fn test_challenge_when_nothing_due() {
    let db = TestDatabaseManager::new_temp_on(day0());
    db.seed_songs(30);

    let mut session = db.start_session(QuizMode::Standard, day0()).unwrap();
    while !session.is_finished() {
        play_round(&mut session, Outcome::Correct, Some(4.0));
    }

    assert!(matches!(
        db.start_session(QuizMode::Standard, plus(1)),
        Err(SessionError::NoEligibleItems {
            mode: QuizMode::Standard
        })
    ));

    let challenge = db.start_session(QuizMode::Challenge, plus(1)).unwrap();
    assert_eq!(challenge.items().len(), 20);

    let small = db
        .factory_on(plus(1))
        .with_config(SessionConfig {
            challenge_item_count: 5,
        })
        .start_session(QuizMode::Challenge, &mut ChaCha8Rng::seed_from_u64(1))
        .unwrap();
    assert_eq!(small.items().len(), 5);
}

#[test]
fn test_gauntlet_over_problem_songs() {
    let db = TestDatabaseManager::new_temp_on(day0());
    let scenario = TestDataFactory::create_problem_songs_scenario(&db.storage, plus(10));

    let policy = ProblemItemsPolicy::new(db.storage.clone(), 2, 4);
    let mut session = db
        .factory_on(plus(10))
        .with_gauntlet_policy(Arc::new(policy))
        .start_session(QuizMode::Gauntlet, &mut ChaCha8Rng::seed_from_u64(3))
        .unwrap();

    let expected: Vec<_> = ["A", "C", "D", "B"].iter().map(|l| scenario.id(l)).collect();
    assert_eq!(session.items(), expected.as_slice());

    play_round(&mut session, Outcome::Correct, Some(2.0));
    while !session.is_finished() {
        play_round(&mut session, Outcome::Incorrect, Some(6.0));
    }

    assert_eq!(session.score(), 1);
    assert_eq!(
        session.failed_items(),
        &[scenario.id("C"), scenario.id("D"), scenario.id("B")]
    );

    // Retry the misses
    let retry = db
        .factory_on(plus(10))
        .with_gauntlet_policy(Arc::new(FixedItems(session.failed_items().to_vec())))
        .start_session(QuizMode::Gauntlet, &mut ChaCha8Rng::seed_from_u64(3))
        .unwrap();
    assert_eq!(retry.items().len(), 3);
}

#[test]
fn test_song_removed_mid_session() {
    let db = TestDatabaseManager::new_temp_on(day0());
    db.seed_songs(2);

    let mut session = db.start_session(QuizMode::Standard, day0()).unwrap();
    let doomed = session.current_item_id().unwrap();
    assert!(db.storage.delete_item(doomed).unwrap());

    assert!(session.current_item().unwrap().is_none());
    play_round(&mut session, Outcome::Correct, Some(1.5));
    assert_eq!(session.progress(), (1, 2));

    // The outcome is still in the log
    assert_eq!(db.storage.get_item_events(doomed).unwrap().len(), 1);
    assert!(db.storage.get_scheduling_state(doomed).unwrap().is_none());
}

#[test]
fn test_abort_keeps_only_submitted_rounds() {
    let db = TestDatabaseManager::new_temp_on(day0());
    db.seed_songs(3);

    let mut session = db.start_session(QuizMode::Standard, day0()).unwrap();
    play_round(&mut session, Outcome::Correct, Some(1.0));

    let handle = session.begin_round().unwrap();
    handle.reveal_with_latency(2.0);
    session.abort();

    assert_eq!(db.storage.snapshot_all_events().unwrap().len(), 1);
    assert_eq!(db.storage.get_due_item_ids(day0()).unwrap().len(), 2);
}

/// Two months of daily reviews: replaying the log must land on the same
/// mastered count as the live schedule
#[test]
fn test_replay_agrees_with_live_schedule() {
    let db = TestDatabaseManager::new_temp_on(day0());
    db.seed_songs(12);
    let mut outcomes = ChaCha8Rng::seed_from_u64(2024);

    let last_day = plus(60);
    for offset in 0..=60 {
        let day = plus(offset);
        let mut session = match db.start_session(QuizMode::Standard, day) {
            Ok(session) => session,
            Err(SessionError::NoEligibleItems { .. }) => continue,
            Err(e) => panic!("unexpected error: {e}"),
        };

        while !session.is_finished() {
            let outcome = Outcome::from(outcomes.gen_bool(0.8));
            let latency = outcomes.gen_range(0.5..6.0);
            play_round(&mut session, outcome, Some(latency));
        }
    }

    let live = mastery_distribution(db.storage.as_ref()).unwrap();
    let replayed = reconstruct_mastery(db.storage.as_ref(), db.storage.as_ref(), 1, last_day).unwrap();

    assert_eq!(replayed.len(), 1);
    assert_eq!(replayed[0].date, last_day);
    assert_eq!(replayed[0].mastered, live.mastered);
    assert_eq!(live.total(), 12);
}
