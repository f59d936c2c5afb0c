//! Test Data Factory
//!
//! Provides utilities for generating test data:
//! - Songs with unique filenames
//! - Play histories written straight into the review log
//! - Pre-built scenarios for the ranking and mastery reports

use chrono::{Days, NaiveDate, NaiveDateTime};
use refrain_core::{ItemId, LearningItem, NewItem, Outcome, ReviewEvent, Storage};
use std::collections::HashMap;

/// Factory for creating test data
pub struct TestDataFactory;

/// Scenario containing related test data
#[derive(Debug)]
pub struct TestScenario {
    /// Songs by scenario label
    pub items: HashMap<String, ItemId>,
    /// Description of the scenario
    pub description: String,
}

impl TestScenario {
    pub fn id(&self, label: &str) -> ItemId {
        self.items[label]
    }
}

impl TestDataFactory {
    // ========================================================================
    // SONGS
    // ========================================================================

    pub fn new_song(title: &str, artist: &str) -> NewItem {
        NewItem {
            title: title.to_string(),
            artist: artist.to_string(),
            local_filename: format!("{}.mp3", title.to_lowercase().replace(' ', "_")),
            ..Default::default()
        }
    }

    pub fn create_song(storage: &Storage, title: &str, artist: &str) -> LearningItem {
        storage
            .add_item(Self::new_song(title, artist))
            .expect("Failed to add song")
    }

    // ========================================================================
    // HISTORY
    // ========================================================================

    /// `days_ago` days before `today`, at `hour:00`
    pub fn at(today: NaiveDate, days_ago: u64, hour: u32) -> NaiveDateTime {
        today
            .checked_sub_days(Days::new(days_ago))
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid timestamp")
    }

    /// Append outcomes for one song, one per hour starting at `start`
    pub fn record_outcomes(storage: &Storage, item_id: ItemId, start: NaiveDateTime, outcomes: &[Outcome]) {
        for (i, outcome) in outcomes.iter().enumerate() {
            let timestamp = start + chrono::Duration::hours(i as i64);
            storage
                .append_event(&ReviewEvent::new(item_id, timestamp, *outcome, 4.0))
                .expect("Failed to append event");
        }
    }

    // ========================================================================
    // SCENARIOS
    // ========================================================================

    /// Four songs whose histories rank A, C, D, B:
    ///
    /// | song | history    | loss streak | success rate |
    /// |------|------------|-------------|--------------|
    /// | A    | W L L L    | 3           | 0.25         |
    /// | B    | L L L W    | 0           | 0.25         |
    /// | C    | L L        | 2           | 0.0          |
    /// | D    | W L L      | 2           | 0.333        |
    pub fn create_problem_songs_scenario(storage: &Storage, today: NaiveDate) -> TestScenario {
        use refrain_core::Outcome::{Correct as W, Incorrect as L};

        let histories: [(&str, Vec<Outcome>); 4] = [
            ("A", vec![W, L, L, L]),
            ("B", vec![L, L, L, W]),
            ("C", vec![L, L]),
            ("D", vec![W, L, L]),
        ];

        let mut items = HashMap::new();
        for (offset, (label, outcomes)) in histories.iter().enumerate() {
            let song = Self::create_song(storage, &format!("Problem {}", label), "Scenario Band");
            Self::record_outcomes(storage, song.id, Self::at(today, 5, 8 + offset as u32), outcomes);
            items.insert(label.to_string(), song.id);
        }

        TestScenario {
            items,
            description: "Problem songs ranked by loss streak then success rate".to_string(),
        }
    }

    /// One song answered correctly (5s, no speed bonus) 10, 5, 2 and 1 days
    /// ago: 1 -> 4 -> 10 -> 25 -> 62, mastered from yesterday on
    pub fn create_mastery_scenario(storage: &Storage, today: NaiveDate) -> TestScenario {
        let song = Self::create_song(storage, "Mastered Tune", "Scenario Band");
        for days_ago in [10, 5, 2, 1] {
            storage
                .append_event(&ReviewEvent::new(
                    song.id,
                    Self::at(today, days_ago, 20),
                    Outcome::Correct,
                    5.0,
                ))
                .expect("Failed to append event");
        }

        let mut items = HashMap::new();
        items.insert("mastered".to_string(), song.id);
        TestScenario {
            items,
            description: "Single song reaching a 62 day interval yesterday".to_string(),
        }
    }
}
