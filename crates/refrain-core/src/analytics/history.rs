//! Practice history - attempts and correct answers per day

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::library::ReviewEvent;
use crate::storage::{Result, ReviewLog};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPractice {
    pub date: NaiveDate,
    pub attempts: u32,
    pub correct: u32,
}

impl DailyPractice {
    pub fn accuracy(&self) -> Option<f64> {
        (self.attempts > 0).then(|| f64::from(self.correct) / f64::from(self.attempts))
    }
}

/// Count events per date for the `days` dates ending at `today`.
///
/// Dates with no practice are present with zero counts.
pub fn tally_practice(events: &[ReviewEvent], days: u32, today: NaiveDate) -> Vec<DailyPractice> {
    if days == 0 {
        return Vec::new();
    }
    let Some(start) = today.checked_sub_days(Days::new(u64::from(days - 1))) else {
        return Vec::new();
    };

    let mut series: Vec<DailyPractice> = start
        .iter_days()
        .take(days as usize)
        .map(|date| DailyPractice {
            date,
            attempts: 0,
            correct: 0,
        })
        .collect();

    for event in events {
        let date = event.date();
        if date < start || date > today {
            continue;
        }
        let offset = (date - start).num_days() as usize;
        if let Some(day) = series.get_mut(offset) {
            day.attempts += 1;
            if event.outcome.is_correct() {
                day.correct += 1;
            }
        }
    }

    series
}

/// Daily practice counts from one snapshot of the review log
pub fn practice_history(log: &dyn ReviewLog, days: u32, today: NaiveDate) -> Result<Vec<DailyPractice>> {
    let events = log.snapshot_all_events()?;
    Ok(tally_practice(&events, days, today))
}
