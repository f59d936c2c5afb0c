//! Mastery Reconstructor
//!
//! Past scheduling states are not stored, so the mastered-count history is
//! rebuilt by replaying the whole review log through [`advance`], starting
//! every item from library defaults. Events are walked once with a single
//! cursor while the window dates advance, so the cost is linear in events plus
//! days rather than their product.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::library::{ItemId, ReviewEvent};
use crate::scheduling::{advance, MasteryLevel, SchedulingState};
use crate::storage::{ItemStore, Result, ReviewLog};

/// Mastered-item count at the end of one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryPoint {
    pub date: NaiveDate,
    pub mastered: u32,
}

/// Current items per mastery bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryDistribution {
    pub not_yet_learned: u32,
    pub learning: u32,
    pub mastered: u32,
}

impl MasteryDistribution {
    pub fn total(&self) -> u32 {
        self.not_yet_learned + self.learning + self.mastered
    }

    fn add(&mut self, level: MasteryLevel) {
        match level {
            MasteryLevel::NotYetLearned => self.not_yet_learned += 1,
            MasteryLevel::Learning => self.learning += 1,
            MasteryLevel::Mastered => self.mastered += 1,
        }
    }
}

// ============================================================================
// REPLAY
// ============================================================================

/// Replay `events` over `item_ids` and report the mastered count for each of
/// the `window_days` dates ending at `today`, oldest first.
///
/// Events are applied in timestamp order; events sharing a timestamp keep
/// their order in `events`. Events for ids not in `item_ids` are skipped.
pub fn replay_mastery(
    item_ids: &[ItemId],
    events: &[ReviewEvent],
    window_days: u32,
    today: NaiveDate,
) -> Vec<MasteryPoint> {
    if window_days == 0 {
        return Vec::new();
    }

    let Some(start) = today.checked_sub_days(Days::new(u64::from(window_days - 1))) else {
        return Vec::new();
    };

    let mut states: HashMap<ItemId, SchedulingState> = item_ids
        .iter()
        .map(|id| (*id, SchedulingState::new_item(start)))
        .collect();

    let mut ordered: Vec<&ReviewEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.timestamp);

    let mut mastered: u32 = 0;
    let mut cursor = 0;
    let mut skipped = 0usize;
    let mut series = Vec::with_capacity(window_days as usize);

    for date in start.iter_days().take(window_days as usize) {
        while let Some(event) = ordered.get(cursor).filter(|e| e.date() <= date) {
            cursor += 1;

            let Some(state) = states.get_mut(&event.item_id) else {
                skipped += 1;
                continue;
            };

            let was_mastered = state.is_mastered();
            *state = advance(state, event.outcome, event.latency_seconds, event.date());
            match (was_mastered, state.is_mastered()) {
                (false, true) => mastered += 1,
                (true, false) => mastered -= 1,
                _ => {}
            }
        }

        tracing::trace!("Replay {}: {} mastered after {} events", date, mastered, cursor);
        series.push(MasteryPoint { date, mastered });
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} review events for songs no longer in the library", skipped);
    }

    series
}

/// Mastered count per day over the last `window_days` days, from one log
/// snapshot and the current set of library ids
pub fn reconstruct_mastery(
    store: &dyn ItemStore,
    log: &dyn ReviewLog,
    window_days: u32,
    today: NaiveDate,
) -> Result<Vec<MasteryPoint>> {
    let item_ids = store.get_all_item_ids()?;
    let events = log.snapshot_all_events()?;

    tracing::debug!(
        "Reconstructing mastery over {} days from {} events",
        window_days,
        events.len()
    );

    Ok(replay_mastery(&item_ids, &events, window_days, today))
}

/// Bucket every item by its current interval
pub fn mastery_distribution(store: &dyn ItemStore) -> Result<MasteryDistribution> {
    let mut distribution = MasteryDistribution::default();
    for (_, state) in store.get_all_scheduling_states()? {
        distribution.add(state.mastery_level());
    }
    Ok(distribution)
}
