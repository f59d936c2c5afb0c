//! Problem-Item Ranker
//!
//! Finds the songs the learner keeps missing. Events are grouped per item in
//! log order, then each item is scored by its trailing run of misses (the loss
//! streak) and its overall hit rate.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::library::{ItemId, ReviewEvent};
use crate::scheduling::Outcome;
use crate::session::GauntletPolicy;
use crate::storage::{Result, ReviewLog, StorageError};

/// Default eligibility threshold for ranking
pub const DEFAULT_MIN_ATTEMPTS: u32 = 2;

/// One ranked problem item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemItem {
    pub item_id: ItemId,
    /// Misses since the last correct answer, or all attempts if never correct
    pub loss_streak: u32,
    /// correct / attempts
    pub success_rate: f64,
    pub attempts: u32,
}

#[derive(Debug, Default)]
struct Tally {
    attempts: u32,
    correct: u32,
    trailing_misses: u32,
}

impl Tally {
    fn record(&mut self, outcome: Outcome) {
        self.attempts += 1;
        match outcome {
            Outcome::Correct => {
                self.correct += 1;
                self.trailing_misses = 0;
            }
            Outcome::Incorrect => self.trailing_misses += 1,
        }
    }
}

/// Rank items from a chronologically ordered event slice.
///
/// Items with fewer than `min_attempts` attempts are left out. Ordering is loss
/// streak descending, success rate ascending, then item id ascending.
pub fn rank_events(events: &[ReviewEvent], min_attempts: u32, limit: usize) -> Vec<ProblemItem> {
    let mut tallies: HashMap<ItemId, Tally> = HashMap::new();
    for event in events {
        tallies.entry(event.item_id).or_default().record(event.outcome);
    }

    let mut ranked: Vec<ProblemItem> = tallies
        .into_iter()
        .filter(|(_, t)| t.attempts >= min_attempts)
        .map(|(item_id, t)| ProblemItem {
            item_id,
            // Never correct: the trailing run is the whole history
            loss_streak: t.trailing_misses,
            success_rate: f64::from(t.correct) / f64::from(t.attempts),
            attempts: t.attempts,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.loss_streak
            .cmp(&a.loss_streak)
            .then_with(|| a.success_rate.total_cmp(&b.success_rate))
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    ranked.truncate(limit);
    ranked
}

/// Rank problem items over a single snapshot of the review log
pub fn rank_problem_items(
    log: &dyn ReviewLog,
    min_attempts: u32,
    limit: usize,
) -> Result<Vec<ProblemItem>> {
    let events = log.snapshot_all_events()?;
    Ok(rank_events(&events, min_attempts, limit))
}

/// Gauntlet item set: the current top problem items, worst first
pub struct ProblemItemsPolicy {
    log: Arc<dyn ReviewLog>,
    min_attempts: u32,
    limit: usize,
}

impl ProblemItemsPolicy {
    pub fn new(log: Arc<dyn ReviewLog>, min_attempts: u32, limit: usize) -> Self {
        Self {
            log,
            min_attempts,
            limit,
        }
    }
}

impl GauntletPolicy for ProblemItemsPolicy {
    fn select_items(&self) -> std::result::Result<Vec<ItemId>, StorageError> {
        let ranked = rank_problem_items(self.log.as_ref(), self.min_attempts, self.limit)?;
        Ok(ranked.into_iter().map(|p| p.item_id).collect())
    }
}
