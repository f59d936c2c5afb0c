//! Scheduling state carried by every item in the library.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::engine::{
    DEFAULT_EASE_FACTOR, DEFAULT_INTERVAL_DAYS, LEARNING_INTERVAL_DAYS, MASTERED_INTERVAL_DAYS,
};

// ============================================================================
// OUTCOME
// ============================================================================

/// Result of a single quiz round as judged by the learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The learner identified the item
    Correct,
    /// The learner failed to identify the item
    Incorrect,
}

impl Outcome {
    pub fn is_correct(self) -> bool {
        matches!(self, Outcome::Correct)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Correct => "correct",
            Outcome::Incorrect => "incorrect",
        }
    }
}

impl From<bool> for Outcome {
    fn from(was_correct: bool) -> Self {
        if was_correct {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// SCHEDULING STATE
// ============================================================================

/// Per-item scheduling state (1:1 with a library item)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingState {
    /// Days until the next review after the last applied outcome (>= 1)
    pub current_interval_days: u32,
    /// Interval growth multiplier (>= 1.3 after any incorrect answer)
    pub ease_factor: f64,
    /// Date on which the item becomes due again
    pub next_due_date: NaiveDate,
}

impl SchedulingState {
    /// Library defaults for a freshly added item: due on its creation date
    pub fn new_item(created_on: NaiveDate) -> Self {
        Self {
            current_interval_days: DEFAULT_INTERVAL_DAYS,
            ease_factor: DEFAULT_EASE_FACTOR,
            next_due_date: created_on,
        }
    }

    /// Whether the item is due for review on `as_of`
    pub fn is_due(&self, as_of: NaiveDate) -> bool {
        self.next_due_date <= as_of
    }

    pub fn is_mastered(&self) -> bool {
        self.current_interval_days >= MASTERED_INTERVAL_DAYS
    }

    pub fn mastery_level(&self) -> MasteryLevel {
        MasteryLevel::from_interval(self.current_interval_days)
    }
}

// ============================================================================
// MASTERY LEVEL
// ============================================================================

/// Coarse bucket of an item's current interval, used by the dashboard views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryLevel {
    /// Interval below 7 days
    NotYetLearned,
    /// Interval of 7 to 29 days
    Learning,
    /// Interval of 30 days or more
    Mastered,
}

impl MasteryLevel {
    pub fn from_interval(interval_days: u32) -> Self {
        if interval_days >= MASTERED_INTERVAL_DAYS {
            MasteryLevel::Mastered
        } else if interval_days >= LEARNING_INTERVAL_DAYS {
            MasteryLevel::Learning
        } else {
            MasteryLevel::NotYetLearned
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MasteryLevel::NotYetLearned => "Not Yet Learned",
            MasteryLevel::Learning => "Learning",
            MasteryLevel::Mastered => "Mastered",
        }
    }
}

impl std::fmt::Display for MasteryLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
