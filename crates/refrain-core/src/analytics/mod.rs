//! Review-log analytics
//!
//! Read-only batch computations over the review log. Each operation takes one
//! snapshot of the log up front, so quiz rounds recorded while it runs are
//! neither double counted nor half seen.
//!
//! - [`rank_problem_items`]: songs with the longest current run of misses
//! - [`reconstruct_mastery`]: mastered count per day, rebuilt by replay
//! - [`mastery_distribution`]: current items per mastery bucket
//! - [`practice_history`]: attempts and correct answers per day

mod history;
mod mastery;
mod problems;

pub use history::{practice_history, tally_practice, DailyPractice};
pub use mastery::{
    mastery_distribution, reconstruct_mastery, replay_mastery, MasteryDistribution, MasteryPoint,
};
pub use problems::{
    rank_events, rank_problem_items, ProblemItem, ProblemItemsPolicy, DEFAULT_MIN_ATTEMPTS,
};
