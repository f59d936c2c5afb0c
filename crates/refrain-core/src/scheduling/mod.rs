//! Scheduling Engine
//!
//! Interval/ease spaced repetition tuned for recognising songs from a short
//! excerpt. After every quiz round the item's state moves by one step:
//!
//! - First correct answer: interval jumps from 1 to a fixed 4 days
//! - Later correct answers: `interval * ease`, with a 1.2x bonus when the
//!   learner revealed in under three seconds
//! - Incorrect answer: interval back to 1 day, ease reduced by 0.2 (floor 1.3)
//!
//! The rule is a pure function of (state, outcome, latency, date), which lets the
//! same code drive live reviews and the historical mastery replay.

mod engine;
mod state;

pub use engine::{
    advance, qualifies_for_speed_bonus, round_half_even, DEFAULT_EASE_FACTOR,
    DEFAULT_INTERVAL_DAYS, EASE_PENALTY, FIRST_SUCCESS_INTERVAL_DAYS, LEARNING_INTERVAL_DAYS,
    MASTERED_INTERVAL_DAYS, MIN_EASE_FACTOR, SPEED_BONUS_MULTIPLIER, SPEED_BONUS_THRESHOLD_SECS,
    TIMEOUT_LATENCY,
};
pub use state::{MasteryLevel, Outcome, SchedulingState};
