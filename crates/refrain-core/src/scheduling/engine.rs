//! The interval/ease update rule.

use chrono::{Days, NaiveDate};

use super::state::{Outcome, SchedulingState};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Interval assigned to a new item, and after any incorrect answer
pub const DEFAULT_INTERVAL_DAYS: u32 = 1;
/// Ease factor assigned to a new item
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;
/// Floor applied to the ease factor on the incorrect-answer path
pub const MIN_EASE_FACTOR: f64 = 1.3;
/// Ease reduction per incorrect answer
pub const EASE_PENALTY: f64 = 0.2;
/// Fixed interval after the first successful review
pub const FIRST_SUCCESS_INTERVAL_DAYS: u32 = 4;
/// Multiplier applied to the interval for a fast reveal
pub const SPEED_BONUS_MULTIPLIER: f64 = 1.2;
/// Reveals strictly faster than this (and strictly positive) earn the speed bonus
pub const SPEED_BONUS_THRESHOLD_SECS: f64 = 3.0;
/// Latency recorded when the presentation ended before the learner revealed
pub const TIMEOUT_LATENCY: f64 = -1.0;
/// Lower bound of the "learning" bucket
pub const LEARNING_INTERVAL_DAYS: u32 = 7;
/// Items at or above this interval count as mastered
pub const MASTERED_INTERVAL_DAYS: u32 = 30;

// ============================================================================
// UPDATE RULE
// ============================================================================

/// Round to the nearest integer, ties to even.
///
/// Both the base interval and the speed-bonus interval go through this, so
/// `62.5` becomes `62` and `63.5` becomes `64`.
pub fn round_half_even(value: f64) -> f64 {
    value.round_ties_even()
}

/// Whether a reveal latency earns the speed bonus.
///
/// Non-positive values (the timeout sentinel included) never qualify, and
/// `3.0` exactly does not either.
pub fn qualifies_for_speed_bonus(latency_seconds: f64) -> bool {
    latency_seconds > 0.0 && latency_seconds < SPEED_BONUS_THRESHOLD_SECS
}

/// Apply one quiz outcome to a scheduling state.
///
/// Pure and total: no I/O, no clock reads, no failure path. `as_of` is the
/// date the outcome happened on; live sessions pass today, the mastery replay
/// passes each historical event's own date.
///
/// The ease factor is only floored on the incorrect path. A state whose ease
/// already sits below the floor keeps it through correct answers.
pub fn advance(
    state: &SchedulingState,
    outcome: Outcome,
    latency_seconds: f64,
    as_of: NaiveDate,
) -> SchedulingState {
    let (interval, ease_factor) = match outcome {
        Outcome::Correct => (
            next_correct_interval(state.current_interval_days, state.ease_factor, latency_seconds),
            state.ease_factor,
        ),
        Outcome::Incorrect => (
            DEFAULT_INTERVAL_DAYS,
            (state.ease_factor - EASE_PENALTY).max(MIN_EASE_FACTOR),
        ),
    };

    SchedulingState {
        current_interval_days: interval,
        ease_factor,
        next_due_date: as_of
            .checked_add_days(Days::new(u64::from(interval)))
            .unwrap_or(NaiveDate::MAX),
    }
}

fn next_correct_interval(current_interval_days: u32, ease_factor: f64, latency_seconds: f64) -> u32 {
    if current_interval_days == DEFAULT_INTERVAL_DAYS {
        // First confirmation: fixed step, no speed bonus
        return FIRST_SUCCESS_INTERVAL_DAYS;
    }

    let base = round_half_even(f64::from(current_interval_days) * ease_factor);
    let interval = if qualifies_for_speed_bonus(latency_seconds) {
        round_half_even(base * SPEED_BONUS_MULTIPLIER)
    } else {
        base
    };

    // Float-to-int casts saturate; a corrupted ease can still never push the interval below 1
    (interval as u32).max(DEFAULT_INTERVAL_DAYS)
}

// ============================================================================
// TESTS
// ============================================================================
