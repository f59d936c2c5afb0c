//! # Refrain Core
//!
//! Song memorization engine. Learn to name a song from a short excerpt through
//! spaced, repeated quizzing:
//!
//! - **Scheduling**: interval/ease spaced repetition with a fixed first step and
//!   a speed bonus for fast recognition
//! - **Quiz Sessions**: Standard (due songs), Challenge (random sample) and
//!   Gauntlet (injected item set) with a first-trigger-wins reveal
//! - **Analytics**: problem-song ranking, mastery history rebuilt by replaying
//!   the review log, mastery buckets and daily practice counts
//! - **Storage**: SQLite song library, scheduling state and append-only play history
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use refrain_core::prelude::*;
//! use std::sync::Arc;
//!
//! let storage = Arc::new(Storage::new(None)?);
//! storage.add_item(NewItem {
//!     title: "Hey Jude".to_string(),
//!     artist: "The Beatles".to_string(),
//!     local_filename: "hey_jude.mp3".to_string(),
//!     ..Default::default()
//! })?;
//!
//! let factory = SessionFactory::new(storage.clone(), storage.clone());
//! let mut session = factory.start_session(QuizMode::Standard, &mut rand::thread_rng())?;
//! let reveal = session.begin_round()?;
//! reveal.reveal();
//! session.submit_outcome(Outcome::Correct)?;
//!
//! let problems = rank_problem_items(storage.as_ref(), 2, 10)?;
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod analytics;
pub mod clock;
pub mod config;
pub mod library;
pub mod scheduling;
pub mod session;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Scheduling engine
pub use scheduling::{
    advance, qualifies_for_speed_bonus, round_half_even, MasteryLevel, Outcome, SchedulingState,
    DEFAULT_EASE_FACTOR, DEFAULT_INTERVAL_DAYS, MASTERED_INTERVAL_DAYS, MIN_EASE_FACTOR,
    TIMEOUT_LATENCY,
};

// Library types
pub use library::{
    discover_new_files, ItemId, LearningItem, LibraryStats, NewItem, ReviewEvent,
};

// Storage layer
pub use storage::{ItemStore, Result, ReviewLog, Storage, StorageError};

// Quiz sessions
pub use session::{
    FixedItems, GauntletPolicy, QuizMode, QuizSession, RevealHandle, RoundState, RoundSummary,
    SessionConfig, SessionError, SessionFactory,
};

// Analytics
pub use analytics::{
    mastery_distribution, practice_history, rank_problem_items, reconstruct_mastery,
    DailyPractice, MasteryDistribution, MasteryPoint, ProblemItem, ProblemItemsPolicy,
};

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, RefrainConfig};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        mastery_distribution, practice_history, rank_problem_items, reconstruct_mastery, Clock,
        ItemStore, LearningItem, NewItem, Outcome, QuizMode, QuizSession, RefrainConfig, Result,
        ReviewLog, SchedulingState, SessionError, SessionFactory, Storage, StorageError,
        SystemClock,
    };
}
