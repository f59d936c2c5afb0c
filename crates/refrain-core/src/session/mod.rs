//! Quiz sessions
//!
//! A session is a transient walk over an ordered list of item ids chosen by
//! [`QuizMode`]. Each round is presented, revealed (by the learner or by the
//! presentation running out) and answered; the outcome is logged and
//! rescheduled before the session moves on.
//!
//! ```rust,ignore
//! use refrain_core::prelude::*;
//!
//! let storage = Arc::new(Storage::new(None)?);
//! let factory = SessionFactory::new(storage.clone(), storage);
//! let mut session = factory.start_session(QuizMode::Standard, &mut rand::thread_rng())?;
//!
//! while !session.is_finished() {
//!     let handle = session.begin_round()?;
//!     // hand `handle` to the player; the first reveal wins
//!     handle.reveal();
//!     session.submit_outcome(Outcome::Correct)?;
//! }
//! ```

mod controller;
mod mode;
mod round;

pub use controller::{
    FixedItems, GauntletPolicy, QuizSession, RoundSummary, SessionConfig, SessionError,
    SessionFactory, DEFAULT_CHALLENGE_ITEM_COUNT,
};
pub use mode::QuizMode;
pub use round::{RevealHandle, RoundState};
