//! Round lifecycle
//!
//! A round goes `Idle -> Playing -> Answering` and back to `Idle`, or to
//! `Finished` after the last item. The `Playing -> Answering` edge is driven by
//! whichever reveal trigger fires first: the learner interrupting playback or
//! the excerpt running out. A [`RevealHandle`] can be handed to a timer thread
//! and an input loop at the same time; only the first trigger is recorded.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use crate::scheduling::{round_half_even, TIMEOUT_LATENCY};

/// Where the current round is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundState {
    /// Waiting for the next item to be presented
    Idle,
    /// Item is being presented, identity hidden
    Playing,
    /// Identity revealed, waiting for the learner's outcome
    Answering,
    /// Every item in the session has been answered
    Finished,
}

impl std::fmt::Display for RoundState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RoundState::Idle => "idle",
            RoundState::Playing => "playing",
            RoundState::Answering => "answering",
            RoundState::Finished => "finished",
        };
        write!(f, "{}", s)
    }
}

/// First-trigger-wins latch for the reveal of one round
///
/// Cloning shares the latch. The captured latency is either the elapsed
/// presentation time in seconds (two decimals) or [`TIMEOUT_LATENCY`].
#[derive(Debug, Clone)]
pub struct RevealHandle {
    started: Instant,
    latency: Arc<OnceLock<f64>>,
}

impl RevealHandle {
    pub(crate) fn start() -> Self {
        Self {
            started: Instant::now(),
            latency: Arc::new(OnceLock::new()),
        }
    }

    /// Learner interrupted the presentation. Returns `false` if the round was
    /// already revealed.
    pub fn reveal(&self) -> bool {
        let elapsed = self.started.elapsed().as_secs_f64();
        self.capture(round_half_even(elapsed * 100.0) / 100.0)
    }

    /// Presentation ran to its natural end without a reveal
    pub fn presentation_finished(&self) -> bool {
        self.capture(TIMEOUT_LATENCY)
    }

    /// Reveal with a latency measured by the presentation collaborator
    pub fn reveal_with_latency(&self, latency_seconds: f64) -> bool {
        self.capture(latency_seconds)
    }

    pub fn is_revealed(&self) -> bool {
        self.latency.get().is_some()
    }

    /// Captured latency, `None` while still playing
    pub fn latency(&self) -> Option<f64> {
        self.latency.get().copied()
    }

    fn capture(&self, latency_seconds: f64) -> bool {
        let won = self.latency.set(latency_seconds).is_ok();
        if !won {
            tracing::trace!("Ignoring reveal trigger, round already revealed");
        }
        won
    }
}
