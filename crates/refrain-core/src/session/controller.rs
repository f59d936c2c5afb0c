//! Quiz Session Controller
//!
//! Builds a session's item sequence for a mode, then walks it one round at a
//! time. Each submitted outcome is appended to the review log, run through the
//! scheduling engine and written back to the item store before the session
//! moves on. A failed write leaves position and score untouched.

use chrono::Timelike;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::library::{ItemId, LearningItem, ReviewEvent};
use crate::scheduling::{advance, Outcome, SchedulingState, TIMEOUT_LATENCY};
use crate::storage::{ItemStore, ReviewLog, StorageError};

use super::mode::QuizMode;
use super::round::{RevealHandle, RoundState};

/// Sample size for Challenge mode when nothing else is configured
pub const DEFAULT_CHALLENGE_ITEM_COUNT: usize = 20;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Nothing to quiz on; no session was created
    #[error("No eligible items for a {mode} session")]
    NoEligibleItems { mode: QuizMode },
    #[error("Gauntlet mode needs an item-set policy")]
    GauntletPolicyMissing,
    #[error("Invalid round transition: expected {expected}, round is {actual}")]
    InvalidTransition {
        expected: RoundState,
        actual: RoundState,
    },
    /// Item store or review log write failed; the session did not advance
    #[error("Persistence failed: {0}")]
    Persistence(#[from] StorageError),
}

// ============================================================================
// CONFIG & POLICIES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Upper bound on the Challenge sample
    pub challenge_item_count: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            challenge_item_count: DEFAULT_CHALLENGE_ITEM_COUNT,
        }
    }
}

/// Source of the item set for Gauntlet sessions
///
/// The returned order is the order the items are quizzed in.
pub trait GauntletPolicy: Send + Sync {
    fn select_items(&self) -> Result<Vec<ItemId>, StorageError>;
}

/// A fixed list of items, e.g. the misses of a previous gauntlet
#[derive(Debug, Clone, Default)]
pub struct FixedItems(pub Vec<ItemId>);

impl GauntletPolicy for FixedItems {
    fn select_items(&self) -> Result<Vec<ItemId>, StorageError> {
        Ok(self.0.clone())
    }
}

// ============================================================================
// FACTORY
// ============================================================================

/// Creates quiz sessions over a shared item store and review log
#[derive(Clone)]
pub struct SessionFactory {
    store: Arc<dyn ItemStore>,
    log: Arc<dyn ReviewLog>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    gauntlet: Option<Arc<dyn GauntletPolicy>>,
}

impl SessionFactory {
    pub fn new(store: Arc<dyn ItemStore>, log: Arc<dyn ReviewLog>) -> Self {
        Self {
            store,
            log,
            clock: Arc::new(SystemClock),
            config: SessionConfig::default(),
            gauntlet: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_gauntlet_policy(mut self, policy: Arc<dyn GauntletPolicy>) -> Self {
        self.gauntlet = Some(policy);
        self
    }

    /// Build a session for `mode`.
    ///
    /// Fails with [`SessionError::NoEligibleItems`] when the mode's item set
    /// is empty. Nothing is written to the store or the log here.
    pub fn start_session<R: Rng + ?Sized>(
        &self,
        mode: QuizMode,
        rng: &mut R,
    ) -> Result<QuizSession, SessionError> {
        let items = match mode {
            QuizMode::Standard => {
                let mut due = self.store.get_due_item_ids(self.clock.today())?;
                due.shuffle(rng);
                due
            }
            QuizMode::Challenge => {
                let mut all = self.store.get_all_item_ids()?;
                let amount = self.config.challenge_item_count.min(all.len());
                let (sample, _) = all.partial_shuffle(rng, amount);
                sample.to_vec()
            }
            QuizMode::Gauntlet => {
                let policy = self
                    .gauntlet
                    .as_ref()
                    .ok_or(SessionError::GauntletPolicyMissing)?;
                policy.select_items()?
            }
        };

        if items.is_empty() {
            return Err(SessionError::NoEligibleItems { mode });
        }

        tracing::info!("Starting {} session with {} items", mode, items.len());

        Ok(QuizSession {
            mode,
            items,
            position: 0,
            score: 0,
            failed_items: Vec::new(),
            round: None,
            recorded: None,
            store: Arc::clone(&self.store),
            log: Arc::clone(&self.log),
            clock: Arc::clone(&self.clock),
        })
    }
}

// ============================================================================
// SESSION
// ============================================================================

/// Result of one submitted outcome
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub item_id: ItemId,
    pub outcome: Outcome,
    pub latency_seconds: f64,
    /// `None` when the item had no scheduling state to update
    pub new_state: Option<SchedulingState>,
    pub finished: bool,
}

/// A live quiz. Transient; dropping it discards everything not yet submitted.
pub struct QuizSession {
    mode: QuizMode,
    items: Vec<ItemId>,
    position: usize,
    score: u32,
    failed_items: Vec<ItemId>,
    /// Reveal latch of the round in progress
    round: Option<RevealHandle>,
    /// Event already appended for the current round, kept for retries
    recorded: Option<ReviewEvent>,
    store: Arc<dyn ItemStore>,
    log: Arc<dyn ReviewLog>,
    clock: Arc<dyn Clock>,
}

impl QuizSession {
    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Items answered incorrectly, in the order they were missed (Gauntlet only)
    pub fn failed_items(&self) -> &[ItemId] {
        &self.failed_items
    }

    pub fn is_finished(&self) -> bool {
        self.position == self.items.len()
    }

    /// `(answered, total)`
    pub fn progress(&self) -> (usize, usize) {
        (self.position, self.items.len())
    }

    pub fn round_state(&self) -> RoundState {
        if self.is_finished() {
            return RoundState::Finished;
        }
        match &self.round {
            None => RoundState::Idle,
            Some(handle) if handle.is_revealed() => RoundState::Answering,
            Some(_) => RoundState::Playing,
        }
    }

    pub fn current_item_id(&self) -> Option<ItemId> {
        self.items.get(self.position).copied()
    }

    /// The item of the current round, `None` once finished or if it was
    /// deleted from the library mid-session
    pub fn current_item(&self) -> Result<Option<LearningItem>, SessionError> {
        match self.current_item_id() {
            Some(id) => Ok(self.store.get_item(id)?),
            None => Ok(None),
        }
    }

    /// Start presenting the current item (`Idle -> Playing`)
    pub fn begin_round(&mut self) -> Result<RevealHandle, SessionError> {
        self.expect_state(RoundState::Idle)?;
        let handle = RevealHandle::start();
        self.round = Some(handle.clone());
        Ok(handle)
    }

    /// Reveal the current round now. Returns `false` when no round is
    /// playing or it was already revealed.
    pub fn trigger_reveal(&self) -> bool {
        self.round.as_ref().is_some_and(RevealHandle::reveal)
    }

    /// Record the learner's outcome for the revealed round.
    ///
    /// On `Err` the session stays on the same item and the call may be retried.
    /// If the review event was already appended by a failed earlier attempt it
    /// is not appended again, and its outcome stands.
    pub fn submit_outcome(&mut self, outcome: Outcome) -> Result<RoundSummary, SessionError> {
        self.expect_state(RoundState::Answering)?;

        let item_id = self.items[self.position];
        let latency = self
            .round
            .as_ref()
            .and_then(RevealHandle::latency)
            .unwrap_or(TIMEOUT_LATENCY);

        let event = match &self.recorded {
            Some(event) => {
                if event.outcome != outcome {
                    tracing::warn!(
                        "Retry for song {} submitted {}, keeping recorded {}",
                        item_id,
                        outcome,
                        event.outcome
                    );
                }
                event.clone()
            }
            None => {
                let now = self.clock.now();
                let timestamp = now.with_nanosecond(0).unwrap_or(now);
                let event = ReviewEvent::new(item_id, timestamp, outcome, latency);
                self.log.append_event(&event).inspect_err(|e| {
                    tracing::warn!("Failed to record outcome for song {}: {}", item_id, e);
                })?;
                self.recorded = Some(event.clone());
                event
            }
        };

        let new_state = self.apply_schedule(&event)?;

        if event.outcome.is_correct() {
            self.score += 1;
        } else if self.mode.tracks_failures() {
            self.failed_items.push(item_id);
        }
        self.position += 1;
        self.round = None;
        self.recorded = None;

        tracing::debug!(
            "Song {} answered {} ({:.2}s), {}/{}",
            item_id,
            event.outcome,
            event.latency_seconds,
            self.position,
            self.items.len()
        );

        Ok(RoundSummary {
            item_id,
            outcome: event.outcome,
            latency_seconds: event.latency_seconds,
            new_state,
            finished: self.is_finished(),
        })
    }

    /// Drop the session. Rounds already submitted stay recorded; the round in
    /// progress, if any, leaves no trace beyond what was already written.
    pub fn abort(self) {
        tracing::info!(
            "Aborted {} session at {}/{}",
            self.mode,
            self.position,
            self.items.len()
        );
    }

    fn apply_schedule(&self, event: &ReviewEvent) -> Result<Option<SchedulingState>, SessionError> {
        let Some(current) = self.store.get_scheduling_state(event.item_id)? else {
            tracing::warn!(
                "Song {} has no scheduling state, skipping update",
                event.item_id
            );
            return Ok(None);
        };

        let next = advance(
            &current,
            event.outcome,
            event.latency_seconds,
            self.clock.today(),
        );

        let updated = self
            .store
            .set_scheduling_state(event.item_id, &next)
            .inspect_err(|e| {
                tracing::warn!("Failed to save schedule for song {}: {}", event.item_id, e);
            })?;
        if !updated {
            tracing::warn!(
                "Scheduling state for song {} disappeared before update",
                event.item_id
            );
            return Ok(None);
        }

        Ok(Some(next))
    }

    fn expect_state(&self, expected: RoundState) -> Result<(), SessionError> {
        let actual = self.round_state();
        if actual == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition { expected, actual })
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
