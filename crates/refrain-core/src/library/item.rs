//! Library items and review events
//!
//! A learning item is a song the learner wants to recognise. Its metadata is
//! owned by the item store; its scheduling state lives alongside it (see
//! [`crate::scheduling::SchedulingState`]).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::scheduling::Outcome;

/// Row id of an item in the library
pub type ItemId = i64;

// ============================================================================
// LEARNING ITEM
// ============================================================================

/// A song in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningItem {
    pub id: ItemId,
    pub title: String,
    /// Primary label shown with the title on reveal
    pub artist: String,
    pub release_year: Option<i32>,
    pub language: Option<String>,
    pub genre: Option<String>,
    /// Audio file name relative to the music folder (unique)
    pub local_filename: String,
    /// External track id from the streaming catalogue (unique when present)
    pub spotify_id: Option<String>,
    pub created_at: NaiveDateTime,
}

impl LearningItem {
    /// "Title - Artist", the answer shown when a round is revealed
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.title, self.artist)
    }
}

/// Input for adding a song to the library
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    pub local_filename: String,
    #[serde(default)]
    pub spotify_id: Option<String>,
}

// ============================================================================
// REVIEW EVENT
// ============================================================================

/// One recorded quiz outcome. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEvent {
    pub item_id: ItemId,
    pub timestamp: NaiveDateTime,
    pub outcome: Outcome,
    /// Seconds between presentation and reveal; non-positive means timed out
    pub latency_seconds: f64,
}

impl ReviewEvent {
    pub fn new(item_id: ItemId, timestamp: NaiveDateTime, outcome: Outcome, latency_seconds: f64) -> Self {
        Self {
            item_id,
            timestamp,
            outcome,
            latency_seconds,
        }
    }

    /// Calendar date the event happened on
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn timed_out(&self) -> bool {
        self.latency_seconds <= 0.0
    }
}

// ============================================================================
// STATS
// ============================================================================

/// Library-wide counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryStats {
    pub total_items: i64,
    pub due_items: i64,
    pub total_reviews: i64,
    pub correct_reviews: i64,
    pub oldest_item: Option<NaiveDateTime>,
    pub newest_item: Option<NaiveDateTime>,
    pub last_review: Option<NaiveDateTime>,
}

impl LibraryStats {
    /// Fraction of all recorded reviews that were correct
    pub fn accuracy(&self) -> Option<f64> {
        (self.total_reviews > 0).then(|| self.correct_reviews as f64 / self.total_reviews as f64)
    }
}
