//! Collaborator interfaces
//!
//! The session controller and the analytics never talk to SQLite directly.
//! They are handed an [`ItemStore`] and a [`ReviewLog`]; [`super::Storage`]
//! implements both, tests substitute fakes.

use chrono::NaiveDate;

use crate::library::{ItemId, LearningItem, ReviewEvent};
use crate::scheduling::SchedulingState;

use super::sqlite::Result;

/// Durable per-item records and scheduling state
pub trait ItemStore: Send + Sync {
    /// Ids of items whose next review date is on or before `as_of`
    fn get_due_item_ids(&self, as_of: NaiveDate) -> Result<Vec<ItemId>>;

    /// Ids of every item in the library, ascending
    fn get_all_item_ids(&self) -> Result<Vec<ItemId>>;

    /// `None` when the item has no scheduling state
    fn get_scheduling_state(&self, id: ItemId) -> Result<Option<SchedulingState>>;

    /// Every item's scheduling state, ascending by id
    fn get_all_scheduling_states(&self) -> Result<Vec<(ItemId, SchedulingState)>>;

    /// Overwrite an item's scheduling state. Returns `false` if the item has
    /// no state row to update.
    fn set_scheduling_state(&self, id: ItemId, state: &SchedulingState) -> Result<bool>;

    fn get_item(&self, id: ItemId) -> Result<Option<LearningItem>>;
}

/// Append-only log of quiz outcomes
pub trait ReviewLog: Send + Sync {
    /// Record one outcome, returning the log row id
    fn append_event(&self, event: &ReviewEvent) -> Result<i64>;

    /// Every event across all items, ascending by timestamp.
    ///
    /// Taken as one consistent read: events appended while the caller walks
    /// the returned vector are not part of it.
    fn snapshot_all_events(&self) -> Result<Vec<ReviewEvent>>;
}
