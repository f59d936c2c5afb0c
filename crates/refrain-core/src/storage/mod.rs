//! Storage Module
//!
//! SQLite-based storage layer with:
//! - Song library with unique filename / Spotify id constraints
//! - Per-song scheduling state, removed together with its song
//! - Append-only play history that outlives deleted songs
//!
//! Callers above this layer depend on the [`ItemStore`] and [`ReviewLog`]
//! traits, not on [`Storage`] itself.

mod migrations;
mod sqlite;
mod store;

pub use migrations::MIGRATIONS;
pub use sqlite::{Result, Storage, StorageError};
pub use store::{ItemStore, ReviewLog};
