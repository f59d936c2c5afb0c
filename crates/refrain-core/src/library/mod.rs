//! Library module - songs, the review events recorded against them, and
//! discovery of new audio files

mod discovery;
mod item;

pub use discovery::{discover_new_files, normalize_filename, AUDIO_EXTENSIONS};
pub use item::{ItemId, LearningItem, LibraryStats, NewItem, ReviewEvent};
