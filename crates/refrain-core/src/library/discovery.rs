//! Music folder discovery
//!
//! Finds audio files under a folder whose names are not yet in the library.
//! Names are compared lowercased and NFC-normalized, so `Café.mp3` written
//! with a combining accent matches `café.mp3` stored precomposed.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;
use walkdir::WalkDir;

/// File extensions treated as audio
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "m4a", "ogg"];

/// Lowercased NFC form used to compare file names
pub fn normalize_filename(name: &str) -> String {
    name.to_lowercase().nfc().collect()
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Recursively scan `root` for audio files whose names are not in `existing`.
///
/// Returns absolute paths sorted by directory walk order (file name within
/// each directory). A missing or non-directory `root` yields no files.
/// Unreadable entries are skipped.
pub fn discover_new_files<I, S>(root: &Path, existing: I) -> io::Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if !root.is_dir() {
        tracing::warn!("Music folder {} is not a directory", root.display());
        return Ok(Vec::new());
    }

    let known: HashSet<String> = existing
        .into_iter()
        .map(|name| normalize_filename(name.as_ref()))
        .collect();
    let root = std::path::absolute(root)?;

    let mut found = Vec::new();
    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_audio_file(entry.path()) {
            continue;
        }

        let name = normalize_filename(&entry.file_name().to_string_lossy());
        if !known.contains(&name) {
            found.push(entry.into_path());
        }
    }

    tracing::debug!("Found {} new audio files under {}", found.len(), root.display());
    Ok(found)
}
