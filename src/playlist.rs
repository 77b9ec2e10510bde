//! Playlist store: ordered media entries plus a current-index cursor.
//!
//! The cursor is `Some(i)` with `i < len`, or `None` when the playlist is
//! empty or was explicitly cleared. Cursor movement here is strictly in
//! bounds; wraparound belongs to the controller's repeat policy.

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::Accessor;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A single media reference. Immutable once added to the playlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub path: PathBuf,
    pub title: String,
    pub artist: String,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

impl Entry {
    /// Build an entry from a file path, reading tags where possible.
    /// Files lofty cannot parse (video containers, unknown formats) still
    /// become valid entries — the engine decides later whether it can play
    /// them — with the file stem as title and an unknown duration.
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let path = path
            .canonicalize()
            .map_err(|e| format!("Invalid path '{}': {}", path.display(), e))?;

        let fallback_title = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        match lofty::read_from_path(&path) {
            Ok(tagged_file) => {
                let duration = tagged_file.properties().duration();
                let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());
                let title = tag
                    .and_then(|t| t.title().map(|s| s.to_string()))
                    .unwrap_or(fallback_title);
                let artist = tag
                    .and_then(|t| t.artist().map(|s| s.to_string()))
                    .unwrap_or_else(|| "Unknown".to_string());
                Ok(Entry {
                    path,
                    title,
                    artist,
                    duration,
                })
            }
            Err(_) => Ok(Entry {
                path,
                title: fallback_title,
                artist: "Unknown".to_string(),
                duration: Duration::ZERO,
            }),
        }
    }

    /// Format duration as MM:SS.
    pub fn duration_display(&self) -> String {
        let secs = self.duration.as_secs();
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

/// What an `append` did to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// First entry of a previously empty playlist: the cursor now points at
    /// it and the caller should load it.
    FirstEntry,
    Appended,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Playlist {
    entries: Vec<Entry>,
    current: Option<usize>,
}

impl Playlist {
    pub fn new() -> Self {
        Playlist::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&Entry> {
        self.current.and_then(|i| self.entries.get(i))
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Append an entry. On a previously empty playlist the cursor moves to
    /// the new entry and the outcome signals that a load is wanted.
    pub fn append(&mut self, entry: Entry) -> AppendOutcome {
        self.entries.push(entry);
        if self.current.is_none() && self.entries.len() == 1 {
            self.current = Some(0);
            AppendOutcome::FirstEntry
        } else {
            AppendOutcome::Appended
        }
    }

    /// Remove an entry by index. The cursor shifts down when an earlier
    /// entry is removed and clears when the current entry itself goes.
    pub fn remove_at(&mut self, index: usize) -> Result<Entry, String> {
        if index >= self.entries.len() {
            return Err(format!(
                "Index {} out of range (playlist has {} entries)",
                index,
                self.entries.len()
            ));
        }
        let entry = self.entries.remove(index);
        if let Some(ci) = self.current {
            if index < ci {
                self.current = Some(ci - 1);
            } else if index == ci {
                self.current = None;
            }
        }
        Ok(entry)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = None;
    }

    /// Point the cursor at an explicit index.
    pub fn select(&mut self, index: usize) -> Result<&Entry, String> {
        if index >= self.entries.len() {
            return Err(format!(
                "Index {} out of range (playlist has {} entries)",
                index,
                self.entries.len()
            ));
        }
        self.current = Some(index);
        Ok(&self.entries[index])
    }

    /// Advance the cursor. No-op at the last entry.
    pub fn next(&mut self) -> Option<usize> {
        match self.current {
            Some(i) if i + 1 < self.entries.len() => {
                self.current = Some(i + 1);
                self.current
            }
            _ => None,
        }
    }

    /// Move the cursor back. No-op at the first entry.
    pub fn previous(&mut self) -> Option<usize> {
        match self.current {
            Some(i) if i > 0 => {
                self.current = Some(i - 1);
                self.current
            }
            _ => None,
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    #[derive(Serialize, Deserialize)]
    struct DurationRepr {
        secs: u64,
        nanos: u32,
    }

    pub fn serialize<S: Serializer>(dur: &Duration, s: S) -> Result<S::Ok, S::Error> {
        DurationRepr {
            secs: dur.as_secs(),
            nanos: dur.subsec_nanos(),
        }
        .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let repr = DurationRepr::deserialize(d)?;
        Ok(Duration::new(repr.secs, repr.nanos))
    }
}
