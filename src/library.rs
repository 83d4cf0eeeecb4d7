use eyre::Result;
use std::path::{Path, PathBuf};

use crate::models::{Bookmark, HistoryEntry};

pub const HISTORY_LIMIT: usize = 12;
pub const HISTORY_PANEL_LEN: usize = 8;
pub const EXPORT_FILE_NAME: &str = "bookmarks.json";

/// Insertion-ordered bookmarks, unique by verse key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bookmarks(Vec<Bookmark>);

impl Bookmarks {
    /// Keeps the first occurrence of each key.
    pub fn from_entries(entries: impl IntoIterator<Item = Bookmark>) -> Self {
        let mut bookmarks = Self::default();
        for entry in entries {
            bookmarks.add(entry);
        }
        bookmarks
    }

    /// Returns false when the key was already bookmarked.
    pub fn add(&mut self, bookmark: Bookmark) -> bool {
        if self.contains(&bookmark.key) {
            return false;
        }
        self.0.push(bookmark);
        true
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|b| b.key != key);
        self.0.len() != before
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|b| b.key == key)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Bookmark] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&Bookmark> {
        self.0.get(index)
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }

    /// Writes `bookmarks.json` into `dir`. Nothing is written when there are no bookmarks.
    pub fn export_to(&self, dir: &Path) -> Result<Option<PathBuf>> {
        if self.is_empty() {
            return Ok(None);
        }
        std::fs::create_dir_all(dir)?;
        let path = dir.join(EXPORT_FILE_NAME);
        std::fs::write(&path, self.to_pretty_json()?)?;
        Ok(Some(path))
    }
}

/// Recently opened chapters, most recent last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History(Vec<HistoryEntry>);

impl History {
    pub fn from_entries(entries: impl IntoIterator<Item = HistoryEntry>) -> Self {
        let mut history = Self::default();
        for entry in entries {
            history.record(entry);
        }
        history
    }

    /// Moves an existing chapter to the end instead of duplicating it.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.0.retain(|e| e.id != entry.id);
        self.0.push(entry);
        if self.0.len() > HISTORY_LIMIT {
            let excess = self.0.len() - HISTORY_LIMIT;
            self.0.drain(..excess);
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[HistoryEntry] {
        &self.0
    }

    /// Entries shown in the history panel, newest first.
    pub fn recent(&self) -> Vec<&HistoryEntry> {
        self.0.iter().rev().take(HISTORY_PANEL_LEN).collect()
    }
}
