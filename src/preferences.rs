use eyre::Result;
use serde_json::{Value, json};
use std::fmt;

use crate::library::{Bookmarks, History};
use crate::models::{Bookmark, HistoryEntry, Theme};
use crate::storage::KeyValueStore;

pub const STORAGE_KEY: &str = "quranSettings";
pub const DEFAULT_TRANSLATION_ID: u32 = 20;

/// Reading size in rem, kept within the range the reader accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSize(f32);

impl FontSize {
    pub const MIN: f32 = 1.2;
    pub const MAX: f32 = 3.0;
    pub const DEFAULT: f32 = 1.8;
    const STEP: f32 = 0.1;

    pub fn parse(raw: &str) -> Option<Self> {
        let number = raw.trim().strip_suffix("rem")?;
        let value: f32 = number.trim().parse().ok()?;
        if value.is_finite() && (Self::MIN..=Self::MAX).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn rem(&self) -> f32 {
        self.0
    }

    pub fn larger(&self) -> Self {
        Self::clamped(self.0 + Self::STEP)
    }

    pub fn smaller(&self) -> Self {
        Self::clamped(self.0 - Self::STEP)
    }

    fn clamped(value: f32) -> Self {
        let rounded = (value * 10.0).round() / 10.0;
        Self(rounded.clamp(Self::MIN, Self::MAX))
    }

    /// Width of the text column: the default size uses all of `available`,
    /// larger sizes narrow it proportionally.
    pub fn text_width(&self, available: u16) -> u16 {
        let scaled = (available as f32 * Self::DEFAULT / self.0).round() as u16;
        scaled.clamp(available.min(20), available)
    }
}

impl Default for FontSize {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}rem", self.0)
    }
}

/// The subset of application state that survives restarts.
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub translation_id: u32,
    pub theme: Theme,
    pub bookmarks: Bookmarks,
    pub history: History,
    pub font_size: FontSize,
    pub auto_advance: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            translation_id: DEFAULT_TRANSLATION_ID,
            theme: Theme::default(),
            bookmarks: Bookmarks::default(),
            history: History::default(),
            font_size: FontSize::default(),
            auto_advance: true,
        }
    }
}

impl Preferences {
    /// Never fails: unreadable storage or malformed data yields defaults.
    pub fn restore(storage: &dyn KeyValueStore) -> Self {
        match storage.get_item(STORAGE_KEY) {
            Ok(Some(raw)) => Self::from_json_str(&raw),
            Ok(None) => Self::default(),
            Err(err) => {
                tracing::warn!("could not read saved preferences: {err}");
                Self::default()
            }
        }
    }

    pub fn from_json_str(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(&value),
            Err(err) => {
                tracing::warn!("saved preferences are not valid JSON: {err}");
                Self::default()
            }
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let mut prefs = Self::default();

        if let Some(val) = value
            .get("translationId")
            .and_then(|v| v.as_u64())
            .filter(|id| *id > 0 && *id <= u32::MAX as u64)
        {
            prefs.translation_id = val as u32;
        }
        if let Some(val) = value
            .get("theme")
            .and_then(|v| v.as_str())
            .and_then(Theme::from_name)
        {
            prefs.theme = val;
        }
        if let Some(val) = value.get("bookmarks").and_then(|v| v.as_array()) {
            prefs.bookmarks = Bookmarks::from_entries(
                val.iter()
                    .filter_map(|entry| serde_json::from_value::<Bookmark>(entry.clone()).ok()),
            );
        }
        if let Some(val) = value.get("history").and_then(|v| v.as_array()) {
            prefs.history = History::from_entries(
                val.iter()
                    .filter_map(|entry| serde_json::from_value::<HistoryEntry>(entry.clone()).ok()),
            );
        }
        if let Some(val) = value
            .get("fontSize")
            .and_then(|v| v.as_str())
            .and_then(FontSize::parse)
        {
            prefs.font_size = val;
        }
        if let Some(val) = value.get("autoAdvance").and_then(|v| v.as_bool()) {
            prefs.auto_advance = val;
        }

        prefs
    }

    pub fn to_value(&self) -> Value {
        json!({
            "translationId": self.translation_id,
            "theme": self.theme.name(),
            "bookmarks": self.bookmarks.as_slice(),
            "history": self.history.as_slice(),
            "fontSize": self.font_size.to_string(),
            "autoAdvance": self.auto_advance,
        })
    }

    pub fn persist(&self, storage: &dyn KeyValueStore) -> Result<()> {
        storage.set_item(STORAGE_KEY, &self.to_value().to_string())
    }
}
