use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum RevelationPlace {
    #[default]
    Meccan,
    Medinan,
}

impl From<String> for RevelationPlace {
    fn from(value: String) -> Self {
        let lower = value.trim().to_lowercase();
        if lower.starts_with("mad") || lower.starts_with("med") {
            RevelationPlace::Medinan
        } else {
            RevelationPlace::Meccan
        }
    }
}

impl RevelationPlace {
    pub fn label(&self) -> &'static str {
        match self {
            RevelationPlace::Meccan => "مكية",
            RevelationPlace::Medinan => "مدنية",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TranslatedName {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: u32,
    #[serde(default)]
    pub name_arabic: String,
    #[serde(default)]
    pub name_simple: String,
    #[serde(default)]
    pub translated_name: Option<TranslatedName>,
    #[serde(default)]
    pub verses_count: u32,
    #[serde(default)]
    pub revelation_place: RevelationPlace,
}

impl Chapter {
    /// Stand-in used when a chapter is opened before the chapter list arrived.
    pub fn placeholder(id: u32) -> Self {
        Self {
            id,
            name_arabic: format!("سورة رقم {id}"),
            name_simple: format!("Surah {id}"),
            translated_name: None,
            verses_count: 0,
            revelation_place: RevelationPlace::Meccan,
        }
    }

    pub fn translated(&self) -> &str {
        self.translated_name
            .as_ref()
            .map(|t| t.name.as_str())
            .unwrap_or("")
    }

    pub fn info_line(&self) -> String {
        format!("{} • {}", self.name_simple, self.revelation_place.label())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VerseTranslation {
    #[serde(default)]
    pub resource_id: Option<u32>,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    pub id: u32,
    pub verse_key: String,
    #[serde(default)]
    pub text_uthmani: String,
    #[serde(default)]
    pub translations: Vec<VerseTranslation>,
}

impl Verse {
    pub fn first_translation(&self) -> Option<String> {
        self.translations
            .first()
            .map(|t| strip_markup(&t.text))
            .filter(|t| !t.is_empty())
    }

    /// Text placed on the clipboard for the copy action.
    pub fn clipboard_text(&self) -> String {
        format!("{} ( {} )", self.text_uthmani, self.verse_key)
    }
}

/// Splits `chapter:number` into its parts.
pub fn parse_verse_key(key: &str) -> Option<(u32, u32)> {
    let (chapter, number) = key.trim().split_once(':')?;
    Some((chapter.parse().ok()?, number.parse().ok()?))
}

/// Pagination block of a paged API response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub current_page: Option<u32>,
}

impl PageMeta {
    pub fn has_more(&self) -> bool {
        self.total_pages.unwrap_or(0) > self.current_page.unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VersePage {
    pub verses: Vec<Verse>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResource {
    pub id: u32,
    #[serde(default)]
    pub language_name: String,
    #[serde(default)]
    pub author_name: String,
}

impl TranslationResource {
    pub fn label(&self) -> String {
        format!("{} - {}", self.language_name, self.author_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub verse_key: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Midnight,
    Desert,
}

impl Theme {
    pub fn all() -> &'static [Theme] {
        &[Theme::Light, Theme::Dark, Theme::Midnight, Theme::Desert]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Midnight => "midnight",
            Theme::Desert => "desert",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "نهاري",
            Theme::Dark => "داكن",
            Theme::Midnight => "ليلي",
            Theme::Desert => "صحراوي",
        }
    }

    pub fn scheme(&self) -> ColorScheme {
        match self {
            Theme::Light | Theme::Desert => ColorScheme::Light,
            Theme::Dark | Theme::Midnight => ColorScheme::Dark,
        }
    }

    pub fn from_name(name: &str) -> Option<Theme> {
        Theme::all().iter().copied().find(|t| t.name() == name)
    }

    pub fn next(&self) -> Theme {
        let all = Theme::all();
        let pos = all.iter().position(|t| t == self).unwrap_or(0);
        all[(pos + 1) % all.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestFamily {
    Chapters,
    Verses,
    Search,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

impl LoadStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LoadStatus::Idle => "ready",
            LoadStatus::Loading => "loading...",
            LoadStatus::Ready => "connected",
            LoadStatus::Failed => "failed to load",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum WindowType {
    #[default]
    Reader,
    Chapters,
    Bookmarks,
    History,
    Search,
    Translations,
    Help,
    ConfirmClearBookmarks,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageType {
    Info,
    Warning,
    Error,
}

fn footnote_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<sup[^>]*>.*?</sup>").expect("valid footnote regex"))
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid tag regex"))
}

/// Drops footnote markers and inline tags from API-provided HTML snippets.
pub fn strip_markup(text: &str) -> String {
    let without_notes = footnote_regex().replace_all(text, "");
    tag_regex()
        .replace_all(&without_notes, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revelation_place_accepts_api_spellings() {
        let place: RevelationPlace = serde_json::from_str("\"makkah\"").unwrap();
        assert_eq!(place, RevelationPlace::Meccan);
        let place: RevelationPlace = serde_json::from_str("\"madinah\"").unwrap();
        assert_eq!(place, RevelationPlace::Medinan);
        let place: RevelationPlace = serde_json::from_str("\"Medinan\"").unwrap();
        assert_eq!(place, RevelationPlace::Medinan);
    }

    #[test]
    fn test_chapter_deserializes_with_missing_fields() {
        let chapter: Chapter = serde_json::from_str(
            r#"{"id": 2, "name_arabic": "البقرة", "name_simple": "Al-Baqarah", "revelation_place": "madinah"}"#,
        )
        .unwrap();
        assert_eq!(chapter.id, 2);
        assert_eq!(chapter.verses_count, 0);
        assert_eq!(chapter.translated(), "");
        assert_eq!(chapter.revelation_place, RevelationPlace::Medinan);
    }

    #[test]
    fn test_placeholder_chapter() {
        let chapter = Chapter::placeholder(7);
        assert_eq!(chapter.name_arabic, "سورة رقم 7");
        assert_eq!(chapter.name_simple, "Surah 7");
        assert_eq!(chapter.revelation_place, RevelationPlace::Meccan);
    }

    #[test]
    fn test_page_meta_has_more() {
        let meta = PageMeta {
            total_pages: Some(3),
            current_page: Some(2),
        };
        assert!(meta.has_more());
        let meta = PageMeta {
            total_pages: Some(3),
            current_page: Some(3),
        };
        assert!(!meta.has_more());
        assert!(!PageMeta::default().has_more());
    }

    #[test]
    fn test_parse_verse_key() {
        assert_eq!(parse_verse_key("2:255"), Some((2, 255)));
        assert_eq!(parse_verse_key("bogus"), None);
        assert_eq!(parse_verse_key("x:1"), None);
    }

    #[test]
    fn test_strip_markup_removes_footnotes_and_tags() {
        let text = "In the name of <em>Allah</em><sup foot_note=1>1</sup>, the Merciful";
        assert_eq!(strip_markup(text), "In the name of Allah, the Merciful");
    }

    #[test]
    fn test_first_translation_is_cleaned() {
        let verse = Verse {
            id: 1,
            verse_key: "1:1".to_string(),
            text_uthmani: "بِسْمِ".to_string(),
            translations: vec![VerseTranslation {
                resource_id: Some(20),
                text: "Praise<sup foot_note=2>2</sup> be".to_string(),
            }],
        };
        assert_eq!(verse.first_translation(), Some("Praise be".to_string()));
        assert_eq!(verse.clipboard_text(), "بِسْمِ ( 1:1 )");
    }

    #[test]
    fn test_theme_lookup_and_cycle() {
        assert_eq!(Theme::from_name("midnight"), Some(Theme::Midnight));
        assert_eq!(Theme::from_name("bogus"), None);
        assert_eq!(Theme::Desert.next(), Theme::Light);
        assert_eq!(Theme::Dark.scheme(), ColorScheme::Dark);
        assert_eq!(Theme::default(), Theme::Light);
    }

    #[test]
    fn test_window_type_default() {
        assert_eq!(WindowType::default(), WindowType::Reader);
    }
}
