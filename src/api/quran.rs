use serde::Deserialize;

use super::{ApiClient, ApiError, CancelToken};
use crate::models::{Chapter, PageMeta, SearchHit, TranslationResource, Verse, VersePage};

pub const PREFERRED_LANGUAGES: &[&str] = &["Arabic", "English", "Urdu"];
pub const TRANSLATION_PICKER_LIMIT: usize = 20;

const VERSE_FIELDS: &str = "chapter_id,verse_key,verse_number,text_uthmani";
const RANDOM_VERSE_FIELDS: &str = "verse_key,text_uthmani";

#[derive(Debug, Deserialize)]
struct ChaptersResponse {
    #[serde(default)]
    chapters: Vec<Chapter>,
}

#[derive(Debug, Deserialize)]
struct VersesResponse {
    #[serde(default)]
    verses: Vec<Verse>,
    #[serde(default)]
    pagination: PageMeta,
}

#[derive(Debug, Deserialize)]
struct TranslationsResponse {
    #[serde(default)]
    translations: Vec<TranslationResource>,
}

#[derive(Debug, Deserialize)]
struct RandomVerseResponse {
    verse: Verse,
}

#[derive(Debug, Default, Deserialize)]
struct SearchBody {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    search: SearchBody,
}

/// Everything the application asks of the remote Quran API.
pub trait QuranSource: Send + Sync {
    fn chapters(&self, cancel: &CancelToken) -> Result<Vec<Chapter>, ApiError>;

    fn verses_by_chapter(
        &self,
        chapter_id: u32,
        translation_id: u32,
        page: u32,
        per_page: u32,
        cancel: &CancelToken,
    ) -> Result<VersePage, ApiError>;

    fn translations(&self, cancel: &CancelToken) -> Result<Vec<TranslationResource>, ApiError>;

    fn random_verse(&self, translation_id: u32, cancel: &CancelToken) -> Result<Verse, ApiError>;

    fn search(&self, query: &str, size: u32, cancel: &CancelToken)
    -> Result<Vec<SearchHit>, ApiError>;
}

pub struct QuranApi {
    client: ApiClient,
}

impl QuranApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl QuranSource for QuranApi {
    fn chapters(&self, cancel: &CancelToken) -> Result<Vec<Chapter>, ApiError> {
        let response: ChaptersResponse =
            self.client
                .get_json("/chapters", &[("language", "ar".to_string())], cancel)?;
        Ok(response.chapters)
    }

    fn verses_by_chapter(
        &self,
        chapter_id: u32,
        translation_id: u32,
        page: u32,
        per_page: u32,
        cancel: &CancelToken,
    ) -> Result<VersePage, ApiError> {
        let response: VersesResponse = self.client.get_json(
            &format!("/verses/by_chapter/{chapter_id}"),
            &[
                ("language", "ar".to_string()),
                ("translations", translation_id.to_string()),
                ("fields", VERSE_FIELDS.to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ],
            cancel,
        )?;
        Ok(VersePage {
            verses: response.verses,
            meta: response.pagination,
        })
    }

    fn translations(&self, cancel: &CancelToken) -> Result<Vec<TranslationResource>, ApiError> {
        let response: TranslationsResponse =
            self.client.get_json("/resources/translations", &[], cancel)?;
        Ok(response.translations)
    }

    fn random_verse(&self, translation_id: u32, cancel: &CancelToken) -> Result<Verse, ApiError> {
        let response: RandomVerseResponse = self.client.get_json(
            "/verses/random",
            &[
                ("language", "ar".to_string()),
                ("translations", translation_id.to_string()),
                ("fields", RANDOM_VERSE_FIELDS.to_string()),
            ],
            cancel,
        )?;
        Ok(response.verse)
    }

    fn search(
        &self,
        query: &str,
        size: u32,
        cancel: &CancelToken,
    ) -> Result<Vec<SearchHit>, ApiError> {
        let response: SearchResponse = self.client.get_json(
            "/search",
            &[
                ("language", "ar".to_string()),
                ("size", size.to_string()),
                ("query", query.to_string()),
            ],
            cancel,
        )?;
        Ok(response.search.results)
    }
}

/// Picker entries: resources in the preferred languages, capped, with the
/// active translation kept selectable even when it falls outside that set.
pub fn preferred_translations(
    all: &[TranslationResource],
    current_id: u32,
) -> Vec<TranslationResource> {
    let mut picked: Vec<TranslationResource> = all
        .iter()
        .filter(|t| PREFERRED_LANGUAGES.contains(&t.language_name.as_str()))
        .take(TRANSLATION_PICKER_LIMIT)
        .cloned()
        .collect();

    if !picked.iter().any(|t| t.id == current_id) {
        if let Some(current) = all.iter().find(|t| t.id == current_id) {
            picked.push(current.clone());
        }
    }
    picked
}
