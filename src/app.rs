use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::{Duration, Instant};

use crate::api::quran::{QuranSource, preferred_translations};
use crate::api::{ApiError, RequestSlot};
use crate::audio::{AudioOutput, PlaybackState, download_verse_audio, verse_audio_url};
use crate::filter::{ChapterFilter, filter_verses};
use crate::models::{
    Bookmark, Chapter, HistoryEntry, LoadStatus, MessageType, RequestFamily, SearchHit, Theme,
    TranslationResource, Verse, VersePage, parse_verse_key,
};
use crate::playback::{Playlist, Step};
use crate::preferences::Preferences;
use crate::settings::{DEFAULT_RECITER, Settings};
use crate::storage::KeyValueStore;

pub const MESSAGE_TTL: Duration = Duration::from_secs(3);
pub const HIGHLIGHT_TTL: Duration = Duration::from_secs(3);

/// Result of a background job, delivered to the UI thread.
#[derive(Debug)]
pub enum Response {
    Chapters {
        generation: u64,
        result: Result<Vec<Chapter>, ApiError>,
    },
    Verses {
        generation: u64,
        chapter_id: u32,
        page: u32,
        append: bool,
        result: Result<VersePage, ApiError>,
    },
    Translations {
        result: Result<Vec<TranslationResource>, ApiError>,
    },
    Random {
        generation: u64,
        result: Result<Verse, ApiError>,
    },
    Search {
        generation: u64,
        query: String,
        result: Result<Vec<SearchHit>, ApiError>,
    },
    Download {
        verse_key: String,
        result: Result<PathBuf, String>,
    },
}

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs background jobs.
pub trait Executor {
    fn execute(&self, job: Job);
}

pub struct ThreadExecutor;

impl Executor for ThreadExecutor {
    fn execute(&self, job: Job) {
        std::thread::spawn(job);
    }
}

/// Runs each job to completion on the calling thread.
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, job: Job) {
        job();
    }
}

pub struct AppServices {
    pub source: Arc<dyn QuranSource>,
    pub storage: Box<dyn KeyValueStore>,
    pub audio: Box<dyn AudioOutput>,
    pub executor: Box<dyn Executor>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FamilyStatus {
    pub chapters: LoadStatus,
    pub verses: LoadStatus,
    pub search: LoadStatus,
    pub random: LoadStatus,
}

impl FamilyStatus {
    fn set(&mut self, family: RequestFamily, status: LoadStatus) {
        match family {
            RequestFamily::Chapters => self.chapters = status,
            RequestFamily::Verses => self.verses = status,
            RequestFamily::Search => self.search = status,
            RequestFamily::Random => self.random = status,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimedMessage {
    pub text: String,
    pub kind: MessageType,
    pub at: Instant,
}

#[derive(Default)]
struct Slots {
    chapters: RequestSlot,
    verses: RequestSlot,
    search: RequestSlot,
    random: RequestSlot,
}

/// Owns all application state. Every mutation happens on the UI thread;
/// network work is handed to the executor and comes back as a `Response`.
pub struct App {
    pub settings: Settings,
    pub download_dir: PathBuf,
    pub prefs: Preferences,
    pub chapters: Vec<Chapter>,
    pub current_chapter: Option<Chapter>,
    pub playlist: Playlist,
    pub translations: Vec<TranslationResource>,
    pub random_verse: Option<Verse>,
    pub search_results: Option<Vec<SearchHit>>,
    pub search_query: String,
    pub chapter_filter: ChapterFilter,
    pub verse_filter: String,
    pub status: FamilyStatus,
    pub message: Option<TimedMessage>,
    pub now_playing: Option<String>,
    pub highlight: Option<(String, Instant)>,
    /// Verse key the view should scroll to; taken by the UI.
    pub focus_request: Option<String>,
    pending_focus: Option<String>,
    pending_advance: Option<bool>,
    slots: Slots,
    services: AppServices,
    tx: Sender<Response>,
    rx: Receiver<Response>,
}

impl App {
    pub fn new(settings: Settings, download_dir: PathBuf, services: AppServices) -> Self {
        let prefs = Preferences::restore(services.storage.as_ref());
        let playlist = Playlist::new(settings.verses_per_page);
        let (tx, rx) = channel();
        Self {
            settings,
            download_dir,
            prefs,
            chapters: Vec::new(),
            current_chapter: None,
            playlist,
            translations: Vec::new(),
            random_verse: None,
            search_results: None,
            search_query: String::new(),
            chapter_filter: ChapterFilter::default(),
            verse_filter: String::new(),
            status: FamilyStatus::default(),
            message: None,
            now_playing: None,
            highlight: None,
            focus_request: None,
            pending_focus: None,
            pending_advance: None,
            slots: Slots::default(),
            services,
            tx,
            rx,
        }
    }

    /// Startup fetches, plus an optional chapter to open right away.
    pub fn start(&mut self, chapter_id: Option<u32>) {
        self.load_chapters();
        self.load_translations();
        self.load_random();
        if let Some(id) = chapter_id {
            self.load_surah(id);
        }
    }

    fn spawn(&self, job: impl FnOnce(&dyn QuranSource) -> Response + Send + 'static) {
        let source = Arc::clone(&self.services.source);
        let tx = self.tx.clone();
        self.services.executor.execute(Box::new(move || {
            let _ = tx.send(job(source.as_ref()));
        }));
    }

    pub fn load_chapters(&mut self) {
        let (cancel, generation) = self.slots.chapters.begin();
        self.status.set(RequestFamily::Chapters, LoadStatus::Loading);
        self.spawn(move |source| Response::Chapters {
            generation,
            result: source.chapters(&cancel),
        });
    }

    pub fn load_translations(&mut self) {
        let cancel = crate::api::CancelToken::new();
        self.spawn(move |source| Response::Translations {
            result: source.translations(&cancel),
        });
    }

    pub fn load_random(&mut self) {
        let (cancel, generation) = self.slots.random.begin();
        let translation_id = self.prefs.translation_id;
        self.status.set(RequestFamily::Random, LoadStatus::Loading);
        self.spawn(move |source| Response::Random {
            generation,
            result: source.random_verse(translation_id, &cancel),
        });
    }

    /// Opens a chapter from page 1, dropping the previous verses and position.
    pub fn load_surah(&mut self, chapter_id: u32) {
        let chapter = self
            .chapters
            .iter()
            .find(|c| c.id == chapter_id)
            .cloned()
            .unwrap_or_else(|| Chapter::placeholder(chapter_id));
        tracing::info!(chapter_id, name = %chapter.name_simple, "opening chapter");
        self.current_chapter = Some(chapter);
        self.playlist.begin_chapter(chapter_id);
        self.pending_advance = None;
        self.pending_focus = None;
        self.verse_filter.clear();
        self.request_verses(chapter_id, 1, false);
    }

    /// Requests the next page of the current chapter. Returns false when there is none.
    pub fn load_more(&mut self) -> bool {
        match self.playlist.next_page() {
            Some((chapter_id, page)) => {
                self.request_verses(chapter_id, page, true);
                true
            }
            None => false,
        }
    }

    fn request_verses(&mut self, chapter_id: u32, page: u32, append: bool) {
        let (cancel, generation) = self.slots.verses.begin();
        let translation_id = self.prefs.translation_id;
        let per_page = self.playlist.pagination().per_page;
        self.status.set(RequestFamily::Verses, LoadStatus::Loading);
        self.spawn(move |source| Response::Verses {
            generation,
            chapter_id,
            page,
            append,
            result: source.verses_by_chapter(chapter_id, translation_id, page, per_page, &cancel),
        });
    }

    pub fn run_search(&mut self, query: &str) {
        let query = query.trim().to_string();
        if query.is_empty() {
            return;
        }
        let (cancel, generation) = self.slots.search.begin();
        let size = self.settings.search_size;
        self.status.set(RequestFamily::Search, LoadStatus::Loading);
        self.spawn(move |source| {
            let result = source.search(&query, size, &cancel);
            Response::Search {
                generation,
                query,
                result,
            }
        });
    }

    /// Hides the results and abandons a search still in flight.
    pub fn close_search(&mut self) {
        self.slots.search.cancel();
        self.search_results = None;
        if self.status.search == LoadStatus::Loading {
            self.status.set(RequestFamily::Search, LoadStatus::Idle);
        }
    }

    /// Loads the chapter holding `verse_key`, then scrolls to and highlights it.
    pub fn open_verse(&mut self, verse_key: &str) {
        let Some((chapter_id, _)) = parse_verse_key(verse_key) else {
            return;
        };
        self.load_surah(chapter_id);
        self.pending_focus = Some(verse_key.to_string());
    }

    pub fn open_random_verse(&mut self) {
        if let Some(key) = self.random_verse.as_ref().map(|v| v.verse_key.clone()) {
            self.open_verse(&key);
        }
    }

    /// Drains finished background work. Returns true when anything was applied.
    pub fn process_responses(&mut self) -> bool {
        let mut changed = false;
        while let Ok(response) = self.rx.try_recv() {
            self.apply_response(response);
            changed = true;
        }
        changed
    }

    pub fn apply_response(&mut self, response: Response) {
        match response {
            Response::Chapters { generation, result } => {
                if !self.slots.chapters.is_current(generation) {
                    return;
                }
                match result {
                    Ok(chapters) => {
                        self.chapters = chapters;
                        if let Some(current) = &self.current_chapter {
                            if let Some(found) = self.chapters.iter().find(|c| c.id == current.id) {
                                self.current_chapter = Some(found.clone());
                            }
                        }
                        self.status.set(RequestFamily::Chapters, LoadStatus::Ready);
                    }
                    Err(err) => self.fail(RequestFamily::Chapters, err),
                }
            }
            Response::Verses {
                generation,
                chapter_id,
                page,
                append,
                result,
            } => {
                if !self.slots.verses.is_current(generation)
                    || self.playlist.chapter_id() != Some(chapter_id)
                {
                    return;
                }
                match result {
                    Ok(verse_page) => self.apply_verses(page, verse_page, append),
                    Err(err) => {
                        let cancelled = err.is_cancelled();
                        self.fail(RequestFamily::Verses, err);
                        if !cancelled {
                            self.pending_focus = None;
                            // a failed page counts as no further verse
                            if let Some(auto) = self.pending_advance.take() {
                                let step = self.playlist.after_append(auto);
                                self.perform_step(step, auto);
                            }
                        }
                    }
                }
            }
            Response::Translations { result } => match result {
                Ok(all) => {
                    self.translations = preferred_translations(&all, self.prefs.translation_id);
                }
                Err(err) => {
                    if !err.is_cancelled() {
                        tracing::warn!("could not load translations: {err}");
                    }
                }
            },
            Response::Random { generation, result } => {
                if !self.slots.random.is_current(generation) {
                    return;
                }
                match result {
                    Ok(verse) => {
                        self.random_verse = Some(verse);
                        self.status.set(RequestFamily::Random, LoadStatus::Ready);
                    }
                    Err(err) => self.fail(RequestFamily::Random, err),
                }
            }
            Response::Search {
                generation,
                query,
                result,
            } => {
                if !self.slots.search.is_current(generation) {
                    return;
                }
                match result {
                    Ok(hits) => {
                        self.search_query = query;
                        self.search_results = Some(hits);
                        self.status.set(RequestFamily::Search, LoadStatus::Ready);
                    }
                    Err(err) => self.fail(RequestFamily::Search, err),
                }
            }
            Response::Download { verse_key, result } => match result {
                Ok(path) => self.show_message(
                    format!("Downloaded {verse_key} to {}", path.display()),
                    MessageType::Info,
                ),
                Err(err) => {
                    tracing::warn!(verse_key, "download failed: {err}");
                    self.show_message(format!("Download failed: {err}"), MessageType::Error);
                }
            },
        }
    }

    fn apply_verses(&mut self, page: u32, verse_page: VersePage, append: bool) {
        tracing::debug!(page, count = verse_page.verses.len(), append, "verses loaded");
        self.playlist.apply_page(page, verse_page, append);
        self.status.set(RequestFamily::Verses, LoadStatus::Ready);

        if !append {
            if let Some(chapter) = &self.current_chapter {
                self.prefs.history.record(HistoryEntry {
                    id: chapter.id,
                    name: chapter.name_arabic.clone(),
                });
                self.persist();
            }
        }

        if let Some(key) = self.pending_focus.take() {
            if self.playlist.position_of(&key).is_some() {
                self.focus_request = Some(key.clone());
                self.highlight = Some((key, Instant::now()));
            } else if self.pending_advance.is_none() && self.playlist.pagination().has_more {
                // keep paging until the target verse is loaded
                self.pending_focus = Some(key);
                self.load_more();
            }
        }

        if append {
            if let Some(auto) = self.pending_advance.take() {
                let step = self.playlist.after_append(auto);
                self.perform_step(step, auto);
            }
        }
    }

    fn fail(&mut self, family: RequestFamily, err: ApiError) {
        if err.is_cancelled() {
            return;
        }
        tracing::warn!(?family, "request failed: {err}");
        self.status.set(family, LoadStatus::Failed);
    }

    fn perform_step(&mut self, step: Step, auto: bool) {
        match step {
            Step::Play(index) => self.play_index(index),
            Step::FetchMore => {
                self.pending_advance = Some(auto);
                if !self.load_more() {
                    self.pending_advance = None;
                }
            }
            Step::Exhausted => self.show_message("Surah verses finished", MessageType::Info),
            Step::Idle => {}
        }
    }

    pub fn play_index(&mut self, index: usize) {
        let Some(verse) = self.playlist.play_at(index).cloned() else {
            return;
        };
        let url = verse_audio_url(&self.settings.audio_cdn, verse.id);
        let name = self.chapter_name();
        self.now_playing = Some(format!("{name} • {}", verse.verse_key));
        self.focus_request = Some(verse.verse_key.clone());
        if let Err(err) = self.services.audio.play(&url) {
            tracing::warn!(url, "playback failed: {err}");
            self.show_message(format!("Playback failed: {err}"), MessageType::Error);
        }
    }

    pub fn play_key(&mut self, verse_key: &str) {
        if let Some(index) = self.playlist.position_of(verse_key) {
            self.play_index(index);
        }
    }

    /// Replays the active verse, or starts from the first one.
    pub fn play_current(&mut self) {
        if let Some(index) = self.playlist.index() {
            self.play_index(index);
        } else if !self.playlist.is_empty() {
            self.play_index(0);
        }
    }

    pub fn play_next(&mut self, auto: bool) {
        let step = self.playlist.next_step(auto);
        self.perform_step(step, auto);
    }

    pub fn play_previous(&mut self) {
        if let Some(index) = self.playlist.previous_index() {
            self.play_index(index);
        }
    }

    pub fn toggle_pause(&mut self) {
        let result = match self.services.audio.state() {
            PlaybackState::Playing => self.services.audio.set_paused(true),
            PlaybackState::Paused => self.services.audio.set_paused(false),
            PlaybackState::Stopped => {
                self.play_current();
                Ok(())
            }
        };
        if let Err(err) = result {
            self.show_message(err.to_string(), MessageType::Warning);
        }
    }

    pub fn stop_playback(&mut self) {
        self.services.audio.stop();
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.services.audio.state()
    }

    /// Reacts to the player finishing a verse.
    pub fn poll_audio(&mut self) -> bool {
        match self.services.audio.poll_finished() {
            Some(true) => {
                if self.prefs.auto_advance {
                    self.play_next(true);
                }
                true
            }
            Some(false) => {
                self.show_message("The player stopped with an error", MessageType::Error);
                true
            }
            None => false,
        }
    }

    pub fn bookmark_verse(&mut self, index: usize) {
        let Some(verse) = self.playlist.verses().get(index) else {
            return;
        };
        let key = verse.verse_key.clone();
        let label = format!("{} - {}", self.chapter_name(), key);
        if self.prefs.bookmarks.add(Bookmark {
            key: key.clone(),
            label,
        }) {
            self.persist();
            self.show_message(format!("Bookmarked {key}"), MessageType::Info);
        } else {
            self.show_message(format!("{key} is already bookmarked"), MessageType::Info);
        }
    }

    pub fn remove_bookmark(&mut self, key: &str) {
        if self.prefs.bookmarks.remove(key) {
            self.persist();
        }
    }

    pub fn clear_bookmarks(&mut self) {
        self.prefs.bookmarks.clear();
        self.persist();
    }

    pub fn export_bookmarks(&mut self) {
        match self.prefs.bookmarks.export_to(&self.download_dir) {
            Ok(Some(path)) => self.show_message(
                format!("Bookmarks exported to {}", path.display()),
                MessageType::Info,
            ),
            Ok(None) => self.show_message("No bookmarks to export", MessageType::Warning),
            Err(err) => {
                tracing::warn!("bookmark export failed: {err}");
                self.show_message(format!("Export failed: {err}"), MessageType::Error);
            }
        }
    }

    pub fn clear_history(&mut self) {
        self.prefs.history.clear();
        self.persist();
    }

    pub fn copy_text(&self, index: usize) -> Option<String> {
        self.playlist.verses().get(index).map(Verse::clipboard_text)
    }

    pub fn download_verse(&mut self, index: usize) {
        let Some(verse) = self.playlist.verses().get(index) else {
            return;
        };
        let url = verse_audio_url(&self.settings.audio_cdn, verse.id);
        let verse_key = verse.verse_key.clone();
        let dir = self.download_dir.clone();
        let timeout = Duration::from_secs(self.settings.request_timeout_secs.max(1) * 4);
        let tx = self.tx.clone();
        self.show_message(format!("Downloading {verse_key}..."), MessageType::Info);
        self.services.executor.execute(Box::new(move || {
            let result =
                download_verse_audio(&url, &dir, &verse_key, timeout).map_err(|e| e.to_string());
            let _ = tx.send(Response::Download { verse_key, result });
        }));
    }

    pub fn set_translation(&mut self, translation_id: u32) {
        if translation_id == 0 {
            return;
        }
        self.prefs.translation_id = translation_id;
        if let Some(chapter_id) = self.current_chapter.as_ref().map(|c| c.id) {
            self.load_surah(chapter_id);
        }
        self.load_random();
        self.persist();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.prefs.theme = theme;
        self.persist();
    }

    pub fn cycle_theme(&mut self) {
        self.set_theme(self.prefs.theme.next());
    }

    pub fn enlarge_font(&mut self) {
        self.prefs.font_size = self.prefs.font_size.larger();
        self.persist();
    }

    pub fn shrink_font(&mut self) {
        self.prefs.font_size = self.prefs.font_size.smaller();
        self.persist();
    }

    pub fn toggle_auto_advance(&mut self) {
        self.prefs.auto_advance = !self.prefs.auto_advance;
        self.persist();
    }

    pub fn filtered_chapters(&self) -> Vec<&Chapter> {
        self.chapter_filter.apply(&self.chapters)
    }

    /// Positions of the loaded verses that pass the verse filter.
    pub fn visible_verses(&self) -> Vec<usize> {
        filter_verses(self.playlist.verses(), &self.verse_filter)
    }

    pub fn chapter_name(&self) -> String {
        self.current_chapter
            .as_ref()
            .map(|c| c.name_arabic.clone())
            .unwrap_or_default()
    }

    /// Title for the terminal window while a verse is active.
    pub fn media_title(&self) -> Option<String> {
        self.now_playing.as_ref()?;
        Some(format!("سورة {} - {}", self.chapter_name(), DEFAULT_RECITER))
    }

    pub fn show_message(&mut self, text: impl Into<String>, kind: MessageType) {
        self.message = Some(TimedMessage {
            text: text.into(),
            kind,
            at: Instant::now(),
        });
    }

    /// Expires timed messages and highlights. Returns true when something changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        if self
            .message
            .as_ref()
            .is_some_and(|m| now.duration_since(m.at) >= MESSAGE_TTL)
        {
            self.message = None;
            changed = true;
        }
        if self
            .highlight
            .as_ref()
            .is_some_and(|(_, at)| now.duration_since(*at) >= HIGHLIGHT_TTL)
        {
            self.highlight = None;
            changed = true;
        }
        changed
    }

    pub fn is_highlighted(&self, verse_key: &str) -> bool {
        self.highlight
            .as_ref()
            .is_some_and(|(key, _)| key == verse_key)
    }

    fn persist(&self) {
        if let Err(err) = self.prefs.persist(self.services.storage.as_ref()) {
            tracing::warn!("could not save preferences: {err}");
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::api::CancelToken;
    use crate::models::{PageMeta, RevelationPlace, TranslatedName, VerseTranslation};
    use crate::storage::LocalStorage;
    use std::sync::Mutex;

    pub fn chapter(id: u32, arabic: &str, simple: &str) -> Chapter {
        Chapter {
            id,
            name_arabic: arabic.to_string(),
            name_simple: simple.to_string(),
            translated_name: Some(TranslatedName {
                name: format!("Chapter {id}"),
            }),
            verses_count: 0,
            revelation_place: RevelationPlace::Meccan,
        }
    }

    pub fn verse(chapter: u32, number: u32) -> Verse {
        Verse {
            id: chapter * 1000 + number,
            verse_key: format!("{chapter}:{number}"),
            text_uthmani: format!("نص {chapter}:{number}"),
            translations: vec![VerseTranslation {
                resource_id: Some(20),
                text: format!("translation of {chapter}:{number}"),
            }],
        }
    }

    /// In-memory API: `verse_counts[chapter]` verses per chapter, paged by `per_page`.
    #[derive(Default)]
    pub struct FakeSource {
        pub chapters: Vec<Chapter>,
        pub verse_counts: Vec<(u32, u32)>,
        /// Verse pages from this number on fail with HTTP 500.
        pub fail_verses_from: Option<u32>,
        /// Chapters, random verse and search fail with HTTP 500.
        pub fail_lookups: bool,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn log(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl QuranSource for FakeSource {
        fn chapters(&self, cancel: &CancelToken) -> Result<Vec<Chapter>, ApiError> {
            self.log("chapters".to_string());
            if cancel.is_cancelled() {
                return Err(ApiError::Cancelled);
            }
            if self.fail_lookups {
                return Err(ApiError::Status(500));
            }
            Ok(self.chapters.clone())
        }

        fn verses_by_chapter(
            &self,
            chapter_id: u32,
            translation_id: u32,
            page: u32,
            per_page: u32,
            cancel: &CancelToken,
        ) -> Result<VersePage, ApiError> {
            self.log(format!("verses {chapter_id} p{page} t{translation_id}"));
            if cancel.is_cancelled() {
                return Err(ApiError::Cancelled);
            }
            if self.fail_verses_from.is_some_and(|from| page >= from) {
                return Err(ApiError::Status(500));
            }
            let count = self
                .verse_counts
                .iter()
                .find(|(id, _)| *id == chapter_id)
                .map(|(_, n)| *n)
                .unwrap_or(0);
            let total_pages = count.div_ceil(per_page);
            let first = (page - 1) * per_page + 1;
            let last = (page * per_page).min(count);
            Ok(VersePage {
                verses: (first..=last).map(|n| verse(chapter_id, n)).collect(),
                meta: PageMeta {
                    total_pages: Some(total_pages),
                    current_page: Some(page),
                },
            })
        }

        fn translations(&self, _: &CancelToken) -> Result<Vec<TranslationResource>, ApiError> {
            self.log("translations".to_string());
            Ok(vec![
                TranslationResource {
                    id: 20,
                    language_name: "English".to_string(),
                    author_name: "Saheeh International".to_string(),
                },
                TranslationResource {
                    id: 77,
                    language_name: "Turkish".to_string(),
                    author_name: "Diyanet".to_string(),
                },
            ])
        }

        fn random_verse(&self, translation_id: u32, _: &CancelToken) -> Result<Verse, ApiError> {
            self.log(format!("random t{translation_id}"));
            if self.fail_lookups {
                return Err(ApiError::Status(500));
            }
            Ok(verse(2, 255))
        }

        fn search(
            &self,
            query: &str,
            _: u32,
            _: &CancelToken,
        ) -> Result<Vec<SearchHit>, ApiError> {
            self.log(format!("search {query}"));
            if self.fail_lookups {
                return Err(ApiError::Status(500));
            }
            Ok(vec![SearchHit {
                verse_key: "55:13".to_string(),
                text: query.to_string(),
            }])
        }
    }

    #[derive(Default)]
    pub struct AudioLog {
        pub played: Vec<String>,
        pub finished: Option<bool>,
        pub state: Option<PlaybackState>,
    }

    /// Records what would have been played; tests finish tracks by hand.
    #[derive(Clone, Default)]
    pub struct FakeAudio(pub Arc<Mutex<AudioLog>>);

    impl AudioOutput for FakeAudio {
        fn play(&mut self, url: &str) -> eyre::Result<()> {
            let mut log = self.0.lock().unwrap();
            log.played.push(url.to_string());
            log.state = Some(PlaybackState::Playing);
            Ok(())
        }

        fn stop(&mut self) {
            self.0.lock().unwrap().state = Some(PlaybackState::Stopped);
        }

        fn set_paused(&mut self, paused: bool) -> eyre::Result<()> {
            self.0.lock().unwrap().state = Some(if paused {
                PlaybackState::Paused
            } else {
                PlaybackState::Playing
            });
            Ok(())
        }

        fn state(&self) -> PlaybackState {
            self.0.lock().unwrap().state.unwrap_or(PlaybackState::Stopped)
        }

        fn poll_finished(&mut self) -> Option<bool> {
            let mut log = self.0.lock().unwrap();
            let finished = log.finished.take();
            if finished.is_some() {
                log.state = Some(PlaybackState::Stopped);
            }
            finished
        }
    }

    /// Holds jobs until the test releases them.
    #[derive(Clone, Default)]
    pub struct QueuedExecutor(pub Arc<Mutex<Vec<Job>>>);

    impl QueuedExecutor {
        pub fn run_all(&self) {
            let jobs: Vec<Job> = std::mem::take(&mut *self.0.lock().unwrap());
            for job in jobs {
                job();
            }
        }
    }

    impl Executor for QueuedExecutor {
        fn execute(&self, job: Job) {
            self.0.lock().unwrap().push(job);
        }
    }

    pub fn fake_source() -> FakeSource {
        FakeSource {
            chapters: vec![
                chapter(1, "الفاتحة", "Al-Fatihah"),
                chapter(2, "البقرة", "Al-Baqarah"),
                chapter(108, "الكوثر", "Al-Kawthar"),
            ],
            verse_counts: vec![(1, 7), (2, 286), (108, 3)],
            ..FakeSource::default()
        }
    }

    pub fn settings_with_page(per_page: u32) -> Settings {
        Settings {
            verses_per_page: per_page,
            audio_cdn: "https://cdn.test/audio".to_string(),
            ..Settings::default()
        }
    }

    /// App over the fake source with startup fetches already applied.
    pub fn started_app(per_page: u32) -> (App, FakeAudio) {
        let audio = FakeAudio::default();
        let services = AppServices {
            source: Arc::new(fake_source()),
            storage: Box::new(LocalStorage::in_memory().unwrap()),
            audio: Box::new(audio.clone()),
            executor: Box::new(InlineExecutor),
        };
        let mut app = App::new(settings_with_page(per_page), std::env::temp_dir(), services);
        app.start(None);
        app.process_responses();
        (app, audio)
    }
}
