use crate::api::ApiError;
use crate::models::{Verse, VersePage};

pub const DEFAULT_PER_PAGE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub per_page: u32,
    pub current_page: u32,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(per_page: u32) -> Self {
        Self {
            per_page: per_page.max(1),
            current_page: 1,
            has_more: false,
        }
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
        self.has_more = false;
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

/// What advancing playback should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Play(usize),
    FetchMore,
    Exhausted,
    Idle,
}

/// Supplies further pages of a chapter to the synchronous driver.
pub trait PageSource {
    fn fetch_page(&mut self, chapter_id: u32, page: u32, per_page: u32) -> Result<VersePage, ApiError>;
}

/// The loaded verse sequence of one chapter plus the playback position in it.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    chapter_id: Option<u32>,
    verses: Vec<Verse>,
    index: Option<usize>,
    pagination: Pagination,
}

impl Playlist {
    pub fn new(per_page: u32) -> Self {
        Self {
            pagination: Pagination::new(per_page),
            ..Self::default()
        }
    }

    /// Switches to a new chapter: clears verses, position and pagination.
    pub fn begin_chapter(&mut self, chapter_id: u32) {
        self.chapter_id = Some(chapter_id);
        self.verses.clear();
        self.index = None;
        self.pagination.reset();
    }

    /// Page number to request for "load more", if the chapter has one.
    pub fn next_page(&self) -> Option<(u32, u32)> {
        let chapter_id = self.chapter_id?;
        if self.pagination.has_more {
            Some((chapter_id, self.pagination.current_page + 1))
        } else {
            None
        }
    }

    /// Installs a fetched page. Replacing drops the position, appending keeps it.
    pub fn apply_page(&mut self, page_number: u32, page: VersePage, append: bool) {
        if append {
            self.verses.extend(page.verses);
        } else {
            self.verses = page.verses;
            self.index = None;
        }
        self.pagination.current_page = page_number;
        self.pagination.has_more = page.meta.has_more();
    }

    pub fn chapter_id(&self) -> Option<u32> {
        self.chapter_id
    }

    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn current(&self) -> Option<&Verse> {
        self.index.and_then(|i| self.verses.get(i))
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn position_of(&self, verse_key: &str) -> Option<usize> {
        self.verses.iter().position(|v| v.verse_key == verse_key)
    }

    /// Marks `index` as the active verse; out-of-range positions are ignored.
    pub fn play_at(&mut self, index: usize) -> Option<&Verse> {
        if index < self.verses.len() {
            self.index = Some(index);
            self.verses.get(index)
        } else {
            None
        }
    }

    pub fn next_step(&self, auto: bool) -> Step {
        if self.verses.is_empty() {
            return Step::Idle;
        }
        let next = self.index.map_or(0, |i| i + 1);
        if next < self.verses.len() {
            Step::Play(next)
        } else if self.pagination.has_more {
            Step::FetchMore
        } else if auto {
            Step::Exhausted
        } else {
            Step::Idle
        }
    }

    /// Continuation of a `FetchMore` once the next page was appended.
    pub fn after_append(&self, auto: bool) -> Step {
        let next = self.index.map_or(0, |i| i + 1);
        if next < self.verses.len() {
            Step::Play(next)
        } else if auto {
            Step::Exhausted
        } else {
            Step::Idle
        }
    }

    pub fn previous_index(&self) -> Option<usize> {
        match self.index {
            Some(i) if i > 0 && !self.verses.is_empty() => Some(i - 1),
            _ => None,
        }
    }

    pub fn can_previous(&self) -> bool {
        self.previous_index().is_some()
    }

    pub fn can_next(&self) -> bool {
        if self.verses.is_empty() {
            return false;
        }
        match self.index {
            None => true,
            Some(i) => self.pagination.has_more || i + 1 < self.verses.len(),
        }
    }

    /// Advances playback, fetching the next page through `source` when the
    /// loaded verses run out.
    pub fn play_next<S: PageSource>(&mut self, source: &mut S, auto: bool) -> Result<Step, ApiError> {
        let step = match self.next_step(auto) {
            Step::FetchMore => match self.next_page() {
                Some((chapter_id, page_number)) => {
                    let page = source.fetch_page(chapter_id, page_number, self.pagination.per_page)?;
                    self.apply_page(page_number, page, true);
                    self.after_append(auto)
                }
                None => self.after_append(auto),
            },
            step => step,
        };
        if let Step::Play(i) = step {
            self.play_at(i);
        }
        Ok(step)
    }

    pub fn play_previous(&mut self) -> Option<usize> {
        let previous = self.previous_index()?;
        self.play_at(previous);
        Some(previous)
    }
}
