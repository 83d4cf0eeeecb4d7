pub mod keys;

use arboard::Clipboard;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyEventKind};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;
use crate::audio::PlaybackState;
use crate::models::{LoadStatus, MessageType, WindowType};
use crate::settings::DEFAULT_RECITER;
use crate::ui::Palette;
use crate::ui::board::{Board, scroll_top, verse_height};
use crate::ui::reader::keys::{Effect, handle_key_event};
use crate::ui::windows::{
    bookmarks::BookmarksWindow, chapters::ChaptersWindow, confirm::ConfirmWindow, help::HelpWindow,
    history::HistoryWindow, search::SearchWindow, translations::TranslationsWindow,
};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Which text field keystrokes go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    VerseFilter,
    ChapterFilter,
    QuickChapter,
    Search,
}

/// UI-specific state management
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub active_window: WindowType,
    pub input: Option<InputMode>,
    /// Position in the filtered verse list.
    pub selected_verse: usize,
    pub top_verse: usize,
    pub chapters_selected: usize,
    pub bookmarks_selected: usize,
    pub history_selected: usize,
    pub search_selected: usize,
    pub translations_selected: usize,
    pub search_input: String,
    pub help_scroll_offset: u16,
    pub should_quit: bool,
}

impl UiState {
    pub fn open_window(&mut self, window_type: WindowType) {
        match window_type {
            WindowType::Chapters => self.chapters_selected = 0,
            WindowType::Bookmarks => self.bookmarks_selected = 0,
            WindowType::History => self.history_selected = 0,
            WindowType::Search => self.search_selected = 0,
            WindowType::Help => self.help_scroll_offset = 0,
            _ => {}
        }
        self.active_window = window_type;
    }

    pub fn close_window(&mut self) {
        self.active_window = WindowType::Reader;
        self.input = None;
    }

    pub fn reset_verse_selection(&mut self) {
        self.selected_verse = 0;
        self.top_verse = 0;
    }

    fn reset_list_for(&mut self, mode: InputMode) {
        match mode {
            InputMode::VerseFilter => self.reset_verse_selection(),
            InputMode::ChapterFilter | InputMode::QuickChapter => self.chapters_selected = 0,
            InputMode::Search => {}
        }
    }

    /// Playlist index of the selected verse.
    pub fn selected_index(&self, app: &App) -> Option<usize> {
        let visible = app.visible_verses();
        visible
            .get(self.selected_verse.min(visible.len().saturating_sub(1)))
            .copied()
    }

    pub fn move_verse_selection(&mut self, app: &App, delta: isize) {
        let len = app.visible_verses().len();
        if len == 0 {
            self.selected_verse = 0;
            return;
        }
        let target = self.selected_verse as isize + delta;
        self.selected_verse = target.clamp(0, len as isize - 1) as usize;
    }

    /// Selects `verse_key`, dropping the verse filter when it hides the verse.
    pub fn focus_verse(&mut self, app: &mut App, verse_key: &str) {
        let Some(index) = app.playlist.position_of(verse_key) else {
            return;
        };
        if !app.visible_verses().contains(&index) {
            app.verse_filter.clear();
        }
        if let Some(pos) = app.visible_verses().iter().position(|&i| i == index) {
            self.selected_verse = pos;
        }
    }

    /// Keeps the selected verse inside the board viewport.
    pub fn sync_scroll(&mut self, app: &App, board_area: Rect) {
        let visible = app.visible_verses();
        if visible.is_empty() {
            self.reset_verse_selection();
            return;
        }
        self.selected_verse = self.selected_verse.min(visible.len() - 1);
        let width = Board::text_width(app, board_area);
        let heights: Vec<usize> = visible
            .iter()
            .map(|&i| verse_height(&app.playlist.verses()[i], width, app.settings.show_translation))
            .collect();
        let viewport = board_area.height.saturating_sub(2) as usize;
        self.top_verse = scroll_top(&heights, self.selected_verse, self.top_verse, viewport);
    }
}

/// Screen regions of the main view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderLayout {
    pub header: Rect,
    pub random: Rect,
    pub board: Rect,
    pub filter: Rect,
    pub player: Rect,
}

impl ReaderLayout {
    pub fn new(area: Rect, show_filter: bool) -> Self {
        let chunks = Layout::default()
            .direction(ratatui::layout::Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(4),
                Constraint::Min(3),
                Constraint::Length(if show_filter { 1 } else { 0 }),
                Constraint::Length(4),
            ])
            .split(area);
        Self {
            header: chunks[0],
            random: chunks[1],
            board: chunks[2],
            filter: chunks[3],
            player: chunks[4],
        }
    }

    pub fn for_frame(area: Rect, app: &App, ui: &UiState) -> Self {
        let show_filter = ui.input == Some(InputMode::VerseFilter) || !app.verse_filter.is_empty();
        Self::new(area, show_filter)
    }
}

/// Main reader application struct
pub struct Reader {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    app: App,
    ui: UiState,
    clipboard: Option<Clipboard>,
    title: Option<String>,
}

impl Reader {
    pub fn new(app: App) -> eyre::Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        let clipboard = match Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(err) => {
                tracing::warn!("clipboard unavailable: {err}");
                None
            }
        };

        Ok(Self {
            terminal,
            app,
            ui: UiState::default(),
            clipboard,
            title: None,
        })
    }

    /// Run the main application loop
    pub fn run(&mut self) -> eyre::Result<()> {
        crossterm::terminal::enable_raw_mode()?;
        crossterm::execute!(io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
        self.terminal.clear()?;
        self.terminal.hide_cursor()?;

        let result = self.event_loop();

        self.app.stop_playback();
        self.terminal.clear()?;
        self.terminal.show_cursor()?;
        crossterm::execute!(
            io::stdout(),
            crossterm::terminal::SetTitle(""),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        crossterm::terminal::disable_raw_mode()?;

        result
    }

    fn event_loop(&mut self) -> eyre::Result<()> {
        while !self.ui.should_quit {
            self.app.process_responses();
            self.app.poll_audio();
            self.app.tick(Instant::now());
            if let Some(key) = self.app.focus_request.take() {
                self.ui.focus_verse(&mut self.app, &key);
            }
            self.update_title()?;

            let app = &self.app;
            let ui = &mut self.ui;
            self.terminal.draw(|frame| {
                let layout = ReaderLayout::for_frame(frame.area(), app, ui);
                ui.sync_scroll(app, layout.board);
                render_static(frame, app, ui);
            })?;

            if !crossterm::event::poll(POLL_INTERVAL)? {
                continue;
            }
            if let Event::Key(key) = crossterm::event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Effect::Copy(text) = handle_key_event(&mut self.app, &mut self.ui, key) {
                        self.copy_to_clipboard(text);
                    }
                }
            }
        }
        Ok(())
    }

    fn copy_to_clipboard(&mut self, text: String) {
        let result = match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.set_text(text).map_err(|e| e.to_string()),
            None => Err("clipboard unavailable".to_string()),
        };
        match result {
            Ok(()) => self.app.show_message("Copied", MessageType::Info),
            Err(err) => self
                .app
                .show_message(format!("Copy failed: {err}"), MessageType::Error),
        }
    }

    /// Mirrors the playing verse into the terminal title.
    fn update_title(&mut self) -> eyre::Result<()> {
        let title = self.app.media_title();
        if title != self.title {
            let text = title.clone().unwrap_or_else(|| "tilawa".to_string());
            crossterm::execute!(io::stdout(), crossterm::terminal::SetTitle(text))?;
            self.title = title;
        }
        Ok(())
    }
}

pub fn render_static(frame: &mut Frame, app: &App, ui: &UiState) {
    let palette = Palette::for_theme(app.prefs.theme);
    frame.render_widget(Block::default().style(palette.base()), frame.area());

    let layout = ReaderLayout::for_frame(frame.area(), app, ui);
    render_header(frame, layout.header, app, &palette);
    render_random(frame, layout.random, app, &palette);
    Board::new(palette)
        .with_selection(ui.selected_verse, ui.top_verse)
        .render(frame, layout.board, app);
    if layout.filter.height > 0 {
        render_filter(frame, layout.filter, app, ui, &palette);
    }
    render_player(frame, layout.player, app, &palette);

    let area = frame.area();
    let editing = |mode: InputMode| ui.input == Some(mode);
    match ui.active_window {
        WindowType::Reader => {}
        WindowType::Chapters => {
            let chapters = app.filtered_chapters();
            ChaptersWindow::render(
                frame,
                area,
                &chapters,
                ui.chapters_selected,
                &app.chapter_filter,
                editing(InputMode::ChapterFilter) || editing(InputMode::QuickChapter),
                app.status.chapters,
                &palette,
            );
        }
        WindowType::Bookmarks => {
            BookmarksWindow::render(frame, area, &app.prefs.bookmarks, ui.bookmarks_selected, &palette)
        }
        WindowType::ConfirmClearBookmarks => {
            BookmarksWindow::render(frame, area, &app.prefs.bookmarks, ui.bookmarks_selected, &palette);
            ConfirmWindow::render(frame, area, "Remove all bookmarks?", &palette);
        }
        WindowType::History => {
            HistoryWindow::render(frame, area, &app.prefs.history, ui.history_selected, &palette)
        }
        WindowType::Search => {
            let query = if editing(InputMode::Search) {
                ui.search_input.as_str()
            } else if app.search_results.is_some() {
                app.search_query.as_str()
            } else {
                ui.search_input.as_str()
            };
            SearchWindow::render(
                frame,
                area,
                query,
                editing(InputMode::Search),
                app.search_results.as_deref(),
                ui.search_selected,
                app.status.search,
                &palette,
            );
        }
        WindowType::Translations => TranslationsWindow::render(
            frame,
            area,
            &app.translations,
            app.prefs.translation_id,
            ui.translations_selected,
            &palette,
        ),
        WindowType::Help => HelpWindow::render(frame, area, ui.help_scroll_offset, &palette),
    }
}

/// Centered title with right-aligned status text, padded to `width` columns.
pub fn build_header_line(title: &str, right_text: Option<&str>, width: u16) -> String {
    let width = width as usize;
    if width == 0 {
        return String::new();
    }

    let mut buffer = vec![' '; width];
    let right: Vec<char> = right_text.map(|t| t.chars().collect()).unwrap_or_default();
    let content_width = if right.is_empty() {
        width
    } else {
        width.saturating_sub(right.len() + 1)
    };

    let title: Vec<char> = title.chars().take(content_width).collect();
    let title_start = content_width.saturating_sub(title.len()) / 2;
    for (i, ch) in title.iter().enumerate() {
        if title_start + i < buffer.len() {
            buffer[title_start + i] = *ch;
        }
    }

    let start = width.saturating_sub(right.len());
    for (i, ch) in right.iter().enumerate() {
        if start + i < buffer.len() {
            buffer[start + i] = *ch;
        }
    }

    buffer.into_iter().collect()
}

fn status_text(app: &App) -> String {
    format!(
        "surahs: {}  verses: {}",
        app.status.chapters.label(),
        app.status.verses.label()
    )
}

fn render_header(frame: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let title = match &app.current_chapter {
        Some(chapter) => format!("tilawa • {} • {}", chapter.name_arabic, chapter.info_line()),
        None => "tilawa".to_string(),
    };
    let line = build_header_line(&title, Some(&status_text(app)), area.width);
    let style = match (app.status.chapters, app.status.verses) {
        (LoadStatus::Failed, _) | (_, LoadStatus::Failed) => palette.accent(),
        _ => palette.muted(),
    };
    frame.render_widget(Paragraph::new(Line::from(line)).style(style), area);
}

fn render_random(frame: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let title = match &app.random_verse {
        Some(verse) => format!(" Verse of the moment ({}) ", verse.verse_key),
        None => " Verse of the moment ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_bottom(Line::from(" R refresh  o open ").style(palette.muted()))
        .style(palette.base());

    let lines = match (&app.random_verse, app.status.random) {
        (_, LoadStatus::Loading) => vec![Line::from("loading...").style(palette.muted())],
        (_, LoadStatus::Failed) => vec![Line::from("Could not load a verse").style(palette.muted())],
        (Some(verse), _) => {
            let mut lines =
                vec![Line::from(verse.text_uthmani.clone()).alignment(Alignment::Right)];
            if let Some(translation) = verse.first_translation() {
                lines.push(Line::from(translation).style(palette.muted()));
            }
            lines
        }
        (None, _) => Vec::new(),
    };
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_filter(frame: &mut Frame, area: Rect, app: &App, ui: &UiState, palette: &Palette) {
    let cursor = if ui.input == Some(InputMode::VerseFilter) { "_" } else { "" };
    let text = format!(
        "/{}{}  ({} of {} verses)",
        app.verse_filter,
        cursor,
        app.visible_verses().len(),
        app.playlist.len()
    );
    frame.render_widget(Paragraph::new(text).style(palette.accent()), area);
}

fn render_player(frame: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Recitation • {DEFAULT_RECITER} "))
        .style(palette.base());

    let (icon, now_playing) = match (app.playback_state(), &app.now_playing) {
        (PlaybackState::Playing, Some(text)) => ("▶", text.as_str()),
        (PlaybackState::Paused, Some(text)) => ("⏸", text.as_str()),
        _ => ("■", "Nothing playing"),
    };
    let enabled = |on: bool| {
        if on {
            palette.base().add_modifier(Modifier::BOLD)
        } else {
            palette.muted().add_modifier(Modifier::DIM)
        }
    };
    let auto = if app.prefs.auto_advance { "on" } else { "off" };
    let controls = Line::from(vec![
        Span::styled(format!("{icon} {now_playing}  "), palette.accent()),
        Span::styled("⏮ p ", enabled(app.playlist.can_previous())),
        Span::styled("⏭ n ", enabled(app.playlist.can_next())),
        Span::styled(
            format!(
                " auto: {auto}  theme: {}  font: {}",
                app.prefs.theme.label(),
                app.prefs.font_size
            ),
            palette.muted(),
        ),
    ]);

    let message = match &app.message {
        Some(message) => {
            let color = match message.kind {
                MessageType::Info => palette.accent,
                MessageType::Warning => ratatui::style::Color::Yellow,
                MessageType::Error => ratatui::style::Color::Red,
            };
            Line::from(message.text.clone()).style(Style::default().fg(color).bg(palette.background))
        }
        None => Line::from(""),
    };

    frame.render_widget(Paragraph::new(vec![controls, message]).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::started_app;
    use ratatui::backend::TestBackend;

    fn screen_text(app: &App, ui: &mut UiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal
            .draw(|frame| {
                let layout = ReaderLayout::for_frame(frame.area(), app, ui);
                ui.sync_scroll(app, layout.board);
                render_static(frame, app, ui);
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_build_header_line_counts_chars() {
        let line = build_header_line("سورة", Some("ok"), 12);
        assert_eq!(line.chars().count(), 12);
        assert!(line.ends_with("ok"));
        assert_eq!(build_header_line("x", None, 0), "");
    }

    #[test]
    fn test_render_empty_reader() {
        let (app, _) = started_app(5);
        let text = screen_text(&app, &mut UiState::default());
        assert!(text.contains("Press c to choose a surah."));
        assert!(text.contains("Verse of the moment (2:255)"));
        assert!(text.contains("Nothing playing"));
    }

    #[test]
    fn test_render_chapter_with_playing_verse() {
        let (mut app, _) = started_app(5);
        app.load_surah(1);
        app.process_responses();
        app.play_index(0);
        app.bookmark_verse(0);

        let text = screen_text(&app, &mut UiState::default());
        assert!(text.contains("﴿1:1﴾ ▶ ★"));
        assert!(text.contains("translation of 1:2"));
        assert!(text.contains("m: load more verses"));
        assert!(text.contains("Bookmarked 1:1"));
    }

    #[test]
    fn test_render_chapters_window() {
        let (app, _) = started_app(5);
        let mut ui = UiState::default();
        ui.open_window(WindowType::Chapters);
        let text = screen_text(&app, &mut ui);
        assert!(text.contains("Surahs [all]"));
        assert!(text.contains("Al-Kawthar"));
    }

    #[test]
    fn test_focus_clears_hiding_filter() {
        let (mut app, _) = started_app(5);
        app.load_surah(1);
        app.process_responses();
        app.verse_filter = "1:2".to_string();

        let mut ui = UiState::default();
        ui.focus_verse(&mut app, "1:4");
        assert!(app.verse_filter.is_empty());
        assert_eq!(ui.selected_index(&app), Some(3));
    }

    #[test]
    fn test_selection_scrolls_board() {
        let (mut app, _) = started_app(5);
        app.load_surah(2);
        app.process_responses();
        let mut ui = UiState {
            selected_verse: 4,
            ..UiState::default()
        };
        let layout = ReaderLayout::new(Rect::new(0, 0, 100, 20), false);
        ui.sync_scroll(&app, layout.board);
        assert!(ui.top_verse > 0);
        assert!(ui.top_verse <= 4);
    }
}
