use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::App;
use crate::models::{MessageType, WindowType};
use crate::ui::reader::{InputMode, UiState};
use crate::ui::windows::help::HelpWindow;

/// Side effect the reader has to carry out after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Copy(String),
}

pub fn handle_key_event(app: &mut App, ui: &mut UiState, key: KeyEvent) -> Effect {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        ui.should_quit = true;
        return Effect::None;
    }

    if let Some(mode) = ui.input {
        handle_input_keys(app, ui, mode, key);
        return Effect::None;
    }

    let window = ui.active_window.clone();
    match window {
        WindowType::Reader => return handle_normal_mode_keys(app, ui, key),
        WindowType::Chapters => handle_chapters_keys(app, ui, key),
        WindowType::Bookmarks => handle_bookmarks_keys(app, ui, key),
        WindowType::ConfirmClearBookmarks => handle_confirm_keys(app, ui, key),
        WindowType::History => handle_history_keys(app, ui, key),
        WindowType::Search => handle_search_keys(app, ui, key),
        WindowType::Translations => handle_translations_keys(app, ui, key),
        WindowType::Help => handle_help_keys(ui, key),
    }
    Effect::None
}

fn input_target<'a>(app: &'a mut App, ui: &'a mut UiState, mode: InputMode) -> &'a mut String {
    match mode {
        InputMode::VerseFilter => &mut app.verse_filter,
        InputMode::ChapterFilter => &mut app.chapter_filter.text,
        InputMode::QuickChapter => &mut app.chapter_filter.quick_text,
        InputMode::Search => &mut ui.search_input,
    }
}

fn handle_input_keys(app: &mut App, ui: &mut UiState, mode: InputMode, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            ui.input = None;
            if mode == InputMode::Search {
                app.close_search();
                ui.close_window();
            } else {
                input_target(app, ui, mode).clear();
            }
        }
        KeyCode::Enter => {
            ui.input = None;
            if mode == InputMode::Search {
                app.run_search(&ui.search_input);
                ui.search_selected = 0;
            }
        }
        KeyCode::Backspace => {
            input_target(app, ui, mode).pop();
            ui.reset_list_for(mode);
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            input_target(app, ui, mode).push(c);
            ui.reset_list_for(mode);
        }
        _ => {}
    }
}

/// Handle keys on the verse list
fn handle_normal_mode_keys(app: &mut App, ui: &mut UiState, key: KeyEvent) -> Effect {
    match key.code {
        KeyCode::Char('q') => ui.should_quit = true,
        KeyCode::Esc => {
            if !app.verse_filter.is_empty() {
                app.verse_filter.clear();
                ui.reset_verse_selection();
            }
        }
        KeyCode::Char('j') | KeyCode::Down => ui.move_verse_selection(app, 1),
        KeyCode::Char('k') | KeyCode::Up => ui.move_verse_selection(app, -1),
        KeyCode::PageDown => ui.move_verse_selection(app, 5),
        KeyCode::PageUp => ui.move_verse_selection(app, -5),
        KeyCode::Char('g') | KeyCode::Home => ui.selected_verse = 0,
        KeyCode::Char('G') | KeyCode::End => {
            ui.selected_verse = app.visible_verses().len().saturating_sub(1);
        }
        KeyCode::Enter => {
            if let Some(index) = ui.selected_index(app) {
                app.play_index(index);
            }
        }
        KeyCode::Char(' ') => app.toggle_pause(),
        KeyCode::Char('n') => app.play_next(false),
        KeyCode::Char('p') => app.play_previous(),
        KeyCode::Char('x') => app.stop_playback(),
        KeyCode::Char('a') => {
            app.toggle_auto_advance();
            let state = if app.prefs.auto_advance { "on" } else { "off" };
            app.show_message(format!("Auto-advance {state}"), MessageType::Info);
        }
        KeyCode::Char('y') => {
            if let Some(text) = ui.selected_index(app).and_then(|i| app.copy_text(i)) {
                return Effect::Copy(text);
            }
        }
        KeyCode::Char('b') => {
            if let Some(index) = ui.selected_index(app) {
                app.bookmark_verse(index);
            }
        }
        KeyCode::Char('d') => {
            if let Some(index) = ui.selected_index(app) {
                app.download_verse(index);
            }
        }
        KeyCode::Char('m') => {
            if !app.load_more() {
                app.show_message("All verses of this surah are loaded", MessageType::Info);
            }
        }
        KeyCode::Char('/') => {
            ui.input = Some(InputMode::VerseFilter);
            ui.reset_verse_selection();
        }
        KeyCode::Char('c') => ui.open_window(WindowType::Chapters),
        KeyCode::Char('f') => {
            ui.open_window(WindowType::Chapters);
            app.chapter_filter.quick_text.clear();
            ui.input = Some(InputMode::QuickChapter);
        }
        KeyCode::Char('B') => ui.open_window(WindowType::Bookmarks),
        KeyCode::Char('r') => ui.open_window(WindowType::History),
        KeyCode::Char('s') => {
            ui.search_input.clear();
            ui.open_window(WindowType::Search);
            ui.input = Some(InputMode::Search);
        }
        KeyCode::Char('t') => {
            ui.open_window(WindowType::Translations);
            ui.translations_selected = app
                .translations
                .iter()
                .position(|t| t.id == app.prefs.translation_id)
                .unwrap_or(0);
        }
        KeyCode::Char('R') => app.load_random(),
        KeyCode::Char('o') => app.open_random_verse(),
        KeyCode::Char('T') => {
            app.cycle_theme();
            app.show_message(format!("Theme: {}", app.prefs.theme.label()), MessageType::Info);
        }
        KeyCode::Char('+') | KeyCode::Char('=') => app.enlarge_font(),
        KeyCode::Char('-') => app.shrink_font(),
        KeyCode::Char('?') => ui.open_window(WindowType::Help),
        _ => {}
    }
    Effect::None
}

/// Shared list navigation. Returns true when the key was consumed.
fn handle_list_nav(ui: &mut UiState, key: &KeyEvent, list_len: usize, index: &mut usize) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            ui.close_window();
            true
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if list_len > 0 {
                *index = (*index + 1).min(list_len - 1);
            }
            true
        }
        KeyCode::Char('k') | KeyCode::Up => {
            *index = index.saturating_sub(1);
            true
        }
        _ => false,
    }
}

fn handle_chapters_keys(app: &mut App, ui: &mut UiState, key: KeyEvent) {
    let chapter_ids: Vec<u32> = app.filtered_chapters().iter().map(|c| c.id).collect();
    let mut index = ui.chapters_selected;
    if handle_list_nav(ui, &key, chapter_ids.len(), &mut index) {
        ui.chapters_selected = index;
        return;
    }
    match key.code {
        KeyCode::Enter => {
            if let Some(&id) = chapter_ids.get(index) {
                app.load_surah(id);
                ui.reset_verse_selection();
                ui.close_window();
            }
        }
        KeyCode::Char('/') => ui.input = Some(InputMode::ChapterFilter),
        KeyCode::Char('r') => {
            app.chapter_filter.place = app.chapter_filter.place.next();
            ui.chapters_selected = 0;
        }
        _ => {}
    }
}

fn handle_bookmarks_keys(app: &mut App, ui: &mut UiState, key: KeyEvent) {
    let mut index = ui.bookmarks_selected;
    if handle_list_nav(ui, &key, app.prefs.bookmarks.len(), &mut index) {
        ui.bookmarks_selected = index;
        return;
    }
    let selected_key = app.prefs.bookmarks.get(index).map(|b| b.key.clone());
    match key.code {
        KeyCode::Enter => {
            if let Some(verse_key) = selected_key {
                app.open_verse(&verse_key);
                ui.close_window();
            }
        }
        KeyCode::Char('d') => {
            if let Some(verse_key) = selected_key {
                app.remove_bookmark(&verse_key);
                ui.bookmarks_selected = index.min(app.prefs.bookmarks.len().saturating_sub(1));
            }
        }
        KeyCode::Char('C') => {
            if !app.prefs.bookmarks.is_empty() {
                ui.active_window = WindowType::ConfirmClearBookmarks;
            }
        }
        KeyCode::Char('e') => app.export_bookmarks(),
        _ => {}
    }
}

fn handle_confirm_keys(app: &mut App, ui: &mut UiState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.clear_bookmarks();
            ui.bookmarks_selected = 0;
            ui.active_window = WindowType::Bookmarks;
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Char('q') => {
            ui.active_window = WindowType::Bookmarks;
        }
        _ => {}
    }
}

fn handle_history_keys(app: &mut App, ui: &mut UiState, key: KeyEvent) {
    let ids: Vec<u32> = app.prefs.history.recent().iter().map(|e| e.id).collect();
    let mut index = ui.history_selected;
    if handle_list_nav(ui, &key, ids.len(), &mut index) {
        ui.history_selected = index;
        return;
    }
    match key.code {
        KeyCode::Enter => {
            if let Some(&id) = ids.get(index) {
                app.load_surah(id);
                ui.reset_verse_selection();
                ui.close_window();
            }
        }
        KeyCode::Char('C') => {
            app.clear_history();
            ui.history_selected = 0;
        }
        _ => {}
    }
}

fn handle_search_keys(app: &mut App, ui: &mut UiState, key: KeyEvent) {
    let keys: Vec<String> = app
        .search_results
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|hit| hit.verse_key.clone())
        .collect();
    if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
        app.close_search();
    }
    let mut index = ui.search_selected;
    if handle_list_nav(ui, &key, keys.len(), &mut index) {
        ui.search_selected = index;
        return;
    }
    match key.code {
        KeyCode::Enter => {
            if let Some(verse_key) = keys.get(index) {
                app.open_verse(verse_key);
                ui.close_window();
            }
        }
        KeyCode::Char('/') | KeyCode::Char('s') => ui.input = Some(InputMode::Search),
        _ => {}
    }
}

fn handle_translations_keys(app: &mut App, ui: &mut UiState, key: KeyEvent) {
    let mut index = ui.translations_selected;
    if handle_list_nav(ui, &key, app.translations.len(), &mut index) {
        ui.translations_selected = index;
        return;
    }
    if key.code == KeyCode::Enter {
        if let Some(id) = app.translations.get(index).map(|t| t.id) {
            app.set_translation(id);
            ui.close_window();
        }
    }
}

fn handle_help_keys(ui: &mut UiState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => ui.close_window(),
        KeyCode::Char('j') | KeyCode::Down => {
            let max = HelpWindow::get_total_lines().saturating_sub(1) as u16;
            ui.help_scroll_offset = (ui.help_scroll_offset + 1).min(max);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            ui.help_scroll_offset = ui.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
}
