use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;
use crate::audio::PlaybackState;
use crate::models::{LoadStatus, Verse};
use crate::ui::Palette;

/// Per-verse decorations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerseMarks {
    pub playing: bool,
    pub bookmarked: bool,
    pub highlighted: bool,
    pub selected: bool,
}

fn wrap(text: &str, width: u16) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    textwrap::wrap(text, width.max(1) as usize)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

/// Rows one verse takes at `width`, including the trailing gap.
pub fn verse_height(verse: &Verse, width: u16, show_translation: bool) -> usize {
    let translation = if show_translation {
        wrap(&verse.first_translation().unwrap_or_default(), width).len()
    } else {
        0
    };
    1 + wrap(&verse.text_uthmani, width).len() + translation + 1
}

pub fn verse_lines(
    verse: &Verse,
    width: u16,
    show_translation: bool,
    marks: VerseMarks,
    palette: &Palette,
) -> Vec<Line<'static>> {
    let mut base = if marks.selected {
        palette.selected()
    } else {
        palette.base()
    };
    if marks.highlighted {
        base = base.bg(palette.highlight);
    }

    let mut header = vec![Span::styled(
        format!("﴿{}﴾", verse.verse_key),
        base.fg(palette.accent).add_modifier(Modifier::BOLD),
    )];
    if marks.playing {
        header.push(Span::styled(" ▶", base.fg(palette.accent)));
    }
    if marks.bookmarked {
        header.push(Span::styled(" ★", base.fg(palette.accent)));
    }

    let mut lines = vec![Line::from(header).style(base)];
    lines.extend(
        wrap(&verse.text_uthmani, width)
            .into_iter()
            .map(|row| Line::from(row).style(base).alignment(Alignment::Right)),
    );
    if show_translation {
        let muted = base.fg(palette.muted);
        lines.extend(
            wrap(&verse.first_translation().unwrap_or_default(), width)
                .into_iter()
                .map(|row| Line::from(row).style(muted)),
        );
    }
    lines.push(Line::from("").style(base));
    lines
}

/// First verse to draw so that `selected` stays inside a viewport of `height` rows.
pub fn scroll_top(heights: &[usize], selected: usize, top: usize, height: usize) -> usize {
    if heights.is_empty() {
        return 0;
    }
    let selected = selected.min(heights.len() - 1);
    let mut top = top.min(selected);
    while top < selected && heights[top..=selected].iter().sum::<usize>() > height {
        top += 1;
    }
    top
}

/// Verse list of the open chapter.
pub struct Board {
    palette: Palette,
    selected: usize,
    top: usize,
}

impl Board {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            selected: 0,
            top: 0,
        }
    }

    pub fn with_selection(mut self, selected: usize, top: usize) -> Self {
        self.selected = selected;
        self.top = top;
        self
    }

    /// Width of the text column inside `area`.
    pub fn text_width(app: &App, area: Rect) -> u16 {
        let inner = area.width.saturating_sub(2);
        app.prefs.font_size.text_width(inner)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, app: &App) {
        let title = match &app.current_chapter {
            Some(chapter) => format!(" {} ", chapter.name_arabic),
            None => " tilawa ".to_string(),
        };
        let mut block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(self.palette.base());
        if app.playlist.pagination().has_more {
            block = block.title_bottom(Line::from(" m: load more verses ").style(self.palette.muted()));
        }
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let visible = app.visible_verses();
        if visible.is_empty() {
            self.render_empty(frame, inner, app);
            return;
        }

        let width = Self::text_width(app, area);
        let left_pad = inner.width.saturating_sub(width) / 2;
        let column = Rect {
            x: inner.x + left_pad,
            y: inner.y,
            width: width.min(inner.width),
            height: inner.height,
        };

        let playing_index = match app.playback_state() {
            PlaybackState::Stopped => None,
            _ => app.playlist.index(),
        };
        let mut lines = Vec::new();
        for (pos, &index) in visible.iter().enumerate().skip(self.top) {
            if lines.len() >= column.height as usize {
                break;
            }
            let verse = &app.playlist.verses()[index];
            let marks = VerseMarks {
                playing: playing_index == Some(index),
                bookmarked: app.prefs.bookmarks.contains(&verse.verse_key),
                highlighted: app.is_highlighted(&verse.verse_key),
                selected: pos == self.selected,
            };
            lines.extend(verse_lines(
                verse,
                column.width,
                app.settings.show_translation,
                marks,
                &self.palette,
            ));
        }
        lines.truncate(column.height as usize);
        frame.render_widget(Paragraph::new(lines).style(self.palette.base()), column);
    }

    fn render_empty(&self, frame: &mut Frame, area: Rect, app: &App) {
        let text = match (app.status.verses, &app.current_chapter) {
            (LoadStatus::Loading, _) => "Loading verses...",
            (LoadStatus::Failed, _) => "Could not load verses. Press c to pick a surah again.",
            (_, None) => "Press c to choose a surah.",
            _ if !app.verse_filter.is_empty() => "No verses match the filter.",
            _ => "No verses.",
        };
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(self.palette.muted).bg(self.palette.background))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }
}
