pub mod bookmarks;
pub mod chapters;
pub mod confirm;
pub mod help;
pub mod history;
pub mod search;
pub mod translations;

use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::Line,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::ui::Palette;

/// Compute a centered popup area within the given area.
pub fn centered_popup_area(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let width = (area.width * width_percent) / 100;
    let height = (area.height * height_percent) / 100;
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;

    Rect::new(x, y, width, height)
}

/// Bordered list with one selected row, or `empty_text` when there is nothing to show.
pub fn render_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    hint: &str,
    entries: &[String],
    selected: usize,
    empty_text: &str,
    palette: &Palette,
) {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "))
        .title_bottom(Line::from(format!(" {hint} ")).style(palette.muted()))
        .style(palette.base());

    if entries.is_empty() {
        let empty = Paragraph::new(empty_text)
            .style(palette.muted().add_modifier(Modifier::ITALIC))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| ListItem::new(Line::from(entry.clone())))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(palette.selected().fg(palette.accent));
    let mut state = ListState::default().with_selected(Some(selected.min(entries.len() - 1)));
    frame.render_stateful_widget(list, area, &mut state);
}
