use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::models::{LoadStatus, SearchHit, strip_markup};
use crate::ui::Palette;
use crate::ui::windows::render_list;

pub struct SearchWindow;

impl SearchWindow {
    pub fn format_hit(hit: &SearchHit) -> String {
        format!("{}: {}", hit.verse_key, strip_markup(&hit.text))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        query: &str,
        editing: bool,
        results: Option<&[SearchHit]>,
        selected: usize,
        status: LoadStatus,
        palette: &Palette,
    ) {
        let popup_area = Rect::new(
            area.x + area.width / 8,
            area.y + area.height / 6,
            area.width * 3 / 4,
            area.height * 2 / 3,
        );

        frame.render_widget(Clear, popup_area);

        let prompt = if editing {
            format!("/{query}_")
        } else {
            format!("/{query}")
        };
        let header = Paragraph::new(Line::from(prompt))
            .block(Block::default().title(" Search the Quran ").borders(Borders::ALL))
            .style(palette.base().add_modifier(Modifier::BOLD));

        let header_area = Rect::new(popup_area.x, popup_area.y, popup_area.width, 3);
        frame.render_widget(header, header_area);

        let list_area = Rect::new(
            popup_area.x,
            popup_area.y + 3,
            popup_area.width,
            popup_area.height.saturating_sub(3),
        );

        let entries: Vec<String> = results
            .unwrap_or_default()
            .iter()
            .map(Self::format_hit)
            .collect();
        let empty_text = match status {
            LoadStatus::Loading => "Searching...",
            LoadStatus::Failed => "Search failed",
            _ if results.is_some() => "No results",
            _ => "Type a query and press Enter",
        };
        render_list(
            frame,
            list_area,
            &format!("Results ({})", entries.len()),
            "Enter open  Esc close",
            &entries,
            selected,
            empty_text,
            palette,
        );
    }
}
