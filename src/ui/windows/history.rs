use ratatui::{Frame, layout::Rect};

use crate::library::History;
use crate::ui::Palette;
use crate::ui::windows::{centered_popup_area, render_list};

pub struct HistoryWindow;

impl HistoryWindow {
    pub fn render(frame: &mut Frame, area: Rect, history: &History, selected: usize, palette: &Palette) {
        let popup_area = centered_popup_area(area, 50, 50);
        let entries: Vec<String> = history
            .recent()
            .iter()
            .map(|entry| format!("{:>3}. {}", entry.id, entry.name))
            .collect();
        render_list(
            frame,
            popup_area,
            "Recently read",
            "Enter open  C clear",
            &entries,
            selected,
            "Nothing read yet",
            palette,
        );
    }
}
