use ratatui::{Frame, layout::Rect};

use crate::library::Bookmarks;
use crate::ui::Palette;
use crate::ui::windows::{centered_popup_area, render_list};

pub struct BookmarksWindow;

impl BookmarksWindow {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        bookmarks: &Bookmarks,
        selected: usize,
        palette: &Palette,
    ) {
        let popup_area = centered_popup_area(area, 60, 60);
        let entries: Vec<String> = bookmarks.as_slice().iter().map(|b| b.label.clone()).collect();
        render_list(
            frame,
            popup_area,
            &format!("Bookmarks ({})", bookmarks.len()),
            "Enter open  d remove  C clear  e export",
            &entries,
            selected,
            "No bookmarks yet. Press b on a verse to add one.",
            palette,
        );
    }
}
