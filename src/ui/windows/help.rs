use ratatui::{
    Frame,
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::Palette;

pub struct HelpWindow;

const HELP_TEXT: &[&str] = &[
    " Reading:",
    "   j / Down          Next Verse",
    "   k / Up            Previous Verse",
    "   g / Home          First Verse",
    "   G / End           Last Loaded Verse",
    "   PgDn / PgUp       Move Five Verses",
    "   m                 Load More Verses",
    "   /                 Filter Loaded Verses",
    "",
    " Recitation:",
    "   Enter             Play Selected Verse",
    "   Space             Play / Pause",
    "   n                 Next Verse",
    "   p                 Previous Verse",
    "   x                 Stop",
    "   a                 Toggle Auto-advance",
    "",
    " Verse:",
    "   y                 Copy Text",
    "   b                 Bookmark",
    "   d                 Download Audio",
    "",
    " Panels:",
    "   c                 Surah List",
    "   f                 Find Surah By Name",
    "   B                 Bookmarks",
    "   r                 Recently Read",
    "   s                 Search The Quran",
    "   t                 Translation",
    "   R                 New Random Verse",
    "   o                 Open Random Verse",
    "",
    " Display:",
    "   T                 Next Theme",
    "   + / -             Font Size",
    "   q                 Quit / Close Window",
    "   ?                 Help",
];

impl HelpWindow {
    pub fn get_total_lines() -> usize {
        HELP_TEXT.len()
    }

    pub fn render(frame: &mut Frame, area: Rect, scroll_offset: u16, palette: &Palette) {
        let help_content: Vec<Line> = HELP_TEXT.iter().map(|&s| Line::from(s)).collect();

        let max_width = help_content.iter().map(|l| l.width()).max().unwrap_or(0) as u16;
        let width = (max_width + 4).min(area.width);
        let height = (help_content.len() as u16 + 2).min(area.height);

        let x = area.x + (area.width - width) / 2;
        let y = area.y + (area.height - height) / 2;
        let popup_area = Rect::new(x, y, width, height);

        frame.render_widget(Clear, popup_area);

        let help_paragraph = Paragraph::new(help_content)
            .style(palette.base())
            .block(Block::default().title(" Help ").borders(Borders::ALL))
            .scroll((scroll_offset, 0));

        frame.render_widget(help_paragraph, popup_area);
    }
}
