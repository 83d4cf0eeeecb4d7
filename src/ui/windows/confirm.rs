use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::ui::Palette;

pub struct ConfirmWindow;

impl ConfirmWindow {
    pub fn render(frame: &mut Frame, area: Rect, question: &str, palette: &Palette) {
        let width = (question.chars().count() as u16 + 6).clamp(20, area.width);
        let height = 5.min(area.height);
        let popup_area = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );

        frame.render_widget(Clear, popup_area);
        let paragraph = Paragraph::new(format!("{question}\n\ny: yes   n: no"))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(palette.base())
            .block(Block::default().title(" Confirm ").borders(Borders::ALL));
        frame.render_widget(paragraph, popup_area);
    }
}
