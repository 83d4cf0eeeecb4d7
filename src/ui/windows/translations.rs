use ratatui::{Frame, layout::Rect};

use crate::models::TranslationResource;
use crate::ui::Palette;
use crate::ui::windows::{centered_popup_area, render_list};

pub struct TranslationsWindow;

impl TranslationsWindow {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        translations: &[TranslationResource],
        current_id: u32,
        selected: usize,
        palette: &Palette,
    ) {
        let popup_area = centered_popup_area(area, 60, 60);
        let entries: Vec<String> = translations
            .iter()
            .map(|t| {
                let marker = if t.id == current_id { "●" } else { " " };
                format!("{marker} {}", t.label())
            })
            .collect();
        render_list(
            frame,
            popup_area,
            "Translation",
            "Enter select  Esc close",
            &entries,
            selected,
            "Translations are still loading",
            palette,
        );
    }
}
