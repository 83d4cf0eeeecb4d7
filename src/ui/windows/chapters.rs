use ratatui::{Frame, layout::Rect};

use crate::filter::ChapterFilter;
use crate::models::{Chapter, LoadStatus};
use crate::ui::Palette;
use crate::ui::windows::{centered_popup_area, render_list};

pub struct ChaptersWindow;

impl ChaptersWindow {
    pub fn format_entry(chapter: &Chapter) -> String {
        let translated = chapter.translated();
        let mut entry = format!("{:>3}. {}  {}", chapter.id, chapter.name_arabic, chapter.name_simple);
        if !translated.is_empty() {
            entry.push_str(&format!(" - {translated}"));
        }
        entry.push_str(&format!(
            "  ({} verses, {})",
            chapter.verses_count,
            chapter.revelation_place.label()
        ));
        entry
    }

    pub fn title(filter: &ChapterFilter, editing: bool) -> String {
        let mut title = String::from("Surahs");
        let query = filter.query();
        if editing || !query.is_empty() {
            title.push_str(&format!(" [/{query}{}]", if editing { "_" } else { "" }));
        }
        title.push_str(&format!(" [{}]", filter.place.label()));
        title
    }

    #[allow(clippy::too_many_arguments)]
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        chapters: &[&Chapter],
        selected: usize,
        filter: &ChapterFilter,
        editing: bool,
        status: LoadStatus,
        palette: &Palette,
    ) {
        let popup_area = centered_popup_area(area, 70, 80);
        let entries: Vec<String> = chapters.iter().map(|c| Self::format_entry(c)).collect();
        let empty_text = match status {
            LoadStatus::Loading => "Loading surahs...",
            LoadStatus::Failed => "Could not load the surah list",
            _ if filter.is_active() => "No surah matches the filter",
            _ => "No surahs",
        };
        render_list(
            frame,
            popup_area,
            &Self::title(filter, editing),
            "Enter open  / filter  r Meccan/Medinan  Esc close",
            &entries,
            selected,
            empty_text,
            palette,
        );
    }
}
