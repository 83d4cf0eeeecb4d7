pub mod board;
pub mod reader;
pub mod windows;

use ratatui::style::{Color, Modifier, Style};

use crate::models::{ColorScheme, Theme};

/// Colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub selection: Color,
    pub highlight: Color,
    pub scheme: ColorScheme,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        let scheme = theme.scheme();
        match theme {
            Theme::Light => Self {
                background: Color::Rgb(250, 248, 242),
                text: Color::Rgb(30, 30, 30),
                muted: Color::Rgb(110, 110, 110),
                accent: Color::Rgb(22, 101, 52),
                selection: Color::Rgb(220, 232, 220),
                highlight: Color::Rgb(253, 230, 138),
                scheme,
            },
            Theme::Dark => Self {
                background: Color::Rgb(24, 24, 27),
                text: Color::Rgb(228, 228, 231),
                muted: Color::Rgb(140, 140, 150),
                accent: Color::Rgb(74, 222, 128),
                selection: Color::Rgb(50, 56, 62),
                highlight: Color::Rgb(113, 90, 20),
                scheme,
            },
            Theme::Midnight => Self {
                background: Color::Rgb(15, 23, 42),
                text: Color::Rgb(226, 232, 240),
                muted: Color::Rgb(120, 132, 160),
                accent: Color::Rgb(129, 140, 248),
                selection: Color::Rgb(30, 41, 72),
                highlight: Color::Rgb(88, 70, 20),
                scheme,
            },
            Theme::Desert => Self {
                background: Color::Rgb(250, 240, 220),
                text: Color::Rgb(68, 45, 20),
                muted: Color::Rgb(140, 110, 80),
                accent: Color::Rgb(180, 83, 9),
                selection: Color::Rgb(240, 222, 190),
                highlight: Color::Rgb(252, 211, 77),
                scheme,
            },
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted).bg(self.background)
    }

    pub fn accent(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .bg(self.background)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected(&self) -> Style {
        let style = Style::default().fg(self.text).bg(self.selection);
        match self.scheme {
            ColorScheme::Light => style,
            ColorScheme::Dark => style.add_modifier(Modifier::BOLD),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_theme_has_distinct_palette() {
        let palettes: Vec<Palette> = Theme::all().iter().map(|t| Palette::for_theme(*t)).collect();
        for (i, a) in palettes.iter().enumerate() {
            for b in &palettes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
