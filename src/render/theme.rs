//! Color theme and styling definitions using ratatui colors

use ratatui::style::{Color, Modifier, Style};

/// Color theme for the list view
#[derive(Debug, Clone)]
pub struct ColorTheme {
    /// Entry text color (None uses terminal default)
    pub normal_text: Option<Color>,

    /// Fallback for muted markup when the terminal cannot show RGB
    pub muted_text: Color,

    /// List title above the entries
    pub title: Style,

    /// Status line background
    pub status_bg: Color,

    /// Status line text
    pub status_fg: Color,

    /// Status line text while a rebuild is in flight
    pub busy: Style,

    /// Error/warning text
    pub error_text: Color,

    /// Honor `<color=...>` markup colors in entry text
    pub markup_colors: bool,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            normal_text: None,
            muted_text: Color::DarkGray,
            title: Style::default().add_modifier(Modifier::BOLD),
            status_bg: Color::Blue,
            status_fg: Color::White,
            busy: Style::default().fg(Color::Yellow).bg(Color::Blue),
            error_text: Color::Red,
            markup_colors: true,
        }
    }
}

impl ColorTheme {
    /// Create a monochrome theme for terminals without color support
    pub fn monochrome() -> Self {
        Self {
            normal_text: None,
            muted_text: Color::Reset,
            title: Style::default().add_modifier(Modifier::BOLD),
            status_bg: Color::Black,
            status_fg: Color::White,
            busy: Style::default()
                .fg(Color::White)
                .bg(Color::Black)
                .add_modifier(Modifier::REVERSED),
            error_text: Color::White,
            markup_colors: false,
        }
    }

    /// Create a high-contrast theme for accessibility
    pub fn high_contrast() -> Self {
        Self {
            normal_text: Some(Color::White),
            muted_text: Color::Gray,
            title: Style::default()
                .fg(Color::LightYellow)
                .add_modifier(Modifier::BOLD),
            status_bg: Color::White,
            status_fg: Color::Black,
            busy: Style::default().fg(Color::Black).bg(Color::LightYellow),
            error_text: Color::LightRed,
            markup_colors: false,
        }
    }

    /// Base style for entry text
    pub fn entry_style(&self) -> Style {
        match self.normal_text {
            Some(color) => Style::default().fg(color),
            None => Style::default(),
        }
    }

    pub fn status_style(&self, busy: bool) -> Style {
        if busy {
            self.busy
        } else {
            Style::default().bg(self.status_bg).fg(self.status_fg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme() {
        let theme = ColorTheme::default();
        assert_eq!(theme.normal_text, None);
        assert!(theme.markup_colors);
        assert_eq!(theme.entry_style(), Style::default());
        assert_eq!(theme.status_style(false).bg, Some(Color::Blue));
        assert_eq!(theme.status_style(true).fg, Some(Color::Yellow));
    }

    #[test]
    fn test_monochrome_theme() {
        let theme = ColorTheme::monochrome();
        assert!(!theme.markup_colors);
        assert_eq!(theme.status_style(false).bg, Some(Color::Black));
    }

    #[test]
    fn test_high_contrast_theme() {
        let theme = ColorTheme::high_contrast();
        assert_eq!(theme.entry_style().fg, Some(Color::White));
        assert_eq!(theme.error_text, Color::LightRed);
        assert_eq!(theme.status_style(false).fg, Some(Color::Black));
    }
}
