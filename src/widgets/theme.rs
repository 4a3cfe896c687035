use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub border_focused: Color,
    pub border_unfocused: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_highlight: Color,
    pub placeholder: Color,
    pub status_loading: Color,
    pub status_ready: Color,
    pub status_failed: Color,
    pub log_warn: Color,
    pub log_debug: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Black,
            border_focused: Color::Rgb(118, 227, 73),
            border_unfocused: Color::DarkGray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            text_highlight: Color::Yellow,
            placeholder: Color::DarkGray,
            status_loading: Color::Blue,
            status_ready: Color::Green,
            status_failed: Color::Red,
            log_warn: Color::Yellow,
            log_debug: Color::DarkGray,
        }
    }
}

pub static THEME: std::sync::LazyLock<Theme> = std::sync::LazyLock::new(Theme::default);

pub fn get_theme() -> &'static Theme {
    &THEME
}
