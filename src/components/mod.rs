use crate::event::AppMsg;
use ratatui::{buffer::Buffer, layout::Rect, style::Color};

use crate::widgets::theme::get_theme;

pub mod create_monster;
pub mod gallery;
pub mod logs;
pub mod portrait;
pub mod sprite_player;
pub mod viewer;

pub trait Component {
    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg>;

    fn render(&mut self, area: Rect, buf: &mut Buffer, is_focused: bool);
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

impl LoadStatus {
    pub fn label(&self) -> String {
        match self {
            LoadStatus::Idle => "Idle".to_string(),
            LoadStatus::Loading => "Loading...".to_string(),
            LoadStatus::Ready => "Ready".to_string(),
            LoadStatus::Failed(reason) => format!("Failed: {}", reason),
        }
    }

    pub fn color(&self) -> Color {
        let theme = get_theme();
        match self {
            LoadStatus::Idle => theme.text_secondary,
            LoadStatus::Loading => theme.status_loading,
            LoadStatus::Ready => theme.status_ready,
            LoadStatus::Failed(_) => theme.status_failed,
        }
    }
}
