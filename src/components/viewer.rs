use super::portrait::PortraitState;
use super::sprite_player::SpritePlayer;
use super::{Component, LoadStatus};
use crate::api::ImageMode;
use crate::config::Config;
use crate::event::{AppMsg, ViewTarget};
use crate::model::sprite::SpriteDescriptor;
use crate::model::state::ActiveView;
use crate::widgets::common::focused_block;
use crate::widgets::theme::get_theme;
use crossterm::event::KeyCode;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};
use ratatui_image::picker::Picker;

/// A single monster's animations with a selector of animation names, next
/// to the monster's base image.
pub struct ViewerState {
    pub monster_id: u32,
    pub descriptors: Vec<SpriteDescriptor>,
    pub selected: String,
    pub status: LoadStatus,
    list_state: ListState,
    player: SpritePlayer,
    portrait: PortraitState,
    title: String,
}

impl ViewerState {
    pub fn new(picker: Picker, config: &Config) -> Self {
        Self {
            monster_id: config.viewer_monster_id,
            descriptors: Vec::new(),
            selected: String::new(),
            status: LoadStatus::Idle,
            list_state: ListState::default(),
            player: SpritePlayer::from_config(picker.clone(), config),
            portrait: PortraitState::new(picker, config),
            title: format!("Monster #{}", config.viewer_monster_id),
        }
    }

    pub fn fetch_request(&self) -> AppMsg {
        AppMsg::FetchPaths {
            target: ViewTarget::Viewer,
            monster_id: self.monster_id,
            mode: ImageMode::Animations,
        }
    }

    pub fn animation_names(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn selected_descriptor(&self) -> Option<&SpriteDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(&self.selected))
    }

    pub fn player(&self) -> &SpritePlayer {
        &self.player
    }

    pub fn portrait(&self) -> &PortraitState {
        &self.portrait
    }

    fn selected_index(&self) -> Option<usize> {
        self.descriptors
            .iter()
            .position(|d| d.name.eq_ignore_ascii_case(&self.selected))
    }

    /// Switches to another animation and asks for its sheet.
    pub fn select_index(&mut self, ix: usize) -> Option<AppMsg> {
        let descriptor = self.descriptors.get(ix)?;
        if descriptor.name.eq_ignore_ascii_case(&self.selected) && self.player.has_sheet() {
            return None;
        }
        self.selected = descriptor.name.clone();
        self.list_state.select(Some(ix));
        self.player.set_sheet(None);
        self.sheet_request()
    }

    fn sheet_request(&self) -> Option<AppMsg> {
        self.selected_descriptor().map(|d| AppMsg::FetchSheets {
            target: ViewTarget::Viewer,
            image_paths: vec![d.image_path.clone()],
        })
    }

    fn on_paths_loaded(&mut self, descriptors: &[SpriteDescriptor]) -> Option<AppMsg> {
        self.descriptors = descriptors.to_vec();
        self.status = LoadStatus::Ready;
        self.player.set_sheet(None);

        if self.selected.is_empty() {
            if let Some(first) = self.descriptors.first() {
                self.selected = first.name.clone();
            }
        }
        self.list_state.select(self.selected_index());
        self.sheet_request()
    }

    fn move_selection(&mut self, forward: bool) -> Option<AppMsg> {
        if self.descriptors.is_empty() {
            return None;
        }
        let len = self.descriptors.len();
        let next = match self.selected_index() {
            Some(ix) if forward => (ix + 1) % len,
            Some(ix) => (ix + len - 1) % len,
            None => 0,
        };
        self.select_index(next)
    }
}

impl Component for ViewerState {
    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg> {
        if msg.target() == Some(ViewTarget::Portrait) {
            return self.portrait.update(msg);
        }
        match msg {
            AppMsg::ViewChanged(view) => {
                if *view == ActiveView::Viewer {
                    self.player.start();
                } else {
                    self.player.stop();
                }
            }
            AppMsg::Tick => self.player.tick(),
            // The base image is reloaded along with the animations.
            AppMsg::FetchPaths {
                target: ViewTarget::Viewer,
                ..
            } => {
                self.status = LoadStatus::Loading;
                return Some(self.portrait.fetch_request());
            }
            AppMsg::PathsLoaded {
                target: ViewTarget::Viewer,
                descriptors,
            } => return self.on_paths_loaded(descriptors),
            AppMsg::PathsFailed {
                target: ViewTarget::Viewer,
                reason,
            } => {
                self.descriptors.clear();
                self.list_state.select(None);
                self.player.set_sheet(None);
                self.status = LoadStatus::Failed(reason.clone());
            }
            AppMsg::SheetLoaded {
                target: ViewTarget::Viewer,
                image_path,
                sheet,
            } => {
                if self.selected_descriptor().map(|d| &d.image_path) == Some(image_path) {
                    self.player.set_sheet(Some(sheet.clone()));
                }
            }
            AppMsg::SheetFailed {
                target: ViewTarget::Viewer,
                image_path,
                reason,
            } => {
                if self.selected_descriptor().map(|d| &d.image_path) == Some(image_path) {
                    self.status = LoadStatus::Failed(reason.clone());
                }
            }
            AppMsg::Key(key) => match key.code {
                KeyCode::Down | KeyCode::Char('j') => return self.move_selection(true),
                KeyCode::Up | KeyCode::Char('k') => return self.move_selection(false),
                KeyCode::Char('r') => return Some(self.fetch_request()),
                _ => {}
            },
            _ => {}
        }
        None
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, is_focused: bool) {
        let theme = get_theme();
        let block = focused_block(&self.title, is_focused);
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(inner);
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(24)])
            .split(rows[0]);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(12), Constraint::Min(3)])
            .split(cols[1]);

        self.player.render(cols[0], buf);
        self.portrait.render(side[0], buf, false);

        let items: Vec<ListItem> = self
            .descriptors
            .iter()
            .map(|d| {
                let name = if d.name.is_empty() { "(unnamed)" } else { d.name.as_str() };
                ListItem::new(name.to_string()).style(Style::default().fg(theme.text_primary))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.border_unfocused))
                    .title("Animation"),
            )
            .highlight_style(
                Style::default()
                    .fg(theme.background)
                    .bg(theme.text_highlight)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        StatefulWidget::render(list, side[1], buf, &mut self.list_state);

        let status = Paragraph::new(Span::styled(
            format!("{}  |  ↑↓: Animation  r: Reload", self.status.label()),
            Style::default().fg(self.status.color()),
        ));
        status.render(rows[1], buf);
    }
}
