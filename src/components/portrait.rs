use image::DynamicImage;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Span,
    widgets::{Block, BorderType, Borders, Paragraph, StatefulWidget, Widget, Wrap},
};
use ratatui_image::{StatefulImage, picker::Picker, protocol::StatefulProtocol};
use std::sync::Arc;

use super::sprite_player::square_area;
use super::{Component, LoadStatus};
use crate::api::ImageMode;
use crate::config::Config;
use crate::event::{AppMsg, ViewTarget};
use crate::model::sprite::SpriteDescriptor;
use crate::widgets::theme::get_theme;

/// Card with a monster's still base image, the first entry of its `base`
/// listing.
pub struct PortraitState {
    pub monster_id: u32,
    pub descriptor: Option<SpriteDescriptor>,
    pub status: LoadStatus,
    base_width: u32,
    base_height: u32,
    protocol: Option<StatefulProtocol>,
    picker: Picker,
}

impl PortraitState {
    pub fn new(picker: Picker, config: &Config) -> Self {
        Self {
            monster_id: config.viewer_monster_id,
            descriptor: None,
            status: LoadStatus::Idle,
            base_width: config.sprite_width,
            base_height: config.sprite_height,
            protocol: None,
            picker,
        }
    }

    pub fn fetch_request(&self) -> AppMsg {
        AppMsg::FetchPaths {
            target: ViewTarget::Portrait,
            monster_id: self.monster_id,
            mode: ImageMode::Base,
        }
    }

    pub fn has_image(&self) -> bool {
        self.protocol.is_some()
    }

    fn is_current(&self, image_path: &str) -> bool {
        self.descriptor
            .as_ref()
            .is_some_and(|d| d.image_path == image_path)
    }

    fn on_paths_loaded(&mut self, descriptors: &[SpriteDescriptor]) -> Option<AppMsg> {
        self.protocol = None;
        self.descriptor = descriptors.first().cloned();
        self.status = LoadStatus::Ready;
        if descriptors.len() > 1 {
            log::debug!(
                "Monster {} has {} base images, showing the first",
                self.monster_id,
                descriptors.len()
            );
        }

        self.descriptor.as_ref().map(|d| AppMsg::FetchSheets {
            target: ViewTarget::Portrait,
            image_paths: vec![d.image_path.clone()],
        })
    }

    fn set_image(&mut self, image: &Arc<DynamicImage>) {
        let image = DynamicImage::clone(image);
        self.protocol = Some(self.picker.new_resize_protocol(image));
    }
}

impl Component for PortraitState {
    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg> {
        match msg {
            AppMsg::FetchPaths {
                target: ViewTarget::Portrait,
                ..
            } => {
                self.status = LoadStatus::Loading;
            }
            AppMsg::PathsLoaded {
                target: ViewTarget::Portrait,
                descriptors,
            } => return self.on_paths_loaded(descriptors),
            AppMsg::PathsFailed {
                target: ViewTarget::Portrait,
                reason,
            } => {
                self.descriptor = None;
                self.protocol = None;
                self.status = LoadStatus::Failed(reason.clone());
            }
            AppMsg::SheetLoaded {
                target: ViewTarget::Portrait,
                image_path,
                sheet,
            } if self.is_current(image_path) => self.set_image(sheet),
            AppMsg::SheetFailed {
                target: ViewTarget::Portrait,
                image_path,
                reason,
            } if self.is_current(image_path) => {
                self.status = LoadStatus::Failed(reason.clone());
            }
            _ => {}
        }
        None
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, _is_focused: bool) {
        let theme = get_theme();
        let title = match &self.descriptor {
            Some(d) if !d.name.is_empty() => d.name.clone(),
            _ => "Base".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border_unfocused))
            .title(title);
        let inner = block.inner(area);
        block.render(area, buf);

        match self.protocol.as_mut() {
            Some(protocol) => {
                let target = square_area(&self.picker, (self.base_width, self.base_height), inner);
                StatefulWidget::render(StatefulImage::default(), target, buf, protocol);
            }
            None => {
                let text = match (&self.status, &self.descriptor) {
                    (LoadStatus::Ready, None) => "No base image".to_string(),
                    (status, _) => status.label(),
                };
                Paragraph::new(Span::styled(text, Style::default().fg(self.status.color())))
                    .wrap(Wrap { trim: true })
                    .render(inner, buf);
            }
        }
    }
}
