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
    style::Style,
    text::Span,
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};
use ratatui_image::picker::Picker;

const CELL_WIDTH: u16 = 22;
const CELL_HEIGHT: u16 = 11;

pub struct GalleryCell {
    pub descriptor: SpriteDescriptor,
    pub player: SpritePlayer,
    pub failed: bool,
}

impl GalleryCell {
    fn title(&self) -> String {
        if self.failed {
            format!("{} (failed)", self.descriptor.name)
        } else {
            self.descriptor.name.clone()
        }
    }
}

/// Every animation of one monster, each playing in its own cell.
pub struct GalleryState {
    pub monster_id: u32,
    pub cells: Vec<GalleryCell>,
    pub status: LoadStatus,
    scroll_row: usize,
    active: bool,
    picker: Picker,
    config: Config,
}

impl GalleryState {
    pub fn new(picker: Picker, config: &Config) -> Self {
        Self {
            monster_id: config.gallery_monster_id,
            cells: Vec::new(),
            status: LoadStatus::Idle,
            scroll_row: 0,
            active: false,
            picker,
            config: config.clone(),
        }
    }

    pub fn fetch_request(&self) -> AppMsg {
        AppMsg::FetchPaths {
            target: ViewTarget::Gallery,
            monster_id: self.monster_id,
            mode: ImageMode::Animations,
        }
    }

    fn on_paths_loaded(&mut self, descriptors: &[SpriteDescriptor]) -> Option<AppMsg> {
        self.scroll_row = 0;
        self.status = LoadStatus::Ready;
        self.cells = descriptors
            .iter()
            .map(|descriptor| {
                let mut player = SpritePlayer::from_config(self.picker.clone(), &self.config);
                if self.active {
                    player.start();
                }
                GalleryCell {
                    descriptor: descriptor.clone(),
                    player,
                    failed: false,
                }
            })
            .collect();

        if self.cells.is_empty() {
            return None;
        }
        Some(AppMsg::FetchSheets {
            target: ViewTarget::Gallery,
            image_paths: descriptors.iter().map(|d| d.image_path.clone()).collect(),
        })
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
        for cell in &mut self.cells {
            if active {
                cell.player.start();
            } else {
                cell.player.stop();
            }
        }
    }

    fn columns_for(width: u16) -> usize {
        usize::from((width / CELL_WIDTH).max(1))
    }
}

impl Component for GalleryState {
    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg> {
        match msg {
            AppMsg::ViewChanged(view) => self.set_active(*view == ActiveView::Gallery),
            AppMsg::Tick => {
                for cell in &mut self.cells {
                    cell.player.tick();
                }
            }
            AppMsg::FetchPaths {
                target: ViewTarget::Gallery,
                ..
            } => {
                self.status = LoadStatus::Loading;
            }
            AppMsg::PathsLoaded {
                target: ViewTarget::Gallery,
                descriptors,
            } => return self.on_paths_loaded(descriptors),
            AppMsg::PathsFailed {
                target: ViewTarget::Gallery,
                reason,
            } => {
                self.cells.clear();
                self.status = LoadStatus::Failed(reason.clone());
            }
            AppMsg::SheetLoaded {
                target: ViewTarget::Gallery,
                image_path,
                sheet,
            } => {
                for cell in self
                    .cells
                    .iter_mut()
                    .filter(|c| &c.descriptor.image_path == image_path)
                {
                    cell.failed = false;
                    cell.player.set_sheet(Some(sheet.clone()));
                }
            }
            AppMsg::SheetFailed {
                target: ViewTarget::Gallery,
                image_path,
                ..
            } => {
                for cell in self
                    .cells
                    .iter_mut()
                    .filter(|c| &c.descriptor.image_path == image_path)
                {
                    cell.failed = true;
                }
            }
            AppMsg::Key(key) => match key.code {
                KeyCode::Down | KeyCode::Char('j') => {
                    self.scroll_row = self.scroll_row.saturating_add(1);
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.scroll_row = self.scroll_row.saturating_sub(1);
                }
                KeyCode::Char('r') => return Some(self.fetch_request()),
                _ => {}
            },
            _ => {}
        }
        None
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, is_focused: bool) {
        let theme = get_theme();
        let title = format!("All Animations (monster #{})", self.monster_id);
        let block = focused_block(&title, is_focused);
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);
        let grid = rows[0];

        let columns = Self::columns_for(grid.width);
        let total_rows = self.cells.len().div_ceil(columns);
        let visible_rows = usize::from((grid.height / CELL_HEIGHT).max(1));
        self.scroll_row = self.scroll_row.min(total_rows.saturating_sub(visible_rows));

        let first = self.scroll_row * columns;
        for (offset, cell) in self
            .cells
            .iter_mut()
            .skip(first)
            .take(visible_rows * columns)
            .enumerate()
        {
            let col = (offset % columns) as u16;
            let row = (offset / columns) as u16;
            let cell_area = Rect::new(
                grid.x + col * CELL_WIDTH,
                grid.y + row * CELL_HEIGHT,
                CELL_WIDTH,
                CELL_HEIGHT,
            )
            .intersection(grid);

            let border = if cell.failed {
                theme.status_failed
            } else {
                theme.border_unfocused
            };
            let frame = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(border))
                .title(cell.title());
            let cell_inner = frame.inner(cell_area);
            frame.render(cell_area, buf);
            cell.player.render(cell_inner, buf);
        }

        let footer = format!(
            "{}  |  {} animations  |  ↑↓: Scroll  r: Reload",
            self.status.label(),
            self.cells.len()
        );
        Paragraph::new(Span::styled(footer, Style::default().fg(self.status.color())))
            .render(rows[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;
    use std::sync::Arc;

    fn gallery() -> GalleryState {
        GalleryState::new(Picker::from_fontsize((8, 16)), &Config::default())
    }

    fn descriptors(names: &[&str]) -> Vec<SpriteDescriptor> {
        names
            .iter()
            .map(|name| SpriteDescriptor {
                name: name.to_string(),
                image_path: format!("/32/animations/{}.png", name),
            })
            .collect()
    }

    #[test]
    fn test_loading_requests_every_sheet() {
        let mut gallery = gallery();
        assert!(matches!(gallery.fetch_request(), AppMsg::FetchPaths { monster_id: 32, .. }));

        let follow_up = gallery.update(&AppMsg::PathsLoaded {
            target: ViewTarget::Gallery,
            descriptors: descriptors(&["walk", "run", "sleep"]),
        });

        assert_eq!(gallery.cells.len(), 3);
        match follow_up {
            Some(AppMsg::FetchSheets { target, image_paths }) => {
                assert_eq!(target, ViewTarget::Gallery);
                assert_eq!(image_paths.len(), 3);
                assert_eq!(image_paths[1], "/32/animations/run.png");
            }
            other => panic!("expected sheet request, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_listing_requests_nothing() {
        let mut gallery = gallery();
        let follow_up = gallery.update(&AppMsg::PathsLoaded {
            target: ViewTarget::Gallery,
            descriptors: Vec::new(),
        });
        assert!(follow_up.is_none());
        assert_eq!(gallery.status, LoadStatus::Ready);
    }

    #[test]
    fn test_sheets_land_in_matching_cells() {
        let mut gallery = gallery();
        gallery.update(&AppMsg::ViewChanged(ActiveView::Gallery));
        gallery.update(&AppMsg::PathsLoaded {
            target: ViewTarget::Gallery,
            descriptors: descriptors(&["walk", "run"]),
        });
        assert!(gallery.cells.iter().all(|c| c.player.is_running()));

        gallery.update(&AppMsg::SheetLoaded {
            target: ViewTarget::Gallery,
            image_path: "/32/animations/run.png".to_string(),
            sheet: Arc::new(DynamicImage::new_rgba8(1024, 1024)),
        });
        assert!(!gallery.cells[0].player.has_sheet());
        assert!(gallery.cells[1].player.has_sheet());
    }

    #[test]
    fn test_leaving_view_stops_every_cell() {
        let mut gallery = gallery();
        gallery.update(&AppMsg::PathsLoaded {
            target: ViewTarget::Gallery,
            descriptors: descriptors(&["walk", "run"]),
        });
        assert!(gallery.cells.iter().all(|c| !c.player.is_running()));

        gallery.update(&AppMsg::ViewChanged(ActiveView::Gallery));
        assert!(gallery.cells.iter().all(|c| c.player.is_running()));

        gallery.update(&AppMsg::ViewChanged(ActiveView::Create));
        assert!(gallery.cells.iter().all(|c| !c.player.is_running()));
    }

    #[test]
    fn test_render_lays_out_named_cells() {
        let mut gallery = gallery();
        gallery.update(&AppMsg::PathsLoaded {
            target: ViewTarget::Gallery,
            descriptors: descriptors(&["walk", "run", "sleep"]),
        });

        let area = Rect::new(0, 0, 60, 30);
        let mut buf = Buffer::empty(area);
        gallery.render(area, &mut buf, false);

        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("walk"));
        assert!(text.contains("sleep"));
        assert!(text.contains("3 animations"));
    }

    #[test]
    fn test_failed_sheet_marks_its_cell() {
        let mut gallery = gallery();
        gallery.update(&AppMsg::PathsLoaded {
            target: ViewTarget::Gallery,
            descriptors: descriptors(&["walk", "run"]),
        });
        gallery.update(&AppMsg::SheetFailed {
            target: ViewTarget::Gallery,
            image_path: "/32/animations/run.png".to_string(),
            reason: "server responded with status 404".to_string(),
        });
        assert!(!gallery.cells[0].failed);
        assert!(gallery.cells[1].failed);

        let area = Rect::new(0, 0, 60, 30);
        let mut buf = Buffer::empty(area);
        gallery.render(area, &mut buf, false);
        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("run (failed)"));
        assert!(!text.contains("walk (failed)"));

        gallery.update(&AppMsg::SheetLoaded {
            target: ViewTarget::Gallery,
            image_path: "/32/animations/run.png".to_string(),
            sheet: Arc::new(DynamicImage::new_rgba8(1024, 1024)),
        });
        assert!(!gallery.cells[1].failed);
    }
}
