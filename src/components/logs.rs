use super::Component;
use crate::event::AppMsg;
use crate::widgets::common::focused_block;
use crate::widgets::theme::get_theme;
use crossterm::event::KeyCode;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget},
};

const MAX_ENTRIES: usize = 1000;

#[derive(Debug)]
pub struct LogsState {
    pub logs: Vec<String>,
    scroll_state: ScrollbarState,
    scroll_offset: u16,
    stick_to_bottom: bool,
}

impl Default for LogsState {
    fn default() -> Self {
        Self {
            logs: Vec::new(),
            scroll_state: ScrollbarState::default(),
            scroll_offset: 0,
            stick_to_bottom: true,
        }
    }
}

impl LogsState {
    pub fn add_log(&mut self, message: String) {
        self.logs.push(message);
        if self.logs.len() > MAX_ENTRIES {
            let excess = self.logs.len() - MAX_ENTRIES;
            self.logs.drain(..excess);
        }
    }

    fn scroll_up(&mut self, lines: u16) {
        self.stick_to_bottom = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
        self.scroll_state = self.scroll_state.position(self.scroll_offset as usize);
    }

    fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
        self.scroll_state = self.scroll_state.position(self.scroll_offset as usize);
    }
}

// Entries are formatted as "LEVEL message" by the channel logger.
fn entry_color(entry: &str) -> Color {
    let theme = get_theme();
    match entry.split_whitespace().next() {
        Some("ERROR") => theme.status_failed,
        Some("WARN") => theme.log_warn,
        Some("DEBUG") | Some("TRACE") => theme.log_debug,
        _ => theme.text_primary,
    }
}

impl Component for LogsState {
    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg> {
        match msg {
            AppMsg::LogMessage(msg) => {
                self.add_log(msg.clone());
            }
            AppMsg::ErrorOccurred(err) => {
                self.add_log(format!("ERROR {}", err));
            }
            AppMsg::Key(key) => match key.code {
                KeyCode::Up | KeyCode::Char('k') => self.scroll_up(1),
                KeyCode::Down | KeyCode::Char('j') => self.scroll_down(1),
                KeyCode::PageUp => self.scroll_up(10),
                KeyCode::PageDown => self.scroll_down(10),
                KeyCode::End => self.stick_to_bottom = true,
                _ => {}
            },
            _ => {}
        }
        None
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, is_focused: bool) {
        let block = focused_block("Logs", is_focused);

        let inner_area = block.inner(area);
        block.render(area, buf);

        let width = (inner_area.width as usize).saturating_sub(2);
        if width == 0 {
            return;
        }

        let lines: Vec<Line> = self
            .logs
            .iter()
            .flat_map(|entry| {
                let style = Style::default().fg(entry_color(entry));
                textwrap::wrap(entry, width)
                    .into_iter()
                    .map(move |line| Line::from(Span::styled(line.into_owned(), style)))
            })
            .collect();

        let total_height = lines.len();
        let max_scroll = total_height.saturating_sub(inner_area.height as usize);
        self.scroll_state = self.scroll_state.content_length(total_height);

        if self.stick_to_bottom || self.scroll_offset as usize >= max_scroll {
            self.scroll_offset = max_scroll as u16;
            self.stick_to_bottom = true;
        }

        Paragraph::new(lines)
            .scroll((self.scroll_offset, 0))
            .render(inner_area, buf);

        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"));

        StatefulWidget::render(scrollbar, inner_area, buf, &mut self.scroll_state);
    }
}
