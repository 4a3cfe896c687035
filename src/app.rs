use anyhow::Result;
use crossbeam_channel::{Receiver, Sender, unbounded};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::LevelFilter;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Tabs},
};
use ratatui_image::picker::Picker;
use std::collections::VecDeque;
use std::io;
use std::time::Instant;

use crate::api::HttpSpriteClient;
use crate::components::Component;
use crate::components::create_monster::CreateMonsterState;
use crate::components::gallery::GalleryState;
use crate::components::logs::LogsState;
use crate::components::viewer::ViewerState;
use crate::config::Config;
use crate::event::{AppMsg, ViewTarget};
use crate::logging::ChannelLogger;
use crate::model::state::ActiveView;
use crate::sprite_worker::SpriteWorker;
use crate::widgets::theme::get_theme;

pub struct App {
    pub config: Config,
    pub active: ActiveView,
    pub create: CreateMonsterState,
    pub viewer: ViewerState,
    pub gallery: GalleryState,
    pub logs: LogsState,
    tx: Sender<AppMsg>,
    rx: Receiver<AppMsg>,
    worker: Option<SpriteWorker>,
    should_quit: bool,
}

impl App {
    pub fn new_with_picker(config: Config, picker: Picker) -> Self {
        let (tx, rx) = unbounded();
        let mut app = Self::with_channel(config, picker, tx, rx);

        if ChannelLogger::init(app.tx.clone(), LevelFilter::Info).is_err() {
            app.logs.add_log("WARN  A logger was already installed".to_string());
        }

        match HttpSpriteClient::new(&app.config) {
            Ok(client) => app.worker = Some(SpriteWorker::spawn(client, app.tx.clone())),
            Err(e) => app.logs.add_log(format!("ERROR Image service unavailable: {}", e)),
        }
        app
    }

    fn with_channel(config: Config, picker: Picker, tx: Sender<AppMsg>, rx: Receiver<AppMsg>) -> Self {
        Self {
            create: CreateMonsterState::default(),
            viewer: ViewerState::new(picker.clone(), &config),
            gallery: GalleryState::new(picker, &config),
            logs: LogsState::default(),
            active: ActiveView::default(),
            config,
            tx,
            rx,
            worker: None,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;

        let res = self.event_loop(&mut terminal);

        if let Err(e) = restore_terminal(&mut terminal) {
            return res.and(Err(e));
        }
        res
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        log::info!("Image service at {}", self.config.api_url);
        self.dispatch(AppMsg::ViewChanged(self.active));
        self.dispatch(self.viewer.fetch_request());
        self.dispatch(self.gallery.fetch_request());

        let tick_rate = self.config.tick_rate();
        let mut last_tick = Instant::now();

        while !self.should_quit {
            terminal.draw(|f| self.draw(f))?;

            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.dispatch(AppMsg::Key(key));
                    }
                    _ => {}
                }
            }

            let pending: Vec<AppMsg> = self.rx.try_iter().collect();
            for msg in pending {
                self.dispatch(msg);
            }

            if last_tick.elapsed() >= tick_rate {
                self.dispatch(AppMsg::Tick);
                last_tick = Instant::now();
            }
        }
        Ok(())
    }

    /// Handles `msg` and every follow-up message it produces.
    pub fn dispatch(&mut self, msg: AppMsg) {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            match msg {
                AppMsg::Quit => self.should_quit = true,
                AppMsg::Key(key) => {
                    if let Some(follow_up) = self.handle_global_key(&key) {
                        queue.push_back(follow_up);
                    } else if !self.is_global_key(&key) {
                        let msg = AppMsg::Key(key);
                        let follow_up = match self.active {
                            ActiveView::Create => self.create.update(&msg),
                            ActiveView::Viewer => self.viewer.update(&msg),
                            ActiveView::Gallery => self.gallery.update(&msg),
                            ActiveView::Logs => self.logs.update(&msg),
                        };
                        queue.extend(follow_up);
                    }
                }
                msg => {
                    self.route_to_worker(&msg);
                    queue.extend(self.broadcast(&msg));
                }
            }
        }
    }

    fn broadcast(&mut self, msg: &AppMsg) -> Vec<AppMsg> {
        [
            self.create.update(msg),
            self.viewer.update(msg),
            self.gallery.update(msg),
            self.logs.update(msg),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn route_to_worker(&self, msg: &AppMsg) {
        match msg {
            AppMsg::FetchPaths {
                target,
                monster_id,
                mode,
            } => match &self.worker {
                Some(worker) => worker.request_paths(*target, *monster_id, *mode),
                None => self.report_unavailable(*target),
            },
            AppMsg::FetchSheets {
                target,
                image_paths,
            } => match &self.worker {
                Some(worker) => worker.request_sheets(*target, image_paths),
                None => log::warn!("Skipping {} sheets: no image service", image_paths.len()),
            },
            _ => {}
        }
    }

    // Without a worker the views still get an answer, just an empty one.
    fn report_unavailable(&self, target: ViewTarget) {
        let _ = self.tx.send(AppMsg::PathsFailed {
            target,
            reason: "image service unavailable".to_string(),
        });
    }

    fn is_global_key(&self, key: &KeyEvent) -> bool {
        matches!(key.code, KeyCode::F(1..=4))
            || (key.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')))
    }

    fn handle_global_key(&mut self, key: &KeyEvent) -> Option<AppMsg> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Char('q'), KeyModifiers::CONTROL) => {
                return Some(AppMsg::Quit);
            }
            (KeyCode::F(n @ 1..=4), _) => {
                return self.switch_to(ActiveView::ALL[usize::from(n - 1)]);
            }
            _ => {}
        }

        // The form takes plain keys as text input.
        if self.active == ActiveView::Create {
            return None;
        }
        match key.code {
            KeyCode::Char('q') => Some(AppMsg::Quit),
            KeyCode::Tab => self.switch_to(self.active.next()),
            KeyCode::BackTab => self.switch_to(self.active.prev()),
            _ => None,
        }
    }

    fn switch_to(&mut self, view: ActiveView) -> Option<AppMsg> {
        if view == self.active {
            return None;
        }
        self.active = view;
        Some(AppMsg::ViewChanged(view))
    }

    fn draw(&mut self, f: &mut Frame) {
        let theme = get_theme();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(f.area());

        let titles: Vec<Line> = ActiveView::ALL
            .iter()
            .enumerate()
            .map(|(i, v)| Line::from(format!("F{} {}", i + 1, v.title())))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.active.index())
            .style(Style::default().fg(theme.text_secondary))
            .highlight_style(
                Style::default()
                    .fg(theme.text_highlight)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL).title("monster-sprites"));
        f.render_widget(tabs, chunks[0]);

        let body = chunks[1];
        let buf = f.buffer_mut();
        if self.active == ActiveView::Logs {
            self.logs.render(body, buf, true);
        } else {
            let split = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
                .split(body);
            match self.active {
                ActiveView::Create => self.create.render(split[0], buf, true),
                ActiveView::Viewer => self.viewer.render(split[0], buf, true),
                ActiveView::Gallery => self.gallery.render(split[0], buf, true),
                ActiveView::Logs => {}
            }
            self.logs.render(split[1], buf, false);
        }

        let help = match self.active {
            ActiveView::Create => "F1-F4: Switch view  |  Ctrl+Q: Quit",
            _ => "Tab/F1-F4: Switch view  |  q or Ctrl+Q: Quit",
        };
        let status = Paragraph::new(help).style(Style::default().fg(theme.text_secondary));
        f.render_widget(status, chunks[2]);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> anyhow::Result<()> {
    terminal.show_cursor().ok();
    disable_raw_mode().ok();
    // LeaveAlternateScreen must be executed on the same stdout the backend uses
    let mut out = io::stdout();
    execute!(out, LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sprite::SpriteDescriptor;

    fn app() -> App {
        let (tx, rx) = unbounded();
        App::with_channel(Config::default(), Picker::from_fontsize((8, 16)), tx, rx)
    }

    fn key(code: KeyCode) -> AppMsg {
        AppMsg::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_function_keys_switch_views() {
        let mut app = app();
        app.dispatch(key(KeyCode::F(3)));
        assert_eq!(app.active, ActiveView::Gallery);

        app.dispatch(key(KeyCode::Tab));
        assert_eq!(app.active, ActiveView::Logs);
        app.dispatch(key(KeyCode::Tab));
        assert_eq!(app.active, ActiveView::Create);
    }

    #[test]
    fn test_form_keeps_plain_keys() {
        let mut app = app();
        app.dispatch(key(KeyCode::Char('q')));
        app.dispatch(key(KeyCode::Tab));

        assert!(!app.should_quit());
        assert_eq!(app.active, ActiveView::Create);
        assert_eq!(app.create.draft.name, "q");

        app.dispatch(AppMsg::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)));
        assert!(app.should_quit());
    }

    #[test]
    fn test_q_quits_outside_form() {
        let mut app = app();
        app.dispatch(key(KeyCode::F(2)));
        app.dispatch(key(KeyCode::Char('q')));
        assert!(app.should_quit());
    }

    #[test]
    fn test_switching_views_starts_and_stops_players() {
        let mut app = app();
        app.dispatch(key(KeyCode::F(2)));
        assert!(app.viewer.player().is_running());

        app.dispatch(key(KeyCode::F(1)));
        assert!(!app.viewer.player().is_running());
    }

    #[test]
    fn test_missing_worker_reports_empty_listing() {
        let mut app = app();
        app.dispatch(app.viewer.fetch_request());
        assert_eq!(app.viewer.status, crate::components::LoadStatus::Loading);

        // One answer for the animations and one for the base image.
        let pending: Vec<AppMsg> = app.rx.try_iter().collect();
        assert_eq!(pending.len(), 2);
        for msg in pending {
            app.dispatch(msg);
        }
        assert!(app.viewer.descriptors.is_empty());
        assert!(matches!(app.viewer.status, crate::components::LoadStatus::Failed(_)));
        assert!(matches!(app.viewer.portrait().status, crate::components::LoadStatus::Failed(_)));
    }

    #[test]
    fn test_loaded_paths_reach_only_their_view() {
        let mut app = app();
        app.dispatch(AppMsg::PathsLoaded {
            target: ViewTarget::Gallery,
            descriptors: vec![SpriteDescriptor {
                name: "walk".to_string(),
                image_path: "/32/animations/walk.png".to_string(),
            }],
        });
        assert_eq!(app.gallery.cells.len(), 1);
        assert!(app.viewer.descriptors.is_empty());
    }

    #[test]
    fn test_base_listing_reaches_only_portrait() {
        let mut app = app();
        app.dispatch(AppMsg::PathsLoaded {
            target: ViewTarget::Portrait,
            descriptors: vec![SpriteDescriptor {
                name: "front".to_string(),
                image_path: "/36/base/front.png".to_string(),
            }],
        });

        let portrait = app.viewer.portrait();
        assert_eq!(portrait.descriptor.as_ref().map(|d| d.image_path.as_str()), Some("/36/base/front.png"));
        assert_eq!(portrait.status, crate::components::LoadStatus::Ready);
        assert!(app.viewer.descriptors.is_empty());
        assert!(app.gallery.cells.is_empty());
    }

    #[test]
    fn test_log_messages_reach_panel() {
        let mut app = app();
        app.dispatch(AppMsg::LogMessage("INFO  hello".to_string()));
        assert_eq!(app.logs.logs, vec!["INFO  hello".to_string()]);
    }
}
