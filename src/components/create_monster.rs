use super::Component;
use crate::event::AppMsg;
use crate::model::monster::{Element, MonsterDraft};
use crate::widgets::common::focused_block;
use crate::widgets::theme::get_theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

const NAME_PLACEHOLDER: &str = "e.g. Fluffernox";
const DESCRIPTION_PLACEHOLDER: &str = "A playful cloud fox that loves mountain skies...";
const PHYSICAL_PLACEHOLDER: &str = "Describe body shape, colors, wings, horns, etc.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Name,
    Description,
    PhysicalFeatures,
    Element,
}

impl FormField {
    const ORDER: [FormField; 4] = [
        FormField::Name,
        FormField::Description,
        FormField::PhysicalFeatures,
        FormField::Element,
    ];

    fn index(&self) -> usize {
        Self::ORDER.iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Monster Name",
            FormField::Description => "Short Description",
            FormField::PhysicalFeatures => "Physical Features",
            FormField::Element => "Type",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormMessage {
    Submitted(String),
    Invalid(String),
}

pub struct CreateMonsterState {
    pub draft: MonsterDraft,
    pub focused: FormField,
    pub message: Option<FormMessage>,
    pub last_submitted: Option<MonsterDraft>,
}

impl Default for CreateMonsterState {
    fn default() -> Self {
        Self {
            draft: MonsterDraft::default(),
            focused: FormField::Name,
            message: None,
            last_submitted: None,
        }
    }
}

impl CreateMonsterState {
    fn text_mut(&mut self) -> Option<&mut String> {
        match self.focused {
            FormField::Name => Some(&mut self.draft.name),
            FormField::Description => Some(&mut self.draft.description),
            FormField::PhysicalFeatures => Some(&mut self.draft.physical_features),
            FormField::Element => None,
        }
    }

    pub fn submit(&mut self) {
        match self.draft.validate() {
            Ok(()) => {
                let summary = self.draft.summary();
                log::info!("Drafted monster {}", summary);
                self.last_submitted = Some(self.draft.clone());
                self.message = Some(FormMessage::Submitted(format!("Drafted {}", summary)));
            }
            Err(e) => {
                self.focused = FormField::Name;
                self.message = Some(FormMessage::Invalid(e.to_string()));
            }
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('s') {
                self.submit();
            }
            return;
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => self.focused = self.focused.next(),
            KeyCode::BackTab | KeyCode::Up => self.focused = self.focused.prev(),
            KeyCode::Enter => {
                if self.focused == FormField::Element {
                    self.submit();
                } else {
                    self.focused = self.focused.next();
                }
            }
            KeyCode::Right if self.focused == FormField::Element => {
                self.draft.element = Some(self.draft.element.map_or(Element::ALL[0], |e| e.next()));
            }
            KeyCode::Left if self.focused == FormField::Element => {
                self.draft.element = Some(
                    self.draft
                        .element
                        .map_or(Element::ALL[Element::ALL.len() - 1], |e| e.prev()),
                );
            }
            KeyCode::Backspace => {
                if let Some(text) = self.text_mut() {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = self.text_mut() {
                    text.push(c);
                }
            }
            _ => {}
        }
    }

    fn input_widget<'a>(&self, field: FormField, value: &'a str, placeholder: &'a str) -> Paragraph<'a> {
        let theme = get_theme();
        let is_focused = self.focused == field;
        let border = if is_focused {
            theme.border_focused
        } else {
            theme.border_unfocused
        };

        let text = if value.is_empty() {
            Line::from(Span::styled(placeholder, Style::default().fg(theme.placeholder)))
        } else {
            Line::from(Span::styled(value, Style::default().fg(theme.text_primary)))
        };

        Paragraph::new(text).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(field.label()),
        )
    }

    fn element_line(&self) -> Line<'static> {
        let theme = get_theme();
        let mut spans = Vec::new();
        for element in Element::ALL {
            let selected = self.draft.element == Some(element);
            let marker = if selected { "(•)" } else { "( )" };
            let style = if selected {
                Style::default()
                    .fg(theme.text_highlight)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text_primary)
            };
            spans.push(Span::styled(format!("{} {}  ", marker, element), style));
        }
        Line::from(spans)
    }
}

impl Component for CreateMonsterState {
    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg> {
        if let AppMsg::Key(key) = msg {
            self.handle_key(key);
        }
        None
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, is_focused: bool) {
        let theme = get_theme();
        let block = focused_block("Create Your Own Monster!", is_focused);
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Identity
                Constraint::Length(3), // Name
                Constraint::Length(5), // Description
                Constraint::Length(1), // Visual Appearance
                Constraint::Length(5), // Physical features
                Constraint::Length(1), // Attributes
                Constraint::Length(3), // Type
                Constraint::Min(1),    // Message / help
            ])
            .split(inner);

        let heading = |text: &'static str| {
            Paragraph::new(Span::styled(
                text,
                Style::default()
                    .fg(theme.text_secondary)
                    .add_modifier(Modifier::BOLD),
            ))
        };

        heading("Identity").render(chunks[0], buf);
        self.input_widget(FormField::Name, &self.draft.name, NAME_PLACEHOLDER)
            .render(chunks[1], buf);
        self.input_widget(
            FormField::Description,
            &self.draft.description,
            DESCRIPTION_PLACEHOLDER,
        )
        .render(chunks[2], buf);

        heading("Visual Appearance").render(chunks[3], buf);
        self.input_widget(
            FormField::PhysicalFeatures,
            &self.draft.physical_features,
            PHYSICAL_PLACEHOLDER,
        )
        .render(chunks[4], buf);

        heading("Attributes").render(chunks[5], buf);
        let element_border = if self.focused == FormField::Element {
            theme.border_focused
        } else {
            theme.border_unfocused
        };
        Paragraph::new(self.element_line())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(element_border))
                    .title(FormField::Element.label()),
            )
            .render(chunks[6], buf);

        let mut footer = Vec::new();
        match &self.message {
            Some(FormMessage::Submitted(text)) => footer.push(Line::from(Span::styled(
                text.clone(),
                Style::default().fg(theme.status_ready),
            ))),
            Some(FormMessage::Invalid(text)) => footer.push(Line::from(Span::styled(
                format!("Cannot submit: {}", text),
                Style::default().fg(theme.status_failed),
            ))),
            None => {}
        }
        footer.push(Line::from(Span::styled(
            "Tab/↑↓: Field  ←→: Type  Enter on Type or Ctrl+S: Submit",
            Style::default().fg(theme.text_secondary),
        )));
        Paragraph::new(footer)
            .wrap(Wrap { trim: true })
            .render(chunks[7], buf);
    }
}
