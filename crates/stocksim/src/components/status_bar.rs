use super::{Component, EventResult};
use crate::gateway::HealthStatus;
use crate::state::{AppState, TabId};
use crossterm::event::KeyEvent;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub struct StatusBar;

impl StatusBar {
    pub fn new() -> Self {
        Self
    }

    fn help_text(state: &AppState) -> &'static str {
        if state.is_text_entry() {
            return "Enter: confirm | Esc: cancel | Backspace: delete";
        }
        match state.active_tab {
            TabId::Portfolio => {
                "j/k: select | a: add | d: remove | t/w/e: edit ticker/weight/name | +/-: nudge | n: normalize | r: run | q: quit"
            }
            TabId::Simulation => {
                "j/k: field | ←/→: adjust | PgUp/PgDn: step 10 | Enter: edit days | r: run | h: check API | q: quit"
            }
            TabId::Results => "←/→: switch view | r: run again | q: quit",
        }
    }

    fn api_span(state: &AppState) -> Span<'static> {
        if state.health_check_pending() {
            return Span::styled(" API: checking ", Style::default().fg(Color::Yellow));
        }
        match state.session.api_status() {
            Some(HealthStatus::Healthy) => {
                Span::styled(" API: healthy ", Style::default().fg(Color::Green))
            }
            Some(HealthStatus::Unhealthy(_)) => {
                Span::styled(" API: unavailable ", Style::default().fg(Color::Red))
            }
            None => Span::styled(" API: unknown ", Style::default().fg(Color::DarkGray)),
        }
    }
}

impl Component for StatusBar {
    fn handle_key(&mut self, _key: KeyEvent, _state: &mut AppState) -> EventResult {
        EventResult::NotHandled
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let mut spans = vec![Self::api_span(state), Span::raw("| ")];

        if state.session.is_loading() {
            spans.push(Span::styled(
                "Running simulation...",
                Style::default().fg(Color::Yellow),
            ));
        } else if let Some(error) = state.error_message() {
            spans.push(Span::styled("Error: ", Style::default().fg(Color::Red)));
            spans.push(Span::raw(error.to_string()));
        } else {
            spans.push(Span::styled(
                Self::help_text(state),
                Style::default().fg(Color::DarkGray),
            ));
        }

        let paragraph =
            Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::TOP));

        frame.render_widget(paragraph, area);
    }
}
