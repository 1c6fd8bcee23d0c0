use crate::components::{Component, EventResult};
use crate::state::{AppState, FieldEditor};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use stocksim_core::model::{BALANCE_TOLERANCE, MAX_HOLDINGS, coerce_percent};
use stocksim_core::{HoldingField, PortfolioError};

use super::Screen;

/// Weight change per `+`/`-` press
const WEIGHT_NUDGE: f64 = 0.01;
const WEIGHT_BAR_WIDTH: usize = 20;

pub struct PortfolioScreen;

impl PortfolioScreen {
    pub fn new() -> Self {
        Self
    }

    fn selected(state: &AppState) -> usize {
        state
            .portfolio_state
            .selected_index
            .min(state.session.portfolio().len().saturating_sub(1))
    }

    fn report(state: &mut AppState, result: Result<(), PortfolioError>) {
        match result {
            Ok(()) => state.clear_error(),
            Err(e) => state.set_error(e.to_string()),
        }
    }

    fn open_editor(state: &mut AppState, field: HoldingField) {
        let index = Self::selected(state);
        let Some(holding) = state.session.portfolio().holdings().get(index) else {
            return;
        };
        let initial = match field {
            HoldingField::Ticker => holding.ticker().to_string(),
            HoldingField::Name => holding.name().to_string(),
            HoldingField::Weight => format!("{}", holding.weight()),
        };
        state.portfolio_state.editor = Some(FieldEditor::new(field, initial));
    }

    fn commit_editor(state: &mut AppState) {
        let Some(editor) = state.portfolio_state.editor.take() else {
            return;
        };
        let index = Self::selected(state);
        let portfolio = state.session.portfolio_mut();

        let result = if editor.field == HoldingField::Weight && editor.buffer.contains('%') {
            portfolio.set_weight(index, coerce_percent(&editor.buffer))
        } else {
            portfolio.update_holding(index, editor.field, editor.buffer.trim())
        };
        Self::report(state, result);
    }

    fn handle_editor_key(key: KeyEvent, state: &mut AppState) -> EventResult {
        match key.code {
            KeyCode::Enter => Self::commit_editor(state),
            KeyCode::Esc => state.portfolio_state.editor = None,
            KeyCode::Backspace => {
                if let Some(editor) = state.portfolio_state.editor.as_mut() {
                    editor.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(editor) = state.portfolio_state.editor.as_mut() {
                    editor.push(c);
                }
            }
            _ => {}
        }
        EventResult::Handled
    }

    fn nudge_weight(state: &mut AppState, delta: f64) {
        let index = Self::selected(state);
        let Some(weight) = state
            .session
            .portfolio()
            .holdings()
            .get(index)
            .map(|h| h.weight())
        else {
            return;
        };
        // Round to whole percents so repeated nudges don't accumulate float noise
        let target = ((weight + delta) * 100.0).round() / 100.0;
        let result = state.session.portfolio_mut().set_weight(index, target);
        Self::report(state, result);
    }

    fn render_holdings(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let selected = Self::selected(state);
        let portfolio = state.session.portfolio();

        let items: Vec<ListItem> = portfolio
            .holdings()
            .iter()
            .enumerate()
            .map(|(idx, holding)| {
                let ticker = if holding.ticker().is_empty() {
                    "-----"
                } else {
                    holding.ticker()
                };
                let filled = (holding.weight() * WEIGHT_BAR_WIDTH as f64).round() as usize;
                let bar = "█".repeat(filled.min(WEIGHT_BAR_WIDTH));

                let style = if idx == selected {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };

                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:<6} ", ticker), style),
                    Span::styled(format!("{:<24.24} ", holding.name()), style),
                    Span::styled(format!("{:>6.1}% ", holding.weight() * 100.0), style),
                    Span::styled(bar, Style::default().fg(Color::Cyan)),
                ]))
            })
            .collect();

        let title = format!(" HOLDINGS ({}/{}) ", portfolio.len(), MAX_HOLDINGS);
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));

        frame.render_widget(list, area);
    }

    fn render_summary(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let portfolio = state.session.portfolio();
        let total = portfolio.total_weight();
        let total_style = if portfolio.is_balanced() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Red)
        };
        let bold = Style::default().add_modifier(Modifier::BOLD);

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Total Weight: ", bold),
                Span::styled(format!("{:.1}%", total * 100.0), total_style),
            ]),
            Line::from(Span::styled(
                format!(
                    "  balanced within ±{:.0}%",
                    BALANCE_TOLERANCE * 100.0
                ),
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(""),
        ];

        match state.session.validation_message() {
            Some(msg) => lines.push(Line::from(vec![
                Span::styled("⚠ ", Style::default().fg(Color::Red)),
                Span::raw(msg),
            ])),
            None => lines.push(Line::from(Span::styled(
                "Ready to simulate",
                Style::default().fg(Color::Green),
            ))),
        }

        if state.session.results_stale() {
            lines.push(Line::from(Span::styled(
                "Results are from an earlier portfolio",
                Style::default().fg(Color::Yellow),
            )));
        }

        if let Some(editor) = &state.portfolio_state.editor {
            let label = match editor.field {
                HoldingField::Ticker => "Ticker",
                HoldingField::Weight => "Weight (0-1, or 25%)",
                HoldingField::Name => "Name",
            };
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled(format!("{label}: "), bold),
                Span::styled(
                    format!("{}_", editor.buffer),
                    Style::default().fg(Color::Yellow),
                ),
            ]));
        }

        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" ALLOCATION "));
        frame.render_widget(paragraph, area);
    }
}

impl Component for PortfolioScreen {
    fn handle_key(&mut self, key: KeyEvent, state: &mut AppState) -> EventResult {
        if state.portfolio_state.editor.is_some() {
            return Self::handle_editor_key(key, state);
        }

        let len = state.session.portfolio().len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                state.portfolio_state.selected_index = (Self::selected(state) + 1).min(len - 1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                state.portfolio_state.selected_index = Self::selected(state).saturating_sub(1);
            }
            KeyCode::Char('a') => match state.session.portfolio_mut().add_holding() {
                Ok(index) => {
                    state.clear_error();
                    state.portfolio_state.selected_index = index;
                    Self::open_editor(state, HoldingField::Ticker);
                }
                Err(e) => state.set_error(e.to_string()),
            },
            KeyCode::Char('d') | KeyCode::Delete => {
                let index = Self::selected(state);
                let result = state.session.portfolio_mut().remove_holding(index);
                if result.is_ok() {
                    state.portfolio_state.selected_index = index.min(len.saturating_sub(2));
                }
                Self::report(state, result.map(|_| ()));
            }
            KeyCode::Char('t') | KeyCode::Enter => Self::open_editor(state, HoldingField::Ticker),
            KeyCode::Char('w') => Self::open_editor(state, HoldingField::Weight),
            KeyCode::Char('e') => Self::open_editor(state, HoldingField::Name),
            KeyCode::Char('+') | KeyCode::Char('=') => Self::nudge_weight(state, WEIGHT_NUDGE),
            KeyCode::Char('-') => Self::nudge_weight(state, -WEIGHT_NUDGE),
            KeyCode::Char('n') => {
                let result = state.session.portfolio_mut().normalize();
                Self::report(state, result);
            }
            KeyCode::Char('r') => {
                state.submit();
            }
            _ => return EventResult::NotHandled,
        }
        EventResult::Handled
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        self.render_holdings(frame, chunks[0], state);
        self.render_summary(frame, chunks[1], state);
    }
}

impl Screen for PortfolioScreen {
    fn title(&self) -> &str {
        "Portfolio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crossterm::event::KeyModifiers;
    use stocksim_core::{PortfolioModel, SimulationParameters};

    fn state() -> AppState {
        let session =
            Session::with_seed(PortfolioModel::default(), SimulationParameters::default(), 1);
        AppState::new(session, "http://localhost:8000")
    }

    fn press(screen: &mut PortfolioScreen, state: &mut AppState, code: KeyCode) {
        screen.handle_key(KeyEvent::new(code, KeyModifiers::NONE), state);
    }

    fn type_text(screen: &mut PortfolioScreen, state: &mut AppState, text: &str) {
        for c in text.chars() {
            press(screen, state, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_add_and_name_holding() {
        let mut screen = PortfolioScreen::new();
        let mut state = state();

        press(&mut screen, &mut state, KeyCode::Char('a'));
        assert!(state.is_text_entry());
        type_text(&mut screen, &mut state, "nvda");
        press(&mut screen, &mut state, KeyCode::Enter);

        let holdings = state.session.portfolio().holdings();
        assert_eq!(holdings.len(), 4);
        assert_eq!(holdings[3].ticker(), "NVDA");
        assert_eq!(holdings[3].weight(), 0.0);
        assert!(!state.is_text_entry());
    }

    #[test]
    fn test_percent_weight_entry() {
        let mut screen = PortfolioScreen::new();
        let mut state = state();

        press(&mut screen, &mut state, KeyCode::Char('w'));
        // Clear the prefilled value
        for _ in 0..8 {
            press(&mut screen, &mut state, KeyCode::Backspace);
        }
        type_text(&mut screen, &mut state, "25%");
        press(&mut screen, &mut state, KeyCode::Enter);

        let weight = state.session.portfolio().holdings()[0].weight();
        assert!((weight - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_remove_last_holding_reports_error() {
        let mut screen = PortfolioScreen::new();
        let mut state = state();

        press(&mut screen, &mut state, KeyCode::Char('d'));
        press(&mut screen, &mut state, KeyCode::Char('d'));
        assert_eq!(state.session.portfolio().len(), 1);
        assert!(state.error_message().is_none());

        press(&mut screen, &mut state, KeyCode::Char('d'));
        assert_eq!(state.session.portfolio().len(), 1);
        assert!(state.error_message().is_some());
    }

    #[test]
    fn test_nudge_and_normalize() {
        let mut screen = PortfolioScreen::new();
        let mut state = state();

        press(&mut screen, &mut state, KeyCode::Char('+'));
        press(&mut screen, &mut state, KeyCode::Char('+'));
        press(&mut screen, &mut state, KeyCode::Char('+'));
        let weight = state.session.portfolio().holdings()[0].weight();
        assert!((weight - 0.43).abs() < 1e-12);
        assert!(!state.session.portfolio().is_balanced());

        press(&mut screen, &mut state, KeyCode::Char('n'));
        assert!(state.session.portfolio().is_balanced());
    }

    #[test]
    fn test_escape_cancels_edit() {
        let mut screen = PortfolioScreen::new();
        let mut state = state();

        press(&mut screen, &mut state, KeyCode::Char('e'));
        type_text(&mut screen, &mut state, " Holdings");
        press(&mut screen, &mut state, KeyCode::Esc);
        assert_eq!(state.session.portfolio().holdings()[0].name(), "Apple Inc.");
    }
}
