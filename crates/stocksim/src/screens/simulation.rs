use crate::components::{Component, EventResult};
use crate::gateway::HealthStatus;
use crate::state::{AppState, SimulationField};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};
use stocksim_core::model::SIMULATIONS_RANGE;
use stocksim_core::{HorizonPreset, Preset, SimulationPreset};

use super::Screen;

/// Slider steps moved by PageUp/PageDown
const LARGE_STEP: i32 = 10;

pub struct SimulationScreen;

/// Next (or previous) entry after `current`, wrapping; starts at an end when unset.
fn cycle<T: Copy + PartialEq>(all: &[T], current: Option<T>, forward: bool) -> Option<T> {
    let len = all.len();
    if len == 0 {
        return None;
    }
    let index = match current.and_then(|c| all.iter().position(|x| *x == c)) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None if forward => 0,
        None => len - 1,
    };
    Some(all[index])
}

impl SimulationScreen {
    pub fn new() -> Self {
        Self
    }

    fn adjust(state: &mut AppState, forward: bool, steps: i32) {
        let params = state.session.parameters_mut();
        match state.simulation_state.focused_field {
            SimulationField::Horizon => {
                let current = params.active_horizon_preset();
                if let Some(preset) = cycle(&HorizonPreset::ALL, current, forward) {
                    params.apply_preset(Preset::Horizon(preset));
                }
            }
            SimulationField::SimulationPreset => {
                let current = params.active_simulation_preset();
                if let Some(preset) = cycle(&SimulationPreset::ALL, current, forward) {
                    params.apply_preset(Preset::Simulations(preset));
                }
            }
            SimulationField::Simulations => {
                params.step_simulations(if forward { steps } else { -steps });
            }
            SimulationField::Days => {}
        }
    }

    fn handle_days_key(key: KeyEvent, state: &mut AppState) -> EventResult {
        match key.code {
            KeyCode::Enter => {
                if let Some(raw) = state.simulation_state.days_input.take() {
                    match state.session.parameters_mut().set_days_from_input(&raw) {
                        Ok(()) => state.clear_error(),
                        Err(e) => state.set_error(e.to_string()),
                    }
                }
            }
            KeyCode::Esc => state.simulation_state.days_input = None,
            KeyCode::Backspace => {
                if let Some(input) = state.simulation_state.days_input.as_mut() {
                    input.pop();
                }
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
                if let Some(input) = state.simulation_state.days_input.as_mut() {
                    input.push(c);
                }
            }
            _ => {}
        }
        EventResult::Handled
    }

    fn field_style(state: &AppState, field: SimulationField) -> Style {
        if state.simulation_state.focused_field == field {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    }

    fn preset_spans<T: Copy + PartialEq>(
        all: &[T],
        active: Option<T>,
        label: impl Fn(&T) -> &'static str,
    ) -> Vec<Span<'static>> {
        all.iter()
            .flat_map(|preset| {
                let style = if Some(*preset) == active {
                    Style::default().fg(Color::Black).bg(Color::Cyan)
                } else {
                    Style::default().fg(Color::Gray)
                };
                [Span::styled(format!(" {} ", label(preset)), style), Span::raw(" ")]
            })
            .collect()
    }

    fn render_parameters(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let params = state.session.parameters();
        let block = Block::default().borders(Borders::ALL).title(" PARAMETERS ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Horizon presets
                Constraint::Length(2), // Days entry
                Constraint::Length(2), // Simulation presets
                Constraint::Length(1), // Slider label
                Constraint::Length(1), // Slider
                Constraint::Min(0),
            ])
            .split(inner);

        let mut horizon = vec![Span::styled(
            "Time Horizon:      ",
            Self::field_style(state, SimulationField::Horizon),
        )];
        horizon.extend(Self::preset_spans(
            &HorizonPreset::ALL,
            params.active_horizon_preset(),
            HorizonPreset::label,
        ));
        frame.render_widget(Paragraph::new(Line::from(horizon)), rows[0]);

        let days_text = match &state.simulation_state.days_input {
            Some(input) => Span::styled(format!("{input}_"), Style::default().fg(Color::Yellow)),
            None => Span::raw(format!("{} trading days", params.days())),
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(
                    "Custom Days:       ",
                    Self::field_style(state, SimulationField::Days),
                ),
                days_text,
            ])),
            rows[1],
        );

        let mut sims = vec![Span::styled(
            "Simulation Count:  ",
            Self::field_style(state, SimulationField::SimulationPreset),
        )];
        sims.extend(Self::preset_spans(
            &SimulationPreset::ALL,
            params.active_simulation_preset(),
            SimulationPreset::label,
        ));
        frame.render_widget(Paragraph::new(Line::from(sims)), rows[2]);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(
                    "Simulations:       ",
                    Self::field_style(state, SimulationField::Simulations),
                ),
                Span::raw(format!("{}", params.simulations())),
            ])),
            rows[3],
        );

        let (min, max) = (*SIMULATIONS_RANGE.start(), *SIMULATIONS_RANGE.end());
        let ratio = (params.simulations() - min) as f64 / (max - min) as f64;
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(ratio.clamp(0.0, 1.0))
            .label(format!("{min} .. {max}"));
        frame.render_widget(gauge, rows[4]);
    }

    fn render_run_panel(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let params = state.session.parameters();
        let bold = Style::default().add_modifier(Modifier::BOLD);

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Portfolio: ", bold),
                Span::raw(state.session.portfolio().snapshot().label()),
            ]),
            Line::from(vec![
                Span::styled("Horizon:   ", bold),
                Span::raw(format!("{} days", params.days())),
            ]),
            Line::from(vec![
                Span::styled("Trials:    ", bold),
                Span::raw(format!("{}", params.simulations())),
            ]),
            Line::from(Span::styled(
                format!(
                    "Estimated processing time: ~{} seconds",
                    params.estimated_seconds()
                ),
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(""),
        ];

        let (run_text, run_style) = if state.session.is_loading() {
            ("Running simulation...", Style::default().fg(Color::Yellow))
        } else if state.session.can_submit() {
            ("[r] Run Simulation", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        } else {
            ("[r] Run Simulation (unavailable)", Style::default().fg(Color::DarkGray))
        };
        lines.push(Line::from(Span::styled(run_text, run_style)));

        if let Some(msg) = state.session.validation_message() {
            lines.push(Line::from(Span::styled(
                format!("  {msg}"),
                Style::default().fg(Color::Red),
            )));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Service:   ", bold),
            Span::raw(state.api_url.clone()),
        ]));
        let api_line = match state.session.api_status() {
            _ if state.health_check_pending() => {
                Span::styled("checking...", Style::default().fg(Color::Yellow))
            }
            Some(HealthStatus::Healthy) => Span::styled("healthy", Style::default().fg(Color::Green)),
            Some(HealthStatus::Unhealthy(reason)) => Span::styled(
                format!("unavailable ({reason}). Start the simulation service, then press h."),
                Style::default().fg(Color::Red),
            ),
            None => Span::styled("not checked", Style::default().fg(Color::DarkGray)),
        };
        lines.push(Line::from(vec![Span::styled("Status:    ", bold), api_line]));

        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" RUN "));
        frame.render_widget(paragraph, area);
    }
}

impl Component for SimulationScreen {
    fn handle_key(&mut self, key: KeyEvent, state: &mut AppState) -> EventResult {
        if state.simulation_state.days_input.is_some() {
            return Self::handle_days_key(key, state);
        }

        let focused = state.simulation_state.focused_field;
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                state.simulation_state.focused_field = focused.next();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                state.simulation_state.focused_field = focused.prev();
            }
            KeyCode::Left => Self::adjust(state, false, 1),
            KeyCode::Right => Self::adjust(state, true, 1),
            KeyCode::PageDown => Self::adjust(state, false, LARGE_STEP),
            KeyCode::PageUp => Self::adjust(state, true, LARGE_STEP),
            KeyCode::Enter if focused == SimulationField::Days => {
                state.simulation_state.days_input =
                    Some(state.session.parameters().days().to_string());
            }
            KeyCode::Char('r') | KeyCode::Enter => {
                state.submit();
            }
            KeyCode::Char('h') => state.request_health_check(),
            _ => return EventResult::NotHandled,
        }
        EventResult::Handled
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        self.render_parameters(frame, chunks[0], state);
        self.render_run_panel(frame, chunks[1], state);
    }
}

impl Screen for SimulationScreen {
    fn title(&self) -> &str {
        "Simulation"
    }
}
