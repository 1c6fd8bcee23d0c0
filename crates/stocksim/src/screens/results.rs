use crate::components::histogram::render_histogram;
use crate::components::{Component, EventResult};
use crate::session::ChartSet;
use crate::state::{AppState, ResultsView};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Tabs, Wrap},
};
use stocksim_core::SimulationResult;
use stocksim_core::charts::{ChartMeta, Outcome};
use stocksim_core::insights::{
    MetricTone, downside_summary, metrics, return_outlook, risk_assessment,
};

use super::Screen;

pub struct ResultsScreen;

fn tone_color(tone: MetricTone) -> Color {
    match tone {
        MetricTone::Positive => Color::Green,
        MetricTone::Neutral => Color::Yellow,
        MetricTone::Negative => Color::Red,
    }
}

fn outcome_color(outcome: Outcome) -> Color {
    match outcome {
        Outcome::GainOrBreakeven => Color::Green,
        Outcome::Loss => Color::Red,
    }
}

/// Three evenly spaced axis labels.
fn axis_labels(bounds: [f64; 2], suffix: &str) -> Vec<Span<'static>> {
    let [lo, hi] = bounds;
    [lo, (lo + hi) / 2.0, hi]
        .into_iter()
        .map(|v| Span::raw(format!("{v:.0}{suffix}")))
        .collect()
}

fn padded(lo: f64, hi: f64) -> [f64; 2] {
    let pad = ((hi - lo).abs() * 0.05).max(1.0);
    [lo - pad, hi + pad]
}

impl ResultsScreen {
    pub fn new() -> Self {
        Self
    }

    fn chart_block(meta: &ChartMeta) -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", meta.title.to_uppercase()))
    }

    fn render_view_tabs(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let titles: Vec<Line> = ResultsView::ALL
            .iter()
            .map(|view| Line::from(view.name()))
            .collect();
        let selected = ResultsView::ALL
            .iter()
            .position(|v| *v == state.results_state.view)
            .unwrap_or(0);
        let tabs = Tabs::new(titles).select(selected).highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(tabs, area);
    }

    fn render_empty(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let content = if state.session.is_loading() {
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Running Monte Carlo simulation...",
                    Style::default().fg(Color::Yellow),
                )),
                Line::from(""),
                Line::from(format!(
                    "This may take around {} seconds.",
                    state.session.parameters().estimated_seconds()
                )),
            ]
        } else {
            vec![
                Line::from(""),
                Line::from("No simulation results available."),
                Line::from(""),
                Line::from("Build a portfolio, then press r to run a simulation."),
            ]
        };
        let paragraph =
            Paragraph::new(content).block(Block::default().borders(Borders::ALL).title(" RESULTS "));
        frame.render_widget(paragraph, area);
    }

    fn render_overview(
        &self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        result: &SimulationResult,
        charts: &ChartSet,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0)])
            .split(area);

        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(chunks[0]);

        for (metric, card) in metrics(result).iter().zip(cards.iter()) {
            let lines = vec![
                Line::from(Span::styled(
                    metric.value.clone(),
                    Style::default()
                        .fg(tone_color(metric.tone))
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    metric.description,
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", metric.label)),
            );
            frame.render_widget(paragraph, *card);
        }

        let bold = Style::default().add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Line::from(vec![
                Span::styled("Risk Assessment: ", bold),
                Span::raw(risk_assessment(result)),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Downside Risk: ", bold),
                Span::raw(downside_summary(result.var_95())),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Return Potential: ", bold),
                Span::raw(return_outlook(result.expected_return())),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Outcomes: ", bold),
                Span::raw(format!(
                    "{:.1}% of {} trials ended at or above break-even over {} days.",
                    charts.distribution.gain_ratio() * 100.0,
                    charts.distribution.len(),
                    result.simulation_data().horizon().saturating_sub(1),
                )),
            ]),
        ];

        if state.session.results_stale() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "The portfolio changed since this run. Press r to simulate again.",
                Style::default().fg(Color::Yellow),
            )));
        }

        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" INSIGHTS "));
        frame.render_widget(paragraph, chunks[1]);
    }

    fn render_distribution(&self, frame: &mut Frame, area: Rect, charts: &ChartSet) {
        let block = Self::chart_block(&charts.distribution.meta);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        render_histogram(frame, inner, &charts.histogram);
    }

    fn render_paths(&self, frame: &mut Frame, area: Rect, charts: &ChartSet) {
        let series = &charts.paths;
        let x_bounds = series.meta.x_bounds.unwrap_or([0.0, 1.0]);
        let (y_lo, y_hi) = series.y_range();
        let y_bounds = padded(y_lo.min(0.0), y_hi.max(0.0));
        let break_even = [(x_bounds[0], 0.0), (x_bounds[1], 0.0)];

        let mut datasets: Vec<Dataset> = series
            .sampled
            .iter()
            .map(|line| {
                Dataset::default()
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(outcome_color(line.outcome)).dim())
                    .data(&line.points)
            })
            .collect();

        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::DarkGray))
                .data(&break_even),
        );
        datasets.push(
            Dataset::default()
                .name(series.average.label.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
                .data(&series.average.points),
        );

        let chart = Chart::new(datasets)
            .block(Self::chart_block(&series.meta))
            .x_axis(
                Axis::default()
                    .title(series.meta.x_label.dark_gray())
                    .bounds(x_bounds)
                    .labels(axis_labels(x_bounds, "")),
            )
            .y_axis(
                Axis::default()
                    .title(series.meta.y_label.dark_gray())
                    .bounds(y_bounds)
                    .labels(axis_labels(y_bounds, "%")),
            );

        frame.render_widget(chart, area);
    }

    fn render_risk_return(&self, frame: &mut Frame, area: Rect, charts: &ChartSet) {
        let series = &charts.risk_return;
        let x_bounds = series.meta.x_bounds.unwrap_or([0.0, 40.0]);
        let y_bounds = series.meta.y_bounds.unwrap_or([-15.0, 35.0]);
        let portfolio = [series.portfolio.xy()];

        let datasets = vec![
            Dataset::default()
                .name("Other Portfolios")
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::Gray))
                .data(&series.comparison.points),
            Dataset::default()
                .name("Efficient Frontier")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Blue))
                .data(&series.frontier),
            Dataset::default()
                .name(series.portfolio.label.clone())
                .marker(symbols::Marker::Block)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
                .data(&portfolio),
        ];

        let chart = Chart::new(datasets)
            .block(Self::chart_block(&series.meta))
            .x_axis(
                Axis::default()
                    .title(series.meta.x_label.dark_gray())
                    .bounds(x_bounds)
                    .labels(axis_labels(x_bounds, "%")),
            )
            .y_axis(
                Axis::default()
                    .title(series.meta.y_label.dark_gray())
                    .bounds(y_bounds)
                    .labels(axis_labels(y_bounds, "%")),
            );

        frame.render_widget(chart, area);
    }
}

impl Component for ResultsScreen {
    fn handle_key(&mut self, key: KeyEvent, state: &mut AppState) -> EventResult {
        let view = state.results_state.view;
        match key.code {
            KeyCode::Char('l') | KeyCode::Right => state.results_state.view = view.next(),
            KeyCode::Char('h') | KeyCode::Left => state.results_state.view = view.prev(),
            KeyCode::Char('r') => {
                state.submit();
            }
            _ => return EventResult::NotHandled,
        }
        EventResult::Handled
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let (Some(result), Some(charts)) = (state.session.result(), state.session.charts()) else {
            self.render_empty(frame, area, state);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);

        self.render_view_tabs(frame, chunks[0], state);

        match state.results_state.view {
            ResultsView::Overview => self.render_overview(frame, chunks[1], state, result, charts),
            ResultsView::Distribution => self.render_distribution(frame, chunks[1], charts),
            ResultsView::Paths => self.render_paths(frame, chunks[1], charts),
            ResultsView::RiskReturn => self.render_risk_return(frame, chunks[1], charts),
        }
    }
}

impl Screen for ResultsScreen {
    fn title(&self) -> &str {
        "Results"
    }
}
