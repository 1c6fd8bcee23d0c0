use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use crate::components::{Component, EventResult, status_bar::StatusBar, tab_bar::TabBar};
use crate::screens::{
    portfolio::PortfolioScreen, results::ResultsScreen, simulation::SimulationScreen,
};
use crate::state::{AppState, TabId};
use crate::worker::SimulationWorker;

/// How long to wait for terminal input before checking the worker again
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct App {
    state: AppState,
    worker: SimulationWorker,
    tab_bar: TabBar,
    status_bar: StatusBar,
    portfolio_screen: PortfolioScreen,
    simulation_screen: SimulationScreen,
    results_screen: ResultsScreen,
}

impl App {
    /// Create the app and queue the startup health check.
    pub fn new(mut state: AppState, worker: SimulationWorker) -> Self {
        state.request_health_check();

        Self {
            state,
            worker,
            tab_bar: TabBar::new(),
            status_bar: StatusBar::new(),
            portfolio_screen: PortfolioScreen::new(),
            simulation_screen: SimulationScreen::new(),
            results_screen: ResultsScreen::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// runs the application's main loop until the user quits
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        self.pump_worker();

        while !self.state.exit {
            terminal.draw(|frame| self.draw(frame))?;
            self.handle_events()?;
            self.pump_worker();
        }

        self.worker.shutdown();
        Ok(())
    }

    /// Forward queued requests and apply whatever the worker has finished.
    fn pump_worker(&mut self) {
        for request in self.state.take_outbox() {
            if !self.worker.send(request.clone()) {
                tracing::error!("Simulation worker is gone, dropping request");
                self.state.request_dropped(request);
            }
        }

        while let Some(response) = self.worker.try_recv() {
            self.state.apply_response(response);
        }

        let changes = self.state.session.sync();
        if changes > 0 {
            tracing::debug!(changes, "Portfolio edited");
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Tab bar
                Constraint::Min(0),    // Content
                Constraint::Length(2), // Status bar
            ])
            .split(frame.area());

        self.tab_bar.render(frame, chunks[0], &self.state);
        self.render_active_screen(frame, chunks[1]);
        self.status_bar.render(frame, chunks[2], &self.state);
    }

    fn render_active_screen(&mut self, frame: &mut Frame, area: Rect) {
        match self.state.active_tab {
            TabId::Portfolio => self.portfolio_screen.render(frame, area, &self.state),
            TabId::Simulation => self.simulation_screen.render(frame, area, &self.state),
            TabId::Results => self.results_screen.render(frame, area, &self.state),
        }
    }

    fn handle_events(&mut self) -> io::Result<()> {
        if !event::poll(POLL_INTERVAL)? {
            return Ok(());
        }
        match event::read()? {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                self.handle_key_event(key_event)
            }
            _ => {}
        };
        Ok(())
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) {
        let text_entry = self.state.is_text_entry();

        // Global key bindings
        match key_event.code {
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.exit = true;
                return;
            }
            KeyCode::Char('q') if key_event.modifiers.is_empty() && !text_entry => {
                self.state.exit = true;
                return;
            }
            KeyCode::Esc if !text_entry => {
                self.state.clear_error();
                return;
            }
            _ => {}
        }

        let result = self.tab_bar.handle_key(key_event, &mut self.state);
        if result != EventResult::NotHandled {
            return;
        }

        let result = match self.state.active_tab {
            TabId::Portfolio => self.portfolio_screen.handle_key(key_event, &mut self.state),
            TabId::Simulation => self
                .simulation_screen
                .handle_key(key_event, &mut self.state),
            TabId::Results => self.results_screen.handle_key(key_event, &mut self.state),
        };

        if result == EventResult::Exit {
            self.state.exit = true
        }
    }
}
