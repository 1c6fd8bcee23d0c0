use std::mem;

use crate::gateway::GatewayError;
use crate::session::Session;
use crate::worker::{WorkerRequest, WorkerResponse};

use super::{PortfolioState, ResultsState, SimulationState, TabId};

pub struct AppState {
    pub active_tab: TabId,
    pub session: Session,
    pub api_url: String,
    pub portfolio_state: PortfolioState,
    pub simulation_state: SimulationState,
    pub results_state: ResultsState,
    pub exit: bool,
    /// Requests queued by key handlers, forwarded to the worker by the app loop
    outbox: Vec<WorkerRequest>,
    health_check_pending: bool,
}

impl AppState {
    pub fn new(session: Session, api_url: impl Into<String>) -> Self {
        Self {
            active_tab: TabId::Portfolio,
            session,
            api_url: api_url.into(),
            portfolio_state: PortfolioState::default(),
            simulation_state: SimulationState::default(),
            results_state: ResultsState::default(),
            exit: false,
            outbox: Vec::new(),
            health_check_pending: false,
        }
    }

    pub fn switch_tab(&mut self, tab: TabId) {
        self.active_tab = tab;
    }

    /// True while a text field owns the keyboard.
    pub fn is_text_entry(&self) -> bool {
        self.portfolio_state.editor.is_some() || self.simulation_state.days_input.is_some()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.session.error_message()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.session.set_error(message);
    }

    pub fn clear_error(&mut self) {
        self.session.clear_error();
    }

    pub fn health_check_pending(&self) -> bool {
        self.health_check_pending
    }

    // ------------------------------------------------------------------------
    // Worker traffic
    // ------------------------------------------------------------------------

    /// Validate and queue a simulation. Refusals show up as the error message.
    pub fn submit(&mut self) -> bool {
        match self.session.begin_submit() {
            Ok(request) => {
                self.outbox.push(WorkerRequest::Simulate(request));
                true
            }
            Err(_) => false,
        }
    }

    pub fn request_health_check(&mut self) {
        if !self.health_check_pending {
            self.health_check_pending = true;
            self.outbox.push(WorkerRequest::HealthCheck);
        }
    }

    pub fn take_outbox(&mut self) -> Vec<WorkerRequest> {
        mem::take(&mut self.outbox)
    }

    /// Put a request the worker could not accept back into the session state.
    pub fn request_dropped(&mut self, request: WorkerRequest) {
        match request {
            WorkerRequest::Simulate(_) => {
                // Close the Loading phase the submit opened
                let _ = self.session.complete(Err(GatewayError::Transport(
                    "simulation worker is not running".into(),
                )));
            }
            WorkerRequest::HealthCheck => self.health_check_pending = false,
            WorkerRequest::Shutdown => {}
        }
    }

    pub fn apply_response(&mut self, response: WorkerResponse) {
        match response {
            WorkerResponse::Simulation(outcome) => {
                if self.session.complete(outcome).is_ok() {
                    self.results_state.view = Default::default();
                    self.switch_tab(TabId::Results);
                }
            }
            WorkerResponse::Health(status) => {
                self.health_check_pending = false;
                self.session.set_api_status(status);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::HealthStatus;
    use crate::gateway::stub::sample_result;
    use crate::session::RequestPhase;
    use stocksim_core::{PortfolioModel, SimulationParameters};

    fn state() -> AppState {
        let session = Session::with_seed(
            PortfolioModel::default(),
            SimulationParameters::default(),
            3,
        );
        AppState::new(session, "http://localhost:8000")
    }

    #[test]
    fn test_submit_queues_request_and_completes() {
        let mut state = state();
        assert!(state.submit());
        let outbox = state.take_outbox();
        assert!(matches!(outbox.as_slice(), [WorkerRequest::Simulate(_)]));
        assert!(state.take_outbox().is_empty());
        assert_eq!(state.session.phase(), RequestPhase::Loading);

        state.apply_response(WorkerResponse::Simulation(Ok(sample_result(40, 4))));
        assert_eq!(state.active_tab, TabId::Results);
        assert!(state.session.charts().is_some());
    }

    #[test]
    fn test_failed_simulation_stays_on_tab() {
        let mut state = state();
        state.switch_tab(TabId::Simulation);
        state.submit();
        state.apply_response(WorkerResponse::Simulation(Err(GatewayError::Failure(
            "bad".into(),
        ))));
        assert_eq!(state.active_tab, TabId::Simulation);
        assert_eq!(state.error_message(), Some("bad"));
    }

    #[test]
    fn test_health_check_is_not_duplicated() {
        let mut state = state();
        state.request_health_check();
        state.request_health_check();
        assert_eq!(state.take_outbox().len(), 1);
        assert!(state.health_check_pending());

        state.apply_response(WorkerResponse::Health(HealthStatus::Healthy));
        assert!(!state.health_check_pending());
        assert_eq!(state.session.api_status(), Some(&HealthStatus::Healthy));
    }

    #[test]
    fn test_dropped_simulation_unblocks_session() {
        let mut state = state();
        state.submit();
        for request in state.take_outbox() {
            state.request_dropped(request);
        }
        assert_eq!(state.session.phase(), RequestPhase::Idle);
        assert!(state.error_message().is_some());
    }
}
