//! One user session: the portfolio being edited, the run parameters, and the
//! lifecycle of the simulation request built from them.
//!
//! The session never talks to the network itself. [`Session::begin_submit`]
//! produces the request, and whoever carries it to a gateway hands the outcome
//! back through [`Session::complete`]. The UI does that through the background
//! worker, the headless CLI through [`Session::run_blocking`].

use std::sync::mpsc::{Receiver, channel};

use rand::SeedableRng;
use rand::rngs::StdRng;
use stocksim_core::charts::{
    DEFAULT_HISTOGRAM_BINS, DistributionSeries, HistogramBin, PathSeries, RiskReturnSeries,
    distribution_series, path_series, risk_return_series,
};
use stocksim_core::{
    ChartError, Portfolio, PortfolioModel, SimulationParameters, SimulationRequest,
    SimulationResult, ValidationError,
};
use thiserror::Error;

use crate::gateway::{GatewayError, HealthStatus, SimulationGateway};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Idle,
    Loading,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    #[error("a simulation is already running")]
    Busy,

    #[error("the simulation service is unavailable: {0}")]
    ApiUnavailable(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("cannot chart this result: {0}")]
    Chart(#[from] ChartError),
}

/// Every chart series for one result, derived once when the result arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSet {
    pub distribution: DistributionSeries,
    pub histogram: Vec<HistogramBin>,
    pub paths: PathSeries,
    pub risk_return: RiskReturnSeries,
}

impl ChartSet {
    /// Derive every series, failing on the first one the result cannot feed.
    pub fn derive(
        result: &SimulationResult,
        portfolio: &Portfolio,
        rng: &mut StdRng,
    ) -> Result<Self, ChartError> {
        let distribution = distribution_series(result)?;
        let histogram = distribution.histogram(DEFAULT_HISTOGRAM_BINS);
        Ok(Self {
            histogram,
            distribution,
            paths: path_series(result)?,
            risk_return: risk_return_series(result, portfolio, rng)?,
        })
    }
}

pub struct Session {
    portfolio: PortfolioModel,
    parameters: SimulationParameters,
    phase: RequestPhase,
    /// Portfolio as it was when the in-flight or last request was sent
    submitted: Option<Portfolio>,
    result: Option<SimulationResult>,
    charts: Option<ChartSet>,
    error_message: Option<String>,
    /// The displayed error came from portfolio validation
    error_from_validation: bool,
    api_status: Option<HealthStatus>,
    changes: Receiver<Portfolio>,
    /// Portfolio edits observed since the last completed run
    edits_since_run: usize,
    rng: StdRng,
}

impl Session {
    pub fn new(portfolio: PortfolioModel, parameters: SimulationParameters) -> Self {
        Self::with_rng(portfolio, parameters, StdRng::from_rng(&mut rand::rng()))
    }

    /// Session with a fixed seed for the comparison cloud.
    pub fn with_seed(
        portfolio: PortfolioModel,
        parameters: SimulationParameters,
        seed: u64,
    ) -> Self {
        Self::with_rng(portfolio, parameters, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        mut portfolio: PortfolioModel,
        parameters: SimulationParameters,
        rng: StdRng,
    ) -> Self {
        let (tx, changes) = channel();
        portfolio.subscribe(move |snapshot| {
            let _ = tx.send(snapshot.clone());
        });

        Self {
            portfolio,
            parameters,
            phase: RequestPhase::Idle,
            submitted: None,
            result: None,
            charts: None,
            error_message: None,
            error_from_validation: false,
            api_status: None,
            changes,
            edits_since_run: 0,
            rng,
        }
    }

    // ------------------------------------------------------------------------
    // Models
    // ------------------------------------------------------------------------

    pub fn portfolio(&self) -> &PortfolioModel {
        &self.portfolio
    }

    pub fn portfolio_mut(&mut self) -> &mut PortfolioModel {
        &mut self.portfolio
    }

    pub fn parameters(&self) -> &SimulationParameters {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut SimulationParameters {
        &mut self.parameters
    }

    /// Drain portfolio change notifications. Returns how many arrived.
    ///
    /// A validation message left over from a refused submit is cleared as soon
    /// as the portfolio changes.
    pub fn sync(&mut self) -> usize {
        let mut seen = 0;
        while let Ok(snapshot) = self.changes.try_recv() {
            seen += 1;
            tracing::trace!(
                holdings = snapshot.stocks.len(),
                total = snapshot.total_weight(),
                "Portfolio changed"
            );
        }
        if seen > 0 {
            self.edits_since_run += seen;
            if self.error_from_validation {
                self.clear_error();
            }
        }
        seen
    }

    /// True when the portfolio was edited after the displayed result was produced.
    pub fn results_stale(&self) -> bool {
        self.result.is_some() && self.edits_since_run > 0
    }

    // ------------------------------------------------------------------------
    // Request lifecycle
    // ------------------------------------------------------------------------

    pub fn phase(&self) -> RequestPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == RequestPhase::Loading
    }

    pub fn api_status(&self) -> Option<&HealthStatus> {
        self.api_status.as_ref()
    }

    pub fn set_api_status(&mut self, status: HealthStatus) {
        if let HealthStatus::Unhealthy(reason) = &status {
            tracing::warn!(%reason, "Simulation service unhealthy");
        }
        self.api_status = Some(status);
    }

    /// Whether a submit would currently be accepted.
    pub fn can_submit(&self) -> bool {
        self.submit_blocker().is_none() && self.portfolio.validate().is_ok()
    }

    fn submit_blocker(&self) -> Option<SubmitError> {
        if self.is_loading() {
            return Some(SubmitError::Busy);
        }
        if let Some(HealthStatus::Unhealthy(reason)) = &self.api_status {
            return Some(SubmitError::ApiUnavailable(reason.clone()));
        }
        None
    }

    /// Validate the portfolio and enter `Loading`, returning the request to send.
    ///
    /// On error nothing changes except the displayed message.
    pub fn begin_submit(&mut self) -> Result<SimulationRequest, SubmitError> {
        if let Some(blocker) = self.submit_blocker() {
            self.set_error(blocker.to_string());
            return Err(blocker);
        }

        let portfolio = match self.portfolio.validate() {
            Ok(portfolio) => portfolio,
            Err(e) => {
                tracing::debug!(error = %e, "Submission refused");
                self.set_error(e.to_string());
                self.error_from_validation = true;
                return Err(e.into());
            }
        };

        let request = SimulationRequest::new(portfolio.clone(), &self.parameters);
        tracing::info!(
            portfolio = %portfolio.label(),
            days = request.days,
            simulations = request.simulations,
            "Submitting simulation"
        );

        self.phase = RequestPhase::Loading;
        self.clear_error();
        self.submitted = Some(portfolio);
        Ok(request)
    }

    /// Finish the in-flight request and return to `Idle`.
    ///
    /// A failure leaves the previous result and charts in place.
    pub fn complete(
        &mut self,
        outcome: Result<SimulationResult, GatewayError>,
    ) -> Result<(), SessionError> {
        self.phase = RequestPhase::Idle;

        let accepted = outcome.map_err(SessionError::from).and_then(|result| {
            let portfolio = self
                .submitted
                .clone()
                .unwrap_or_else(|| self.portfolio.snapshot());
            let charts = ChartSet::derive(&result, &portfolio, &mut self.rng)?;
            Ok((result, charts))
        });

        match accepted {
            Ok((result, charts)) => {
                tracing::info!(
                    expected_return = result.expected_return(),
                    sharpe = result.sharpe_ratio(),
                    trials = result.simulation_data().final_values().len(),
                    "Simulation result accepted"
                );
                self.result = Some(result);
                self.charts = Some(charts);
                self.clear_error();
                self.edits_since_run = 0;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Simulation result discarded");
                self.set_error(e.to_string());
                Err(e)
            }
        }
    }

    /// Submit and wait for the gateway on the current thread.
    pub fn run_blocking(&mut self, gateway: &dyn SimulationGateway) -> Result<(), SessionError> {
        let request = self.begin_submit()?;
        let outcome = gateway.simulate(&request);
        self.complete(outcome)
    }

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------

    pub fn result(&self) -> Option<&SimulationResult> {
        self.result.as_ref()
    }

    pub fn charts(&self) -> Option<&ChartSet> {
        self.charts.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
        self.error_from_validation = false;
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
        self.error_from_validation = false;
    }

    /// Hint for the submit control: why the portfolio cannot be sent yet.
    pub fn validation_message(&self) -> Option<String> {
        self.portfolio.validate().err().map(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::stub::{StubGateway, sample_result};
    use stocksim_core::charts::MAX_SAMPLED_PATHS;
    use stocksim_core::{Holding, HoldingField, MalformedResult, ResultsAdapter};

    fn two_stock_session() -> Session {
        let portfolio = PortfolioModel::from_holdings(vec![
            Holding::new("A", 0.5, ""),
            Holding::new("B", 0.5, ""),
        ])
        .unwrap();
        let params = SimulationParameters::new(252, 1000).unwrap();
        Session::with_seed(portfolio, params, 42)
    }

    #[test]
    fn test_end_to_end_with_stub_gateway() {
        let mut session = two_stock_session();
        let stub = StubGateway::ok(sample_result(1000, 75));
        let requests = stub.requests.clone();

        session.run_blocking(&stub).unwrap();

        let sent = requests.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].days, 252);
        assert_eq!(sent[0].simulations, 1000);
        assert_eq!(sent[0].portfolio.stocks.len(), 2);

        let result = session.result().unwrap();
        let charts = session.charts().unwrap();
        assert_eq!(
            charts.distribution.len(),
            result.simulation_data().final_values().len()
        );
        assert_eq!(charts.paths.len(), MAX_SAMPLED_PATHS.min(75) + 1);
        assert_eq!(charts.histogram.len(), DEFAULT_HISTOGRAM_BINS);
        assert_eq!(charts.risk_return.portfolio.label, "Your Portfolio (A/B)");
        assert_eq!(session.phase(), RequestPhase::Idle);
        assert!(session.error_message().is_none());
    }

    #[test]
    fn test_busy_while_loading() {
        let mut session = two_stock_session();
        session.begin_submit().unwrap();
        assert!(session.is_loading());
        assert_eq!(session.begin_submit(), Err(SubmitError::Busy));
        assert!(!session.can_submit());
    }

    #[test]
    fn test_unbalanced_portfolio_never_reaches_gateway() {
        let mut session = two_stock_session();
        session.portfolio_mut().set_weight(1, 0.2).unwrap();
        let stub = StubGateway::ok(sample_result(10, 2));

        let err = session.run_blocking(&stub).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Submit(SubmitError::Invalid(ValidationError::Unbalanced { .. }))
        ));
        assert!(stub.requests.lock().unwrap().is_empty());
        assert_eq!(session.phase(), RequestPhase::Idle);
        assert!(session.error_message().unwrap().contains("70.0%"));

        // Fixing the portfolio clears the stale validation message
        session.portfolio_mut().normalize().unwrap();
        assert!(session.sync() > 0);
        assert!(session.error_message().is_none());
    }

    #[test]
    fn test_unhealthy_api_blocks_submit() {
        let mut session = two_stock_session();
        session.set_api_status(HealthStatus::Unhealthy("connection refused".into()));
        assert!(matches!(
            session.begin_submit(),
            Err(SubmitError::ApiUnavailable(_))
        ));
        session.set_api_status(HealthStatus::Healthy);
        assert!(session.begin_submit().is_ok());
    }

    #[test]
    fn test_failure_keeps_previous_result() {
        let mut session = two_stock_session();
        session.run_blocking(&StubGateway::ok(sample_result(20, 5))).unwrap();
        let before = session.charts().cloned();

        let failing = StubGateway::failing(GatewayError::Failure("Unknown ticker A".into()));
        assert!(session.run_blocking(&failing).is_err());
        assert_eq!(session.error_message(), Some("Unknown ticker A"));
        assert_eq!(session.charts().cloned(), before);
        assert_eq!(session.phase(), RequestPhase::Idle);
    }

    #[test]
    fn test_malformed_result_surfaces_message() {
        let mut session = two_stock_session();
        session.begin_submit().unwrap();
        let err = session
            .complete(Err(MalformedResult::MissingField("volatility".into()).into()))
            .unwrap_err();
        assert!(matches!(err, SessionError::Gateway(GatewayError::Malformed(_))));
        assert!(session.result().is_none());
        assert!(session.error_message().unwrap().contains("volatility"));
    }

    #[test]
    fn test_edits_mark_results_stale() {
        let mut session = two_stock_session();
        session.run_blocking(&StubGateway::ok(sample_result(5, 2))).unwrap();
        session.sync();
        assert!(!session.results_stale());

        session
            .portfolio_mut()
            .update_holding(0, HoldingField::Name, "Alpha")
            .unwrap();
        assert_eq!(session.sync(), 1);
        assert!(session.results_stale());
    }

    #[test]
    fn test_cloud_is_drawn_once_per_result() {
        let mut session = two_stock_session();
        let stub = StubGateway::ok(sample_result(5, 2));
        session.run_blocking(&stub).unwrap();
        let cached = session.charts().unwrap().risk_return.comparison.clone();

        // The cached cloud is the first draw from the session's seed
        let result = session.result().unwrap().clone();
        let portfolio = session.portfolio().snapshot();
        let mut rng = StdRng::seed_from_u64(42);
        let first = ChartSet::derive(&result, &portfolio, &mut rng).unwrap();
        let second = ChartSet::derive(&result, &portfolio, &mut rng).unwrap();
        assert_eq!(first.risk_return.comparison, cached);
        assert_ne!(second.risk_return.comparison, cached);

        // Edits and syncs between redraws leave the cached cloud alone
        for weight in ["0.6", "0.5"] {
            session
                .portfolio_mut()
                .update_holding(0, HoldingField::Weight, weight)
                .unwrap();
            session.sync();
            assert_eq!(session.charts().unwrap().risk_return.comparison, cached);
        }

        // A new result draws the next cloud from the same generator
        session.run_blocking(&stub).unwrap();
        assert_eq!(
            session.charts().unwrap().risk_return.comparison,
            second.risk_return.comparison
        );
    }

    #[test]
    fn test_result_without_final_values_is_rejected_whole() {
        let mut session = two_stock_session();
        session.run_blocking(&StubGateway::ok(sample_result(20, 5))).unwrap();
        let before = session.charts().cloned();

        let empty = ResultsAdapter::adapt(&serde_json::json!({
            "expected_return": 0.05,
            "volatility": 0.1,
            "sharpe_ratio": 0.9,
            "var_95": -0.1,
            "simulation_data": {
                "final_values": [],
                "paths_sample": [[1.0, 1.01]],
            }
        }))
        .unwrap();

        let err = session.run_blocking(&StubGateway::ok(empty)).unwrap_err();
        assert_eq!(err, SessionError::Chart(ChartError::EmptyDistribution));
        assert_eq!(session.charts().cloned(), before);
        assert_eq!(session.phase(), RequestPhase::Idle);
    }
}
