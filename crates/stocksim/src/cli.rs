//! Headless subcommands sharing the session and gateway used by the terminal UI.

use std::io::{self, Write};

use stocksim_core::insights::{downside_summary, metrics, return_outlook, risk_assessment};
use stocksim_core::model::{coerce_percent, coerce_weight};
use stocksim_core::{
    Holding, ParameterError, PortfolioError, PortfolioModel, SimulationParameters,
};
use thiserror::Error;

use crate::gateway::{HealthStatus, SimulationGateway};
use crate::session::{Session, SessionError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid holding '{0}', expected TICKER=WEIGHT")]
    InvalidHolding(String),

    #[error(transparent)]
    Portfolio(#[from] PortfolioError),

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode result: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse `TICKER=WEIGHT`, where the weight is a fraction or a percentage like `40%`.
pub fn parse_holding(raw: &str) -> Result<Holding, CliError> {
    let invalid = || CliError::InvalidHolding(raw.to_string());

    let (ticker, weight) = raw.split_once('=').ok_or_else(invalid)?;
    let ticker = ticker.trim().to_uppercase();
    let weight = weight.trim();
    if ticker.is_empty() || weight.is_empty() {
        return Err(invalid());
    }

    let weight = if weight.ends_with('%') {
        coerce_percent(weight)
    } else {
        weight.parse::<f64>().map_err(|_| invalid())?;
        coerce_weight(weight)
    };

    Ok(Holding::new(ticker.clone(), weight, ticker))
}

/// Print the service status. Returns whether it is healthy.
pub fn run_health(gateway: &dyn SimulationGateway, out: &mut impl Write) -> io::Result<bool> {
    match gateway.health() {
        HealthStatus::Healthy => {
            writeln!(out, "Simulation service: healthy")?;
            Ok(true)
        }
        HealthStatus::Unhealthy(reason) => {
            writeln!(out, "Simulation service: unavailable ({reason})")?;
            Ok(false)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulateArgs {
    pub holdings: Vec<String>,
    pub days: Option<u32>,
    pub simulations: Option<u32>,
    pub json: bool,
}

/// Run one simulation and print a summary (or the adapted result as JSON).
pub fn run_simulate(
    args: &SimulateArgs,
    mut parameters: SimulationParameters,
    gateway: &dyn SimulationGateway,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let portfolio = if args.holdings.is_empty() {
        PortfolioModel::default()
    } else {
        let holdings = args
            .holdings
            .iter()
            .map(|raw| parse_holding(raw))
            .collect::<Result<Vec<_>, _>>()?;
        PortfolioModel::from_holdings(holdings)?
    };

    if let Some(days) = args.days {
        parameters.set_days(days)?;
    }
    if let Some(simulations) = args.simulations {
        parameters.set_simulations(simulations)?;
    }

    let mut session = Session::new(portfolio, parameters);
    tracing::info!(
        portfolio = %session.portfolio().snapshot().label(),
        days = session.parameters().days(),
        simulations = session.parameters().simulations(),
        "Running headless simulation"
    );
    session.run_blocking(gateway)?;

    let Some(result) = session.result() else {
        return Ok(());
    };

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(result)?)?;
        return Ok(());
    }

    writeln!(out, "Portfolio: {}", session.portfolio().snapshot().label())?;
    writeln!(
        out,
        "Horizon: {} days, {} simulations",
        session.parameters().days(),
        session.parameters().simulations()
    )?;
    writeln!(out)?;
    for metric in metrics(result) {
        writeln!(out, "{:<24} {:>10}", metric.label, metric.value)?;
    }
    writeln!(out, "{:<24} {:>10}", "Rating", result.sharpe_rating().label())?;
    writeln!(out)?;
    writeln!(out, "{}", risk_assessment(result))?;
    writeln!(out, "{}", downside_summary(result.var_95()))?;
    writeln!(out, "{}", return_outlook(result.expected_return()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayError;
    use crate::gateway::stub::{StubGateway, sample_result};

    fn args(holdings: &[&str]) -> SimulateArgs {
        SimulateArgs {
            holdings: holdings.iter().map(|s| s.to_string()).collect(),
            days: None,
            simulations: None,
            json: false,
        }
    }

    #[test]
    fn test_parse_holding() {
        let holding = parse_holding("aapl=0.4").unwrap();
        assert_eq!(holding.ticker(), "AAPL");
        assert!((holding.weight() - 0.4).abs() < 1e-12);

        let holding = parse_holding(" MSFT = 60% ").unwrap();
        assert!((holding.weight() - 0.6).abs() < 1e-12);

        let holding = parse_holding("TSLA=3").unwrap();
        assert_eq!(holding.weight(), 1.0);
    }

    #[test]
    fn test_parse_holding_rejects_garbage() {
        for raw in ["AAPL", "=0.4", "AAPL=", "AAPL=lots"] {
            assert!(
                matches!(parse_holding(raw), Err(CliError::InvalidHolding(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_health_output() {
        let mut out = Vec::new();
        let gateway = StubGateway::ok(sample_result(10, 2));
        assert!(run_health(&gateway, &mut out).unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "Simulation service: healthy\n");

        let mut gateway = StubGateway::ok(sample_result(10, 2));
        gateway.health = HealthStatus::Unhealthy("HTTP 503".into());
        let mut out = Vec::new();
        assert!(!run_health(&gateway, &mut out).unwrap());
        assert!(String::from_utf8(out).unwrap().contains("HTTP 503"));
    }

    #[test]
    fn test_simulate_summary() {
        let gateway = StubGateway::ok(sample_result(100, 5));
        let mut out = Vec::new();
        let mut request = args(&["AAPL=0.5", "MSFT=0.5"]);
        request.days = Some(126);

        run_simulate(&request, SimulationParameters::default(), &gateway, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Portfolio: AAPL/MSFT"));
        assert!(text.contains("Horizon: 126 days"));
        assert!(text.contains("Sharpe Ratio"));

        let sent = gateway.requests.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].days, 126);
    }

    #[test]
    fn test_simulate_json() {
        let gateway = StubGateway::ok(sample_result(100, 5));
        let mut out = Vec::new();
        let mut request = args(&[]);
        request.json = true;

        run_simulate(&request, SimulationParameters::default(), &gateway, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert!(value.get("sharpe_ratio").is_some());
    }

    #[test]
    fn test_simulate_errors() {
        let gateway = StubGateway::ok(sample_result(100, 5));
        let mut out = Vec::new();

        let unbalanced = args(&["AAPL=0.5"]);
        let err = run_simulate(&unbalanced, SimulationParameters::default(), &gateway, &mut out)
            .unwrap_err();
        assert!(matches!(err, CliError::Session(SessionError::Submit(_))));

        let mut too_long = args(&[]);
        too_long.days = Some(5000);
        let err = run_simulate(&too_long, SimulationParameters::default(), &gateway, &mut out)
            .unwrap_err();
        assert!(matches!(err, CliError::Parameter(_)));

        let failing = StubGateway::failing(GatewayError::Failure("boom".into()));
        let err = run_simulate(&args(&[]), SimulationParameters::default(), &failing, &mut out)
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(gateway.requests.lock().unwrap().is_empty());
    }
}
