use rand::Rng;
use serde::Serialize;

use super::{ChartMeta, ReferenceMarker};
use crate::error::ChartError;
use crate::model::{Portfolio, SimulationResult};

/// Size of the illustrative comparison cloud
pub const COMPARISON_PORTFOLIOS: usize = 100;

const CLOUD_RETURN_PCT: (f64, f64) = (-10.0, 30.0);
const CLOUD_VOLATILITY_PCT: (f64, f64) = (5.0, 40.0);
const FRONTIER_RISK_PCT: (u32, u32) = (5, 35);

/// A `(volatility %, return %)` point with a label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReturnPoint {
    pub label: String,
    pub volatility: f64,
    pub expected_return: f64,
    pub sharpe_ratio: Option<f64>,
}

impl RiskReturnPoint {
    pub fn xy(&self) -> (f64, f64) {
        (self.volatility, self.expected_return)
    }
}

/// Randomly scattered comparison portfolios, generated once and then reused.
///
/// The cloud is illustrative noise, not derived from market data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonCloud {
    pub points: Vec<(f64, f64)>,
}

impl ComparisonCloud {
    /// Draw `count` points with return uniform in [-10%, 30%] and volatility
    /// uniform in [5%, 40%].
    pub fn generate<R: Rng>(rng: &mut R, count: usize) -> Self {
        let points = (0..count)
            .map(|_| {
                let ret = rng.random_range(CLOUD_RETURN_PCT.0..=CLOUD_RETURN_PCT.1);
                let vol = rng.random_range(CLOUD_VOLATILITY_PCT.0..=CLOUD_VOLATILITY_PCT.1);
                (vol, ret)
            })
            .collect();
        Self { points }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReturnSeries {
    pub comparison: ComparisonCloud,
    pub portfolio: RiskReturnPoint,
    pub frontier: Vec<(f64, f64)>,
    pub meta: ChartMeta,
}

/// Fixed illustrative frontier: `return = sqrt(risk / 100) * 40 - 5` for risk 5..=35 %.
pub fn frontier_curve() -> Vec<(f64, f64)> {
    (FRONTIER_RISK_PCT.0..=FRONTIER_RISK_PCT.1)
        .map(|risk| {
            let risk = risk as f64;
            (risk, (risk / 100.0).sqrt() * 40.0 - 5.0)
        })
        .collect()
}

/// Place the simulated portfolio against a comparison cloud and the reference frontier.
///
/// All coordinates are percentages. The cloud is drawn from `rng`; callers that
/// redraw should keep the returned series rather than call this again.
pub fn risk_return_series<R: Rng>(
    result: &SimulationResult,
    portfolio: &Portfolio,
    rng: &mut R,
) -> Result<RiskReturnSeries, ChartError> {
    if portfolio.stocks.is_empty() {
        return Err(ChartError::EmptyPortfolio);
    }

    let label = match portfolio.label() {
        tickers if tickers.is_empty() => "Your Portfolio".to_string(),
        tickers => format!("Your Portfolio ({tickers})"),
    };

    Ok(RiskReturnSeries {
        comparison: ComparisonCloud::generate(rng, COMPARISON_PORTFOLIOS),
        portfolio: RiskReturnPoint {
            label,
            volatility: result.volatility() * 100.0,
            expected_return: result.expected_return() * 100.0,
            sharpe_ratio: Some(result.sharpe_ratio()),
        },
        frontier: frontier_curve(),
        meta: ChartMeta {
            title: "Risk vs Return Analysis",
            x_label: "Annual Volatility (Risk) %",
            y_label: "Expected Annual Return %",
            x_bounds: Some([0.0, 40.0]),
            y_bounds: Some([-15.0, 35.0]),
            markers: vec![ReferenceMarker {
                value: 0.0,
                label: "Zero return",
            }],
        },
    })
}
