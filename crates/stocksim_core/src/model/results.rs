use serde::Serialize;

/// Qualitative reading of a Sharpe ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SharpeRating {
    Excellent,
    Good,
    Acceptable,
    Poor,
    Negative,
}

impl SharpeRating {
    pub fn label(&self) -> &'static str {
        match self {
            SharpeRating::Excellent => "Excellent",
            SharpeRating::Good => "Good",
            SharpeRating::Acceptable => "Acceptable",
            SharpeRating::Poor => "Poor",
            SharpeRating::Negative => "Negative",
        }
    }
}

/// Classify a Sharpe ratio with strict thresholds at 2, 1, 0.5 and 0.
///
/// A value sitting exactly on a threshold falls into the lower bracket, and NaN
/// is `Negative`.
pub fn classify_sharpe(sharpe: f64) -> SharpeRating {
    if sharpe > 2.0 {
        SharpeRating::Excellent
    } else if sharpe > 1.0 {
        SharpeRating::Good
    } else if sharpe > 0.5 {
        SharpeRating::Acceptable
    } else if sharpe > 0.0 {
        SharpeRating::Poor
    } else {
        SharpeRating::Negative
    }
}

/// Raw trial outputs returned alongside the summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationData {
    final_values: Vec<f64>,
    paths_sample: Vec<Vec<f64>>,
}

impl SimulationData {
    /// Ending value of each trial as a multiple of the starting value.
    pub fn final_values(&self) -> &[f64] {
        &self.final_values
    }

    /// Sampled value paths; never empty, every path has the same non-zero length.
    pub fn paths_sample(&self) -> &[Vec<f64>] {
        &self.paths_sample
    }

    /// Number of points in each path.
    pub fn horizon(&self) -> usize {
        self.paths_sample.first().map_or(0, Vec::len)
    }
}

/// Outcome of one simulation run.
///
/// Only [`ResultsAdapter`](crate::ResultsAdapter) builds these, so a value in hand
/// always satisfies the path invariants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    expected_return: f64,
    volatility: f64,
    sharpe_ratio: f64,
    var_95: f64,
    simulation_data: SimulationData,
}

impl SimulationResult {
    pub(crate) fn from_validated(
        expected_return: f64,
        volatility: f64,
        sharpe_ratio: f64,
        var_95: f64,
        final_values: Vec<f64>,
        paths_sample: Vec<Vec<f64>>,
    ) -> Self {
        Self {
            expected_return,
            volatility,
            sharpe_ratio,
            var_95,
            simulation_data: SimulationData {
                final_values,
                paths_sample,
            },
        }
    }

    pub fn expected_return(&self) -> f64 {
        self.expected_return
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn sharpe_ratio(&self) -> f64 {
        self.sharpe_ratio
    }

    pub fn var_95(&self) -> f64 {
        self.var_95
    }

    pub fn simulation_data(&self) -> &SimulationData {
        &self.simulation_data
    }

    pub fn sharpe_rating(&self) -> SharpeRating {
        classify_sharpe(self.sharpe_ratio)
    }
}
