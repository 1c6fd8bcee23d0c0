//! Chart-ready series derived from a [`SimulationResult`](crate::SimulationResult).
//!
//! Each derivation is a pure function returning `(x, y)` series plus a
//! [`ChartMeta`] describing titles, axes and reference markers. Nothing here knows
//! about a rendering library; the terminal UI maps these onto its own widgets.
//!
//! - [`distribution_series`] - final values tagged gain/loss, with histogram binning
//! - [`path_series`] - sampled value paths plus the average path, as % return
//! - [`risk_return_series`] - comparison cloud, the actual portfolio and a reference frontier

mod distribution;
mod paths;
mod risk_return;

pub use distribution::{
    BREAK_EVEN, DEFAULT_HISTOGRAM_BINS, DistributionPoint, DistributionSeries, HistogramBin,
    distribution_series,
};
pub use paths::{MAX_SAMPLED_PATHS, PathLine, PathSeries, average_path, path_series};
pub use risk_return::{
    COMPARISON_PORTFOLIOS, ComparisonCloud, RiskReturnPoint, RiskReturnSeries, frontier_curve,
    risk_return_series,
};

use serde::Serialize;

/// Whether a value multiple ended at or above its starting value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Outcome {
    GainOrBreakeven,
    Loss,
}

impl Outcome {
    /// Classify a value multiple (1.0 = breakeven).
    pub fn of_multiple(value: f64) -> Self {
        if value >= BREAK_EVEN {
            Outcome::GainOrBreakeven
        } else {
            Outcome::Loss
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::GainOrBreakeven => "gain-or-breakeven",
            Outcome::Loss => "loss",
        }
    }
}

/// A labelled vertical or horizontal line drawn at a fixed axis value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceMarker {
    pub value: f64,
    pub label: &'static str,
}

/// Presentation hints shared by every derived chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartMeta {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    /// Fixed axis bounds; `None` means fit to the data.
    pub x_bounds: Option<[f64; 2]>,
    pub y_bounds: Option<[f64; 2]>,
    pub markers: Vec<ReferenceMarker>,
}

/// Convert a value multiple into a cumulative percentage return.
pub fn percent_return(multiple: f64) -> f64 {
    (multiple - 1.0) * 100.0
}
