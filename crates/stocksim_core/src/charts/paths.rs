use serde::Serialize;

use super::{ChartMeta, Outcome, ReferenceMarker, percent_return};
use crate::error::ChartError;
use crate::model::SimulationResult;

/// Upper bound on individually drawn paths
pub const MAX_SAMPLED_PATHS: usize = 50;

/// One line of the paths chart: `(day, cumulative % return)` points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathLine {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    /// Outcome of the last point, for colouring
    pub outcome: Outcome,
}

impl PathLine {
    fn from_multiples(label: String, values: &[f64]) -> Self {
        let outcome = values
            .last()
            .map_or(Outcome::GainOrBreakeven, |&v| Outcome::of_multiple(v));
        let points = values
            .iter()
            .enumerate()
            .map(|(day, &v)| (day as f64, percent_return(v)))
            .collect();
        Self {
            label,
            points,
            outcome,
        }
    }

    pub fn final_return(&self) -> Option<f64> {
        self.points.last().map(|&(_, y)| y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSeries {
    /// At most [`MAX_SAMPLED_PATHS`] of the simulated paths, in their original order
    pub sampled: Vec<PathLine>,
    /// Mean over every simulated path, not just the sampled ones
    pub average: PathLine,
    pub meta: ChartMeta,
}

impl PathSeries {
    /// Number of lines drawn, average included.
    pub fn len(&self) -> usize {
        self.sampled.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Min and max y over every line, for axis scaling.
    pub fn y_range(&self) -> (f64, f64) {
        self.sampled
            .iter()
            .chain(std::iter::once(&self.average))
            .flat_map(|line| line.points.iter().map(|&(_, y)| y))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
                (lo.min(y), hi.max(y))
            })
    }
}

/// Per-day arithmetic mean across all paths, in value multiples.
///
/// Paths are expected to share one length; the average stops at the shortest.
pub fn average_path(paths: &[Vec<f64>]) -> Result<Vec<f64>, ChartError> {
    let horizon = paths
        .iter()
        .map(Vec::len)
        .min()
        .ok_or(ChartError::EmptyPathSet)?;
    if horizon == 0 {
        return Err(ChartError::EmptyPathSet);
    }

    let count = paths.len() as f64;
    let average = (0..horizon)
        .map(|day| paths.iter().map(|path| path[day]).sum::<f64>() / count)
        .collect();
    Ok(average)
}

/// Sampled paths plus the synthesized average path, as cumulative % return.
pub fn path_series(result: &SimulationResult) -> Result<PathSeries, ChartError> {
    let paths = result.simulation_data().paths_sample();
    let average = average_path(paths)?;

    let sampled = paths
        .iter()
        .take(MAX_SAMPLED_PATHS)
        .enumerate()
        .map(|(i, path)| PathLine::from_multiples(format!("Path {}", i + 1), path))
        .collect();

    Ok(PathSeries {
        sampled,
        average: PathLine::from_multiples("Average Path".to_string(), &average),
        meta: ChartMeta {
            title: "Simulation Paths",
            x_label: "Trading days",
            y_label: "Cumulative return (%)",
            x_bounds: Some([0.0, (average.len().saturating_sub(1)) as f64]),
            y_bounds: None,
            markers: vec![ReferenceMarker {
                value: 0.0,
                label: "Break Even",
            }],
        },
    })
}
