use serde::Serialize;

use super::{ChartMeta, Outcome, ReferenceMarker};
use crate::error::ChartError;
use crate::model::SimulationResult;

/// Value multiple at which a trial neither gained nor lost
pub const BREAK_EVEN: f64 = 1.0;
/// Bucket count used for the final-value histogram
pub const DEFAULT_HISTOGRAM_BINS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionPoint {
    /// Trial index
    pub x: f64,
    /// Ending value multiple
    pub y: f64,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    pub outcome: Outcome,
}

impl HistogramBin {
    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }
}

/// Final values of every trial, tagged for gain/loss colouring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSeries {
    pub points: Vec<DistributionPoint>,
    pub meta: ChartMeta,
}

impl DistributionSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.points.iter().map(|p| p.outcome).collect()
    }

    /// Share of trials that ended at or above break-even, in `[0, 1]`.
    pub fn gain_ratio(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        let gains = self
            .points
            .iter()
            .filter(|p| p.outcome == Outcome::GainOrBreakeven)
            .count();
        gains as f64 / self.points.len() as f64
    }

    /// Bucket the final values into `bins` equal-width bins spanning the sample.
    ///
    /// Each bin is tagged by the outcome of its lower edge. A sample whose values
    /// are all equal collapses into one bin; `bins == 0` yields no bins.
    pub fn histogram(&self, bins: usize) -> Vec<HistogramBin> {
        if bins == 0 || self.points.is_empty() {
            return Vec::new();
        }

        let (min, max) = self
            .points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });

        if max <= min {
            return vec![HistogramBin {
                lower: min,
                upper: max,
                count: self.points.len(),
                outcome: Outcome::of_multiple(min),
            }];
        }

        let width = (max - min) / bins as f64;
        let mut counts = vec![0usize; bins];
        for point in &self.points {
            // The maximum lands exactly on the upper edge; keep it in the last bin
            let idx = (((point.y - min) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| {
                let lower = min + i as f64 * width;
                HistogramBin {
                    lower,
                    upper: lower + width,
                    count,
                    outcome: Outcome::of_multiple(lower),
                }
            })
            .collect()
    }
}

/// Pass the trial final values through, tagging each as gain or loss.
///
/// The metadata carries a break-even marker at 1.0.
pub fn distribution_series(result: &SimulationResult) -> Result<DistributionSeries, ChartError> {
    let values = result.simulation_data().final_values();
    if values.is_empty() {
        return Err(ChartError::EmptyDistribution);
    }

    let points = values
        .iter()
        .enumerate()
        .map(|(i, &value)| DistributionPoint {
            x: i as f64,
            y: value,
            outcome: Outcome::of_multiple(value),
        })
        .collect();

    Ok(DistributionSeries {
        points,
        meta: ChartMeta {
            title: "Portfolio Value Distribution",
            x_label: "Final value (x start)",
            y_label: "Frequency",
            x_bounds: None,
            y_bounds: None,
            markers: vec![ReferenceMarker {
                value: BREAK_EVEN,
                label: "Break Even",
            }],
        },
    })
}
