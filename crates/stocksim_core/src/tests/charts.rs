//! Chart derivation tests

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::result_with;
use crate::charts::{
    COMPARISON_PORTFOLIOS, MAX_SAMPLED_PATHS, Outcome, average_path, distribution_series,
    frontier_curve, path_series, risk_return_series,
};
use crate::error::ChartError;
use crate::model::{Holding, Portfolio, PortfolioModel};

fn flat_paths(count: usize, len: usize) -> Vec<Vec<f64>> {
    (0..count)
        .map(|i| (0..len).map(|d| 1.0 + (i * d) as f64 * 0.001).collect())
        .collect()
}

// ============================================================================
// Distribution
// ============================================================================

#[test]
fn test_distribution_classification() {
    let result = result_with(&[0.95, 1.0, 1.2], &[vec![1.0]]);
    let series = distribution_series(&result).unwrap();

    assert_eq!(
        series.outcomes(),
        vec![Outcome::Loss, Outcome::GainOrBreakeven, Outcome::GainOrBreakeven]
    );
    assert_eq!(series.points[2].y, 1.2);
    assert_eq!(series.points[2].x, 2.0);
    assert_eq!(series.meta.markers.len(), 1);
    assert_eq!(series.meta.markers[0].value, 1.0);
    assert_eq!(series.meta.markers[0].label, "Break Even");
    assert!((series.gain_ratio() - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_distribution_empty_is_error() {
    let result = result_with(&[], &[vec![1.0]]);
    assert_eq!(
        distribution_series(&result),
        Err(ChartError::EmptyDistribution)
    );
}

#[test]
fn test_histogram_counts_every_trial() {
    let values: Vec<f64> = (0..200).map(|i| 0.8 + i as f64 * 0.002).collect();
    let result = result_with(&values, &[vec![1.0]]);
    let bins = distribution_series(&result).unwrap().histogram(50);

    assert_eq!(bins.len(), 50);
    assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 200);
    assert_eq!(bins[0].outcome, Outcome::Loss);
    assert_eq!(bins[49].outcome, Outcome::GainOrBreakeven);
    assert!((bins[0].lower - 0.8).abs() < 1e-12);
    assert!(bins[0].midpoint() > bins[0].lower);
}

#[test]
fn test_histogram_degenerate_sample() {
    let result = result_with(&[1.05, 1.05, 1.05], &[vec![1.0]]);
    let series = distribution_series(&result).unwrap();
    let bins = series.histogram(50);
    assert_eq!(bins.len(), 1);
    assert_eq!(bins[0].count, 3);
    assert!(series.histogram(0).is_empty());
}

// ============================================================================
// Paths
// ============================================================================

#[test]
fn test_average_path() {
    let paths = vec![vec![1.0, 1.1], vec![1.0, 0.9]];
    let avg = average_path(&paths).unwrap();
    assert_eq!(avg.len(), 2);
    assert!((avg[0] - 1.0).abs() < 1e-12);
    assert!((avg[1] - 1.0).abs() < 1e-12);
}

#[test]
fn test_average_path_empty() {
    assert_eq!(average_path(&[]), Err(ChartError::EmptyPathSet));
    assert_eq!(average_path(&[vec![]]), Err(ChartError::EmptyPathSet));
}

#[test]
fn test_path_series_reports_percent_return() {
    let result = result_with(&[1.1, 0.9], &[vec![1.0, 1.1], vec![1.0, 0.9]]);
    let series = path_series(&result).unwrap();

    assert_eq!(series.len(), 3);
    assert_eq!(series.sampled[0].outcome, Outcome::GainOrBreakeven);
    assert_eq!(series.sampled[1].outcome, Outcome::Loss);
    assert!((series.sampled[0].points[1].1 - 10.0).abs() < 1e-9);
    assert!((series.sampled[1].points[1].1 + 10.0).abs() < 1e-9);
    assert_eq!(series.average.label, "Average Path");
    assert!(series.average.final_return().unwrap().abs() < 1e-9);
}

#[test]
fn test_path_series_samples_at_most_fifty() {
    let paths = flat_paths(80, 5);
    let result = result_with(&[1.0], &paths);
    let series = path_series(&result).unwrap();

    assert_eq!(series.sampled.len(), MAX_SAMPLED_PATHS);
    assert_eq!(series.len(), MAX_SAMPLED_PATHS + 1);

    // The average covers all 80 paths, not only the 50 drawn
    let full = average_path(&paths).unwrap();
    let last = series.average.final_return().unwrap();
    assert!((last - (full[4] - 1.0) * 100.0).abs() < 1e-9);
    let sampled_only = average_path(&paths[..MAX_SAMPLED_PATHS]).unwrap();
    assert!((full[4] - sampled_only[4]).abs() > 1e-6);
}

#[test]
fn test_path_series_fewer_than_cap() {
    let result = result_with(&[1.0], &flat_paths(7, 3));
    let series = path_series(&result).unwrap();
    assert_eq!(series.len(), 8);
    assert_eq!(series.meta.x_bounds, Some([0.0, 2.0]));
}

// ============================================================================
// Risk / return
// ============================================================================

#[test]
fn test_frontier_curve() {
    let curve = frontier_curve();
    assert_eq!(curve.len(), 31);
    assert_eq!(curve[0].0, 5.0);
    assert_eq!(curve[30].0, 35.0);
    // risk 25% -> sqrt(0.25) * 40 - 5 = 15
    let at_25 = curve.iter().find(|(x, _)| *x == 25.0).unwrap();
    assert!((at_25.1 - 15.0).abs() < 1e-12);
}

#[test]
fn test_risk_return_series() {
    let result = result_with(&[1.0], &[vec![1.0]]);
    let portfolio = PortfolioModel::default().snapshot();
    let mut rng = StdRng::seed_from_u64(7);
    let series = risk_return_series(&result, &portfolio, &mut rng).unwrap();

    assert_eq!(series.comparison.points.len(), COMPARISON_PORTFOLIOS);
    for &(vol, ret) in &series.comparison.points {
        assert!((5.0..=40.0).contains(&vol));
        assert!((-10.0..=30.0).contains(&ret));
    }
    assert!((series.portfolio.volatility - 20.0).abs() < 1e-9);
    assert!((series.portfolio.expected_return - 8.0).abs() < 1e-9);
    assert_eq!(series.portfolio.label, "Your Portfolio (AAPL/GOOGL/MSFT)");
    assert_eq!(series.frontier, frontier_curve());
    assert_eq!(series.meta.x_bounds, Some([0.0, 40.0]));
}

#[test]
fn test_risk_return_cloud_is_seeded() {
    let result = result_with(&[1.0], &[vec![1.0]]);
    let portfolio = Portfolio {
        stocks: vec![Holding::new("A", 1.0, "")],
    };
    let a = risk_return_series(&result, &portfolio, &mut StdRng::seed_from_u64(1)).unwrap();
    let b = risk_return_series(&result, &portfolio, &mut StdRng::seed_from_u64(1)).unwrap();
    let c = risk_return_series(&result, &portfolio, &mut StdRng::seed_from_u64(2)).unwrap();
    assert_eq!(a.comparison, b.comparison);
    assert_ne!(a.comparison, c.comparison);
}

#[test]
fn test_risk_return_empty_portfolio() {
    let result = result_with(&[1.0], &[vec![1.0]]);
    let empty = Portfolio { stocks: vec![] };
    assert_eq!(
        risk_return_series(&result, &empty, &mut StdRng::seed_from_u64(0)),
        Err(ChartError::EmptyPortfolio)
    );
}
