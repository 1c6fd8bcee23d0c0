//! Plain-language readings of a result's summary metrics.

use crate::model::{SharpeRating, SimulationResult};

/// Colour hint for a metric card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricTone {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub label: &'static str,
    pub value: String,
    pub tone: MetricTone,
    pub description: &'static str,
}

/// The four headline metrics with display values and tones.
pub fn metrics(result: &SimulationResult) -> [Metric; 4] {
    let ret = result.expected_return();
    let sharpe = result.sharpe_ratio();
    let var = result.var_95();

    [
        Metric {
            label: "Expected Annual Return",
            value: format!("{:.2}%", ret * 100.0),
            tone: if ret > 0.0 {
                MetricTone::Positive
            } else {
                MetricTone::Negative
            },
            description: "Average expected portfolio return",
        },
        Metric {
            label: "Annual Volatility",
            value: format!("{:.2}%", result.volatility() * 100.0),
            tone: MetricTone::Neutral,
            description: "Portfolio standard deviation",
        },
        Metric {
            label: "Sharpe Ratio",
            value: format!("{sharpe:.3}"),
            tone: if sharpe > 1.0 {
                MetricTone::Positive
            } else if sharpe > 0.5 {
                MetricTone::Neutral
            } else {
                MetricTone::Negative
            },
            description: "Risk-adjusted return metric",
        },
        Metric {
            label: "95% Value at Risk",
            value: format!("{:.2}%", var * 100.0),
            tone: if var < -0.2 {
                MetricTone::Negative
            } else {
                MetricTone::Neutral
            },
            description: "5% chance of losing more than this",
        },
    ]
}

pub fn risk_assessment(result: &SimulationResult) -> String {
    let rating: SharpeRating = result.sharpe_rating();
    let follow_up = if result.sharpe_ratio() > 1.0 {
        "This indicates good risk-adjusted returns."
    } else {
        "Consider rebalancing for better risk-adjusted returns."
    };
    format!(
        "Sharpe ratio of {:.3} is considered {}. {}",
        result.sharpe_ratio(),
        rating.label(),
        follow_up
    )
}

pub fn downside_summary(var_95: f64) -> String {
    format!(
        "There's a 5% chance the portfolio loses more than {:.1}% of its value.",
        (var_95 * 100.0).abs()
    )
}

pub fn return_outlook(expected_return: f64) -> String {
    let outlook = if expected_return > 0.1 {
        "outperforming many traditional investments."
    } else if expected_return > 0.0 {
        "providing modest growth potential."
    } else {
        "suggesting the allocation may need reconsidering."
    };
    format!(
        "Expected annual return is {:.1}%, {}",
        expected_return * 100.0,
        outlook
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downside_uses_magnitude() {
        assert_eq!(
            downside_summary(-0.234),
            "There's a 5% chance the portfolio loses more than 23.4% of its value."
        );
    }

    #[test]
    fn test_return_outlook_brackets() {
        assert!(return_outlook(0.15).contains("outperforming"));
        assert!(return_outlook(0.05).contains("modest"));
        assert!(return_outlook(0.1).contains("modest"));
        assert!(return_outlook(-0.02).contains("reconsidering"));
    }
}
