//! Cross-module tests for the core crate
//!
//! Tests are organized by topic:
//! - `charts` - Series derivation from adapted results
//! - `properties` - Property-based checks of portfolio and classification invariants

mod charts;

use serde_json::json;

use crate::{ResultsAdapter, SimulationResult};

/// Build a result through the adapter from final values and paths.
pub(crate) fn result_with(final_values: &[f64], paths: &[Vec<f64>]) -> SimulationResult {
    ResultsAdapter::adapt(&json!({
        "expected_return": 0.08,
        "volatility": 0.2,
        "sharpe_ratio": 1.1,
        "var_95": -0.12,
        "simulation_data": {
            "final_values": final_values,
            "paths_sample": paths,
        }
    }))
    .expect("fixture is well formed")
}
