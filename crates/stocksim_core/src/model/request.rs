use serde::Serialize;

use super::parameters::SimulationParameters;
use super::portfolio::Portfolio;

/// Body of a simulation request:
/// `{ "portfolio": { "stocks": [...] }, "days": 252, "simulations": 1000 }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRequest {
    pub portfolio: Portfolio,
    pub days: u32,
    pub simulations: u32,
}

impl SimulationRequest {
    pub fn new(portfolio: Portfolio, params: &SimulationParameters) -> Self {
        Self {
            portfolio,
            days: params.days(),
            simulations: params.simulations(),
        }
    }
}
