//! Domain types owned by a simulation session.
//!
//! - `portfolio` - holdings and the weight-managing [`PortfolioModel`]
//! - `parameters` - horizon and simulation-count configuration
//! - `request` - the wire shape submitted to the simulation service
//! - `results` - the validated, immutable simulation outcome

mod parameters;
mod portfolio;
mod request;
mod results;

pub use parameters::{
    DAYS_RANGE, HorizonPreset, Preset, SIMULATION_STEP, SIMULATIONS_RANGE, SimulationParameters,
    SimulationPreset,
};
pub use portfolio::{
    BALANCE_TOLERANCE, Holding, HoldingField, MAX_HOLDINGS, MAX_TICKER_LEN, Portfolio,
    PortfolioModel, SubscriptionId, clamp_weight, coerce_percent, coerce_weight,
};
pub use request::SimulationRequest;
pub use results::{SharpeRating, SimulationData, SimulationResult, classify_sharpe};
