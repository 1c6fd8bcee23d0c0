//! Portfolio composition and results shaping for remote Monte Carlo simulations
//!
//! This crate holds the client-side logic of the stock simulator. The simulation
//! itself runs in an external service; everything here is pure and synchronous:
//! - Portfolio composition with weight clamping, balancing and normalization
//! - Bounded simulation parameters with fixed presets
//! - Validation of raw service responses into an immutable [`SimulationResult`]
//! - Chart-ready series derived from a result (distribution, paths, risk/return)
//!
//! # Example
//!
//! ```ignore
//! use stocksim_core::{PortfolioModel, SimulationParameters, ResultsAdapter, charts};
//!
//! let mut portfolio = PortfolioModel::default();
//! portfolio.normalize()?;
//! let request = SimulationRequest::new(portfolio.validate()?, &SimulationParameters::default());
//!
//! // ... send `request` to the service, receive `raw` JSON ...
//! let result = ResultsAdapter::adapt(&raw)?;
//! let paths = charts::path_series(&result)?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod adapter;
pub mod charts;
pub mod error;
pub mod insights;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use adapter::ResultsAdapter;
pub use error::{ChartError, MalformedResult, ParameterError, PortfolioError, ValidationError};
pub use model::{
    Holding, HoldingField, HorizonPreset, Portfolio, PortfolioModel, Preset, SharpeRating,
    SimulationData, SimulationParameters, SimulationPreset, SimulationRequest, SimulationResult,
    SubscriptionId,
};
